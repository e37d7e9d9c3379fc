//! # Validation
//!
//! Pure input validation for ledger operations. Runs before any persistence
//! so the lifecycle managers only ever write validated data.
//!
//! The return validator enforces the quantity bound invariant: for each
//! sale item, cumulative non-cancelled returned qty ≤ originally sold qty -
//! including quantities requested more than once within the same request.

use std::collections::HashMap;

use crate::error::{LedgerError, LedgerResult};
use crate::types::{ReturnRequestItem, SaleDraft, SaleItem};

// =============================================================================
// Payments
// =============================================================================

/// Validates a requested payment amount. Clamping to the balance happens
/// later, inside the lifecycle transaction; non-positive amounts are
/// rejected outright.
pub fn validate_payment_amount(amount_cents: i64) -> LedgerResult<()> {
    if amount_cents <= 0 {
        return Err(LedgerError::InvalidAmount { amount_cents });
    }
    Ok(())
}

// =============================================================================
// Sales
// =============================================================================

/// Validates a sale draft and returns the items total in cents.
pub fn validate_sale_draft(draft: &SaleDraft) -> LedgerResult<i64> {
    if draft.items.is_empty() {
        return Err(LedgerError::EmptySale);
    }

    let mut items_total = 0i64;
    for item in &draft.items {
        if item.qty <= 0 {
            return Err(LedgerError::InvalidQty { qty: item.qty });
        }
        items_total += item.unit_price_cents * item.qty;
    }

    Ok(items_total)
}

// =============================================================================
// Returns
// =============================================================================

/// Validates requested return lines against the sale's items and the
/// quantities already returned by active (non-cancelled) returns.
///
/// ## Arguments
/// * `sale_items` - the original sale lines
/// * `already_returned` - active returned qty per sale_item_id
/// * `requested` - the return lines being created
///
/// ## Returns
/// The return total in cents: `Σ(qty × unit_price_cents)`.
pub fn validate_return_items(
    sale_items: &[SaleItem],
    already_returned: &HashMap<String, i64>,
    requested: &[ReturnRequestItem],
) -> LedgerResult<i64> {
    if requested.is_empty() {
        return Err(LedgerError::EmptyReturn);
    }

    let by_id: HashMap<&str, &SaleItem> = sale_items
        .iter()
        .map(|item| (item.id.as_str(), item))
        .collect();

    // Quantities claimed so far in THIS request, so two lines against the
    // same sale item cannot jointly exceed the available quantity.
    let mut claimed: HashMap<&str, i64> = HashMap::new();

    let mut total = 0i64;
    for item in requested {
        let sale_item = by_id
            .get(item.sale_item_id.as_str())
            .ok_or_else(|| LedgerError::not_found("Sale item", &item.sale_item_id))?;

        if sale_item.product_id != item.product_id {
            return Err(LedgerError::ProductMismatch {
                sale_item_id: item.sale_item_id.clone(),
                product_id: item.product_id.clone(),
            });
        }

        if item.qty <= 0 {
            return Err(LedgerError::InvalidQty { qty: item.qty });
        }

        let prior = already_returned
            .get(&item.sale_item_id)
            .copied()
            .unwrap_or(0);
        let in_request = claimed.entry(item.sale_item_id.as_str()).or_insert(0);
        let available = sale_item.qty - prior - *in_request;

        if item.qty > available {
            return Err(LedgerError::ExceedsAvailable {
                sale_item_id: item.sale_item_id.clone(),
                requested: item.qty,
                available: available.max(0),
            });
        }

        *in_request += item.qty;
        total += item.unit_price_cents * item.qty;
    }

    Ok(total)
}

// =============================================================================
// Unit Tests
// =============================================================================
