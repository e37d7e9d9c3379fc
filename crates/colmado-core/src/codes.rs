//! # Document Codes
//!
//! Formatting for the sequential, human-readable codes issued by the
//! per-account counters.
//!
//! | Document | Counter scope   | Format      | Example    |
//! |----------|-----------------|-------------|------------|
//! | Invoice  | account, series | `A-00001`   | `A-00042`  |
//! | Receipt  | account         | `R-000001`  | `R-000042` |
//! | Return   | account         | `DEV-00001` | `DEV-00042`|
//!
//! Numbers come from the `sequences` table (atomic increment-or-create in
//! the owning transaction); this module only formats them.

/// Formats an invoice code from its series and sequence number.
pub fn invoice_code(series: &str, number: i64) -> String {
    format!("{}-{:05}", series, number)
}

/// Formats a payment receipt code from its sequence number.
pub fn receipt_code(number: i64) -> String {
    format!("R-{:06}", number)
}

/// Formats a return code from its sequence number.
pub fn return_code(number: i64) -> String {
    format!("DEV-{:05}", number)
}
