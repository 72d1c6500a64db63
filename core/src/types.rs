//! Shared primitive types used across the analysis toolkit.

/// A stable customer identifier, exactly as it appears in the source data.
pub type CustomerId = String;

/// A stable order identifier.
pub type OrderId = String;

/// Zero-based count of granularity periods between a transaction and its
/// customer's first-purchase period. Index 0 is the first-purchase period.
pub type ElapsedIndex = usize;
