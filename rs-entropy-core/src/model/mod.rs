//! Top-level module for n-gram counting and entropy estimation.
//!
//! This module provides:
//! - Frequency tables for orders 1 to 3 (`FrequencyTable`, `NGramTables`)
//! - Composite keys for orders 2 and 3 (`Bigram`, `Trigram`)
//! - Per-order statistics with Shannon and conditional entropy (`ModelStatistics`)
//! - The per-file aggregate (`EntropyReport`)

/// Frequency tables and n-gram key types.
///
/// Counting borrows the token sequence; tables live only as long as the
/// analysis that built them.
pub mod ngram;

/// Totals, distinct counts, average key lengths and entropy per order.
pub mod statistics;

/// Aggregation of the three orders with corpus-level counts.
pub mod report;
