//! Text preparation ahead of n-gram counting.
//!
//! - Cleaning raw corpus text (`Normalizer`)
//! - Splitting cleaned text into words or characters (`Granularity`, `Segmenter`)

/// Boilerplate, symbol, line-break and stopword removal.
pub mod normalize;

/// Word segmentation and character splitting.
pub mod tokenize;
