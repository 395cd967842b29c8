//! N-gram entropy statistics for text corpora.
//!
//! This crate measures how predictable a corpus is, including:
//! - Text cleaning (boilerplate, punctuation and stopword removal)
//! - Word-level (segmented) and character-level tokenization
//! - Unigram, bigram and trigram frequency tables
//! - Shannon entropy for unigrams and conditional entropy for bigrams and trigrams
//! - Batch analysis of many files, sequentially or on worker threads
//!
//! ```no_run
//! use rs_entropy_core::{AnalysisConfig, Analyzer, CorpusEntry};
//!
//! # fn main() -> rs_entropy_core::Result<()> {
//! let config = AnalysisConfig {
//! 	corpus: vec![CorpusEntry::new("data/越女剑.txt", Some("越女剑".into()))],
//! 	encoding: "gbk".into(),
//! 	..AnalysisConfig::default()
//! };
//! for outcome in Analyzer::new(config)?.run()? {
//! 	if let Ok(report) = outcome.result {
//! 		println!("{report}");
//! 	}
//! }
//! # Ok(())
//! # }
//! ```

/// Pipeline driver: one report per (file, granularity).
pub mod analysis;

/// Run configuration (corpus list, granularities, cleaning, workers).
pub mod config;

pub mod error;

/// File loading helpers (decoding, stopword lists, directory listing).
///
/// Only labelling and listing are exposed; reading goes through `Analyzer`.
pub mod io;

/// N-gram counting and entropy estimation.
pub mod model;

/// Text normalization and tokenization.
pub mod text;

pub use analysis::{Analyzer, Outcome};
pub use config::{AnalysisConfig, CorpusEntry, ErrorPolicy};
pub use error::{EntropyError, Result};
pub use model::report::EntropyReport;
pub use model::statistics::{ModelStatistics, Order};
pub use text::tokenize::{Granularity, Segmenter};
