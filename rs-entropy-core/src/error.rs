//! Error type shared by every stage of an analysis.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::statistics::Order;
use crate::text::tokenize::Granularity;

/// Result alias used throughout the crate.
pub type Result<T, E = EntropyError> = std::result::Result<T, E>;

/// Failures raised while loading, cleaning or measuring a corpus.
///
/// Every variant is local to a single (file, granularity) analysis except
/// `InvalidConfig`, `UnknownEncoding` and `Pattern`, which are detected before
/// any file is processed.
#[derive(Debug, Error)]
pub enum EntropyError {
	/// Filesystem error with the offending path.
	#[error("io error while processing {}: {source}", .path.display())]
	Io { source: std::io::Error, path: PathBuf },

	/// The file is not valid text in the configured encoding.
	#[error("{} is not valid {encoding} text", .path.display())]
	Decode { path: PathBuf, encoding: &'static str },

	/// The encoding label is not known to `encoding_rs`.
	#[error("unknown text encoding: {0}")]
	UnknownEncoding(String),

	/// The symbol-stripping pattern does not compile.
	#[error("invalid symbol pattern: {0}")]
	Pattern(#[from] regex::Error),

	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// Tokenization produced no tokens, so per-token averages are undefined.
	#[error("corpus is empty after normalization")]
	EmptyCorpus,

	/// The frequency table has no entries, so probabilities are undefined.
	#[error("{order} frequency table is empty")]
	EmptyTable { order: Order },

	/// An n-gram's prefix is absent from the next lower order table.
	#[error("{order} key has no matching prefix in the lower order table")]
	MissingPrefix { order: Order },

	/// Context wrapper naming the analysis a failure belongs to.
	#[error("analysis of '{label}' ({granularity}) failed: {source}")]
	Analysis {
		label: String,
		granularity: Granularity,
		#[source]
		source: Box<EntropyError>,
	},
}

impl EntropyError {
	/// Wraps an IO error, attaching the path it happened on.
	pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
		Self::Io { source, path: path.into() }
	}

	/// Attaches the label and granularity of the analysis that failed.
	pub fn in_analysis(self, label: &str, granularity: Granularity) -> Self {
		Self::Analysis {
			label: label.to_owned(),
			granularity,
			source: Box::new(self),
		}
	}
}

impl From<serde_json::Error> for EntropyError {
	fn from(err: serde_json::Error) -> Self {
		Self::InvalidConfig(err.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn io_message_shows_plain_path() {
		let err = EntropyError::io(std::io::Error::from(std::io::ErrorKind::NotFound), "missing.txt");
		let message = err.to_string();
		assert!(message.starts_with("io error while processing missing.txt: "), "{message}");
		assert!(!message.contains("Some("));
	}
}
