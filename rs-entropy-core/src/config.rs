//! Configuration of an analysis run.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{EntropyError, Result};
use crate::io;
use crate::text::normalize::{DEFAULT_FOOTER, DEFAULT_SYMBOL_PATTERN};
use crate::text::tokenize::Granularity;

/// One corpus file and the name it is reported under.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CorpusEntry {
	pub path: PathBuf,
	/// Display name; the file stem is used when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
}

impl CorpusEntry {
	pub fn new<P: Into<PathBuf>>(path: P, label: Option<String>) -> Self {
		Self { path: path.into(), label }
	}

	/// Returns the display name of the entry.
	pub fn label(&self) -> String {
		match &self.label {
			Some(label) => label.clone(),
			None => io::get_filename(&self.path).unwrap_or_else(|_| self.path.display().to_string()),
		}
	}
}

/// Parses `path` or `path=label`.
impl FromStr for CorpusEntry {
	type Err = EntropyError;

	fn from_str(s: &str) -> Result<Self> {
		let (path, label) = match s.split_once('=') {
			Some((path, label)) => (path.trim(), Some(label.trim())),
			None => (s.trim(), None),
		};
		if path.is_empty() {
			return Err(EntropyError::InvalidConfig(format!("corpus entry '{s}' has no path")));
		}
		let label = label.filter(|l| !l.is_empty()).map(str::to_owned);
		Ok(Self::new(path, label))
	}
}

/// What to do when one analysis fails.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
	/// Log the failure and continue with the next analysis.
	#[default]
	Skip,
	/// Stop the run at the first failure.
	Abort,
}

/// Settings for a batch of analyses.
///
/// Defaults reproduce the reference novel corpus setup: both granularities,
/// the corpus site footer, Latin and CJK punctuation stripping and HMM word
/// discovery.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
	/// Files to analyze, reported in this order.
	pub corpus: Vec<CorpusEntry>,
	/// Granularities to analyze every file at; all files run at the first before the second.
	pub granularities: Vec<Granularity>,
	/// UTF-8 stopword list, one entry per line.
	pub stopwords: Option<PathBuf>,
	/// WHATWG encoding label of the corpus files.
	pub encoding: String,
	/// Boilerplate strings removed verbatim before anything else.
	pub footers: Vec<String>,
	/// Regular expression whose matches are stripped from the text.
	pub symbol_pattern: String,
	/// Let the word segmenter discover words missing from its dictionary.
	pub hmm: bool,
	/// Worker threads; 0 uses one per CPU.
	pub workers: usize,
	pub on_error: ErrorPolicy,
}

impl Default for AnalysisConfig {
	fn default() -> Self {
		Self {
			corpus: Vec::new(),
			granularities: Granularity::ALL.to_vec(),
			stopwords: None,
			encoding: "utf-8".to_owned(),
			footers: vec![DEFAULT_FOOTER.to_owned()],
			symbol_pattern: DEFAULT_SYMBOL_PATTERN.to_owned(),
			hmm: true,
			workers: 0,
			on_error: ErrorPolicy::Skip,
		}
	}
}

impl AnalysisConfig {
	/// Loads a configuration from a JSON file; missing fields take their defaults.
	///
	/// Relative corpus and stopword paths are resolved against the
	/// configuration file's directory.
	pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		let contents = fs::read_to_string(path).map_err(|err| EntropyError::io(err, path))?;
		let mut config: Self = serde_json::from_str(&contents)?;

		if let Some(base) = path.parent() {
			for entry in &mut config.corpus {
				if entry.path.is_relative() {
					entry.path = base.join(&entry.path);
				}
			}
			if let Some(stopwords) = config.stopwords.as_mut() {
				if stopwords.is_relative() {
					*stopwords = base.join(&*stopwords);
				}
			}
		}
		Ok(config)
	}

	/// Number of worker threads the run will use.
	pub fn worker_count(&self) -> usize {
		if self.workers == 0 { num_cpus::get() } else { self.workers }
	}

	/// Validates the configuration before any file is read.
	pub fn validate(&self) -> Result<()> {
		if self.corpus.is_empty() {
			return Err(EntropyError::InvalidConfig("corpus list is empty".into()));
		}
		if self.granularities.is_empty() {
			return Err(EntropyError::InvalidConfig("at least one granularity is required".into()));
		}
		if let Some(entry) = self.corpus.iter().find(|e| e.path.as_os_str().is_empty()) {
			return Err(EntropyError::InvalidConfig(format!(
				"corpus entry '{}' has no path",
				entry.label()
			)));
		}
		io::resolve_encoding(&self.encoding)?;
		Regex::new(&self.symbol_pattern)?;
		Ok(())
	}
}
