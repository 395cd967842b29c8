use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use encoding_rs::Encoding;
use log::{debug, error, info, warn};

use crate::config::{AnalysisConfig, CorpusEntry, ErrorPolicy};
use crate::error::{EntropyError, Result};
use crate::io::{read_corpus, read_stopwords, resolve_encoding};
use crate::model::ngram::NGramTables;
use crate::model::report::{CorpusSummary, EntropyReport};
use crate::text::normalize::Normalizer;
use crate::text::tokenize::{self, Granularity, JiebaSegmenter, Segmenter, Token};

/// Result of one (file, granularity) analysis.
#[derive(Debug)]
pub struct Outcome {
	pub label: String,
	pub path: PathBuf,
	pub granularity: Granularity,
	pub result: Result<EntropyReport>,
}

/// Runs the Normalize → Tokenize → Count → Estimate → Aggregate pipeline.
///
/// # Responsibilities
/// - Own the validated configuration, the normalizer and the word segmenter
/// - Analyze raw text or corpus files at a given granularity
/// - Schedule every configured (file, granularity) pair, sequentially or on
///   worker threads, and apply the error policy
///
/// # Notes
/// - Nothing is shared between analyses except the read-only normalizer and
///   segmenter, so workers need no locking.
pub struct Analyzer {
	config: AnalysisConfig,
	encoding: &'static Encoding,
	normalizer: Normalizer,
	segmenter: Box<dyn Segmenter>,
}

impl Analyzer {
	/// Validates `config`, loads the stopword list and prepares the Jieba segmenter.
	///
	/// # Errors
	/// - Any `validate` error
	/// - `Io` if the stopword file cannot be read
	pub fn new(config: AnalysisConfig) -> Result<Self> {
		config.validate()?;
		let encoding = resolve_encoding(&config.encoding)?;

		let stopwords = match &config.stopwords {
			Some(path) => {
				let stopwords = read_stopwords(path)?;
				if stopwords.is_empty() {
					warn!("stopword list {} is empty", path.display());
				}
				stopwords
			}
			None => Vec::new(),
		};
		let normalizer = Normalizer::new(config.footers.clone(), &config.symbol_pattern, stopwords)?;
		debug!("loaded {} stopwords", normalizer.stopword_count());

		let segmenter = Box::new(JiebaSegmenter::new(config.hmm));
		Ok(Self { config, encoding, normalizer, segmenter })
	}

	/// Replaces the word segmenter.
	pub fn with_segmenter(mut self, segmenter: Box<dyn Segmenter>) -> Self {
		self.segmenter = segmenter;
		self
	}

	pub fn config(&self) -> &AnalysisConfig {
		&self.config
	}

	/// Analyzes already loaded text.
	pub fn analyze_text(&self, label: &str, raw: &str, granularity: Granularity) -> Result<EntropyReport> {
		self.analyze(label, raw, granularity, Instant::now())
	}

	/// Reads and decodes `entry`, then analyzes it.
	pub fn analyze_file(&self, entry: &CorpusEntry, granularity: Granularity) -> Result<EntropyReport> {
		let begin = Instant::now();
		let raw = read_corpus(&entry.path, self.encoding)?;
		self.analyze(&entry.label(), &raw, granularity, begin)
	}

	fn analyze(&self, label: &str, raw: &str, granularity: Granularity, begin: Instant) -> Result<EntropyReport> {
		let text = self.normalizer.normalize(raw);
		match granularity {
			Granularity::Word => {
				let tokens = tokenize::words(&text, self.segmenter.as_ref());
				measure(label, granularity, &text, &tokens, begin)
			}
			Granularity::Character => {
				let tokens = tokenize::characters(&text);
				measure(label, granularity, &text, &tokens, begin)
			}
		}
	}

	/// Analyzes every configured (file, granularity) pair.
	///
	/// Pairs are scheduled granularity-major: every file at the first
	/// granularity, then every file at the next. Outcomes come back in that
	/// order whatever the number of workers.
	///
	/// # Errors
	/// With `ErrorPolicy::Abort`, returns the first failure in schedule order,
	/// wrapped with its label and granularity. With `ErrorPolicy::Skip`,
	/// failures are logged and returned inside their `Outcome`.
	pub fn run(&self) -> Result<Vec<Outcome>> {
		let jobs: Vec<(&CorpusEntry, Granularity)> = self
			.config
			.granularities
			.iter()
			.flat_map(|granularity| self.config.corpus.iter().map(move |entry| (entry, *granularity)))
			.collect();

		let workers = self.config.worker_count().min(jobs.len()).max(1);
		info!("analyzing {} file(s) on {} worker(s)", jobs.len(), workers);

		if workers == 1 {
			return self.run_sequential(&jobs);
		}

		let mut results = thread::scope(|scope| {
			let (tx, rx) = mpsc::channel();
			for worker in 0..workers {
				let tx = tx.clone();
				let jobs = &jobs;
				scope.spawn(move || {
					for (index, (entry, granularity)) in jobs.iter().enumerate().skip(worker).step_by(workers) {
						let result = self.analyze_file(entry, *granularity);
						if tx.send((index, result)).is_err() {
							break;
						}
					}
				});
			}
			drop(tx);
			rx.iter().collect::<Vec<_>>()
		});

		results.sort_by_key(|(index, _)| *index);

		let mut outcomes = Vec::with_capacity(jobs.len());
		for (index, result) in results {
			let (entry, granularity) = jobs[index];
			outcomes.push(self.settle(entry, granularity, result)?);
		}
		Ok(outcomes)
	}

	fn run_sequential(&self, jobs: &[(&CorpusEntry, Granularity)]) -> Result<Vec<Outcome>> {
		let mut outcomes = Vec::with_capacity(jobs.len());
		for (entry, granularity) in jobs {
			let result = self.analyze_file(entry, *granularity);
			outcomes.push(self.settle(entry, *granularity, result)?);
		}
		Ok(outcomes)
	}

	/// Logs a finished analysis and applies the error policy to it.
	fn settle(&self, entry: &CorpusEntry, granularity: Granularity, result: Result<EntropyReport>) -> Result<Outcome> {
		let label = entry.label();
		match &result {
			Ok(report) => info!(
				"analyzed '{}' ({}): {} tokens, average entropy {:.4}",
				label, granularity, report.summary.tokens, report.avg_entropy
			),
			Err(err) if self.config.on_error == ErrorPolicy::Skip => {
				error!("skipping '{}' ({}): {}", label, granularity, err);
			}
			Err(_) => (),
		}

		match result {
			Err(err) if self.config.on_error == ErrorPolicy::Abort => Err(err.in_analysis(&label, granularity)),
			result => Ok(Outcome {
				label,
				path: entry.path.clone(),
				granularity,
				result,
			}),
		}
	}
}

/// Counts, estimates and aggregates one token sequence.
fn measure<T: Token>(
	label: &str,
	granularity: Granularity,
	text: &str,
	tokens: &[T],
	begin: Instant,
) -> Result<EntropyReport> {
	let summary = CorpusSummary::new(text.chars().count(), tokens.len())?;
	let tables = NGramTables::count(tokens);
	let preprocessing = begin.elapsed();
	debug!("'{}' ({}): preprocessing took {:?}", label, granularity, preprocessing);

	EntropyReport::build(label, granularity, summary, &tables, preprocessing)
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Splits on spaces so tests do not depend on a dictionary.
	struct SpaceSegmenter;

	impl Segmenter for SpaceSegmenter {
		fn segment<'t>(&self, text: &'t str) -> Vec<&'t str> {
			text.split(' ').filter(|w| !w.is_empty()).collect()
		}
	}

	fn analyzer() -> Analyzer {
		let config = AnalysisConfig {
			corpus: vec![CorpusEntry::new("unused.txt", None)],
			symbol_pattern: "[0-9]+".into(),
			workers: 1,
			..AnalysisConfig::default()
		};
		Analyzer::new(config).expect("analyzer").with_segmenter(Box::new(SpaceSegmenter))
	}

	#[test]
	fn character_analysis_counts_cleaned_text() {
		let report = analyzer()
			.analyze_text("t", "ab1a\nb", Granularity::Character)
			.expect("report");

		assert_eq!(report.summary.characters, 4);
		assert_eq!(report.unigram.total, 4);
		assert_eq!(report.bigram.total, 3);
		assert_eq!(report.trigram.total, 2);
	}

	#[test]
	fn word_analysis_uses_segmenter() {
		let report = analyzer()
			.analyze_text("t", "a a b", Granularity::Word)
			.expect("report");

		assert_eq!(report.granularity, Granularity::Word);
		assert_eq!(report.unigram.total, 3);
		assert_eq!(report.unigram.distinct, 2);
		assert_eq!(report.unigram.entropy, 0.9183);
		// Spaces survive normalization and count as characters
		assert_eq!(report.summary.characters, 5);
	}

	#[test]
	fn empty_text_is_degenerate() {
		let err = analyzer().analyze_text("t", "123\n", Granularity::Character).unwrap_err();
		assert!(matches!(err, EntropyError::EmptyCorpus));
	}

	#[test]
	fn abort_policy_wraps_context() {
		let config = AnalysisConfig {
			corpus: vec![CorpusEntry::new("/no/such/file.txt", Some("missing".into()))],
			granularities: vec![Granularity::Character],
			on_error: ErrorPolicy::Abort,
			workers: 1,
			..AnalysisConfig::default()
		};
		let err = Analyzer::new(config).expect("analyzer").run().unwrap_err();

		match err {
			EntropyError::Analysis { label, granularity, source } => {
				assert_eq!(label, "missing");
				assert_eq!(granularity, Granularity::Character);
				assert!(matches!(*source, EntropyError::Io { .. }));
			}
			other => panic!("unexpected error: {other}"),
		}
	}
}
