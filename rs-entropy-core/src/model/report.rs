use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EntropyError, Result};
use crate::model::ngram::NGramTables;
use crate::model::statistics::{ModelStatistics, conditional_statistics, round4, unigram_statistics};
use crate::text::tokenize::{Granularity, Token};

/// Corpus-level counts computed from the cleaned text and the token stream.
///
/// These are independent of the frequency tables and are expected to agree
/// with the unigram record (`tokens == unigram.total`, same average length).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CorpusSummary {
	/// Unicode scalar values in the cleaned text.
	pub characters: usize,
	pub tokens: usize,
	/// `characters / tokens`, rounded to 4 decimals.
	pub avg_token_length: f64,
}

impl CorpusSummary {
	/// # Errors
	/// Returns `EmptyCorpus` if there are no tokens.
	pub fn new(characters: usize, tokens: usize) -> Result<Self> {
		if tokens == 0 {
			return Err(EntropyError::EmptyCorpus);
		}
		Ok(Self {
			characters,
			tokens,
			avg_token_length: round4(characters as f64 / tokens as f64),
		})
	}
}

/// Result of analyzing one corpus file at one granularity.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EntropyReport {
	pub label: String,
	pub granularity: Granularity,
	pub summary: CorpusSummary,
	/// Time spent reading, cleaning, tokenizing and counting.
	pub preprocessing: Duration,
	pub unigram: ModelStatistics,
	pub bigram: ModelStatistics,
	pub trigram: ModelStatistics,
	/// Unrounded mean of the three entropies.
	pub avg_entropy: f64,
}

impl EntropyReport {
	/// Estimates all three orders from `tables` and aggregates them with `summary`.
	///
	/// # Errors
	/// Propagates the first estimator error (`EmptyTable`, `MissingPrefix`).
	pub fn build<T: Token>(
		label: &str,
		granularity: Granularity,
		summary: CorpusSummary,
		tables: &NGramTables<'_, T>,
		preprocessing: Duration,
	) -> Result<Self> {
		let unigram = unigram_statistics(&tables.unigrams, summary.characters)?;
		let bigram = conditional_statistics(&tables.bigrams, &tables.unigrams)?;
		let trigram = conditional_statistics(&tables.trigrams, &tables.bigrams)?;

		let avg_entropy = mean_entropy([&unigram, &bigram, &trigram]);
		Ok(Self {
			label: label.to_owned(),
			granularity,
			summary,
			preprocessing,
			unigram,
			bigram,
			trigram,
			avg_entropy,
		})
	}

	pub fn models(&self) -> [&ModelStatistics; 3] {
		[&self.unigram, &self.bigram, &self.trigram]
	}

	/// Compares two reports ignoring every timing field.
	pub fn same_measurements(&self, other: &Self) -> bool {
		self.label == other.label
			&& self.granularity == other.granularity
			&& self.summary == other.summary
			&& self.avg_entropy == other.avg_entropy
			&& self
				.models()
				.iter()
				.zip(other.models())
				.all(|(a, b)| a.same_measurements(b))
	}
}

/// Arithmetic mean of the per-order entropies.
pub fn mean_entropy(models: [&ModelStatistics; 3]) -> f64 {
	models.iter().map(|m| m.entropy).sum::<f64>() / models.len() as f64
}

impl fmt::Display for EntropyReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "----------------------------------------------------------")?;
		writeln!(f, "*** {} (unit: {})", self.label, self.granularity)?;
		writeln!(f, "corpus characters:      {}", self.summary.characters)?;
		writeln!(f, "{:<24}{}", format!("{} tokens:", self.granularity), self.summary.tokens)?;
		writeln!(f, "average token length:   {:.4}", self.summary.avg_token_length)?;
		writeln!(f, "preprocessing time (s): {:.4}", self.preprocessing.as_secs_f64())?;
		writeln!(
			f,
			"{:<14}{:>10} | {:>10} | {:>8} | {:>11}",
			"", "distinct", "avg length", "entropy", "time (s)"
		)?;
		for model in self.models() {
			writeln!(
				f,
				"{:<14}{:>10} | {:>10.4} | {:>8.4} | {:>11.4}",
				format!("{}-gram:", model.order.n()),
				model.distinct,
				model.avg_length,
				model.entropy,
				model.duration.as_secs_f64()
			)?;
		}
		write!(f, "average entropy: {:.4}", self.avg_entropy)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::statistics::Order;

	fn report_for(tokens: &[char]) -> Result<EntropyReport> {
		let summary = CorpusSummary::new(tokens.len(), tokens.len())?;
		let tables = NGramTables::count(tokens);
		EntropyReport::build("test", Granularity::Character, summary, &tables, Duration::ZERO)
	}

	#[test]
	fn avg_entropy_is_mean_of_orders() {
		let tokens: Vec<char> = "风吹雪风吹沙风吹雪".chars().collect();
		let report = report_for(&tokens).expect("report");

		let expected = (report.unigram.entropy + report.bigram.entropy + report.trigram.entropy) / 3.0;
		assert_eq!(round4(report.avg_entropy), round4(expected));
	}

	#[test]
	fn summary_matches_unigram() {
		let tokens: Vec<char> = "倚天屠龙记倚天".chars().collect();
		let report = report_for(&tokens).expect("report");

		assert_eq!(report.summary.tokens, report.unigram.total);
		assert_eq!(report.summary.avg_token_length, report.unigram.avg_length);
		assert_eq!(report.summary.characters, 7);
	}

	#[test]
	fn short_sequences_are_degenerate() {
		let err = report_for(&['a', 'b']).unwrap_err();
		assert!(matches!(err, EntropyError::EmptyTable { order: Order::Trigram }));

		let err = report_for(&[]).unwrap_err();
		assert!(matches!(err, EntropyError::EmptyCorpus));
	}

	#[test]
	fn empty_summary_is_an_error() {
		assert!(matches!(CorpusSummary::new(10, 0), Err(EntropyError::EmptyCorpus)));
	}

	#[test]
	fn display_lists_every_order() {
		let tokens: Vec<char> = "鸳鸯刀鸳鸯".chars().collect();
		let text = report_for(&tokens).expect("report").to_string();

		assert!(text.contains("*** test (unit: character)"));
		assert!(text.contains("1-gram:"));
		assert!(text.contains("2-gram:"));
		assert!(text.contains("3-gram:"));
		assert!(text.contains("average entropy:"));
	}

	#[test]
	fn reports_are_deterministic() {
		let tokens: Vec<char> = "越女剑越女越剑".chars().collect();
		let first = report_for(&tokens).expect("first");
		let second = report_for(&tokens).expect("second");

		assert!(first.same_measurements(&second));
	}
}
