use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{EntropyError, Result};
use crate::model::ngram::{ConditionalKey, FrequencyTable};

/// N-gram order measured by a `ModelStatistics` record.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Order {
	Unigram,
	Bigram,
	Trigram,
}

impl Order {
	/// Number of tokens in a key of this order.
	pub fn n(&self) -> usize {
		match self {
			Order::Unigram => 1,
			Order::Bigram => 2,
			Order::Trigram => 3,
		}
	}

	pub fn name(&self) -> &'static str {
		match self {
			Order::Unigram => "unigram",
			Order::Bigram => "bigram",
			Order::Trigram => "trigram",
		}
	}
}

impl fmt::Display for Order {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Summary of one frequency table.
///
/// `avg_length` and `entropy` are rounded to 4 decimals. `duration` is the
/// wall-clock time spent computing the record and is informational only.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelStatistics {
	pub order: Order,
	/// Sum of all counts.
	pub total: usize,
	/// Number of distinct keys.
	pub distinct: usize,
	pub avg_length: f64,
	/// Entropy in bits; conditional on the prefix for orders 2 and 3.
	pub entropy: f64,
	pub duration: Duration,
}

impl ModelStatistics {
	/// Compares every field except `duration`.
	pub fn same_measurements(&self, other: &Self) -> bool {
		self.order == other.order
			&& self.total == other.total
			&& self.distinct == other.distinct
			&& self.avg_length == other.avg_length
			&& self.entropy == other.entropy
	}
}

/// Rounds to 4 decimal digits.
pub fn round4(value: f64) -> f64 {
	(value * 10_000.0).round() / 10_000.0
}

/// Computes the unigram record: Shannon entropy `H = -Σ p·log2(p)`.
///
/// The average length is `corpus_chars / total`, a corpus-level ratio
/// rather than the mean length of the keys.
///
/// # Errors
/// Returns `EmptyTable` if the table holds no occurrences.
pub fn unigram_statistics<K: Eq + Hash>(table: &FrequencyTable<K>, corpus_chars: usize) -> Result<ModelStatistics> {
	let begin = Instant::now();

	let total = table.total();
	if total == 0 {
		return Err(EntropyError::EmptyTable { order: Order::Unigram });
	}
	let total_f = total as f64;

	let entropy = table.iter().fold(0.0, |entropy, (_, count)| {
		let p = count as f64 / total_f;
		entropy - p * p.log2()
	});

	Ok(ModelStatistics {
		order: Order::Unigram,
		total,
		distinct: table.distinct(),
		avg_length: round4(corpus_chars as f64 / total_f),
		entropy: round4(entropy),
		duration: begin.elapsed(),
	})
}

/// Computes a bigram or trigram record: conditional entropy
/// `H = -Σ P(k)·log2(P(k | prefix(k)))`.
///
/// - `P(k)` is `count(k) / total` over `table`
/// - `P(k | prefix)` is `count(k) / count(prefix)` with the prefix looked up in `lower`
/// - the average length is the unweighted mean, over distinct keys, of the
///   summed token lengths of each key
///
/// # Errors
/// - `EmptyTable` if `table` holds no occurrences
/// - `MissingPrefix` if a prefix is absent from `lower`, which only happens
///   when the two tables were not counted from the same sequence
pub fn conditional_statistics<K: ConditionalKey>(
	table: &FrequencyTable<K>,
	lower: &FrequencyTable<K::Prefix>,
) -> Result<ModelStatistics> {
	let begin = Instant::now();

	let total = table.total();
	if total == 0 {
		return Err(EntropyError::EmptyTable { order: K::ORDER });
	}
	let total_f = total as f64;

	let mut entropy = 0.0;
	let mut key_chars = 0usize;
	for (key, count) in table.iter() {
		let prefix_count = lower
			.get(key.prefix())
			.filter(|c| *c > 0)
			.ok_or(EntropyError::MissingPrefix { order: K::ORDER })?;

		let joint = count as f64 / total_f;
		let conditional = count as f64 / prefix_count as f64;
		entropy -= joint * conditional.log2();
		key_chars += key.char_len();
	}

	let distinct = table.distinct();
	Ok(ModelStatistics {
		order: K::ORDER,
		total,
		distinct,
		avg_length: round4(key_chars as f64 / distinct as f64),
		entropy: round4(entropy),
		duration: begin.elapsed(),
	})
}
