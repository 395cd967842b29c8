use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::model::statistics::Order;
use crate::text::tokenize::Token;

/// Occurrence counts keyed by n-gram.
///
/// # Invariants
/// - Every stored count is >= 1
/// - `total()` equals the number of `add` calls
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyTable<K: Eq + Hash> {
	counts: HashMap<K, usize>,
}

impl<K: Eq + Hash> FrequencyTable<K> {
	pub fn new() -> Self {
		Self { counts: HashMap::new() }
	}

	/// Records one occurrence of `key`.
	pub fn add(&mut self, key: K) {
		*self.counts.entry(key).or_insert(0) += 1;
	}

	/// Returns the count of `key`, or `None` if it was never seen.
	pub fn get<Q>(&self, key: &Q) -> Option<usize>
	where
		K: Borrow<Q>,
		Q: Eq + Hash + ?Sized,
	{
		self.counts.get(key).copied()
	}

	/// Sum of all counts.
	pub fn total(&self) -> usize {
		self.counts.values().sum()
	}

	/// Number of distinct keys.
	pub fn distinct(&self) -> usize {
		self.counts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	/// Iterates over `(key, count)` pairs in arbitrary order.
	pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
		self.counts.iter().map(|(key, count)| (key, *count))
	}
}

impl<K: Eq + Hash> Default for FrequencyTable<K> {
	fn default() -> Self {
		Self::new()
	}
}

/// Two consecutive tokens.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Bigram<'a, T> {
	pub first: &'a T,
	pub second: &'a T,
}

impl<T> Clone for Bigram<'_, T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for Bigram<'_, T> {}

/// Three consecutive tokens, split into the leading bigram and the token that follows it.
///
/// Keeping the prefix as a `Bigram` lets the trigram table be looked up
/// directly against the bigram table when computing conditional probabilities.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Trigram<'a, T> {
	pub prefix: Bigram<'a, T>,
	pub next: &'a T,
}

impl<T> Clone for Trigram<'_, T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for Trigram<'_, T> {}

/// An n-gram key of order 2 or more, with a prefix in the next lower order table.
pub trait ConditionalKey: Eq + Hash {
	/// Key type of the next lower order table.
	type Prefix: Eq + Hash;

	const ORDER: Order;

	/// The leading `n - 1` tokens.
	fn prefix(&self) -> &Self::Prefix;

	/// Summed length of every token in the key.
	fn char_len(&self) -> usize;
}

impl<'a, T: Token> ConditionalKey for Bigram<'a, T> {
	type Prefix = &'a T;

	const ORDER: Order = Order::Bigram;

	fn prefix(&self) -> &&'a T {
		&self.first
	}

	fn char_len(&self) -> usize {
		self.first.char_len() + self.second.char_len()
	}
}

impl<'a, T: Token> ConditionalKey for Trigram<'a, T> {
	type Prefix = Bigram<'a, T>;

	const ORDER: Order = Order::Trigram;

	fn prefix(&self) -> &Bigram<'a, T> {
		&self.prefix
	}

	fn char_len(&self) -> usize {
		self.prefix.char_len() + self.next.char_len()
	}
}

/// Unigram, bigram and trigram tables of one token sequence.
///
/// Keys borrow the tokens, so the tables cannot outlive the sequence
/// they were counted from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NGramTables<'a, T: Token> {
	pub unigrams: FrequencyTable<&'a T>,
	pub bigrams: FrequencyTable<Bigram<'a, T>>,
	pub trigrams: FrequencyTable<Trigram<'a, T>>,
}

impl<'a, T: Token> NGramTables<'a, T> {
	/// Counts every unigram, bigram and trigram of `tokens`.
	///
	/// # Notes
	/// - A sequence of length `L` yields `L`, `L - 1` and `L - 2` occurrences
	/// - Sequences shorter than an order leave that table empty
	pub fn count(tokens: &'a [T]) -> Self {
		let mut unigrams = FrequencyTable::new();
		let mut bigrams = FrequencyTable::new();
		let mut trigrams = FrequencyTable::new();

		for token in tokens {
			unigrams.add(token);
		}
		for pair in tokens.windows(2) {
			bigrams.add(Bigram { first: &pair[0], second: &pair[1] });
		}
		for triple in tokens.windows(3) {
			trigrams.add(Trigram {
				prefix: Bigram { first: &triple[0], second: &triple[1] },
				next: &triple[2],
			});
		}

		log::debug!(
			"counted {} unigrams, {} bigrams, {} trigrams",
			unigrams.distinct(),
			bigrams.distinct(),
			trigrams.distinct()
		);
		Self { unigrams, bigrams, trigrams }
	}
}
