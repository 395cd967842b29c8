use std::fmt;
use std::hash::Hash;

use jieba_rs::Jieba;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// Unit of tokenization.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
	/// Segmented words.
	Word,
	/// Individual Unicode scalar values.
	Character,
}

impl Granularity {
	/// Both granularities, in the order a run processes them.
	pub const ALL: [Granularity; 2] = [Granularity::Word, Granularity::Character];

	pub fn name(&self) -> &'static str {
		match self {
			Granularity::Word => "word",
			Granularity::Character => "character",
		}
	}
}

impl fmt::Display for Granularity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A token that can appear in an n-gram.
///
/// Tokens are compared by equality only. `char_len` is the token length in
/// Unicode scalar values, used for average key lengths.
pub trait Token: Eq + Hash + fmt::Debug {
	fn char_len(&self) -> usize;
}

impl Token for char {
	fn char_len(&self) -> usize {
		1
	}
}

impl Token for &str {
	fn char_len(&self) -> usize {
		self.chars().count()
	}
}

/// Splits unsegmented text into words.
///
/// Implementations must return slices of `text` that, concatenated, cover it
/// in order. Segmenters are shared between worker threads.
pub trait Segmenter: Send + Sync {
	fn segment<'t>(&self, text: &'t str) -> Vec<&'t str>;
}

/// Chinese word segmentation backed by `jieba_rs`.
///
/// The dictionary is loaded on first use, so a run that only needs
/// characters never pays for it.
pub struct JiebaSegmenter {
	/// Discover words missing from the dictionary with the HMM model.
	hmm: bool,
	jieba: OnceCell<Jieba>,
}

impl JiebaSegmenter {
	pub fn new(hmm: bool) -> Self {
		Self { hmm, jieba: OnceCell::new() }
	}
}

impl Segmenter for JiebaSegmenter {
	fn segment<'t>(&self, text: &'t str) -> Vec<&'t str> {
		let jieba = self.jieba.get_or_init(|| {
			log::debug!("loading jieba dictionary");
			Jieba::new()
		});
		jieba.cut(text, self.hmm)
	}
}

/// Splits `text` into characters.
pub fn characters(text: &str) -> Vec<char> {
	text.chars().collect()
}

/// Splits `text` into words with `segmenter`.
pub fn words<'t>(text: &'t str, segmenter: &dyn Segmenter) -> Vec<&'t str> {
	segmenter.segment(text)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn characters_are_scalar_values() {
		assert_eq!(characters("白马a"), vec!['白', '马', 'a']);
		assert!(characters("").is_empty());
	}

	#[test]
	fn token_lengths_count_scalar_values() {
		assert_eq!('马'.char_len(), 1);
		assert_eq!("白马".char_len(), 2);
	}

	#[test]
	fn jieba_covers_input() {
		let segmenter = JiebaSegmenter::new(true);
		let text = "李文秀骑着白马走进了大漠";
		let tokens = words(text, &segmenter);

		assert!(!tokens.is_empty());
		assert!(tokens.len() < text.chars().count());
		assert_eq!(tokens.concat(), text);
	}

	#[test]
	fn granularity_serializes_lowercase() {
		assert_eq!(serde_json::to_string(&Granularity::Character).unwrap(), "\"character\"");
		assert_eq!(serde_json::from_str::<Granularity>("\"word\"").unwrap(), Granularity::Word);
	}
}
