use log::debug;
use regex::Regex;

use crate::error::Result;

/// Footer appended to every file of the reference novel corpus.
pub const DEFAULT_FOOTER: &str = "本书来自www.cr173.com免费txt小说下载站\n更多更新免费电子书请关注www.cr173.com";

/// ASCII letters and digits plus Latin and CJK punctuation.
pub const DEFAULT_SYMBOL_PATTERN: &str =
	r##"[a-zA-Z0-9’!"#$%&'()*+,\-./:：;<=>?@，。★、…【】《》？“”‘’！\[\]\^_`{|}~「」『』（）]+"##;

/// Characters dropped after symbol stripping: line feeds and the ideographic space.
const LAYOUT_CHARS: [char; 2] = ['\n', '\u{3000}'];

/// Cleans raw corpus text before tokenization.
///
/// Steps run in a fixed order:
/// 1. `\r\n` and lone `\r` line endings become `\n`
/// 2. boilerplate footers are removed
/// 3. every match of the symbol pattern is removed
/// 4. line feeds and ideographic spaces are removed
/// 5. each stopword is removed everywhere, in list order
///
/// # Notes
/// - Stopwords are removed sequentially, so removing one stopword may join
///   text that then matches a later one.
#[derive(Debug, Clone)]
pub struct Normalizer {
	footers: Vec<String>,
	symbols: Regex,
	stopwords: Vec<String>,
}

impl Normalizer {
	/// Builds a normalizer from its footers, symbol pattern and stopwords.
	///
	/// # Errors
	/// Returns `Pattern` if `symbol_pattern` is not a valid regular expression.
	pub fn new(footers: Vec<String>, symbol_pattern: &str, stopwords: Vec<String>) -> Result<Self> {
		let stopwords = stopwords.into_iter().filter(|s| !s.is_empty()).collect();
		Ok(Self {
			footers,
			symbols: Regex::new(symbol_pattern)?,
			stopwords,
		})
	}

	/// Number of stopwords that will be removed.
	pub fn stopword_count(&self) -> usize {
		self.stopwords.len()
	}

	/// Returns the cleaned version of `raw`.
	pub fn normalize(&self, raw: &str) -> String {
		let mut text = fold_line_endings(raw);
		for footer in &self.footers {
			if !footer.is_empty() {
				text = text.replace(footer.as_str(), "");
			}
		}

		text = self.symbols.replace_all(&text, "").into_owned();
		text.retain(|c| !LAYOUT_CHARS.contains(&c));

		for stopword in &self.stopwords {
			if text.contains(stopword.as_str()) {
				text = text.replace(stopword.as_str(), "");
			}
		}

		debug!(
			"normalized {} chars into {} chars",
			raw.chars().count(),
			text.chars().count()
		);
		text
	}
}

/// Rewrites CRLF and CR line endings as LF so multi-line footers match.
fn fold_line_endings(raw: &str) -> String {
	if raw.contains('\r') {
		raw.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		raw.to_owned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn reference_normalizer() -> Normalizer {
		Normalizer::new(vec![DEFAULT_FOOTER.to_owned()], DEFAULT_SYMBOL_PATTERN, Vec::new()).expect("normalizer")
	}

	#[test]
	fn default_pattern_compiles() {
		assert!(Regex::new(DEFAULT_SYMBOL_PATTERN).is_ok());
	}

	#[test]
	fn strips_footer_symbols_and_layout() {
		let normalizer = reference_normalizer();
		let raw = format!("第一回\n　　李文秀，“白马”！abc123[x]\r\n{}", DEFAULT_FOOTER);
		assert_eq!(normalizer.normalize(&raw), "第一回李文秀白马");
	}

	#[test]
	fn strips_every_ascii_symbol() {
		let normalizer = reference_normalizer();
		let raw = "中!\"#$%&'()*+,-./:;<=>?@[]^_`{|}~文";
		assert_eq!(normalizer.normalize(raw), "中文");
	}

	#[test]
	fn keeps_backslash() {
		let normalizer = reference_normalizer();
		assert_eq!(normalizer.normalize("中\\文[x]"), "中\\文");
	}

	#[test]
	fn strips_footer_with_crlf_line_endings() {
		let normalizer = reference_normalizer();
		let raw = "正文\r\n本书来自www.cr173.com免费txt小说下载站\r\n更多更新免费电子书请关注www.cr173.com";
		assert_eq!(normalizer.normalize(raw), "正文");

		let raw = "正文\r本书来自www.cr173.com免费txt小说下载站\r更多更新免费电子书请关注www.cr173.com\r";
		assert_eq!(normalizer.normalize(raw), "正文");
	}

	#[test]
	fn removes_stopwords_in_order() {
		let normalizer = Normalizer::new(
			Vec::new(),
			DEFAULT_SYMBOL_PATTERN,
			vec!["的".to_owned(), String::new(), "他们".to_owned()],
		)
		.expect("normalizer");

		assert_eq!(normalizer.stopword_count(), 2);
		// Removing "的" joins "他" and "们"
		assert_eq!(normalizer.normalize("他的们说我的马"), "说我马");
	}

	#[test]
	fn invalid_pattern_is_an_error() {
		assert!(Normalizer::new(Vec::new(), "[unclosed", Vec::new()).is_err());
	}
}
