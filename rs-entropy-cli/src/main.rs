use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use env_logger::Env;
use log::{LevelFilter, info, warn};
use rs_entropy_core::io::list_files;
use rs_entropy_core::{AnalysisConfig, Analyzer, CorpusEntry, ErrorPolicy, Granularity, Outcome};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(author, version, about = "Unigram, bigram and trigram entropy of text corpora", long_about = None)]
struct Cli {
	/// Increase verbosity (-v, -vv)
	#[arg(short = 'v', long, global = true, action = ArgAction::Count)]
	verbose: u8,

	/// Decrease verbosity (-q, -qq)
	#[arg(short = 'q', long, global = true, action = ArgAction::Count)]
	quiet: u8,

	/// Corpus files, as PATH or PATH=LABEL
	#[arg(value_name = "INPUT")]
	inputs: Vec<CorpusEntry>,

	/// JSON configuration file; flags override its values
	#[arg(short, long, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Add every file of a directory with the given extension
	#[arg(long, value_name = "DIR")]
	dir: Option<PathBuf>,

	/// Extension of the files picked up by --dir
	#[arg(long, value_name = "EXT", default_value = "txt")]
	extension: String,

	/// Tokenization unit
	#[arg(short, long, value_enum)]
	granularity: Option<Unit>,

	/// Stopword list, one entry per line
	#[arg(long, value_name = "FILE")]
	stopwords: Option<PathBuf>,

	/// Encoding of the corpus files (utf-8, gbk, big5...)
	#[arg(long, value_name = "LABEL")]
	encoding: Option<String>,

	/// Boilerplate removed from every file (repeat flag); replaces the default footer
	#[arg(long = "footer", value_name = "TEXT")]
	footers: Vec<String>,

	/// Regular expression of the symbols to strip
	#[arg(long, value_name = "REGEX")]
	pattern: Option<String>,

	/// Disable HMM discovery of unknown words during segmentation
	#[arg(long)]
	no_hmm: bool,

	/// Worker threads (0 = one per CPU)
	#[arg(short = 'j', long, value_name = "N")]
	workers: Option<usize>,

	/// Stop at the first failed analysis instead of skipping it
	#[arg(long)]
	fail_fast: bool,

	/// Emit one JSON object per analysis instead of text reports
	#[arg(long)]
	json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Unit {
	Word,
	Character,
	Both,
}

impl Unit {
	fn granularities(self) -> Vec<Granularity> {
		match self {
			Unit::Word => vec![Granularity::Word],
			Unit::Character => vec![Granularity::Character],
			Unit::Both => Granularity::ALL.to_vec(),
		}
	}
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	init_logging(cli.verbose, cli.quiet);

	let json = cli.json;
	let config = build_config(cli)?;
	let analyzer = Analyzer::new(config).context("invalid analysis configuration")?;
	let outcomes = analyzer.run().context("analysis aborted")?;

	if json {
		print_json(&outcomes)?;
	} else {
		print_text(&outcomes);
	}

	let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
	if failed > 0 {
		warn!("{} of {} analyses failed", failed, outcomes.len());
	}
	Ok(())
}

fn init_logging(verbose: u8, quiet: u8) {
	let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
	builder.format_timestamp_millis();
	if let Some(level) = flag_level(verbose, quiet, std::env::var_os("RUST_LOG").is_some()) {
		builder.filter_level(level);
	}
	let _ = builder.try_init();
}

/// Level selected by `-v`/`-q`, or `None` when `RUST_LOG` should decide.
fn flag_level(verbose: u8, quiet: u8, rust_log_set: bool) -> Option<LevelFilter> {
	if rust_log_set {
		return None;
	}
	let level = if quiet > 0 {
		match quiet {
			1 => LevelFilter::Warn,
			_ => LevelFilter::Error,
		}
	} else {
		match verbose {
			0 => LevelFilter::Info,
			1 => LevelFilter::Debug,
			_ => LevelFilter::Trace,
		}
	};
	Some(level)
}

/// Merges the configuration file, directory listing and flags into one configuration.
fn build_config(cli: Cli) -> Result<AnalysisConfig> {
	let mut config = match &cli.config {
		Some(path) => AnalysisConfig::load_from_file(path)
			.with_context(|| format!("failed to load configuration {}", path.display()))?,
		None => AnalysisConfig::default(),
	};

	config.corpus.extend(cli.inputs);
	if let Some(dir) = &cli.dir {
		let files = list_files(dir, &cli.extension)
			.with_context(|| format!("failed to list {}", dir.display()))?;
		info!("found {} .{} file(s) in {}", files.len(), cli.extension, dir.display());
		config.corpus.extend(files.into_iter().map(|path| CorpusEntry::new(path, None)));
	}
	if config.corpus.is_empty() {
		bail!("no corpus files given; pass INPUT paths, --dir or --config");
	}

	if let Some(unit) = cli.granularity {
		config.granularities = unit.granularities();
	}
	if cli.stopwords.is_some() {
		config.stopwords = cli.stopwords;
	}
	if let Some(encoding) = cli.encoding {
		config.encoding = encoding;
	}
	if !cli.footers.is_empty() {
		config.footers = cli.footers;
	}
	if let Some(pattern) = cli.pattern {
		config.symbol_pattern = pattern;
	}
	if cli.no_hmm {
		config.hmm = false;
	}
	if let Some(workers) = cli.workers {
		config.workers = workers;
	}
	if cli.fail_fast {
		config.on_error = ErrorPolicy::Abort;
	}
	Ok(config)
}

fn print_text(outcomes: &[Outcome]) {
	let mut current = None;
	for outcome in outcomes {
		if current != Some(outcome.granularity) {
			current = Some(outcome.granularity);
			println!("\n********** average entropy by {} **********", outcome.granularity);
		}
		match &outcome.result {
			Ok(report) => println!("{report}"),
			Err(err) => {
				println!("----------------------------------------------------------");
				println!("*** {} (unit: {})", outcome.label, outcome.granularity);
				println!("analysis failed: {err}");
			}
		}
	}
}

fn print_json(outcomes: &[Outcome]) -> Result<()> {
	for outcome in outcomes {
		let line = match &outcome.result {
			Ok(report) => serde_json::to_string(report)?,
			Err(err) => json!({
				"label": outcome.label,
				"path": outcome.path,
				"granularity": outcome.granularity,
				"error": err.to_string(),
			})
			.to_string(),
		};
		println!("{line}");
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cli_definition_is_valid() {
		use clap::CommandFactory;
		Cli::command().debug_assert();
	}

	#[test]
	fn flags_override_defaults() {
		let cli = Cli::parse_from([
			"rs-entropy",
			"a.txt=甲",
			"b.txt",
			"-g",
			"character",
			"--encoding",
			"gbk",
			"--footer",
			"END",
			"-j",
			"2",
			"--fail-fast",
			"--no-hmm",
		]);
		let config = build_config(cli).expect("config");

		assert_eq!(config.corpus.len(), 2);
		assert_eq!(config.corpus[0].label(), "甲");
		assert_eq!(config.corpus[1].label(), "b");
		assert_eq!(config.granularities, vec![Granularity::Character]);
		assert_eq!(config.encoding, "gbk");
		assert_eq!(config.footers, vec!["END".to_owned()]);
		assert_eq!(config.workers, 2);
		assert_eq!(config.on_error, ErrorPolicy::Abort);
		assert!(!config.hmm);
	}

	#[test]
	fn rust_log_takes_precedence_over_flags() {
		assert_eq!(flag_level(0, 0, true), None);
		assert_eq!(flag_level(2, 0, true), None);
		assert_eq!(flag_level(0, 0, false), Some(LevelFilter::Info));
		assert_eq!(flag_level(1, 0, false), Some(LevelFilter::Debug));
		assert_eq!(flag_level(3, 1, false), Some(LevelFilter::Warn));
		assert_eq!(flag_level(0, 2, false), Some(LevelFilter::Error));
	}

	#[test]
	fn no_inputs_is_an_error() {
		let cli = Cli::parse_from(["rs-entropy"]);
		assert!(build_config(cli).is_err());
	}
}
