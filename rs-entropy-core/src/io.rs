use std::fs;
use std::path::{Path, PathBuf};
use std::{env, io};

use encoding_rs::Encoding;

use crate::error::{EntropyError, Result};

/// Looks up an encoding by its WHATWG label (`"utf-8"`, `"gbk"`, `"big5"`...).
///
/// # Errors
/// Returns `UnknownEncoding` if `encoding_rs` does not recognise the label.
pub(crate) fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
	Encoding::for_label(label.trim().as_bytes())
		.ok_or_else(|| EntropyError::UnknownEncoding(label.to_owned()))
}

/// Reads a whole corpus file and decodes it.
///
/// - A byte order mark, when present, overrides `encoding`
/// - Malformed sequences are an error, never replaced
pub(crate) fn read_corpus<P: AsRef<Path>>(filename: P, encoding: &'static Encoding) -> Result<String> {
	let path = filename.as_ref();
	let bytes = fs::read(path).map_err(|err| EntropyError::io(err, path))?;

	let (encoding, bom_len) = Encoding::for_bom(&bytes).unwrap_or((encoding, 0));
	encoding
		.decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
		.map(|text| text.into_owned())
		.ok_or_else(|| EntropyError::Decode {
			path: path.to_path_buf(),
			encoding: encoding.name(),
		})
}

/// Reads a stopword list: one entry per line, trimmed, blank lines skipped.
///
/// The file must be UTF-8. Entry order is preserved since stopwords are
/// removed one after another.
pub(crate) fn read_stopwords<P: AsRef<Path>>(filename: P) -> Result<Vec<String>> {
	let path = filename.as_ref();
	let contents = fs::read_to_string(path).map_err(|err| EntropyError::io(err, path))?;

	Ok(contents
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.map(str::to_owned)
		.collect())
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/novel.txt"` → `"novel"`
/// - `"novel.txt"` → `"novel"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub(crate) fn normalize_folder(input: &Path) -> PathBuf {
	if input == Path::new(".") || input == Path::new("./") {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		input.to_path_buf()
	}
}

/// Lists all files with a given extension in a directory.
///
/// Returns full paths sorted by file name so runs are reproducible.
/// Subdirectories are ignored.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
	let folder = normalize_folder(dir.as_ref());
	let read_err = |err| EntropyError::io(err, folder.clone());

	let mut files = Vec::new();
	for entry in fs::read_dir(&folder).map_err(read_err)? {
		let path = entry.map_err(read_err)?.path();
		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			files.push(path);
		}
	}
	files.sort();

	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::tempdir;

	#[test]
	fn read_corpus_decodes_gbk() {
		let dir = tempdir().expect("tempdir");
		let path = dir.path().join("gbk.txt");
		let (bytes, _, _) = encoding_rs::GBK.encode("白马啸西风");
		fs::write(&path, &bytes).expect("write corpus");

		let gbk = resolve_encoding("gbk").expect("gbk label");
		assert_eq!(read_corpus(&path, gbk).expect("decode"), "白马啸西风");
	}

	#[test]
	fn read_corpus_rejects_malformed_utf8() {
		let dir = tempdir().expect("tempdir");
		let path = dir.path().join("bad.txt");
		fs::write(&path, [0x66, 0xff, 0xfe, 0x67]).expect("write corpus");

		let err = read_corpus(&path, encoding_rs::UTF_8).unwrap_err();
		assert!(matches!(err, EntropyError::Decode { .. }));
	}

	#[test]
	fn read_corpus_strips_bom() {
		let dir = tempdir().expect("tempdir");
		let path = dir.path().join("bom.txt");
		fs::write(&path, b"\xEF\xBB\xBFabc").expect("write corpus");

		assert_eq!(read_corpus(&path, encoding_rs::UTF_8).expect("decode"), "abc");
	}

	#[test]
	fn missing_corpus_reports_path() {
		let err = read_corpus("/definitely/not/here.txt", encoding_rs::UTF_8).unwrap_err();
		match err {
			EntropyError::Io { path, .. } => assert_eq!(path, PathBuf::from("/definitely/not/here.txt")),
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn unknown_encoding_is_rejected() {
		assert!(matches!(resolve_encoding("klingon"), Err(EntropyError::UnknownEncoding(_))));
	}

	#[test]
	fn stopwords_are_trimmed_and_blank_lines_dropped() {
		let dir = tempdir().expect("tempdir");
		let path = dir.path().join("stopwords.txt");
		fs::write(&path, "的\n  了 \n\n   \n是\n").expect("write stopwords");

		assert_eq!(read_stopwords(&path).expect("stopwords"), vec!["的", "了", "是"]);
	}

	#[test]
	fn list_files_filters_and_sorts() {
		let dir = tempdir().expect("tempdir");
		fs::write(dir.path().join("b.txt"), "b").expect("write b");
		fs::write(dir.path().join("a.txt"), "a").expect("write a");
		fs::write(dir.path().join("c.dat"), "c").expect("write c");
		fs::create_dir(dir.path().join("nested.txt")).expect("create dir");

		let files = list_files(dir.path(), "txt").expect("list");
		assert_eq!(files, vec![dir.path().join("a.txt"), dir.path().join("b.txt")]);
	}

	#[test]
	fn filename_is_stem() {
		assert_eq!(get_filename("./data/novel.txt").expect("stem"), "novel");
	}
}
