//! SQL source discovery
//!
//! Scans a directory for SQL job files, matching filenames
//! case-insensitively against a glob pattern, and reads each file with an
//! encoding fallback chain (UTF-8 first, then a configurable legacy
//! encoding). A file that cannot be decoded is skipped with a warning so
//! the rest of the set can still be analyzed.

mod extract;

pub use extract::{extract_facts, TableFacts, TableRef};

use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use glob::{MatchOptions, Pattern};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::SqlDepError;

/// A discovered SQL source file.
#[derive(Debug, Clone)]
pub struct SqlSource {
    /// Unit identity: path relative to the scan root
    pub name: String,
    pub path: PathBuf,
    pub content: String,
}

/// Resolve an encoding label (e.g. "gbk", "windows-1252") to an encoding.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, SqlDepError> {
    Encoding::for_label(label.as_bytes()).ok_or_else(|| SqlDepError::UnknownEncoding {
        label: label.to_string(),
    })
}

/// Read a file as a string, trying UTF-8 first, then the fallback encoding
fn read_with_fallback(path: &Path, fallback: &'static Encoding) -> std::io::Result<String> {
    let bytes = fs::read(path)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{FEFF}').map(str::to_string).unwrap_or(s)),
        Err(err) => {
            let (decoded, _, had_errors) = fallback.decode(err.as_bytes());
            if had_errors {
                Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("not valid UTF-8 or {}", fallback.name()),
                ))
            } else {
                Ok(decoded.into_owned())
            }
        }
    }
}

/// Scan `dir` for files matching `pattern` and read their contents.
///
/// Matching is case-insensitive on the filename, so `*.sql` also picks up
/// `REPORT.SQL`. Results are sorted by name so analysis output is stable.
/// Unreadable files are logged and skipped; the caller gets the partial set.
pub fn scan_directory(
    dir: &Path,
    pattern: &str,
    recursive: bool,
    fallback_encoding: &str,
) -> Result<Vec<SqlSource>, SqlDepError> {
    let pattern = Pattern::new(pattern).map_err(|e| SqlDepError::PatternError {
        pattern: pattern.to_string(),
        source: e,
    })?;
    let fallback = resolve_encoding(fallback_encoding)?;

    let mut paths = Vec::new();
    if recursive {
        for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
            if entry.file_type().is_file() {
                paths.push(entry.into_path());
            }
        }
    } else {
        let entries = fs::read_dir(dir).map_err(|e| SqlDepError::DirectoryReadError {
            path: dir.to_path_buf(),
            source: e,
        })?;
        for entry in entries.filter_map(Result::ok) {
            paths.push(entry.path());
        }
    }

    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let mut sources = Vec::new();
    for path in paths {
        let matched = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| pattern.matches_with(n, options));
        if !matched {
            continue;
        }

        let name = path
            .strip_prefix(dir)
            .unwrap_or(&path)
            .display()
            .to_string();

        match read_with_fallback(&path, fallback) {
            Ok(content) => sources.push(SqlSource {
                name,
                path,
                content,
            }),
            Err(err) => {
                let err = SqlDepError::SqlFileReadError { path, source: err };
                warn!(error = %err, "skipping unreadable file");
            }
        }
    }

    if sources.is_empty() {
        warn!(pattern = %pattern.as_str(), dir = %dir.display(), "no file found under pattern");
    }

    sources.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sources)
}

/// Read a confirmed-missing table list: one plain table name per line,
/// surrounding whitespace trimmed, empty lines ignored.
pub fn read_missing_list(path: &Path) -> Result<Vec<String>, SqlDepError> {
    let content = fs::read_to_string(path).map_err(|e| SqlDepError::MissingListReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
