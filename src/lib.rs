//! sqldep: execution-order dependency analysis for SQL job files
//!
//! Scans a directory of SQL sources, infers per file which tables it
//! creates and which it reads, and assembles those facts into a dependency
//! forest: which files must run before which others, which tables no
//! scanned file produces, and which subtrees are safe to execute given a
//! confirmed list of externally satisfied tables.

pub mod error;
pub mod graph;
pub mod report;
pub mod scanner;

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

pub use error::SqlDepError;
pub use graph::{DependencyGraph, DependencyUnit};

/// Options for analyzing a directory of SQL files
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Directory containing the SQL files
    pub dir: PathBuf,
    /// Filename glob pattern, matched case-insensitively
    pub pattern: String,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Encoding tried when a file is not valid UTF-8 (e.g. "gbk")
    pub fallback_encoding: String,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            pattern: "*.sql".to_string(),
            recursive: false,
            fallback_encoding: "gbk".to_string(),
        }
    }
}

/// Analyze a directory of SQL files into a dependency graph
pub fn analyze_directory(options: &AnalyzeOptions) -> Result<DependencyGraph> {
    let sources = scanner::scan_directory(
        &options.dir,
        &options.pattern,
        options.recursive,
        &options.fallback_encoding,
    )?;

    debug!("found {} SQL files", sources.len());

    let facts = sources
        .into_iter()
        .map(|source| (source.name, scanner::extract_facts(&source.content)))
        .collect();

    Ok(DependencyGraph::from_facts(facts))
}
