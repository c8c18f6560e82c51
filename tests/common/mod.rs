//! Common test utilities for sqldep tests

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use sqldep::{analyze_directory, AnalyzeOptions, DependencyGraph};

/// Test context with a temporary directory of SQL fixtures
pub struct TestContext {
    /// Kept to prevent temp directory cleanup until TestContext is dropped
    _temp_dir: TempDir,
    pub dir: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            dir,
        }
    }

    /// Write one fixture file under the scan directory
    pub fn add_file(&self, name: &str, content: &str) -> PathBuf {
        self.add_bytes(name, content.as_bytes())
    }

    pub fn add_bytes(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture directory");
        }
        fs::write(&path, bytes).expect("Failed to write fixture");
        path
    }

    pub fn options(&self) -> AnalyzeOptions {
        AnalyzeOptions {
            dir: self.dir.clone(),
            ..AnalyzeOptions::default()
        }
    }

    /// Analyze the fixture directory with default options
    pub fn analyze(&self) -> DependencyGraph {
        analyze_directory(&self.options()).expect("analysis failed")
    }
}
