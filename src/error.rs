//! Error types for sqldep

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during dependency analysis
#[derive(Error, Debug)]
pub enum SqlDepError {
    #[error("Failed to read directory: {path}")]
    DirectoryReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid search pattern: {pattern}")]
    PatternError {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to read SQL file: {path}")]
    SqlFileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown encoding label: {label}")]
    UnknownEncoding { label: String },

    #[error("Failed to read missing-table list: {path}")]
    MissingListReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No analyzed file named {name}")]
    UnknownFile { name: String },

    #[error("Root index {index} out of range ({count} roots)")]
    RootIndexOutOfRange { index: usize, count: usize },

    #[error("Unknown generate target: {target} (expected drop-all, drop-mid or a filename)")]
    UnknownGenerateTarget { target: String },
}
