//! Error types for loading page descriptions.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading a page description.
#[derive(Debug, Error)]
pub enum PageError {
	/// Error reading the page file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or structure.
	#[error("page parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Two widgets declare the same element id.
	#[error("duplicate widget id: {0}")]
	DuplicateWidget(String),
}

/// Result type for page loading.
pub type Result<T> = std::result::Result<T, PageError>;
