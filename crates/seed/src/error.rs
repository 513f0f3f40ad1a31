//! Error types for seed initialization.

use thiserror::Error;

/// Errors surfaced by the orchestrator and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
	/// A request could not be sent or its body could not be read.
	#[error("request to {url} failed: {message}")]
	Request {
		/// Target URL.
		url: String,
		/// Transport-level description.
		message: String,
	},

	/// The server answered with a non-success status.
	#[error("request to {url} returned status {status}")]
	Status {
		/// Target URL.
		url: String,
		/// HTTP status code.
		status: u16,
	},

	/// An inline initialization payload looked like JSON but did not parse.
	#[error("unable to parse initialization json: {0}")]
	InlineJson(#[from] serde_json::Error),

	/// An element without an id cannot be bound.
	#[error("element id must not be empty")]
	EmptyElementId,

	/// The backend refused to hand out a resource id.
	#[error("resource allocation failed: {0}")]
	Allocation(String),
}

/// Result type for seed operations.
pub type Result<T> = std::result::Result<T, Error>;
