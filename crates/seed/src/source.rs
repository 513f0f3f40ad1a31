use serde::Deserialize;

use crate::Result;
use crate::dataset::Dataset;

/// Initialization JSON as declared on an element or passed in bind options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InitJson {
	/// Already structured collection data.
	Structured(Dataset),
	/// Raw attribute text: either an inline JSON object or a URL.
	Text(String),
}

/// Where a declared initialization payload should go.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedSource {
	/// Merge into the resource's dataset right away.
	Inline(Dataset),
	/// Fetch and merge during the remote JSON phase.
	RemoteUrl(String),
}

impl InitJson {
	/// Returns true for text that carries nothing.
	pub fn is_blank(&self) -> bool {
		matches!(self, Self::Text(text) if text.is_empty())
	}

	/// Classifies the payload.
	///
	/// Text wrapped in `{` and `}` must parse as a dataset; any other
	/// non-empty text is a URL. Empty text yields `None`.
	pub fn classify(self) -> Result<Option<SeedSource>> {
		match self {
			Self::Structured(dataset) => Ok(Some(SeedSource::Inline(dataset))),
			Self::Text(text) if text.is_empty() => Ok(None),
			Self::Text(text) if text.starts_with('{') && text.ends_with('}') => Ok(Some(SeedSource::Inline(Dataset::from_json_str(&text)?))),
			Self::Text(url) => Ok(Some(SeedSource::RemoteUrl(url))),
		}
	}
}

impl From<&str> for InitJson {
	fn from(text: &str) -> Self {
		Self::Text(text.to_string())
	}
}

impl From<Dataset> for InitJson {
	fn from(dataset: Dataset) -> Self {
		Self::Structured(dataset)
	}
}
