//! Seed datasets and the merge rule that combines them.
//!
//! A dataset maps a collection name to the ordered list of documents that
//! should be inserted into it: `{collection_name: [document, ...], ...}`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

/// Collection name to ordered documents. Collection order follows first insertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset(IndexMap<String, Vec<Value>>);

impl Dataset {
	/// Creates an empty dataset.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a dataset from a JSON object string.
	pub fn from_json_str(raw: &str) -> Result<Self> {
		Ok(serde_json::from_str(raw)?)
	}

	/// Returns true when no collection is present.
	///
	/// A dataset holding only empty collections is not empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Number of collections.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Documents queued for one collection.
	pub fn collection(&self, name: &str) -> Option<&[Value]> {
		self.0.get(name).map(Vec::as_slice)
	}

	/// Iterates over collections in insertion order.
	pub fn collections(&self) -> impl Iterator<Item = (&str, &[Value])> {
		self.0.iter().map(|(name, docs)| (name.as_str(), docs.as_slice()))
	}

	/// Total number of documents across all collections.
	pub fn document_count(&self) -> usize {
		self.0.values().map(Vec::len).sum()
	}

	/// Appends every collection of `incoming` onto `self`.
	///
	/// Missing collections are created. Existing documents keep their
	/// position and incoming documents follow them in arrival order.
	/// Nothing is deduplicated.
	pub fn merge(&mut self, incoming: Dataset) {
		for (name, documents) in incoming.0 {
			self.0.entry(name).or_default().extend(documents);
		}
	}
}
