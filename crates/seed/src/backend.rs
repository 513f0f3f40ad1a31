//! Collaborators the orchestrator talks to but does not implement.

use async_trait::async_trait;

use crate::Result;
use crate::dataset::Dataset;
use crate::resource::{Allocation, ResourceId};

/// Hands out backend resources and keeps them alive.
#[async_trait]
pub trait ResourceAllocator: Send + Sync {
	/// Requests a resource id for a new widget.
	async fn allocate(&self) -> Result<Allocation>;

	/// Refreshes the resource's server-side session.
	async fn keep_alive(&self, res_id: &ResourceId) -> Result<()>;
}

/// Executes the requests issued during initialization.
#[async_trait]
pub trait InitTransport: Send + Sync {
	/// POSTs `{res_id}` to an initialization script endpoint.
	async fn run_script(&self, url: &str, res_id: &ResourceId) -> Result<()>;

	/// GETs a remote dataset.
	async fn fetch_json(&self, url: &str) -> Result<Dataset>;

	/// POSTs `{res_id, collections}` to the bulk load endpoint.
	async fn load_json(&self, res_id: &ResourceId, collections: &Dataset) -> Result<()>;
}
