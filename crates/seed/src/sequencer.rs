//! Two-phase initialization pipeline for one resource.
//!
//! Phase one fetches every remote JSON source and merges it into the
//! resource's dataset. Phase two runs the initialization scripts alongside a
//! single bulk load of the merged dataset. Each phase is a lock scope on the
//! [`PendingGate`], and phase two starts only after every phase-one request
//! has settled, whatever the outcome.

use std::fmt;
use std::sync::Arc;

use mws_worker::{BatchFuture, SettledBatch};

use crate::backend::InitTransport;
use crate::error::Error;
use crate::gate::PendingGate;
use crate::registry::ResourceInitRegistry;
use crate::resource::ResourceId;

/// Pipeline position of one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InitPhase {
	/// Nothing to do, or not started yet.
	#[default]
	Idle,
	FetchingRemoteJson,
	RunningScriptsAndBulkLoad,
	Done,
}

/// Outcome of one pipeline run.
#[derive(Debug)]
pub struct InitReport {
	pub res_id: ResourceId,
	/// Phase-one fetches, `None` when the run was skipped.
	pub remote_json: Option<SettledBatch<(), Error>>,
	/// Phase-two scripts followed by the bulk load, if one was sent.
	pub initialization: Option<SettledBatch<(), Error>>,
	/// Whether the bulk load request was issued.
	pub bulk_load_sent: bool,
}

impl InitReport {
	fn skipped(res_id: ResourceId) -> Self {
		Self {
			res_id,
			remote_json: None,
			initialization: None,
			bulk_load_sent: false,
		}
	}

	/// Returns true if the pipeline actually ran.
	pub fn ran(&self) -> bool {
		self.initialization.is_some()
	}

	/// Returns true if every request of both phases succeeded.
	pub fn succeeded(&self) -> bool {
		[&self.remote_json, &self.initialization]
			.into_iter()
			.flatten()
			.all(SettledBatch::all_fulfilled)
	}

	/// Number of failed requests across both phases.
	pub fn failure_count(&self) -> usize {
		[&self.remote_json, &self.initialization]
			.into_iter()
			.flatten()
			.map(SettledBatch::failure_count)
			.sum()
	}
}

/// Drives the initialization pipeline against the registry and gate.
#[derive(Clone)]
pub struct InitSequencer {
	registry: ResourceInitRegistry,
	gate: PendingGate,
	transport: Arc<dyn InitTransport>,
}

impl fmt::Debug for InitSequencer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InitSequencer").field("gate", &self.gate).finish_non_exhaustive()
	}
}

impl InitSequencer {
	pub fn new(registry: ResourceInitRegistry, gate: PendingGate, transport: Arc<dyn InitTransport>) -> Self {
		Self { registry, gate, transport }
	}

	/// Runs the pipeline if any binding saw the resource freshly created.
	///
	/// Each resource is seeded at most once; later and concurrent calls
	/// issue no request and never lock input.
	pub async fn run(&self, res_id: &ResourceId) -> InitReport {
		if !self.registry.begin_run(res_id) {
			tracing::debug!(%res_id, phase = ?self.registry.phase(res_id), "seed.sequencer.skip");
			return InitReport::skipped(res_id.clone());
		}
		self.drive(res_id).await
	}

	/// Runs the pipeline again regardless of `should_initialize`.
	///
	/// Refused while another run of the same resource is in flight. Remote
	/// JSON already consumed is not fetched again; the merged dataset and the
	/// scripts are sent again.
	pub async fn rerun(&self, res_id: &ResourceId) -> InitReport {
		if !self.registry.begin_rerun(res_id) {
			tracing::warn!(%res_id, "seed.sequencer.rerun_in_flight");
			return InitReport::skipped(res_id.clone());
		}
		self.drive(res_id).await
	}

	async fn drive(&self, res_id: &ResourceId) -> InitReport {
		self.gate.lock(res_id);
		let fetches: Vec<BatchFuture<(), Error>> = self
			.registry
			.remote_json_urls(res_id)
			.into_iter()
			.map(|url| self.fetch_and_merge(res_id, url))
			.collect();
		tracing::debug!(%res_id, fetches = fetches.len(), "seed.sequencer.remote_json");
		let remote_json = self.gate.unlock(res_id, fetches).await;

		self.registry.clear_remote_json_urls(res_id);
		self.registry.set_phase(res_id, InitPhase::RunningScriptsAndBulkLoad);
		self.gate.lock(res_id);
		let mut requests: Vec<BatchFuture<(), Error>> = self
			.registry
			.script_urls(res_id)
			.into_iter()
			.map(|url| self.run_script(res_id, url))
			.collect();
		let dataset = self.registry.dataset(res_id);
		let bulk_load_sent = !dataset.is_empty();
		if bulk_load_sent {
			let transport = Arc::clone(&self.transport);
			let res_id = res_id.clone();
			requests.push(Box::pin(async move { transport.load_json(&res_id, &dataset).await }));
		} else {
			tracing::debug!(%res_id, "seed.sequencer.bulk_load_skipped");
		}
		tracing::debug!(%res_id, requests = requests.len(), "seed.sequencer.initialize");
		let initialization = self.gate.unlock(res_id, requests).await;
		self.registry.set_phase(res_id, InitPhase::Done);

		let report = InitReport {
			res_id: res_id.clone(),
			remote_json: Some(remote_json),
			initialization: Some(initialization),
			bulk_load_sent,
		};
		tracing::info!(%res_id, failures = report.failure_count(), bulk_load_sent, "seed.sequencer.done");
		report
	}

	fn fetch_and_merge(&self, res_id: &ResourceId, url: String) -> BatchFuture<(), Error> {
		let transport = Arc::clone(&self.transport);
		let registry = self.registry.clone();
		let res_id = res_id.clone();
		Box::pin(async move {
			let dataset = transport.fetch_json(&url).await?;
			tracing::debug!(%res_id, %url, collections = dataset.len(), "seed.sequencer.merge");
			registry.add_inline_json(&res_id, dataset);
			Ok::<(), Error>(())
		})
	}

	fn run_script(&self, res_id: &ResourceId, url: String) -> BatchFuture<(), Error> {
		let transport = Arc::clone(&self.transport);
		let res_id = res_id.clone();
		Box::pin(async move { transport.run_script(&url, &res_id).await })
	}
}
