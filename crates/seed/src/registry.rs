use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::dataset::Dataset;
use crate::resource::ResourceId;
use crate::sequencer::InitPhase;

/// Accumulated initialization inputs for one resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceInitState {
	/// Script endpoints to POST the resource id to, without duplicates.
	pub script_urls: Vec<String>,
	/// Merged seed data awaiting the bulk load.
	pub dataset: Dataset,
	/// Remote JSON still to be fetched and merged.
	pub remote_json_urls: Vec<String>,
	/// Sticky: set once any binding saw the resource freshly allocated.
	pub should_initialize: bool,
	/// Last sequencer phase entered.
	pub phase: InitPhase,
}

/// Per-resource initialization inputs contributed by every bound widget.
///
/// State is created on first sight of a resource id and lives as long as
/// the registry. Cloning yields another handle onto the same state.
#[derive(Debug, Default, Clone)]
pub struct ResourceInitRegistry {
	inner: Arc<Mutex<IndexMap<ResourceId, ResourceInitState>>>,
}

impl ResourceInitRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	fn with_state<R>(&self, res_id: &ResourceId, f: impl FnOnce(&mut ResourceInitState) -> R) -> R {
		let mut guard = self.inner.lock();
		f(guard.entry(res_id.clone()).or_default())
	}

	/// Creates the state if needed and folds `is_new` into `should_initialize`.
	pub fn register(&self, res_id: &ResourceId, is_new: bool) {
		self.with_state(res_id, |state| {
			state.should_initialize |= is_new;
		});
		tracing::debug!(%res_id, is_new, "seed.registry.register");
	}

	/// Appends a script URL unless already present. Returns true if added.
	pub fn add_script_url(&self, res_id: &ResourceId, url: impl Into<String>) -> bool {
		let url = url.into();
		self.with_state(res_id, |state| push_unique(&mut state.script_urls, url))
	}

	/// Merges inline seed data into the resource's dataset.
	pub fn add_inline_json(&self, res_id: &ResourceId, dataset: Dataset) {
		self.with_state(res_id, |state| state.dataset.merge(dataset));
	}

	/// Appends a remote JSON URL unless already present. Returns true if added.
	pub fn add_remote_json_url(&self, res_id: &ResourceId, url: impl Into<String>) -> bool {
		let url = url.into();
		self.with_state(res_id, |state| push_unique(&mut state.remote_json_urls, url))
	}

	/// Drops the remote JSON URLs once they have been consumed.
	pub fn clear_remote_json_urls(&self, res_id: &ResourceId) {
		self.with_state(res_id, |state| state.remote_json_urls.clear());
	}

	pub(crate) fn set_phase(&self, res_id: &ResourceId, phase: InitPhase) {
		self.with_state(res_id, |state| state.phase = phase);
		tracing::debug!(%res_id, ?phase, "seed.registry.phase");
	}

	/// Claims the first run of a resource's pipeline.
	///
	/// Returns false unless the resource needs initialization and has never
	/// left [`InitPhase::Idle`]. On success the phase moves to
	/// [`InitPhase::FetchingRemoteJson`] under the same lock.
	pub(crate) fn begin_run(&self, res_id: &ResourceId) -> bool {
		let mut guard = self.inner.lock();
		let Some(state) = guard.get_mut(res_id) else {
			return false;
		};
		if !state.should_initialize || state.phase != InitPhase::Idle {
			return false;
		}
		state.phase = InitPhase::FetchingRemoteJson;
		true
	}

	/// Claims a repeat run of a known resource. Returns false while another
	/// run is in flight.
	pub(crate) fn begin_rerun(&self, res_id: &ResourceId) -> bool {
		let mut guard = self.inner.lock();
		let Some(state) = guard.get_mut(res_id) else {
			return false;
		};
		if !matches!(state.phase, InitPhase::Idle | InitPhase::Done) {
			return false;
		}
		state.phase = InitPhase::FetchingRemoteJson;
		true
	}

	/// Returns true if the resource is known to the registry.
	pub fn contains(&self, res_id: &ResourceId) -> bool {
		self.inner.lock().contains_key(res_id)
	}

	/// Copy of the whole state for one resource.
	pub fn snapshot(&self, res_id: &ResourceId) -> Option<ResourceInitState> {
		self.inner.lock().get(res_id).cloned()
	}

	pub fn should_initialize(&self, res_id: &ResourceId) -> bool {
		self.inner.lock().get(res_id).is_some_and(|state| state.should_initialize)
	}

	pub fn script_urls(&self, res_id: &ResourceId) -> Vec<String> {
		self.inner.lock().get(res_id).map(|state| state.script_urls.clone()).unwrap_or_default()
	}

	pub fn remote_json_urls(&self, res_id: &ResourceId) -> Vec<String> {
		self.inner.lock().get(res_id).map(|state| state.remote_json_urls.clone()).unwrap_or_default()
	}

	pub fn dataset(&self, res_id: &ResourceId) -> Dataset {
		self.inner.lock().get(res_id).map(|state| state.dataset.clone()).unwrap_or_default()
	}

	pub fn phase(&self, res_id: &ResourceId) -> Option<InitPhase> {
		self.inner.lock().get(res_id).map(|state| state.phase)
	}

	/// Known resource ids in first-registration order.
	pub fn resource_ids(&self) -> Vec<ResourceId> {
		self.inner.lock().keys().cloned().collect()
	}
}

fn push_unique(urls: &mut Vec<String>, url: String) -> bool {
	if urls.contains(&url) {
		return false;
	}
	urls.push(url);
	true
}
