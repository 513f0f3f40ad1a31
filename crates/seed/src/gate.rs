//! Reference-counted input lock shared by the widgets of a resource.
//!
//! Every asynchronous initialization phase runs inside one lock scope:
//! [`PendingGate::lock`] opens it and [`PendingGate::unlock`] closes it once
//! the phase's requests have all settled. Scopes stack, and widgets accept
//! input again only when the last outstanding scope closes.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use mws_worker::{SettledBatch, Settlement, TaskClass, settle_all};
use parking_lot::Mutex;

use crate::resource::ResourceId;
use crate::widget::{BroadcastScope, WidgetSet};

/// Advisory printed on every target widget when a lock scope closes after a failure.
pub const FAILURE_ADVISORY: [&str; 2] = [
	"One or more scripts failed during initialization.",
	"Your data may not be completely loaded.  Use the \"reset\" command to try again.",
];

/// Per-resource outstanding lock counter with widget notifications.
#[derive(Debug, Clone)]
pub struct PendingGate {
	counts: Arc<Mutex<HashMap<ResourceId, usize>>>,
	widgets: WidgetSet,
}

impl PendingGate {
	pub fn new(widgets: WidgetSet) -> Self {
		Self {
			counts: Arc::new(Mutex::new(HashMap::new())),
			widgets,
		}
	}

	/// Outstanding lock scopes for `res_id`.
	pub fn pending(&self, res_id: &ResourceId) -> usize {
		self.counts.lock().get(res_id).copied().unwrap_or(0)
	}

	/// Returns true when the widgets targeted for `res_id` may accept input.
	///
	/// With a shared broadcast scope every widget hears about every resource,
	/// so all counters must be zero.
	pub fn is_released(&self, res_id: &ResourceId) -> bool {
		let counts = self.counts.lock();
		self.scope_released(&counts, res_id)
	}

	fn scope_released(&self, counts: &HashMap<ResourceId, usize>, res_id: &ResourceId) -> bool {
		match self.widgets.scope() {
			BroadcastScope::Shared => counts.values().all(|&count| count == 0),
			BroadcastScope::PerResource => counts.get(res_id).is_none_or(|&count| count == 0),
		}
	}

	/// Opens a lock scope, disabling input on the 0 to 1 transition.
	pub fn lock(&self, res_id: &ResourceId) {
		let (was_released, pending) = {
			let mut counts = self.counts.lock();
			let was_released = self.scope_released(&counts, res_id);
			let count = counts.entry(res_id.clone()).or_insert(0);
			*count += 1;
			(was_released, *count)
		};
		tracing::debug!(%res_id, pending, "seed.gate.lock");

		if was_released {
			self.widgets.broadcast(res_id, |widget| widget.disable_input());
		}
	}

	/// Closes a lock scope once every awaited request has settled.
	///
	/// Success and failure both release the scope. When the counter for
	/// `res_id` reaches zero after a failed batch, [`FAILURE_ADVISORY`] is
	/// printed before input is re-enabled. An empty batch settles at once.
	pub async fn unlock<T, E, I, F>(&self, res_id: &ResourceId, awaited: I) -> SettledBatch<T, E>
	where
		I: IntoIterator<Item = F>,
		F: Future<Output = Result<T, E>> + Send + 'static,
		T: Send + 'static,
		E: Display + Send + 'static,
	{
		let batch = settle_all(TaskClass::Interactive, awaited).await;
		for settlement in batch.iter() {
			match settlement {
				Settlement::Fulfilled(_) => {}
				Settlement::Rejected(err) => tracing::warn!(%res_id, error = %err, "seed.gate.request_failed"),
				Settlement::Panicked(msg) => tracing::error!(%res_id, error = %msg, "seed.gate.request_panicked"),
			}
		}

		let (pending, released) = {
			let mut counts = self.counts.lock();
			let count = counts.entry(res_id.clone()).or_insert(0);
			if *count == 0 {
				tracing::warn!(%res_id, "seed.gate.unmatched_unlock");
			}
			*count = count.saturating_sub(1);
			let pending = *count;
			(pending, self.scope_released(&counts, res_id))
		};
		tracing::debug!(%res_id, pending, failures = batch.failure_count(), "seed.gate.unlock");

		if pending == 0 {
			if !batch.all_fulfilled() {
				self.widgets.broadcast(res_id, |widget| widget.append_message(&FAILURE_ADVISORY));
			}
			if released {
				self.widgets.broadcast(res_id, |widget| widget.enable_input());
			}
		}
		batch
	}
}
