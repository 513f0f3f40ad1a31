//! "Await all, regardless of outcome" batch barrier.
//!
//! [`settle_all`] spawns every future of a batch, waits until each one has
//! either resolved, failed or panicked, and hands back the outcomes in
//! submission order. A failure never short-circuits the batch.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use tokio::task::{JoinError, JoinSet};

use crate::TaskClass;
use crate::spawn::spawn_into;

/// Boxed, sendable unit of work accepted by [`settle_all`].
pub type BatchFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'static>>;

/// Final outcome of one future in a settled batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement<T, E> {
	/// The future resolved with `Ok`.
	Fulfilled(T),
	/// The future resolved with `Err`.
	Rejected(E),
	/// The task panicked or was aborted before producing a value.
	Panicked(String),
}

impl<T, E> Settlement<T, E> {
	/// Returns `true` if the future resolved with `Ok`.
	pub fn is_fulfilled(&self) -> bool {
		matches!(self, Self::Fulfilled(_))
	}
}

/// Ordered outcomes of one batch, index-aligned with the submitted futures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledBatch<T, E> {
	settlements: Vec<Settlement<T, E>>,
}

impl<T, E> SettledBatch<T, E> {
	/// Number of futures in the batch.
	pub fn len(&self) -> usize {
		self.settlements.len()
	}

	/// Returns `true` for a batch with no futures.
	pub fn is_empty(&self) -> bool {
		self.settlements.is_empty()
	}

	/// Returns `true` when every future fulfilled. Vacuously true when empty.
	pub fn all_fulfilled(&self) -> bool {
		self.settlements.iter().all(Settlement::is_fulfilled)
	}

	/// Number of futures that were rejected or panicked.
	pub fn failure_count(&self) -> usize {
		self.settlements.iter().filter(|s| !s.is_fulfilled()).count()
	}

	/// Iterates over settlements in submission order.
	pub fn iter(&self) -> impl Iterator<Item = &Settlement<T, E>> {
		self.settlements.iter()
	}

	/// Consumes the batch, returning settlements in submission order.
	pub fn into_vec(self) -> Vec<Settlement<T, E>> {
		self.settlements
	}
}

/// Runs every future to completion and returns their outcomes in order.
///
/// An empty batch resolves immediately.
pub async fn settle_all<T, E, I, F>(class: TaskClass, futures: I) -> SettledBatch<T, E>
where
	I: IntoIterator<Item = F>,
	F: Future<Output = Result<T, E>> + Send + 'static,
	T: Send + 'static,
	E: Send + 'static,
{
	let mut set = JoinSet::new();
	let mut slots_by_task = HashMap::new();
	for (index, fut) in futures.into_iter().enumerate() {
		slots_by_task.insert(spawn_into(&mut set, class, fut), index);
	}
	tracing::trace!(worker_class = class.as_str(), tasks = slots_by_task.len(), "worker.barrier.spawned");

	let mut slots: Vec<Option<Settlement<T, E>>> = (0..slots_by_task.len()).map(|_| None).collect();
	while let Some(joined) = set.join_next_with_id().await {
		let (id, settlement) = match joined {
			Ok((id, Ok(value))) => (id, Settlement::Fulfilled(value)),
			Ok((id, Err(err))) => (id, Settlement::Rejected(err)),
			Err(err) => {
				let id = err.id();
				let msg = join_error_panic_message(err).unwrap_or_else(|| "task cancelled".to_string());
				tracing::warn!(worker_class = class.as_str(), error = %msg, "worker.barrier.panicked");
				(id, Settlement::Panicked(msg))
			}
		};
		if let Some(&index) = slots_by_task.get(&id) {
			slots[index] = Some(settlement);
		}
	}

	let settlements = slots
		.into_iter()
		.map(|slot| slot.unwrap_or_else(|| Settlement::Panicked("task lost".to_string())))
		.collect();
	SettledBatch { settlements }
}

/// Extracts the panic payload of a failed task as a string.
///
/// Returns `None` when the task was cancelled rather than panicking.
pub fn join_error_panic_message(err: JoinError) -> Option<String> {
	if !err.is_panic() {
		return None;
	}
	let payload = err.into_panic();
	if let Some(msg) = payload.downcast_ref::<&'static str>() {
		return Some((*msg).to_string());
	}
	if let Some(msg) = payload.downcast_ref::<String>() {
		return Some(msg.clone());
	}
	Some("<non-string panic payload>".to_string())
}
