use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{TaskClass, spawn};

/// Handle to a periodic task started by [`spawn_periodic`].
///
/// Dropping the handle does not stop the task; call [`PeriodicTask::shutdown`].
#[derive(Debug)]
pub struct PeriodicTask {
	name: &'static str,
	cancel: CancellationToken,
	handle: JoinHandle<()>,
}

impl PeriodicTask {
	/// Cancels the ticker and waits for its loop to exit.
	///
	/// Ticks already dispatched run to completion.
	pub async fn shutdown(self) {
		tracing::debug!(task = self.name, "worker.ticker.shutdown");
		self.cancel.cancel();
		let _ = self.handle.await;
	}
}

/// Spawns a ticker that dispatches `tick` every `period`.
///
/// The first dispatch happens one full period after the call. Each tick runs
/// as its own detached task and is never awaited by the ticker, so a slow
/// tick cannot delay the next one.
pub fn spawn_periodic<F, Fut>(class: TaskClass, name: &'static str, period: Duration, mut tick: F) -> PeriodicTask
where
	F: FnMut() -> Fut + Send + 'static,
	Fut: Future<Output = ()> + Send + 'static,
{
	let cancel = CancellationToken::new();
	let token = cancel.clone();
	let handle = spawn(class, async move {
		let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
		interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
		loop {
			tokio::select! {
				_ = token.cancelled() => break,
				_ = interval.tick() => {
					tracing::trace!(worker_class = class.as_str(), task = name, "worker.ticker.tick");
					drop(spawn(class, tick()));
				}
			}
		}
		tracing::debug!(task = name, "worker.ticker.stopped");
	});

	PeriodicTask { name, cancel, handle }
}
