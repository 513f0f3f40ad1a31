use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Handle, Runtime};
use tokio::task::{Id, JoinHandle, JoinSet};
use tracing::Instrument;

use crate::TaskClass;

/// Runtime used when a caller spawns from outside any tokio context.
fn fallback_runtime() -> &'static Runtime {
	static FALLBACK: OnceLock<Runtime> = OnceLock::new();
	FALLBACK.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(1)
			.thread_name("mws-worker")
			.build()
			.expect("mws-worker fallback runtime must build")
	})
}

fn runtime_handle() -> Handle {
	Handle::try_current().unwrap_or_else(|_| fallback_runtime().handle().clone())
}

fn task_span(class: TaskClass) -> tracing::Span {
	tracing::debug_span!("worker.task", worker_class = class.as_str())
}

/// Spawns `fut` as a detached task tagged with its class.
#[allow(clippy::disallowed_methods)]
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	runtime_handle().spawn(fut.instrument(task_span(class)))
}

/// Spawns `fut` into `set`, returning the id its [`tokio::task::JoinError`] would carry.
#[allow(clippy::disallowed_methods)]
pub(crate) fn spawn_into<T, F>(set: &mut JoinSet<T>, class: TaskClass, fut: F) -> Id
where
	T: Send + 'static,
	F: Future<Output = T> + Send + 'static,
{
	set.spawn_on(fut.instrument(task_span(class)), &runtime_handle()).id()
}
