#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use mws_seed::{
	Allocation, Dataset, ElementSpec, Error, InitConfig, InitContext, InitTransport, ResourceAllocator, ResourceId, Result, Widget,
	WidgetFactory,
};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Semaphore;

pub const LOAD_JSON: &str = "/init/load_json";

/// One request observed by the mock backend, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
	Allocate,
	KeepAlive(String),
	FetchStarted(String),
	FetchSettled(String),
	Script(String),
	LoadJson(Value),
}

/// Scriptable allocator and transport that records every call.
pub struct MockBackend {
	calls: Mutex<Vec<Call>>,
	allocations: Mutex<VecDeque<Result<Allocation>>>,
	fallback: Allocation,
	remote: Mutex<HashMap<String, Dataset>>,
	failing: Mutex<HashSet<String>>,
	fetch_hold: Mutex<Option<Arc<Semaphore>>>,
	allocation_hold: Mutex<Option<Arc<Semaphore>>>,
}

impl MockBackend {
	pub fn new(res_id: &str, is_new: bool) -> Arc<Self> {
		Arc::new(Self {
			calls: Mutex::new(Vec::new()),
			allocations: Mutex::new(VecDeque::new()),
			fallback: Allocation {
				res_id: ResourceId::new(res_id),
				is_new,
			},
			remote: Mutex::new(HashMap::new()),
			failing: Mutex::new(HashSet::new()),
			fetch_hold: Mutex::new(None),
			allocation_hold: Mutex::new(None),
		})
	}

	/// Queues allocation answers consumed before the fallback.
	pub fn queue_allocation(&self, allocation: Result<Allocation>) {
		self.allocations.lock().push_back(allocation);
	}

	pub fn serve_json(&self, url: &str, body: Value) {
		let dataset = serde_json::from_value(body).expect("test payload must be a dataset");
		self.remote.lock().insert(url.to_string(), dataset);
	}

	/// Makes requests to `url` fail. Use [`LOAD_JSON`] for the bulk load.
	pub fn fail(&self, url: &str) {
		self.failing.lock().insert(url.to_string());
	}

	/// Blocks every remote JSON fetch until a permit is added.
	pub fn hold_fetches(&self) -> Arc<Semaphore> {
		let hold = Arc::new(Semaphore::new(0));
		*self.fetch_hold.lock() = Some(Arc::clone(&hold));
		hold
	}

	/// Blocks every allocation until a permit is added.
	pub fn hold_allocations(&self) -> Arc<Semaphore> {
		let hold = Arc::new(Semaphore::new(0));
		*self.allocation_hold.lock() = Some(Arc::clone(&hold));
		hold
	}

	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().clone()
	}

	pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
		self.calls.lock().iter().filter(|call| pred(call)).count()
	}

	pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
		self.calls.lock().iter().position(pred)
	}

	fn record(&self, call: Call) {
		self.calls.lock().push(call);
	}

	fn check(&self, url: &str) -> Result<()> {
		if self.failing.lock().contains(url) {
			return Err(Error::Status {
				url: url.to_string(),
				status: 500,
			});
		}
		Ok(())
	}
}

#[async_trait]
impl ResourceAllocator for MockBackend {
	async fn allocate(&self) -> Result<Allocation> {
		self.record(Call::Allocate);
		let hold = self.allocation_hold.lock().clone();
		if let Some(hold) = hold {
			let _permit = hold.acquire().await.map_err(|err| Error::Allocation(err.to_string()))?;
		}
		let queued = self.allocations.lock().pop_front();
		queued.unwrap_or_else(|| Ok(self.fallback.clone()))
	}

	async fn keep_alive(&self, res_id: &ResourceId) -> Result<()> {
		self.record(Call::KeepAlive(res_id.to_string()));
		Ok(())
	}
}

#[async_trait]
impl InitTransport for MockBackend {
	async fn run_script(&self, url: &str, _res_id: &ResourceId) -> Result<()> {
		self.record(Call::Script(url.to_string()));
		self.check(url)
	}

	async fn fetch_json(&self, url: &str) -> Result<Dataset> {
		self.record(Call::FetchStarted(url.to_string()));
		let hold = self.fetch_hold.lock().clone();
		if let Some(hold) = hold {
			let _permit = hold.acquire().await.map_err(|err| Error::Request {
				url: url.to_string(),
				message: err.to_string(),
			})?;
		}
		self.record(Call::FetchSettled(url.to_string()));
		self.check(url)?;
		self.remote.lock().get(url).cloned().ok_or_else(|| Error::Status {
			url: url.to_string(),
			status: 404,
		})
	}

	async fn load_json(&self, _res_id: &ResourceId, collections: &Dataset) -> Result<()> {
		self.record(Call::LoadJson(serde_json::to_value(collections).expect("dataset serializes")));
		self.check(LOAD_JSON)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
	Attached(String),
	Disabled,
	Enabled,
	Message(Vec<String>),
}

/// Widget that records every broadcast it receives.
pub struct RecordingWidget {
	pub element: String,
	events: Mutex<Vec<WidgetEvent>>,
	input_enabled: AtomicBool,
}

impl RecordingWidget {
	pub fn events(&self) -> Vec<WidgetEvent> {
		self.events.lock().clone()
	}

	pub fn input_enabled(&self) -> bool {
		self.input_enabled.load(Ordering::SeqCst)
	}

	pub fn messages(&self) -> Vec<Vec<String>> {
		self.events()
			.into_iter()
			.filter_map(|event| match event {
				WidgetEvent::Message(lines) => Some(lines),
				_ => None,
			})
			.collect()
	}
}

impl Widget for RecordingWidget {
	fn attach_input_handler(&self, res_id: &ResourceId) {
		self.events.lock().push(WidgetEvent::Attached(res_id.to_string()));
	}

	fn disable_input(&self) {
		self.input_enabled.store(false, Ordering::SeqCst);
		self.events.lock().push(WidgetEvent::Disabled);
	}

	fn enable_input(&self) {
		self.input_enabled.store(true, Ordering::SeqCst);
		self.events.lock().push(WidgetEvent::Enabled);
	}

	fn append_message(&self, lines: &[&str]) {
		let lines = lines.iter().map(|line| line.to_string()).collect();
		self.events.lock().push(WidgetEvent::Message(lines));
	}
}

#[derive(Default)]
pub struct RecordingFactory {
	created: Mutex<Vec<Arc<RecordingWidget>>>,
}

impl RecordingFactory {
	pub fn widgets(&self) -> Vec<Arc<RecordingWidget>> {
		self.created.lock().clone()
	}

	pub fn widget(&self, index: usize) -> Arc<RecordingWidget> {
		Arc::clone(&self.created.lock()[index])
	}
}

impl WidgetFactory for RecordingFactory {
	fn create(&self, element: &ElementSpec, _index: usize) -> Arc<dyn Widget> {
		let widget = Arc::new(RecordingWidget {
			element: element.id.clone(),
			events: Mutex::new(Vec::new()),
			input_enabled: AtomicBool::new(true),
		});
		self.created.lock().push(Arc::clone(&widget));
		widget
	}
}

pub fn context(backend: &Arc<MockBackend>, factory: &Arc<RecordingFactory>, config: InitConfig) -> InitContext {
	InitContext::new(config, backend.clone(), backend.clone(), factory.clone())
}

pub fn element(id: &str, url: Option<&str>, json: Option<&str>) -> ElementSpec {
	ElementSpec {
		id: id.to_string(),
		initialization_url: url.map(str::to_string),
		initialization_json: json.map(Into::into),
	}
}

pub fn advisory() -> Vec<String> {
	mws_seed::FAILURE_ADVISORY.iter().map(|line| line.to_string()).collect()
}
