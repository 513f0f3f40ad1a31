use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use mws_worker::{PeriodicTask, TaskClass, spawn_periodic};
use parking_lot::Mutex;
use serde::Deserialize;

use crate::backend::ResourceAllocator;
use crate::error::{Error, Result};
use crate::registry::ResourceInitRegistry;
use crate::resource::ResourceId;
use crate::source::{InitJson, SeedSource};
use crate::widget::{Widget, WidgetId, WidgetSet};

/// Host element a widget is embedded in, with its declarative attributes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ElementSpec {
	/// Stable, non-empty identity of the element; binding is idempotent per id.
	pub id: String,
	/// `data-initialization-url`
	#[serde(default)]
	pub initialization_url: Option<String>,
	/// `data-initialization-json`
	#[serde(default)]
	pub initialization_json: Option<InitJson>,
}

impl ElementSpec {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Self::default()
		}
	}
}

/// Explicit inputs that take precedence over the element's attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindOptions {
	pub init_url: Option<String>,
	pub init_json: Option<InitJson>,
}

/// Builds the console widget for an element.
pub trait WidgetFactory: Send + Sync {
	/// `index` is the widget's position among all bound widgets.
	fn create(&self, element: &ElementSpec, index: usize) -> Arc<dyn Widget>;
}

/// Result of binding one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
	pub widget_id: WidgetId,
	pub res_id: ResourceId,
	pub is_new: bool,
}

enum ElementState {
	/// Allocation in flight; a concurrent bind of the same element is a no-op.
	Binding,
	Bound { binding: Binding, keep_alive: PeriodicTask },
}

type ElementMap = Mutex<HashMap<String, ElementState>>;

/// Holds an element's [`ElementState::Binding`] slot until the bind completes.
///
/// Dropped unfinished, for an allocation error or a cancelled bind, it frees
/// the slot so the element can be bound again.
struct Reservation<'a> {
	elements: &'a ElementMap,
	element_id: &'a str,
	armed: bool,
}

impl<'a> Reservation<'a> {
	/// Returns `None` when the element is already bound or being bound.
	fn claim(elements: &'a ElementMap, element_id: &'a str) -> Option<Self> {
		let mut guard = elements.lock();
		if guard.contains_key(element_id) {
			return None;
		}
		guard.insert(element_id.to_string(), ElementState::Binding);
		Some(Self {
			elements,
			element_id,
			armed: true,
		})
	}

	fn complete(mut self, binding: Binding, keep_alive: PeriodicTask) {
		self.armed = false;
		self.elements
			.lock()
			.insert(self.element_id.to_string(), ElementState::Bound { binding, keep_alive });
	}
}

impl Drop for Reservation<'_> {
	fn drop(&mut self) {
		if self.armed {
			self.elements.lock().remove(self.element_id);
			tracing::debug!(element = self.element_id, "seed.binder.reservation_released");
		}
	}
}

/// Binds elements to backend resources and records their seed inputs.
#[derive(Clone)]
pub struct WidgetBinder {
	registry: ResourceInitRegistry,
	widgets: WidgetSet,
	allocator: Arc<dyn ResourceAllocator>,
	factory: Arc<dyn WidgetFactory>,
	keep_alive_interval: Duration,
	elements: Arc<ElementMap>,
}

impl fmt::Debug for WidgetBinder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WidgetBinder")
			.field("widgets", &self.widgets)
			.field("keep_alive_interval", &self.keep_alive_interval)
			.field("elements", &self.elements.lock().len())
			.finish_non_exhaustive()
	}
}

impl WidgetBinder {
	pub fn new(
		registry: ResourceInitRegistry,
		widgets: WidgetSet,
		allocator: Arc<dyn ResourceAllocator>,
		factory: Arc<dyn WidgetFactory>,
		keep_alive_interval: Duration,
	) -> Self {
		Self {
			registry,
			widgets,
			allocator,
			factory,
			keep_alive_interval,
			elements: Arc::new(Mutex::new(HashMap::new())),
		}
	}

	/// Returns true if the element is bound or being bound.
	pub fn is_bound(&self, element_id: &str) -> bool {
		self.elements.lock().contains_key(element_id)
	}

	/// Binding recorded for an element, once allocation has completed.
	pub fn binding(&self, element_id: &str) -> Option<Binding> {
		match self.elements.lock().get(element_id) {
			Some(ElementState::Bound { binding, .. }) => Some(binding.clone()),
			_ => None,
		}
	}

	/// Binds `element` to a backend resource.
	///
	/// Returns `Ok(None)` without side effects when the element was already
	/// bound. An element with an empty id is rejected. An allocation failure,
	/// or dropping the future before allocation finishes, leaves the element
	/// unbound so it can be retried.
	pub async fn bind(&self, element: &ElementSpec, options: BindOptions) -> Result<Option<Binding>> {
		if element.id.is_empty() {
			return Err(Error::EmptyElementId);
		}
		let Some(reservation) = Reservation::claim(&self.elements, &element.id) else {
			tracing::debug!(element = %element.id, "seed.binder.already_bound");
			return Ok(None);
		};

		let allocation = self.allocator.allocate().await?;
		let res_id = allocation.res_id;
		let keep_alive = self.start_keep_alive(&res_id);

		let widget = self.factory.create(element, self.widgets.len());
		let widget_id = self.widgets.insert(res_id.clone(), Arc::clone(&widget));
		widget.attach_input_handler(&res_id);

		let init_url = options.init_url.filter(|url| !url.is_empty()).or_else(|| element.initialization_url.clone());
		if let Some(url) = init_url.filter(|url| !url.is_empty()) {
			self.registry.add_script_url(&res_id, url);
		}

		let init_json = options.init_json.filter(|json| !json.is_blank()).or_else(|| element.initialization_json.clone());
		if let Some(json) = init_json {
			self.record_init_json(&res_id, json);
		}

		self.registry.register(&res_id, allocation.is_new);

		let binding = Binding {
			widget_id,
			res_id,
			is_new: allocation.is_new,
		};
		tracing::info!(element = %element.id, res_id = %binding.res_id, is_new = binding.is_new, "seed.binder.bound");
		reservation.complete(binding.clone(), keep_alive);
		Ok(Some(binding))
	}

	fn record_init_json(&self, res_id: &ResourceId, json: InitJson) {
		match json.classify() {
			Ok(Some(SeedSource::Inline(dataset))) => self.registry.add_inline_json(res_id, dataset),
			Ok(Some(SeedSource::RemoteUrl(url))) => {
				self.registry.add_remote_json_url(res_id, url);
			}
			Ok(None) => {}
			Err(err) => tracing::error!(%res_id, error = %err, "seed.binder.invalid_init_json"),
		}
	}

	fn start_keep_alive(&self, res_id: &ResourceId) -> PeriodicTask {
		let allocator = Arc::clone(&self.allocator);
		let res_id = res_id.clone();
		spawn_periodic(TaskClass::Background, "keep-alive", self.keep_alive_interval, move || {
			let allocator = Arc::clone(&allocator);
			let res_id = res_id.clone();
			async move {
				if let Err(err) = allocator.keep_alive(&res_id).await {
					tracing::warn!(%res_id, error = %err, "seed.binder.keep_alive_failed");
				}
			}
		})
	}

	/// Stops every keep-alive ticker started by this binder.
	pub async fn shutdown(&self) {
		let tickers: Vec<PeriodicTask> = self
			.elements
			.lock()
			.drain()
			.filter_map(|(_, state)| match state {
				ElementState::Bound { keep_alive, .. } => Some(keep_alive),
				ElementState::Binding => None,
			})
			.collect();
		for ticker in tickers {
			ticker.shutdown().await;
		}
	}
}
