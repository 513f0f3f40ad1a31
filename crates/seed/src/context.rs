use std::sync::Arc;

use crate::Result;
use crate::backend::{InitTransport, ResourceAllocator};
use crate::binder::{BindOptions, Binding, ElementSpec, WidgetBinder, WidgetFactory};
use crate::config::InitConfig;
use crate::gate::PendingGate;
use crate::registry::ResourceInitRegistry;
use crate::resource::ResourceId;
use crate::sequencer::{InitReport, InitSequencer};
use crate::widget::WidgetSet;

/// Owns all initialization state for one page session.
///
/// Registry, lock counters and the widget set are created empty with the
/// context and shared with the binder and sequencer it builds.
#[derive(Debug)]
pub struct InitContext {
	registry: ResourceInitRegistry,
	gate: PendingGate,
	widgets: WidgetSet,
	binder: WidgetBinder,
	sequencer: InitSequencer,
}

impl InitContext {
	pub fn new(
		config: InitConfig,
		allocator: Arc<dyn ResourceAllocator>,
		transport: Arc<dyn InitTransport>,
		factory: Arc<dyn WidgetFactory>,
	) -> Self {
		let registry = ResourceInitRegistry::new();
		let widgets = WidgetSet::new(config.broadcast);
		let gate = PendingGate::new(widgets.clone());
		let binder = WidgetBinder::new(registry.clone(), widgets.clone(), allocator, factory, config.keep_alive_interval());
		let sequencer = InitSequencer::new(registry.clone(), gate.clone(), transport);
		Self {
			registry,
			gate,
			widgets,
			binder,
			sequencer,
		}
	}

	pub fn registry(&self) -> &ResourceInitRegistry {
		&self.registry
	}

	pub fn gate(&self) -> &PendingGate {
		&self.gate
	}

	pub fn widgets(&self) -> &WidgetSet {
		&self.widgets
	}

	pub fn binder(&self) -> &WidgetBinder {
		&self.binder
	}

	/// Binds a widget to `element`. A second call for the same element is a no-op.
	pub async fn initialize_widget(&self, element: &ElementSpec, options: BindOptions) -> Result<Option<Binding>> {
		self.binder.bind(element, options).await
	}

	/// Seeds `res_id` if any of its bindings saw it freshly created.
	pub async fn run_initialization_for_resource(&self, res_id: &ResourceId) -> InitReport {
		self.sequencer.run(res_id).await
	}

	/// Seeds `res_id` again, for the user's reset-and-retry action.
	///
	/// Does nothing while a run of the same resource is still in flight.
	pub async fn reinitialize(&self, res_id: &ResourceId) -> InitReport {
		tracing::info!(%res_id, "seed.context.reinitialize");
		self.sequencer.rerun(res_id).await
	}

	/// Runs initialization for every known resource in registration order.
	pub async fn run_all(&self) -> Vec<InitReport> {
		let mut reports = Vec::new();
		for res_id in self.registry.resource_ids() {
			reports.push(self.sequencer.run(&res_id).await);
		}
		reports
	}

	/// Stops the keep-alive tickers of every bound widget.
	pub async fn shutdown(&self) {
		self.binder.shutdown().await;
	}
}
