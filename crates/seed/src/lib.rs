//! Seed-data initialization for console widgets that share a backend resource.
//!
//! Widgets are bound through an [`InitContext`], which allocates a resource,
//! records each widget's declared seed inputs in the [`ResourceInitRegistry`]
//! and later drives the [`InitSequencer`]:
//!
//! 1. remote JSON is fetched and merged into the resource's [`Dataset`];
//! 2. once every fetch has settled, initialization scripts and one bulk load
//!    of the dataset run concurrently.
//!
//! Both phases hold the [`PendingGate`], so widget input stays disabled while
//! any phase is outstanding.

pub mod backend;
pub mod binder;
pub mod config;
pub mod context;
pub mod dataset;
pub mod error;
pub mod gate;
pub mod registry;
pub mod resource;
pub mod sequencer;
pub mod source;
pub mod widget;

pub use backend::{InitTransport, ResourceAllocator};
pub use binder::{BindOptions, Binding, ElementSpec, WidgetBinder, WidgetFactory};
pub use config::InitConfig;
pub use context::InitContext;
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use gate::{FAILURE_ADVISORY, PendingGate};
pub use registry::{ResourceInitRegistry, ResourceInitState};
pub use resource::{Allocation, ResourceId};
pub use sequencer::{InitPhase, InitReport, InitSequencer};
pub use source::{InitJson, SeedSource};
pub use widget::{BroadcastScope, Widget, WidgetId, WidgetSet};
