use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;

use crate::resource::ResourceId;

/// Broadcast hooks every bound console widget implements.
pub trait Widget: Send + Sync {
	/// Routes the widget's user input to the given resource.
	fn attach_input_handler(&self, res_id: &ResourceId);

	/// Blocks user input.
	fn disable_input(&self);

	/// Accepts user input again.
	fn enable_input(&self);

	/// Prints lines into the widget's output area.
	fn append_message(&self, lines: &[&str]);
}

/// Position of a widget in its [`WidgetSet`], in binding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(usize);

impl WidgetId {
	pub const fn index(self) -> usize {
		self.0
	}
}

/// Which widgets receive lock, unlock and advisory notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadcastScope {
	/// Every bound widget, whatever resource it is bound to.
	#[default]
	Shared,
	/// Only widgets bound to the resource being initialized.
	PerResource,
}

struct BoundWidget {
	res_id: ResourceId,
	widget: Arc<dyn Widget>,
}

/// Live collection of bound widgets, used as the broadcast target.
#[derive(Clone)]
pub struct WidgetSet {
	scope: BroadcastScope,
	inner: Arc<RwLock<Vec<BoundWidget>>>,
}

impl fmt::Debug for WidgetSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WidgetSet").field("scope", &self.scope).field("len", &self.len()).finish()
	}
}

impl WidgetSet {
	pub fn new(scope: BroadcastScope) -> Self {
		Self {
			scope,
			inner: Arc::new(RwLock::new(Vec::new())),
		}
	}

	pub fn scope(&self) -> BroadcastScope {
		self.scope
	}

	/// Adds a widget bound to `res_id`.
	pub fn insert(&self, res_id: ResourceId, widget: Arc<dyn Widget>) -> WidgetId {
		let mut guard = self.inner.write();
		let id = WidgetId(guard.len());
		guard.push(BoundWidget { res_id, widget });
		id
	}

	pub fn len(&self) -> usize {
		self.inner.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn get(&self, id: WidgetId) -> Option<Arc<dyn Widget>> {
		self.inner.read().get(id.0).map(|bound| Arc::clone(&bound.widget))
	}

	/// Resource a widget is bound to.
	pub fn resource_of(&self, id: WidgetId) -> Option<ResourceId> {
		self.inner.read().get(id.0).map(|bound| bound.res_id.clone())
	}

	/// Widgets that receive notifications about `res_id` under the current scope.
	pub fn targets(&self, res_id: &ResourceId) -> Vec<Arc<dyn Widget>> {
		self.inner
			.read()
			.iter()
			.filter(|bound| self.scope == BroadcastScope::Shared || bound.res_id == *res_id)
			.map(|bound| Arc::clone(&bound.widget))
			.collect()
	}

	/// Calls `f` on every target for `res_id`.
	///
	/// Targets are collected first, so widgets may call back into the set.
	pub fn broadcast(&self, res_id: &ResourceId, f: impl Fn(&dyn Widget)) {
		for widget in self.targets(res_id) {
			f(widget.as_ref());
		}
	}
}
