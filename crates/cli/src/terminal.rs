use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use mws_seed::{ElementSpec, ResourceId, Widget, WidgetFactory};

/// Console widget rendered as prefixed lines on stdout.
#[derive(Debug)]
pub struct TerminalWidget {
	label: String,
	res_id: OnceLock<ResourceId>,
	input_enabled: AtomicBool,
}

impl TerminalWidget {
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			res_id: OnceLock::new(),
			input_enabled: AtomicBool::new(true),
		}
	}

	pub fn res_id(&self) -> Option<&ResourceId> {
		self.res_id.get()
	}

	pub fn input_enabled(&self) -> bool {
		self.input_enabled.load(Ordering::Acquire)
	}

	fn print(&self, line: &str) {
		let mut out = std::io::stdout().lock();
		// Closed stdout only loses the echo.
		let _ = writeln!(out, "[{}] {line}", self.label);
	}
}

impl Widget for TerminalWidget {
	fn attach_input_handler(&self, res_id: &ResourceId) {
		if self.res_id.set(res_id.clone()).is_err() {
			tracing::warn!(widget = %self.label, %res_id, "cli.widget.reattach");
			return;
		}
		tracing::debug!(widget = %self.label, %res_id, "cli.widget.attach");
	}

	fn disable_input(&self) {
		if self.input_enabled.swap(false, Ordering::AcqRel) {
			self.print("input locked while the resource is seeded");
		}
	}

	fn enable_input(&self) {
		if !self.input_enabled.swap(true, Ordering::AcqRel) {
			self.print("ready");
		}
	}

	fn append_message(&self, lines: &[&str]) {
		for line in lines {
			self.print(line);
		}
	}
}

/// Creates one [`TerminalWidget`] per page element, labelled by element id.
#[derive(Debug, Default)]
pub struct TerminalFactory;

impl WidgetFactory for TerminalFactory {
	fn create(&self, element: &ElementSpec, _index: usize) -> Arc<dyn Widget> {
		Arc::new(TerminalWidget::new(element.id.clone()))
	}
}
