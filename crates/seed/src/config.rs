use std::time::Duration;

use serde::Deserialize;

use crate::widget::BroadcastScope;

/// Interval between keep-alive pings when none is configured.
pub const DEFAULT_KEEP_ALIVE_SECS: u64 = 30;

/// Orchestrator settings, usually read from the `[init]` table of a page file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitConfig {
	/// Seconds between keep-alive pings for each bound widget.
	pub keep_alive_interval_secs: u64,
	/// Which widgets hear about a resource's lock state.
	pub broadcast: BroadcastScope,
}

impl Default for InitConfig {
	fn default() -> Self {
		Self {
			keep_alive_interval_secs: DEFAULT_KEEP_ALIVE_SECS,
			broadcast: BroadcastScope::default(),
		}
	}
}

impl InitConfig {
	/// Keep-alive period, never shorter than one second.
	pub fn keep_alive_interval(&self) -> Duration {
		Duration::from_secs(self.keep_alive_interval_secs.max(1))
	}
}
