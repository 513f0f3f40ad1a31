use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Default path of the bulk JSON load endpoint.
pub const DEFAULT_LOAD_JSON_PATH: &str = "/init/load_json";

/// Where the shell server lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
	/// Origin the relative endpoint paths and seed URLs are resolved against.
	pub base_url: Url,
	#[serde(default = "default_load_json_path")]
	pub load_json_path: String,
	#[serde(default = "default_request_timeout_secs")]
	pub request_timeout_secs: u64,
}

fn default_load_json_path() -> String {
	DEFAULT_LOAD_JSON_PATH.to_string()
}

fn default_request_timeout_secs() -> u64 {
	30
}

impl ServerConfig {
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			load_json_path: default_load_json_path(),
			request_timeout_secs: default_request_timeout_secs(),
		}
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}
}
