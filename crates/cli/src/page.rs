use std::collections::HashSet;
use std::path::Path;

use mws_http::ServerConfig;
use mws_seed::{ElementSpec, InitConfig};
use serde::Deserialize;

use crate::error::{PageError, Result};

/// A page embedding console widgets, as described in a TOML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageConfig {
	pub server: ServerConfig,
	#[serde(default)]
	pub init: InitConfig,
	#[serde(default, rename = "widget")]
	pub widgets: Vec<ElementSpec>,
}

impl PageConfig {
	pub fn load(path: &Path) -> Result<Self> {
		let text = std::fs::read_to_string(path).map_err(|error| PageError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::parse(&text)
	}

	pub fn parse(text: &str) -> Result<Self> {
		let page: Self = toml::from_str(text)?;
		let mut seen = HashSet::new();
		if let Some(dup) = page.widgets.iter().find(|widget| !seen.insert(widget.id.as_str())) {
			return Err(PageError::DuplicateWidget(dup.id.clone()));
		}
		Ok(page)
	}
}
