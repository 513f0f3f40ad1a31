//! Binds the console widgets of a page description and seeds their resources.

mod error;
mod page;
mod terminal;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use mws_http::HttpBackend;
use mws_seed::{BindOptions, InitContext};
use page::PageConfig;
use terminal::TerminalFactory;
use tracing::{error, info};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "mws-init")]
#[command(about = "Allocate console resources and load their seed data")]
struct Args {
	/// Page description listing the server and its widgets.
	#[arg(value_name = "PAGE")]
	page: PathBuf,

	/// Override `server.base_url` from the page description.
	#[arg(long, value_name = "URL")]
	base_url: Option<Url>,

	/// Keep resources alive until interrupted.
	#[arg(long)]
	hold: bool,

	/// Enable verbose logging.
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	let level = if args.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
	let subscriber = tracing_subscriber::fmt()
		.with_max_level(level)
		.with_writer(std::io::stderr)
		.finish();
	tracing::subscriber::set_global_default(subscriber)?;

	let mut page = PageConfig::load(&args.page)?;
	if let Some(base_url) = args.base_url {
		page.server.base_url = base_url;
	}
	info!(page = %args.page.display(), base_url = %page.server.base_url, widgets = page.widgets.len(), "Loaded page");

	let backend = Arc::new(HttpBackend::new(page.server.clone())?);
	let ctx = InitContext::new(page.init.clone(), backend.clone(), backend, Arc::new(TerminalFactory));

	for element in &page.widgets {
		match ctx.initialize_widget(element, BindOptions::default()).await {
			Ok(Some(binding)) => info!(element = %element.id, res_id = %binding.res_id, is_new = binding.is_new, "Bound widget"),
			Ok(None) => {}
			Err(err) => error!(element = %element.id, error = %err, "Failed to bind widget"),
		}
	}

	let reports = ctx.run_all().await;
	let mut failures = 0;
	for report in &reports {
		if report.ran() {
			failures += report.failure_count();
			info!(res_id = %report.res_id, failures = report.failure_count(), bulk_load = report.bulk_load_sent, "Seeded resource");
		} else {
			info!(res_id = %report.res_id, "Resource already initialized");
		}
	}

	if args.hold {
		info!("Holding resources, press Ctrl-C to release");
		tokio::signal::ctrl_c().await?;
	}

	ctx.shutdown().await;
	if failures > 0 {
		return Err(format!("{failures} initialization request(s) failed").into());
	}
	Ok(())
}
