//! HTTP client for the shell server endpoints used during initialization.

use async_trait::async_trait;
use mws_seed::{Allocation, Dataset, Error, InitTransport, ResourceAllocator, ResourceId, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use url::Url;

use crate::config::ServerConfig;

#[derive(Serialize)]
struct ResourceBody<'a> {
	res_id: &'a ResourceId,
}

#[derive(Serialize)]
struct LoadJsonBody<'a> {
	res_id: &'a ResourceId,
	collections: &'a Dataset,
}

/// Allocator and transport backed by one shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
	client: Client,
	config: ServerConfig,
}

impl HttpBackend {
	pub fn new(config: ServerConfig) -> Result<Self> {
		let client = Client::builder()
			.timeout(config.request_timeout())
			.build()
			.map_err(|e| Error::Request {
				url: config.base_url.to_string(),
				message: format!("failed to build http client: {e}"),
			})?;
		Ok(Self { client, config })
	}

	/// Resolves an absolute URL or a path against the configured base URL.
	pub fn resolve(&self, url: &str) -> Result<Url> {
		self.config.base_url.join(url).map_err(|e| Error::Request {
			url: url.to_string(),
			message: format!("invalid url: {e}"),
		})
	}

	fn allocate_url(&self) -> Result<Url> {
		self.resolve("/mws/")
	}

	fn keep_alive_url(&self, res_id: &ResourceId) -> Result<Url> {
		self.resolve(&format!("/mws/{res_id}/keep-alive"))
	}

	async fn send(&self, url: &Url, request: RequestBuilder) -> Result<Response> {
		let response = request.send().await.map_err(|e| Error::Request {
			url: url.to_string(),
			message: e.to_string(),
		})?;

		let status = response.status();
		if !status.is_success() {
			tracing::debug!(%url, status = status.as_u16(), "seed.http.status");
			return Err(Error::Status {
				url: url.to_string(),
				status: status.as_u16(),
			});
		}
		Ok(response)
	}

	async fn post_json<B: Serialize + ?Sized>(&self, url: &Url, body: &B) -> Result<Response> {
		tracing::trace!(%url, "seed.http.post");
		self.send(url, self.client.post(url.clone()).json(body)).await
	}
}

#[async_trait]
impl ResourceAllocator for HttpBackend {
	async fn allocate(&self) -> Result<Allocation> {
		let url = self.allocate_url()?;
		let response = self
			.send(&url, self.client.post(url.clone()))
			.await
			.map_err(|e| Error::Allocation(e.to_string()))?;
		response
			.json::<Allocation>()
			.await
			.map_err(|e| Error::Allocation(format!("invalid response from {url}: {e}")))
	}

	async fn keep_alive(&self, res_id: &ResourceId) -> Result<()> {
		let url = self.keep_alive_url(res_id)?;
		self.send(&url, self.client.post(url.clone())).await?;
		Ok(())
	}
}

#[async_trait]
impl InitTransport for HttpBackend {
	async fn run_script(&self, url: &str, res_id: &ResourceId) -> Result<()> {
		let url = self.resolve(url)?;
		self.post_json(&url, &ResourceBody { res_id }).await?;
		Ok(())
	}

	async fn fetch_json(&self, url: &str) -> Result<Dataset> {
		let url = self.resolve(url)?;
		tracing::trace!(%url, "seed.http.get");
		let response = self.send(&url, self.client.get(url.clone())).await?;
		response.json::<Dataset>().await.map_err(|e| Error::Request {
			url: url.to_string(),
			message: format!("invalid json: {e}"),
		})
	}

	async fn load_json(&self, res_id: &ResourceId, collections: &Dataset) -> Result<()> {
		let url = self.resolve(&self.config.load_json_path)?;
		self.post_json(&url, &LoadJsonBody { res_id, collections }).await?;
		Ok(())
	}
}
