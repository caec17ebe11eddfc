use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{BoxFuture, Error, Result, SearchBackend};

/// HTTP client for the managed search cluster.
///
/// Basic-auth credentials resolve once at construction; a malformed secret is
/// a configuration error before any network traffic happens.
pub struct OpenSearchClient {
	client: Client,
	endpoint: String,
	username: String,
	password: String,
}

impl OpenSearchClient {
	pub fn new(cluster: &sba_config::Cluster) -> Result<Self> {
		let (username, password) = sba_providers::secrets::cluster_basic_auth(cluster)
			.map_err(|err| Error::InvalidConfig { message: err.to_string() })?;
		let client = Client::builder()
			.connect_timeout(Duration::from_millis(cluster.connect_timeout_ms))
			.timeout(Duration::from_millis(cluster.request_timeout_ms))
			.gzip(true)
			.build()?;

		Ok(Self { client, endpoint: cluster.endpoint.clone(), username, password })
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	async fn get_json(&self, index: &str, url: String) -> Result<Value> {
		let res = self
			.client
			.get(url)
			.basic_auth(&self.username, Some(&self.password))
			.send()
			.await?;
		let status = res.status();
		if !status.is_success() {
			return Err(Error::Cluster {
				index: index.to_string(),
				status: status.as_u16(),
				message: res.text().await.unwrap_or_default(),
			});
		}

		Ok(res.json().await?)
	}
}

impl SearchBackend for OpenSearchClient {
	fn get_mapping<'a>(&'a self, index: &'a str) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async move {
			self.get_json(index, format!("{}/{index}/_mapping", self.endpoint)).await
		})
	}

	fn search<'a>(&'a self, index: &'a str, body: &'a Value) -> BoxFuture<'a, Result<Value>> {
		Box::pin(async move {
			let res = self
				.client
				.post(format!("{}/{index}/_search", self.endpoint))
				.basic_auth(&self.username, Some(&self.password))
				.json(body)
				.send()
				.await?;
			let status = res.status();
			if !status.is_success() {
				return Err(Error::Cluster {
					index: index.to_string(),
					status: status.as_u16(),
					message: res.text().await.unwrap_or_default(),
				});
			}

			Ok(res.json().await?)
		})
	}

	fn ping<'a>(&'a self) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let res = self
				.client
				.get(&self.endpoint)
				.basic_auth(&self.username, Some(&self.password))
				.send()
				.await
				.map_err(|_| Error::Ping { endpoint: self.endpoint.clone() })?;
			if !res.status().is_success() {
				return Err(Error::Ping { endpoint: self.endpoint.clone() });
			}

			Ok(())
		})
	}
}
