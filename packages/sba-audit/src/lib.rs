//! Best-effort audit-log sink.
//!
//! Writes redacted JSON blobs to an object store keyed by user, area, and
//! timestamp. The sink never interrupts a retrieval call: failures are logged
//! and swallowed, and an unconfigured sink is a no-op.

mod redact;

pub use redact::{redact, secret_like_key};

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use reqwest::Client;
use serde_json::Value;
use time::{OffsetDateTime, macros::format_description};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
	Prompts,
	Answers,
	Reasoning,
}

impl Area {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Prompts => "prompts",
			Self::Answers => "answers",
			Self::Reasoning => "reasoning",
		}
	}
}

pub trait AuditSink
where
	Self: Send + Sync,
{
	/// Record one payload. Best-effort: implementations log failures and
	/// never propagate them.
	fn record<'a>(&'a self, user_id: &'a str, area: Area, payload: Value) -> BoxFuture<'a, ()>;
}

/// Build the sink the configuration asks for; absent config means no-op.
pub fn from_config(cfg: Option<&sba_config::Audit>) -> Arc<dyn AuditSink> {
	match cfg {
		Some(audit) => match ObjectStoreSink::new(audit) {
			Ok(sink) => Arc::new(sink),
			Err(err) => {
				tracing::warn!(error = %err, "Audit sink unavailable; falling back to no-op.");

				Arc::new(NoopSink)
			},
		},
		None => Arc::new(NoopSink),
	}
}

pub struct NoopSink;
impl AuditSink for NoopSink {
	fn record<'a>(&'a self, _user_id: &'a str, _area: Area, _payload: Value) -> BoxFuture<'a, ()> {
		Box::pin(async {})
	}
}

/// Object-store sink: one HTTP PUT per record.
pub struct ObjectStoreSink {
	client: Client,
	endpoint: String,
	bucket: String,
	prefix: String,
	api_key: Option<String>,
}

impl ObjectStoreSink {
	pub fn new(cfg: &sba_config::Audit) -> Result<Self, reqwest::Error> {
		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self {
			client,
			endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
			bucket: cfg.bucket.clone(),
			prefix: cfg.prefix.clone(),
			api_key: cfg.api_key.clone(),
		})
	}

	async fn put(&self, key: &str, payload: &Value) -> Result<(), reqwest::Error> {
		let url = format!("{}/{}/{key}", self.endpoint, self.bucket);
		let mut request = self
			.client
			.put(url)
			.header("content-type", "application/json; charset=utf-8")
			.body(payload.to_string());
		if let Some(api_key) = &self.api_key {
			request = request.bearer_auth(api_key);
		}

		request.send().await?.error_for_status()?;

		Ok(())
	}
}

impl AuditSink for ObjectStoreSink {
	fn record<'a>(&'a self, user_id: &'a str, area: Area, payload: Value) -> BoxFuture<'a, ()> {
		Box::pin(async move {
			let redacted = redact(payload, &secret_like_key);
			let key = object_key(&self.prefix, user_id, area, &timestamp());

			if let Err(err) = self.put(&key, &redacted).await {
				tracing::warn!(key, error = %err, "Audit write failed; continuing.");
			}
		})
	}
}

/// `{prefix}/users/{user_id}/{area}/{ts}.json`, with a single slash between
/// prefix and the rest regardless of how the prefix was configured.
pub fn object_key(prefix: &str, user_id: &str, area: Area, ts: &str) -> String {
	format!("{}/users/{user_id}/{}/{ts}.json", prefix.trim_end_matches('/'), area.as_str())
}

/// Path-safe UTC timestamp, e.g. `2025-10-08T16-21-09Z`.
fn timestamp() -> String {
	let format = format_description!("[year]-[month]-[day]T[hour]-[minute]-[second]Z");

	OffsetDateTime::now_utc().format(&format).unwrap_or_else(|_| "unknown-ts".to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn object_keys_follow_the_user_area_layout() {
		let key = object_key("agents/", "u-42", Area::Prompts, "2025-10-08T16-21-09Z");

		assert_eq!(key, "agents/users/u-42/prompts/2025-10-08T16-21-09Z.json");
	}

	#[test]
	fn area_labels_are_stable() {
		assert_eq!(Area::Prompts.as_str(), "prompts");
		assert_eq!(Area::Answers.as_str(), "answers");
		assert_eq!(Area::Reasoning.as_str(), "reasoning");
	}

	#[tokio::test]
	async fn noop_sink_accepts_anything() {
		NoopSink.record("u-1", Area::Answers, serde_json::json!({"ok": true})).await;
	}
}
