// std
use std::time::Duration as StdDuration;

// crates.io
use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// One deterministic chat-style call against the hosted reasoning model.
///
/// Temperature is pinned to zero; ranking callers depend on reproducible
/// output for identical payloads.
pub async fn converse(
	cfg: &sba_config::ReasoningProviderConfig,
	system: &str,
	messages: &[Value],
) -> Result<String> {
	let client = Client::builder().timeout(StdDuration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}/model/{}/converse", cfg.api_base, cfg.model);
	let body = serde_json::json!({
		"system": [{ "text": system }],
		"messages": messages,
		"inferenceConfig": { "temperature": 0 },
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_converse_text(json)
}

fn parse_converse_text(json: Value) -> Result<String> {
	json.get("output")
		.and_then(|v| v.get("message"))
		.and_then(|v| v.get("content"))
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|item| item.get("text"))
		.and_then(|v| v.as_str())
		.map(str::to_string)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Converse response is missing output message text.".to_string(),
		})
}
