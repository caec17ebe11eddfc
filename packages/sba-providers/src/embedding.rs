use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Embed one text through the hosted model's single-shot `invoke` endpoint.
///
/// The returned vector length is checked against the configured dimensions so
/// that a drifted upstream model can never feed an incompatible vector space
/// into the k-NN stage.
pub async fn embed(cfg: &sba_config::EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}/model/{}/invoke", cfg.api_base, cfg.model);
	let body = serde_json::json!({ "inputText": text });
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let vector = parse_embedding_response(json)?;

	ensure_dimensions(vector, cfg.dimensions as usize)
}

fn parse_embedding_response(json: Value) -> Result<Vec<f32>> {
	let embedding = json.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response is missing embedding array.".to_string() }
	})?;
	let mut vector = Vec::with_capacity(embedding.len());
	for value in embedding {
		let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
			message: "Embedding value must be numeric.".to_string(),
		})?;
		vector.push(number as f32);
	}

	Ok(vector)
}

fn ensure_dimensions(vector: Vec<f32>, expected: usize) -> Result<Vec<f32>> {
	if vector.len() != expected {
		return Err(Error::Dimension { expected, actual: vector.len() });
	}

	Ok(vector)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_embedding_array() {
		let json = serde_json::json!({ "embedding": [0.5, 1.5, -2.0] });
		let parsed = parse_embedding_response(json).expect("parse failed");
		assert_eq!(parsed, vec![0.5, 1.5, -2.0]);
	}

	#[test]
	fn rejects_missing_embedding() {
		let json = serde_json::json!({ "output": [] });
		assert!(matches!(
			parse_embedding_response(json),
			Err(Error::InvalidResponse { .. })
		));
	}

	#[test]
	fn rejects_dimension_mismatch_without_padding() {
		let err = ensure_dimensions(vec![0.1, 0.2], 1_024).unwrap_err();
		assert!(matches!(err, Error::Dimension { expected: 1_024, actual: 2 }));
	}

	#[test]
	fn accepts_exact_dimensions() {
		let vector = ensure_dimensions(vec![0.1, 0.2, 0.3], 3).expect("dimension check failed");
		assert_eq!(vector.len(), 3);
	}
}
