use std::sync::{Arc, Mutex};

use axum::{
	body::Body,
	http::{Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

use sba_api::{routes, state::AppState};
use sba_audit::{Area, AuditSink, BoxFuture as AuditFuture};
use sba_config::{Config, EmbeddingProviderConfig, ReasoningProviderConfig};
use sba_search::{BoxFuture as SearchFuture, SearchBackend};
use sba_service::{BoxFuture, EmbeddingProvider, Providers, RagService, ReasoningProvider};

const TEST_CONFIG_TOML: &str = r#"
[service]
http_bind = "127.0.0.1:8080"
log_level = "info"

[cluster]
endpoint = "https://search.example.com"
username = "searcher"
password = "s3cret"

[retrieval]
index_a = "alpha"
index_b = "beta"
vector_dim = 4

[providers.embedding]
api_base = "https://models.example.com"
api_key = "embed-key"
model = "titan-embed-v2"
dimensions = 4
timeout_ms = 30000

[providers.reasoning]
api_base = "https://models.example.com"
api_key = "reason-key"
model = "sonnet-ranker"
timeout_ms = 30000
"#;

struct StubBackend;
impl SearchBackend for StubBackend {
	fn get_mapping<'a>(&'a self, index: &'a str) -> SearchFuture<'a, sba_search::Result<Value>> {
		Box::pin(async move {
			Ok(serde_json::json!({
				index: {
					"mappings": {
						"properties": { "embedding": { "type": "knn_vector", "dimension": 4 } }
					}
				}
			}))
		})
	}

	fn search<'a>(
		&'a self,
		index: &'a str,
		_body: &'a Value,
	) -> SearchFuture<'a, sba_search::Result<Value>> {
		Box::pin(async move {
			if index == "alpha" {
				Ok(serde_json::json!({ "hits": { "hits": [
					{ "_id": "d1", "_index": "alpha", "_score": 0.9,
					  "_source": { "title": "LLC filing", "body": "How to file." } }
				] } }))
			} else {
				Ok(serde_json::json!({ "hits": { "hits": [] } }))
			}
		})
	}

	fn ping<'a>(&'a self) -> SearchFuture<'a, sba_search::Result<()>> {
		Box::pin(async move { Ok(()) })
	}
}

struct StubEmbedding;
impl EmbeddingProvider for StubEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_text: &'a str,
	) -> BoxFuture<'a, sba_providers::Result<Vec<f32>>> {
		Box::pin(async move { Ok(vec![0.1, 0.2, 0.3, 0.4]) })
	}
}

struct StubReasoning;
impl ReasoningProvider for StubReasoning {
	fn converse<'a>(
		&'a self,
		_cfg: &'a ReasoningProviderConfig,
		_system: &'a str,
		_messages: &'a [Value],
	) -> BoxFuture<'a, sba_providers::Result<String>> {
		Box::pin(async move { Ok(r#"[{"doc_id":"d1","score":0.8}]"#.to_string()) })
	}
}

#[derive(Default)]
struct RecordingSink {
	areas: Mutex<Vec<&'static str>>,
}

impl AuditSink for RecordingSink {
	fn record<'a>(&'a self, _user_id: &'a str, area: Area, _payload: Value) -> AuditFuture<'a, ()> {
		self.areas.lock().unwrap_or_else(|err| err.into_inner()).push(area.as_str());

		Box::pin(async {})
	}
}

fn test_app(audit: Arc<RecordingSink>) -> axum::Router {
	let config: Config = toml::from_str(TEST_CONFIG_TOML).expect("Failed to parse test config.");
	let service = RagService::new(
		config,
		Arc::new(StubBackend),
		Providers { embedding: Arc::new(StubEmbedding), reasoning: Arc::new(StubReasoning) },
	);

	routes::router(AppState::with_parts(Arc::new(service), audit))
}

#[tokio::test]
async fn health_is_ok() {
	let app = test_app(Arc::new(RecordingSink::default()));
	let response = app
		.oneshot(Request::get("/health").body(Body::empty()).expect("Failed to build request."))
		.await
		.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn rag_search_returns_packed_results_and_audits_the_call() {
	let audit = Arc::new(RecordingSink::default());
	let app = test_app(audit.clone());
	let request = Request::post("/v1/rag/search")
		.header("content-type", "application/json")
		.body(Body::from(
			serde_json::json!({ "user_id": "u-1", "question": "How do I file an LLC?" })
				.to_string(),
		))
		.expect("Failed to build request.");
	let response = app.oneshot(request).await.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::OK);

	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read body.");
	let body: Value = serde_json::from_slice(&bytes).expect("Body is not JSON.");

	assert_eq!(body["results"][0]["doc_id"], "d1");
	assert_eq!(body["reranked"][0]["rerank_score"], 0.8);
	assert!(body["trace_id"].is_string());

	let areas = audit.areas.lock().expect("Sink lock poisoned.").clone();

	assert_eq!(areas, vec!["prompts", "answers", "reasoning"]);
}

#[tokio::test]
async fn blank_identities_are_rejected() {
	let app = test_app(Arc::new(RecordingSink::default()));
	let request = Request::post("/v1/rag/search")
		.header("content-type", "application/json")
		.body(Body::from(
			serde_json::json!({ "user_id": " ", "question": "hi" }).to_string(),
		))
		.expect("Failed to build request.");
	let response = app.oneshot(request).await.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
