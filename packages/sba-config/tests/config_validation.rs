use toml::Value;

use sba_config::{Config, Error};

const SAMPLE_CONFIG_TOML: &str = r#"
[service]
http_bind = "127.0.0.1:8080"
log_level = "info"

[cluster]
endpoint = "https://search.example.com/"
secret_env = "SBA_SEARCH_BASIC_AUTH"

[retrieval]
index_a = "business_chunks_v2"
index_b = "video_rag_v4"
vector_dim = 1024

[providers.embedding]
api_base = "https://models.example.com"
api_key = "embed-key"
model = "titan-embed-v2"
dimensions = 1024
timeout_ms = 30000

[providers.reasoning]
api_base = "https://models.example.com"
api_key = "reason-key"
model = "sonnet-ranker"
timeout_ms = 30000
"#;

fn sample_value() -> Value {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.")
}

fn parse(value: &Value) -> Result<(), Error> {
	let raw = toml::to_string(value).expect("Failed to render config.");
	let cfg: Config = toml::from_str(&raw).expect("Failed to deserialize config.");

	sba_config::validate(&cfg)
}

fn set(value: &mut Value, path: &[&str], leaf: Value) {
	let mut cur = value;
	for part in &path[..path.len() - 1] {
		cur = cur
			.as_table_mut()
			.and_then(|table| table.get_mut(*part))
			.expect("Missing config table.");
	}
	cur.as_table_mut()
		.expect("Config node must be a table.")
		.insert(path[path.len() - 1].to_string(), leaf);
}

#[test]
fn sample_config_passes_validation() {
	parse(&sample_value()).expect("Sample config must validate.");
}

#[test]
fn defaults_match_retrieval_conventions() {
	let raw = toml::to_string(&sample_value()).expect("Failed to render config.");
	let cfg: Config = toml::from_str(&raw).expect("Failed to deserialize config.");

	assert_eq!(cfg.retrieval.top_k_per_index, 10);
	assert_eq!(cfg.retrieval.rerank_k, 10);
	assert_eq!(cfg.retrieval.snippet_max_chars, 500);
	assert_eq!(cfg.retrieval.rerank_snippet_chars, 1_200);
	assert_eq!(cfg.retrieval.rerank_tags_chars, 400);
	assert_eq!(
		cfg.retrieval.vector_field_candidates,
		vec!["embedding", "embedding_vector", "vector", "embedding_vector_1024"]
	);
}

#[test]
fn rejects_zero_vector_dim() {
	let mut value = sample_value();

	set(&mut value, &["retrieval", "vector_dim"], Value::Integer(0));
	set(&mut value, &["providers", "embedding", "dimensions"], Value::Integer(0));

	assert!(matches!(parse(&value), Err(Error::Validation { .. })));
}

#[test]
fn rejects_embedding_dimension_drift() {
	let mut value = sample_value();

	set(&mut value, &["providers", "embedding", "dimensions"], Value::Integer(768));

	assert!(matches!(parse(&value), Err(Error::Validation { .. })));
}

#[test]
fn rejects_missing_cluster_auth() {
	let mut value = sample_value();

	set(&mut value, &["cluster", "secret_env"], Value::String(String::new()));

	let raw = toml::to_string(&value).expect("Failed to render config.");
	let mut cfg: Config = toml::from_str(&raw).expect("Failed to deserialize config.");

	// An empty secret_env normalizes to None on load.
	cfg.cluster.secret_env = None;

	assert!(cfg.cluster.username.is_none());
	assert!(matches!(sba_config::validate(&cfg), Err(Error::Validation { .. })));
}

#[test]
fn rejects_empty_provider_api_key() {
	let mut value = sample_value();

	set(&mut value, &["providers", "reasoning", "api_key"], Value::String(" ".to_string()));

	assert!(matches!(parse(&value), Err(Error::Validation { .. })));
}

#[test]
fn rejects_zero_rerank_budget() {
	let mut value = sample_value();

	set(&mut value, &["retrieval", "rerank_k"], Value::Integer(0));

	assert!(matches!(parse(&value), Err(Error::Validation { .. })));
}
