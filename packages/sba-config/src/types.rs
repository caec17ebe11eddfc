use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub cluster: Cluster,
	pub retrieval: Retrieval,
	pub providers: Providers,
	pub audit: Option<Audit>,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Cluster {
	pub endpoint: String,
	/// Environment variable holding a JSON basic-auth payload
	/// (`{"username": ..., "password": ...}`).
	pub secret_env: Option<String>,
	pub username: Option<String>,
	pub password: Option<String>,
	#[serde(default = "default_connect_timeout_ms")]
	pub connect_timeout_ms: u64,
	#[serde(default = "default_request_timeout_ms")]
	pub request_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Retrieval {
	pub index_a: String,
	pub index_b: String,
	pub vector_dim: u32,
	#[serde(default = "default_top_k_per_index")]
	pub top_k_per_index: u32,
	#[serde(default = "default_rerank_k")]
	pub rerank_k: u32,
	#[serde(default = "default_vector_field_candidates")]
	pub vector_field_candidates: Vec<String>,
	#[serde(default = "default_snippet_max_chars")]
	pub snippet_max_chars: usize,
	#[serde(default = "default_rerank_snippet_chars")]
	pub rerank_snippet_chars: usize,
	#[serde(default = "default_rerank_tags_chars")]
	pub rerank_tags_chars: usize,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub reasoning: ReasoningProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ReasoningProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Audit {
	pub endpoint: String,
	pub bucket: String,
	#[serde(default = "default_audit_prefix")]
	pub prefix: String,
	pub api_key: Option<String>,
	#[serde(default = "default_audit_timeout_ms")]
	pub timeout_ms: u64,
}

fn default_connect_timeout_ms() -> u64 {
	5_000
}

fn default_request_timeout_ms() -> u64 {
	20_000
}

fn default_top_k_per_index() -> u32 {
	10
}

fn default_rerank_k() -> u32 {
	10
}

fn default_vector_field_candidates() -> Vec<String> {
	["embedding", "embedding_vector", "vector", "embedding_vector_1024"]
		.into_iter()
		.map(str::to_string)
		.collect()
}

fn default_snippet_max_chars() -> usize {
	500
}

fn default_rerank_snippet_chars() -> usize {
	1_200
}

fn default_rerank_tags_chars() -> usize {
	400
}

fn default_audit_prefix() -> String {
	"agents/".to_string()
}

fn default_audit_timeout_ms() -> u64 {
	10_000
}
