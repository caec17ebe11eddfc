mod error;

pub mod merge;
pub mod rerank;
pub mod search;

pub use error::{Error, Result};
pub use merge::merge;
pub use search::{RetrievalTrace, SearchHit, SearchOutcome, SearchResponse, StageTiming};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use sba_config::{Config, EmbeddingProviderConfig, ReasoningProviderConfig};
use sba_search::{MappingCache, SearchBackend};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, sba_providers::Result<Vec<f32>>>;
}

pub trait ReasoningProvider
where
	Self: Send + Sync,
{
	fn converse<'a>(
		&'a self,
		cfg: &'a ReasoningProviderConfig,
		system: &'a str,
		messages: &'a [Value],
	) -> BoxFuture<'a, sba_providers::Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub reasoning: Arc<dyn ReasoningProvider>,
}

impl Providers {
	/// The production wiring: hosted-model HTTP clients from `sba-providers`.
	pub fn over_http() -> Self {
		Self { embedding: Arc::new(HttpEmbedding), reasoning: Arc::new(HttpReasoning) }
	}
}

struct HttpEmbedding;
impl EmbeddingProvider for HttpEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, sba_providers::Result<Vec<f32>>> {
		Box::pin(sba_providers::embedding::embed(cfg, text))
	}
}

struct HttpReasoning;
impl ReasoningProvider for HttpReasoning {
	fn converse<'a>(
		&'a self,
		cfg: &'a ReasoningProviderConfig,
		system: &'a str,
		messages: &'a [Value],
	) -> BoxFuture<'a, sba_providers::Result<String>> {
		Box::pin(sba_providers::converse::converse(cfg, system, messages))
	}
}

/// The retrieval orchestrator: owns the configuration, the cluster backend,
/// the mapping caches, and the model providers.
pub struct RagService {
	pub cfg: Config,
	pub(crate) backend: Arc<dyn SearchBackend>,
	pub(crate) mapping_cache: MappingCache,
	pub(crate) providers: Providers,
}

impl RagService {
	pub fn new(cfg: Config, backend: Arc<dyn SearchBackend>, providers: Providers) -> Self {
		Self { cfg, backend, mapping_cache: MappingCache::new(), providers }
	}

	/// Liveness gate against the cluster, typically run once at startup.
	pub async fn ping(&self) -> Result<()> {
		Ok(self.backend.ping().await?)
	}

	/// Drops the resolved field-mapping state; test isolation only.
	pub fn clear_mapping_cache(&self) {
		self.mapping_cache.clear();
	}
}
