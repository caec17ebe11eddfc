use std::time::Instant;

use tracing::warn;
use uuid::Uuid;

use sba_search::Candidate;

use crate::{Error, RagService, Result, merge::merge, rerank::rerank};

/// Compact, citation-friendly projection of one candidate.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchHit {
	pub doc_id: String,
	pub index: String,
	pub url: String,
	pub title: String,
	pub snippet: String,
	pub vector_score: f32,
	pub rerank_score: Option<f32>,
	pub industry_tags: Vec<String>,
	pub theme_tags: Vec<String>,
}

/// `results` preserves merged vector order truncated to the rerank budget;
/// `reranked` is the reranker's order. Both are returned so a caller can fall
/// back to vector-only ranking when reranking is degraded.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchResponse {
	pub query: String,
	pub results: Vec<SearchHit>,
	pub reranked: Vec<SearchHit>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StageTiming {
	pub stage: String,
	pub duration_ms: u64,
}

/// Ephemeral per-call observability record. Never persisted by the core; the
/// front door hands it to the audit sink.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RetrievalTrace {
	pub trace_id: Uuid,
	pub query: String,
	pub stages: Vec<StageTiming>,
	/// Indexes that failed and were excluded from this call's results.
	pub degraded_indexes: Vec<String>,
}

impl RetrievalTrace {
	fn new(query: &str) -> Self {
		Self {
			trace_id: Uuid::new_v4(),
			query: query.to_string(),
			stages: Vec::new(),
			degraded_indexes: Vec::new(),
		}
	}

	fn record(&mut self, stage: &str, started: Instant) {
		self.stages.push(StageTiming {
			stage: stage.to_string(),
			duration_ms: started.elapsed().as_millis() as u64,
		});
	}
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
	pub response: SearchResponse,
	pub trace: RetrievalTrace,
}

impl RagService {
	/// One full retrieval call: embed, search both indexes, merge, truncate,
	/// rerank, and package.
	pub async fn search(&self, query: &str) -> Result<SearchOutcome> {
		let total_started = Instant::now();
		let mut trace = RetrievalTrace::new(query);

		let embed_started = Instant::now();
		let vector =
			self.providers.embedding.embed(&self.cfg.providers.embedding, query).await?;

		trace.record("embed", embed_started);

		let retrieval = &self.cfg.retrieval;
		let ((outcome_a, ms_a), (outcome_b, ms_b)) = tokio::join!(
			self.timed_knn(&retrieval.index_a, &vector),
			self.timed_knn(&retrieval.index_b, &vector),
		);

		trace.stages.push(StageTiming {
			stage: format!("knn_search:{}", retrieval.index_a),
			duration_ms: ms_a,
		});
		trace.stages.push(StageTiming {
			stage: format!("knn_search:{}", retrieval.index_b),
			duration_ms: ms_b,
		});

		let mut batches = Vec::new();
		let mut failures = Vec::new();
		for (index, outcome) in [
			(retrieval.index_a.as_str(), outcome_a),
			(retrieval.index_b.as_str(), outcome_b),
		] {
			match outcome {
				Ok(candidates) => batches.push(candidates),
				Err(err) => {
					warn!(index, error = %err, "Index search failed; degrading to the surviving index.");
					trace.degraded_indexes.push(index.to_string());
					failures.push(err);
				},
			}
		}
		if batches.is_empty() {
			let causes =
				failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");

			return Err(Error::Search {
				message: format!("All indexes failed: {causes}"),
			});
		}

		let merged = merge(batches);
		let top = merged.into_iter().take(retrieval.rerank_k as usize).collect::<Vec<_>>();
		if top.is_empty() {
			trace.record("total", total_started);

			return Ok(SearchOutcome {
				response: SearchResponse {
					query: query.to_string(),
					results: Vec::new(),
					reranked: Vec::new(),
				},
				trace,
			});
		}

		let rerank_started = Instant::now();
		let reranked = match rerank(
			self.providers.reasoning.as_ref(),
			&self.cfg,
			query,
			top.clone(),
		)
		.await
		{
			Ok(reranked) => reranked,
			Err(Error::RerankParse { message }) => {
				warn!(%message, "Reranker reply unparseable; returning vector-only order.");

				Vec::new()
			},
			Err(other) => return Err(other),
		};

		trace.record("rerank", rerank_started);

		let response = SearchResponse {
			query: query.to_string(),
			results: self.pack(&top),
			reranked: self.pack(&reranked),
		};

		trace.record("total", total_started);

		Ok(SearchOutcome { response, trace })
	}

	async fn timed_knn(
		&self,
		index: &str,
		vector: &[f32],
	) -> (Result<Vec<Candidate>, sba_search::Error>, u64) {
		let started = Instant::now();
		let outcome = self.knn(index, vector).await;

		(outcome, started.elapsed().as_millis() as u64)
	}

	async fn knn(
		&self,
		index: &str,
		vector: &[f32],
	) -> Result<Vec<Candidate>, sba_search::Error> {
		sba_search::knn_search(
			self.backend.as_ref(),
			&self.mapping_cache,
			index,
			&self.cfg.retrieval.vector_field_candidates,
			vector,
			self.cfg.retrieval.top_k_per_index,
		)
		.await
	}

	fn pack(&self, candidates: &[Candidate]) -> Vec<SearchHit> {
		candidates
			.iter()
			.map(|candidate| SearchHit {
				doc_id: candidate.doc_id.clone(),
				index: candidate.index.clone(),
				url: candidate.url.clone(),
				title: candidate.title.clone(),
				snippet: snippet(&candidate.body, self.cfg.retrieval.snippet_max_chars),
				vector_score: candidate.vector_score,
				rerank_score: candidate.rerank_score,
				industry_tags: candidate.industry_tags.clone(),
				theme_tags: candidate.theme_tags.clone(),
			})
			.collect()
	}
}

fn snippet(body: &str, limit: usize) -> String {
	let mut out = body.chars().take(limit).collect::<String>();

	if body.chars().count() > limit {
		out.push('…');
	}

	out
}
