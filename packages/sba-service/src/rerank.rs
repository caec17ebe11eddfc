use std::{cmp::Ordering, collections::HashMap};

use serde_json::Value;

use sba_search::Candidate;

use crate::{Error, ReasoningProvider, Result};

const SYSTEM_PROMPT: &str = "You are a precise ranking model. \
	Score each document [0.0..1.0] for relevance to the query. \
	Use title/snippet PLUS metadata tags: industry_tags, theme_tags, tags_text. \
	Boost direct/strong tag matches; penalize irrelevant tag spam. \
	Return only JSON.";
const INSTRUCTIONS: &str =
	r#"Return ONLY JSON like: [{"doc_id":"...","score":0.87}, ...] sorted by score desc."#;

/// Second-pass relevance scoring over a bounded candidate set.
///
/// Every input candidate comes back with a rerank score attached; ids the
/// model did not mention score 0.0 rather than being dropped. Output order is
/// descending `(rerank_score, vector_score)`, stable for full ties.
pub async fn rerank(
	provider: &dyn ReasoningProvider,
	cfg: &sba_config::Config,
	query: &str,
	candidates: Vec<Candidate>,
) -> Result<Vec<Candidate>> {
	let documents = candidates
		.iter()
		.map(|candidate| {
			serde_json::json!({
				"doc_id": candidate.doc_id,
				"index": candidate.index,
				"title": trim(&candidate.title, cfg.retrieval.rerank_snippet_chars),
				"snippet": trim(&candidate.body, cfg.retrieval.rerank_snippet_chars),
				"url": candidate.url,
				"vector_score": candidate.vector_score,
				"industry_tags": candidate.industry_tags,
				"theme_tags": candidate.theme_tags,
				"tags_text": trim(&candidate.tags_text, cfg.retrieval.rerank_tags_chars),
			})
		})
		.collect::<Vec<_>>();
	let payload = serde_json::json!({
		"query": query,
		"documents": documents,
		"instructions": INSTRUCTIONS,
	});
	let messages =
		[serde_json::json!({ "role": "user", "content": [{ "text": payload.to_string() }] })];
	let reply =
		provider.converse(&cfg.providers.reasoning, SYSTEM_PROMPT, &messages).await?;
	let scores = parse_ranked_scores(&reply)?;

	Ok(attach_and_sort(candidates, &scores))
}

/// Parse the reasoning model's ranked-score reply.
///
/// Accepts an optional code fence and an optional leading `json` language
/// marker around the JSON array. Entries missing `doc_id` or `score` are
/// skipped; anything that is not a JSON array is a hard parse failure.
pub(crate) fn parse_ranked_scores(reply: &str) -> Result<HashMap<String, f32>> {
	let text = reply.trim().trim_matches('`').trim();
	let text = match text.get(..4) {
		Some(prefix) if prefix.eq_ignore_ascii_case("json") => text[4..].trim_start(),
		_ => text,
	};
	let ranked: Value = serde_json::from_str(text)
		.map_err(|err| Error::RerankParse { message: err.to_string() })?;
	let Some(items) = ranked.as_array() else {
		return Err(Error::RerankParse {
			message: "Reranker reply is not a JSON array.".to_string(),
		});
	};

	Ok(items
		.iter()
		.filter_map(|item| {
			let doc_id = item.get("doc_id")?.as_str()?.to_string();
			let score = item.get("score")?.as_f64()? as f32;

			Some((doc_id, score))
		})
		.collect())
}

fn attach_and_sort(
	mut candidates: Vec<Candidate>,
	scores: &HashMap<String, f32>,
) -> Vec<Candidate> {
	for candidate in &mut candidates {
		candidate.rerank_score = Some(scores.get(&candidate.doc_id).copied().unwrap_or(0.0));
	}

	candidates.sort_by(|a, b| {
		let (ra, rb) = (a.rerank_score.unwrap_or(0.0), b.rerank_score.unwrap_or(0.0));

		rb.partial_cmp(&ra).unwrap_or(Ordering::Equal).then_with(|| {
			b.vector_score.partial_cmp(&a.vector_score).unwrap_or(Ordering::Equal)
		})
	});

	candidates
}

/// Flatten newlines and cap length in characters, marking actual truncation
/// with an ellipsis.
pub(crate) fn trim(text: &str, limit: usize) -> String {
	let flat = text.replace('\n', " ");
	let flat = flat.trim();
	let mut out = flat.chars().take(limit).collect::<String>();

	if flat.chars().count() > limit {
		out.push('…');
	}

	out
}
