use serde_json::Value;

use crate::{
	Candidate, Error, Result, SearchBackend,
	mapping::{MappingCache, resolve_vector_field},
};

/// Source attributes requested from the cluster. The vector itself is never
/// requested; it only inflates payloads.
pub const SOURCE_FIELDS: [&str; 7] =
	["title", "body", "text", "url", "industry_tags", "theme_tags", "tags_text"];

/// The two k-NN query-body shapes accepted across cluster versions, in probe
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryShape {
	/// `knn` nested under the query-predicate position.
	Nested,
	/// `knn` as a top-level sibling of `query`.
	TopLevel,
}

impl QueryShape {
	const ATTEMPT_ORDER: [Self; 2] = [Self::Nested, Self::TopLevel];

	fn body(self, field: &str, vector: &[f32], k: u32) -> Value {
		match self {
			Self::Nested => serde_json::json!({
				"size": k,
				"_source": SOURCE_FIELDS,
				"query": { "knn": { field: { "vector": vector, "k": k } } },
			}),
			Self::TopLevel => serde_json::json!({
				"size": k,
				"_source": SOURCE_FIELDS,
				"knn": { "field": field, "query_vector": vector, "k": k },
			}),
		}
	}
}

/// Top-`k` nearest-neighbor search against one index.
///
/// The query vector's length is checked against the mapping's declared
/// dimensionality before any search I/O. Both query shapes are attempted; a
/// total failure carries both causes and is never collapsed into an empty hit
/// list.
pub async fn knn_search(
	backend: &dyn SearchBackend,
	cache: &MappingCache,
	index: &str,
	field_candidates: &[String],
	vector: &[f32],
	k: u32,
) -> Result<Vec<Candidate>> {
	let field = resolve_vector_field(backend, cache, index, field_candidates).await?;
	if let Some(dims) = field.dims
		&& dims as usize != vector.len()
	{
		return Err(Error::Dimension {
			index: index.to_string(),
			expected: dims as usize,
			actual: vector.len(),
		});
	}

	let mut causes = Vec::with_capacity(QueryShape::ATTEMPT_ORDER.len());
	for shape in QueryShape::ATTEMPT_ORDER {
		match backend.search(index, &shape.body(&field.name, vector, k)).await {
			Ok(response) => {
				if shape == QueryShape::TopLevel {
					tracing::debug!(
						index,
						"Nested k-NN shape rejected; top-level shape accepted."
					);
				}

				return Ok(normalize_hits(index, &response));
			},
			Err(err) => causes.push(err.to_string()),
		}
	}

	let mut causes = causes.into_iter();

	Err(Error::Search {
		index: index.to_string(),
		nested_cause: causes.next().unwrap_or_default(),
		top_level_cause: causes.next().unwrap_or_default(),
	})
}

fn normalize_hits(index: &str, response: &Value) -> Vec<Candidate> {
	let hits = response
		.get("hits")
		.and_then(|v| v.get("hits"))
		.and_then(|v| v.as_array())
		.map(Vec::as_slice)
		.unwrap_or_default();

	hits.iter().map(|hit| normalize_hit(index, hit)).collect()
}

fn normalize_hit(index: &str, hit: &Value) -> Candidate {
	let source = hit.get("_source");
	let text = |key: &str| {
		source
			.and_then(|src| src.get(key))
			.and_then(|v| v.as_str())
			.unwrap_or_default()
			.to_string()
	};
	let tags = |key: &str| {
		source
			.and_then(|src| src.get(key))
			.and_then(|v| v.as_array())
			.map(|arr| {
				arr.iter().filter_map(|v| v.as_str()).map(str::to_string).collect::<Vec<_>>()
			})
			.unwrap_or_default()
	};
	let body = {
		let body = text("body");

		if body.is_empty() { text("text") } else { body }
	};

	Candidate {
		doc_id: hit.get("_id").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
		index: hit
			.get("_index")
			.and_then(|v| v.as_str())
			.unwrap_or(index)
			.to_string(),
		vector_score: hit.get("_score").and_then(|v| v.as_f64()).unwrap_or_default() as f32,
		title: text("title"),
		body,
		url: text("url"),
		industry_tags: tags("industry_tags"),
		theme_tags: tags("theme_tags"),
		tags_text: text("tags_text"),
		rerank_score: None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn nested_shape_places_knn_under_query() {
		let body = QueryShape::Nested.body("embedding", &[0.1, 0.2], 5);

		assert_eq!(body["size"], 5);
		assert!(body["query"]["knn"]["embedding"]["vector"].is_array());
		assert!(body.get("knn").is_none());
	}

	#[test]
	fn top_level_shape_names_the_field() {
		let body = QueryShape::TopLevel.body("embedding", &[0.1, 0.2], 5);

		assert_eq!(body["knn"]["field"], "embedding");
		assert!(body["knn"]["query_vector"].is_array());
		assert!(body.get("query").is_none());
	}

	#[test]
	fn source_allow_list_never_requests_the_vector() {
		for shape in QueryShape::ATTEMPT_ORDER {
			let body = shape.body("embedding", &[0.1], 1);
			let source = body["_source"].as_array().expect("_source must be an array.");

			assert!(!source.iter().any(|v| v == "embedding"));
		}
	}

	#[test]
	fn normalizes_body_from_text_fallback() {
		let response = serde_json::json!({
			"hits": { "hits": [
				{
					"_id": "d1",
					"_index": "video_rag_v4",
					"_score": 0.82,
					"_source": { "text": "transcript text", "industry_tags": ["legal"] }
				}
			] }
		});
		let hits = normalize_hits("video_rag_v4", &response);

		assert_eq!(hits.len(), 1);
		assert_eq!(hits[0].body, "transcript text");
		assert_eq!(hits[0].industry_tags, vec!["legal"]);
		assert_eq!(hits[0].title, "");
		assert!(hits[0].rerank_score.is_none());
	}

	#[test]
	fn missing_source_defaults_to_empty_fields() {
		let response = serde_json::json!({
			"hits": { "hits": [{ "_id": "d2", "_score": 1.5 }] }
		});
		let hits = normalize_hits("business_chunks_v2", &response);

		assert_eq!(hits[0].index, "business_chunks_v2");
		assert_eq!(hits[0].body, "");
		assert!(hits[0].theme_tags.is_empty());
	}
}
