/// One retrieved document from one index.
///
/// `(index, doc_id)` is unique only after the merge stage; raw per-index hit
/// lists may overlap. Optional source fields default to empty so absent
/// upstream values never surface as nulls in later JSON encoding.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candidate {
	pub doc_id: String,
	pub index: String,
	/// Similarity from k-NN, higher is more similar. Always present.
	pub vector_score: f32,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub body: String,
	#[serde(default)]
	pub url: String,
	#[serde(default)]
	pub industry_tags: Vec<String>,
	#[serde(default)]
	pub theme_tags: Vec<String>,
	#[serde(default)]
	pub tags_text: String,
	/// Attached by the reranker; absent until that stage runs.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rerank_score: Option<f32>,
}

impl Candidate {
	pub fn key(&self) -> (&str, &str) {
		(&self.index, &self.doc_id)
	}
}
