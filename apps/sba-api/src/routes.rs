use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sba_audit::Area;
use sba_service::{Error as ServiceError, SearchHit};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/rag/search", post(rag_search))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

#[derive(Debug, Deserialize)]
pub struct RagSearchRequest {
	pub user_id: String,
	pub question: String,
}

#[derive(Debug, Serialize)]
pub struct RagSearchResponse {
	pub trace_id: Uuid,
	pub query: String,
	pub results: Vec<SearchHit>,
	pub reranked: Vec<SearchHit>,
	pub took_ms: u64,
}

async fn rag_search(
	State(state): State<AppState>,
	Json(payload): Json<RagSearchRequest>,
) -> Result<Json<RagSearchResponse>, ApiError> {
	if payload.user_id.trim().is_empty() || payload.question.trim().is_empty() {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			"user_id and question must be non-empty.",
		));
	}

	state
		.audit
		.record(
			&payload.user_id,
			Area::Prompts,
			serde_json::json!({ "component": "rag_search", "question": payload.question }),
		)
		.await;

	let outcome = state.service.search(&payload.question).await?;
	let took_ms = outcome
		.trace
		.stages
		.iter()
		.find(|stage| stage.stage == "total")
		.map(|stage| stage.duration_ms)
		.unwrap_or_default();
	let response = RagSearchResponse {
		trace_id: outcome.trace.trace_id,
		query: outcome.response.query,
		results: outcome.response.results,
		reranked: outcome.response.reranked,
		took_ms,
	};

	state
		.audit
		.record(
			&payload.user_id,
			Area::Answers,
			serde_json::json!({
				"component": "rag_search",
				"trace_id": outcome.trace.trace_id,
				"result": { "answers": response.reranked.clone(), "took_ms": took_ms },
			}),
		)
		.await;
	state
		.audit
		.record(
			&payload.user_id,
			Area::Reasoning,
			serde_json::json!({
				"component": "rag_search",
				"trace": outcome.trace,
			}),
		)
		.await;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError { status, error_code: code.to_string(), message: message.into() }
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let (status, code) = match &err {
			ServiceError::Configuration { .. } => {
				(StatusCode::INTERNAL_SERVER_ERROR, "configuration")
			},
			ServiceError::Validation { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "validation"),
			ServiceError::NotFound { .. } => (StatusCode::BAD_GATEWAY, "vector_field_not_found"),
			ServiceError::Search { .. } => (StatusCode::BAD_GATEWAY, "search_failed"),
			ServiceError::RerankParse { .. } => (StatusCode::BAD_GATEWAY, "rerank_parse"),
			ServiceError::Provider { .. } => (StatusCode::BAD_GATEWAY, "provider_failed"),
		};

		json_error(status, code, err.to_string())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
