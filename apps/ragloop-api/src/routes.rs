use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use ragloop_service::{Error as ServiceError, TurnOutcome};

#[derive(Debug, Deserialize)]
pub struct AskRequest {
	pub question: String,
	/// Lowers `orchestrator.max_retries` for this question; larger values are rejected.
	#[serde(default)]
	pub max_retries: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
	#[serde(flatten)]
	pub outcome: TurnOutcome,
	pub notes: Vec<String>,
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
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			ServiceError::InvalidConfig { message } => {
				tracing::error!(error = %message, "Turn rejected by configuration.");

				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Internal error.")
			},
			ServiceError::Qdrant { message } => {
				tracing::error!(error = %message, "Turn failed on Qdrant.");

				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Internal error.")
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/ask", post(ask))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn ask(
	State(state): State<AppState>,
	Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
	let configured = state.orchestrator.settings().max_retries;
	let max_retries = payload.max_retries.unwrap_or(configured);

	if max_retries > configured {
		return Err(ApiError::new(
			StatusCode::BAD_REQUEST,
			"INVALID_REQUEST",
			format!("max_retries must not exceed the configured limit of {configured}."),
		));
	}

	let _turn = state.turn_lock.lock().await;
	let outcome = state.orchestrator.process_question(&payload.question, max_retries).await?;
	let notes = outcome.notes();

	Ok(Json(AskResponse { outcome, notes }))
}
