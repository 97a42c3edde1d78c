use axum::{
	Json, Router,
	extract::{State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use idlink_service::{Error as ServiceError, IdentifyRequest, IdentifyResponse};

use crate::state::AppState;

const WELCOME: &str = "Contact identity service. POST /identify with a JSON body holding an email and/or phoneNumber.";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/", get(welcome))
		.route("/health", get(health))
		.route("/identify", post(identify))
		.with_state(state)
}

async fn welcome() -> &'static str {
	WELCOME
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn identify(
	State(state): State<AppState>,
	payload: Result<Json<IdentifyRequest>, JsonRejection>,
) -> Result<Json<IdentifyResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.identify(payload).await?;
	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}

	fn internal(error_code: &str) -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR, error_code, "Internal server error.", None)
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message, fields } => Self::new(
				StatusCode::BAD_REQUEST,
				"invalid_request",
				message,
				(!fields.is_empty()).then_some(fields),
			),
			ServiceError::Storage { message } => {
				tracing::error!(%message, "Contact store failure.");

				Self::internal("storage_error")
			},
			ServiceError::NotFound { message } => {
				tracing::error!(%message, "Contact vanished during reconciliation.");

				Self::internal("storage_error")
			},
			ServiceError::Consistency { message } => {
				tracing::error!(%message, "Reconciliation aborted.");

				Self::internal("consistency_violation")
			},
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text(), None)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}
