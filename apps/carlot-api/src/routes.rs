use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use carlot_domain::SearchCriteria;
use carlot_service::{Error as ServiceError, SearchOutcome, SearchRequest};

use crate::state::AppState;

/// Wire form of a search request. Criteria stay loosely typed until parsed.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchBody {
	criteria: Value,
	free_text: Option<String>,
	hybrid: Option<bool>,
	max_relax_steps: Option<u32>,
	preferences: Vec<String>,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/search", post(search))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<Value>,
) -> Result<Json<SearchOutcome>, ApiError> {
	if !payload.is_object() {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			"Request body must be a JSON object.",
			None,
		));
	}

	let body: SearchBody = serde_json::from_value(payload).map_err(|err| {
		json_error(StatusCode::BAD_REQUEST, "invalid_request", err.to_string(), None)
	})?;
	let criteria = match body.criteria {
		Value::Null => Value::Object(Default::default()),
		value @ Value::Object(_) => value,
		_ => {
			return Err(json_error(
				StatusCode::BAD_REQUEST,
				"invalid_request",
				"criteria must be a JSON object.",
				Some(vec!["$.criteria".to_string()]),
			));
		},
	};
	let (criteria, invalid) = SearchCriteria::from_json(&criteria);

	for field in &invalid {
		tracing::warn!(
			field = %field.field,
			reason = %field.message,
			"Ignoring unparseable criteria field."
		);
	}

	let req = SearchRequest {
		criteria,
		free_text: body.free_text,
		hybrid: body.hybrid,
		max_relax_steps: body.max_relax_steps,
		preferences: body.preferences,
	};
	// Cancels the search when the client disconnects and this future is dropped.
	let cancel = CancellationToken::new();
	let _guard = cancel.clone().drop_guard();
	let mut outcome = state.service.search(req, &cancel).await?;

	outcome.dropped_fields.splice(0..0, invalid);

	Ok(Json(outcome))
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
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", err.to_string(), None)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}

#[cfg(test)]
mod tests {
	use axum::{http::StatusCode, response::IntoResponse};

	use carlot_service::Error as ServiceError;

	use crate::routes::ApiError;

	#[test]
	fn service_errors_map_to_internal() {
		let response =
			ApiError::from(ServiceError::Internal { message: "Duplicate id 7.".to_string() })
				.into_response();

		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}
