use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::broker::types::{Accepted, BrokerError, BrokerRequestPayload};
use crate::http::error::EncodeError;
use crate::http::request::StrictJson;
use crate::http::response::JsonResponse;
use crate::http::server::AppState;

pub async fn ping() -> JsonResponse {
    JsonResponse::ok("pong")
}

pub async fn handle_submission(
    State(state): State<AppState>,
    StrictJson(payload): StrictJson<BrokerRequestPayload>,
) -> Response {
    match dispatch(payload) {
        Ok(envelope) => respond(state.tools.write_json(StatusCode::ACCEPTED, &envelope, None)),
        Err(e) => {
            tracing::warn!(error = %e, "Rejected broker request");
            respond(state.tools.error_json(&e, None))
        }
    }
}

fn dispatch(payload: BrokerRequestPayload) -> Result<JsonResponse<Accepted>, BrokerError> {
    match payload.action.as_str() {
        "auth" => {
            if payload.auth.email.trim().is_empty() {
                return Err(BrokerError::MissingEmail);
            }
            tracing::debug!(email = %payload.auth.email, "Accepted auth request");
            Ok(JsonResponse::ok_with_data(
                "auth request accepted",
                Accepted {
                    action: payload.action,
                    email: payload.auth.email,
                },
            ))
        }
        _ => Err(BrokerError::UnknownAction(payload.action)),
    }
}

fn respond(result: Result<Response, EncodeError>) -> Response {
    result.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to encode response");
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode response").into_response()
    })
}
