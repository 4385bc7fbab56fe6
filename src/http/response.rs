//! Writing JSON responses.
//!
//! # Responsibilities
//! - Serialize any value into a JSON response body
//! - Copy caller-supplied headers, then force `Content-Type: application/json`
//! - Build the uniform error envelope from any error value
//!
//! # Design Decisions
//! - Serialization failures are returned untouched, never reclassified
//! - The error responder defaults to 400 Bad Request

use std::fmt::Display;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::http::error::{DecodeError, EncodeError};
use crate::http::request::APPLICATION_JSON;
use crate::http::tools::JsonTools;

/// The envelope used for both success and error responses.
///
/// `error` is true exactly when `message` describes a failure; `data` is
/// left out of the wire form when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonResponse<T = serde_json::Value> {
    pub error: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> JsonResponse<T> {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: None,
        }
    }

    pub fn ok_with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Serialize `data` and build a response with `status`.
///
/// Every key in `headers` replaces whatever the response held for it;
/// `Content-Type` is set last and always wins.
pub fn json_response<T>(
    status: StatusCode,
    data: &T,
    headers: Option<&HeaderMap>,
) -> Result<Response, EncodeError>
where
    T: Serialize + ?Sized,
{
    let out = serde_json::to_vec(data)?;

    let mut response = Response::new(Body::from(out));
    if let Some(headers) = headers {
        let target = response.headers_mut();
        for key in headers.keys() {
            target.remove(key);
            for value in headers.get_all(key) {
                target.append(key.clone(), value.clone());
            }
        }
    }

    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    *response.status_mut() = status;

    Ok(response)
}

/// Build an error envelope from `err` and render it with `status`
/// (400 when omitted).
pub fn error_response<E>(err: &E, status: Option<StatusCode>) -> Result<Response, EncodeError>
where
    E: Display + ?Sized,
{
    let status = status.unwrap_or(StatusCode::BAD_REQUEST);
    let payload: JsonResponse = JsonResponse::error(err.to_string());

    tracing::debug!(status = %status, message = %payload.message, "Sending JSON error response");
    json_response(status, &payload, None)
}

impl JsonTools {
    /// Write `data` as a JSON response.
    pub fn write_json<T>(
        &self,
        status: StatusCode,
        data: &T,
        headers: Option<&HeaderMap>,
    ) -> Result<Response, EncodeError>
    where
        T: Serialize + ?Sized,
    {
        json_response(status, data, headers)
    }

    /// Write `err` as a JSON error envelope.
    pub fn error_json<E>(&self, err: &E, status: Option<StatusCode>) -> Result<Response, EncodeError>
    where
        E: Display + ?Sized,
    {
        error_response(err, status)
    }
}

impl<T: Serialize> IntoResponse for JsonResponse<T> {
    fn into_response(self) -> Response {
        let status = if self.error {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::OK
        };
        match json_response(status, &self, None) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to serialize response").into_response()
            }
        }
    }
}

impl IntoResponse for DecodeError {
    fn into_response(self) -> Response {
        match error_response(&self, Some(self.status())) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize error response");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to serialize response").into_response()
            }
        }
    }
}
