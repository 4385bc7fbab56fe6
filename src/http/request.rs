//! Reading JSON request bodies.
//!
//! # Responsibilities
//! - Reject a declared Content-Type other than `application/json`
//! - Read the body under the configured ceiling
//! - Decode exactly one JSON value into the destination type
//! - Turn any failure into one [`DecodeError`] with a readable message
//!
//! # Design Decisions
//! - A missing Content-Type is accepted, a wrong one is not
//! - Unknown keys are tracked at runtime so strictness is a config switch,
//!   not a property baked into each payload type
//! - The async path buffers at most `limit + 1` bytes and then runs the same
//!   synchronous decoder, so both paths classify errors identically

use std::io::{BufReader, Read};

use axum::{
    body::Body,
    extract::{FromRef, FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::http::error::DecodeError;
use crate::http::tools::JsonTools;
use crate::security::limits::LimitedReader;

/// The only media type accepted for request bodies and used for responses.
pub const APPLICATION_JSON: &str = "application/json";

/// Fail unless the declared content type is absent or `application/json`.
pub fn check_content_type(content_type: Option<&str>) -> Result<(), DecodeError> {
    match content_type {
        Some(value) if !value.is_empty() && !value.eq_ignore_ascii_case(APPLICATION_JSON) => {
            Err(DecodeError::WrongContentType)
        }
        _ => Ok(()),
    }
}

/// Decode a single JSON value from `body`.
///
/// `limit` is the ceiling in bytes; with `allow_unknown_fields` unset, any
/// key the destination does not declare is an error.
pub fn decode_json<T, R>(
    content_type: Option<&str>,
    body: R,
    limit: usize,
    allow_unknown_fields: bool,
) -> Result<T, DecodeError>
where
    T: DeserializeOwned,
    R: Read,
{
    check_content_type(content_type)?;
    decode_body(BufReader::new(body), limit, allow_unknown_fields)
}

fn decode_body<T, R>(body: R, limit: usize, allow_unknown_fields: bool) -> Result<T, DecodeError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut reader = LimitedReader::new(body, limit);
    let mut unknown: Option<String> = None;

    let decoded = {
        let mut de = serde_json::Deserializer::from_reader(&mut reader);
        let mut track_unknown = |path: serde_ignored::Path<'_>| {
            unknown.get_or_insert_with(|| path.to_string());
        };
        let first: Result<T, _> = serde_path_to_error::deserialize(
            serde_ignored::Deserializer::new(&mut de, &mut track_unknown),
        );
        first.map(|value| (value, de.end()))
    };

    // A recorded unknown key only competes with data errors: size, syntax
    // and end-of-input failures are about the body itself and win.
    let unknown = unknown.filter(|_| !allow_unknown_fields);

    let (value, trailing) = match decoded {
        Ok(decoded) => decoded,
        Err(err) => {
            let err = match unknown {
                Some(field) if err.inner().classify() == Category::Data => {
                    DecodeError::UnknownField(field)
                }
                _ => classify(err, &reader),
            };
            tracing::debug!(error = %err, "Rejected JSON body");
            return Err(err);
        }
    };

    let err = match (trailing, unknown) {
        (Err(_), _) if reader.exceeded() => DecodeError::BodyTooLarge { limit: reader.limit() },
        (_, Some(field)) => DecodeError::UnknownField(field),
        (Err(_), None) => DecodeError::MultipleValues,
        (Ok(()), None) => return Ok(value),
    };
    tracing::debug!(error = %err, "Rejected JSON body after first value");
    Err(err)
}

fn classify<R: Read>(
    err: serde_path_to_error::Error<serde_json::Error>,
    reader: &LimitedReader<R>,
) -> DecodeError {
    let path = err.path().to_string();
    let err = err.into_inner();

    match err.classify() {
        Category::Io if reader.exceeded() => DecodeError::BodyTooLarge { limit: reader.limit() },
        Category::Io => DecodeError::Unclassified(err.to_string()),
        Category::Syntax => DecodeError::MalformedSyntax { offset: reader.consumed() },
        Category::Eof if reader.is_blank() => DecodeError::EmptyBody,
        Category::Eof => DecodeError::TruncatedInput,
        Category::Data => classify_data(err.to_string(), path, reader.consumed()),
    }
}

fn classify_data(message: String, path: String, offset: usize) -> DecodeError {
    if let Some(field) = unknown_field_name(&message) {
        return DecodeError::UnknownField(field.to_string());
    }

    let at_root = path.is_empty() || path == ".";

    if ["invalid type", "invalid value", "invalid length"]
        .iter()
        .any(|prefix| message.starts_with(prefix))
    {
        let field = if at_root { String::new() } else { path };
        return DecodeError::TypeMismatch { field, offset };
    }

    // A root-level custom error comes from the destination's own impl.
    let schema_error = ["missing field", "duplicate field", "unknown variant"]
        .iter()
        .any(|prefix| message.starts_with(prefix));
    if at_root && !schema_error {
        return DecodeError::InvalidDestination(message);
    }

    DecodeError::Unclassified(message)
}

/// Extract `B` from serde's "unknown field `B`, expected ..." message.
fn unknown_field_name(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("unknown field `")?;
    rest.split('`').next()
}

/// Collect at most `limit + 1` bytes, enough for the decoder to notice the
/// ceiling was crossed without buffering an arbitrarily large body.
async fn collect_limited(body: Body, limit: usize) -> Result<Vec<u8>, DecodeError> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| DecodeError::Unclassified(e.to_string()))?;
        let room = limit.saturating_add(1).saturating_sub(buf.len());
        buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if buf.len() > limit {
            break;
        }
    }

    Ok(buf)
}

impl JsonTools {
    /// Decode one JSON value from any reader using the shared limits.
    pub fn read_json_from<T, R>(&self, content_type: Option<&str>, body: R) -> Result<T, DecodeError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let config = self.config();
        decode_json(content_type, body, config.json_limit(), config.allow_unknown_fields)
    }

    /// Decode one JSON value from an HTTP request body.
    pub async fn read_json<T>(&self, request: Request) -> Result<T, DecodeError>
    where
        T: DeserializeOwned,
    {
        let content_type = match request.headers().get(CONTENT_TYPE) {
            Some(value) => Some(value.to_str().map_err(|_| DecodeError::WrongContentType)?),
            None => None,
        };
        check_content_type(content_type)?;

        let limit = self.config().json_limit();
        let bytes = collect_limited(request.into_body(), limit).await?;
        decode_body(bytes.as_slice(), limit, self.config().allow_unknown_fields)
    }
}

/// Extractor that decodes the body with the state's [`JsonTools`].
///
/// Unlike `axum::Json`, unknown keys, size and trailing data follow the
/// shared configuration, and rejections are JSON error envelopes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictJson<T>(pub T);

impl<T, S> FromRequest<S> for StrictJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    JsonTools: FromRef<S>,
{
    type Rejection = DecodeError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let tools = JsonTools::from_ref(state);
        tools.read_json(req).await.map(StrictJson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JsonConfig;
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::io;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Single {
        #[serde(rename = "A")]
        a: i64,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        #[serde(rename = "Name")]
        name: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Outer {
        inner: Inner,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Inner {
        n: u32,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct Closed {
        a: i64,
    }

    /// A destination that never accepts input.
    #[derive(Debug)]
    struct Refuses;

    impl<'de> Deserialize<'de> for Refuses {
        fn deserialize<D: serde::Deserializer<'de>>(_: D) -> Result<Self, D::Error> {
            Err(serde::de::Error::custom("destination cannot be decoded into"))
        }
    }

    struct UntouchableReader;

    impl Read for UntouchableReader {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            panic!("body must not be read");
        }
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer"))
        }
    }

    fn strict<T: DeserializeOwned>(body: &str) -> Result<T, DecodeError> {
        decode_json(None, body.as_bytes(), 1024, false)
    }

    fn limited<T: DeserializeOwned>(body: &str, limit: usize) -> Result<T, DecodeError> {
        decode_json(None, body.as_bytes(), limit, false)
    }

    #[test]
    fn test_decodes_single_value() {
        let value: Single = strict(r#"{"A": 42}"#).unwrap();
        assert_eq!(value, Single { a: 42 });

        let value: serde_json::Value = strict("  [1, 2, 3]\n").unwrap();
        assert_eq!(value, serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn test_content_type_accepted() {
        for content_type in [None, Some(""), Some("application/json"), Some("Application/JSON")] {
            let value: Single =
                decode_json(content_type, &br#"{"A":1}"#[..], 1024, false).unwrap();
            assert_eq!(value.a, 1);
        }
    }

    #[test]
    fn test_wrong_content_type_rejected_before_reading() {
        for content_type in ["text/plain", "application/xml", "application/json; charset=utf-8"] {
            let err = decode_json::<Single, _>(Some(content_type), UntouchableReader, 1024, false)
                .unwrap_err();
            assert_eq!(err, DecodeError::WrongContentType);
        }
    }

    #[test]
    fn test_body_too_large() {
        let body = r#"{"a":12345}"#;
        assert_eq!(body.len(), 11);

        let err = limited::<serde_json::Value>(body, 10).unwrap_err();
        assert_eq!(err, DecodeError::BodyTooLarge { limit: 10 });
        assert!(err.to_string().contains("10"));
    }

    #[test]
    fn test_body_exactly_at_limit() {
        let body = r#"{"a":1234}"#;
        let value: HashMap<String, i64> = limited(body, body.len()).unwrap();
        assert_eq!(value["a"], 1234);
    }

    #[test]
    fn test_trailing_bytes_past_limit_are_too_large() {
        let err = limited::<serde_json::Value>("{}      ", 4).unwrap_err();
        assert_eq!(err, DecodeError::BodyTooLarge { limit: 4 });
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(strict::<Single>("").unwrap_err(), DecodeError::EmptyBody);
        assert_eq!(strict::<Single>(" \r\n\t").unwrap_err(), DecodeError::EmptyBody);
        assert_eq!(strict::<Single>("").unwrap_err().to_string(), "body must not be empty");
    }

    #[test]
    fn test_truncated_body() {
        let err = strict::<serde_json::Value>(r#"{"a":"#).unwrap_err();
        assert_eq!(err, DecodeError::TruncatedInput);
        assert_eq!(err.to_string(), "body contains badly-formed JSON");
    }

    #[test]
    fn test_malformed_syntax_reports_offset() {
        let err = strict::<serde_json::Value>(r#"{"a" 1}"#).unwrap_err();
        match err {
            DecodeError::MalformedSyntax { offset } => assert!(offset > 0 && offset <= 7),
            other => panic!("expected syntax error, got {other:?}"),
        }
        assert!(err.to_string().starts_with("body contains badly-formed JSON (at character"));
    }

    #[test]
    fn test_multiple_values_rejected() {
        let err = strict::<serde_json::Value>(r#"{"x":1}{"y":2}"#).unwrap_err();
        assert_eq!(err, DecodeError::MultipleValues);

        let err = strict::<serde_json::Value>(r#"{"x":1} garbage"#).unwrap_err();
        assert_eq!(err, DecodeError::MultipleValues);

        let value: serde_json::Value = strict("{\"x\":1}  \n").unwrap();
        assert_eq!(value["x"], 1);
    }

    #[test]
    fn test_unknown_field_strict() {
        let err = strict::<Single>(r#"{"A":1,"B":2}"#).unwrap_err();
        assert_eq!(err, DecodeError::UnknownField("B".into()));
    }

    #[test]
    fn test_strict_truncated_body_with_unknown_key() {
        let err = strict::<Single>(r#"{"A":1,"B":2"#).unwrap_err();
        assert_eq!(err, DecodeError::TruncatedInput);
    }

    #[test]
    fn test_strict_malformed_body_with_unknown_key() {
        let err = strict::<Single>(r#"{"A":1,"B":2 x}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedSyntax { .. }), "got {err:?}");
    }

    #[test]
    fn test_strict_oversized_body_with_unknown_key() {
        let body = format!(r#"{{"A":1,"B":2,"C":"{}"}}"#, "x".repeat(48));
        assert!(body.len() > 16);

        let err = limited::<Single>(&body, 16).unwrap_err();
        assert_eq!(err, DecodeError::BodyTooLarge { limit: 16 });
    }

    #[test]
    fn test_strict_trailing_bytes_past_limit_with_unknown_key() {
        let err = limited::<Single>("{\"A\":1,\"B\":2}      ", 16).unwrap_err();
        assert_eq!(err, DecodeError::BodyTooLarge { limit: 16 });
    }

    #[test]
    fn test_strict_type_mismatch_before_unknown_key() {
        let err = strict::<Single>(r#"{"A":"x","B":2}"#).unwrap_err();
        assert!(
            matches!(err, DecodeError::TypeMismatch { ref field, .. } if field == "A"),
            "got {err:?}"
        );
    }

    #[test]
    fn test_strict_unknown_key_before_type_mismatch() {
        let err = strict::<Single>(r#"{"B":2,"A":"x"}"#).unwrap_err();
        assert_eq!(err, DecodeError::UnknownField("B".into()));
    }

    #[test]
    fn test_strict_unknown_key_before_trailing_value() {
        let err = strict::<Single>(r#"{"A":1,"B":2}{"A":3}"#).unwrap_err();
        assert_eq!(err, DecodeError::UnknownField("B".into()));
    }

    #[test]
    fn test_unknown_field_allowed() {
        let value: Single = decode_json(None, &br#"{"A":1,"B":2}"#[..], 1024, true).unwrap();
        assert_eq!(value, Single { a: 1 });
    }

    #[test]
    fn test_unknown_field_message_names_key() {
        let err = strict::<Named>(r#"{"Name":"x","Extra":1}"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownField(_)));
        assert!(err.to_string().contains("Extra"));
    }

    #[test]
    fn test_deny_unknown_fields_type_is_always_strict() {
        let err = decode_json::<Closed, _>(None, &br#"{"a":1,"b":2}"#[..], 1024, true).unwrap_err();
        assert_eq!(err, DecodeError::UnknownField("b".into()));
    }

    #[test]
    fn test_type_mismatch_names_field() {
        let err = strict::<Single>(r#"{"A":"x"}"#).unwrap_err();
        match &err {
            DecodeError::TypeMismatch { field, offset } => {
                assert_eq!(field, "A");
                assert!(*offset > 0);
            }
            other => panic!("expected type mismatch, got {other:?}"),
        }
        assert!(err.to_string().contains("\"A\""));
    }

    #[test]
    fn test_type_mismatch_nested_path() {
        let err = strict::<Outer>(r#"{"inner":{"n":"seven"}}"#).unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch { ref field, .. } if field == "inner.n"));
    }

    #[test]
    fn test_type_mismatch_at_root() {
        let err = strict::<Single>(r#""just a string""#).unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch { ref field, .. } if field.is_empty()));
    }

    #[test]
    fn test_invalid_destination() {
        let err = strict::<Refuses>("{}").unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidDestination("destination cannot be decoded into".into())
        );
    }

    #[test]
    fn test_unclassified_passes_message_through() {
        let err = strict::<Single>("{}").unwrap_err();
        match err {
            DecodeError::Unclassified(message) => assert!(message.starts_with("missing field `A`")),
            other => panic!("expected unclassified, got {other:?}"),
        }

        let err = decode_json::<Single, _>(None, BrokenReader, 1024, false).unwrap_err();
        assert!(matches!(err, DecodeError::Unclassified(ref m) if m.contains("connection reset")));
    }

    #[test]
    fn test_tools_use_configured_limits() {
        let tools = JsonTools::new(JsonConfig {
            max_json_size: 8,
            allow_unknown_fields: true,
            ..Default::default()
        });

        let value: Single = tools.read_json_from(None, &br#"{"A":1}"#[..]).unwrap();
        assert_eq!(value.a, 1);

        let err = tools
            .read_json_from::<Single, _>(None, &br#"{"A":1,"B":2}"#[..])
            .unwrap_err();
        assert_eq!(err, DecodeError::BodyTooLarge { limit: 8 });
    }

    fn request(content_type: Option<&str>, body: Body) -> Request {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder.body(body).unwrap()
    }

    #[tokio::test]
    async fn test_read_json_from_request() {
        let tools = JsonTools::default();
        let req = request(Some("application/json"), Body::from(r#"{"A":7}"#));
        let value: Single = tools.read_json(req).await.unwrap();
        assert_eq!(value, Single { a: 7 });
    }

    #[tokio::test]
    async fn test_read_json_rejects_content_type() {
        let tools = JsonTools::default();
        let req = request(Some("text/html"), Body::from(r#"{"A":7}"#));
        let err = tools.read_json::<Single>(req).await.unwrap_err();
        assert_eq!(err, DecodeError::WrongContentType);
    }

    #[tokio::test]
    async fn test_read_json_streamed_body_too_large() {
        let tools = JsonTools::new(JsonConfig {
            max_json_size: 16,
            ..Default::default()
        });
        let chunks: Vec<Result<&'static str, io::Error>> =
            vec![Ok(r#"{"A":"#), Ok("1234567890"), Ok("1234567890}")];
        let req = request(None, Body::from_stream(futures_util::stream::iter(chunks)));

        let err = tools.read_json::<Single>(req).await.unwrap_err();
        assert_eq!(err, DecodeError::BodyTooLarge { limit: 16 });
    }

    #[tokio::test]
    async fn test_read_json_empty_request() {
        let tools = JsonTools::default();
        let err = tools.read_json::<Single>(request(None, Body::empty())).await.unwrap_err();
        assert_eq!(err, DecodeError::EmptyBody);
    }
}
