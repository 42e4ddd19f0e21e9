//! JSON request execution against the engine's REST endpoints.
//!
//! All engine endpoints speak JSON: success bodies deserialize into typed
//! shapes, and non-success statuses carry a structured error body
//! (`message`, `code`, `type`, `link`) that is surfaced as
//! [`HandleResponseError::Api`].

use bytes::Bytes;
use http::StatusCode;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use snafu::{ResultExt as _, Snafu};

use crate::http::{HttpClient, HttpResponse};

/// Shorthand for an operation result parameterized over the caller's
/// [`HttpClient`].
pub type RestResult<T, C> = Result<
    T,
    RestError<<C as HttpClient>::Error, <<C as HttpClient>::Response as HttpResponse>::Error>,
>;

/// Errors that can occur when executing an engine request.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RestError<HttpReqErr: crate::Error + 'static, HttpRespErr: crate::Error + 'static> {
    /// The request could not be assembled.
    Build {
        /// The underlying error.
        source: BuildRequestError,
    },
    /// An error occurred when making the HTTP request.
    #[snafu(display("Failed to make HTTP request"))]
    Request {
        /// The underlying transport error.
        source: HttpReqErr,
    },
    /// There was an error when reading the response body.
    #[snafu(display("Failed to read response body"))]
    ResponseBodyRead {
        /// The underlying error when reading the response body.
        source: HttpRespErr,
    },
    /// An error occurred when handling the HTTP response.
    Response {
        /// The underlying error.
        source: HandleResponseError,
    },
}

impl<HttpReqErr: crate::Error, HttpRespErr: crate::Error> crate::Error
    for RestError<HttpReqErr, HttpRespErr>
{
    fn is_retryable(&self) -> bool {
        match self {
            Self::Build { source } => source.is_retryable(),
            Self::Request { source } => source.is_retryable(),
            Self::ResponseBodyRead { source } => source.is_retryable(),
            Self::Response { source } => source.is_retryable(),
        }
    }
}

/// Errors that can occur before the request is sent.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BuildRequestError {
    /// The query parameters could not be form-encoded.
    #[snafu(display("Failed to serialize query parameters"))]
    SerializeQuery {
        /// The underlying error.
        source: serde_html_form::ser::Error,
    },
    /// The request body could not be serialized as JSON.
    #[snafu(display("Failed to serialize request body"))]
    SerializeBody {
        /// The underlying error.
        source: serde_json::Error,
    },
    /// The API key is not a valid header value.
    #[snafu(display("API key is not a valid header value"))]
    BadHeader {
        /// The underlying error.
        source: http::header::InvalidHeaderValue,
    },
    /// The endpoint URI could not be built from the base URL.
    #[snafu(display("Failed to build request URI"))]
    BadUri {
        /// The underlying error.
        source: http::Error,
    },
}

impl crate::Error for BuildRequestError {
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Errors that can occur when interpreting the engine's response.
#[derive(Debug, Snafu)]
pub enum HandleResponseError {
    /// The response was an error status, but the body was not the engine's
    /// structured error shape.
    #[snafu(display("Failed to parse error response (status={status})"))]
    UnparseableErrorResponse {
        /// The body of the response.
        body: String,
        /// The status code of the response.
        status: StatusCode,
        /// The underlying error.
        source: serde_json::Error,
    },
    /// The response had a success status but could not be parsed.
    #[snafu(display("Failed to parse successful response"))]
    UnparseableSuccessResponse {
        /// The unparseable body.
        body: String,
        /// The underlying error.
        source: serde_json::Error,
    },
    /// The engine answered with a structured error.
    #[snafu(display("Engine request failed: {} ({})", body.message, body.code))]
    Api {
        /// The engine's error body.
        body: ApiErrorBody,
        /// The status code of the error response.
        status: StatusCode,
    },
}

impl crate::Error for HandleResponseError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::UnparseableErrorResponse { status, .. } | Self::Api { status, .. } => {
                status.is_server_error()
            }
            Self::UnparseableSuccessResponse { .. } => false,
        }
    }
}

/// The engine's structured error body, attached to every non-success status
/// and to failed tasks.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    /// Human-readable description of the failure.
    pub message: String,
    /// Stable machine-readable error code, e.g. `index_not_found`.
    pub code: String,
    /// Error category, e.g. `invalid_request` or `internal`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Link to the engine's documentation for this error.
    pub link: Option<String>,
}

/// Form-encodes `query` for use as a URI query string.
///
/// Returns `None` when the query serializes to nothing, so callers do not
/// emit a dangling `?`.
pub(crate) fn query_string<Q: Serialize>(query: &Q) -> Result<Option<String>, BuildRequestError> {
    let encoded = serde_html_form::to_string(query).context(SerializeQuerySnafu)?;
    Ok(if encoded.is_empty() {
        None
    } else {
        Some(encoded)
    })
}

/// Serializes `body` as a JSON request body.
pub(crate) fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<Bytes, BuildRequestError> {
    Ok(serde_json::to_vec(body).context(SerializeBodySnafu)?.into())
}

/// Executes `request` and returns the response status and body.
pub(crate) async fn run<C: HttpClient>(
    http_client: &C,
    request: http::Request<Bytes>,
) -> RestResult<(StatusCode, Bytes), C> {
    let response = http_client.execute(request).await.context(RequestSnafu)?;
    let status = response.status();
    let body = response.body().await.context(ResponseBodyReadSnafu)?;
    Ok((status, body))
}

/// Interprets a response body: typed shape on success, [`ApiErrorBody`] on a
/// non-success status.
pub(crate) fn parse_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &Bytes,
) -> Result<T, HandleResponseError> {
    if !status.is_success() {
        let error_body =
            serde_json::from_slice::<ApiErrorBody>(body).context(UnparseableErrorResponseSnafu {
                status,
                body: String::from_utf8_lossy(body),
            })?;

        return ApiSnafu {
            body: error_body,
            status,
        }
        .fail();
    }

    serde_json::from_slice(body).context(UnparseableSuccessResponseSnafu {
        body: String::from_utf8_lossy(body),
    })
}

/// Like [`parse_response`] for endpoints that answer `204 No Content`.
pub(crate) fn parse_empty_response(
    status: StatusCode,
    body: &Bytes,
) -> Result<(), HandleResponseError> {
    if status.is_success() {
        return Ok(());
    }

    let error_body =
        serde_json::from_slice::<ApiErrorBody>(body).context(UnparseableErrorResponseSnafu {
            status,
            body: String::from_utf8_lossy(body),
        })?;

    ApiSnafu {
        body: error_body,
        status,
    }
    .fail()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use serde::Serialize;

    use super::*;

    #[test]
    fn parses_structured_error_body() {
        let body = Bytes::from_static(
            br#"{
                "message": "Index `movies` not found.",
                "code": "index_not_found",
                "type": "invalid_request",
                "link": "https://docs.example.com/errors#index_not_found"
            }"#,
        );
        let err = parse_response::<serde_json::Value>(StatusCode::NOT_FOUND, &body).unwrap_err();
        match err {
            HandleResponseError::Api { body, status } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body.code, "index_not_found");
                assert_eq!(body.kind, "invalid_request");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unparseable_error_body_keeps_raw_text() {
        let body = Bytes::from_static(b"upstream proxy exploded");
        let err = parse_response::<serde_json::Value>(StatusCode::BAD_GATEWAY, &body).unwrap_err();
        match err {
            HandleResponseError::UnparseableErrorResponse { body, status, .. } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(body, "upstream proxy exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unparseable_success_body_keeps_raw_text() {
        use crate::Error as _;

        let body = Bytes::from_static(b"<html>maintenance</html>");
        let err = parse_response::<crate::Version>(StatusCode::OK, &body).unwrap_err();
        assert!(!err.is_retryable());
        match err {
            HandleResponseError::UnparseableSuccessResponse { body, .. } => {
                assert_eq!(body, "<html>maintenance</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn server_errors_are_retryable_but_client_errors_are_not() {
        use crate::Error as _;

        let body = Bytes::from_static(
            br#"{"message": "m", "code": "internal", "type": "internal", "link": null}"#,
        );
        let err =
            parse_response::<serde_json::Value>(StatusCode::INTERNAL_SERVER_ERROR, &body)
                .unwrap_err();
        assert!(err.is_retryable());

        let body = Bytes::from_static(
            br#"{"message": "m", "code": "invalid_api_key", "type": "auth", "link": null}"#,
        );
        let err = parse_response::<serde_json::Value>(StatusCode::FORBIDDEN, &body).unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn empty_response_accepts_no_content() {
        parse_empty_response(StatusCode::NO_CONTENT, &Bytes::new()).unwrap();
    }

    #[test]
    fn query_string_skips_unset_fields() {
        #[derive(Serialize)]
        struct Query {
            #[serde(skip_serializing_if = "Option::is_none")]
            offset: Option<u32>,
            #[serde(skip_serializing_if = "Option::is_none")]
            limit: Option<u32>,
        }

        let q = query_string(&Query {
            offset: None,
            limit: Some(20),
        })
        .unwrap();
        assert_eq!(q.as_deref(), Some("limit=20"));

        let q = query_string(&Query {
            offset: None,
            limit: None,
        })
        .unwrap();
        assert_eq!(q, None);
    }
}
