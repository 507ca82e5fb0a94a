//! Defines the `ApiError` type returned from API handlers. It pairs an HTTP
//! status code with an `anyhow::Error`, and responds with a JSON body
//! `{"status": <code>, "error": <message>}`.
use crate::Error;
use axum::http::StatusCode;

/// An error response
#[derive(Debug, thiserror::Error, serde::Serialize)]
#[error("status: {status}, error: {error}")]
pub struct ApiError {
    /// The HTTP status code
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,

    /// The error message
    #[serde(serialize_with = "serialize_error")]
    #[source]
    pub error: anyhow::Error,
}

fn serialize_status<S: serde::Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u16(status.as_u16())
}

fn serialize_error<S: serde::Serializer>(error: &anyhow::Error, s: S) -> Result<S::Ok, S::Error> {
    let err_str = format!("{error:#}"); // alternate renders nested causes
    s.serialize_str(&err_str)
}

impl ApiError {
    pub fn new(status: StatusCode, error: anyhow::Error) -> ApiError {
        ApiError { status, error }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let status = match &error {
            Error::StageFilterDisabled(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::TasksNotConfigured | Error::TasksUnreachable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Error::Export(_) => {
                tracing::error!(?error, "API responding with export error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        ApiError::new(status, error.into())
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status;
        (status, axum::Json(self)).into_response()
    }
}
