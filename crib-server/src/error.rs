use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures with a status of their own. Anything else is a 500.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("{0} is already registered")]
    EmailTaken(String),

    #[error("invalid email or password")]
    BadCredentials,

    #[error("invalid name {0:?}")]
    InvalidName(String),
}

pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<StoreError>() {
            Some(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Some(StoreError::EmailTaken(_)) => StatusCode::CONFLICT,
            Some(StoreError::BadCredentials) => StatusCode::UNAUTHORIZED,
            Some(StoreError::InvalidName(_)) => StatusCode::BAD_REQUEST,
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {:#}", self.0);
            return (status, format!("Something went wrong: {}", self.0)).into_response();
        }
        (status, self.0.to_string()).into_response()
    }
}

// Lets handlers use `?` on anything convertible to `anyhow::Error`.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
