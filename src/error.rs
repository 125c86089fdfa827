use std::io;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::form::FieldErrors;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not Found")]
    NotFound,

    #[error("Authentication credentials were not provided.")]
    Unauthorized,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] toml::de::Error),

    #[error("{0}")]
    FormatError(&'static str),

    #[error("validation failed")]
    Validation(FieldErrors),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    ApiError(#[from] ApiError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("password hash: {0}")]
    PasswordHash(argon2::password_hash::Error),

    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
}

impl From<argon2::password_hash::Error> for Error {
    fn from(e: argon2::password_hash::Error) -> Self {
        Error::PasswordHash(e)
    }
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        Error::Validation(errors)
    }
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Sqlx(e) => {
                tracing::error!(%e, "sqlx error");
                internal_error()
            }
            Error::Io(e) => {
                tracing::error!(%e, "file io error");
                internal_error()
            }
            Error::PasswordHash(e) => {
                tracing::error!(%e, "password hash error");
                internal_error()
            }
            Error::Join(e) => {
                tracing::error!(%e, "blocking task failed");
                internal_error()
            }
            Error::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            Error::ApiError(api_error) => match api_error {
                ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT FOUND").into_response(),
                e @ ApiError::Unauthorized => (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "status": "error", "detail": e.to_string() })),
                )
                    .into_response(),
            },
            Error::FormatError(s) => (StatusCode::BAD_REQUEST, s.to_string()).into_response(),
            Error::Config(e) => (StatusCode::BAD_REQUEST, e.message().to_string()).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let resp = Error::from(ApiError::NotFound).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = Error::from(ApiError::Unauthorized).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let mut errors = FieldErrors::default();
        errors.add("body", "This field is required.");
        let resp = Error::from(errors).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = Error::Sqlx(sqlx::Error::RowNotFound).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
