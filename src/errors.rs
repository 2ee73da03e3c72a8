use axum::{http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::db;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("validation")]
    Validation(String),
    #[error("not_found")]
    NotFound(String),
    #[error(transparent)]
    DB(db::Error),
}

impl From<db::Error> for Error {
    fn from(error: db::Error) -> Self {
        match error {
            db::Error::NotFound(msg) => Self::NotFound(msg),
            error => Self::DB(error),
        }
    }
}

/// crate::Error <--> tokio_rusqlite::Error
///
/// Lets handlers fail with a typed `Error` from inside a `Connection::call`
/// closure and get it back unchanged on the other side of the await.
pub mod db_mappers {
    use super::*;

    impl From<tokio_rusqlite::Error> for Error {
        fn from(error: tokio_rusqlite::Error) -> Self {
            match error {
                tokio_rusqlite::Error::Other(err) => {
                    if err.is::<Error>() {
                        return *err.downcast::<Error>().unwrap();
                    }
                    db::Error::from(tokio_rusqlite::Error::Other(err)).into()
                }
                error => db::Error::from(error).into(),
            }
        }
    }

    impl From<Error> for tokio_rusqlite::Error {
        fn from(error: Error) -> Self {
            tokio_rusqlite::Error::Other(error.into())
        }
    }
}

// Response

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        let message = match error {
            Error::Validation(message) | Error::NotFound(message) => message.clone(),
            Error::DB(_) => "Unexpected error".into(),
        };
        Self { message }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("{:?}", self);

        let status = match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::DB(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let mut res = axum::Json(ErrorResponse::from(&self)).into_response();
        *res.status_mut() = status;
        res
    }
}
