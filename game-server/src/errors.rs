use std::convert::Infallible;

use game_core::GameError;
use game_persistence::{PersistenceError, UnitOfWorkError};
use game_types::ErrorResponse;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::{Rejection, Reply};

use crate::auth::AuthError;

pub const INVALID_REQUEST_BODY: &str = "Invalid request body";
const INTERNAL_ERROR: &str = "internal server error";

/// Failure of an API call, classified by the status it renders with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl warp::reject::Reject for ApiError {}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Store details stay in the logs; clients get a generic message.
    fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => INTERNAL_ERROR.to_string(),
            other => other.to_string(),
        }
    }

    pub fn to_reply(&self) -> WithStatus<Json> {
        error_reply(self.status(), &self.public_message())
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::PlayerNotFound | PersistenceError::GameNotFound => {
                Self::NotFound(err.to_string())
            }
            PersistenceError::DuplicateNickname => Self::Conflict(err.to_string()),
            PersistenceError::Domain(err) => err.into(),
            other => {
                tracing::error!(error = %other, "Persistence failure");
                Self::Internal(other.to_string())
            }
        }
    }
}

impl From<UnitOfWorkError> for ApiError {
    fn from(err: UnitOfWorkError) -> Self {
        tracing::error!(error = %err, "Unit of work failed");
        Self::Internal(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Signing(_) => {
                tracing::error!(error = %err, "Token signing failed");
                Self::Internal(err.to_string())
            }
            other => Self::Unauthorized(other.to_string()),
        }
    }
}

pub fn error_reply(status: StatusCode, message: &str) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(&ErrorResponse::new(message)), status)
}

/// Renders every rejection as `{"error": ...}`.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    if let Some(api_error) = err.find::<ApiError>() {
        return Ok(api_error.to_reply());
    }

    let reply = if err.is_not_found() {
        error_reply(StatusCode::NOT_FOUND, "not found")
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
        || err.find::<warp::reject::UnsupportedMediaType>().is_some()
        || err.find::<warp::reject::PayloadTooLarge>().is_some()
        || err.find::<warp::reject::LengthRequired>().is_some()
    {
        error_reply(StatusCode::BAD_REQUEST, INVALID_REQUEST_BODY)
    } else if err.find::<warp::filters::cors::CorsForbidden>().is_some() {
        error_reply(StatusCode::FORBIDDEN, "forbidden")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        error_reply(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        error_reply(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
    };

    Ok(reply)
}
