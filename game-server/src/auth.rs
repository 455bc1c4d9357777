use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use warp::Filter;

use crate::errors::ApiError;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Player nickname.
    pub name: String,
    pub exp: i64,
}

/// The caller a verified token speaks for. Handlers receive it as an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPlayer {
    pub nickname: String,
}

/// Issues and verifies HS256 player tokens.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
}

impl JwtService {
    pub fn new(secret: &str, ttl: chrono::Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    pub fn sign(&self, nickname: &str) -> Result<String, AuthError> {
        let claims = Claims {
            name: nickname.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<AuthenticatedPlayer, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => {
                    tracing::debug!("JWT validation failed: {:?}", err);
                    AuthError::InvalidToken
                }
            })?;

        if token_data.claims.name.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(AuthenticatedPlayer {
            nickname: token_data.claims.name,
        })
    }

    /// Resolves an `Authorization: Bearer <token>` header value.
    pub fn verify_header(&self, header: Option<&str>) -> Result<AuthenticatedPlayer, AuthError> {
        let token = header
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;

        self.verify(token)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing or invalid Authorization header")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Extracts the authenticated principal, rejecting the request with 401
/// before any handler runs when the bearer token is missing or invalid.
pub fn with_principal(
    jwt_service: Arc<JwtService>,
) -> impl Filter<Extract = (AuthenticatedPlayer,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let jwt_service = jwt_service.clone();
        async move {
            jwt_service
                .verify_header(header.as_deref())
                .map_err(|err| warp::reject::custom(ApiError::from(err)))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret", chrono::Duration::hours(2))
    }

    #[test]
    fn test_sign_and_verify() {
        let service = service();
        let token = service.sign("Alice").unwrap();

        let principal = service.verify(&token).unwrap();
        assert_eq!(principal.nickname, "Alice");
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let token = JwtService::new("other-secret", chrono::Duration::hours(2))
            .sign("Alice")
            .unwrap();

        assert!(matches!(
            service().verify(&token),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            service().verify("not.a.token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token() {
        let expired = JwtService::new("test-secret", chrono::Duration::minutes(-10));
        let token = expired.sign("Alice").unwrap();

        assert!(matches!(
            service().verify(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_verify_header() {
        let service = service();
        let token = service.sign("Alice").unwrap();

        let principal = service
            .verify_header(Some(format!("Bearer {token}").as_str()))
            .unwrap();
        assert_eq!(principal.nickname, "Alice");

        for header in [None, Some(""), Some("Bearer "), Some(token.as_str())] {
            assert!(matches!(
                service.verify_header(header),
                Err(AuthError::MissingToken)
            ));
        }
    }
}
