use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;
use crate::accounts::Caller;
use crate::core::controller::{AppState, ServerError};
use crate::core::library::LibraryError;

// returns the key of an `Authorization: Token <key>` or `Bearer <key>` header
pub(crate) fn token_key(header: &str) -> Option<&str> {
    let (scheme, key) = header.trim().split_once(' ')?;
    let key = key.trim();
    if (scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer"))
        && !key.is_empty() && !key.contains(' ') {
        Some(key)
    } else {
        None
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let key = match parts.headers.get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(token_key) {
            Some(key) => key,
            None => return Ok(Caller::Anonymous),
        };
        match state.account_service.authenticate(key).await {
            Ok(principal) => Ok(Caller::Authenticated(principal)),
            Err(LibraryError::Unauthorized { .. }) => {
                debug!("unknown token, treating caller as anonymous");
                Ok(Caller::Anonymous)
            }
            Err(err) => Err(ServerError::from(err)),
        }
    }
}
