use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use super::{AuthError, TokenPayload, TokenSigner};
use crate::errors::AppError;
use crate::state::AppState;

/// Extractor for routes that require a signed-in user.
/// Rejects with 401 before the handler body runs.
#[derive(Debug, Clone)]
pub struct AuthUser(pub TokenPayload);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let payload = authenticate(&parts.headers, &state.tokens)?;
        tracing::debug!(
            "Authenticated {} (token {}, issued {})",
            payload.username,
            payload.token_id,
            payload.issued_at
        );
        Ok(AuthUser(payload))
    }
}

/// Reads `Authorization: Bearer <token>` and verifies the token.
/// The scheme name is matched case-insensitively.
pub fn authenticate(headers: &HeaderMap, tokens: &TokenSigner) -> Result<TokenPayload, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    let token = value
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidToken)?;

    tokens.verify(token)
}
