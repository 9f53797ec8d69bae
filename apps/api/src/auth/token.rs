use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;

/// Ten years; longer lifetimes are clamped.
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iat: i64,
    jti: String,
    username: String,
    exp: i64,
}

/// Identity carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPayload {
    pub issued_at: DateTime<Utc>,
    pub token_id: Uuid,
    pub username: String,
}

/// Signs and verifies HS256 bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64),
        }
    }

    /// Issues a token for `username` with a fresh random token id.
    pub fn sign(&self, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.sign_at(username, Utc::now())
    }

    fn sign_at(
        &self,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            iat: issued_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            username: username.to_string(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Checks signature and expiry. Any failure is `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<TokenPayload, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                tracing::debug!("Token rejected: {e}");
                AuthError::InvalidToken
            })?;

        let claims = data.claims;
        Ok(TokenPayload {
            issued_at: DateTime::from_timestamp(claims.iat, 0).ok_or(AuthError::InvalidToken)?,
            token_id: Uuid::parse_str(&claims.jti).map_err(|_| AuthError::InvalidToken)?,
            username: claims.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_then_verify_yields_username() {
        let signer = TokenSigner::new("secret", 3600);
        let token = signer.sign("ann").unwrap();

        let payload = signer.verify(&token).unwrap();
        assert_eq!(payload.username, "ann");
    }

    #[test]
    fn test_each_token_has_distinct_id() {
        let signer = TokenSigner::new("secret", 3600);
        let a = signer.verify(&signer.sign("ann").unwrap()).unwrap();
        let b = signer.verify(&signer.sign("ann").unwrap()).unwrap();
        assert_ne!(a.token_id, b.token_id);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = TokenSigner::new("secret", 3600).sign("ann").unwrap();
        let other = TokenSigner::new("other-secret", 3600);
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let signer = TokenSigner::new("secret", 60);
        let token = signer
            .sign_at("ann", Utc::now() - Duration::days(2))
            .unwrap();
        assert!(matches!(signer.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let signer = TokenSigner::new("secret", 3600);
        assert!(matches!(
            signer.verify("not.a.token"),
            Err(AuthError::InvalidToken)
        ));
    }
}
