//! Accounts and bearer-token authentication.
//!
//! Sign-up and sign-in are plain record creation / lookup in the account
//! namespace. Everything else only needs [`AuthUser`], the extractor that
//! gates a route on a valid bearer token.

use thiserror::Error;

pub mod gate;
pub mod handlers;
pub mod password;
pub mod token;
pub mod validation;

pub use gate::AuthUser;
pub use token::{TokenPayload, TokenSigner};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,
}
