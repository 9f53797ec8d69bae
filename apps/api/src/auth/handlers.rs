//! Axum route handlers for the Auth API.

use anyhow::anyhow;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::validation::validate_signup;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::Account;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /v1/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, &'static str), AppError> {
    validate_signup(&req.username, &req.password, &req.email).map_err(AppError::Validation)?;

    // Fast path; `insert_new` below is what actually guards the username.
    if state.accounts.get(&req.username).await?.is_some() {
        return Err(user_exists());
    }

    // Argon2 is deliberately slow; keep it off the async workers.
    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| anyhow!("Password hashing task failed: {e}"))??;

    let account = Account {
        username: req.username,
        password_hash,
        email: req.email,
        bio: None,
    };
    if !state.accounts.insert_new(&account.username, &account).await? {
        return Err(user_exists());
    }

    info!("Registered user {}", account.username);
    Ok((StatusCode::CREATED, "User registered successfully"))
}

fn user_exists() -> AppError {
    AppError::Validation("User already exists".to_string())
}

/// POST /v1/auth/signin
pub async fn handle_signin(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let account = state
        .accounts
        .get(&req.username)
        .await?
        .ok_or_else(|| AppError::Validation("User not found".to_string()))?;

    let password = req.password;
    let stored_hash = account.password_hash;
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| anyhow!("Password verification task failed: {e}"))?;

    if !matches {
        return Err(AppError::Validation("Invalid password".to_string()));
    }

    let token = state
        .tokens
        .sign(&account.username)
        .map_err(|e| anyhow!("Token signing failed: {e}"))?;

    Ok(Json(TokenResponse { token }))
}

/// GET /v1/auth/auth
pub async fn handle_check(AuthUser(_): AuthUser) -> &'static str {
    "Authenticated"
}
