pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::ranking::handlers as ai;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth API
        .route("/v1/auth/signup", post(auth::handle_signup))
        .route("/v1/auth/signin", post(auth::handle_signin))
        .route("/v1/auth/auth", get(auth::handle_check))
        // AI API
        .route("/v1/ai/init", post(ai::handle_init))
        .route("/v1/ai/message", post(ai::handle_message))
        .with_state(state)
}
