// Area / contact ranking.
// Flow: area prompt → completion → validate → top areas → per-area contact
// prompt → completion → validate → ranked response.
// All completion calls go through llm_client::CompletionService.

use serde::Deserialize;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::models::Profile;
use crate::store::StoreError;

pub mod aggregator;
pub mod handlers;
pub mod prompts;
pub mod validator;

pub use aggregator::{RankedArea, RankingPipeline, Stage};
pub use validator::ValidationError;

/// Body of `POST /v1/ai/init`; also the input to every prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct RankingRequest {
    pub name: String,
    pub company: String,
    pub problem: String,
    pub profile: Profile,
}

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("{stage}: completion call failed: {source}")]
    Completion {
        stage: Stage,
        #[source]
        source: LlmError,
    },

    #[error("{stage}: {source}")]
    Validation {
        stage: Stage,
        #[source]
        source: ValidationError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
