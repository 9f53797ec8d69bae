use std::sync::Arc;

use crate::auth::TokenSigner;
use crate::llm_client::CompletionService;
use crate::models::{Account, AreaRecord, ContactRecord};
use crate::store::{KvStore, Table};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Table<Account>,
    pub areas: Table<AreaRecord>,
    pub contacts: Table<ContactRecord>,
    /// Completion client. A trait object so tests can script responses.
    pub llm: Arc<dyn CompletionService>,
    pub tokens: TokenSigner,
}

impl AppState {
    pub fn new(
        accounts: Arc<dyn KvStore>,
        areas: Arc<dyn KvStore>,
        contacts: Arc<dyn KvStore>,
        llm: Arc<dyn CompletionService>,
        tokens: TokenSigner,
    ) -> Self {
        Self {
            accounts: Table::new(accounts),
            areas: Table::new(areas),
            contacts: Table::new(contacts),
            llm,
            tokens,
        }
    }
}
