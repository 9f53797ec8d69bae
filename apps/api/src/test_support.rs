//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::auth::TokenSigner;
use crate::llm_client::{CompletionService, LlmError};
use crate::models::ContactRecord;
use crate::state::AppState;
use crate::store::MemoryStore;

/// Completion stub that answers by matching a needle against the system text.
/// Rules are checked in insertion order; the first match wins, so answers do
/// not depend on the order concurrent calls arrive in.
#[derive(Default)]
pub struct ScriptedCompletion {
    rules: Vec<(String, String)>,
    systems: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, needle: &str, response: &str) -> Self {
        self.rules.push((needle.to_string(), response.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.systems.lock().unwrap().len()
    }

    pub fn last_system_containing(&self, needle: &str) -> Option<String> {
        self.systems
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|s| s.contains(needle))
            .cloned()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, system: &str, _user: &str) -> Result<String, LlmError> {
        self.systems.lock().unwrap().push(system.to_string());
        self.rules
            .iter()
            .find(|(needle, _)| system.contains(needle.as_str()))
            .map(|(_, response)| response.clone())
            .ok_or(LlmError::Api {
                status: 503,
                message: "no scripted response".to_string(),
            })
    }
}

pub fn contact(id: &str) -> ContactRecord {
    ContactRecord {
        name: format!("Contact {id}"),
        description: format!("Helps with {id}"),
        institution: format!("Institute {id}"),
        category: "Consulting".to_string(),
        email: format!("{id}@example.com"),
        website: format!("https://example.com/{id}"),
    }
}

pub const TEST_SECRET: &str = "test-secret";

/// State backed by fresh in-memory stores and the given completion stub.
pub fn memory_state(llm: ScriptedCompletion) -> AppState {
    AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
        Arc::new(llm),
        TokenSigner::new(TEST_SECRET, 3600),
    )
}
