use serde::{Deserialize, Serialize};

/// Stored account, keyed by username in the account namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    /// PHC-formatted Argon2id hash, never the plaintext.
    #[serde(rename = "password")]
    pub password_hash: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}
