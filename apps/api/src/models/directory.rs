use serde::{Deserialize, Serialize};

/// Area record, keyed by area name. Populated by an administrative upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRecord {
    pub contact_ids: Vec<String>,
}

/// Contact record, keyed by contact id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub name: String,
    pub description: String,
    pub institution: String,
    pub category: String,
    pub email: String,
    pub website: String,
}
