//! Bulk loader for the area and contact namespaces.
//!
//! The directory data is maintained outside this service; a seed file lets a
//! deployment (or a local run against the in-memory store) start populated.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use super::Table;
use crate::models::{AreaRecord, ContactRecord};

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub areas: BTreeMap<String, AreaRecord>,
    #[serde(default)]
    pub contacts: BTreeMap<String, ContactRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedCounts {
    pub areas: usize,
    pub contacts: usize,
}

/// Writes every area and contact in the seed into the store.
pub async fn load_seed(
    seed: SeedFile,
    areas: &Table<AreaRecord>,
    contacts: &Table<ContactRecord>,
) -> Result<SeedCounts> {
    for (id, contact) in &seed.contacts {
        contacts
            .put(id, contact)
            .await
            .with_context(|| format!("Failed to store contact '{id}'"))?;
    }
    for (name, area) in &seed.areas {
        areas
            .put(name, area)
            .await
            .with_context(|| format!("Failed to store area '{name}'"))?;
    }

    Ok(SeedCounts {
        areas: seed.areas.len(),
        contacts: seed.contacts.len(),
    })
}

/// Reads a seed file from disk and loads it.
pub async fn load_seed_file(
    path: impl AsRef<Path>,
    areas: &Table<AreaRecord>,
    contacts: &Table<ContactRecord>,
) -> Result<SeedCounts> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let seed: SeedFile = serde_json::from_str(&raw)
        .with_context(|| format!("Seed file {} is not valid", path.display()))?;

    let counts = load_seed(seed, areas, contacts).await?;
    info!(
        "Seeded {} areas and {} contacts from {}",
        counts.areas,
        counts.contacts,
        path.display()
    );
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;

    const SEED: &str = r#"{
        "areas": {
            "Sales": { "contactIds": ["c1", "c2"] },
            "Health": { "contactIds": [] }
        },
        "contacts": {
            "c1": {
                "name": "Jo Weber",
                "description": "B2B sales coach",
                "institution": "Weber Consulting",
                "category": "Consulting",
                "email": "jo@example.com",
                "website": "https://example.com"
            }
        }
    }"#;

    #[tokio::test]
    async fn test_load_seed_file_writes_all_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();

        let areas: Table<AreaRecord> = Table::new(Arc::new(MemoryStore::new()));
        let contacts: Table<ContactRecord> = Table::new(Arc::new(MemoryStore::new()));

        let counts = load_seed_file(file.path(), &areas, &contacts).await.unwrap();

        assert_eq!(
            counts,
            SeedCounts {
                areas: 2,
                contacts: 1
            }
        );
        let sales = areas.get("Sales").await.unwrap().unwrap();
        assert_eq!(sales.contact_ids, vec!["c1", "c2"]);
        let c1 = contacts.get("c1").await.unwrap().unwrap();
        assert_eq!(c1.institution, "Weber Consulting");
    }

    #[tokio::test]
    async fn test_load_seed_file_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ areas: ").unwrap();

        let areas: Table<AreaRecord> = Table::new(Arc::new(MemoryStore::new()));
        let contacts: Table<ContactRecord> = Table::new(Arc::new(MemoryStore::new()));

        assert!(load_seed_file(file.path(), &areas, &contacts).await.is_err());
    }
}
