//! Ranking Aggregator: orchestrates the two rating passes.
//!
//! Flow: list areas → rate areas → keep the top [`MAX_AREAS`] known areas →
//!       per area (concurrently): resolve contacts → rate contacts → attach.
//!
//! Policy:
//! - a failed area pass fails the request;
//! - a failed contact pass only empties that area's contact list;
//! - areas and contacts without a backing record are skipped, never fatal.

use std::collections::{HashMap, HashSet};
use std::fmt;

use futures::future::join_all;
use serde::{Serialize, Serializer};
use tracing::{info, warn};

use crate::llm_client::CompletionService;
use crate::models::{AreaRecord, ContactRecord};
use crate::ranking::prompts::{
    build_area_prompt, build_contact_prompt, ContactCandidate, Prompt, AREA_RATING_FIELD,
    CONTACT_RATING_FIELD,
};
use crate::ranking::validator::{validate, Rating, RatingMap};
use crate::ranking::{RankingError, RankingRequest};
use crate::store::Table;

/// Number of areas returned per request.
pub const MAX_AREAS: usize = 4;

/// Where a ranking run is. Carried in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AwaitingAreaRatings,
    AwaitingContactRatings,
    Complete,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::AwaitingAreaRatings => "area ranking",
            Stage::AwaitingContactRatings => "contact ranking",
            Stage::Complete => "complete",
            Stage::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedContact {
    pub id: String,
    #[serde(flatten)]
    pub contact: ContactRecord,
    #[serde(serialize_with = "serialize_rating")]
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedArea {
    pub name: String,
    #[serde(serialize_with = "serialize_rating")]
    pub rating: f64,
    pub contacts: Vec<RankedContact>,
}

/// Whole-number ratings serialize as integers (`70`, not `70.0`).
fn serialize_rating<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0; // 2^53
    if value.fract() == 0.0 && value.abs() < EXACT_INT_LIMIT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Keeps ratings whose key is in `known`, ordered by descending value, at most
/// `limit` of them. The sort is stable: equal ratings keep the model's order.
pub fn select_top(ratings: &RatingMap, known: &HashSet<String>, limit: usize) -> Vec<Rating> {
    let mut kept: Vec<Rating> = ratings
        .iter()
        .filter(|rating| {
            let is_known = known.contains(&rating.key);
            if !is_known {
                warn!("Dropping rating for unknown key '{}'", rating.key);
            }
            is_known
        })
        .cloned()
        .collect();

    kept.sort_by(|a, b| b.value.total_cmp(&a.value));
    kept.truncate(limit);
    kept
}

struct ResolvedContact {
    id: String,
    record: ContactRecord,
}

/// One ranking run's collaborators. Borrowed per request; holds no state of its own.
pub struct RankingPipeline<'a> {
    areas: &'a Table<AreaRecord>,
    contacts: &'a Table<ContactRecord>,
    llm: &'a dyn CompletionService,
}

impl<'a> RankingPipeline<'a> {
    pub fn new(
        areas: &'a Table<AreaRecord>,
        contacts: &'a Table<ContactRecord>,
        llm: &'a dyn CompletionService,
    ) -> Self {
        Self {
            areas,
            contacts,
            llm,
        }
    }

    /// Runs the full pipeline. Output is ordered by area rating, descending.
    pub async fn rank(&self, request: &RankingRequest) -> Result<Vec<RankedArea>, RankingError> {
        match self.run(request).await {
            Ok(ranked) => {
                info!(stage = %Stage::Complete, "Ranked {} areas", ranked.len());
                Ok(ranked)
            }
            Err(e) => {
                warn!(stage = %Stage::Failed, "Ranking failed: {e}");
                Err(e)
            }
        }
    }

    async fn run(&self, request: &RankingRequest) -> Result<Vec<RankedArea>, RankingError> {
        let area_names = self.areas.keys().await?;
        if area_names.is_empty() {
            warn!("No areas in store; nothing to rank");
            return Ok(Vec::new());
        }
        let known: HashSet<String> = area_names.iter().cloned().collect();

        let prompt = build_area_prompt(&area_names, request);
        let ratings = self
            .rate(Stage::AwaitingAreaRatings, &prompt, AREA_RATING_FIELD, &known)
            .await?;

        let top = select_top(&ratings, &known, MAX_AREAS);
        info!(
            "Area ratings: {} returned, {} selected",
            ratings.len(),
            top.len()
        );

        // join_all yields results in input order, i.e. rank order.
        let branches = top.into_iter().map(|area| self.rank_area(area, request));
        let ranked = join_all(branches)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ranked.into_iter().flatten().collect())
    }

    async fn rank_area(
        &self,
        area: Rating,
        request: &RankingRequest,
    ) -> Result<Option<RankedArea>, RankingError> {
        let Some(record) = self.areas.get(&area.key).await? else {
            warn!("No data for area: {}", area.key);
            return Ok(None);
        };

        let resolved = self.resolve_contacts(&record.contact_ids).await?;

        let contacts = if resolved.is_empty() {
            Vec::new()
        } else {
            match self.rank_contacts(resolved, request).await {
                Ok(contacts) => contacts,
                Err(e) => {
                    warn!("Contact ranking for area '{}' failed: {e}", area.key);
                    Vec::new()
                }
            }
        };

        Ok(Some(RankedArea {
            name: area.key,
            rating: area.value,
            contacts,
        }))
    }

    async fn resolve_contacts(
        &self,
        contact_ids: &[String],
    ) -> Result<Vec<ResolvedContact>, RankingError> {
        let mut seen = HashSet::new();
        let ids: Vec<&String> = contact_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .collect();

        let lookups = ids.iter().map(|id| self.contacts.get(id));
        let records = join_all(lookups).await;

        let mut resolved = Vec::with_capacity(ids.len());
        for (id, record) in ids.into_iter().zip(records) {
            match record? {
                Some(record) => resolved.push(ResolvedContact {
                    id: id.clone(),
                    record,
                }),
                None => warn!("No data for contact: {id}"),
            }
        }
        Ok(resolved)
    }

    async fn rank_contacts(
        &self,
        resolved: Vec<ResolvedContact>,
        request: &RankingRequest,
    ) -> Result<Vec<RankedContact>, RankingError> {
        let known: HashSet<String> = resolved.iter().map(|c| c.id.clone()).collect();
        let candidates: Vec<ContactCandidate<'_>> = resolved
            .iter()
            .map(|c| ContactCandidate {
                id: &c.id,
                description: &c.record.description,
            })
            .collect();

        let prompt = build_contact_prompt(&candidates, request);
        let ratings = self
            .rate(
                Stage::AwaitingContactRatings,
                &prompt,
                CONTACT_RATING_FIELD,
                &known,
            )
            .await?;

        let mut by_id: HashMap<String, ContactRecord> = resolved
            .into_iter()
            .map(|c| (c.id, c.record))
            .collect();

        Ok(select_top(&ratings, &known, usize::MAX)
            .into_iter()
            .filter_map(|rating| {
                by_id.remove(&rating.key).map(|contact| RankedContact {
                    id: rating.key,
                    contact,
                    rating: rating.value,
                })
            })
            .collect())
    }

    async fn rate(
        &self,
        stage: Stage,
        prompt: &Prompt,
        field: &str,
        expected: &HashSet<String>,
    ) -> Result<RatingMap, RankingError> {
        let raw = self
            .llm
            .complete(&prompt.system, &prompt.user)
            .await
            .map_err(|source| RankingError::Completion { stage, source })?;

        validate(&raw, field, expected).map_err(|source| RankingError::Validation { stage, source })
    }
}
