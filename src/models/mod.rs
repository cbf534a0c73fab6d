use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub mod chat;
pub mod envelope;

pub use chat::{ChatMessage, Role};
pub use envelope::{ErrorEnvelope, HealthResponse, ResponseStatus, SuggestedResponse};

/// An experience row as stored in the `experiences` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub niche_category: Option<String>,
    pub adventurous: bool,
    pub romantic: bool,
    pub group_a: bool,
    pub trending: bool,
    pub featured: bool,
}

/// Boolean trait columns that contribute a tag when true
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraitFlag {
    Adventurous,
    Romantic,
    Group,
}

impl TraitFlag {
    pub const ALL: [TraitFlag; 3] = [TraitFlag::Adventurous, TraitFlag::Romantic, TraitFlag::Group];

    /// Tag string derived from this flag; identical to its column name
    pub fn tag(self) -> &'static str {
        match self {
            TraitFlag::Adventurous => "adventurous",
            TraitFlag::Romantic => "romantic",
            TraitFlag::Group => "group_a",
        }
    }
}

/// Canonical tag form: trimmed and lowercased
///
/// Every tag comparison in the crate goes through this. Candidate matching
/// happens in Rust for that reason, never in SQL.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim().to_lowercase();
    if tag.is_empty() {
        None
    } else {
        Some(tag)
    }
}

/// Flattens the tag-bearing columns; `flags` follows [`TraitFlag::ALL`]
fn derive_tags(
    category: Option<&str>,
    niche_category: Option<&str>,
    flags: [bool; 3],
) -> BTreeSet<String> {
    let mut tags: BTreeSet<String> = [category, niche_category]
        .into_iter()
        .flatten()
        .filter_map(normalize_tag)
        .collect();

    for (flag, set) in TraitFlag::ALL.into_iter().zip(flags) {
        if set {
            tags.insert(flag.tag().to_string());
        }
    }

    tags
}

impl Experience {
    /// Flattens category, niche category and true trait flags into tags
    pub fn tags(&self) -> BTreeSet<String> {
        derive_tags(
            self.category.as_deref(),
            self.niche_category.as_deref(),
            [self.adventurous, self.romantic, self.group_a],
        )
    }

    pub fn matches_any(&self, tags: &BTreeSet<String>) -> bool {
        self.tags().iter().any(|tag| tags.contains(tag))
    }
}

/// Only the tag-bearing columns of an `experiences` row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TagColumns {
    pub category: Option<String>,
    pub niche_category: Option<String>,
    pub adventurous: bool,
    pub romantic: bool,
    pub group_a: bool,
}

impl TagColumns {
    pub fn tags(&self) -> BTreeSet<String> {
        derive_tags(
            self.category.as_deref(),
            self.niche_category.as_deref(),
            [self.adventurous, self.romantic, self.group_a],
        )
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Builds an experience with a deterministic id derived from `n`
    pub fn experience(n: u128, category: &str, niche: Option<&str>) -> Experience {
        Experience {
            id: Uuid::from_u128(n),
            title: format!("Experience {}", n),
            description: None,
            category: Some(category.to_string()),
            niche_category: niche.map(str::to_string),
            adventurous: false,
            romantic: false,
            group_a: false,
            trending: false,
            featured: false,
        }
    }
}
