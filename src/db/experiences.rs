//! Read-only access to the experiences catalog and user interaction tables
//!
//! Tables consumed:
//! - `experiences`: the catalog
//! - `wishlists`, `viewed_experiences`: `(user_id, experience_id, created_at)` interaction rows

use sqlx::PgPool;
use std::collections::{BTreeSet, HashSet};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Experience, TagColumns},
};

/// Column list shared by every query returning full `Experience` rows.
/// Nullable flags collapse to `false` so rows always decode.
macro_rules! experience_columns {
    () => {
        "id, COALESCE(title, '') AS title, description, category, niche_category, \
         COALESCE(adventurous, false) AS adventurous, \
         COALESCE(romantic, false) AS romantic, \
         COALESCE(group_a, false) AS group_a, \
         COALESCE(trending, false) AS trending, \
         COALESCE(featured, false) AS featured"
    };
}

/// Filtered reads the recommendation pipeline needs from the data store
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ExperienceStore: Send + Sync {
    /// Union of experience ids the user has wishlisted or viewed
    async fn seen_experience_ids(&self, user_id: &str) -> AppResult<HashSet<Uuid>>;

    /// Up to `limit` experiences flagged trending or featured
    async fn trending_or_featured(&self, limit: usize) -> AppResult<Vec<Experience>>;

    /// Full records for the given ids; unknown ids are skipped
    async fn experiences_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Experience>>;

    /// Every distinct tag appearing across the catalog
    async fn available_tags(&self) -> AppResult<BTreeSet<String>>;

    /// Experiences carrying at least one of `tags`, minus the excluded ids
    ///
    /// Tags are expected in canonical (lowercase) form.
    async fn experiences_matching_tags(
        &self,
        tags: &BTreeSet<String>,
        exclude: &[Uuid],
    ) -> AppResult<Vec<Experience>>;
}

/// `ExperienceStore` backed by the Postgres database behind the hosted store
#[derive(Clone)]
pub struct PgExperienceStore {
    pool: PgPool,
}

impl PgExperienceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ExperienceStore for PgExperienceStore {
    async fn seen_experience_ids(&self, user_id: &str) -> AppResult<HashSet<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT experience_id FROM wishlists WHERE user_id::text = $1
            UNION
            SELECT experience_id FROM viewed_experiences WHERE user_id::text = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(user_id = %user_id, seen = ids.len(), "Loaded seen set");

        Ok(ids.into_iter().collect())
    }

    async fn trending_or_featured(&self, limit: usize) -> AppResult<Vec<Experience>> {
        let rows = sqlx::query_as::<_, Experience>(concat!(
            "SELECT ",
            experience_columns!(),
            " FROM experiences \
             WHERE COALESCE(trending, false) OR COALESCE(featured, false) \
             LIMIT $1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn experiences_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Experience>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, Experience>(concat!(
            "SELECT ",
            experience_columns!(),
            " FROM experiences WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn available_tags(&self) -> AppResult<BTreeSet<String>> {
        let rows = sqlx::query_as::<_, TagColumns>(
            r#"
            SELECT category, niche_category,
                   COALESCE(adventurous, false) AS adventurous,
                   COALESCE(romantic, false) AS romantic,
                   COALESCE(group_a, false) AS group_a
            FROM experiences
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().flat_map(TagColumns::tags).collect())
    }

    async fn experiences_matching_tags(
        &self,
        tags: &BTreeSet<String>,
        exclude: &[Uuid],
    ) -> AppResult<Vec<Experience>> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, Experience>(concat!(
            "SELECT ",
            experience_columns!(),
            " FROM experiences WHERE NOT (id = ANY($1)) ORDER BY id"
        ))
        .bind(exclude)
        .fetch_all(&self.pool)
        .await?;

        let scanned = rows.len();
        let rows = retain_matching(rows, tags, exclude);

        tracing::debug!(
            tags = tags.len(),
            excluded = exclude.len(),
            scanned,
            matched = rows.len(),
            "Candidate query completed"
        );

        Ok(rows)
    }
}

/// Keeps rows carrying at least one of `tags` whose id is not excluded
///
/// Tags are compared through `Experience::tags`, never SQL string functions.
pub fn retain_matching(
    rows: Vec<Experience>,
    tags: &BTreeSet<String>,
    exclude: &[Uuid],
) -> Vec<Experience> {
    rows.into_iter()
        .filter(|row| !exclude.contains(&row.id) && row.matches_any(tags))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::experience;

    fn tags(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_category_with_tab_matches_trimmed_tag() {
        let rows = vec![experience(1, "Hiking\t", None), experience(2, "dining", None)];

        let matched = retain_matching(rows, &tags(&["hiking"]), &[]);

        let ids: Vec<Uuid> = matched.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![Uuid::from_u128(1)]);
    }

    #[test]
    fn test_non_ascii_category_matches_lowercased_tag() {
        let rows = vec![
            experience(1, "Équitation", None),
            experience(2, "spa", Some("ÉQUITATION ")),
        ];

        let matched = retain_matching(rows, &tags(&["équitation"]), &[]);

        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn test_flag_tags_match_boolean_columns() {
        let mut romantic = experience(1, "dining", None);
        romantic.romantic = true;
        let mut group = experience(2, "outdoor", None);
        group.group_a = true;
        let rows = vec![romantic, group, experience(3, "spa", None)];

        let matched = retain_matching(rows, &tags(&["group_a"]), &[]);

        let ids: Vec<Uuid> = matched.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![Uuid::from_u128(2)]);
    }

    #[test]
    fn test_excluded_ids_dropped_even_when_matching() {
        let rows = vec![
            experience(1, "outdoor", None),
            experience(2, "Outdoor", None),
            experience(3, "outdoor", None),
        ];

        let matched = retain_matching(rows, &tags(&["outdoor"]), &[Uuid::from_u128(2)]);

        let ids: Vec<Uuid> = matched.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![Uuid::from_u128(1), Uuid::from_u128(3)]);
    }

    #[test]
    fn test_no_overlap_keeps_nothing() {
        let rows = vec![experience(1, "outdoor", Some("hiking"))];
        assert!(retain_matching(rows, &tags(&["wellness"]), &[]).is_empty());
    }
}
