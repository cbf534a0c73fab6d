use rand::seq::SliceRandom;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::{
    db::ExperienceStore,
    error::AppResult,
    models::{ChatMessage, Experience},
    services::{
        providers::ChatProvider,
        tags::{
            collect_tags, parse_ranking, parse_tag_list, ranking_prompt, similar_tags_prompt,
            RANKING_WINDOW, SIMILAR_TAG_LIMIT,
        },
    },
};

/// Generates personalized experience recommendations
///
/// Users with history get tag-based candidates, expanded and ranked by the
/// language model. Users without history get a shuffled selection of
/// trending or featured experiences. Both model calls degrade to a local
/// fallback on failure; only data store errors fail the request.
pub struct RecommendationService {
    store: Arc<dyn ExperienceStore>,
    llm: Arc<dyn ChatProvider>,
    model: String,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn ExperienceStore>, llm: Arc<dyn ChatProvider>, model: String) -> Self {
        Self { store, llm, model }
    }

    /// Returns up to `k` experiences the user has neither wishlisted nor viewed
    #[tracing::instrument(skip(self), fields(provider = self.llm.name()))]
    pub async fn suggest(&self, user_id: &str, k: usize) -> AppResult<Vec<Experience>> {
        let start = Instant::now();

        // 1. Seen set
        let seen = self.store.seen_experience_ids(user_id).await?;

        // 2. Cold start
        if seen.is_empty() {
            tracing::info!("No interaction history, serving cold start");
            return self.cold_start(k).await;
        }

        // 3a/3b. User tags and the catalog-wide tag universe
        let seen_ids: Vec<Uuid> = seen.iter().copied().collect();
        let (seen_experiences, available_tags) = tokio::try_join!(
            self.store.experiences_by_ids(&seen_ids),
            self.store.available_tags(),
        )?;
        let user_tags = collect_tags(&seen_experiences);

        if user_tags.is_empty() {
            tracing::info!(seen = seen.len(), "Seen experiences carry no tags, serving cold start");
            return self.cold_start(k).await;
        }

        // 3c. Tag expansion
        let similar_tags = self.similar_tags(&user_tags, &available_tags).await;

        // 3d. Candidates
        let candidates = self
            .store
            .experiences_matching_tags(&similar_tags, &seen_ids)
            .await?;
        let candidates = exclude_seen(candidates, &seen);

        if candidates.is_empty() {
            tracing::info!(
                user_tags = user_tags.len(),
                similar_tags = similar_tags.len(),
                "No candidates matched"
            );
            return Ok(Vec::new());
        }

        // 3e/3f. Ranking and truncation
        let candidate_count = candidates.len();
        let mut ranked = self.rank(candidates, &user_tags, k).await;
        ranked.truncate(k);

        tracing::info!(
            seen = seen.len(),
            user_tags = user_tags.len(),
            similar_tags = similar_tags.len(),
            candidates = candidate_count,
            returned = ranked.len(),
            processing_time_ms = start.elapsed().as_millis(),
            "Recommendations generated"
        );

        Ok(ranked)
    }

    async fn cold_start(&self, k: usize) -> AppResult<Vec<Experience>> {
        let mut experiences = self.store.trending_or_featured(k).await?;
        shuffle(&mut experiences);
        experiences.truncate(k);
        Ok(experiences)
    }

    /// Expands the user's tags with semantically similar catalog tags
    ///
    /// Falls back to `user_tags` verbatim when the call fails or the reply
    /// names no known tag.
    pub async fn similar_tags(
        &self,
        user_tags: &BTreeSet<String>,
        available_tags: &BTreeSet<String>,
    ) -> BTreeSet<String> {
        let prompt = similar_tags_prompt(user_tags, available_tags, SIMILAR_TAG_LIMIT);

        match self.llm.complete(&[ChatMessage::user(prompt)], &self.model).await {
            Ok(reply) => match parse_tag_list(&reply, available_tags, SIMILAR_TAG_LIMIT) {
                Some(tags) => {
                    tracing::debug!(tags = ?tags, "Tag expansion succeeded");
                    tags
                }
                None => {
                    tracing::warn!(reply = %reply, "Tag expansion reply unusable, using user tags");
                    user_tags.clone()
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Tag expansion failed, using user tags");
                user_tags.clone()
            }
        }
    }

    /// Orders candidates by the model's ranking, or shuffles them on failure
    async fn rank(
        &self,
        candidates: Vec<Experience>,
        user_tags: &BTreeSet<String>,
        k: usize,
    ) -> Vec<Experience> {
        let window = candidates.len().min(RANKING_WINDOW);
        let prompt = ranking_prompt(&candidates, user_tags, k);

        let indices = match self.llm.complete(&[ChatMessage::user(prompt)], &self.model).await {
            Ok(reply) => {
                let indices = parse_ranking(&reply, window);
                if indices.is_empty() {
                    tracing::warn!(reply = %reply, "Ranking reply unusable, shuffling candidates");
                }
                indices
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ranking failed, shuffling candidates");
                Vec::new()
            }
        };

        if indices.is_empty() {
            let mut shuffled = candidates;
            shuffle(&mut shuffled);
            return shuffled;
        }

        indices.into_iter().map(|i| candidates[i].clone()).collect()
    }
}

/// Drops anything in the seen set the store may have returned anyway
fn exclude_seen(candidates: Vec<Experience>, seen: &HashSet<Uuid>) -> Vec<Experience> {
    candidates
        .into_iter()
        .filter(|exp| !seen.contains(&exp.id))
        .collect()
}

fn shuffle(experiences: &mut [Experience]) {
    experiences.shuffle(&mut rand::thread_rng());
}
