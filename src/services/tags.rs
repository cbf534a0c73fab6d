use std::collections::{BTreeSet, HashSet};

use crate::models::{normalize_tag, Experience};

/// Maximum number of tags requested from the tag-expansion prompt
pub const SIMILAR_TAG_LIMIT: usize = 10;

/// Maximum number of candidates listed in the ranking prompt
pub const RANKING_WINDOW: usize = 20;

/// Union of the tags of every experience
pub fn collect_tags(experiences: &[Experience]) -> BTreeSet<String> {
    experiences.iter().flat_map(Experience::tags).collect()
}

fn join(tags: &BTreeSet<String>) -> String {
    tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

pub fn similar_tags_prompt(
    user_tags: &BTreeSet<String>,
    available_tags: &BTreeSet<String>,
    limit: usize,
) -> String {
    format!(
        "Given the user's preferred tags: {user}\n\n\
         And the available experience tags: {available}\n\n\
         Find the top {limit} most semantically similar tags from the available tags \
         that would match the user's preferences.\n\
         Consider:\n\
         - Direct matches\n\
         - Related categories (e.g., 'adventure' matches 'outdoor', 'sports', 'adrenaline')\n\
         - Complementary experiences (e.g., 'romantic' matches 'dining', 'wellness', 'luxury')\n\
         - Contextual relationships\n\n\
         Return only the tag names as a comma-separated list, no explanations.",
        user = join(user_tags),
        available = join(available_tags),
    )
}

pub fn ranking_prompt(candidates: &[Experience], user_tags: &BTreeSet<String>, k: usize) -> String {
    let listing: Vec<String> = candidates
        .iter()
        .take(RANKING_WINDOW)
        .enumerate()
        .map(|(i, exp)| {
            format!(
                "{}. {} (Category: {}, Niche: {})",
                i + 1,
                exp.title,
                exp.category.as_deref().unwrap_or("N/A"),
                exp.niche_category.as_deref().unwrap_or("N/A"),
            )
        })
        .collect();

    format!(
        "Given the user's preferred tags: {user}\n\n\
         Rank these experiences by relevance to the user's preferences:\n\
         {listing}\n\n\
         Return only the numbers of the top {k} most relevant experiences, \
         separated by commas.",
        user = join(user_tags),
        listing = listing.join("\n"),
    )
}

/// Strips quoting and list decoration a model tends to wrap tokens in
fn clean_token(token: &str) -> &str {
    token
        .trim()
        .trim_start_matches(['-', '*', '•'])
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '[' | ']' | '.') || c.is_whitespace())
}

/// Parses a comma-separated tag reply
///
/// Only tags present in `available` are kept, in reply order, without
/// duplicates, at most `limit` of them. Returns `None` when nothing usable
/// remains so the caller can fall back.
pub fn parse_tag_list(
    reply: &str,
    available: &BTreeSet<String>,
    limit: usize,
) -> Option<BTreeSet<String>> {
    let mut ordered: Vec<String> = Vec::new();

    for token in reply.split([',', '\n']) {
        let Some(tag) = normalize_tag(clean_token(token)) else {
            continue;
        };
        if available.contains(&tag) && !ordered.contains(&tag) {
            ordered.push(tag);
        }
    }

    ordered.truncate(limit);

    if ordered.is_empty() {
        None
    } else {
        Some(ordered.into_iter().collect())
    }
}

/// Parses a comma-separated list of 1-based candidate numbers
///
/// Returns zero-based indices in reply order. Non-numeric tokens, zero,
/// numbers beyond `window`, and repeats are skipped.
pub fn parse_ranking(reply: &str, window: usize) -> Vec<usize> {
    let mut seen = HashSet::new();

    reply
        .split([',', '\n'])
        .map(|token| {
            token
                .trim()
                .trim_matches(|c: char| matches!(c, '"' | '\'' | '[' | ']' | '.'))
        })
        .filter(|token| !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|token| token.parse::<usize>().ok())
        .filter(|&n| n >= 1 && n <= window)
        .map(|n| n - 1)
        .filter(|&i| seen.insert(i))
        .collect()
}
