//! Confidence-scored show identification.
//!
//! A folder name is searched once in the catalog and the top hits are scored
//! against it. The result is three-way: a confident match, a short list of
//! plausible candidates for a human to choose from, or nothing at all.

use std::collections::HashSet;

use tvshelf_catalog::types::{MatchedShow, ShowCandidate};

use crate::catalog::CatalogService;
use crate::error::CatalogError;

/// Content types treated as series. Everything else (variety, sports, news,
/// game shows, ...) is ignored.
pub const ALLOWED_KINDS: &[&str] = &["Scripted", "Animation", "Reality", "Talk Show", "Documentary"];

/// Only the first few search hits are scored.
pub const MAX_CANDIDATES: usize = 3;

pub const ACCEPT_THRESHOLD: f64 = 60.0;
pub const EXACT_ACCEPT_THRESHOLD: f64 = 80.0;

/// Scores in `[UNCERTAIN_MIN, ACCEPT_THRESHOLD)` are offered as candidates.
pub const UNCERTAIN_MIN: f64 = 40.0;

/// Outcome of identifying a show.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// The best candidate cleared the acceptance threshold.
    Accepted(MatchedShow),
    /// Nothing was confident enough. The best candidate comes first.
    Uncertain(Vec<MatchedShow>),
    /// No candidate survived filtering or all scored zero.
    NotFound,
}

/// Score how well a catalog show name matches a query, on a 0–100 scale.
///
/// Comparison is case-insensitive on trimmed strings: equality scores 100,
/// containment in either direction 75, otherwise the word overlap
/// `|common| / max(|a|, |b|)` scaled to 50.
pub fn score_name(candidate: &str, query: &str) -> f64 {
    let candidate = candidate.trim().to_lowercase();
    let query = query.trim().to_lowercase();
    if candidate.is_empty() || query.is_empty() {
        return 0.0;
    }

    if candidate == query {
        return 100.0;
    }
    if candidate.contains(&query) || query.contains(&candidate) {
        return 75.0;
    }

    let candidate_words: HashSet<&str> = candidate.split_whitespace().collect();
    let query_words: HashSet<&str> = query.split_whitespace().collect();
    let common = candidate_words.intersection(&query_words).count();
    if common == 0 {
        return 0.0;
    }
    common as f64 / candidate_words.len().max(query_words.len()) as f64 * 50.0
}

/// Classify search hits for `query`.
///
/// `candidates` are expected in the catalog's ranking order; only the first
/// [`MAX_CANDIDATES`] are considered.
pub fn classify_candidates(
    query: &str,
    candidates: &[ShowCandidate],
    require_exact: bool,
) -> MatchOutcome {
    let mut best: Option<MatchedShow> = None;
    let mut uncertain: Vec<MatchedShow> = Vec::new();

    for candidate in candidates.iter().take(MAX_CANDIDATES) {
        let allowed = candidate
            .kind
            .as_deref()
            .is_some_and(|kind| ALLOWED_KINDS.contains(&kind));
        if !allowed {
            continue;
        }

        let score = score_name(&candidate.name, query);
        let matched = MatchedShow::from_candidate(candidate, score);

        if score > best.as_ref().map_or(0.0, |b| b.confidence) {
            best = Some(matched.clone());
        }
        if (UNCERTAIN_MIN..ACCEPT_THRESHOLD).contains(&score) {
            uncertain.push(matched);
        }
    }

    let threshold = if require_exact {
        EXACT_ACCEPT_THRESHOLD
    } else {
        ACCEPT_THRESHOLD
    };

    match best {
        Some(best) if best.confidence >= threshold => MatchOutcome::Accepted(best),
        Some(best) => {
            if !uncertain.iter().any(|c| c.external_id == best.external_id) {
                uncertain.insert(0, best);
            }
            MatchOutcome::Uncertain(uncertain)
        }
        None => MatchOutcome::NotFound,
    }
}

/// Identifies shows by name through a catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowMatcher {
    pub require_exact: bool,
}

impl ShowMatcher {
    pub fn new(require_exact: bool) -> Self {
        Self { require_exact }
    }

    /// Search the catalog once and classify the hits.
    pub fn identify(
        &self,
        catalog: &dyn CatalogService,
        name: &str,
    ) -> Result<MatchOutcome, CatalogError> {
        let candidates = catalog.search_shows(name)?;
        log::debug!("Catalog returned {} hit(s) for '{}'", candidates.len(), name);
        Ok(classify_candidates(name, &candidates, self.require_exact))
    }
}

#[cfg(test)]
#[path = "tests/matcher_tests.rs"]
mod tests;
