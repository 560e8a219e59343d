//! Learning-resource matching.
//!
//! Resources are scored against error types, languages, tags and a target
//! level:
//!
//! ```text
//! quality + 4 × error matches + 3 × language match + 1.5 × tag matches
//!         + max(0, 3 − |level rank − target rank|)
//! ```
//!
//! With no error types and nothing ranked, the top resources by quality,
//! filtered only by language and tag, are returned instead.

use crate::config::ScoringWeights;
use crate::store::{ResourceCatalog, ResourceFilter};
use crate::types::{ExperienceLevel, LearningResource};
use tracing::{debug, instrument};

/// Inputs for one resource search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceQuery {
    pub error_types: Vec<String>,
    pub languages: Vec<String>,
    pub tags: Vec<String>,
    pub level: ExperienceLevel,
    pub limit: usize,
}

impl ResourceQuery {
    /// Lower-case every key list; the catalog stores lower-cased values.
    fn normalized(&self) -> Self {
        let lower = |v: &[String]| v.iter().map(|s| s.to_lowercase()).collect::<Vec<_>>();
        Self {
            error_types: lower(&self.error_types),
            languages: lower(&self.languages),
            tags: lower(&self.tags),
            level: self.level,
            limit: self.limit,
        }
    }
}

/// Scores catalog entries. Holds no state besides the weights.
#[derive(Debug, Clone, Copy)]
pub struct ResourceMatcher<'a> {
    weights: &'a ScoringWeights,
}

impl<'a> ResourceMatcher<'a> {
    pub fn new(weights: &'a ScoringWeights) -> Self {
        Self { weights }
    }

    /// Score of one resource against an already-normalized query.
    pub fn score(&self, resource: &LearningResource, query: &ResourceQuery) -> f64 {
        let w = self.weights;
        let mut score = resource.quality_or_default();

        let error_matches = resource
            .error_types
            .iter()
            .filter(|e| query.error_types.contains(&e.to_lowercase()))
            .count();
        score += w.resource_error_match * error_matches as f64;

        if resource
            .language
            .as_deref()
            .is_some_and(|l| query.languages.contains(&l.to_lowercase()))
        {
            score += w.resource_language_match;
        }

        let tag_matches = resource
            .tags
            .iter()
            .filter(|t| query.tags.contains(&t.to_lowercase()))
            .count();
        score += w.resource_tag_match * tag_matches as f64;

        let resource_rank = resource.difficulty.unwrap_or_default().rank();
        let delta = f64::from(resource_rank.abs_diff(query.level.rank()));
        score += (w.resource_level_ceiling - delta).max(0.0);

        score
    }

    /// Rank a catalog snapshot.
    ///
    /// When error types are given, only resources addressing at least one of
    /// them are considered. Ties keep catalog order.
    pub fn rank(&self, catalog: &[LearningResource], query: &ResourceQuery) -> Vec<LearningResource> {
        let query = query.normalized();
        let mut scored: Vec<(f64, &LearningResource)> = catalog
            .iter()
            .filter(|r| {
                query.error_types.is_empty()
                    || r.error_types
                        .iter()
                        .any(|e| query.error_types.contains(&e.to_lowercase()))
            })
            .map(|r| (self.score(r, &query), r))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let ranked: Vec<LearningResource> = scored
            .into_iter()
            .take(query.limit)
            .map(|(_, r)| r.clone())
            .collect();

        if ranked.is_empty() && query.error_types.is_empty() {
            return top_quality(catalog, &query);
        }
        ranked
    }
}

/// Highest-quality resources matching the query's languages and tags.
fn top_quality(catalog: &[LearningResource], query: &ResourceQuery) -> Vec<LearningResource> {
    let matches_any = |wanted: &[String], value: &str| {
        wanted.is_empty() || wanted.iter().any(|w| w.eq_ignore_ascii_case(value))
    };
    let mut pool: Vec<&LearningResource> = catalog
        .iter()
        .filter(|r| {
            query.languages.is_empty()
                || r.language
                    .as_deref()
                    .is_some_and(|l| matches_any(&query.languages, l))
        })
        .filter(|r| query.tags.is_empty() || r.tags.iter().any(|t| matches_any(&query.tags, t)))
        .collect();
    pool.sort_by(|a, b| {
        b.quality_score
            .unwrap_or(0.0)
            .total_cmp(&a.quality_score.unwrap_or(0.0))
    });
    pool.into_iter().take(query.limit).cloned().collect()
}

/// Query the catalog and rank the result.
///
/// Only error types narrow the catalog read; languages and tags affect the
/// score. The fallback read narrows by language and tag instead.
#[instrument(level = "debug", skip(catalog, weights))]
pub async fn suggest(
    catalog: &dyn ResourceCatalog,
    weights: &ScoringWeights,
    query: &ResourceQuery,
) -> anyhow::Result<Vec<LearningResource>> {
    let normalized = query.normalized();
    let primary = catalog
        .find_active(&ResourceFilter {
            error_types: normalized.error_types.clone(),
            ..Default::default()
        })
        .await?;

    let matcher = ResourceMatcher::new(weights);
    let ranked = matcher.rank(&primary, &normalized);
    if !ranked.is_empty() || !normalized.error_types.is_empty() {
        return Ok(ranked);
    }

    let fallback = catalog
        .find_active(&ResourceFilter {
            error_types: Vec::new(),
            languages: normalized.languages.clone(),
            tags: normalized.tags.clone(),
        })
        .await?;
    debug!(
        target: "learnpath::resources",
        candidates = fallback.len(),
        "Falling back to top-quality resources"
    );
    Ok(top_quality(&fallback, &normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;
    use crate::test_support::{approx_eq, resource};

    fn query(errors: &[&str], languages: &[&str], tags: &[&str]) -> ResourceQuery {
        ResourceQuery {
            error_types: errors.iter().map(|s| s.to_string()).collect(),
            languages: languages.iter().map(|s| s.to_string()).collect(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            level: ExperienceLevel::Beginner,
            limit: 8,
        }
    }

    #[test]
    fn test_score_formula() {
        let weights = ScoringWeights::default();
        let matcher = ResourceMatcher::new(&weights);
        let mut r = resource("u1", &["syntax", "runtime"], Some("python"));
        r.tags = vec!["loops".to_string(), "lists".to_string()];
        r.quality_score = Some(2.0);
        r.difficulty = Some(ExperienceLevel::Intermediate);
        let q = query(&["syntax"], &["python"], &["loops"]).normalized();
        // 2 + 4 + 3 + 1.5 + (3 - 1)
        assert!(approx_eq(matcher.score(&r, &q), 12.5));
    }

    #[test]
    fn test_missing_difficulty_counts_as_beginner() {
        let weights = ScoringWeights::default();
        let matcher = ResourceMatcher::new(&weights);
        let r = resource("u1", &[], None);
        let mut q = query(&[], &[], &[]);
        q.level = ExperienceLevel::Advanced;
        // quality 1 + max(0, 3 - 2)
        assert!(approx_eq(matcher.score(&r, &q), 2.0));
    }

    #[test]
    fn test_rank_filters_by_error_type_and_orders() {
        let weights = ScoringWeights::default();
        let matcher = ResourceMatcher::new(&weights);
        let catalog = vec![
            resource("none", &["timeout"], Some("python")),
            resource("one", &["syntax"], None),
            resource("two", &["syntax"], Some("python")),
        ];
        let ranked = matcher.rank(&catalog, &query(&["Syntax"], &["Python"], &[]));
        let urls: Vec<_> = ranked.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["two", "one"]);
    }

    #[test]
    fn test_rank_respects_limit() {
        let weights = ScoringWeights::default();
        let matcher = ResourceMatcher::new(&weights);
        let catalog: Vec<_> = (0..12)
            .map(|i| resource(&format!("u{i}"), &["syntax"], None))
            .collect();
        assert_eq!(matcher.rank(&catalog, &query(&["syntax"], &[], &[])).len(), 8);
    }

    #[test]
    fn test_no_errors_ranks_whole_catalog() {
        let weights = ScoringWeights::default();
        let matcher = ResourceMatcher::new(&weights);
        let catalog = vec![resource("a", &["syntax"], Some("go"))];
        assert_eq!(matcher.rank(&catalog, &query(&[], &[], &[])).len(), 1);
    }

    #[tokio::test]
    async fn test_suggest_uses_catalog() {
        let store = MemStore::new();
        store.add_resource(resource("a", &["syntax"], Some("python")));
        store.add_resource(resource("b", &["logic"], Some("python")));
        let weights = ScoringWeights::default();
        let found = suggest(&store, &weights, &query(&["syntax"], &[], &[]))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url, "a");
    }

    #[tokio::test]
    async fn test_suggest_unknown_error_type_returns_empty() {
        let store = MemStore::new();
        store.add_resource(resource("a", &["syntax"], Some("python")));
        let weights = ScoringWeights::default();
        let found = suggest(&store, &weights, &query(&["memory"], &[], &[]))
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}
