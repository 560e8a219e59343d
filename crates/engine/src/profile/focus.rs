//! Weakness ranking for focus categories and focus tags.
//!
//! Weakness is `multiplier × errors − successes` for anything with at least
//! one recorded error. Error-free categories score `−successes + penalty`
//! (penalty −100 by default). Ranking puts every category with an error
//! ahead of every clean one, even when its own success count would push its
//! score below the penalty. Error-free tags are not ranked at all.

use crate::config::ScoringWeights;
use crate::types::Category;
use std::collections::BTreeMap;

/// Weakness score for one bucket.
pub fn weakness_score(errors: u32, successes: u32, weights: &ScoringWeights) -> f64 {
    if errors > 0 {
        weights.weakness_error_multiplier * f64::from(errors) - f64::from(successes)
    } else {
        -f64::from(successes) + weights.clean_category_penalty
    }
}

/// Top `limit` categories by weakness.
///
/// Every category in [`Category::ALL`] is ranked; ties keep declaration order.
pub fn pick_focus_categories(
    successes: &BTreeMap<Category, u32>,
    errors: &BTreeMap<Category, u32>,
    weights: &ScoringWeights,
    limit: usize,
) -> Vec<Category> {
    let mut scored: Vec<(Category, bool, f64)> = Category::ALL
        .iter()
        .map(|&cat| {
            let e = errors.get(&cat).copied().unwrap_or(0);
            let s = successes.get(&cat).copied().unwrap_or(0);
            (cat, e > 0, weakness_score(e, s, weights))
        })
        .collect();
    // Erroring categories first regardless of success count, then by score.
    // Stable sort: equal keys stay in enum order.
    scored.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.total_cmp(&a.2)));
    scored.into_iter().take(limit).map(|(cat, ..)| cat).collect()
}

/// Top `limit` tags by weakness, considering only tags with recorded errors.
///
/// Ties are broken alphabetically.
pub fn pick_focus_tags(
    successes: &BTreeMap<String, u32>,
    errors: &BTreeMap<String, u32>,
    weights: &ScoringWeights,
    limit: usize,
) -> Vec<String> {
    let mut scored: Vec<(&String, f64)> = errors
        .iter()
        .filter(|(_, &e)| e > 0)
        .map(|(tag, &e)| {
            let s = successes.get(tag).copied().unwrap_or(0);
            (tag, weakness_score(e, s, weights))
        })
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
        .into_iter()
        .take(limit)
        .map(|(tag, _)| tag.clone())
        .collect()
}
