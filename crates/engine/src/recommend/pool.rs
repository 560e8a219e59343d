//! Two-stage candidate pools.
//!
//! A focused query (e.g. restricted to focus categories) rarely fills the
//! requested limit for a narrow learner. The pool is topped up from an
//! unrestricted query; items keep a marker so callers can tell which stage
//! produced them.

use crate::types::Identified;
use std::collections::HashSet;
use std::future::Future;

/// Candidates from a focused query plus an optional fallback top-up.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePool<T> {
    items: Vec<T>,
    fallback_ids: HashSet<String>,
}

impl<T: Identified> CandidatePool<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether `id` entered the pool only through the fallback query.
    pub fn is_fallback(&self, id: &str) -> bool {
        self.fallback_ids.contains(id)
    }

    /// Items paired with their fallback marker, in pool order.
    pub fn into_marked(self) -> Vec<(T, bool)> {
        let fallback_ids = self.fallback_ids;
        self.items
            .into_iter()
            .map(|item| {
                let fallback = fallback_ids.contains(item.id());
                (item, fallback)
            })
            .collect()
    }
}

/// Merge focused and fallback results, deduplicating by id.
///
/// Focused items come first in their original order; fallback items follow
/// in theirs. The first occurrence of an id wins.
pub fn merge_pools<T: Identified>(primary: Vec<T>, fallback: Vec<T>) -> CandidatePool<T> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(primary.len() + fallback.len());
    let mut fallback_ids = HashSet::new();

    for item in primary {
        if seen.insert(item.id().to_string()) {
            items.push(item);
        }
    }
    for item in fallback {
        if seen.insert(item.id().to_string()) {
            fallback_ids.insert(item.id().to_string());
            items.push(item);
        }
    }

    CandidatePool {
        items,
        fallback_ids,
    }
}

/// Run `fallback` only when `primary` holds fewer than `needed` items.
pub async fn top_up<T, F, Fut>(
    primary: Vec<T>,
    needed: usize,
    fallback: F,
) -> anyhow::Result<CandidatePool<T>>
where
    T: Identified,
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<Vec<T>>>,
{
    if primary.len() >= needed {
        return Ok(merge_pools(primary, Vec::new()));
    }
    let extra = fallback().await?;
    Ok(merge_pools(primary, extra))
}
