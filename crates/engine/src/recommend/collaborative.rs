//! Collaborative booster.
//!
//! Raises challenges that many other learners with overlapping languages and
//! focus categories have solved. The step is best-effort: a failing or slow
//! peer query leaves the base ranking untouched.

use super::{Recommendation, RecommendationSignal};
use crate::config::{PlanConfig, ScoringWeights};
use crate::error::Ignored;
use crate::profile::UserProfile;
use crate::store::{PeerAcceptance, PeerQuery, SubmissionStore};
use crate::types::{Category, ChallengeMeta};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

/// Peer acceptance summary for one challenge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerPopularity {
    pub challenge_id: String,
    /// Distinct learners with an accepted submission.
    pub learners: u32,
    pub average_score: Option<f64>,
}

/// Group peer acceptances by challenge and keep the `limit` most popular.
///
/// Popularity is the number of distinct learners; ties go to the higher
/// average score, then to the smaller challenge id.
pub fn aggregate_peers(acceptances: Vec<PeerAcceptance>, limit: usize) -> Vec<PeerPopularity> {
    struct Acc {
        users: HashSet<String>,
        score_sum: f64,
        scored: u32,
    }

    let mut by_challenge: IndexMap<String, Acc> = IndexMap::new();
    for a in acceptances {
        let acc = by_challenge.entry(a.challenge_id).or_insert_with(|| Acc {
            users: HashSet::new(),
            score_sum: 0.0,
            scored: 0,
        });
        acc.users.insert(a.user_id);
        if let Some(score) = a.score {
            acc.score_sum += score;
            acc.scored += 1;
        }
    }

    let mut popular: Vec<PeerPopularity> = by_challenge
        .into_iter()
        .map(|(challenge_id, acc)| PeerPopularity {
            challenge_id,
            learners: acc.users.len() as u32,
            average_score: (acc.scored > 0).then(|| acc.score_sum / f64::from(acc.scored)),
        })
        .collect();

    popular.sort_by(|a, b| {
        b.learners
            .cmp(&a.learners)
            .then_with(|| {
                let sa = a.average_score.unwrap_or(f64::NEG_INFINITY);
                let sb = b.average_score.unwrap_or(f64::NEG_INFINITY);
                sb.total_cmp(&sa)
            })
            .then_with(|| a.challenge_id.cmp(&b.challenge_id))
    });
    popular.truncate(limit);
    popular
}

/// Queries peer acceptances and applies the collaborative bonus.
pub struct CollaborativeBooster<'a> {
    store: &'a dyn SubmissionStore,
    default_languages: &'a [String],
    limit: usize,
    timeout: Duration,
}

impl<'a> CollaborativeBooster<'a> {
    pub fn new(store: &'a dyn SubmissionStore, config: &'a PlanConfig) -> Self {
        Self {
            store,
            default_languages: &config.peer_default_languages,
            limit: config.peer_popular_limit,
            timeout: config.booster_timeout,
        }
    }

    /// Peers share the learner's languages and focus categories. A learner
    /// without languages is matched against the configured defaults; one
    /// without focus categories against every category.
    pub fn peer_query(&self, profile: &UserProfile) -> PeerQuery {
        let languages = if profile.combined_languages.is_empty() {
            self.default_languages.to_vec()
        } else {
            profile.combined_languages.clone()
        };
        let categories = if profile.focus_categories.is_empty() {
            Category::ALL.to_vec()
        } else {
            profile.focus_categories.clone()
        };
        PeerQuery {
            exclude_user: profile.user_id.clone(),
            languages,
            categories,
        }
    }

    /// Most popular challenges among the learner's peers.
    pub async fn popular(&self, profile: &UserProfile) -> Result<Vec<PeerPopularity>, Ignored> {
        let query = self.peer_query(profile);
        match tokio::time::timeout(self.timeout, self.store.accepted_by_others(&query)).await {
            Ok(Ok(acceptances)) => Ok(aggregate_peers(acceptances, self.limit)),
            Ok(Err(e)) => Err(Ignored::failed(e)),
            Err(_) => Err(Ignored::TimedOut(self.timeout)),
        }
    }

    /// Add the collaborative bonus to every recommendation whose challenge
    /// is in `popular`. On `Err` the list is returned unchanged.
    pub fn apply(
        mut recs: Vec<Recommendation<ChallengeMeta>>,
        popular: Result<Vec<PeerPopularity>, Ignored>,
        weights: &ScoringWeights,
    ) -> Vec<Recommendation<ChallengeMeta>> {
        let popular = match popular {
            Ok(p) => p,
            Err(reason) => {
                warn!(
                    target: "learnpath::booster",
                    %reason,
                    "Collaborative boost skipped"
                );
                return recs;
            }
        };

        let mut boosted = 0usize;
        for rec in &mut recs {
            if let Some(peer) = popular.iter().find(|p| p.challenge_id == rec.id) {
                rec.push_signal(
                    RecommendationSignal::PopularWithPeers {
                        learners: peer.learners,
                    },
                    weights,
                );
                boosted += 1;
            }
        }
        debug!(
            target: "learnpath::booster",
            popular = popular.len(),
            boosted,
            "Applied collaborative boost"
        );
        recs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::RecommendationKind;
    use crate::store::MemStore;
    use crate::test_support::{approx_eq, challenge, submission};
    use crate::types::{Difficulty, Outcome, SubmissionRecord};
    use async_trait::async_trait;

    fn peer(user: &str, challenge_id: &str, score: Option<f64>) -> PeerAcceptance {
        PeerAcceptance {
            user_id: user.to_string(),
            challenge_id: challenge_id.to_string(),
            score,
        }
    }

    fn rec(id: &str, score: f64) -> Recommendation<ChallengeMeta> {
        let mut r = Recommendation::new(
            id,
            RecommendationKind::Challenge,
            challenge(id, Category::Logic, Difficulty::Easy, "Rust"),
        );
        r.score = score;
        r
    }

    #[test]
    fn test_aggregate_counts_distinct_learners() {
        let popular = aggregate_peers(
            vec![
                peer("u1", "c1", None),
                peer("u1", "c1", None),
                peer("u2", "c2", None),
                peer("u3", "c2", None),
            ],
            20,
        );
        assert_eq!(popular[0].challenge_id, "c2");
        assert_eq!(popular[0].learners, 2);
        assert_eq!(popular[1].learners, 1);
    }

    #[test]
    fn test_aggregate_tie_breaks_by_score_then_id() {
        let popular = aggregate_peers(
            vec![
                peer("u1", "b", Some(50.0)),
                peer("u2", "a", Some(90.0)),
                peer("u3", "c", Some(90.0)),
            ],
            2,
        );
        let ids: Vec<_> = popular.iter().map(|p| p.challenge_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_apply_adds_bonus_and_reason() {
        let w = ScoringWeights::default();
        let popular = Ok(vec![PeerPopularity {
            challenge_id: "c2".to_string(),
            learners: 3,
            average_score: None,
        }]);
        let out = CollaborativeBooster::apply(vec![rec("c1", 0.5), rec("c2", 0.4)], popular, &w);
        assert!(approx_eq(out[0].score, 0.5));
        assert!(approx_eq(out[1].score, 0.55));
        assert_eq!(out[1].reasons, vec!["Solved by 3 learners with similar focus"]);
    }

    #[test]
    fn test_apply_on_failure_returns_input_unchanged() {
        let w = ScoringWeights::default();
        let input = vec![rec("c1", 0.5), rec("c2", 0.4)];
        let out = CollaborativeBooster::apply(input.clone(), Err(Ignored::failed("down")), &w);
        assert_eq!(out, input);
    }

    #[test]
    fn test_peer_query_defaults_for_learner_without_signal() {
        let config = PlanConfig::default();
        let store = MemStore::new();
        let booster = CollaborativeBooster::new(&store, &config);
        let query = booster.peer_query(&UserProfile {
            user_id: "newbie".to_string(),
            ..Default::default()
        });
        assert_eq!(query.exclude_user, "newbie");
        assert_eq!(query.languages, vec!["Python", "JavaScript"]);
        assert_eq!(query.categories, Category::ALL.to_vec());
    }

    #[test]
    fn test_peer_query_keeps_learner_languages() {
        let config = PlanConfig::default();
        let store = MemStore::new();
        let booster = CollaborativeBooster::new(&store, &config);
        let query = booster.peer_query(&UserProfile {
            combined_languages: vec!["Rust".to_string()],
            focus_categories: vec![Category::Security],
            ..Default::default()
        });
        assert_eq!(query.languages, vec!["Rust"]);
        assert_eq!(query.categories, vec![Category::Security]);
    }

    #[tokio::test]
    async fn test_learner_without_languages_only_sees_default_language_peers() {
        let store = MemStore::new();
        store.add_challenge(challenge("rs", Category::Syntax, Difficulty::Easy, "Rust"));
        store.add_challenge(challenge("py", Category::Syntax, Difficulty::Easy, "Python"));
        store.add_submission(submission("p1", "peer", "rs", Outcome::Accepted, 1));
        store.add_submission(submission("p2", "peer", "py", Outcome::Accepted, 1));
        let config = PlanConfig::default();
        let booster = CollaborativeBooster::new(&store, &config);

        let popular = booster
            .popular(&UserProfile {
                user_id: "newbie".to_string(),
                focus_categories: vec![Category::Syntax, Category::Logic],
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<_> = popular.iter().map(|p| p.challenge_id.as_str()).collect();
        assert_eq!(ids, vec!["py"]);
    }

    struct SlowStore;

    #[async_trait]
    impl SubmissionStore for SlowStore {
        async fn find_recent(
            &self,
            _query: &crate::store::SubmissionQuery,
        ) -> anyhow::Result<Vec<SubmissionRecord>> {
            Ok(Vec::new())
        }

        async fn accepted_by_others(&self, _query: &PeerQuery) -> anyhow::Result<Vec<PeerAcceptance>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_popular_times_out() {
        let mut config = PlanConfig::default();
        config.booster_timeout = Duration::from_millis(100);
        let booster = CollaborativeBooster::new(&SlowStore, &config);
        let result = booster.popular(&UserProfile::default()).await;
        assert_eq!(result, Err(Ignored::TimedOut(Duration::from_millis(100))));
    }
}
