//! Plain-text renderings of engine output.

use learnpath_engine::{
    ChallengeMeta, LearningResource, PersonalizedPlan, Recommendation, RecommendationLogEntry,
    RelatedRecommendations, StepKind, TrainingItem, UserProfile,
};
use learnpath_state::AuditSummary;
use std::fmt::Write;
use std::path::Path;

fn list_or_none<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    items.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ")
}

fn write_challenges(out: &mut String, recs: &[Recommendation<ChallengeMeta>]) {
    let _ = writeln!(out, "Challenges:");
    if recs.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (i, rec) in recs.iter().enumerate() {
        let marker = if rec.fallback_match { " *" } else { "" };
        let _ = writeln!(
            out,
            "  {}. [{:.2}] {} ({} / {} / {}){}",
            i + 1,
            rec.score,
            rec.data.title,
            rec.data.category,
            rec.data.difficulty,
            rec.data.language,
            marker
        );
        for reason in &rec.reasons {
            let _ = writeln!(out, "       - {reason}");
        }
    }
}

fn write_training(out: &mut String, recs: &[Recommendation<TrainingItem>]) {
    let _ = writeln!(out, "Training:");
    if recs.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (i, rec) in recs.iter().enumerate() {
        let _ = writeln!(out, "  {}. [{:.2}] {}", i + 1, rec.score, rec.data.question);
        for reason in &rec.reasons {
            let _ = writeln!(out, "       - {reason}");
        }
    }
}

fn write_resources(out: &mut String, resources: &[LearningResource]) {
    let _ = writeln!(out, "Resources:");
    if resources.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for resource in resources {
        let _ = writeln!(
            out,
            "  - {} <{}> [{}]",
            resource.title,
            resource.url,
            resource.kind.as_str()
        );
    }
}

pub(crate) fn profile(profile: &UserProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Learner {} ({})",
        profile.user_id, profile.experience_level
    );
    let _ = writeln!(
        out,
        "  Submissions: {} ({} accepted), {:.2} accepted/day",
        profile.total_submissions, profile.total_accepted, profile.learning_velocity
    );
    let _ = writeln!(out, "  Languages: {}", list_or_none(&profile.combined_languages));
    let focus: Vec<&str> = profile.focus_categories.iter().map(|c| c.as_str()).collect();
    let _ = writeln!(out, "  Focus categories: {}", list_or_none(&focus));
    let _ = writeln!(out, "  Focus tags: {}", list_or_none(&profile.focus_tags));
    if !profile.category_stats.is_empty() {
        let _ = writeln!(out, "  Categories:");
        for (category, stats) in &profile.category_stats {
            let _ = writeln!(
                out,
                "    {:<12} {}/{}  {}",
                category.as_str(),
                stats.successes,
                stats.attempts,
                stats.proficiency
            );
        }
    }
    if !profile.error_type_stats.is_empty() {
        let _ = writeln!(out, "  Errors:");
        for (error_type, count) in &profile.error_type_stats {
            let _ = writeln!(out, "    {error_type:<16} {count}");
        }
    }
    out
}

pub(crate) fn plan(plan: &PersonalizedPlan) -> String {
    let mut out = profile(&plan.profile);
    let _ = writeln!(out);
    write_challenges(&mut out, &plan.recommendations.challenges);
    write_training(&mut out, &plan.recommendations.training_data);
    write_resources(&mut out, &plan.recommendations.learning_resources);

    let _ = writeln!(out);
    let _ = writeln!(out, "Learning path:");
    if plan.learning_path.is_empty() {
        let _ = writeln!(out, "  (empty)");
    }
    for step in &plan.learning_path {
        let kind = match step.kind {
            StepKind::Training => "training",
            StepKind::Challenge => "challenge",
        };
        let _ = writeln!(
            out,
            "  {:>2}. [{}] {} ({})",
            step.step, kind, step.title, step.category
        );
    }

    let highlighted = plan
        .graph
        .nodes
        .iter()
        .filter(|n| n.is_recommended || n.is_focus_category || n.is_focus_tag)
        .count();
    let _ = writeln!(
        out,
        "\nGraph: {} nodes, {} edges, {} highlighted",
        plan.graph.nodes.len(),
        plan.graph.edges.len(),
        highlighted
    );
    out
}

pub(crate) fn related(related: &RelatedRecommendations) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Experience: {}", related.experience_level);
    let _ = writeln!(
        out,
        "Errors in recent work: {}",
        related.error_summary.total_errors
    );
    for (error_type, count) in &related.error_summary.error_types {
        let _ = writeln!(out, "  {error_type:<16} {count}");
    }
    let _ = writeln!(out);
    write_challenges(&mut out, &related.challenges);
    write_training(&mut out, &related.training_data);
    write_resources(&mut out, &related.learning_resources);
    if !related.knowledge_gaps.is_empty() {
        let _ = writeln!(out, "Knowledge gaps:");
        for gap in &related.knowledge_gaps {
            let _ = writeln!(out, "  - {gap}");
        }
    }
    out
}

pub(crate) fn audit(path: &Path, summary: &AuditSummary, recent: &[RecommendationLogEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Audit log: {}", path.display());
    let _ = writeln!(
        out,
        "  {} entries from {} learners",
        summary.entries, summary.users
    );
    if let Some(last) = summary.last_entry_at {
        let _ = writeln!(out, "  Last entry: {}", last.to_rfc3339());
    }
    if !summary.top_challenges.is_empty() {
        let _ = writeln!(out, "  Most suggested:");
        for (id, count) in &summary.top_challenges {
            let _ = writeln!(out, "    {id:<16} {count}");
        }
    }
    if !recent.is_empty() {
        let _ = writeln!(out, "Recent:");
        for entry in recent {
            let context = entry
                .challenge_id
                .as_deref()
                .map(|c| format!(" from {c}"))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  {} {}{}: {} challenges, {} drills, {} resources",
                entry.created_at.format("%Y-%m-%d %H:%M"),
                entry.user_id,
                context,
                entry.suggested_challenge_ids.len(),
                entry.suggested_training_ids.len(),
                entry.suggested_resource_urls.len()
            );
        }
    }
    out
}
