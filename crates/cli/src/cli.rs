use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// How command results are printed.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

/// Command-line interface for the `learnpath` application.
#[derive(Debug, Parser)]
#[command(
    name = "learnpath",
    version,
    about = "Personalized challenge plans and adaptive learning paths"
)]
pub struct Cli {
    /// Config file (overrides `LEARNPATH_CONFIG` and `~/.learnpath/config.toml`).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

/// Dataset and learner selection shared by the engine-backed commands.
#[derive(Debug, Clone, Args)]
pub struct LearnerArgs {
    /// JSON dataset with challenges, submissions, drills and resources.
    #[arg(long, value_name = "FILE")]
    pub dataset: PathBuf,
    /// Learner id.
    #[arg(long)]
    pub user: String,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Available `learnpath` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Builds a personalized plan: profile, recommendations, path and graph.
    Plan {
        #[command(flatten)]
        learner: LearnerArgs,
        /// Skip writing the recommendation audit entry.
        #[arg(long, default_value_t = false)]
        no_audit: bool,
        /// Maximum challenges to recommend (overrides config).
        #[arg(long)]
        challenge_limit: Option<usize>,
        /// Maximum drill items to recommend (overrides config).
        #[arg(long)]
        training_limit: Option<usize>,
    },
    /// Shows the behavioral profile built from a learner's history.
    Profile {
        #[command(flatten)]
        learner: LearnerArgs,
    },
    /// Suggests content related to a learner's recent work.
    Related {
        #[command(flatten)]
        learner: LearnerArgs,
        /// Challenge the learner is currently on.
        #[arg(long)]
        challenge: Option<String>,
        /// Skip writing the recommendation audit entry.
        #[arg(long, default_value_t = false)]
        no_audit: bool,
    },
    /// Summarizes the recommendation audit log.
    Audit {
        /// Number of recent entries to list.
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Only entries for this learner.
        #[arg(long)]
        user: Option<String>,
        /// Audit database (overrides config and `LEARNPATH_AUDIT_DB`).
        #[arg(long, value_name = "FILE")]
        db: Option<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Prints the effective scoring weights as TOML.
    Weights,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_plan_flags_parse() {
        let cli = Cli::parse_from([
            "learnpath", "plan", "--dataset", "d.json", "--user", "u1", "--format", "json",
            "--no-audit",
        ]);
        match cli.command {
            Commands::Plan {
                learner, no_audit, ..
            } => {
                assert_eq!(learner.user, "u1");
                assert!(learner.format.is_json());
                assert!(no_audit);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from(["learnpath", "weights", "--config", "/tmp/c.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_related_requires_dataset() {
        assert!(Cli::try_parse_from(["learnpath", "related", "--user", "u1"]).is_err());
    }
}
