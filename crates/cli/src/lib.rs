//! Library half of the `learnpath` binary.
//!
//! Loads a JSON dataset into the in-memory stores, wires the configured
//! audit sink, and prints engine output as text or JSON. Logs go to stderr
//! so stdout stays machine readable.

pub mod cli;
mod commands;
mod render;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

/// The main entry point for the `learnpath` application.
pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    dispatch(Cli::parse())
}

/// Execute an already-parsed command line.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config_file = cli.config.as_deref();
    match cli.command {
        Commands::Plan {
            learner,
            no_audit,
            challenge_limit,
            training_limit,
        } => commands::handle_plan_command(
            config_file,
            &learner,
            no_audit,
            challenge_limit,
            training_limit,
        ),
        Commands::Profile { learner } => commands::handle_profile_command(config_file, &learner),
        Commands::Related {
            learner,
            challenge,
            no_audit,
        } => commands::handle_related_command(config_file, &learner, challenge.as_deref(), no_audit),
        Commands::Audit {
            limit,
            user,
            db,
            format,
        } => commands::handle_audit_command(config_file, limit, user.as_deref(), db, format),
        Commands::Weights => commands::handle_weights_command(config_file),
    }
}
