//! Command-line interface for the `learnpath` application.
//!
//! This crate serves as the main entry point for the executable, delegating
//! its functionality to the `learnpath_cli` library.

fn main() -> anyhow::Result<()> {
    learnpath_cli::run()
}
