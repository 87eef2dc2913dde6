use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "xtasks")]
#[command(about = "Run project tasks using rust instead of scripts")]
pub struct App {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check formatting, run clippy and the test suite
    Lint(LintArgs),
}

#[derive(Args, Debug)]
pub struct LintArgs {
    /// Rewrite files with rustfmt instead of only checking them
    #[arg(long)]
    pub fix: bool,

    /// Skip the test suite
    #[arg(long)]
    pub no_test: bool,
}
