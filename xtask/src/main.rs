use std::process::Command;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for jyrobot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Run fmt, clippy, tests and doc in order
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates, warnings denied
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Run the stock fleet for a few updates through the CLI
    Demo,
}

/// A cargo invocation with a label for progress output.
struct Step {
    label: &'static str,
    args: &'static [&'static str],
}

const FMT: Step = Step {
    label: "cargo fmt --check",
    args: &["fmt", "--all", "--", "--check"],
};
const CLIPPY: Step = Step {
    label: "cargo clippy",
    args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
};
const TEST: Step = Step {
    label: "cargo test",
    args: &["test", "--workspace"],
};
const DOC: Step = Step {
    label: "cargo doc",
    args: &["doc", "--workspace", "--no-deps"],
};
const BUILD: Step = Step {
    label: "cargo build",
    args: &["build", "--workspace"],
};
const DEMO: Step = Step {
    label: "jyrobot-cli run",
    args: &[
        "run", "-p", "jyrobot-cli", "--", "run", "--ticks", "20", "--command", "1,1,0,0",
    ],
};

fn steps(command: Commands) -> &'static [Step] {
    match command {
        Commands::Check => &[FMT, CLIPPY, TEST, DOC],
        Commands::Fmt => &[FMT],
        Commands::Clippy => &[CLIPPY],
        Commands::Test => &[TEST],
        Commands::Doc => &[DOC],
        Commands::Build => &[BUILD],
        Commands::Demo => &[DEMO],
    }
}

fn run(step: &Step) -> Result<()> {
    println!("==> Running {}", step.label);
    let status = Command::new("cargo").args(step.args).status()?;
    if !status.success() {
        bail!("{} failed", step.label);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    for step in steps(cli.command) {
        run(step)?;
    }
    Ok(())
}
