//! Workspace automation tasks.
//!
//! Run with: `cargo xtask <command>`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use std::process::Command;

const CRATE_PREFIX: &str = "covenant-";
const REQUIRED_ATTRIBUTES: &[&str] = &["#![deny(missing_docs)]", "#![deny(rust_2018_idioms)]"];

#[derive(Parser)]
#[command(name = "xtask", about = "Covenant workspace automation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks locally
    Ci,
    /// Validate workspace conventions
    Lint,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci => run_ci(),
        Commands::Lint => run_lint(),
    }
}

fn run_ci() -> Result<()> {
    println!("Running CI checks...\n");

    run_lint()?;
    run_cmd("cargo", &["fmt", "--check"])?;
    run_cmd("cargo", &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])?;
    run_cmd("cargo", &["test", "--workspace"])?;
    run_cmd("cargo", &["doc", "--workspace", "--no-deps"])?;

    println!("\nAll CI checks passed!");
    Ok(())
}

fn run_lint() -> Result<()> {
    println!("Validating workspace conventions...\n");

    for entry in std::fs::read_dir("crates").context("reading crates/")? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(CRATE_PREFIX) {
            anyhow::bail!("Crate '{name}' does not follow {CRATE_PREFIX}* naming");
        }
        check_crate_attributes(&name, &entry.path().join("src/lib.rs"))?;
    }

    for proto in ["common", "contract", "cspinfo"] {
        let path = format!("proto/covenant/v1/{proto}.proto");
        if !Path::new(&path).exists() {
            anyhow::bail!("Missing protocol definition {path}");
        }
    }

    println!("All conventions validated!");
    Ok(())
}

fn check_crate_attributes(name: &str, lib: &Path) -> Result<()> {
    let source = std::fs::read_to_string(lib)
        .with_context(|| format!("reading {}", lib.display()))?;
    for attribute in REQUIRED_ATTRIBUTES {
        if !source.contains(attribute) {
            anyhow::bail!("Crate '{name}' is missing {attribute}");
        }
    }
    Ok(())
}

fn run_cmd(cmd: &str, args: &[&str]) -> Result<()> {
    println!("$ {} {}", cmd, args.join(" "));
    let status = Command::new(cmd)
        .args(args)
        .status()
        .with_context(|| format!("Failed to run: {} {}", cmd, args.join(" ")))?;

    if !status.success() {
        anyhow::bail!("Command failed: {} {}", cmd, args.join(" "));
    }
    Ok(())
}
