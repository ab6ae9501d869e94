//! # lockstamp
//!
//! **lockstamp** stamps a release tag into a lockfile from a pre-commit hook.
//!
//! Features:
//! - `lockstamp patch --tag <TAG>` rewrites the package's `version` field
//! - `lockstamp show` prints the version currently in the lockfile
//! - `lockstamp install` / `uninstall` manage the git `pre-commit` hook
//!
//! Defaults come from `./lockstamp.toml` when present.
//!
//! This CLI is built with [clap](https://docs.rs/clap).

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use lockstamp::{Overrides, cmd_install, cmd_patch, cmd_show, cmd_uninstall};
use std::path::PathBuf;

/// Command-line interface definition.
///
/// Parsed using `clap` derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "lockstamp",
    version,
    about = "lockstamp - stamp a release tag into a lockfile",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

/// Options selecting the lockfile and package.
#[derive(Args, Debug)]
struct Target {
    /// Config file (default: ./lockstamp.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Lockfile to read (default: ./Cargo.lock)
    #[arg(long)]
    lockfile: Option<PathBuf>,
    /// Package whose version is stamped (default: ram-machine)
    #[arg(long)]
    package: Option<String>,
}

/// Available subcommands.
///
/// Each variant corresponds to a subcommand of `lockstamp`.
#[derive(Subcommand, Debug)]
enum Cmd {
    /// Stamp a tag into the package's version field
    Patch {
        /// Version written into the lockfile
        #[arg(long, env = "LOCKSTAMP_TAG")]
        tag: String,
        #[command(flatten)]
        target: Target,
        /// Write the result here instead of overwriting the lockfile
        #[arg(long, conflicts_with = "alternate")]
        output: Option<PathBuf>,
        /// Write the result to ./modified_dependencies.toml
        #[arg(long)]
        alternate: bool,
        /// Fail if the package is not in the lockfile
        #[arg(long)]
        strict: bool,
        /// `git add` the written file
        #[arg(long)]
        stage: bool,
    },
    /// Print the package's current version
    Show {
        #[command(flatten)]
        target: Target,
    },
    /// Install the git pre-commit hook
    Install {
        /// Rewrite the hook block if it is already installed
        #[arg(long)]
        force: bool,
    },
    /// Remove the git pre-commit hook
    Uninstall,
}

impl Target {
    fn into_overrides(self) -> Overrides {
        Overrides {
            config: self.config,
            lockfile: self.lockfile,
            package: self.package,
            ..Overrides::default()
        }
    }
}

/// CLI entry point.
///
/// Parses arguments with `clap` and executes the selected subcommand.
fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Patch {
            tag,
            target,
            output,
            alternate,
            strict,
            stage,
        } => {
            let overrides = Overrides {
                output,
                alternate,
                strict,
                stage,
                ..target.into_overrides()
            };
            cmd_patch(&overrides, &tag)
        }
        Cmd::Show { target } => cmd_show(&target.into_overrides()),
        Cmd::Install { force } => cmd_install(force),
        Cmd::Uninstall => cmd_uninstall(),
    }
}
