//! Crate entry point for **lockstamp**.
//!
//! This library provides the implementation for the `lockstamp` CLI, which
//! stamps a release tag into one package's `version` field of a lockfile.
//! Each submodule encapsulates one responsibility (config parsing, the patch
//! itself, git operations, hook installation).
//! The `pub use` re-exports make the patcher and the commands accessible from the crate root.

mod config;
mod git;
mod hook;
mod patch;
mod paths;
mod progress;

/// Re-export commonly used types and commands so they can be accessed from `lockstamp::*`.
pub use config::{Config, Overrides, Settings, load_config, resolve_settings};
pub use git::stage_path;
pub use hook::{
    InstallOutcome, UninstallOutcome, cmd_install, cmd_uninstall, install_hook, uninstall_hook,
};
pub use patch::{
    ALTERNATE_OUTPUT, Change, DEFAULT_LOCKFILE, DEFAULT_PACKAGE, MissingPolicy, OutputTarget,
    PatchError, PatchOutcome, PatchRequest, Rewrite, VersionPatcher, cmd_patch, cmd_show,
    current_version, pre_commit, rewrite_version,
};
pub use paths::CONFIG_FILE;
