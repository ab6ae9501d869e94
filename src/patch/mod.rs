mod patcher;
mod rewrite;

use anyhow::{Context, Result, bail};
use std::fs;

use crate::config::{Overrides, resolve_settings};
use crate::git::stage_path;
use crate::progress::{err_style, ok_style, spinner, warn};

pub use patcher::{
    ALTERNATE_OUTPUT, Change, DEFAULT_LOCKFILE, DEFAULT_PACKAGE, MissingPolicy, OutputTarget,
    PatchError, PatchOutcome, PatchRequest, VersionPatcher, pre_commit,
};
pub use rewrite::{Rewrite, current_version, rewrite_version};

/// CLI command: stamp `tag` into the configured lockfile.
///
/// High-level flow:
/// 1. Resolve settings from `lockstamp.toml` and the command-line overrides.
/// 2. Run [`VersionPatcher::patch`] with a spinner on screen.
/// 3. If staging is enabled, `git add` the written file.
///
/// A package that is not found is reported as a warning (or an error in
/// strict mode); the written file is then an unchanged copy of the lockfile.
///
/// # Errors
/// Returns an error if the lockfile cannot be read, the output cannot be
/// written, the package is missing in strict mode, or staging fails.
pub fn cmd_patch(overrides: &Overrides, tag: &str) -> Result<()> {
    let settings = resolve_settings(overrides)?;
    let patcher = VersionPatcher::new(&settings.lockfile, &settings.package)
        .output(settings.output.clone())
        .missing(settings.missing);

    let pb = spinner(format!(
        "stamping {} {} into {}",
        settings.package,
        tag,
        settings.lockfile.display()
    ));

    let res: Result<PatchOutcome> = (|| {
        let outcome = patcher.patch(&PatchRequest::new(tag))?;
        if settings.stage {
            stage_path(&outcome.written)?;
        }
        Ok(outcome)
    })();

    let outcome = match res {
        Ok(o) => o,
        Err(e) => {
            pb.set_style(err_style());
            pb.finish_with_message(format!("stamping {} {} failed", settings.package, tag));
            return Err(e);
        }
    };

    let written = outcome.written.display();
    match &outcome.change {
        Change::Updated { previous } => {
            pb.set_style(ok_style());
            pb.finish_with_message(format!(
                "updated {} {} -> {} in {}",
                settings.package, previous, tag, written
            ));
        }
        Change::Unchanged => {
            pb.set_style(ok_style());
            pb.finish_with_message(format!(
                "{} already at {} in {}",
                settings.package, tag, written
            ));
        }
        Change::NotFound => {
            pb.finish_and_clear();
            warn(&format!(
                "package `{}` not found in {}; wrote it unchanged to {}",
                settings.package,
                settings.lockfile.display(),
                written
            ));
        }
    }
    Ok(())
}

/// CLI command: print the package's current version in the lockfile.
///
/// Example output:
/// ```text
/// ram-machine 0.1.0
/// ```
///
/// # Errors
/// Returns an error if the lockfile cannot be read or the package is not in it.
pub fn cmd_show(overrides: &Overrides) -> Result<()> {
    let settings = resolve_settings(overrides)?;
    let text = fs::read_to_string(&settings.lockfile)
        .with_context(|| format!("failed to read lockfile: {}", settings.lockfile.display()))?;
    match current_version(&text, &settings.package)? {
        Some(v) => println!("{} {}", settings.package, v),
        None => bail!(
            "package `{}` not found in {}",
            settings.package,
            settings.lockfile.display()
        ),
    }
    Ok(())
}
