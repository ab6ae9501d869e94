//! `pre-commit` hook installation.
//!
//! The hook calls `lockstamp patch --stage` when `LOCKSTAMP_TAG` is set, so a
//! release commit picks up the stamped lockfile. Installation is additive: an
//! existing user hook keeps its content and gets our block appended.

use anyhow::Result;
use std::env;
use std::fs;
use std::path::Path;

use crate::git::hooks_dir;
use crate::progress::{note, warn};

const HOOK_FILE: &str = "pre-commit";
const BEGIN: &str = "# >>> lockstamp pre-commit >>>";
const END: &str = "# <<< lockstamp pre-commit <<<";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Created,
    Appended,
    Replaced,
    AlreadyInstalled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    Deleted,
    Stripped,
    NotInstalled,
}

/// Shell block placed in the hook, delimited by the marker lines.
fn hook_block() -> String {
    format!(
        "{BEGIN}\nif [ -n \"${{LOCKSTAMP_TAG:-}}\" ]; then\n  lockstamp patch --stage || exit 1\nfi\n{END}\n"
    )
}

/// Remove our block (marker lines included) from a hook script.
fn strip_block(content: &str) -> String {
    let mut out = Vec::new();
    let mut inside = false;
    for line in content.lines() {
        if line.trim() == BEGIN {
            inside = true;
            continue;
        }
        if inside {
            if line.trim() == END {
                inside = false;
            }
            continue;
        }
        out.push(line);
    }
    out.join("\n")
}

#[cfg(unix)]
fn make_executable(p: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perm = fs::metadata(p)?.permissions();
    perm.set_mode(0o755);
    fs::set_permissions(p, perm)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_p: &Path) -> Result<()> {
    Ok(())
}

/// Install our block into `<hooks>/pre-commit`.
///
/// - No hook yet: a new `#!/bin/sh` script is created.
/// - A hook without our block: the block is appended.
/// - A hook with our block: untouched, unless `force`, which rewrites the block.
pub fn install_hook(hooks: &Path, force: bool) -> Result<InstallOutcome> {
    fs::create_dir_all(hooks)?;
    let hook = hooks.join(HOOK_FILE);

    let outcome = if hook.exists() {
        let content = fs::read_to_string(&hook)?;
        if content.contains(BEGIN) {
            if !force {
                return Ok(InstallOutcome::AlreadyInstalled);
            }
            let rest = strip_block(&content);
            fs::write(&hook, format!("{}\n\n{}", rest.trim_end(), hook_block()))?;
            InstallOutcome::Replaced
        } else {
            fs::write(&hook, format!("{}\n\n{}", content.trim_end(), hook_block()))?;
            InstallOutcome::Appended
        }
    } else {
        fs::write(&hook, format!("#!/bin/sh\n\n{}", hook_block()))?;
        InstallOutcome::Created
    };

    make_executable(&hook)?;
    Ok(outcome)
}

/// Remove our block from `<hooks>/pre-commit`.
///
/// If nothing but the shebang and blank lines remain, the file is deleted.
pub fn uninstall_hook(hooks: &Path) -> Result<UninstallOutcome> {
    let hook = hooks.join(HOOK_FILE);
    if !hook.exists() {
        return Ok(UninstallOutcome::NotInstalled);
    }

    let content = fs::read_to_string(&hook)?;
    if !content.contains(BEGIN) {
        return Ok(UninstallOutcome::NotInstalled);
    }

    let rest = strip_block(&content);
    let meaningful = rest
        .lines()
        .any(|l| !l.trim().is_empty() && !l.starts_with("#!"));

    if meaningful {
        fs::write(&hook, format!("{}\n", rest.trim_end()))?;
        Ok(UninstallOutcome::Stripped)
    } else {
        fs::remove_file(&hook)?;
        Ok(UninstallOutcome::Deleted)
    }
}

/// CLI command: install the hook into the repository enclosing the working directory.
pub fn cmd_install(force: bool) -> Result<()> {
    let hooks = hooks_dir(&env::current_dir()?)?;
    let path = hooks.join(HOOK_FILE);
    match install_hook(&hooks, force)? {
        InstallOutcome::Created => println!("installed {}", path.display()),
        InstallOutcome::Appended => println!("appended lockstamp to {}", path.display()),
        InstallOutcome::Replaced => println!("reinstalled lockstamp in {}", path.display()),
        InstallOutcome::AlreadyInstalled => {
            warn(&format!(
                "already installed in {} (use --force to rewrite)",
                path.display()
            ));
        }
    }
    Ok(())
}

/// CLI command: remove the hook block from the enclosing repository.
pub fn cmd_uninstall() -> Result<()> {
    let hooks = hooks_dir(&env::current_dir()?)?;
    let path = hooks.join(HOOK_FILE);
    match uninstall_hook(&hooks)? {
        UninstallOutcome::Deleted => println!("removed {}", path.display()),
        UninstallOutcome::Stripped => println!("removed lockstamp from {}", path.display()),
        UninstallOutcome::NotInstalled => note(&format!("not installed in {}", path.display())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn install_creates_new_hook() {
        let td = tempdir().unwrap();
        let hooks = td.path().join("hooks");

        assert_eq!(install_hook(&hooks, false).unwrap(), InstallOutcome::Created);

        let content = fs::read_to_string(hooks.join(HOOK_FILE)).unwrap();
        assert!(content.starts_with("#!/bin/sh\n"));
        assert!(content.contains("lockstamp patch --stage"));
        assert!(content.contains("${LOCKSTAMP_TAG:-}"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(hooks.join(HOOK_FILE))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn install_appends_to_existing_hook() {
        let td = tempdir().unwrap();
        let hooks = td.path();
        fs::write(hooks.join(HOOK_FILE), "#!/bin/sh\ncargo fmt --check\n").unwrap();

        assert_eq!(install_hook(hooks, false).unwrap(), InstallOutcome::Appended);

        let content = fs::read_to_string(hooks.join(HOOK_FILE)).unwrap();
        assert!(content.starts_with("#!/bin/sh\ncargo fmt --check\n\n"));
        assert!(content.contains(BEGIN));
    }

    #[test]
    fn install_is_idempotent() {
        let td = tempdir().unwrap();
        let hooks = td.path();
        install_hook(hooks, false).unwrap();
        let first = fs::read_to_string(hooks.join(HOOK_FILE)).unwrap();

        assert_eq!(
            install_hook(hooks, false).unwrap(),
            InstallOutcome::AlreadyInstalled
        );
        assert_eq!(install_hook(hooks, true).unwrap(), InstallOutcome::Replaced);

        let second = fs::read_to_string(hooks.join(HOOK_FILE)).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.matches(BEGIN).count(), 1);
    }

    #[test]
    fn uninstall_restores_user_hook() {
        let td = tempdir().unwrap();
        let hooks = td.path();
        fs::write(hooks.join(HOOK_FILE), "#!/bin/sh\ncargo fmt --check\n").unwrap();
        install_hook(hooks, false).unwrap();

        assert_eq!(uninstall_hook(hooks).unwrap(), UninstallOutcome::Stripped);
        assert_eq!(
            fs::read_to_string(hooks.join(HOOK_FILE)).unwrap(),
            "#!/bin/sh\ncargo fmt --check\n"
        );
    }

    #[test]
    fn uninstall_deletes_hook_we_created() {
        let td = tempdir().unwrap();
        let hooks = td.path();
        install_hook(hooks, false).unwrap();

        assert_eq!(uninstall_hook(hooks).unwrap(), UninstallOutcome::Deleted);
        assert!(!hooks.join(HOOK_FILE).exists());
    }

    #[test]
    fn uninstall_without_block_is_noop() {
        let td = tempdir().unwrap();
        let hooks = td.path();
        assert_eq!(uninstall_hook(hooks).unwrap(), UninstallOutcome::NotInstalled);

        fs::write(hooks.join(HOOK_FILE), "#!/bin/sh\necho hi\n").unwrap();
        assert_eq!(uninstall_hook(hooks).unwrap(), UninstallOutcome::NotInstalled);
        assert_eq!(
            fs::read_to_string(hooks.join(HOOK_FILE)).unwrap(),
            "#!/bin/sh\necho hi\n"
        );
    }
}
