use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::rewrite::rewrite_version;

/// Lockfile read by the stock hook, relative to the working directory.
pub const DEFAULT_LOCKFILE: &str = "./Cargo.lock";
/// Package whose version the stock hook stamps.
pub const DEFAULT_PACKAGE: &str = "ram-machine";
/// Output file of the alternate hook variant.
pub const ALTERNATE_OUTPUT: &str = "modified_dependencies.toml";

/// The hook's property bag: the tag to stamp into the lockfile.
///
/// The tag is not validated; any string is written verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRequest {
    pub tag: String,
}

impl PatchRequest {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

/// Where the patched text is written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputTarget {
    /// Overwrite the lockfile that was read.
    #[default]
    InPlace,
    /// Write to a separate file, leaving the lockfile untouched.
    File(PathBuf),
}

/// What to do when the package block is not in the lockfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Write the text unchanged and report [`Change::NotFound`].
    #[default]
    Passthrough,
    /// Fail with [`PatchError::PackageNotFound`] without writing anything.
    Fail,
}

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("package `{package}` not found in {}", path.display())]
    PackageNotFound { package: String, path: PathBuf },
}

/// What happened to the version field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Updated { previous: String },
    Unchanged,
    NotFound,
}

/// Result of one [`VersionPatcher::patch`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub written: PathBuf,
    pub change: Change,
}

/// Stamps a tag into the version field of one package in a lockfile.
///
/// The lockfile is treated as opaque text: the package block is found with a
/// regular expression (see [`super::rewrite::version_pattern`]) and only the
/// quoted version value is replaced.
///
/// There is no locking and no atomic rename; two patchers writing the same
/// output race and the last writer wins.
#[derive(Debug, Clone)]
pub struct VersionPatcher {
    lockfile: PathBuf,
    package: String,
    output: OutputTarget,
    missing: MissingPolicy,
}

impl VersionPatcher {
    /// Patcher for `package` in `lockfile`, writing in place and passing
    /// unmatched text through.
    pub fn new(lockfile: impl Into<PathBuf>, package: impl Into<String>) -> Self {
        Self {
            lockfile: lockfile.into(),
            package: package.into(),
            output: OutputTarget::InPlace,
            missing: MissingPolicy::Passthrough,
        }
    }

    /// The stock hook that overwrites `./Cargo.lock`.
    pub fn in_place() -> Self {
        Self::new(DEFAULT_LOCKFILE, DEFAULT_PACKAGE)
    }

    /// The stock hook that writes `modified_dependencies.toml` in the working
    /// directory, whatever the lockfile path.
    pub fn alternate() -> Self {
        Self::in_place().output(OutputTarget::File(PathBuf::from(ALTERNATE_OUTPUT)))
    }

    pub fn output(mut self, output: OutputTarget) -> Self {
        self.output = output;
        self
    }

    pub fn missing(mut self, missing: MissingPolicy) -> Self {
        self.missing = missing;
        self
    }

    pub fn lockfile(&self) -> &Path {
        &self.lockfile
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Path the patched text goes to.
    pub fn output_path(&self) -> &Path {
        match &self.output {
            OutputTarget::InPlace => &self.lockfile,
            OutputTarget::File(p) => p,
        }
    }

    /// Read the lockfile, stamp `req.tag` into the package's version field and
    /// write the result to the output target.
    ///
    /// The write is unconditional: it happens even when the text did not
    /// change, and it overwrites whatever is at the output path.
    ///
    /// # Errors
    /// - The lockfile cannot be read (nothing is written).
    /// - The package is missing under [`MissingPolicy::Fail`] (nothing is written).
    /// - The output path cannot be written.
    pub fn patch(&self, req: &PatchRequest) -> Result<PatchOutcome> {
        let text = fs::read_to_string(&self.lockfile)
            .with_context(|| format!("failed to read lockfile: {}", self.lockfile.display()))?;

        let rewrite = rewrite_version(&text, &self.package, &req.tag)?;
        let change = match rewrite.previous {
            Some(prev) if prev == req.tag => Change::Unchanged,
            Some(previous) => Change::Updated { previous },
            None if self.missing == MissingPolicy::Fail => {
                return Err(PatchError::PackageNotFound {
                    package: self.package.clone(),
                    path: self.lockfile.clone(),
                }
                .into());
            }
            None => Change::NotFound,
        };

        let target = self.output_path();
        fs::write(target, rewrite.text)
            .with_context(|| format!("failed to write {}", target.display()))?;

        Ok(PatchOutcome {
            written: target.to_path_buf(),
            change,
        })
    }
}

/// Hook entry point: run the stock patcher with `props`.
///
/// Uses [`VersionPatcher::alternate`], so the result lands in
/// `modified_dependencies.toml` in the working directory.
pub fn pre_commit(props: &PatchRequest) -> Result<()> {
    VersionPatcher::alternate().patch(props).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tempfile::tempdir;

    const LOCK: &str = "[[package]]\nname = \"ram-machine\"\nversion = \"0.1.0\"\n\n[[package]]\nname = \"regex\"\nversion = \"1.9.0\"\n";

    fn write_lock(dir: &Path, text: &str) -> PathBuf {
        let p = dir.join("Cargo.lock");
        fs::write(&p, text).unwrap();
        p
    }

    #[test]
    fn in_place_overwrites_the_lockfile() {
        let td = tempdir().unwrap();
        let lock = write_lock(td.path(), LOCK);

        let out = VersionPatcher::new(&lock, "ram-machine")
            .patch(&PatchRequest::new("0.2.0"))
            .unwrap();

        assert_eq!(out.written, lock);
        assert_eq!(
            out.change,
            Change::Updated {
                previous: "0.1.0".into()
            }
        );
        assert_eq!(
            fs::read_to_string(&lock).unwrap(),
            LOCK.replace("\"0.1.0\"", "\"0.2.0\"")
        );
    }

    #[test]
    fn file_target_leaves_the_lockfile_untouched() {
        let td = tempdir().unwrap();
        let lock = write_lock(td.path(), LOCK);
        let dest = td.path().join("out").join(ALTERNATE_OUTPUT);
        fs::create_dir_all(dest.parent().unwrap()).unwrap();

        let out = VersionPatcher::new(&lock, "ram-machine")
            .output(OutputTarget::File(dest.clone()))
            .patch(&PatchRequest::new("0.3.0"))
            .unwrap();

        assert_eq!(out.written, dest);
        assert_eq!(fs::read_to_string(&lock).unwrap(), LOCK);
        assert!(fs::read_to_string(&dest)
            .unwrap()
            .contains("name = \"ram-machine\"\nversion = \"0.3.0\""));
    }

    #[test]
    fn same_tag_twice_is_idempotent() {
        let td = tempdir().unwrap();
        let lock = write_lock(td.path(), LOCK);
        let patcher = VersionPatcher::new(&lock, "ram-machine");
        let req = PatchRequest::new("0.2.0");

        patcher.patch(&req).unwrap();
        let once = fs::read(&lock).unwrap();
        let second = patcher.patch(&req).unwrap();
        let twice = fs::read(&lock).unwrap();

        assert_eq!(once, twice);
        assert_eq!(second.change, Change::Unchanged);
    }

    #[test]
    fn passthrough_writes_unchanged_copy() {
        let td = tempdir().unwrap();
        let lock = write_lock(td.path(), "[[package]]\nname = \"other\"\nversion = \"1.0.0\"\n");
        let dest = td.path().join(ALTERNATE_OUTPUT);

        let out = VersionPatcher::new(&lock, "ram-machine")
            .output(OutputTarget::File(dest.clone()))
            .patch(&PatchRequest::new("0.2.0"))
            .unwrap();

        assert_eq!(out.change, Change::NotFound);
        assert_eq!(fs::read(&dest).unwrap(), fs::read(&lock).unwrap());
    }

    #[test]
    fn fail_policy_reports_missing_package_and_skips_write() {
        let td = tempdir().unwrap();
        let lock = write_lock(td.path(), "name = \"other\"\nversion = \"1.0.0\"\n");
        let dest = td.path().join(ALTERNATE_OUTPUT);

        let err = VersionPatcher::new(&lock, "ram-machine")
            .output(OutputTarget::File(dest.clone()))
            .missing(MissingPolicy::Fail)
            .patch(&PatchRequest::new("0.2.0"))
            .unwrap_err();

        match err.downcast_ref::<PatchError>() {
            Some(PatchError::PackageNotFound { package, path }) => {
                assert_eq!(package, "ram-machine");
                assert_eq!(path, &lock);
            }
            None => panic!("expected PackageNotFound, got: {err:?}"),
        }
        assert!(!dest.exists());
    }

    #[test]
    fn missing_lockfile_propagates_io_error() {
        let td = tempdir().unwrap();
        let dest = td.path().join(ALTERNATE_OUTPUT);

        let err = VersionPatcher::new(td.path().join("Cargo.lock"), "ram-machine")
            .output(OutputTarget::File(dest.clone()))
            .patch(&PatchRequest::new("0.2.0"))
            .unwrap_err();

        let io_err = err.downcast_ref::<io::Error>().expect("io error in chain");
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
        assert!(!dest.exists());
    }

    #[test]
    fn unwritable_output_is_an_error() {
        let td = tempdir().unwrap();
        let lock = write_lock(td.path(), LOCK);

        let err = VersionPatcher::new(&lock, "ram-machine")
            .output(OutputTarget::File(td.path().join("no/such/dir/out.toml")))
            .patch(&PatchRequest::new("0.2.0"))
            .unwrap_err();

        assert!(err.to_string().starts_with("failed to write"));
    }

    #[test]
    fn stock_variants_use_the_hook_defaults() {
        let a = VersionPatcher::in_place();
        assert_eq!(a.lockfile(), Path::new(DEFAULT_LOCKFILE));
        assert_eq!(a.output_path(), Path::new(DEFAULT_LOCKFILE));
        assert_eq!(a.package(), DEFAULT_PACKAGE);

        let b = VersionPatcher::alternate();
        assert_eq!(b.lockfile(), Path::new(DEFAULT_LOCKFILE));
        assert_eq!(b.output_path(), Path::new(ALTERNATE_OUTPUT));
    }
}
