use anyhow::{Context, Result, anyhow};
use git2::{Index, Repository};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Open the repository containing `start`, walking up parent directories.
///
/// # Errors
/// Returns an error if no repository encloses `start`.
fn discover_repo(start: &Path) -> Result<Repository> {
    Repository::discover(start)
        .with_context(|| format!("not inside a git repository: {}", start.display()))
}

/// Environment variable git sets for hooks when the index in use is not `.git/index`.
const INDEX_FILE_ENV: &str = "GIT_INDEX_FILE";

/// Open the index that `git add` would write to.
///
/// When `index_file` is given (the value of `GIT_INDEX_FILE`), that file is
/// opened and bound to `repo`; during `git commit -a` it is `.git/index.lock`,
/// which git holds locked while the hook runs. Otherwise the repository's
/// default index is used.
fn open_index(repo: &Repository, index_file: Option<&Path>) -> Result<Index> {
    match index_file {
        Some(path) => {
            let mut index = Index::open(path)
                .with_context(|| format!("failed to open index: {}", path.display()))?;
            repo.set_index(&mut index)
                .with_context(|| format!("failed to bind index: {}", path.display()))?;
            Ok(index)
        }
        None => repo.index().with_context(|| {
            format!("failed to open index of {}", repo.path().display())
        }),
    }
}

/// Add the file at `abs` (canonical) to the index of `repo`.
fn stage_in(repo: &Repository, abs: &Path, index_file: Option<&Path>) -> Result<()> {
    let workdir = repo
        .workdir()
        .ok_or_else(|| anyhow!("repository has no work tree: {}", repo.path().display()))?;
    let workdir = fs::canonicalize(workdir)
        .with_context(|| format!("failed to resolve work tree: {}", workdir.display()))?;
    let rel = abs.strip_prefix(&workdir).with_context(|| {
        format!(
            "{} is outside the work tree {}",
            abs.display(),
            workdir.display()
        )
    })?;

    let mut index = open_index(repo, index_file)?;
    index
        .add_path(rel)
        .with_context(|| format!("git add {}", rel.display()))?;
    index.write().with_context(|| match index.path() {
        Some(p) => format!("failed to write index: {}", p.display()),
        None => "failed to write index".to_string(),
    })?;
    Ok(())
}

/// Add `path` to the index of the repository that contains it.
///
/// Equivalent to `git add <path>` for a single file. Both `path` and the
/// repository's work tree are canonicalized so symlinked temp directories
/// (e.g. `/tmp` → `/private/tmp`) compare correctly.
///
/// If `GIT_INDEX_FILE` is set (as it is for hooks), the file goes into that
/// index rather than `.git/index`.
///
/// # Errors
/// - `path` does not exist or is not inside any repository.
/// - The repository is bare, or `path` lies outside its work tree.
/// - The index cannot be opened, updated or written.
pub fn stage_path(path: &Path) -> Result<()> {
    let abs = fs::canonicalize(path)
        .with_context(|| format!("cannot stage missing file: {}", path.display()))?;
    let dir = abs
        .parent()
        .ok_or_else(|| anyhow!("cannot stage {}", abs.display()))?;
    let repo = discover_repo(dir)?;

    let index_file = env::var_os(INDEX_FILE_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    stage_in(&repo, &abs, index_file.as_deref())
}

/// Hooks directory (`<gitdir>/hooks`) of the repository enclosing `start`.
///
/// # Errors
/// Returns an error if no repository encloses `start`.
pub fn hooks_dir(start: &Path) -> Result<PathBuf> {
    let repo = discover_repo(start)?;
    Ok(repo.path().join("hooks"))
}
