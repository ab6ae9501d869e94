//! Git integration layer.
//!
//! Two operations are needed by the rest of the crate: staging the file a
//! patch wrote, and finding where `pre-commit` hooks live. Both are backed by
//! `git2` in `git2_backend`; callers only see paths and `anyhow` errors.
//!
//! Staging honours `GIT_INDEX_FILE`, because inside a `pre-commit` hook git
//! may point it at a temporary index (`git commit -a`, `git commit <paths>`).

mod git2_backend;

pub use git2_backend::{hooks_dir, stage_path};
