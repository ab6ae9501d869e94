use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "lockstamp.toml";

/// Directory that relative paths inside `config` are resolved against.
///
/// Returns `None` for a bare file name (`lockstamp.toml`), meaning "relative to
/// the working directory".
pub fn config_dir(config: &Path) -> Option<PathBuf> {
    config
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Resolve `p` against `base` unless it is already absolute.
pub fn anchor(base: Option<&Path>, p: &Path) -> PathBuf {
    match base {
        Some(b) if p.is_relative() => b.join(p),
        _ => p.to_path_buf(),
    }
}
