use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::patch::{
    ALTERNATE_OUTPUT, DEFAULT_LOCKFILE, DEFAULT_PACKAGE, MissingPolicy, OutputTarget,
};
use crate::paths::{CONFIG_FILE, anchor, config_dir};

/// Top-level configuration loaded from `lockstamp.toml`.
///
/// Every key is optional; missing keys fall back to the stock hook's
/// behaviour (patch `ram-machine` in `./Cargo.lock`, in place).
///
/// Example TOML:
/// ```toml
/// package  = "ram-machine"
/// lockfile = "Cargo.lock"
/// output   = "modified_dependencies.toml"
/// strict   = true
/// stage    = true
/// ```
///
/// Relative paths are resolved against the directory holding the config file.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub lockfile: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub stage: bool,
}

/// Values given on the command line. They win over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub lockfile: Option<PathBuf>,
    pub package: Option<String>,
    pub output: Option<PathBuf>,
    pub alternate: bool,
    pub strict: bool,
    pub stage: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub package: String,
    pub lockfile: PathBuf,
    pub output: OutputTarget,
    pub missing: MissingPolicy,
    pub stage: bool,
}

/// Load and parse a config file.
///
/// # Errors
/// - Returns an error if the file cannot be read.
/// - Returns an error if parsing the TOML fails (including unknown keys).
pub fn load_config(path: &Path) -> Result<Config> {
    let txt = fs::read_to_string(path)
        .with_context(|| format!("config not found: {}", path.display()))?;
    let cfg: Config =
        toml::from_str(&txt).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(cfg)
}

/// Merge the config file and command-line overrides into [`Settings`].
///
/// The config file is `o.config` when given (it must exist), otherwise
/// `./lockstamp.toml` if present, otherwise none.
pub fn resolve_settings(o: &Overrides) -> Result<Settings> {
    let (cfg, base) = match &o.config {
        Some(p) => (load_config(p)?, config_dir(p)),
        None => {
            let p = Path::new(CONFIG_FILE);
            if p.is_file() {
                (load_config(p)?, None)
            } else {
                (Config::default(), None)
            }
        }
    };
    Ok(merge(cfg, base.as_deref(), o))
}

fn merge(cfg: Config, base: Option<&Path>, o: &Overrides) -> Settings {
    let package = o
        .package
        .clone()
        .or(cfg.package)
        .unwrap_or_else(|| DEFAULT_PACKAGE.to_string());

    let lockfile = match (&o.lockfile, &cfg.lockfile) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => anchor(base, p),
        (None, None) => anchor(base, Path::new(DEFAULT_LOCKFILE)),
    };

    let output = if let Some(p) = &o.output {
        OutputTarget::File(p.clone())
    } else if o.alternate {
        OutputTarget::File(PathBuf::from(ALTERNATE_OUTPUT))
    } else if let Some(p) = &cfg.output {
        OutputTarget::File(anchor(base, p))
    } else {
        OutputTarget::InPlace
    };

    let missing = if o.strict || cfg.strict {
        MissingPolicy::Fail
    } else {
        MissingPolicy::Passthrough
    };

    Settings {
        package,
        lockfile,
        output,
        missing,
        stage: o.stage || cfg.stage,
    }
}
