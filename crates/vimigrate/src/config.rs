//! Tool configuration: namespace conventions, extensions, and the keyword
//! bucket table for the keyword placement policy.
//!
//! Configuration is resolved in order: an explicit `--config` path, a
//! `vimigrate.toml` in the working directory, a `vimigrate/vimigrate.toml`
//! under the user configuration directory, then built-in defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use etcetera::BaseStrategy;
use log::debug;
use serde::{Deserialize, Serialize};

/// One keyword bucket of the keyword placement policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordBucket {
    /// Name substrings selecting this bucket, matched case-insensitively.
    pub keywords: Vec<String>,
    /// Destination path for matching functions.
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root directory of the namespace convention.
    pub namespace_root: String,
    /// Extension of the scripting language's source files.
    pub script_extension: String,
    /// Extension appended to written destination files so originals are
    /// never overwritten.
    pub output_extension: String,
    /// Default autoload destination for private functions.
    pub core_autoload: String,
    /// Destination for global functions.
    pub plugin_file: String,
    /// Bucket table of the keyword placement policy, first match wins.
    pub buckets: Vec<KeywordBucket>,
}

impl Default for Config {
    fn default() -> Self {
        let bucket = |keywords: &[&str], destination: &str| KeywordBucket {
            keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
            destination: destination.to_owned(),
        };
        Self {
            namespace_root: "autoload".to_owned(),
            script_extension: "vim".to_owned(),
            output_extension: "vx".to_owned(),
            core_autoload: "autoload/org/core.vim".to_owned(),
            plugin_file: "plugin/org.vim".to_owned(),
            buckets: vec![
                bucket(&["random"], "autoload/org/random.vim"),
                bucket(&["time", "date"], "autoload/org/time.vim"),
                bucket(&["tag"], "autoload/org/tags.vim"),
                bucket(&["lorem"], "autoload/org/utils.vim"),
                bucket(&["agenda"], "autoload/org/agenda.vim"),
                bucket(&["export", "2pdf"], "autoload/org/export.vim"),
            ],
        }
    }
}

impl Config {
    /// Loads a configuration file, failing on unreadable or invalid TOML.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config `{}`", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("invalid config `{}`", path.display()))
    }

    /// Resolves the effective configuration for a run.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        let local = Path::new("vimigrate.toml");
        if local.is_file() {
            debug!("using config from ./vimigrate.toml");
            return Self::load_from_file(local);
        }
        if let Ok(strategy) = etcetera::choose_base_strategy() {
            let user = strategy.config_dir().join("vimigrate").join("vimigrate.toml");
            if user.is_file() {
                debug!("using config from {}", user.display());
                return Self::load_from_file(&user);
            }
        }
        Ok(Self::default())
    }
}
