//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/bstree/bstree.toml`
//! 3. Explicit config file (`--config <file>`)
//! 4. Environment variables: `BSTREE_*` prefix

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::ApplicationError;

/// Key type the command-line front end parses keys into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    /// Signed 64-bit integers
    #[default]
    Int,
    /// Floats, totally ordered
    Float,
    /// Strings, ordered bytewise
    String,
}

/// Unified configuration for bstree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Key type for scripts and command arguments (default: int)
    pub key_kind: KeyKind,
    /// Separator between keys in in-order output (default: single space)
    pub separator: String,
    /// Render the tree shape after every script run
    pub show_tree: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            key_kind: KeyKind::Int,
            separator: " ".into(),
            show_tree: false,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub key_kind: Option<KeyKind>,
    pub separator: Option<String>,
    pub show_tree: Option<bool>,
}

/// Get the XDG config directory for bstree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "bstree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("bstree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            key_kind: overlay.key_kind.unwrap_or(self.key_kind),
            separator: overlay
                .separator
                .clone()
                .unwrap_or_else(|| self.separator.clone()),
            show_tree: overlay.show_tree.unwrap_or(self.show_tree),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; it must exist when given
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/bstree/bstree.toml`
    /// 3. Explicit config file
    /// 4. Environment variables: `BSTREE_*` prefix
    #[instrument(level = "debug")]
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current = Self::apply_env_overrides(current)?;
        debug!("settings: {:?}", current);
        Ok(current)
    }

    /// Apply BSTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        Self::apply_env(settings, env_source())
    }

    fn apply_env(mut settings: Self, source: Environment) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let config = Config::builder()
            .add_source(source)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("key_kind") {
            settings.key_kind =
                KeyKind::from_str(&val, true).map_err(|e| ApplicationError::Config {
                    message: format!("BSTREE_KEY_KIND: {}", e),
                })?;
        }
        if let Ok(val) = config.get_string("separator") {
            settings.separator = val;
        }
        match config.get_bool("show_tree") {
            Ok(val) => settings.show_tree = val,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => {
                return Err(ApplicationError::Config {
                    message: format!("BSTREE_SHOW_TREE: {}", e),
                })
            }
        }

        Ok(settings)
    }
}

/// `BSTREE_SHOW_TREE` maps to `show_tree`; a double underscore would open a nested key.
fn env_source() -> Environment {
    Environment::with_prefix("BSTREE")
        .prefix_separator("_")
        .separator("__")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_with_keeps_unspecified_fields() {
        let base = Settings::default();
        let overlay = RawSettings {
            separator: Some(",".into()),
            ..RawSettings::default()
        };
        let merged = base.merge_with(&overlay);
        assert_eq!(merged.separator, ",");
        assert_eq!(merged.key_kind, KeyKind::Int);
        assert!(!merged.show_tree);
    }

    #[test]
    fn test_raw_settings_from_toml() {
        let raw: RawSettings = toml::from_str("key_kind = \"float\"\nshow_tree = true\n").unwrap();
        assert_eq!(raw.key_kind, Some(KeyKind::Float));
        assert_eq!(raw.show_tree, Some(true));
        assert_eq!(raw.separator, None);
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let mut map = config::Map::new();
        for (k, v) in vars {
            map.insert(k.to_string(), v.to_string());
        }
        env_source().source(Some(map))
    }

    #[test]
    fn test_env_overrides_single_underscore_names() {
        let settings = Settings::apply_env(
            Settings::default(),
            env(&[
                ("BSTREE_SEPARATOR", ","),
                ("BSTREE_KEY_KIND", "float"),
                ("BSTREE_SHOW_TREE", "true"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.separator, ",");
        assert_eq!(settings.key_kind, KeyKind::Float);
        assert!(settings.show_tree);
    }

    #[test]
    fn test_env_overrides_ignore_other_prefixes() {
        let settings = Settings::apply_env(
            Settings::default(),
            env(&[("OTHER_SEPARATOR", ","), ("BSTREEX_SEPARATOR", ";")]),
        )
        .unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_env_invalid_key_kind_is_config_error() {
        let err = Settings::apply_env(Settings::default(), env(&[("BSTREE_KEY_KIND", "hex")]))
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Config { .. }));
        assert!(err.to_string().contains("BSTREE_KEY_KIND"));
    }

    #[test]
    fn test_env_invalid_bool_is_config_error() {
        let err = Settings::apply_env(Settings::default(), env(&[("BSTREE_SHOW_TREE", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Config { .. }));
        assert!(err.to_string().contains("BSTREE_SHOW_TREE"));
    }
}
