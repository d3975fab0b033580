//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/weave/config.toml, WEAVE_CONFIG or `--config`)
//! 3. Environment variables (WEAVE_* prefix)
//! 4. Command-line flags
//!
//! Later sources take precedence. The vault path is then made absolute and
//! validated before a store is opened on it.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "WEAVE";

/// Vault location used when nothing else is configured, relative to the
/// working directory
const DEFAULT_VAULT_DIR: &str = "notes";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Root directory of the note vault
    #[serde(default = "default_vault_dir")]
    pub vault_dir: PathBuf,

    /// Editor command used to edit note bodies
    #[serde(default)]
    pub editor: Option<String>,

    /// Write logs to this file instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            editor: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location and environment
    pub fn load() -> Result<Self> {
        Self::load_with_cli_override(None)
    }

    /// Load configuration, reading the file at `config_path` when given
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (WEAVE_VAULT, WEAVE_EDITOR, WEAVE_LOG_FILE)
    /// 2. Config file (`config_path`, else WEAVE_CONFIG, else the default path)
    /// 3. Default values
    ///
    /// Flags are applied afterwards with [`Config::apply_overrides`].
    pub fn load_with_cli_override(config_path: Option<&PathBuf>) -> Result<Self> {
        let path = config_path
            .cloned()
            .unwrap_or_else(Self::config_file_path);
        Self::load_from_path(&path)
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Empty values are treated as unset.
    fn apply_env_overrides(&mut self) {
        if let Some(val) = env_value("VAULT") {
            self.vault_dir = PathBuf::from(val);
        }

        if let Some(val) = env_value("EDITOR") {
            self.editor = Some(val);
        }

        if let Some(val) = env_value("LOG_FILE") {
            self.log_file = Some(PathBuf::from(val));
        }
    }

    /// Apply command-line overrides (highest precedence)
    pub fn apply_overrides(&mut self, vault: Option<PathBuf>, editor: Option<String>) {
        if let Some(vault) = vault {
            self.vault_dir = vault;
        }
        if let Some(editor) = editor.filter(|e| !e.is_empty()) {
            self.editor = Some(editor);
        }
    }

    /// Make the vault path absolute and check that it is usable
    ///
    /// See [`Config::validate_vault_path`].
    pub fn resolve_vault(&mut self) -> Result<()> {
        self.vault_dir = Self::validate_vault_path(&self.vault_dir)?;
        Ok(())
    }

    /// Turn `path` into an absolute vault directory path
    ///
    /// An existing path must be a directory. A missing path is accepted if
    /// its parent exists and is a directory, so the vault can be created.
    pub fn validate_vault_path(path: &Path) -> Result<PathBuf> {
        let abs = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .context("Failed to resolve vault path: cannot read working directory")?
                .join(path)
        };

        match std::fs::metadata(&abs) {
            Ok(meta) if meta.is_dir() => return Ok(abs),
            Ok(_) => bail!("Vault path exists but is not a directory: {:?}", abs),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to stat vault path: {:?}", abs))
            }
        }

        let parent = abs
            .parent()
            .with_context(|| format!("Vault path has no parent directory: {:?}", abs))?;
        let parent_meta = std::fs::metadata(parent).with_context(|| {
            format!("Vault parent missing or not accessible: {:?}", parent)
        })?;
        if !parent_meta.is_dir() {
            bail!("Vault parent is not a directory: {:?}", parent);
        }

        Ok(abs)
    }

    /// Ensure the vault directory exists
    pub fn ensure_vault_dir(&self) -> Result<()> {
        if !self.vault_dir.exists() {
            std::fs::create_dir_all(&self.vault_dir).with_context(|| {
                format!("Failed to create vault directory: {:?}", self.vault_dir)
            })?;
        }
        Ok(())
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with WEAVE_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Some(path) = env_value("CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("weave")
            .join("config.toml")
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(format!("{}_{}", ENV_PREFIX, name))
        .ok()
        .filter(|v| !v.is_empty())
}

fn default_vault_dir() -> PathBuf {
    PathBuf::from(DEFAULT_VAULT_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &["WEAVE_VAULT", "WEAVE_EDITOR", "WEAVE_LOG_FILE", "WEAVE_CONFIG"];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.vault_dir, PathBuf::from("notes"));
        assert!(config.editor.is_none());
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_env_override_vault_and_editor() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("WEAVE_VAULT", "/tmp/weave-test");
        env::set_var("WEAVE_EDITOR", "nano");
        config.apply_env_overrides();

        assert_eq!(config.vault_dir, PathBuf::from("/tmp/weave-test"));
        assert_eq!(config.editor.as_deref(), Some("nano"));
    }

    #[test]
    fn test_env_empty_value_is_ignored() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("WEAVE_VAULT", "");
        config.apply_env_overrides();

        assert_eq!(config.vault_dir, PathBuf::from("notes"));
    }

    #[test]
    fn test_flags_beat_env() {
        let _guard = EnvGuard::new(ENV_VARS);

        env::set_var("WEAVE_VAULT", "/from/env");
        let mut config = Config::load_from_str("").unwrap();
        assert_eq!(config.vault_dir, PathBuf::from("/from/env"));

        config.apply_overrides(Some(PathBuf::from("/from/flag")), Some("vim".to_string()));
        assert_eq!(config.vault_dir, PathBuf::from("/from/flag"));
        assert_eq!(config.editor.as_deref(), Some("vim"));

        config.apply_overrides(None, Some(String::new()));
        assert_eq!(config.editor.as_deref(), Some("vim"));
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            vault_dir = "/custom/notes"
            editor = "hx"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.vault_dir, PathBuf::from("/custom/notes"));
        assert_eq!(config.editor.as_deref(), Some("hx"));
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::load_from_path(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            vault_dir: PathBuf::from("/data/notes"),
            editor: Some("vim".to_string()),
            log_file: Some(PathBuf::from("/tmp/weave.log")),
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_file_path_env_override() {
        let _guard = EnvGuard::new(ENV_VARS);

        env::set_var("WEAVE_CONFIG", "/etc/weave.toml");
        assert_eq!(Config::config_file_path(), PathBuf::from("/etc/weave.toml"));
    }

    #[test]
    fn test_validate_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let abs = Config::validate_vault_path(temp_dir.path()).unwrap();
        assert_eq!(abs, temp_dir.path());
    }

    #[test]
    fn test_validate_creatable_directory() {
        let temp_dir = TempDir::new().unwrap();
        let vault = temp_dir.path().join("vault");

        let abs = Config::validate_vault_path(&vault).unwrap();
        assert_eq!(abs, vault);
        assert!(!vault.exists());
    }

    #[test]
    fn test_validate_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        assert!(Config::validate_vault_path(&file).is_err());
        assert!(Config::validate_vault_path(&file.join("vault")).is_err());
    }

    #[test]
    fn test_validate_rejects_missing_parent() {
        let temp_dir = TempDir::new().unwrap();
        let vault = temp_dir.path().join("missing").join("vault");

        assert!(Config::validate_vault_path(&vault).is_err());
    }

    #[test]
    fn test_validate_makes_relative_path_absolute() {
        let abs = Config::validate_vault_path(Path::new("weave-relative-vault")).unwrap();
        assert!(abs.is_absolute());
        assert!(abs.ends_with("weave-relative-vault"));
    }

    #[test]
    fn test_resolve_and_ensure_vault() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config {
            vault_dir: temp_dir.path().join("vault"),
            ..Config::default()
        };

        config.resolve_vault().unwrap();
        config.ensure_vault_dir().unwrap();
        assert!(config.vault_dir.is_dir());
    }
}
