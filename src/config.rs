//! Configuration management for the note index.
//!
//! Runtime settings come from environment variables (optionally through a
//! `.env` file). The notebooks themselves are declared in a TOML file, one
//! table per notebook:
//!
//! ```toml
//! [journal]
//! path = "/home/me/notes"
//!
//! [firefox]
//! impl = "mozilla"
//! path = "/home/me/.mozilla/firefox/abcd.default/places.sqlite"
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::models::{Notebook, NotebookKind};
use crate::sources;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Notebook file location relative to the home directory.
pub const DEFAULT_NOTEBOOK_FILE: &str = ".config/notefinder.toml";

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Notebook declarations
    pub notebook_file: PathBuf,

    /// Polling period of the synchronizer (default: 10s)
    pub sync_interval: Duration,

    /// Upper bound for one content-matcher call (default: 30s)
    pub content_match_timeout: Duration,

    /// Register Firefox profiles found under the home directory (default: true)
    pub auto_discover: bool,

    /// Log level (default: "info")
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `NOTEFINDER_CONFIG`: Notebook file (default: `~/.config/notefinder.toml`)
    /// - `NOTEFINDER_SYNC_INTERVAL_SECS`: Polling period in seconds (default: 10)
    /// - `NOTEFINDER_CONTENT_MATCH_TIMEOUT_SECS`: Matcher timeout in seconds (default: 30)
    /// - `NOTEFINDER_AUTO_DISCOVER`: Discover browser profiles (default: true)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    pub fn from_env() -> ConfigResult<Self> {
        // Missing .env is fine
        let _ = dotenvy::dotenv();

        let notebook_file = match env::var("NOTEFINDER_CONFIG") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            Ok(_) => {
                return Err(ConfigError::InvalidValue {
                    var: "NOTEFINDER_CONFIG".to_string(),
                    reason: "Cannot be empty".to_string(),
                })
            }
            Err(_) => default_notebook_file(),
        };

        let sync_interval_secs = Self::parse_env_u64("NOTEFINDER_SYNC_INTERVAL_SECS", 10)?;
        if sync_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                var: "NOTEFINDER_SYNC_INTERVAL_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        let content_match_timeout_secs =
            Self::parse_env_u64("NOTEFINDER_CONTENT_MATCH_TIMEOUT_SECS", 30)?;
        let auto_discover = Self::parse_env_bool("NOTEFINDER_AUTO_DISCOVER", true)?;
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            notebook_file,
            sync_interval: Duration::from_secs(sync_interval_secs),
            content_match_timeout: Duration::from_secs(content_match_timeout_secs),
            auto_discover,
            log_level,
        })
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }

    /// Parse an environment variable as a boolean with a default value.
    fn parse_env_bool(var_name: &str, default: bool) -> ConfigResult<bool> {
        match env::var(var_name) {
            Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    var: var_name.to_string(),
                    reason: format!("Must be true or false, got: {}", val),
                }),
            },
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            notebook_file: default_notebook_file(),
            sync_interval: Duration::from_secs(10),
            content_match_timeout: Duration::from_secs(30),
            auto_discover: true,
            log_level: "info".to_string(),
        }
    }
}

fn default_notebook_file() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_NOTEBOOK_FILE))
        .unwrap_or_else(|| PathBuf::from("notefinder.toml"))
}

/// One table of the notebook file.
#[derive(Debug, Clone, PartialEq)]
pub struct NotebookSection {
    pub name: String,
    pub settings: HashMap<String, String>,
}

/// Split a notebook file into sections, in file order.
///
/// Scalar values are stringified. Top-level keys outside any table are
/// ignored, as are nested arrays and tables.
pub fn parse_notebook_sections(content: &str) -> ConfigResult<Vec<NotebookSection>> {
    let table: toml::Table =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    let mut sections = Vec::new();
    for (name, value) in table {
        let toml::Value::Table(entries) = value else {
            continue;
        };

        let mut settings = HashMap::new();
        for (key, value) in entries {
            let text = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                toml::Value::Datetime(dt) => dt.to_string(),
                toml::Value::Array(_) | toml::Value::Table(_) => {
                    warn!(section = %name, key = %key, "Ignoring non-scalar setting");
                    continue;
                }
            };
            settings.insert(key, text);
        }

        sections.push(NotebookSection { name, settings });
    }

    Ok(sections)
}

/// Build configured notebooks from a parsed notebook file.
///
/// A section with `enabled = false` is registered but never polled.
pub fn notebooks_from_sections(sections: Vec<NotebookSection>) -> ConfigResult<Vec<Notebook>> {
    sections
        .into_iter()
        .map(|section| {
            let source = sources::source_for(&section.name, &section.settings)?;
            let enabled = section
                .settings
                .get("enabled")
                .map_or(true, |value| value != "false");
            Ok(
                Notebook::new(section.name, source, section.settings, NotebookKind::Configured)
                    .with_enabled(enabled),
            )
        })
        .collect()
}

/// Read the notebook file at `path`.
pub fn load_notebooks(path: &Path) -> ConfigResult<Vec<Notebook>> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    notebooks_from_sections(parse_notebook_sections(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    // Helper to set and unset env vars for testing
    struct EnvGuard {
        vars: Vec<String>,
    }

    impl EnvGuard {
        fn new() -> Self {
            EnvGuard { vars: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            env::set_var(key, value);
            self.vars.push(key.to_string());
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for var in &self.vars {
                env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.sync_interval, Duration::from_secs(10));
        assert_eq!(config.content_match_timeout, Duration::from_secs(30));
        assert!(config.auto_discover);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    #[serial]
    fn test_config_from_env_valid() {
        let mut guard = EnvGuard::new();
        guard.set("NOTEFINDER_CONFIG", "/tmp/notebooks.toml");
        guard.set("NOTEFINDER_SYNC_INTERVAL_SECS", "60");
        guard.set("NOTEFINDER_AUTO_DISCOVER", "no");

        let config = Config::from_env().expect("Config should be valid");
        assert_eq!(config.notebook_file, PathBuf::from("/tmp/notebooks.toml"));
        assert_eq!(config.sync_interval, Duration::from_secs(60));
        assert!(!config.auto_discover);
    }

    #[test]
    #[serial]
    fn test_config_zero_interval_rejected() {
        let mut guard = EnvGuard::new();
        guard.set("NOTEFINDER_SYNC_INTERVAL_SECS", "0");

        match Config::from_env() {
            Err(ConfigError::InvalidValue { var, .. }) => {
                assert_eq!(var, "NOTEFINDER_SYNC_INTERVAL_SECS");
            }
            other => panic!("Expected InvalidValue error, got: {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_bool() {
        let mut guard = EnvGuard::new();
        guard.set("NOTEFINDER_AUTO_DISCOVER", "maybe");

        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    #[serial]
    fn test_parse_env_u64() {
        let mut guard = EnvGuard::new();
        guard.set("TEST_U64", "42");

        assert_eq!(Config::parse_env_u64("TEST_U64", 10).unwrap(), 42);
        assert_eq!(Config::parse_env_u64("NONEXISTENT", 10).unwrap(), 10);
    }

    #[test]
    #[serial]
    fn test_parse_env_u64_invalid() {
        let mut guard = EnvGuard::new();
        guard.set("TEST_U64_INVALID", "not-a-number");

        assert!(Config::parse_env_u64("TEST_U64_INVALID", 10).is_err());
    }

    #[test]
    fn test_sections_keep_file_order() {
        let content = r#"
            title = "ignored top-level key"

            [zeta]
            path = "/notes/zeta"

            [alpha]
            impl = "google"
            retries = 3
            enabled = false
        "#;

        let sections = parse_notebook_sections(content).unwrap();
        let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(sections[1].settings.get("retries").unwrap(), "3");
        assert_eq!(sections[1].settings.get("enabled").unwrap(), "false");
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        assert!(matches!(
            parse_notebook_sections("[broken"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_notebooks_from_sections() {
        let sections = parse_notebook_sections(
            r#"
            [journal]
            path = "/notes/journal"

            [cloud]
            impl = "google"
            enabled = false
            "#,
        )
        .unwrap();

        let notebooks = notebooks_from_sections(sections).unwrap();
        assert_eq!(notebooks.len(), 2);
        assert_eq!(notebooks[0].name(), "journal");
        assert_eq!(notebooks[0].source_kind(), "file");
        assert_eq!(notebooks[0].kind(), NotebookKind::Configured);
        assert!(notebooks[0].is_enabled());
        assert_eq!(notebooks[1].source_kind(), "google");
        assert!(!notebooks[1].is_enabled());
    }

    #[test]
    fn test_unknown_source_kind_fails() {
        let sections = parse_notebook_sections("[odd]\nimpl = \"evernote\"\n").unwrap();
        assert!(matches!(
            notebooks_from_sections(sections),
            Err(ConfigError::UnknownSource { .. })
        ));
    }

    #[test]
    fn test_missing_notebook_file() {
        let result = load_notebooks(Path::new("/nonexistent/notefinder.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
