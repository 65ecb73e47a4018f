//! Configuration for groundcite.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (GROUNDCITE_BIND, GROUNDCITE_MODEL, GEMINI_API_KEY)
//! 2. Config file (.groundcite/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .groundcite/config.yaml
//! - The API key is read from the environment only, never from the file

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";
const DEFAULT_MAX_QUERY_CHARS: usize = 1000;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP service
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeminiConfig {
    /// Model id passed to generateContent
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitsConfig {
    pub max_query_chars: Option<usize>,
    pub request_timeout_seconds: Option<u64>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Bind address for the HTTP service
    pub bind: SocketAddr,
    /// Generation model id
    pub model: String,
    /// Provider API key (GEMINI_API_KEY), absent in offline use
    pub api_key: Option<String>,
    /// Maximum accepted query length in characters
    pub max_query_chars: usize,
    /// Timeout for one provider request
    pub request_timeout: Duration,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// The API key, or an actionable error when it is missing
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .context("GEMINI_API_KEY environment variable required")
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".groundcite").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Merge file values, environment overrides and defaults
fn resolve(
    file: Option<(ConfigFile, PathBuf)>,
    env_bind: Option<String>,
    env_model: Option<String>,
    api_key: Option<String>,
) -> Result<ResolvedConfig> {
    let (config, config_file) = match file {
        Some((config, path)) => (Some(config), Some(path)),
        None => (None, None),
    };

    let bind_str = env_bind
        .or_else(|| config.as_ref().and_then(|c| c.server.bind.clone()))
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let bind: SocketAddr = bind_str
        .parse()
        .with_context(|| format!("Invalid bind address: {bind_str}"))?;

    let model = env_model
        .or_else(|| config.as_ref().and_then(|c| c.gemini.model.clone()))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let max_query_chars = config
        .as_ref()
        .and_then(|c| c.limits.max_query_chars)
        .unwrap_or(DEFAULT_MAX_QUERY_CHARS);

    let timeout_seconds = config
        .as_ref()
        .and_then(|c| c.limits.request_timeout_seconds)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS);

    Ok(ResolvedConfig {
        bind,
        model,
        api_key: api_key.filter(|k| !k.is_empty()),
        max_query_chars,
        request_timeout: Duration::from_secs(timeout_seconds),
        config_file,
    })
}

/// Load configuration from all sources
pub fn load() -> Result<ResolvedConfig> {
    let file = match find_config_file() {
        Some(path) => Some((load_config_file(&path)?, path)),
        None => None,
    };

    resolve(
        file,
        std::env::var("GROUNDCITE_BIND").ok(),
        std::env::var("GROUNDCITE_MODEL").ok(),
        std::env::var("GEMINI_API_KEY").ok(),
    )
}

/// Load configuration from an explicit config file path
pub fn load_from(path: &Path) -> Result<ResolvedConfig> {
    let config = load_config_file(path)?;
    resolve(
        Some((config, path.to_path_buf())),
        std::env::var("GROUNDCITE_BIND").ok(),
        std::env::var("GROUNDCITE_MODEL").ok(),
        std::env::var("GEMINI_API_KEY").ok(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let config = resolve(None, None, None, None).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND.parse().unwrap());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_query_chars, 1000);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.api_key.is_none());
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".groundcite");
        std::fs::create_dir_all(&dir).unwrap();

        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
server:
  bind: 0.0.0.0:9090
gemini:
  model: gemini-2.5-flash
limits:
  max_query_chars: 500
  request_timeout_seconds: 10
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.server.bind, Some("0.0.0.0:9090".to_string()));
        assert_eq!(config.gemini.model, Some("gemini-2.5-flash".to_string()));

        let resolved = resolve(Some((config, config_path.clone())), None, None, None).unwrap();
        assert_eq!(resolved.bind, "0.0.0.0:9090".parse().unwrap());
        assert_eq!(resolved.model, "gemini-2.5-flash");
        assert_eq!(resolved.max_query_chars, 500);
        assert_eq!(resolved.request_timeout, Duration::from_secs(10));
        assert_eq!(resolved.config_file, Some(config_path));
    }

    #[test]
    fn test_env_beats_file() {
        let config = ConfigFile {
            version: "1.0".to_string(),
            server: ServerConfig {
                bind: Some("0.0.0.0:9090".to_string()),
            },
            gemini: GeminiConfig {
                model: Some("file-model".to_string()),
            },
            limits: LimitsConfig::default(),
        };

        let resolved = resolve(
            Some((config, PathBuf::from("/x/.groundcite/config.yaml"))),
            Some("127.0.0.1:7070".to_string()),
            Some("env-model".to_string()),
            Some("key".to_string()),
        )
        .unwrap();

        assert_eq!(resolved.bind, "127.0.0.1:7070".parse().unwrap());
        assert_eq!(resolved.model, "env-model");
        assert_eq!(resolved.api_key.as_deref(), Some("key"));
        assert_eq!(resolved.require_api_key().unwrap(), "key");
    }

    #[test]
    fn test_invalid_bind_rejected() {
        let result = resolve(None, Some("not-an-addr".to_string()), None, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_api_key_is_actionable() {
        let config = resolve(None, None, None, None).unwrap();
        let err = config.require_api_key().unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
