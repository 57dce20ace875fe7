use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const SCHEMA_VERSION: u32 = 1;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_DEMO_LATENCY: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the workflow webhooks. `None` runs against the demo dataset.
    pub webhook_url: Option<String>,
    pub access_token: String,
    pub ad_account_id: String,
    pub request_timeout: Duration,
    pub demo_latency: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            access_token: String::new(),
            ad_account_id: String::new(),
            request_timeout: DEFAULT_TIMEOUT,
            demo_latency: DEFAULT_DEMO_LATENCY,
        }
    }
}

impl AppConfig {
    pub fn is_demo(&self) -> bool {
        self.webhook_url.is_none()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    schema_version: u32,
    #[serde(default)]
    webhook_url: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    ad_account_id: Option<String>,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    demo_latency_ms: Option<u64>,
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn config_path() -> PathBuf {
    home_dir().join(".adpilot").join("config.json")
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let data = fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ConfigFile = serde_json::from_slice(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if file.schema_version != SCHEMA_VERSION {
        return Err(ConfigError::UnknownSchema {
            path: path.to_path_buf(),
            version: file.schema_version,
        });
    }
    Ok(file)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn apply_file(config: &mut AppConfig, file: ConfigFile) {
    if let Some(url) = non_empty(file.webhook_url) {
        config.webhook_url = Some(url);
    }
    if let Some(token) = non_empty(file.access_token) {
        config.access_token = token;
    }
    if let Some(account) = non_empty(file.ad_account_id) {
        config.ad_account_id = account;
    }
    if let Some(secs) = file.request_timeout_secs.filter(|secs| *secs > 0) {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(ms) = file.demo_latency_ms {
        config.demo_latency = Duration::from_millis(ms);
    }
}

fn apply_env(config: &mut AppConfig, env: &dyn Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
    if let Some(url) = non_empty(env("ADPILOT_WEBHOOK_URL")) {
        config.webhook_url = Some(url);
    }
    if let Some(token) = non_empty(env("ADPILOT_ACCESS_TOKEN")) {
        config.access_token = token;
    }
    if let Some(account) = non_empty(env("ADPILOT_AD_ACCOUNT_ID")) {
        config.ad_account_id = account;
    }
    if let Some(raw) = non_empty(env("ADPILOT_TIMEOUT_SECS")) {
        match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
            _ => {
                return Err(ConfigError::InvalidEnv {
                    key: "ADPILOT_TIMEOUT_SECS",
                    value: raw,
                })
            }
        }
    }
    Ok(())
}

/// Layers defaults, the file at `path` (if present) and `env`. Problems are
/// reported as warnings and the layer is skipped.
pub fn load_from(path: &Path, env: &dyn Fn(&str) -> Option<String>) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    if path.exists() {
        match read_config_file(path) {
            Ok(file) => apply_file(&mut config, file),
            Err(err) => warnings.push(err.to_string()),
        }
    }

    if let Err(err) = apply_env(&mut config, env) {
        warnings.push(err.to_string());
    }

    (config, warnings)
}

pub fn load() -> (AppConfig, Vec<String>) {
    load_from(&config_path(), &|key| std::env::var(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "adpilot_config_{prefix}_{}_{}.json",
            std::process::id(),
            nanos
        ))
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_file_and_env_means_demo_mode() {
        let (config, warnings) = load_from(&temp_file("absent"), &env_of(&[]));
        assert!(config.is_demo());
        assert_eq!(config.request_timeout, DEFAULT_TIMEOUT);
        assert!(warnings.is_empty());
    }

    #[test]
    fn env_overrides_file() {
        let path = temp_file("layered");
        fs::write(
            &path,
            r#"{
  "schema_version": 1,
  "webhook_url": "https://file.example/webhook",
  "access_token": "file-token",
  "ad_account_id": "act_file",
  "request_timeout_secs": 12
}"#,
        )
        .expect("config fixture should write");

        let env = env_of(&[
            ("ADPILOT_WEBHOOK_URL", "https://env.example/webhook"),
            ("ADPILOT_AD_ACCOUNT_ID", "  "),
        ]);
        let (config, warnings) = load_from(&path, &env);

        assert!(warnings.is_empty());
        assert_eq!(config.webhook_url.as_deref(), Some("https://env.example/webhook"));
        assert_eq!(config.access_token, "file-token");
        assert_eq!(config.ad_account_id, "act_file");
        assert_eq!(config.request_timeout, Duration::from_secs(12));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn unknown_schema_is_skipped_with_warning() {
        let path = temp_file("future");
        fs::write(&path, r#"{"schema_version": 7, "webhook_url": "https://x"}"#)
            .expect("config fixture should write");

        let (config, warnings) = load_from(&path, &env_of(&[]));
        assert!(config.is_demo());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("unknown schema_version"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn bad_timeout_env_is_reported() {
        let (config, warnings) = load_from(
            &temp_file("absent_timeout"),
            &env_of(&[("ADPILOT_TIMEOUT_SECS", "soon")]),
        );
        assert_eq!(config.request_timeout, DEFAULT_TIMEOUT);
        assert_eq!(warnings, vec!["invalid value for ADPILOT_TIMEOUT_SECS: soon".to_string()]);
    }

    #[test]
    fn malformed_file_is_reported() {
        let path = temp_file("broken");
        fs::write(&path, "{ not json").expect("config fixture should write");

        let (_, warnings) = load_from(&path, &env_of(&[]));
        assert!(warnings[0].starts_with("failed to parse"));

        let _ = fs::remove_file(path);
    }
}
