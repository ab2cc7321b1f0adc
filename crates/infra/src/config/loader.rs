//! Configuration loader
//!
//! Loads host configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the webhook URL is not set there, falls back to loading from file
//! 3. Searches multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CHATCAL_WEBHOOK_URL`: Analysis webhook endpoint (required for env mode)
//! - `CHATCAL_BATCH_TIMEOUT_MS`: Debounce quiet period in milliseconds
//! - `CHATCAL_MAX_BATCH_SIZE`: Pending size that forces a flush
//! - `CHATCAL_CLEANUP_INTERVAL_SECS`: Seconds between eviction sweeps
//! - `CHATCAL_ANALYZER_TIMEOUT_SECS`: Per-request webhook timeout
//! - `CHATCAL_ANALYZER_ENABLED`: Whether batches are sent (true/false)
//! - `CHATCAL_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./chatcal.json` or `./chatcal.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chatcal_domain::{ChatCalError, Config, Result};

const WEBHOOK_URL_VAR: &str = "CHATCAL_WEBHOOK_URL";

/// Where a loaded [`Config`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Environment,
    File(PathBuf),
    /// Neither the webhook URL variable nor any config file was present.
    Defaults,
}

/// Load configuration with automatic fallback strategy
///
/// Environment mode is selected by the presence of `CHATCAL_WEBHOOK_URL`.
/// Once selected, a malformed optional variable is an error rather than a
/// reason to try the file.
///
/// # Errors
/// Returns `ChatCalError::Config` if the selected source is malformed or no
/// source exists at all.
pub fn load() -> Result<Config> {
    if std::env::var_os(WEBHOOK_URL_VAR).is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    tracing::debug!("{WEBHOOK_URL_VAR} not set, looking for a config file");
    load_from_file(None)
}

/// Like [`load`], but falls back to [`Config::default`] when there is no
/// configuration source at all.
///
/// # Errors
/// Any error of the source that was found (bad environment override,
/// unreadable or malformed file) is returned as-is.
pub fn load_or_default() -> Result<(Config, ConfigSource)> {
    if std::env::var_os(WEBHOOK_URL_VAR).is_some() {
        return Ok((load_from_env()?, ConfigSource::Environment));
    }

    match find_config_file() {
        Some(path) => Ok((load_from_file(Some(path.clone()))?, ConfigSource::File(path))),
        None => Ok((Config::default(), ConfigSource::Defaults)),
    }
}

/// Load configuration from environment variables
///
/// Only the webhook URL is required; every other value falls back to its
/// default.
///
/// # Errors
/// Returns `ChatCalError::Config` if `CHATCAL_WEBHOOK_URL` is missing or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let webhook_url = env_var(WEBHOOK_URL_VAR)?;

    let mut config = Config::default();
    config.analyzer.webhook_url = Some(webhook_url);
    config.analyzer.enabled = env_bool("CHATCAL_ANALYZER_ENABLED", true);
    config.logging.json = env_bool("CHATCAL_LOG_JSON", false);

    if let Some(value) = env_parse("CHATCAL_BATCH_TIMEOUT_MS", "batch timeout")? {
        config.triage.batch_timeout_ms = value;
    }
    if let Some(value) = env_parse("CHATCAL_MAX_BATCH_SIZE", "max batch size")? {
        config.triage.max_batch_size = value;
    }
    if let Some(value) = env_parse("CHATCAL_CLEANUP_INTERVAL_SECS", "cleanup interval")? {
        config.cleanup.interval_secs = value;
    }
    if let Some(value) = env_parse("CHATCAL_ANALYZER_TIMEOUT_SECS", "analyzer timeout")? {
        config.analyzer.timeout_secs = value;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches multiple locations for config files.
/// Format is detected by file extension.
///
/// # Errors
/// Returns `ChatCalError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid or unsupported
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ChatCalError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            ChatCalError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ChatCalError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ChatCalError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ChatCalError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ChatCalError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Search multiple paths for configuration files
///
/// Returns the first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("chatcal.json"),
        dir.join("chatcal.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        ChatCalError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional numeric environment variable. Unset → `Ok(None)`.
fn env_parse<T>(key: &str, label: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ChatCalError::Config(format!("Invalid {label}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
/// Returns `default` if the variable is not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ENV_KEYS: &[&str] = &[
        "CHATCAL_WEBHOOK_URL",
        "CHATCAL_BATCH_TIMEOUT_MS",
        "CHATCAL_MAX_BATCH_SIZE",
        "CHATCAL_CLEANUP_INTERVAL_SECS",
        "CHATCAL_ANALYZER_TIMEOUT_SECS",
        "CHATCAL_ANALYZER_ENABLED",
        "CHATCAL_LOG_JSON",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    fn write_temp(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for (key, value) in [
            ("CHATCAL_TEST_BOOL_1", "1"),
            ("CHATCAL_TEST_BOOL_YES", "yes"),
            ("CHATCAL_TEST_BOOL_UPPER", "TRUE"),
        ] {
            std::env::set_var(key, value);
            assert!(env_bool(key, false), "{key}");
            std::env::remove_var(key);
        }

        for (key, value) in [("CHATCAL_TEST_BOOL_0", "0"), ("CHATCAL_TEST_BOOL_OFF", "off")] {
            std::env::set_var(key, value);
            assert!(!env_bool(key, true), "{key}");
            std::env::remove_var(key);
        }

        std::env::remove_var("CHATCAL_TEST_BOOL_MISSING");
        assert!(env_bool("CHATCAL_TEST_BOOL_MISSING", true));
        assert!(!env_bool("CHATCAL_TEST_BOOL_MISSING", false));
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("CHATCAL_WEBHOOK_URL", "http://localhost:5678/webhook/chatcal");
        std::env::set_var("CHATCAL_BATCH_TIMEOUT_MS", "30000");
        std::env::set_var("CHATCAL_MAX_BATCH_SIZE", "5");
        std::env::set_var("CHATCAL_CLEANUP_INTERVAL_SECS", "60");
        std::env::set_var("CHATCAL_ANALYZER_TIMEOUT_SECS", "12");
        std::env::set_var("CHATCAL_ANALYZER_ENABLED", "false");
        std::env::set_var("CHATCAL_LOG_JSON", "on");

        let result = load_from_env();
        clear_env();

        let config = result.expect("env config");
        assert_eq!(
            config.analyzer.webhook_url.as_deref(),
            Some("http://localhost:5678/webhook/chatcal")
        );
        assert_eq!(config.triage.batch_timeout_ms, 30_000);
        assert_eq!(config.triage.max_batch_size, 5);
        assert_eq!(config.cleanup.interval_secs, 60);
        assert_eq!(config.analyzer.timeout_secs, 12);
        assert!(!config.analyzer.enabled);
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_env_defaults_optional_vars() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("CHATCAL_WEBHOOK_URL", "http://hooks.local/batch");
        let result = load_from_env();
        clear_env();

        let config = result.expect("env config");
        assert_eq!(config.triage, chatcal_domain::TriageConfig::default());
        assert!(config.analyzer.enabled);
    }

    #[test]
    fn test_load_from_env_missing_webhook() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, ChatCalError::Config(_)), "Should be a Config error");
        assert!(err.to_string().contains("CHATCAL_WEBHOOK_URL"));
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("CHATCAL_WEBHOOK_URL", "http://hooks.local/batch");
        std::env::set_var("CHATCAL_MAX_BATCH_SIZE", "ten");
        let result = load_from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Invalid max batch size"));
    }

    struct CwdGuard(PathBuf);

    impl Drop for CwdGuard {
        fn drop(&mut self) {
            std::env::set_current_dir(&self.0).ok();
        }
    }

    fn enter_empty_dir(dir: &tempfile::TempDir) -> CwdGuard {
        let previous = std::env::current_dir().expect("cwd");
        std::env::set_current_dir(dir.path()).expect("enter temp dir");
        CwdGuard(previous)
    }

    #[test]
    fn test_bad_override_keeps_env_mode() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        let dir = tempfile::tempdir().expect("temp dir");
        let _cwd = enter_empty_dir(&dir);

        std::env::set_var("CHATCAL_WEBHOOK_URL", "http://hooks.local/batch");
        std::env::set_var("CHATCAL_MAX_BATCH_SIZE", "ten");
        let loaded = load();
        let with_default = load_or_default();
        clear_env();

        let err = loaded.unwrap_err();
        assert!(err.to_string().contains("Invalid max batch size"), "{err}");
        assert!(!err.to_string().contains("No config file found"));
        assert!(with_default.is_err(), "typo must not fall back to defaults");
    }

    #[test]
    fn test_load_or_default_reports_source() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        let dir = tempfile::tempdir().expect("temp dir");
        let _cwd = enter_empty_dir(&dir);

        std::env::set_var("CHATCAL_WEBHOOK_URL", "http://hooks.local/batch");
        let from_env = load_or_default();
        clear_env();
        let (config, source) = from_env.expect("env config");
        assert_eq!(source, ConfigSource::Environment);
        assert_eq!(config.analyzer.webhook_url.as_deref(), Some("http://hooks.local/batch"));

        std::fs::write(dir.path().join("chatcal.toml"), "[triage]\nmax_batch_size = 4\n")
            .expect("write config");
        let (config, source) = load_or_default().expect("file config");
        assert!(matches!(source, ConfigSource::File(path) if path.ends_with("chatcal.toml")));
        assert_eq!(config.triage.max_batch_size, 4);
    }

    #[test]
    fn test_load_from_file_json() {
        let path = write_temp(
            r#"{
                "triage": { "batch_timeout_ms": 20000, "max_batch_size": 3 },
                "analyzer": { "webhook_url": "http://n8n.local/webhook/x", "max_attempts": 5 }
            }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).expect("json config");
        assert_eq!(config.triage.batch_timeout_ms, 20_000);
        assert_eq!(config.triage.max_batch_size, 3);
        assert_eq!(config.triage.context_window, 10);
        assert_eq!(config.analyzer.max_attempts, 5);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = write_temp(
            r#"
[triage]
batch_timeout_ms = 15000

[cleanup]
interval_secs = 120

[logging]
level = "debug"
json = true
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).expect("toml config");
        assert_eq!(config.triage.batch_timeout_ms, 15_000);
        assert_eq!(config.cleanup.interval_secs, 120);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert!(config.analyzer.webhook_url.is_none());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/config.json"))).unwrap_err();
        assert!(matches!(err, ChatCalError::Config(_)), "Should be a Config error");
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let path = write_temp(r#"{ "triage": "#, "json");
        let err = load_from_file(Some(path.clone())).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON format"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let err = parse_config("triage:\n  max_batch_size: 3", Path::new("config.yaml")).unwrap_err();
        assert!(err.to_string().contains("Unsupported config format: yaml"));
    }

    #[test]
    fn test_candidates_cover_both_names_and_parents() {
        let candidates = candidates_in(Path::new("/srv/chatcal"));
        assert_eq!(candidates.len(), 8);
        assert!(candidates.contains(&PathBuf::from("/srv/chatcal/chatcal.toml")));
        assert!(candidates.contains(&PathBuf::from("/srv/chatcal/../../config.json")));
    }
}
