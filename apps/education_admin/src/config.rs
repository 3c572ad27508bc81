use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "education_admin.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub endpoint: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".into(),
            endpoint: "/api/admin/education".into(),
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    endpoint: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the config file (if present), then the environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?;
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.endpoint {
        settings.endpoint = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__ENDPOINT") {
        settings.endpoint = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings =
            load_settings(&dir.path().join(DEFAULT_CONFIG_FILE)).expect("load settings");
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            "api_base_url = \"https://admin.example.org\"\nrequest_timeout_secs = 5\n",
        )
        .expect("write config");

        let raw = fs::read_to_string(&path).expect("read config");
        let mut settings = Settings::default();
        apply_file(&mut settings, &raw).expect("parse");

        assert_eq!(settings.api_base_url, "https://admin.example.org");
        assert_eq!(settings.endpoint, "/api/admin/education");
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn prefixed_env_wins_and_bad_numbers_are_ignored() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("API_BASE_URL", "http://plain"),
            ("APP__API_BASE_URL", "http://prefixed"),
            ("APP__ENDPOINT", "/api/v2/education"),
            ("APP__REQUEST_TIMEOUT_SECS", "soon"),
        ]);
        let mut settings = Settings::default();
        apply_env(&mut settings, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.api_base_url, "http://prefixed");
        assert_eq!(settings.endpoint, "/api/v2/education");
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut settings = Settings::default();
        assert!(apply_file(&mut settings, "request_timeout_secs = \"ten\"").is_err());
    }
}
