use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use tracing::warn;

pub const DEFAULT_SETTINGS_FILE: &str = "contacts.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub search_debounce: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3001".into(),
            request_timeout: Duration::from_secs(10),
            search_debounce: Duration::from_millis(500),
        }
    }
}

/// Defaults, then `contacts.toml` in the working directory, then environment.
pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> ClientSettings {
    load_settings_with(path, |key| std::env::var(key).ok())
}

fn load_settings_with(path: &Path, var: impl Fn(&str) -> Option<String>) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if path.exists() {
        match read_settings_file(path) {
            Ok(file_cfg) => apply_file_settings(&mut settings, &file_cfg),
            Err(error) => warn!(path = %path.display(), "ignoring settings file: {error:#}"),
        }
    }

    apply_env_settings(&mut settings, var);
    settings.api_base_url = normalize_base_url(&settings.api_base_url);
    settings
}

fn read_settings_file(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    toml::from_str::<HashMap<String, String>>(&raw)
        .with_context(|| format!("'{}' must be a flat table of string values", path.display()))
}

fn apply_file_settings(settings: &mut ClientSettings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("api_base_url") {
        settings.api_base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("request_timeout_ms") {
        apply_millis(&mut settings.request_timeout, "request_timeout_ms", v);
    }
    if let Some(v) = file_cfg.get("search_debounce_ms") {
        apply_millis(&mut settings.search_debounce, "search_debounce_ms", v);
    }
}

fn apply_env_settings(settings: &mut ClientSettings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("CONTACTS_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_MS") {
        apply_millis(&mut settings.request_timeout, "APP__REQUEST_TIMEOUT_MS", &v);
    }
    if let Some(v) = var("APP__SEARCH_DEBOUNCE_MS") {
        apply_millis(&mut settings.search_debounce, "APP__SEARCH_DEBOUNCE_MS", &v);
    }
}

fn apply_millis(target: &mut Duration, key: &str, raw: &str) {
    match raw.trim().parse::<u64>() {
        Ok(parsed) => *target = Duration::from_millis(parsed),
        Err(_) => warn!(key, value = raw, "ignoring non-numeric millisecond setting"),
    }
}

pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return ClientSettings::default().api_base_url;
    }
    trimmed.to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
