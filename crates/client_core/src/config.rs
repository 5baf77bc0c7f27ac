use std::{fs, path::Path, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_SETTINGS_FILE: &str = "scheduler.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPolicy {
    Await,
    Detach,
}

impl FromStr for RequestPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "await" | "awaited" => Ok(Self::Await),
            "detach" | "detached" | "fire_and_forget" | "fire-and-forget" => Ok(Self::Detach),
            other => Err(anyhow!("unknown request policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub forgot_password_policy: RequestPolicy,
    pub reset_password_policy: RequestPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3333".into(),
            request_timeout_secs: 10,
            forgot_password_policy: RequestPolicy::Await,
            reset_password_policy: RequestPolicy::Detach,
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
    api_url: Option<String>,
    request_timeout_secs: Option<u64>,
    forgot_password_policy: Option<RequestPolicy>,
    reset_password_policy: Option<RequestPolicy>,
}

pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
            Err(err) => warn!(path = %path.display(), "ignoring malformed settings file: {err}"),
        }
    }

    apply_env_overrides(&mut settings, env);
    settings
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        set_request_timeout(settings, v, "settings file");
    }
    if let Some(v) = file_cfg.forgot_password_policy {
        settings.forgot_password_policy = v;
    }
    if let Some(v) = file_cfg.reset_password_policy {
        settings.reset_password_policy = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => set_request_timeout(settings, parsed, "APP__REQUEST_TIMEOUT_SECS"),
            Err(err) => warn!("ignoring APP__REQUEST_TIMEOUT_SECS '{v}': {err}"),
        }
    }

    if let Some(v) = env("APP__FORGOT_PASSWORD_POLICY") {
        match v.parse() {
            Ok(policy) => settings.forgot_password_policy = policy,
            Err(err) => warn!("ignoring APP__FORGOT_PASSWORD_POLICY: {err}"),
        }
    }
    if let Some(v) = env("APP__RESET_PASSWORD_POLICY") {
        match v.parse() {
            Ok(policy) => settings.reset_password_policy = policy,
            Err(err) => warn!("ignoring APP__RESET_PASSWORD_POLICY: {err}"),
        }
    }
}

// A zero timeout makes every request fail before it is sent.
fn set_request_timeout(settings: &mut Settings, secs: u64, source: &str) {
    if secs == 0 {
        warn!(source, "ignoring request_timeout_secs = 0");
        return;
    }
    settings.request_timeout_secs = secs;
}

pub fn prepare_api_url(raw_api_url: &str) -> anyhow::Result<String> {
    let raw_api_url = raw_api_url.trim();
    if raw_api_url.is_empty() {
        return Ok(Settings::default().api_url);
    }

    let parsed = url::Url::parse(raw_api_url)
        .with_context(|| format!("invalid api url '{raw_api_url}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!(
            "api url '{raw_api_url}' must use http or https, got '{}'",
            parsed.scheme()
        ));
    }

    Ok(raw_api_url.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
