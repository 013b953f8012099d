use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SettingsError;

pub const DEFAULT_SETTINGS_FILE: &str = "dashboard.toml";
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// What the view does when the current page lies past the last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOverflow {
    #[default]
    Empty,
    Clamp,
}

impl PageOverflow {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "empty" => Some(Self::Empty),
            "clamp" => Some(Self::Clamp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub server_url: String,
    pub page_size: usize,
    /// Drop liked entries whose identifier vanished from a fresh roster.
    pub prune_stale_likes: bool,
    pub reset_page_on_change: bool,
    pub page_overflow: PageOverflow,
    pub request_timeout_secs: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3001/api".into(),
            page_size: DEFAULT_PAGE_SIZE,
            prune_stale_likes: false,
            reset_page_on_change: false,
            page_overflow: PageOverflow::Empty,
            request_timeout_secs: 10,
        }
    }
}

impl EngineSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn sanitize(mut self) -> Self {
        if self.page_size == 0 {
            warn!(
                "settings: page_size=0 is invalid, using default {}",
                DEFAULT_PAGE_SIZE
            );
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        self
    }
}

/// Loads settings from `path` (or `dashboard.toml` when present) and then the
/// process environment. An explicitly named file must exist.
pub fn load_settings(path: Option<&Path>) -> Result<EngineSettings, SettingsError> {
    let mut settings = match path {
        Some(path) => load_settings_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_SETTINGS_FILE);
            if default_path.exists() {
                load_settings_file(default_path)?
            } else {
                EngineSettings::default()
            }
        }
    };

    apply_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings.sanitize())
}

pub fn load_settings_file(path: &Path) -> Result<EngineSettings, SettingsError> {
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: PathBuf::from(path),
        source,
    })?;
    parse_settings(&raw).map_err(|source| SettingsError::Parse {
        path: PathBuf::from(path),
        source,
    })
}

pub fn parse_settings(raw: &str) -> Result<EngineSettings, toml::de::Error> {
    toml::from_str::<EngineSettings>(raw).map(EngineSettings::sanitize)
}

pub fn apply_overrides(settings: &mut EngineSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("DIRECTORY_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("APP__PAGE_SIZE") {
        match v.parse::<usize>() {
            Ok(parsed) => settings.page_size = parsed,
            Err(_) => warn!("settings: ignoring APP__PAGE_SIZE={v}"),
        }
    }

    if let Some(v) = lookup("APP__PRUNE_STALE_LIKES") {
        if let Some(flag) = parse_flag(&v) {
            settings.prune_stale_likes = flag;
        }
    }

    if let Some(v) = lookup("APP__RESET_PAGE_ON_CHANGE") {
        if let Some(flag) = parse_flag(&v) {
            settings.reset_page_on_change = flag;
        }
    }

    if let Some(v) = lookup("APP__PAGE_OVERFLOW") {
        match PageOverflow::parse(&v) {
            Some(policy) => settings.page_overflow = policy,
            None => warn!("settings: ignoring APP__PAGE_OVERFLOW={v}"),
        }
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
