use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::path::PathBuf;
use tempo_core::error::CoreError;
use tempo_core::timezone::{validate_timezone, CalendarContext};

pub const CONFIG_FILE: &str = "tempo.toml";
pub const ENV_PREFIX: &str = "TEMPO_";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// JSON file holding every stored task
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Calendar used for all day arithmetic (IANA format)
    #[serde(default = "detect_system_timezone")]
    pub timezone: String,
    /// Days shown by `agenda` when no end date is given
    #[serde(default = "default_agenda_days")]
    pub agenda_days: u32,
    /// Occurrences shown by `preview` when no count is given
    #[serde(default = "default_preview_count")]
    pub preview_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            timezone: detect_system_timezone(),
            agenda_days: default_agenda_days(),
            preview_count: default_preview_count(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn calendar(&self) -> Result<CalendarContext, CoreError> {
        CalendarContext::from_name(&self.timezone)
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("tempo.json")
}

fn default_agenda_days() -> u32 {
    7
}

fn default_preview_count() -> usize {
    10
}

/// Detects the system timezone, falling back to UTC if detection fails
pub fn detect_system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(tz) = std::fs::read_to_string("/etc/timezone") {
            let tz = tz.trim();
            if validate_timezone(tz).is_ok() {
                return tz.to_string();
            }
        }
    }

    if let Ok(local_tz) = iana_time_zone::get_timezone() {
        if validate_timezone(&local_tz).is_ok() {
            return local_tz;
        }
    }

    "UTC".to_string()
}
