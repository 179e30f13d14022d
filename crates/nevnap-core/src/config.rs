//! Client configuration.
//!
//! The original behavior hardcoded the service URL and inherited the host
//! environment's locale for the header strings; both are explicit here so
//! that tests can point the client at a local mock server and weekday
//! formatting stays deterministic regardless of where the process runs.

use std::str::FromStr;
use std::time::Duration;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.nevnapok.eu";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed output locale for weekday names. The ambient process locale is
/// never consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Hungarian,
    English,
}

impl Locale {
    pub fn weekday_name(&self, weekday: Weekday) -> &'static str {
        match self {
            Locale::Hungarian => match weekday {
                Weekday::Mon => "hétfő",
                Weekday::Tue => "kedd",
                Weekday::Wed => "szerda",
                Weekday::Thu => "csütörtök",
                Weekday::Fri => "péntek",
                Weekday::Sat => "szombat",
                Weekday::Sun => "vasárnap",
            },
            Locale::English => match weekday {
                Weekday::Mon => "Monday",
                Weekday::Tue => "Tuesday",
                Weekday::Wed => "Wednesday",
                Weekday::Thu => "Thursday",
                Weekday::Fri => "Friday",
                Weekday::Sat => "Saturday",
                Weekday::Sun => "Sunday",
            },
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hu" | "hungarian" => Ok(Locale::Hungarian),
            "en" | "english" => Ok(Locale::English),
            other => Err(format!("unknown locale '{}', expected 'hu' or 'en'", other)),
        }
    }
}

/// Settings for a [`crate::NameDayClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the name day service, without a trailing slash.
    pub api_base: String,
    /// Per-request timeout; bounds how long a refresh can stay pending.
    pub timeout: Duration,
    /// Locale used for weekday names in display labels.
    pub locale: Locale,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            locale: Locale::Hungarian,
        }
    }
}

impl ClientConfig {
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base, "https://api.nevnapok.eu");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.locale, Locale::Hungarian);
    }

    #[test]
    fn test_builders_replace_fields() {
        let config = ClientConfig::default()
            .with_api_base("http://127.0.0.1:9000")
            .with_timeout(Duration::from_secs(5))
            .with_locale(Locale::English);
        assert_eq!(config.api_base, "http://127.0.0.1:9000");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.locale, Locale::English);
    }

    #[test]
    fn test_locale_parsing() {
        assert_eq!("hu".parse::<Locale>().unwrap(), Locale::Hungarian);
        assert_eq!("Hungarian".parse::<Locale>().unwrap(), Locale::Hungarian);
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::English);
        assert!("fr".parse::<Locale>().is_err());
    }
}
