use std::env;

use crate::data::range::DisplayZone;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Runtime configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_API_URL: &str = "http://localhost:5001";
pub const DEFAULT_STRAIN_CHANNELS: usize = 17;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the processing backend, without a trailing slash.
    pub api_url: String,
    /// Zone used to interpret filter bounds and label the time axis.
    pub zone: DisplayZone,
    /// Number of `Strain(n)` channels offered in the selector.
    pub strain_channels: usize,
    /// Smaller charts and tighter spacing.
    pub compact: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            zone: DisplayZone::Local,
            strain_channels: DEFAULT_STRAIN_CHANNELS,
            compact: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, reading `.env` first.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_url = lookup("BRIDGE_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_url);

        let zone = match lookup("BRIDGE_TIMEZONE") {
            Some(value) => DisplayZone::parse(&value).ok_or(ConfigError::Invalid {
                var: "BRIDGE_TIMEZONE",
                value,
            })?,
            None => defaults.zone,
        };

        let strain_channels = match lookup("BRIDGE_STRAIN_CHANNELS") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    var: "BRIDGE_STRAIN_CHANNELS",
                    value,
                })?,
            None => defaults.strain_channels,
        };

        let compact = match lookup("BRIDGE_COMPACT") {
            Some(value) => parse_flag(&value).ok_or(ConfigError::Invalid {
                var: "BRIDGE_COMPACT",
                value,
            })?,
            None => defaults.compact,
        };

        Ok(Self {
            api_url,
            zone,
            strain_channels,
            compact,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
