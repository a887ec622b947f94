use std::collections::HashMap;
use std::env;

use crate::error::ConfigError;

const DEFAULT_SCAN_DURATION_SECS: u64 = 20;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
const DEFAULT_STALE_AFTER_SECS: u64 = 900; // 15 minutes without an advertisement

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Lowercase MAC -> name; empty means every supported sensor is reported
    pub sensors: HashMap<String, String>,
    pub scan_duration_secs: u64,
    pub poll_interval_secs: u64,
    pub stale_after_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            sensors: HashMap::new(),
            scan_duration_secs: DEFAULT_SCAN_DURATION_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            stale_after_secs: DEFAULT_STALE_AFTER_SECS,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from the environment, reading `.env` first if present
    pub fn new() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = MonitorConfig::default();

        if let Some(sensors) = lookup("ATC_SENSORS") {
            config.sensors = parse_sensors(&sensors)?;
        }

        config.scan_duration_secs = parse_seconds(
            &lookup,
            "ATC_SCAN_DURATION_SECS",
            DEFAULT_SCAN_DURATION_SECS,
        )?;
        config.poll_interval_secs = parse_seconds(
            &lookup,
            "ATC_POLL_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL_SECS,
        )?;
        config.stale_after_secs =
            parse_seconds(&lookup, "ATC_STALE_AFTER_SECS", DEFAULT_STALE_AFTER_SECS)?;

        if config.poll_interval_secs < config.scan_duration_secs {
            return Err(ConfigError::PollShorterThanScan {
                poll: config.poll_interval_secs,
                scan: config.scan_duration_secs,
            });
        }

        Ok(config)
    }

    /// Whether an address should be reported at all
    pub fn is_wanted(&self, address: &str) -> bool {
        self.sensors.is_empty() || self.sensors.contains_key(&address.to_lowercase())
    }

    /// Configured name for an address, if any
    pub fn sensor_name(&self, address: &str) -> Option<&str> {
        self.sensors
            .get(&address.to_lowercase())
            .map(String::as_str)
    }
}

/// Parse `MAC=NAME,MAC=NAME`; blank items are skipped
fn parse_sensors(value: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut sensors = HashMap::new();

    for pair in value.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (mac, name) = pair
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidSensorEntry(pair.to_string()))?;
        let (mac, name) = (mac.trim(), name.trim());
        if mac.is_empty() || name.is_empty() {
            return Err(ConfigError::InvalidSensorEntry(pair.to_string()));
        }
        sensors.insert(mac.to_lowercase(), name.to_string());
    }

    Ok(sensors)
}

fn parse_seconds<F>(lookup: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name) else {
        return Ok(default);
    };

    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidSeconds { name, value }),
    }
}
