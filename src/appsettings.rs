use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct AlarmSettings {
    pub pulse_interval_ms: u64,
    pub title: String,
    pub body: String,
}

impl AlarmSettings {
    pub fn pulse_interval(&self) -> anyhow::Result<Duration> {
        anyhow::ensure!(
            self.pulse_interval_ms > 0,
            "alarm.pulse_interval_ms must be greater than zero"
        );

        Ok(Duration::from_millis(self.pulse_interval_ms))
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct PlatformSettings {
    pub timezone: String,
    pub grant_authorization: bool,
    pub foreground: bool,
}

impl PlatformSettings {
    pub fn timezone(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|error| anyhow::anyhow!("Invalid timezone {:?}: {error}", self.timezone))
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    pub alarm: AlarmSettings,
    pub platform: PlatformSettings,
}

impl AppSettings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name("appsettings").required(false))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("alarm.pulse_interval_ms", 2000)?
            .set_default("alarm.title", "GetUpPlease")?
            .set_default("alarm.body", "Time to wake up!")?
            .set_default("platform.timezone", "UTC")?
            .set_default("platform.grant_authorization", true)?
            .set_default("platform.foreground", true)
    }
}
