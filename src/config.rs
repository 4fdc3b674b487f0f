use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::constants::{
    DEFAULT_BIND, DEFAULT_CITY, DEFAULT_DB_PATH, DEFAULT_MODEL_PATH, DEFAULT_UNITS,
    DEFAULT_WEATHER_TIMEOUT_SECS, OPENWEATHER_API_BASE,
};
use crate::service::WeatherSettings;

/// PM2.5 prediction service with cardiac-patient advisories.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "PM25_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Path to the JSON regression model artifact
    #[arg(long, env = "PM25_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,

    /// SQLite file holding the prediction audit log
    #[arg(long, env = "PM25_DB_PATH", default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    /// OpenWeatherMap API key. Without it the index view has no live weather.
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub weather_api_key: Option<String>,

    /// Base URL of the OpenWeatherMap-compatible API
    #[arg(long, env = "PM25_WEATHER_BASE_URL", default_value = OPENWEATHER_API_BASE)]
    pub weather_base_url: String,

    /// City used to pre-fill the index view
    #[arg(long, env = "PM25_CITY", default_value = DEFAULT_CITY)]
    pub city: String,

    /// Unit system requested from the weather provider
    #[arg(long, env = "PM25_UNITS", default_value = DEFAULT_UNITS)]
    pub units: String,

    /// Weather request timeout in seconds
    #[arg(long, env = "PM25_WEATHER_TIMEOUT_SECS", default_value_t = DEFAULT_WEATHER_TIMEOUT_SECS)]
    pub weather_timeout_secs: u64,
}

impl Config {
    pub fn weather_settings(&self) -> WeatherSettings {
        WeatherSettings {
            api_key: self.weather_api_key.clone(),
            base_url: self.weather_base_url.clone(),
            units: self.units.clone(),
            timeout: Duration::from_secs(self.weather_timeout_secs),
        }
    }
}
