use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use crate::constants::USER_AGENT;
use crate::error::EnrichmentError;
use crate::models::{CurrentWeatherResponse, WeatherSnapshot};

/// Connection settings for the weather provider
#[derive(Debug, Clone)]
pub struct WeatherSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub units: String,
    pub timeout: Duration,
}

/// Fetches current conditions used to pre-fill the prediction form
#[derive(Clone)]
pub struct WeatherClient {
    client: Arc<Client>,
    settings: WeatherSettings,
}

impl WeatherClient {
    /// Creates a new client with the configured request timeout
    pub fn new(settings: WeatherSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            settings,
        })
    }

    /// Makes an HTTP GET request and deserializes the JSON response
    async fn make_request<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.client.get(url).query(query).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Request failed with status: {}", response.status());
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Current conditions for `city`, or `None` on any failure.
    ///
    /// Failures are logged and never reach the caller.
    pub async fn fetch_current(&self, city: &str) -> Option<WeatherSnapshot> {
        match self.try_fetch_current(city).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Weather enrichment for {} failed: {}", city, e);
                None
            }
        }
    }

    pub async fn try_fetch_current(&self, city: &str) -> Result<WeatherSnapshot, EnrichmentError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(EnrichmentError::MissingApiKey)?;

        tracing::info!("Fetching current weather for {}", city);

        let url = format!("{}/weather", self.settings.base_url.trim_end_matches('/'));
        let response = self
            .make_request::<CurrentWeatherResponse>(
                &url,
                &[("q", city), ("appid", api_key), ("units", self.settings.units.as_str())],
            )
            .await?;

        snapshot_from_response(city, response)
    }
}

/// Extracts model features from a provider response.
///
/// Visibility arrives in metres. A missing gust is replaced by the wind speed;
/// a missing `sea_level` falls back to `pressure`, which the provider reports
/// at sea level when no separate reading exists.
pub fn snapshot_from_response(
    city: &str,
    response: CurrentWeatherResponse,
) -> Result<WeatherSnapshot, EnrichmentError> {
    let main = response.main.ok_or(EnrichmentError::MissingField("main"))?;
    let wind = response.wind.ok_or(EnrichmentError::MissingField("wind"))?;
    let wind_speed = wind.speed.ok_or(EnrichmentError::MissingField("wind.speed"))?;
    let visibility_m = response
        .visibility
        .ok_or(EnrichmentError::MissingField("visibility"))?;

    Ok(WeatherSnapshot {
        location: response.name.unwrap_or_else(|| city.to_string()),
        temperature: main.temp.ok_or(EnrichmentError::MissingField("main.temp"))?,
        max_temperature: main
            .temp_max
            .ok_or(EnrichmentError::MissingField("main.temp_max"))?,
        min_temperature: main
            .temp_min
            .ok_or(EnrichmentError::MissingField("main.temp_min"))?,
        sea_level_pressure: main
            .sea_level
            .or(main.pressure)
            .ok_or(EnrichmentError::MissingField("main.pressure"))?,
        humidity: main
            .humidity
            .ok_or(EnrichmentError::MissingField("main.humidity"))?,
        visibility_km: visibility_m / 1000.0,
        wind_speed,
        max_wind_gust: wind.gust.unwrap_or(wind_speed),
    })
}
