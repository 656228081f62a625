use crate::{
    Config, Coordinates, WeatherReading, error::FetchError, format::display_text,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_weather(&self, coords: Coordinates) -> Result<WeatherReading, FetchError>;
}

/// Fetch one reading and collapse it into label text.
///
/// Failures are logged with their cause and then reduced to one of the two
/// static error messages.
pub async fn fetch_display(provider: &dyn WeatherProvider, coords: Coordinates) -> String {
    let result = provider.get_weather(coords).await;
    match &result {
        Ok(reading) => tracing::info!(
            temperature_c = reading.temperature_c,
            condition = %reading.condition,
            location = %reading.location_name,
            "weather updated"
        ),
        Err(err) => tracing::warn!(error = %err, kind = ?err.kind(), "weather fetch failed"),
    }
    display_text(&result)
}

/// Construct the OpenWeather provider from config.
///
/// The key comes from `WEATHERBAR_API_KEY` when set, otherwise from the
/// config file.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.resolve_api_key()?;
    Ok(Arc::new(OpenWeatherProvider::with_base_url(api_key, &config.base_url)))
}
