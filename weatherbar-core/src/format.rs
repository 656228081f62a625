//! Rendering readings and failures into the one-line label text.

use crate::{error::FetchError, model::WeatherReading};

/// Label text before the first fetch completes.
pub const LOADING_TEXT: &str = "Loading weather...";

const THERMOMETER: &str = "\u{1F321}\u{FE0F}";

/// `"🌡️ 18.5°C | Clouds | San Francisco"`
pub fn format_reading(reading: &WeatherReading) -> String {
    format!(
        "{THERMOMETER} {:.1}°C | {} | {}",
        reading.temperature_c, reading.condition, reading.location_name
    )
}

/// Collapse a fetch result into the text the label should show.
pub fn display_text(result: &Result<WeatherReading, FetchError>) -> String {
    match result {
        Ok(reading) => format_reading(reading),
        Err(err) => err.kind().message().to_string(),
    }
}
