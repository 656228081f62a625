use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::FetchError,
    model::{Coordinates, WeatherReading},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.to_string(),
            http: Client::new(),
        }
    }

    async fn fetch_current(&self, coords: Coordinates) -> Result<WeatherReading, FetchError> {
        tracing::debug!(%coords, "requesting current weather");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        parse_current(&body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
}

/// Decode a current-weather body. Only the first condition is kept.
pub fn parse_current(body: &str) -> Result<WeatherReading, FetchError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)?;

    let first = parsed
        .weather
        .into_iter()
        .next()
        .ok_or(FetchError::NoConditions)?;

    Ok(WeatherReading {
        temperature_c: parsed.main.temp,
        humidity_pct: parsed.main.humidity,
        condition: first.main,
        description: first.description,
        location_name: parsed.name,
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn get_weather(&self, coords: Coordinates) -> Result<WeatherReading, FetchError> {
        self.fetch_current(coords).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SF_BODY: &str = r#"{"main":{"temp":18.456,"humidity":60},"weather":[{"main":"Clouds","description":"overcast"}],"name":"San Francisco"}"#;

    fn sf() -> Coordinates {
        Coordinates::new(37.7749, -122.4194)
    }

    #[test]
    fn parse_current_reads_first_condition() {
        let body = r#"{"main":{"temp":3.2,"humidity":91},
            "weather":[{"main":"Rain","description":"light rain"},{"main":"Mist","description":"mist"}],
            "name":"Oslo","visibility":8000}"#;

        let reading = parse_current(body).unwrap();
        assert_eq!(reading.condition, "Rain");
        assert_eq!(reading.description, "light rain");
        assert_eq!(reading.humidity_pct, 91);
        assert_eq!(reading.location_name, "Oslo");
    }

    #[test]
    fn parse_current_tolerates_missing_unused_fields() {
        let body = r#"{"main":{"temp":18.456},"weather":[{"main":"Clouds"}],"name":"San Francisco"}"#;

        let reading = parse_current(body).unwrap();
        assert_eq!(reading.humidity_pct, 0);
        assert_eq!(reading.description, "");
        assert_eq!(
            crate::format::format_reading(&reading),
            "🌡️ 18.5°C | Clouds | San Francisco"
        );
    }

    #[test]
    fn parse_current_rejects_empty_weather() {
        let body = r#"{"main":{"temp":1.0,"humidity":10},"weather":[],"name":"Nowhere"}"#;
        let err = parse_current(body).unwrap_err();
        assert!(matches!(err, FetchError::NoConditions));
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn parse_current_rejects_missing_or_mistyped_fields() {
        let missing = r#"{"main":{"temp":1.0,"humidity":10},"name":"Nowhere"}"#;
        assert_eq!(parse_current(missing).unwrap_err().kind(), ErrorKind::Parse);

        let mistyped = r#"{"main":{"temp":"warm","humidity":10},"weather":[],"name":"x"}"#;
        assert_eq!(parse_current(mistyped).unwrap_err().kind(), ErrorKind::Parse);

        assert_eq!(parse_current("<html>").unwrap_err().kind(), ErrorKind::Parse);
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let short = truncate_body(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), 203);
        assert_eq!(truncate_body("ok"), "ok");
    }

    #[tokio::test]
    async fn sends_coordinates_key_and_metric_units() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "37.7749"))
            .and(query_param("lon", "-122.4194"))
            .and(query_param("appid", "test_key"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SF_BODY))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/data/2.5/weather", mock_server.uri());
        let provider = OpenWeatherProvider::with_base_url("test_key".into(), &url);
        let reading = provider.get_weather(sf()).await.unwrap();

        assert!((reading.temperature_c - 18.456).abs() < 1e-9);
        assert_eq!(reading.condition, "Clouds");
        assert_eq!(reading.location_name, "San Francisco");
    }

    #[tokio::test]
    async fn non_success_status_is_network_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string(r#"{"cod":401,"message":"Invalid API key"}"#),
            )
            .mount(&mock_server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("bad".into(), &mock_server.uri());
        let err = provider.get_weather(sf()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.to_string().contains("Invalid API key"));
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"cod":"200"}"#))
            .mount(&mock_server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("key".into(), &mock_server.uri());
        let err = provider.get_weather(sf()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        // Grab a free port and release it so nothing is listening there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let uri = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let provider = OpenWeatherProvider::with_base_url("key".into(), &uri);
        let err = provider.get_weather(sf()).await.unwrap_err();

        assert!(matches!(err, FetchError::Request(_)));
        assert_eq!(err.kind(), ErrorKind::Network);
    }
}
