use async_trait::async_trait;
use serde::Deserialize;
use crate::error::{Error, Result};
use crate::providers::http::{join_url, HttpClient};
use crate::providers::WeatherProvider;
use crate::store::{HistoryPoint, WeatherNow, WeatherRecord, WeatherSample};
use crate::types::Timestamp;

/// OpenWeatherMap current-conditions and forecast client (metric units).
pub struct OpenWeatherClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(http: HttpClient, base_url: &str, api_key: &str) -> Self {
        OpenWeatherClient {
            http,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Numeric locations are provider city ids, anything else a city name.
    fn query(&self, location: &str) -> Vec<(&'static str, String)> {
        let selector = if !location.is_empty() && location.chars().all(|c| c.is_ascii_digit()) {
            ("id", location.to_string())
        } else {
            ("q", location.to_string())
        };

        vec![
            selector,
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
        ]
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, location: &str) -> Result<WeatherRecord> {
        let url = join_url(&self.base_url, "weather");
        let data: OwmCurrent = self.http.get_json(&url, &self.query(location)).await?;

        let condition = data.weather.into_iter().next()
            .ok_or_else(|| Error::Payload(format!("no weather conditions for {}", location)))?;

        Ok(WeatherRecord::new(data.id.to_string(), data.name, WeatherNow {
            temperature: data.main.temp,
            humidity: data.main.humidity,
            description: condition.description,
            icon: condition.icon,
            lat: data.coord.lat,
            lon: data.coord.lon,
        }))
    }

    async fn forecast(&self, location: &str) -> Result<Vec<HistoryPoint<WeatherSample>>> {
        let url = join_url(&self.base_url, "forecast");
        let data: OwmForecast = self.http.get_json(&url, &self.query(location)).await?;

        let mut points: Vec<_> = data.list.into_iter()
            .map(|item| HistoryPoint::new(
                Timestamp::from_secs(item.dt),
                WeatherSample {
                    temperature: item.main.temp,
                    humidity: item.main.humidity,
                },
            ))
            .collect();
        points.sort_by_key(|p| p.at);
        Ok(points)
    }
}

#[derive(Deserialize)]
struct OwmCurrent {
    id: u64,
    name: String,
    coord: OwmCoord,
    weather: Vec<OwmCondition>,
    main: OwmMain,
}

#[derive(Deserialize)]
struct OwmCoord {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct OwmCondition {
    description: String,
    icon: String,
}

#[derive(Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
}

#[derive(Deserialize)]
struct OwmForecast {
    list: Vec<OwmForecastItem>,
}

#[derive(Deserialize)]
struct OwmForecastItem {
    dt: u64,
    main: OwmMain,
}
