//! Weather tool
//!
//! Geocodes the city, then pulls current conditions and a 7-day forecast.
//! Any failure along the way — missing keys, geocoding miss, upstream error —
//! resolves to a fixed fallback payload so the orchestrator always has
//! conditions to ground the answer in.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use agrivoice_core::{Tool, ToolOutput, ToolParameter, ToolSchema, UserContext};

pub const TOOL_NAME: &str = "get_weather";
const DEFAULT_CITY: &str = "Bengaluru";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Current weather and forecast for a location
pub struct WeatherTool {
    client: Client,
    openweather_key: Option<String>,
    locationiq_key: Option<String>,
    geocode_url: String,
    weather_url: String,
}

impl WeatherTool {
    pub fn new(openweather_key: Option<String>, locationiq_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            openweather_key,
            locationiq_key,
            geocode_url: "https://us1.locationiq.com/v1/search.php".to_string(),
            weather_url: "https://api.openweathermap.org/data/2.5/onecall".to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::var("OPENWEATHER_API_KEY").ok(),
            std::env::var("LOCATIONIQ_API_KEY").ok(),
        )
    }

    fn uvi_description(uvi: f64) -> &'static str {
        if uvi < 3.0 {
            "Low"
        } else if uvi < 6.0 {
            "Moderate"
        } else if uvi < 8.0 {
            "High"
        } else if uvi < 11.0 {
            "Very High"
        } else {
            "Extreme"
        }
    }

    /// Fixed conditions used whenever live data is unreachable
    fn fallback(location: &str, reason: &str) -> ToolOutput {
        tracing::warn!(%location, %reason, "weather lookup degraded to fallback data");
        ToolOutput::degraded(json!({
            "location": location,
            "current": {
                "temp_c": 28,
                "feels_like_c": 30,
                "humidity_pct": 75,
                "wind_kmh": 12,
                "condition": "Haze",
                "description": "Light haze",
                "uv_index": "High",
            },
            "forecast": [
                { "day": "Mon", "temp_c": 30, "condition": "Clouds" },
                { "day": "Tue", "temp_c": 31, "condition": "Clear" },
                { "day": "Wed", "temp_c": 29, "condition": "Rain" },
                { "day": "Thu", "temp_c": 32, "condition": "Clear" },
                { "day": "Fri", "temp_c": 30, "condition": "Clouds" },
                { "day": "Sat", "temp_c": 28, "condition": "Rain" },
                { "day": "Sun", "temp_c": 29, "condition": "Clouds" },
            ],
            "alerts": ["Unable to fetch live weather data"],
            "message": format!("Showing typical conditions for {location}."),
        }))
    }

    async fn geocode(&self, key: &str, query: &str) -> Option<(f64, f64, String)> {
        let response = self
            .client
            .get(&self.geocode_url)
            .query(&[("key", key), ("q", query), ("format", "json")])
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body: Value = response.json().await.ok()?;
        let first = body.as_array()?.first()?;
        let lat = first.get("lat")?.as_str()?.parse().ok()?;
        let lon = first.get("lon")?.as_str()?.parse().ok()?;
        let display = first
            .get("display_name")
            .and_then(Value::as_str)
            .unwrap_or(query)
            .split(',')
            .take(2)
            .collect::<Vec<_>>()
            .join(",");
        Some((lat, lon, display))
    }

    async fn fetch(&self, key: &str, lat: f64, lon: f64) -> Option<Value> {
        let response = self
            .client
            .get(&self.weather_url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("exclude", "minutely,hourly".to_string()),
                ("appid", key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json().await.ok()
    }

    fn shape(location: &str, data: &Value) -> Option<Value> {
        let current = data.get("current")?;
        let uvi = current.get("uvi").and_then(Value::as_f64).unwrap_or(0.0);
        let weather = current.pointer("/weather/0")?;

        let forecast: Vec<Value> = data
            .get("daily")
            .and_then(Value::as_array)
            .map(|days| {
                days.iter()
                    .take(7)
                    .enumerate()
                    .map(|(i, day)| {
                        const NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
                        json!({
                            "day": NAMES[i % 7],
                            "temp_c": day.pointer("/temp/day").and_then(Value::as_f64).unwrap_or(0.0).round(),
                            "condition": day.pointer("/weather/0/main").and_then(Value::as_str).unwrap_or("Unknown"),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let alerts: Vec<Value> = data
            .get("alerts")
            .and_then(Value::as_array)
            .map(|alerts| {
                alerts
                    .iter()
                    .filter_map(|a| a.get("event").and_then(Value::as_str))
                    .map(|event| json!(event))
                    .collect()
            })
            .unwrap_or_default();

        Some(json!({
            "location": location,
            "current": {
                "temp_c": current.get("temp").and_then(Value::as_f64)?.round(),
                "feels_like_c": current.get("feels_like").and_then(Value::as_f64).unwrap_or(0.0).round(),
                "humidity_pct": current.get("humidity").and_then(Value::as_f64).unwrap_or(0.0),
                "wind_kmh": current.get("wind_speed").and_then(Value::as_f64).unwrap_or(0.0).round(),
                "condition": weather.get("main").and_then(Value::as_str).unwrap_or("Unknown"),
                "description": weather.get("description").and_then(Value::as_str).unwrap_or(""),
                "uv_index": Self::uvi_description(uvi),
            },
            "forecast": forecast,
            "alerts": alerts,
        }))
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            purpose: "Get current weather and 7-day forecast for a location. \
                      Use when the user asks about weather, rain, temperature, \
                      humidity, or farming conditions."
                .into(),
            parameters: vec![
                ToolParameter::string("city", "City name", true),
                ToolParameter::string("state", "State name", false),
            ],
            output: "current conditions, 7-day forecast, and weather alerts".into(),
        }
    }

    async fn run(&self, args: Value, ctx: &UserContext) -> ToolOutput {
        let city = args
            .get("city")
            .and_then(Value::as_str)
            .filter(|c| !c.trim().is_empty())
            .map(str::to_string)
            .or_else(|| ctx.best_location().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_CITY.to_string());
        let state = args
            .get("state")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| ctx.state.clone());

        let query = match &state {
            Some(state) => format!("{city},{state},IN"),
            None => format!("{city},IN"),
        };

        let (Some(ow_key), Some(liq_key)) = (&self.openweather_key, &self.locationiq_key) else {
            return Self::fallback(&city, "weather API keys not configured");
        };

        let Some((lat, lon, display)) = self.geocode(liq_key, &query).await else {
            return Self::fallback(&city, "geocoding failed");
        };

        let Some(data) = self.fetch(ow_key, lat, lon).await else {
            return Self::fallback(&display, "weather fetch failed");
        };

        match Self::shape(&display, &data) {
            Some(value) => ToolOutput::json(value),
            None => Self::fallback(&display, "unexpected weather payload"),
        }
    }
}
