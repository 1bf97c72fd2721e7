//! Market price tool
//!
//! Live mandi prices from the data.gov.in AgMarkNet resource, with an
//! estimated-MSP fallback table when the API has nothing. Price analysis
//! (min/max/modal averages) rides along so the model can answer without
//! arithmetic.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use agrivoice_core::{Tool, ToolOutput, ToolParameter, ToolSchema, UserContext};

pub const TOOL_NAME: &str = "get_market_prices";
const RESOURCE_URL: &str =
    "https://api.data.gov.in/resource/35985678-0d79-46b4-9ed6-6f13308a1d24";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MARKET_LIMIT: usize = 10;

/// Common name → AgMarkNet commodity name
const COMMODITY_MAP: &[(&str, &str)] = &[
    ("rice", "Rice"),
    ("paddy", "Paddy(Dhan)(Common)"),
    ("wheat", "Wheat"),
    ("tomato", "Tomato"),
    ("onion", "Onion"),
    ("potato", "Potato"),
    ("cotton", "Cotton"),
    ("sugarcane", "Sugarcane"),
    ("maize", "Maize"),
    ("groundnut", "Groundnut"),
    ("ragi", "Ragi (Finger Millet)"),
    ("jowar", "Jowar(Sorghum)"),
    ("turmeric", "Turmeric"),
    ("chilli", "Chilly(Green)"),
    ("coconut", "Coconut"),
    ("arecanut", "Arecanut(Betelnut/Supari)"),
    ("coffee", "Coffee"),
    ("banana", "Banana"),
    ("mango", "Mango"),
];

/// Estimated prices in ₹/quintal, anchored on MSP where one exists
const ESTIMATED_PRICES: &[(&str, f64, f64, f64)] = &[
    ("rice", 2200.0, 2800.0, 2500.0),
    ("paddy", 2183.0, 2500.0, 2300.0),
    ("wheat", 2275.0, 2600.0, 2400.0),
    ("tomato", 1500.0, 4000.0, 2500.0),
    ("onion", 1200.0, 3500.0, 2000.0),
    ("potato", 800.0, 2000.0, 1200.0),
    ("cotton", 6620.0, 7500.0, 7000.0),
    ("sugarcane", 315.0, 400.0, 350.0),
    ("maize", 2090.0, 2400.0, 2200.0),
    ("groundnut", 6377.0, 7500.0, 6800.0),
    ("ragi", 3846.0, 4500.0, 4100.0),
    ("jowar", 3180.0, 3600.0, 3371.0),
    ("turmeric", 8000.0, 15000.0, 12000.0),
    ("chilli", 12000.0, 25000.0, 18000.0),
    ("coconut", 2500.0, 4000.0, 3200.0),
    ("arecanut", 45000.0, 55000.0, 50000.0),
    ("coffee", 8500.0, 12000.0, 10000.0),
    ("banana", 1500.0, 3000.0, 2200.0),
    ("mango", 3000.0, 8000.0, 5000.0),
];

/// Common commodity names the trigger lexicon can look for in user text
pub fn known_commodities() -> impl Iterator<Item = &'static str> {
    COMMODITY_MAP.iter().map(|(name, _)| *name)
}

/// Current mandi prices for a commodity
pub struct MarketPriceTool {
    client: Client,
    api_key: Option<String>,
    resource_url: String,
}

impl MarketPriceTool {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            resource_url: RESOURCE_URL.to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("DATA_GOV_API_KEY").ok())
    }

    fn api_name(commodity: &str) -> Option<&'static str> {
        let needle = commodity.trim().to_lowercase();
        COMMODITY_MAP
            .iter()
            .find(|(name, _)| *name == needle)
            .map(|(_, api)| *api)
    }

    /// Min/max/modal averages plus a one-line recommendation
    fn analyze(commodity: &str, prices: &[Value]) -> Value {
        let count = prices.len().max(1) as f64;
        let sum = |key: &str| -> f64 {
            prices
                .iter()
                .map(|p| p.get(key).and_then(Value::as_f64).unwrap_or(0.0))
                .sum::<f64>()
        };
        let avg_min = (sum("min_price") / count).round();
        let avg_max = (sum("max_price") / count).round();
        let avg_modal = (sum("modal_price") / count).round();
        json!({
            "avg_min_price": avg_min,
            "avg_max_price": avg_max,
            "avg_modal_price": avg_modal,
            "price_range": format!("₹{avg_min}–₹{avg_max} per quintal"),
            "recommendation": format!(
                "Typical {commodity} sells around ₹{avg_modal} per quintal; \
                 aim for markets trading near the upper range."
            ),
        })
    }

    fn estimated(commodity: &str, reason: &str) -> ToolOutput {
        tracing::warn!(%commodity, %reason, "market lookup degraded to estimated prices");
        let needle = commodity.trim().to_lowercase();
        let Some((_, min, max, modal)) = ESTIMATED_PRICES
            .iter()
            .find(|(name, _, _, _)| *name == needle)
        else {
            return ToolOutput::degraded(json!({
                "commodity": commodity,
                "prices": [],
                "total_markets": 0,
                "message": format!(
                    "No current prices found for {commodity}. Try a different commodity."
                ),
            }));
        };
        ToolOutput::degraded(json!({
            "commodity": commodity,
            "prices": [],
            "analysis": {
                "avg_min_price": min,
                "avg_max_price": max,
                "avg_modal_price": modal,
                "price_range": format!("₹{min}–₹{max} per quintal"),
                "recommendation": format!(
                    "Estimated {commodity} price is around ₹{modal} per quintal based on support prices."
                ),
            },
            "total_markets": 0,
            "source": "estimated",
            "message": "Estimated prices based on minimum support prices.",
        }))
    }

    async fn fetch(&self, api_key: &str, commodity: &str, state: Option<&str>) -> Option<Vec<Value>> {
        let mut query: Vec<(String, String)> = vec![
            ("api-key".into(), api_key.to_string()),
            ("format".into(), "json".into()),
            ("limit".into(), MARKET_LIMIT.to_string()),
            ("offset".into(), "0".into()),
            ("filters[commodity]".into(), commodity.to_string()),
        ];
        if let Some(state) = state {
            query.push(("filters[state]".into(), state.to_string()));
        }

        let response = self
            .client
            .get(&self.resource_url)
            .query(&query)
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body: Value = response.json().await.ok()?;
        let records = body.get("records")?.as_array()?;
        if records.is_empty() {
            return None;
        }

        // AgMarkNet ships numbers as strings
        let parse_price = |record: &Value, key: &str| -> f64 {
            record
                .get(key)
                .and_then(|v| {
                    v.as_f64()
                        .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
                })
                .unwrap_or(0.0)
        };

        Some(
            records
                .iter()
                .map(|r| {
                    json!({
                        "state": r.get("state").and_then(Value::as_str).unwrap_or(""),
                        "district": r.get("district").and_then(Value::as_str).unwrap_or(""),
                        "market": r.get("market").and_then(Value::as_str).unwrap_or(""),
                        "variety": r.get("variety").and_then(Value::as_str).unwrap_or(""),
                        "min_price": parse_price(r, "min_price"),
                        "max_price": parse_price(r, "max_price"),
                        "modal_price": parse_price(r, "modal_price"),
                        "date": r.get("arrival_date").and_then(Value::as_str).unwrap_or(""),
                    })
                })
                .collect(),
        )
    }
}

#[async_trait]
impl Tool for MarketPriceTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            purpose: "Get current mandi prices for agricultural commodities. \
                      Use when the user asks about prices, market rates, \
                      selling crops, or mandi rates."
                .into(),
            parameters: vec![
                ToolParameter::string("commodity", "Crop or commodity name, e.g. rice, tomato", true),
                ToolParameter::string("state", "State name to filter results", false),
            ],
            output: "per-market prices with min/max/modal analysis".into(),
        }
    }

    async fn run(&self, args: Value, ctx: &UserContext) -> ToolOutput {
        let commodity = args
            .get("commodity")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let Some(commodity) = commodity else {
            return ToolOutput::degraded(json!({
                "prices": [],
                "total_markets": 0,
                "message": "Please name a commodity, for example rice or tomato.",
            }));
        };

        let state = args
            .get("state")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| ctx.state.clone());

        let Some(api_key) = self.api_key.as_deref() else {
            return Self::estimated(&commodity, "data.gov.in key not configured");
        };
        let Some(api_name) = Self::api_name(&commodity) else {
            return Self::estimated(&commodity, "unmapped commodity");
        };

        match self.fetch(api_key, api_name, state.as_deref()).await {
            Some(prices) => {
                let analysis = Self::analyze(&commodity, &prices);
                let total = prices.len();
                ToolOutput::json(json!({
                    "commodity": commodity,
                    "prices": prices,
                    "analysis": analysis,
                    "total_markets": total,
                    "source": "agmarknet",
                    "as_of": Utc::now().to_rfc3339(),
                }))
            }
            None => Self::estimated(&commodity, "no live records"),
        }
    }
}
