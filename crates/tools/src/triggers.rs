//! Deterministic tool triggering
//!
//! Strategy (a) from the tool design: scan user text against per-tool
//! keyword sets maintained for all three supported languages, and derive
//! tool arguments from the text and the user context. Providers that can
//! call tools natively use strategy (b) instead; both run against the same
//! registered tools.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use agrivoice_core::UserContext;

use crate::{market, schemes, weather};

/// "weather in Mysore" / "Mysore weather"
static CITY_AFTER_IN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bin\s+([a-zA-Z][a-zA-Z ]*)").expect("static regex"));
static CITY_BEFORE_WEATHER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([a-zA-Z]+)\s+weather").expect("static regex"));

const WEATHER_KEYWORDS: &[&str] = &[
    // English
    "weather", "temperature", "rain", "humidity", "wind", "forecast",
    // Hindi
    "मौसम", "बारिश", "तापमान",
    // Kannada
    "ಹವಾಮಾನ", "ಮಳೆ", "ತಾಪಮಾನ",
];

const MARKET_KEYWORDS: &[&str] = &[
    // English
    "price", "prices", "market rate", "mandi", "selling",
    // Hindi
    "भाव", "कीमत", "मंडी",
    // Kannada
    "ಬೆಲೆ", "ಮಾರುಕಟ್ಟೆ", "ದರ",
];

const SCHEME_KEYWORDS: &[&str] = &[
    // English
    "scheme", "subsidy", "subsidies", "loan", "loans", "insurance", "pm-kisan", "kisan credit",
    // Hindi
    "योजना", "सब्सिडी", "ऋण", "बीमा",
    // Kannada
    "ಯೋಜನೆ", "ಸಬ್ಸಿಡಿ", "ಸಾಲ", "ವಿಮೆ",
];

/// A tool the lexicon decided to run, with derived arguments
#[derive(Debug, Clone, PartialEq)]
pub struct ToolTrigger {
    pub tool: String,
    pub args: Value,
}

/// Per-tool keyword sets with argument extraction
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerLexicon;

impl TriggerLexicon {
    pub fn new() -> Self {
        Self
    }

    /// Scan user text; at most one trigger per tool, in a stable order.
    pub fn scan(&self, text: &str, ctx: &UserContext) -> Vec<ToolTrigger> {
        let lowered = text.to_lowercase();
        let mut triggers = Vec::new();

        if contains_any(&lowered, WEATHER_KEYWORDS) {
            let mut args = json!({});
            if let Some(city) = extract_city(text).or_else(|| ctx.best_location().map(str::to_string))
            {
                args["city"] = json!(city);
            }
            triggers.push(ToolTrigger {
                tool: weather::TOOL_NAME.to_string(),
                args,
            });
        }

        if contains_any(&lowered, MARKET_KEYWORDS) {
            // Only trigger when a known commodity is actually named
            if let Some(commodity) = market::known_commodities().find(|c| lowered.contains(c)) {
                triggers.push(ToolTrigger {
                    tool: market::TOOL_NAME.to_string(),
                    args: json!({ "commodity": commodity }),
                });
            }
        }

        if contains_any(&lowered, SCHEME_KEYWORDS) {
            let category = if contains_any(&lowered, &["loan", "loans", "ऋण", "ಸಾಲ", "credit"]) {
                "loan"
            } else if contains_any(&lowered, &["insurance", "बीमा", "ವಿಮೆ", "bima"]) {
                "insurance"
            } else if contains_any(&lowered, &["subsidy", "subsidies", "सब्सिडी", "ಸಬ್ಸಿಡಿ"]) {
                "subsidy"
            } else {
                "general"
            };
            triggers.push(ToolTrigger {
                tool: schemes::TOOL_NAME.to_string(),
                args: json!({ "category": category }),
            });
        }

        triggers
    }
}

fn contains_any(lowered: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| lowered.contains(k))
}

fn extract_city(text: &str) -> Option<String> {
    // "in the morning" and friends are not places
    const STOPWORDS: &[&str] = &[
        "the", "my", "this", "that", "a", "an", "today", "tomorrow", "please", "now",
    ];

    let candidate = CITY_AFTER_IN
        .captures(text)
        .or_else(|| CITY_BEFORE_WEATHER.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())?;

    let words: Vec<&str> = candidate
        .split_whitespace()
        .take_while(|w| !STOPWORDS.contains(&w.to_lowercase().as_str()))
        .collect();
    if words.is_empty() {
        return None;
    }
    Some(words.join(" "))
}
