//! Government scheme advisory tool
//!
//! Static advisory data for subsidies, loans, and insurance, with a couple
//! of Karnataka-specific additions. No network dependency, so this tool
//! never degrades.

use async_trait::async_trait;
use serde_json::{json, Value};

use agrivoice_core::{Tool, ToolOutput, ToolParameter, ToolSchema, UserContext};

pub const TOOL_NAME: &str = "get_scheme_info";

struct Scheme {
    name: &'static str,
    description: &'static str,
    eligibility: &'static str,
    benefits: &'static str,
    how_to_apply: &'static str,
}

impl Scheme {
    fn to_value(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "eligibility": self.eligibility,
            "benefits": self.benefits,
            "how_to_apply": self.how_to_apply,
        })
    }
}

const SUBSIDY: &[Scheme] = &[
    Scheme {
        name: "PM-KISAN",
        description: "Direct income support of ₹6000 per year to farmer families in three equal installments",
        eligibility: "All land-holding farmer families with cultivable land",
        benefits: "₹6000 per year transferred directly to the bank account",
        how_to_apply: "Apply online at pmkisan.gov.in or through CSC centers",
    },
    Scheme {
        name: "Soil Health Card Scheme",
        description: "Free soil testing with crop-wise fertilizer recommendations",
        eligibility: "All farmers",
        benefits: "Free soil health card every two years, reduced input costs",
        how_to_apply: "Contact the nearest Krishi Vigyan Kendra or agriculture department",
    },
    Scheme {
        name: "PM-KUSUM",
        description: "Subsidized solar pumps and grid-connected solar plants for farms",
        eligibility: "Farmers with agricultural land suitable for solar pump installation",
        benefits: "Up to 60% subsidy on solar pumps plus income from surplus power",
        how_to_apply: "Apply through the state nodal agency or the MNRE portal",
    },
];

const LOAN: &[Scheme] = &[
    Scheme {
        name: "Kisan Credit Card (KCC)",
        description: "Affordable, timely credit for agriculture and allied activities",
        eligibility: "Farmers, tenant farmers, sharecroppers, fishermen, and dairy farmers",
        benefits: "Credit up to ₹3 lakh at 4% effective interest with accident insurance",
        how_to_apply: "Apply at any commercial, cooperative, or regional rural bank with land documents",
    },
    Scheme {
        name: "Agriculture Infrastructure Fund",
        description: "Medium to long-term financing for post-harvest infrastructure",
        eligibility: "FPOs, PACS, farmers, agri-entrepreneurs",
        benefits: "3% interest subvention on loans up to ₹2 crore",
        how_to_apply: "Apply through the agriinfra.dac.gov.in portal",
    },
];

const INSURANCE: &[Scheme] = &[
    Scheme {
        name: "PM Fasal Bima Yojana",
        description: "Crop insurance against yield losses from calamities, pests, and disease",
        eligibility: "All farmers growing notified crops",
        benefits: "Full coverage for 1.5–2% premium on food crops; government pays the rest",
        how_to_apply: "Apply through your bank, CSC, or the pmfby.gov.in portal before cut-off dates",
    },
    Scheme {
        name: "Weather Based Crop Insurance",
        description: "Insurance with automatic claim triggers from weather station data",
        eligibility: "Farmers in notified areas growing notified crops",
        benefits: "Quick settlement without crop-cutting experiments",
        how_to_apply: "Apply through banks or insurance companies",
    },
];

const GENERAL: &[Scheme] = &[
    Scheme {
        name: "e-NAM",
        description: "Pan-India electronic trading portal linking mandis for transparent price discovery",
        eligibility: "All farmers, traders, and FPOs",
        benefits: "Better price discovery and direct payment to the bank",
        how_to_apply: "Register at enam.gov.in with Aadhaar and bank details",
    },
    Scheme {
        name: "Paramparagat Krishi Vikas Yojana",
        description: "Cluster-based organic farming with PGS certification",
        eligibility: "Farmers adopting organic farming in clusters of 50 or more",
        benefits: "₹50,000 per hectare over three years for inputs and certification",
        how_to_apply: "Form a cluster and apply through the state agriculture department",
    },
];

const KARNATAKA_SUBSIDY: &[Scheme] = &[Scheme {
    name: "Krishi Bhagya Scheme",
    description: "Farm ponds, polyhouses, and shade nets for drought-proofing in Karnataka",
    eligibility: "Karnataka farmers with at least half an acre of land",
    benefits: "Up to 90% subsidy on farm ponds, with polyhouse and shade net support",
    how_to_apply: "Apply through Raitha Samparka Kendras",
}];

/// Scheme/subsidy/loan advisory
pub struct SchemeAdvisoryTool;

impl SchemeAdvisoryTool {
    pub fn new() -> Self {
        Self
    }

    fn schemes_for(category: &str, state: Option<&str>) -> Vec<Value> {
        let base: &[Scheme] = match category {
            "subsidy" => SUBSIDY,
            "loan" => LOAN,
            "insurance" => INSURANCE,
            _ => GENERAL,
        };
        let mut schemes: Vec<Value> = base.iter().map(Scheme::to_value).collect();
        let in_karnataka = state
            .map(|s| s.to_lowercase().contains("karnataka"))
            .unwrap_or(false);
        if category == "subsidy" && in_karnataka {
            schemes.extend(KARNATAKA_SUBSIDY.iter().map(Scheme::to_value));
        }
        schemes
    }
}

impl Default for SchemeAdvisoryTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SchemeAdvisoryTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            purpose: "Get information about government schemes, subsidies, loans, \
                      and crop insurance for farmers. Use when the user asks about \
                      schemes, subsidies, PM-KISAN, loans, or financial help."
                .into(),
            parameters: vec![
                ToolParameter::string(
                    "category",
                    "One of: subsidy, loan, insurance, general",
                    true,
                ),
                ToolParameter::string("state", "State for state-specific schemes", false),
            ],
            output: "schemes with eligibility, benefits, and application steps".into(),
        }
    }

    async fn run(&self, args: Value, ctx: &UserContext) -> ToolOutput {
        let category = args
            .get("category")
            .and_then(Value::as_str)
            .map(|c| c.trim().to_lowercase())
            .unwrap_or_else(|| "general".to_string());
        let state = args
            .get("state")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| ctx.state.clone());

        let schemes = Self::schemes_for(&category, state.as_deref());
        ToolOutput::json(json!({
            "category": category,
            "schemes": schemes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn karnataka_gets_state_scheme() {
        let tool = SchemeAdvisoryTool::new();
        let out = tool
            .run(
                json!({ "category": "subsidy", "state": "Karnataka" }),
                &UserContext::default(),
            )
            .await;
        assert!(!out.degraded);
        let names: Vec<&str> = out.value["schemes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"Krishi Bhagya Scheme"));
    }

    #[tokio::test]
    async fn unknown_category_falls_back_to_general() {
        let tool = SchemeAdvisoryTool::new();
        let out = tool
            .run(json!({ "category": "weather" }), &UserContext::default())
            .await;
        assert_eq!(out.value["schemes"][0]["name"], "e-NAM");
    }

    #[tokio::test]
    async fn loan_category_lists_kcc() {
        let tool = SchemeAdvisoryTool::new();
        let out = tool
            .run(json!({ "category": "loan" }), &UserContext::default())
            .await;
        assert_eq!(out.value["schemes"][0]["name"], "Kisan Credit Card (KCC)");
    }
}
