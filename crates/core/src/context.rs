//! Per-user context supplied with a turn request
//!
//! Read-only location hints used to parameterize tool calls. The core never
//! mutates this.

use serde::{Deserialize, Serialize};

/// Optional location/crop hints attached to a turn request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub crops: Vec<String>,
}

impl UserContext {
    /// Best available place name for tools that need one
    pub fn best_location(&self) -> Option<&str> {
        self.district
            .as_deref()
            .or(self.location.as_deref())
            .or(self.state.as_deref())
    }
}
