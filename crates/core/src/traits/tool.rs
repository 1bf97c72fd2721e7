//! Tool contract types
//!
//! A tool is a named capability with a typed input/output contract. The
//! handler contract is strict: it never raises to its caller. Internal
//! failures must come back as well-formed degraded output so the
//! orchestrator can always proceed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::context::UserContext;

/// Parameter kinds a tool input contract can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    String,
    Number,
}

/// One declared input parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub kind: ParameterKind,
    pub description: String,
    pub required: bool,
}

impl ToolParameter {
    pub fn string(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::String,
            description: description.into(),
            required,
        }
    }

    pub fn number(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Number,
            description: description.into(),
            required,
        }
    }
}

/// Typed contract of a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Registry name, e.g. `get_weather`
    pub name: String,
    /// Human-readable purpose, also shown to tool-calling models
    pub purpose: String,
    /// Input contract
    pub parameters: Vec<ToolParameter>,
    /// One-line description of the output shape
    pub output: String,
}

impl ToolSchema {
    /// Render as a function declaration for providers with native tool
    /// calling (JSON-schema parameter object).
    pub fn to_definition(&self) -> ToolDefinition {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();
        for param in &self.parameters {
            let type_name = match param.kind {
                ParameterKind::String => "string",
                ParameterKind::Number => "number",
            };
            properties.insert(
                param.name.clone(),
                json!({ "type": type_name, "description": param.description }),
            );
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }
        ToolDefinition {
            name: self.name.clone(),
            description: self.purpose.clone(),
            parameters: json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }
}

/// Function declaration handed to a provider for model-initiated calling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// What a tool hands back. Always well-formed; `degraded` marks fallback
/// output produced after an internal failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub value: Value,
    #[serde(default)]
    pub degraded: bool,
}

impl ToolOutput {
    pub fn json(value: Value) -> Self {
        Self {
            value,
            degraded: false,
        }
    }

    /// Fallback output returned after the tool caught its own failure
    pub fn degraded(value: Value) -> Self {
        Self {
            value,
            degraded: true,
        }
    }

    /// Compact rendering folded into the per-turn system context
    pub fn to_context_block(&self) -> String {
        serde_json::to_string(&self.value).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A named, contract-bound domain capability.
///
/// `run` must not fail: implementations catch their own errors and return a
/// degraded default from their output contract instead.
#[async_trait]
pub trait Tool: Send + Sync {
    fn schema(&self) -> ToolSchema;

    fn name(&self) -> String {
        self.schema().name
    }

    async fn run(&self, args: Value, ctx: &UserContext) -> ToolOutput;
}

/// Name-keyed tool invocation, used by providers that select tools
/// themselves during generation. Implementations carry whatever per-turn
/// context the tools need; providers only see names and arguments.
#[async_trait]
pub trait ToolDispatcher: Send + Sync {
    /// Run the named tool; `None` when no such tool is registered.
    async fn dispatch(&self, name: &str, args: Value) -> Option<ToolOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_renders_json_schema_definition() {
        let schema = ToolSchema {
            name: "get_weather".into(),
            purpose: "Current weather for a location".into(),
            parameters: vec![
                ToolParameter::string("city", "City name", true),
                ToolParameter::string("state", "State name", false),
            ],
            output: "current conditions and forecast".into(),
        };
        let def = schema.to_definition();
        assert_eq!(def.name, "get_weather");
        assert_eq!(def.parameters["properties"]["city"]["type"], "string");
        assert_eq!(def.parameters["required"][0], "city");
    }

    #[test]
    fn degraded_output_is_marked() {
        let out = ToolOutput::degraded(json!({"message": "no data"}));
        assert!(out.degraded);
        assert!(out.to_context_block().contains("no data"));
    }
}
