//! Tool registry
//!
//! Name-keyed registration and execution. Execution is wrapped in a timeout;
//! because tools never fail outward, a timeout also resolves to degraded
//! output rather than an error.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use agrivoice_core::{Tool, ToolDefinition, ToolDispatcher, ToolOutput, ToolSchema, UserContext};

const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Tool registry
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    timeout: Duration,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Register a tool under its schema name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name();
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn register_boxed(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name();
        self.tools.insert(name, tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    /// Function declarations for providers with native tool calling
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.schema().to_definition()).collect()
    }

    /// Run a registered tool under the registry timeout. `None` only when
    /// the name is unknown; everything else is a well-formed output.
    pub async fn execute(&self, name: &str, args: Value, ctx: &UserContext) -> Option<ToolOutput> {
        let tool = self.tools.get(name)?;

        tracing::trace!(tool = name, timeout_secs = self.timeout.as_secs(), "executing tool");
        match tokio::time::timeout(self.timeout, tool.run(args, ctx)).await {
            Ok(output) => Some(output),
            Err(_elapsed) => {
                tracing::warn!(tool = name, "tool timed out, returning degraded output");
                Some(ToolOutput::degraded(json!({
                    "message": format!("{name} did not answer in time"),
                })))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A registry bound to one turn's user context, for model-initiated calls
pub struct ScopedDispatcher<'a> {
    registry: &'a ToolRegistry,
    ctx: &'a UserContext,
}

impl<'a> ScopedDispatcher<'a> {
    pub fn new(registry: &'a ToolRegistry, ctx: &'a UserContext) -> Self {
        Self { registry, ctx }
    }
}

#[async_trait]
impl ToolDispatcher for ScopedDispatcher<'_> {
    async fn dispatch(&self, name: &str, args: Value) -> Option<ToolOutput> {
        self.registry.execute(name, args, self.ctx).await
    }
}

/// Registry with the standard tool set
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(crate::weather::WeatherTool::from_env());
    registry.register(crate::market::MarketPriceTool::from_env());
    registry.register(crate::schemes::SchemeAdvisoryTool::new());
    tracing::info!(tools = registry.len(), "tool registry created");
    registry
}
