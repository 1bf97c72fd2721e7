//! Domain tools
//!
//! Every tool honors the no-throw handler contract: internal failures come
//! back as well-formed degraded output with an explanatory message, so the
//! orchestrator can always fold a result into the turn. Two trigger
//! strategies share the same [`agrivoice_core::Tool`] interface: the
//! deterministic keyword lexicon in [`triggers`], and native function
//! calling for providers that support it (see the llm crate).

pub mod market;
pub mod registry;
pub mod schemes;
pub mod triggers;
pub mod weather;

pub use market::MarketPriceTool;
pub use registry::{ScopedDispatcher, ToolRegistry};
pub use schemes::SchemeAdvisoryTool;
pub use triggers::{ToolTrigger, TriggerLexicon};
pub use weather::WeatherTool;
