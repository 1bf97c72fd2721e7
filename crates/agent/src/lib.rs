//! Conversation turn orchestrator
//!
//! One request/response cycle through a fixed sequence of stages: input
//! resolution, language resolution, history append, context augmentation,
//! generation, locale correction, history finalize, speech synthesis. The
//! orchestrator never raises past its boundary — every failure mode
//! resolves to an unchanged-history short circuit or a degraded-but-complete
//! result.

mod compose;
mod orchestrator;
mod prompt;
mod turn;

pub use compose::build_orchestrator;
pub use orchestrator::TurnOrchestrator;
pub use turn::{TurnRequest, TurnResponse};
