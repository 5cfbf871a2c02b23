//! Orchestrator - main simulation loop
//!
//! See `engine.rs` for the step loop and `snapshot.rs` for read-only state
//! views.

pub mod engine;
pub mod snapshot;

pub use engine::{
    RunOutcome, SimulationConfig, SimulationEngine, SimulationError, StepResult, StopConditions,
    StopReason,
};
pub use snapshot::{AgentSnapshot, EngineSnapshot};
