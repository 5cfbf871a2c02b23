//! Flood Routing Simulator Core - Rust Engine
//!
//! Discrete-time simulation of flood-based message routing over a fixed
//! network where every agent runs its own periodically-firing clock.
//!
//! # Architecture
//!
//! - **core**: Per-agent clock (`TimingProfile`)
//! - **models**: Domain types (Topology, Message, Agent, Event)
//! - **timing**: Timing-parameter builder (explicit and randomized)
//! - **orchestrator**: Step loop, stop conditions, snapshots
//! - **report**: External text reporter for the three log levels
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. A propagation chain never repeats an agent id
//! 2. `global_arrival_times.len() == propagation_chain.len() - 1`
//! 3. The order agents are visited in within a step never changes the result
//! 4. All randomness is deterministic (seeded RNG)

// Module declarations
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod report;
pub mod rng;
pub mod timing;

// Re-exports for convenience
pub use crate::core::time::{TimingError, TimingProfile};
pub use models::{
    agent::{Agent, Firing, ForwardOutcome, OutboundMessage, RoutingDecision},
    event::{Event, EventLog},
    message::{Message, MessageId},
    topology::{AgentId, Graph, Topology, TopologyError},
};
pub use orchestrator::{
    EngineSnapshot, RunOutcome, SimulationConfig, SimulationEngine, SimulationError, StepResult,
    StopConditions, StopReason,
};
pub use report::{LogLevel, NullObserver, StepObserver, TextReporter};
pub use rng::RngManager;
pub use timing::{ExplicitTiming, RandomizedTiming, TimingConfigError, TimingParam, TimingSource};
