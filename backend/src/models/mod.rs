//! Domain models for the flood routing simulator

pub mod agent;
pub mod event;
pub mod message;
pub mod topology;

// Re-exports
pub use agent::{Agent, Firing, ForwardOutcome, OutboundMessage, RoutingDecision};
pub use event::{Event, EventLog};
pub use message::{Message, MessageId};
pub use topology::{AgentId, Graph, Topology, TopologyError};
