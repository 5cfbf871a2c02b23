//! Event logging for simulation replay and auditing.
//!
//! Every routing-relevant state change is recorded as an [`Event`] stamped
//! with the global tick it happened on. The log replaces printing: a reporter
//! or test reads it after the fact.
//!
//! # Event Types
//!
//! - **Injection**: external traffic entered the network
//! - **Firing**: an agent's operation loop wrapped and it handled its inbox
//! - **Routing**: a message was forwarded, delivered, or dead-ended
//! - **Transfer**: the exchange phase copied a message into a neighbor's inbox
//! - **Run**: a run loop halted
//!
//! # Example
//!
//! ```rust
//! use flood_simulator_core_rs::models::event::{Event, EventLog};
//! use flood_simulator_core_rs::{AgentId, MessageId};
//!
//! let mut log = EventLog::new();
//! log.log(Event::MessageInjected {
//!     tick: 0,
//!     message_id: MessageId { origin: AgentId::from("A"), sequence: 0 },
//!     source: AgentId::from("A"),
//!     target: AgentId::from("C"),
//! });
//!
//! assert_eq!(log.events_at_tick(0).len(), 1);
//! ```

use crate::models::message::MessageId;
use crate::models::topology::AgentId;
use crate::orchestrator::StopReason;
use serde::Serialize;
use std::collections::BTreeSet;

/// Simulation event capturing a state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event_type")]
pub enum Event {
    /// New message originated by an agent
    MessageInjected {
        tick: u64,
        message_id: MessageId,
        source: AgentId,
        target: AgentId,
    },

    /// Agent's clock wrapped and its inbox was handled
    AgentFired {
        tick: u64,
        agent_id: AgentId,
        cycle: u64,
        handled: usize,
    },

    /// Agent queued a message for the given neighbors
    MessageForwarded {
        tick: u64,
        agent_id: AgentId,
        message_id: MessageId,
        targets: BTreeSet<AgentId>,
    },

    /// Message reached its target
    MessageDelivered {
        tick: u64,
        agent_id: AgentId,
        message_id: MessageId,
    },

    /// Flooded message had nowhere left to go
    MessageDeadEnded {
        tick: u64,
        agent_id: AgentId,
        message_id: MessageId,
    },

    /// Exchange phase moved a copy between two agents
    MessageTransferred {
        tick: u64,
        from: AgentId,
        to: AgentId,
        message_id: MessageId,
    },

    /// Run loop stopped
    RunHalted { tick: u64, reason: StopReason },
}

impl Event {
    /// Global tick when this event occurred
    pub fn tick(&self) -> u64 {
        match self {
            Event::MessageInjected { tick, .. }
            | Event::AgentFired { tick, .. }
            | Event::MessageForwarded { tick, .. }
            | Event::MessageDelivered { tick, .. }
            | Event::MessageDeadEnded { tick, .. }
            | Event::MessageTransferred { tick, .. }
            | Event::RunHalted { tick, .. } => *tick,
        }
    }

    /// Short name of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::MessageInjected { .. } => "MessageInjected",
            Event::AgentFired { .. } => "AgentFired",
            Event::MessageForwarded { .. } => "MessageForwarded",
            Event::MessageDelivered { .. } => "MessageDelivered",
            Event::MessageDeadEnded { .. } => "MessageDeadEnded",
            Event::MessageTransferred { .. } => "MessageTransferred",
            Event::RunHalted { .. } => "RunHalted",
        }
    }

    /// Message this event is about, if any
    pub fn message_id(&self) -> Option<&MessageId> {
        match self {
            Event::MessageInjected { message_id, .. }
            | Event::MessageForwarded { message_id, .. }
            | Event::MessageDelivered { message_id, .. }
            | Event::MessageDeadEnded { message_id, .. }
            | Event::MessageTransferred { message_id, .. } => Some(message_id),
            _ => None,
        }
    }

    /// Agent that acted in this event, if any
    pub fn agent_id(&self) -> Option<&AgentId> {
        match self {
            Event::MessageInjected { source, .. } => Some(source),
            Event::AgentFired { agent_id, .. }
            | Event::MessageForwarded { agent_id, .. }
            | Event::MessageDelivered { agent_id, .. }
            | Event::MessageDeadEnded { agent_id, .. } => Some(agent_id),
            Event::MessageTransferred { from, .. } => Some(from),
            Event::RunHalted { .. } => None,
        }
    }
}

/// Event log for storing and querying simulation events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific global tick
    pub fn events_at_tick(&self, tick: u64) -> Vec<&Event> {
        self.events.iter().filter(|e| e.tick() == tick).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get the full history of one message and its copies
    pub fn events_for_message(&self, message_id: &MessageId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.message_id() == Some(message_id))
            .collect()
    }

    /// Get events for a specific agent
    pub fn events_for_agent(&self, agent_id: &AgentId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.agent_id() == Some(agent_id))
            .collect()
    }

    pub fn deliveries(&self) -> Vec<&Event> {
        self.events_of_type("MessageDelivered")
    }

    pub fn dead_ends(&self) -> Vec<&Event> {
        self.events_of_type("MessageDeadEnded")
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(origin: &str, sequence: u64) -> MessageId {
        MessageId {
            origin: origin.into(),
            sequence,
        }
    }

    fn sample_log() -> EventLog {
        let mut log = EventLog::new();
        log.log(Event::MessageInjected {
            tick: 3,
            message_id: id("A", 0),
            source: "A".into(),
            target: "C".into(),
        });
        log.log(Event::MessageTransferred {
            tick: 4,
            from: "A".into(),
            to: "B".into(),
            message_id: id("A", 0),
        });
        log.log(Event::AgentFired {
            tick: 5,
            agent_id: "B".into(),
            cycle: 1,
            handled: 1,
        });
        log.log(Event::MessageDeadEnded {
            tick: 5,
            agent_id: "B".into(),
            message_id: id("A", 0),
        });
        log
    }

    #[test]
    fn test_event_log_query_by_tick() {
        let log = sample_log();
        assert_eq!(log.events_at_tick(5).len(), 2);
        assert!(log.events_at_tick(9).is_empty());
    }

    #[test]
    fn test_event_log_query_by_message() {
        let log = sample_log();
        assert_eq!(log.events_for_message(&id("A", 0)).len(), 3);
        assert!(log.events_for_message(&id("A", 1)).is_empty());
    }

    #[test]
    fn test_event_log_query_by_agent() {
        let log = sample_log();
        assert_eq!(log.events_for_agent(&"A".into()).len(), 2);
        assert_eq!(log.events_for_agent(&"B".into()).len(), 2);
    }

    #[test]
    fn test_terminal_queries() {
        let log = sample_log();
        assert!(log.deliveries().is_empty());
        assert_eq!(log.dead_ends().len(), 1);
        assert_eq!(log.dead_ends()[0].event_type(), "MessageDeadEnded");
    }

    #[test]
    fn test_event_log_clear() {
        let mut log = sample_log();
        log.clear();
        assert!(log.is_empty());
    }
}
