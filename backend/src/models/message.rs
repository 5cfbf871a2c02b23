//! Message model
//!
//! A message carries routing metadata only, no payload:
//! - Source and target agent IDs (fixed at creation)
//! - Propagation chain: every agent that has held this copy, in hop order
//! - Per-hop arrival times (receiver's local loop time, global tick)
//!
//! Hop history is appended exclusively by the engine's exchange phase via
//! [`Message::record_hop`]. Forwarding decisions never touch it.
//!
//! # Invariants
//!
//! 1. `global_arrival_times.len() == propagation_chain.len() - 1`
//! 2. `local_arrival_times.len() == propagation_chain.len()` (first entry is
//!    a `0` sentinel for the source)
//! 3. `propagation_chain` holds no duplicate id

use crate::models::topology::AgentId;
use serde::Serialize;
use std::fmt;

/// Identity shared by a message and every per-hop copy made from it
///
/// Assigned by the originating agent from its own monotonically increasing
/// counter, so ids are unique per run and identical across identical runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MessageId {
    pub origin: AgentId,
    pub sequence: u64,
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.origin, self.sequence)
    }
}

/// Routing record of a packet travelling through the network
///
/// # Example
/// ```
/// use flood_simulator_core_rs::{AgentId, Message, MessageId};
///
/// let id = MessageId { origin: AgentId::from("A"), sequence: 0 };
/// let msg = Message::new(id, AgentId::from("A"), AgentId::from("C"));
///
/// assert_eq!(msg.propagation_chain(), &[AgentId::from("A")]);
/// assert_eq!(msg.hop_count(), 0);
/// assert!(msg.has_visited(&AgentId::from("A")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    id: MessageId,

    source_agent_id: AgentId,

    target_agent_id: AgentId,

    /// Agents that held this copy, source first
    propagation_chain: Vec<AgentId>,

    /// Receiver local loop time per hop; index 0 is the source sentinel
    local_arrival_times: Vec<u64>,

    /// Global tick per hop arrival
    global_arrival_times: Vec<u64>,
}

impl Message {
    /// Create a fresh message held by its source
    pub fn new(id: MessageId, source_agent_id: AgentId, target_agent_id: AgentId) -> Self {
        Self {
            id,
            propagation_chain: vec![source_agent_id.clone()],
            source_agent_id,
            target_agent_id,
            local_arrival_times: vec![0],
            global_arrival_times: Vec::new(),
        }
    }

    /// Append one hop of history
    ///
    /// Called on the per-target copy while it is in transit to `receiver`.
    pub fn record_hop(&mut self, receiver: AgentId, local_time: u64, global_time: u64) {
        debug_assert!(
            !self.has_visited(&receiver),
            "message {} would revisit {}",
            self.id,
            receiver
        );
        self.local_arrival_times.push(local_time);
        self.global_arrival_times.push(global_time);
        self.propagation_chain.push(receiver);
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn source_agent_id(&self) -> &AgentId {
        &self.source_agent_id
    }

    pub fn target_agent_id(&self) -> &AgentId {
        &self.target_agent_id
    }

    pub fn propagation_chain(&self) -> &[AgentId] {
        &self.propagation_chain
    }

    pub fn local_arrival_times(&self) -> &[u64] {
        &self.local_arrival_times
    }

    pub fn global_arrival_times(&self) -> &[u64] {
        &self.global_arrival_times
    }

    /// Agent currently holding this copy
    pub fn current_holder(&self) -> &AgentId {
        // The chain is never empty: it starts with the source.
        &self.propagation_chain[self.propagation_chain.len() - 1]
    }

    /// Number of hops travelled so far
    pub fn hop_count(&self) -> usize {
        self.global_arrival_times.len()
    }

    pub fn has_visited(&self, id: &AgentId) -> bool {
        self.propagation_chain.contains(id)
    }
}
