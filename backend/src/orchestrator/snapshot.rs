//! Snapshot - Read-only view of simulation state
//!
//! A snapshot copies everything an external reporter or test may want to
//! inspect after a step: global time, every agent's clock, its buffers, and
//! the full hop history of every message it holds or has archived.
//!
//! # Digest
//!
//! [`EngineSnapshot::digest`] hashes a canonical JSON rendering with SHA-256.
//! Two engines with equal digests are in the same simulation state, which is
//! how iteration-order independence is checked.

use crate::models::agent::{Agent, OutboundMessage};
use crate::models::message::Message;
use crate::models::topology::AgentId;
use crate::orchestrator::engine::{SimulationEngine, SimulationError};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Complete engine state at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineSnapshot {
    pub global_time: u64,

    /// Agents in ascending id order
    pub agents: Vec<AgentSnapshot>,
}

/// Agent state snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub neighbors: BTreeSet<AgentId>,
    pub loop_length: u64,
    pub start_offset: u64,
    pub msg_process_time: u64,
    pub msg_transfer_time: u64,
    pub current_loop_time: u64,
    pub current_cycle: u64,
    pub received_for_me: bool,
    pub dead_ended: bool,
    pub inbox: Vec<Message>,
    pub outbox: Vec<OutboundMessage>,
    pub delivered: Vec<Message>,
    pub dead_ends: Vec<Message>,
}

impl From<&Agent> for AgentSnapshot {
    fn from(agent: &Agent) -> Self {
        let timing = agent.timing();
        AgentSnapshot {
            id: agent.id().clone(),
            neighbors: agent.neighbors().clone(),
            loop_length: timing.loop_length(),
            start_offset: timing.start_offset(),
            msg_process_time: timing.msg_process_time(),
            msg_transfer_time: timing.msg_transfer_time(),
            current_loop_time: timing.current_loop_time(),
            current_cycle: timing.current_cycle(),
            received_for_me: agent.received_for_me(),
            dead_ended: agent.dead_ended(),
            inbox: agent.inbox().to_vec(),
            outbox: agent.outbox().to_vec(),
            delivered: agent.delivered().to_vec(),
            dead_ends: agent.dead_ends().to_vec(),
        }
    }
}

impl EngineSnapshot {
    pub fn capture(engine: &SimulationEngine) -> Self {
        EngineSnapshot {
            global_time: engine.global_time(),
            agents: engine.agents().map(AgentSnapshot::from).collect(),
        }
    }

    pub fn agent(&self, id: &AgentId) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|agent| &agent.id == id)
    }

    /// Messages currently waiting in any inbox or outbox
    pub fn in_flight(&self) -> usize {
        self.agents
            .iter()
            .map(|agent| agent.inbox.len() + agent.outbox.len())
            .sum()
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, SimulationError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            SimulationError::Serialization(format!("Snapshot serialization failed: {}", e))
        })
    }

    /// SHA-256 of the canonical JSON form, hex encoded
    pub fn digest(&self) -> Result<String, SimulationError> {
        compute_digest(self)
    }
}

// ============================================================================
// Hashing
// ============================================================================

/// Compute deterministic SHA256 hash of any serializable value
///
/// Object keys are sorted recursively before hashing so the digest does not
/// depend on field or map ordering.
pub fn compute_digest<T: Serialize>(value: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(value).map_err(|e| {
        SimulationError::Serialization(format!("Snapshot serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::Serialization(format!("Snapshot serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::topology::Graph;
    use crate::timing::TimingSource;

    #[test]
    fn test_digest_is_stable() {
        let graph = Graph::from_edges([("A", "B"), ("B", "C")]);
        let engine = SimulationEngine::new(&graph, &TimingSource::default()).unwrap();

        let first = EngineSnapshot::capture(&engine).digest().unwrap();
        let second = EngineSnapshot::capture(&engine).digest().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_digest_changes_with_state() {
        let graph = Graph::from_edges([("A", "B")]);
        let mut engine = SimulationEngine::new(&graph, &TimingSource::default()).unwrap();
        let before = EngineSnapshot::capture(&engine).digest().unwrap();

        engine.inject(&"A".into(), &"B".into()).unwrap();
        let after = EngineSnapshot::capture(&engine).digest().unwrap();
        assert_ne!(before, after);
    }
}
