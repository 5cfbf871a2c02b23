//! Agent (network node) model
//!
//! Each agent owns:
//! - Its clock (`TimingProfile`), copied by value at construction
//! - An inbox of messages received since its last firing
//! - An outbox of messages waiting for the engine's exchange phase, each
//!   paired with the set of neighbors it must be copied to
//! - Its neighbor set, read once from the topology
//!
//! # Tick Isolation
//!
//! `tick()` reads and writes only this agent's own state. All cross-agent
//! effects happen later, in the engine's exchange phase. That is what makes
//! the order in which agents tick irrelevant to the outcome of a step.

use crate::core::time::TimingProfile;
use crate::models::message::{Message, MessageId};
use crate::models::topology::{AgentId, Topology, TopologyError};
use serde::Serialize;
use std::collections::BTreeSet;

/// What an agent does with one message when it fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ForwardOutcome {
    /// The message was addressed to this agent (terminal)
    Delivered,

    /// Copy the message to each of these neighbors
    Forward(BTreeSet<AgentId>),

    /// No unvisited neighbor remains (terminal, not an error)
    DeadEnd,
}

impl ForwardOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ForwardOutcome::Forward(_))
    }
}

/// Outcome recorded for a single message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingDecision {
    pub message_id: MessageId,
    pub outcome: ForwardOutcome,
}

/// Outbox entry: a message and the neighbors it is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub message: Message,
    pub targets: BTreeSet<AgentId>,
}

/// Result of an agent's clock wrapping around
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firing {
    /// Cycle number reached by this firing
    pub cycle: u64,

    /// One decision per message that was in the inbox, in inbox order
    pub decisions: Vec<RoutingDecision>,
}

/// A node of the simulated network
///
/// # Example
/// ```
/// use flood_simulator_core_rs::{Agent, AgentId, Graph, TimingProfile};
///
/// let graph = Graph::from_edges([("A", "B")]);
/// let timing = TimingProfile::new(1, 0, 1).unwrap();
/// let mut agent = Agent::new(AgentId::from("A"), &graph, &timing);
///
/// agent.create_and_send(AgentId::from("B")).unwrap();
/// assert_eq!(agent.outbox().len(), 1);
///
/// let firing = agent.tick().expect("loop_length 1 fires every tick");
/// assert!(firing.decisions.is_empty()); // inbox was empty
/// ```
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,

    /// Adjacent agents, fixed for the whole run
    neighbors: BTreeSet<AgentId>,

    /// Messages awaiting this agent's next firing
    inbox: Vec<Message>,

    /// Messages awaiting the exchange phase
    outbox: Vec<OutboundMessage>,

    timing: TimingProfile,

    /// Set when a message addressed to this agent was consumed this tick
    received_for_me: bool,

    /// Set when a flooded message died here this tick
    dead_ended: bool,

    /// Every message delivered to this agent
    delivered: Vec<Message>,

    /// Every message that dead-ended at this agent
    dead_ends: Vec<Message>,

    /// Sequence number for the next originated message
    next_sequence: u64,
}

impl Agent {
    /// Create a new agent
    ///
    /// # Arguments
    /// * `id` - Node id of this agent
    /// * `topology` - Network the neighbor set is read from
    /// * `timing` - Clock template; the agent keeps its own copy
    pub fn new<T: Topology + ?Sized>(id: AgentId, topology: &T, timing: &TimingProfile) -> Self {
        let neighbors = topology.neighbors(&id);
        Self {
            id,
            neighbors,
            inbox: Vec::new(),
            outbox: Vec::new(),
            timing: timing.clone(),
            received_for_me: false,
            dead_ended: false,
            delivered: Vec::new(),
            dead_ends: Vec::new(),
            next_sequence: 0,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn neighbors(&self) -> &BTreeSet<AgentId> {
        &self.neighbors
    }

    pub fn timing(&self) -> &TimingProfile {
        &self.timing
    }

    pub fn inbox(&self) -> &[Message] {
        &self.inbox
    }

    pub fn outbox(&self) -> &[OutboundMessage] {
        &self.outbox
    }

    /// True only during the tick in which a message for this agent arrived
    pub fn received_for_me(&self) -> bool {
        self.received_for_me
    }

    /// True only during the tick in which a message dead-ended here
    pub fn dead_ended(&self) -> bool {
        self.dead_ended
    }

    pub fn delivered(&self) -> &[Message] {
        &self.delivered
    }

    pub fn dead_ends(&self) -> &[Message] {
        &self.dead_ends
    }

    // ========================================================================
    // Routing
    // ========================================================================

    /// Decide what to do with `message` without changing any state
    ///
    /// 1. Addressed to this agent → `Delivered`
    /// 2. Target is a neighbor → forward to the target only
    /// 3. Otherwise → flood to neighbors absent from the propagation chain,
    ///    or `DeadEnd` if none remain
    pub fn decide_forward(&self, message: &Message) -> ForwardOutcome {
        let target = message.target_agent_id();

        if target == &self.id {
            return ForwardOutcome::Delivered;
        }

        if self.neighbors.contains(target) {
            return ForwardOutcome::Forward(BTreeSet::from([target.clone()]));
        }

        let unvisited: BTreeSet<AgentId> = self
            .neighbors
            .iter()
            .filter(|neighbor| !message.has_visited(neighbor))
            .cloned()
            .collect();

        if unvisited.is_empty() {
            ForwardOutcome::DeadEnd
        } else {
            ForwardOutcome::Forward(unvisited)
        }
    }

    /// Consume the whole inbox
    ///
    /// Forwarded messages move to the outbox; delivered and dead-ended ones
    /// are archived. The inbox is always empty afterwards. Duplicate copies of
    /// one message arriving in the same loop are each handled on their own.
    pub fn handle_buffer(&mut self) -> Vec<RoutingDecision> {
        let inbox = std::mem::take(&mut self.inbox);
        let mut decisions = Vec::with_capacity(inbox.len());

        for message in inbox {
            let outcome = self.decide_forward(&message);
            let message_id = message.id().clone();

            match &outcome {
                ForwardOutcome::Delivered => {
                    self.received_for_me = true;
                    self.delivered.push(message);
                }
                ForwardOutcome::DeadEnd => {
                    self.dead_ended = true;
                    self.dead_ends.push(message);
                }
                ForwardOutcome::Forward(targets) => {
                    self.outbox.push(OutboundMessage {
                        message,
                        targets: targets.clone(),
                    });
                }
            }

            decisions.push(RoutingDecision {
                message_id,
                outcome,
            });
        }

        decisions
    }

    /// Originate a new message and address it to every neighbor
    ///
    /// The target's existence is the caller's concern (the engine checks it
    /// against the topology). An agent without neighbors dead-ends the
    /// message immediately.
    ///
    /// # Errors
    /// Returns [`TopologyError::SelfAddressed`] if `target` is this agent.
    pub fn create_and_send(&mut self, target: AgentId) -> Result<RoutingDecision, TopologyError> {
        if target == self.id {
            return Err(TopologyError::SelfAddressed(target));
        }

        let message_id = MessageId {
            origin: self.id.clone(),
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;

        let message = Message::new(message_id.clone(), self.id.clone(), target);

        let outcome = if self.neighbors.is_empty() {
            self.dead_ended = true;
            self.dead_ends.push(message);
            ForwardOutcome::DeadEnd
        } else {
            let targets = self.neighbors.clone();
            self.outbox.push(OutboundMessage {
                message,
                targets: targets.clone(),
            });
            ForwardOutcome::Forward(targets)
        };

        Ok(RoutingDecision {
            message_id,
            outcome,
        })
    }

    /// Advance this agent's clock by one global tick
    ///
    /// Transient flags are cleared first. When the clock wraps around the
    /// inbox is handled and the firing is returned.
    pub fn tick(&mut self) -> Option<Firing> {
        self.received_for_me = false;
        self.dead_ended = false;

        if !self.timing.advance() {
            return None;
        }

        let decisions = self.handle_buffer();
        Some(Firing {
            cycle: self.timing.current_cycle(),
            decisions,
        })
    }

    // ========================================================================
    // Exchange hooks
    // ========================================================================

    /// Place an in-transit copy into the inbox
    pub fn receive(&mut self, message: Message) {
        self.inbox.push(message);
    }

    /// Drain the outbox for the exchange phase
    pub fn take_outbox(&mut self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.outbox)
    }
}
