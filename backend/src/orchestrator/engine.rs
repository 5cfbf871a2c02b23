//! Simulation Engine
//!
//! Main simulation loop driving every agent's clock and moving messages
//! between agents.
//!
//! # Architecture
//!
//! ```text
//! For each step:
//! 1. Advance global time by one tick
//! 2. Tick every agent (clock advance, inbox handling on firing)
//! 3. Exchange messages (drain outboxes into neighbors' inboxes,
//!    stamping hop history on each per-target copy)
//! 4. Evaluate stop conditions (run loop only)
//! ```
//!
//! # Order Independence
//!
//! Neither phase depends on the order agents are visited in:
//! - An agent's `tick()` touches only that agent's own state
//! - Firings are logged sorted by agent id
//! - Drained outbox entries are sorted by source id before any copy lands in
//!   an inbox, so inbox contents are the same whatever the drain order
//!
//! # Example
//!
//! ```rust
//! use flood_simulator_core_rs::orchestrator::{SimulationEngine, StopConditions, StopReason};
//! use flood_simulator_core_rs::timing::{ExplicitTiming, TimingParam, TimingSource};
//! use flood_simulator_core_rs::{AgentId, Graph, LogLevel};
//!
//! let graph = Graph::from_edges([("A", "B"), ("B", "C")]);
//! let timing = TimingSource::Explicit(
//!     ExplicitTiming::default().with_loop_length(TimingParam::Uniform(1)),
//! );
//!
//! let mut engine = SimulationEngine::new(&graph, &timing).unwrap();
//! engine.inject(&AgentId::from("A"), &AgentId::from("C")).unwrap();
//!
//! let outcome = engine
//!     .run(&StopConditions::delivered_any().with_iterations(20), LogLevel::Summary)
//!     .unwrap();
//! assert_eq!(outcome.reason, StopReason::Delivered);
//! ```

use crate::core::time::TimingProfile;
use crate::models::agent::{Agent, Firing, ForwardOutcome, OutboundMessage};
use crate::models::event::{Event, EventLog};
use crate::models::message::MessageId;
use crate::models::topology::{AgentId, Graph, Topology, TopologyError};
use crate::report::{LogLevel, NullObserver, StepObserver};
use crate::timing::{TimingConfigError, TimingSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

// ============================================================================
// Configuration Types
// ============================================================================

/// When a run loop halts; the first satisfied condition wins
///
/// `iterations: N` halts once `global_time > start_time + N`.
/// `delivered_any` halts once any agent consumed a message addressed to it
/// during the step just taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StopConditions {
    pub iterations: Option<u64>,
    pub delivered_any: bool,
}

impl StopConditions {
    pub fn iterations(iterations: u64) -> Self {
        Self {
            iterations: Some(iterations),
            delivered_any: false,
        }
    }

    pub fn delivered_any() -> Self {
        Self {
            iterations: None,
            delivered_any: true,
        }
    }

    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn with_delivered_any(mut self) -> Self {
        self.delivered_any = true;
        self
    }

    /// True when no condition is configured
    pub fn is_empty(&self) -> bool {
        self.iterations.is_none() && !self.delivered_any
    }
}

/// Complete simulation configuration
///
/// # Example
///
/// ```rust
/// use flood_simulator_core_rs::orchestrator::SimulationConfig;
/// use flood_simulator_core_rs::LogLevel;
///
/// let config = SimulationConfig::from_json(r#"{
///     "timing": { "explicit": { "loop_length": [5, 7], "start_offset": 2 } },
///     "stop": { "iterations": 100, "delivered_any": true },
///     "log_level": 3
/// }"#).unwrap();
///
/// assert_eq!(config.log_level, LogLevel::Messages);
/// assert_eq!(config.stop.iterations, Some(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    #[serde(default)]
    pub timing: TimingSource,

    pub stop: StopConditions,

    #[serde(default)]
    pub log_level: LogLevel,
}

impl SimulationConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json).map_err(|e| SimulationError::InvalidConfig(e.to_string()))
    }
}

// ============================================================================
// Results and Errors
// ============================================================================

/// Why a run loop halted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    IterationLimit,
    Delivered,
}

/// Result of a single step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepResult {
    /// Global tick this step advanced to
    pub global_time: u64,

    /// Agents whose clock wrapped this step, sorted by id
    pub fired: Vec<AgentId>,

    /// Messages delivered this step
    pub delivered: Vec<(AgentId, MessageId)>,

    /// Messages that dead-ended this step
    pub dead_ended: Vec<(AgentId, MessageId)>,

    /// Per-target copies moved by the exchange phase
    pub transfers: usize,
}

/// Summary of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub steps: u64,
    pub global_time: u64,
    pub reason: StopReason,
}

/// Simulation error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Timing(#[from] TimingConfigError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error("Run requires at least one stop condition")]
    NoStopCondition,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ============================================================================
// Engine
// ============================================================================

/// Owns the topology snapshot, every agent, and global time
pub struct SimulationEngine {
    /// Private copy of the network, fixed for the run
    topology: Graph,

    /// One agent per node, keyed by id; never resized after construction
    agents: BTreeMap<AgentId, Agent>,

    global_time: u64,

    event_log: EventLog,
}

impl SimulationEngine {
    /// Create an engine, building timing profiles from `timing`
    ///
    /// Profiles are assigned to agents in ascending id order.
    ///
    /// # Errors
    /// * `TopologyError::EmptyTopology` - the network has no nodes
    /// * `TopologyError::DanglingNeighbor` - a neighbor id is not a node
    /// * `TimingConfigError` - the timing parameters are invalid
    pub fn new<T: Topology + ?Sized>(
        topology: &T,
        timing: &TimingSource,
    ) -> Result<Self, SimulationError> {
        let node_count = topology.nodes().len();
        if node_count == 0 {
            return Err(TopologyError::EmptyTopology.into());
        }
        let profiles = timing.build_profiles(node_count)?;
        Self::with_profiles(topology, profiles)
    }

    /// Create an engine with the timing section of a parsed configuration
    ///
    /// Pair with [`run_configured`](Self::run_configured) to use the rest of it.
    pub fn from_config<T: Topology + ?Sized>(
        topology: &T,
        config: &SimulationConfig,
    ) -> Result<Self, SimulationError> {
        Self::new(topology, &config.timing)
    }

    /// Create an engine from ready-made profiles, one per node in id order
    ///
    /// # Errors
    /// * `TopologyError::DanglingNeighbor` - a neighbor id is not a node
    /// * `TopologyError::EmptyTopology` - the network has no nodes
    /// * `TimingConfigError::LengthMismatch` - profile count differs from
    ///   node count
    pub fn with_profiles<T: Topology + ?Sized>(
        topology: &T,
        profiles: Vec<TimingProfile>,
    ) -> Result<Self, SimulationError> {
        let topology = Graph::snapshot_of(topology)?;
        if topology.node_count() == 0 {
            return Err(TopologyError::EmptyTopology.into());
        }
        if profiles.len() != topology.node_count() {
            return Err(TimingConfigError::LengthMismatch {
                parameter: "profiles",
                expected: topology.node_count(),
                actual: profiles.len(),
            }
            .into());
        }

        let global_time = profiles
            .iter()
            .map(TimingProfile::start_offset)
            .max()
            .unwrap_or(0);

        let agents: BTreeMap<AgentId, Agent> = topology
            .nodes()
            .into_iter()
            .zip(profiles.iter())
            .map(|(id, profile)| {
                let agent = Agent::new(id.clone(), &topology, profile);
                (id, agent)
            })
            .collect();

        debug!(
            agents = agents.len(),
            edges = topology.edge_count(),
            global_time,
            "Simulation engine created"
        );

        Ok(Self {
            topology,
            agents,
            global_time,
            event_log: EventLog::new(),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn global_time(&self) -> u64 {
        self.global_time
    }

    pub fn topology(&self) -> &Graph {
        &self.topology
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn agent_ids(&self) -> impl Iterator<Item = &AgentId> {
        self.agents.keys()
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    // ========================================================================
    // Traffic
    // ========================================================================

    /// Originate a message at `source` addressed to `target`
    ///
    /// The message is picked up by the next exchange phase, so inject before
    /// calling `step()`.
    ///
    /// # Errors
    /// * `TopologyError::UnknownAgent` - either id is not a node
    /// * `TopologyError::SelfAddressed` - `source == target`
    pub fn inject(
        &mut self,
        source: &AgentId,
        target: &AgentId,
    ) -> Result<MessageId, SimulationError> {
        self.topology.require(target)?;
        let agent = self
            .agents
            .get_mut(source)
            .ok_or_else(|| TopologyError::UnknownAgent(source.clone()))?;

        let decision = agent.create_and_send(target.clone())?;
        let tick = self.global_time;

        self.event_log.log(Event::MessageInjected {
            tick,
            message_id: decision.message_id.clone(),
            source: source.clone(),
            target: target.clone(),
        });
        if decision.outcome == ForwardOutcome::DeadEnd {
            warn!(agent = %source, message = %decision.message_id, "Injected at agent without neighbors");
            self.event_log.log(Event::MessageDeadEnded {
                tick,
                agent_id: source.clone(),
                message_id: decision.message_id.clone(),
            });
        }

        Ok(decision.message_id)
    }

    // ========================================================================
    // Step Loop
    // ========================================================================

    /// Advance the simulation by one global tick
    pub fn step(&mut self) -> StepResult {
        let order: Vec<AgentId> = self.agents.keys().cloned().collect();
        self.step_in_order(&order)
    }

    fn step_in_order(&mut self, order: &[AgentId]) -> StepResult {
        self.global_time += 1;
        let tick = self.global_time;

        let mut firings: Vec<(AgentId, Firing)> = Vec::new();
        for id in order {
            if let Some(firing) = self.agents.get_mut(id).and_then(Agent::tick) {
                firings.push((id.clone(), firing));
            }
        }
        firings.sort_by(|a, b| a.0.cmp(&b.0));

        let mut result = StepResult {
            global_time: tick,
            ..StepResult::default()
        };
        for (agent_id, firing) in firings {
            self.record_firing(agent_id, firing, &mut result);
        }

        result.transfers = self.exchange_in_order(order);
        result
    }

    fn record_firing(&mut self, agent_id: AgentId, firing: Firing, result: &mut StepResult) {
        let tick = self.global_time;
        debug!(
            agent = %agent_id,
            cycle = firing.cycle,
            handled = firing.decisions.len(),
            tick,
            "Agent fired"
        );

        self.event_log.log(Event::AgentFired {
            tick,
            agent_id: agent_id.clone(),
            cycle: firing.cycle,
            handled: firing.decisions.len(),
        });

        for decision in firing.decisions {
            let message_id = decision.message_id;
            match decision.outcome {
                ForwardOutcome::Delivered => {
                    self.event_log.log(Event::MessageDelivered {
                        tick,
                        agent_id: agent_id.clone(),
                        message_id: message_id.clone(),
                    });
                    result.delivered.push((agent_id.clone(), message_id));
                }
                ForwardOutcome::DeadEnd => {
                    self.event_log.log(Event::MessageDeadEnded {
                        tick,
                        agent_id: agent_id.clone(),
                        message_id: message_id.clone(),
                    });
                    result.dead_ended.push((agent_id.clone(), message_id));
                }
                ForwardOutcome::Forward(targets) => {
                    self.event_log.log(Event::MessageForwarded {
                        tick,
                        agent_id: agent_id.clone(),
                        message_id,
                        targets,
                    });
                }
            }
        }

        result.fired.push(agent_id);
    }

    /// Move every outbox entry into the inboxes of its targets
    ///
    /// Each target gets its own copy carrying one more hop of history:
    /// the target's local loop time, the current global tick, and the
    /// target's id. Outboxes are empty afterwards. With empty outboxes this
    /// is a no-op. Returns the number of copies delivered to inboxes.
    pub fn exchange_messages(&mut self) -> usize {
        let order: Vec<AgentId> = self.agents.keys().cloned().collect();
        self.exchange_in_order(&order)
    }

    fn exchange_in_order(&mut self, order: &[AgentId]) -> usize {
        let tick = self.global_time;

        let mut pending: Vec<(AgentId, OutboundMessage)> = Vec::new();
        for id in order {
            if let Some(agent) = self.agents.get_mut(id) {
                pending.extend(agent.take_outbox().into_iter().map(|entry| (id.clone(), entry)));
            }
        }
        // Stable: entries of one source keep their outbox order
        pending.sort_by(|a, b| a.0.cmp(&b.0));

        let mut transfers = 0;
        for (from, OutboundMessage { message, targets }) in pending {
            for to in targets {
                let Some(receiver) = self.agents.get_mut(&to) else {
                    warn!(from = %from, to = %to, message = %message.id(), "Dropping copy for unknown agent");
                    continue;
                };

                let mut copy = message.clone();
                copy.record_hop(to.clone(), receiver.timing().current_loop_time(), tick);
                receiver.receive(copy);
                transfers += 1;

                trace!(from = %from, to = %to, message = %message.id(), tick, "Message transferred");
                self.event_log.log(Event::MessageTransferred {
                    tick,
                    from: from.clone(),
                    to,
                    message_id: message.id().clone(),
                });
            }
        }

        transfers
    }

    /// Check the stop conditions against the current state
    ///
    /// `start_time` is the global time when the run began.
    pub fn should_stop(&self, stop: &StopConditions, start_time: u64) -> Option<StopReason> {
        if let Some(iterations) = stop.iterations {
            if self.global_time > start_time + iterations {
                return Some(StopReason::IterationLimit);
            }
        }

        if stop.delivered_any && self.agents.values().any(Agent::received_for_me) {
            return Some(StopReason::Delivered);
        }

        None
    }

    // ========================================================================
    // Run Loop
    // ========================================================================

    /// Step until a stop condition is satisfied
    ///
    /// `log_level` only selects what an observer is shown; use
    /// [`run_observed`](Self::run_observed) to attach one.
    ///
    /// # Errors
    /// Returns `SimulationError::NoStopCondition` if `stop` is empty.
    pub fn run(
        &mut self,
        stop: &StopConditions,
        log_level: LogLevel,
    ) -> Result<RunOutcome, SimulationError> {
        self.run_observed(stop, log_level, &mut NullObserver)
    }

    /// Run with the stop conditions and log level of `config`
    pub fn run_configured(
        &mut self,
        config: &SimulationConfig,
    ) -> Result<RunOutcome, SimulationError> {
        self.run(&config.stop, config.log_level)
    }

    /// Step until a stop condition is satisfied, showing every step to
    /// `observer`
    pub fn run_observed<O: StepObserver + ?Sized>(
        &mut self,
        stop: &StopConditions,
        log_level: LogLevel,
        observer: &mut O,
    ) -> Result<RunOutcome, SimulationError> {
        if stop.is_empty() {
            return Err(SimulationError::NoStopCondition);
        }

        let start_time = self.global_time;
        let mut steps = 0;

        loop {
            let result = self.step();
            steps += 1;
            observer.observe(log_level, self, &result);

            if let Some(reason) = self.should_stop(stop, start_time) {
                self.event_log.log(Event::RunHalted {
                    tick: self.global_time,
                    reason,
                });
                info!(?reason, steps, global_time = self.global_time, "Run halted");

                return Ok(RunOutcome {
                    steps,
                    global_time: self.global_time,
                    reason,
                });
            }
        }
    }
}

// Manual Debug implementation (agents carry full message archives)
impl std::fmt::Debug for SimulationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationEngine")
            .field("global_time", &self.global_time)
            .field("num_agents", &self.agents.len())
            .field("num_edges", &self.topology.edge_count())
            .field("event_count", &self.event_log.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
