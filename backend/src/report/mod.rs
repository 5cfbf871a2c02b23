//! Step reporting
//!
//! The engine never formats text. After each step of
//! [`SimulationEngine::run_observed`] it hands itself to a [`StepObserver`]
//! together with the selected [`LogLevel`]; the observer reads whatever it
//! needs through the engine's accessors.
//!
//! [`TextReporter`] renders the three levels:
//! - `Summary` (1): one line per step with firing/delivery/transfer counts
//! - `Agents` (2): plus one line per agent with clock and buffer sizes
//! - `Messages` (3): plus every buffered message with its chain and times

use crate::models::message::Message;
use crate::orchestrator::{SimulationEngine, StepResult};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use thiserror::Error;

/// Detail level shown to an observer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LogLevel {
    #[default]
    Summary = 1,
    Agents = 2,
    Messages = 3,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("log level must be 1, 2 or 3, got {0}")]
pub struct InvalidLogLevel(pub u8);

impl TryFrom<u8> for LogLevel {
    type Error = InvalidLogLevel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(LogLevel::Summary),
            2 => Ok(LogLevel::Agents),
            3 => Ok(LogLevel::Messages),
            other => Err(InvalidLogLevel(other)),
        }
    }
}

impl From<LogLevel> for u8 {
    fn from(level: LogLevel) -> Self {
        level as u8
    }
}

/// Receives the engine after every step of a run
pub trait StepObserver {
    fn observe(&mut self, level: LogLevel, engine: &SimulationEngine, step: &StepResult);
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl StepObserver for NullObserver {
    fn observe(&mut self, _level: LogLevel, _engine: &SimulationEngine, _step: &StepResult) {}
}

/// Collects a plain-text trace of a run
///
/// # Example
/// ```
/// use flood_simulator_core_rs::orchestrator::{SimulationEngine, StopConditions};
/// use flood_simulator_core_rs::timing::TimingSource;
/// use flood_simulator_core_rs::{Graph, LogLevel, TextReporter};
///
/// let graph = Graph::from_edges([("A", "B")]);
/// let mut engine = SimulationEngine::new(&graph, &TimingSource::default()).unwrap();
/// let mut reporter = TextReporter::new();
///
/// engine
///     .run_observed(&StopConditions::iterations(2), LogLevel::Agents, &mut reporter)
///     .unwrap();
///
/// assert!(reporter.output().contains("t=3"));
/// assert!(reporter.output().contains("  A loop="));
/// ```
#[derive(Debug, Default, Clone)]
pub struct TextReporter {
    output: String,
}

impl TextReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }
}

impl StepObserver for TextReporter {
    fn observe(&mut self, level: LogLevel, engine: &SimulationEngine, step: &StepResult) {
        self.output.push_str(&render_step(level, engine, step));
    }
}

/// Render one step at the given level
pub fn render_step(level: LogLevel, engine: &SimulationEngine, step: &StepResult) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "t={} fired={} delivered={} dead_ends={} transfers={}",
        step.global_time,
        step.fired.len(),
        step.delivered.len(),
        step.dead_ended.len(),
        step.transfers
    );

    if level < LogLevel::Agents {
        return out;
    }

    for agent in engine.agents() {
        let timing = agent.timing();
        let _ = write!(
            out,
            "  {} loop={}/{} cycle={} inbox={} outbox={}",
            agent.id(),
            timing.current_loop_time(),
            timing.loop_length(),
            timing.current_cycle(),
            agent.inbox().len(),
            agent.outbox().len()
        );
        if agent.received_for_me() {
            out.push_str(" [received]");
        }
        if agent.dead_ended() {
            out.push_str(" [dead-end]");
        }
        out.push('\n');

        if level < LogLevel::Messages {
            continue;
        }

        for message in agent.inbox() {
            let _ = writeln!(out, "    in  {}", describe(message));
        }
        for entry in agent.outbox() {
            let targets: Vec<&str> = entry.targets.iter().map(|t| t.as_str()).collect();
            let _ = writeln!(
                out,
                "    out {} to=[{}]",
                describe(&entry.message),
                targets.join(",")
            );
        }
    }

    out
}

fn describe(message: &Message) -> String {
    let chain: Vec<&str> = message
        .propagation_chain()
        .iter()
        .map(|id| id.as_str())
        .collect();
    format!(
        "{} -> {} chain={} global={:?} local={:?}",
        message.id(),
        message.target_agent_id(),
        chain.join(">"),
        message.global_arrival_times(),
        message.local_arrival_times()
    )
}
