//! Timing-parameter builder
//!
//! Turns a [`TimingSource`] into one [`TimingProfile`] per agent. Profiles are
//! handed out in ascending `AgentId` order by the engine.
//!
//! # Explicit timings
//!
//! Each parameter is either absent (documented default), a single value
//! broadcast to every agent, or a list with exactly one value per agent.
//!
//! # Randomized timings
//!
//! Each parameter is drawn independently per agent from `[0, max)` using the
//! seeded [`RngManager`]. Loop length is drawn from `[1, max)` instead so every
//! clock is valid. Draw order per agent: loop length, start offset, process
//! time, transfer time.
//!
//! # Example
//!
//! ```
//! use flood_simulator_core_rs::timing::{ExplicitTiming, TimingParam, TimingSource};
//!
//! let source = TimingSource::Explicit(
//!     ExplicitTiming::default()
//!         .with_loop_length(TimingParam::Uniform(10))
//!         .with_start_offset(TimingParam::PerAgent(vec![0, 3, 7])),
//! );
//!
//! let profiles = source.build_profiles(3).unwrap();
//! assert_eq!(profiles[1].start_offset(), 3);
//! assert_eq!(profiles[2].loop_length(), 10);
//! assert_eq!(profiles[0].msg_process_time(), 1); // default
//! ```

use crate::core::time::{TimingError, TimingProfile};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_LOOP_LENGTH: u64 = 50;
pub const DEFAULT_START_OFFSET: u64 = 0;
pub const DEFAULT_MSG_PROCESS_TIME: u64 = 1;
pub const DEFAULT_MSG_TRANSFER_TIME: u64 = 0;

pub const DEFAULT_MAX_LOOP_LENGTH: u64 = 100;
pub const DEFAULT_MAX_START_OFFSET: u64 = 100;
pub const DEFAULT_MAX_MSG_PROCESS_TIME: u64 = 100;
pub const DEFAULT_MAX_MSG_TRANSFER_TIME: u64 = 10;

/// Errors raised while turning timing parameters into profiles
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimingConfigError {
    #[error("{parameter}: expected {expected} values (one per agent), got {actual}")]
    LengthMismatch {
        parameter: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{parameter}: maximum must be positive, got {value}")]
    InvalidMaximum { parameter: &'static str, value: u64 },

    #[error(transparent)]
    Timing(#[from] TimingError),
}

/// One timing parameter: a broadcast scalar or one value per agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimingParam<T> {
    Uniform(T),
    PerAgent(Vec<T>),
}

impl<T: Clone> TimingParam<T> {
    /// Expand to exactly `agent_count` values
    fn resolve(
        &self,
        parameter: &'static str,
        agent_count: usize,
    ) -> Result<Vec<T>, TimingConfigError> {
        match self {
            TimingParam::Uniform(value) => Ok(vec![value.clone(); agent_count]),
            TimingParam::PerAgent(values) if values.len() == agent_count => Ok(values.clone()),
            TimingParam::PerAgent(values) => Err(TimingConfigError::LengthMismatch {
                parameter,
                expected: agent_count,
                actual: values.len(),
            }),
        }
    }
}

fn resolve_or_default(
    param: &Option<TimingParam<u64>>,
    parameter: &'static str,
    default: u64,
    agent_count: usize,
) -> Result<Vec<u64>, TimingConfigError> {
    match param {
        Some(param) => param.resolve(parameter, agent_count),
        None => Ok(vec![default; agent_count]),
    }
}

/// User-supplied timing parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExplicitTiming {
    pub loop_length: Option<TimingParam<u64>>,
    pub start_offset: Option<TimingParam<u64>>,
    pub msg_process_time: Option<TimingParam<u64>>,
    pub msg_transfer_time: Option<TimingParam<u64>>,
}

impl ExplicitTiming {
    pub fn with_loop_length(mut self, param: TimingParam<u64>) -> Self {
        self.loop_length = Some(param);
        self
    }

    pub fn with_start_offset(mut self, param: TimingParam<u64>) -> Self {
        self.start_offset = Some(param);
        self
    }

    pub fn with_msg_process_time(mut self, param: TimingParam<u64>) -> Self {
        self.msg_process_time = Some(param);
        self
    }

    pub fn with_msg_transfer_time(mut self, param: TimingParam<u64>) -> Self {
        self.msg_transfer_time = Some(param);
        self
    }

    fn build_profiles(&self, agent_count: usize) -> Result<Vec<TimingProfile>, TimingConfigError> {
        let loop_lengths = resolve_or_default(
            &self.loop_length,
            "loop_length",
            DEFAULT_LOOP_LENGTH,
            agent_count,
        )?;
        let start_offsets = resolve_or_default(
            &self.start_offset,
            "start_offset",
            DEFAULT_START_OFFSET,
            agent_count,
        )?;
        let process_times = resolve_or_default(
            &self.msg_process_time,
            "msg_process_time",
            DEFAULT_MSG_PROCESS_TIME,
            agent_count,
        )?;
        let transfer_times = resolve_or_default(
            &self.msg_transfer_time,
            "msg_transfer_time",
            DEFAULT_MSG_TRANSFER_TIME,
            agent_count,
        )?;

        (0..agent_count)
            .map(|i| {
                TimingProfile::new(loop_lengths[i], start_offsets[i], process_times[i])
                    .map(|profile| profile.with_transfer_time(transfer_times[i]))
                    .map_err(TimingConfigError::from)
            })
            .collect()
    }
}

fn default_max_loop_length() -> u64 {
    DEFAULT_MAX_LOOP_LENGTH
}

fn default_max_start_offset() -> u64 {
    DEFAULT_MAX_START_OFFSET
}

fn default_max_msg_process_time() -> u64 {
    DEFAULT_MAX_MSG_PROCESS_TIME
}

fn default_max_msg_transfer_time() -> u64 {
    DEFAULT_MAX_MSG_TRANSFER_TIME
}

/// Seeded random timing generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RandomizedTiming {
    pub seed: u64,

    #[serde(default = "default_max_loop_length")]
    pub max_loop_length: u64,

    #[serde(default = "default_max_start_offset")]
    pub max_start_offset: u64,

    #[serde(default = "default_max_msg_process_time")]
    pub max_msg_process_time: u64,

    #[serde(default = "default_max_msg_transfer_time")]
    pub max_msg_transfer_time: u64,
}

impl RandomizedTiming {
    /// Documented maxima with the given seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            max_loop_length: DEFAULT_MAX_LOOP_LENGTH,
            max_start_offset: DEFAULT_MAX_START_OFFSET,
            max_msg_process_time: DEFAULT_MAX_MSG_PROCESS_TIME,
            max_msg_transfer_time: DEFAULT_MAX_MSG_TRANSFER_TIME,
        }
    }

    fn build_profiles(&self, agent_count: usize) -> Result<Vec<TimingProfile>, TimingConfigError> {
        if self.max_loop_length == 0 {
            return Err(TimingConfigError::InvalidMaximum {
                parameter: "max_loop_length",
                value: self.max_loop_length,
            });
        }

        let mut rng = RngManager::new(self.seed);
        let mut profiles = Vec::with_capacity(agent_count);

        for _ in 0..agent_count {
            let loop_length = if self.max_loop_length > 1 {
                rng.range(1, self.max_loop_length)
            } else {
                1
            };
            let start_offset = rng.below(self.max_start_offset);
            let msg_process_time = rng.below(self.max_msg_process_time);
            let msg_transfer_time = rng.below(self.max_msg_transfer_time);

            let profile = TimingProfile::new(loop_length, start_offset, msg_process_time)?
                .with_transfer_time(msg_transfer_time);
            profiles.push(profile);
        }

        Ok(profiles)
    }
}

/// Where agent timings come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingSource {
    Explicit(ExplicitTiming),
    Randomized(RandomizedTiming),
}

impl Default for TimingSource {
    fn default() -> Self {
        TimingSource::Explicit(ExplicitTiming::default())
    }
}

impl TimingSource {
    /// Produce one profile per agent
    ///
    /// # Errors
    /// Fails on a per-agent list of the wrong length, a zero loop length, or
    /// a zero `max_loop_length`.
    pub fn build_profiles(
        &self,
        agent_count: usize,
    ) -> Result<Vec<TimingProfile>, TimingConfigError> {
        match self {
            TimingSource::Explicit(explicit) => explicit.build_profiles(agent_count),
            TimingSource::Randomized(randomized) => randomized.build_profiles(agent_count),
        }
    }
}
