//! Per-agent clock for the simulation
//!
//! Every agent runs an operation loop of `loop_length` global ticks. The loop
//! is phase-shifted by `start_offset`, so two agents with the same period can
//! still fire on different global ticks. An agent only processes its inbox
//! when its loop wraps around ("fires").

use serde::Serialize;
use thiserror::Error;

/// Errors raised while building a timing profile
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimingError {
    #[error("loop_length must be positive")]
    NonPositiveLoopLength,
}

/// Clock parameters and clock state of a single agent
///
/// # Example
/// ```
/// use flood_simulator_core_rs::TimingProfile;
///
/// let mut timing = TimingProfile::new(10, 23, 1).unwrap();
/// assert_eq!(timing.current_loop_time(), 3);
/// assert_eq!(timing.current_cycle(), 2);
///
/// for _ in 0..6 {
///     assert!(!timing.advance());
/// }
/// assert!(timing.advance()); // seventh tick wraps the loop
/// assert_eq!(timing.current_loop_time(), 0);
/// assert_eq!(timing.current_cycle(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimingProfile {
    /// Global ticks per operation loop (always > 0)
    loop_length: u64,

    /// Global tick at which this clock is considered to start
    start_offset: u64,

    /// Reserved per-message processing delay (not applied by forwarding)
    msg_process_time: u64,

    /// Reserved per-hop transfer delay (not applied by exchange)
    msg_transfer_time: u64,

    /// Position inside the current loop, `0 <= current_loop_time < loop_length`
    current_loop_time: u64,

    /// Completed operation loops
    current_cycle: u64,
}

impl TimingProfile {
    /// Create a new clock
    ///
    /// The clock starts part-way through a loop: `start_offset % loop_length`
    /// ticks in, with `start_offset / loop_length` cycles already completed.
    ///
    /// # Errors
    /// Returns [`TimingError::NonPositiveLoopLength`] if `loop_length` is 0.
    pub fn new(
        loop_length: u64,
        start_offset: u64,
        msg_process_time: u64,
    ) -> Result<Self, TimingError> {
        if loop_length == 0 {
            return Err(TimingError::NonPositiveLoopLength);
        }

        Ok(Self {
            loop_length,
            start_offset,
            msg_process_time,
            msg_transfer_time: 0,
            current_loop_time: start_offset % loop_length,
            current_cycle: start_offset / loop_length,
        })
    }

    /// Set the reserved transfer delay
    pub fn with_transfer_time(mut self, msg_transfer_time: u64) -> Self {
        self.msg_transfer_time = msg_transfer_time;
        self
    }

    /// Advance the clock by one global tick
    ///
    /// Returns `true` when the loop wrapped around on this tick, i.e. the
    /// owning agent must handle its buffer.
    pub fn advance(&mut self) -> bool {
        self.current_loop_time += 1;
        if self.current_loop_time >= self.loop_length {
            self.current_loop_time = 0;
            self.current_cycle += 1;
            true
        } else {
            false
        }
    }

    pub fn loop_length(&self) -> u64 {
        self.loop_length
    }

    pub fn start_offset(&self) -> u64 {
        self.start_offset
    }

    pub fn msg_process_time(&self) -> u64 {
        self.msg_process_time
    }

    pub fn msg_transfer_time(&self) -> u64 {
        self.msg_transfer_time
    }

    /// Position inside the current operation loop
    pub fn current_loop_time(&self) -> u64 {
        self.current_loop_time
    }

    /// Number of completed operation loops
    pub fn current_cycle(&self) -> u64 {
        self.current_cycle
    }
}
