//! Tests for TimingProfile (per-agent clock)

use flood_simulator_core_rs::{Agent, AgentId, Graph, TimingError, TimingProfile};

#[test]
fn test_initial_state_from_offset() {
    let timing = TimingProfile::new(10, 23, 1).unwrap();
    assert_eq!(timing.current_loop_time(), 3);
    assert_eq!(timing.current_cycle(), 2);
    assert_eq!(timing.loop_length(), 10);
    assert_eq!(timing.start_offset(), 23);
}

#[test]
fn test_fires_once_after_seven_ticks() {
    let graph = Graph::from_edges([("A", "B")]);
    let timing = TimingProfile::new(10, 23, 1).unwrap();
    let mut agent = Agent::new(AgentId::from("A"), &graph, &timing);

    let firings = (0..7).filter_map(|_| agent.tick()).count();

    assert_eq!(firings, 1);
    assert_eq!(agent.timing().current_loop_time(), 0);
    assert_eq!(agent.timing().current_cycle(), 3);
}

#[test]
fn test_loop_time_stays_in_range() {
    let mut timing = TimingProfile::new(7, 4, 0).unwrap();
    for _ in 0..100 {
        timing.advance();
        assert!(timing.current_loop_time() < timing.loop_length());
    }
}

#[test]
fn test_fires_every_loop_length_ticks() {
    let mut timing = TimingProfile::new(4, 0, 0).unwrap();
    let fired_on: Vec<usize> = (1..=12).filter(|_| timing.advance()).collect();
    assert_eq!(fired_on, vec![4, 8, 12]);
}

#[test]
fn test_offset_multiple_of_loop_length() {
    let timing = TimingProfile::new(5, 15, 0).unwrap();
    assert_eq!(timing.current_loop_time(), 0);
    assert_eq!(timing.current_cycle(), 3);
}

#[test]
fn test_zero_loop_length_is_configuration_error() {
    let err = TimingProfile::new(0, 0, 0).unwrap_err();
    assert_eq!(err, TimingError::NonPositiveLoopLength);
    assert_eq!(err.to_string(), "loop_length must be positive");
}

#[test]
fn test_agents_never_share_clock_state() {
    let graph = Graph::from_edges([("A", "B")]);
    let template = TimingProfile::new(3, 0, 1).unwrap();

    let mut a = Agent::new(AgentId::from("A"), &graph, &template);
    let b = Agent::new(AgentId::from("B"), &graph, &template);

    a.tick();
    a.tick();

    assert_eq!(a.timing().current_loop_time(), 2);
    assert_eq!(b.timing().current_loop_time(), 0);
    assert_eq!(template.current_loop_time(), 0);
}
