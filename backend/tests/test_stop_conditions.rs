//! Tests for the run loop and its stop conditions

use flood_simulator_core_rs::timing::{ExplicitTiming, TimingParam, TimingSource};
use flood_simulator_core_rs::{
    AgentId, Event, Graph, LogLevel, SimulationConfig, SimulationEngine, SimulationError,
    StopConditions, StopReason,
};

fn engine(loop_length: u64, start_offset: u64) -> SimulationEngine {
    let graph = Graph::from_edges([("A", "B"), ("B", "C")]);
    let timing = TimingSource::Explicit(
        ExplicitTiming::default()
            .with_loop_length(TimingParam::Uniform(loop_length))
            .with_start_offset(TimingParam::Uniform(start_offset)),
    );
    SimulationEngine::new(&graph, &timing).unwrap()
}

#[test]
fn test_iterations_halt_regardless_of_traffic() {
    for with_traffic in [false, true] {
        let mut engine = engine(2, 7);
        if with_traffic {
            engine
                .inject(&AgentId::from("A"), &AgentId::from("C"))
                .unwrap();
        }
        let start = engine.global_time();

        let outcome = engine
            .run(&StopConditions::iterations(5), LogLevel::Summary)
            .unwrap();

        assert_eq!(outcome.reason, StopReason::IterationLimit);
        assert_eq!(outcome.global_time, start + 5 + 1);
        assert_eq!(engine.global_time(), start + 5 + 1);
        assert_eq!(outcome.steps, 6);
    }
}

#[test]
fn test_iterations_zero_runs_one_step() {
    let mut engine = engine(3, 0);
    let outcome = engine
        .run(&StopConditions::iterations(0), LogLevel::Summary)
        .unwrap();
    assert_eq!(outcome.steps, 1);
}

#[test]
fn test_delivered_any_halts_on_delivery_step() {
    let mut engine = engine(1, 0);
    engine
        .inject(&AgentId::from("A"), &AgentId::from("C"))
        .unwrap();

    let outcome = engine
        .run(&StopConditions::delivered_any(), LogLevel::Summary)
        .unwrap();

    // A→B on step 1, B→C on step 2, C consumes it on step 3
    assert_eq!(outcome.reason, StopReason::Delivered);
    assert_eq!(outcome.steps, 3);
    assert!(engine.agent(&AgentId::from("C")).unwrap().received_for_me());
}

#[test]
fn test_first_satisfied_condition_wins() {
    let mut late = engine(1, 0);
    late.inject(&AgentId::from("A"), &AgentId::from("C"))
        .unwrap();
    let outcome = late
        .run(
            &StopConditions::delivered_any().with_iterations(100),
            LogLevel::Summary,
        )
        .unwrap();
    assert_eq!(outcome.reason, StopReason::Delivered);

    let mut early = engine(1, 0);
    early
        .inject(&AgentId::from("A"), &AgentId::from("C"))
        .unwrap();
    let outcome = early
        .run(
            &StopConditions::iterations(1).with_delivered_any(),
            LogLevel::Summary,
        )
        .unwrap();
    assert_eq!(outcome.reason, StopReason::IterationLimit);
    assert_eq!(outcome.steps, 2);
}

#[test]
fn test_run_requires_a_condition() {
    let mut engine = engine(1, 0);
    assert_eq!(
        engine.run(&StopConditions::default(), LogLevel::Summary),
        Err(SimulationError::NoStopCondition)
    );
    assert_eq!(engine.global_time(), 0);
}

#[test]
fn test_consecutive_runs_measure_from_their_own_start() {
    let mut engine = engine(4, 0);
    engine
        .run(&StopConditions::iterations(3), LogLevel::Summary)
        .unwrap();
    assert_eq!(engine.global_time(), 4);

    let outcome = engine
        .run(&StopConditions::iterations(3), LogLevel::Summary)
        .unwrap();
    assert_eq!(outcome.global_time, 8);
}

#[test]
fn test_run_halt_is_logged() {
    let mut engine = engine(1, 0);
    engine
        .run(&StopConditions::iterations(2), LogLevel::Messages)
        .unwrap();

    let halts = engine.event_log().events_of_type("RunHalted");
    assert_eq!(halts.len(), 1);
    assert_eq!(
        halts[0],
        &Event::RunHalted {
            tick: 3,
            reason: StopReason::IterationLimit,
        }
    );
}

#[test]
fn test_run_from_parsed_config() {
    let config = SimulationConfig::from_json(
        r#"{
            "timing": { "explicit": { "loop_length": 1 } },
            "stop": { "iterations": 50, "delivered_any": true },
            "log_level": 2
        }"#,
    )
    .unwrap();
    let graph = Graph::from_edges([("A", "B"), ("B", "C")]);

    let mut engine = SimulationEngine::from_config(&graph, &config).unwrap();
    assert_eq!(engine.global_time(), 0);
    engine
        .inject(&AgentId::from("A"), &AgentId::from("C"))
        .unwrap();

    let outcome = engine.run_configured(&config).unwrap();
    assert_eq!(outcome.reason, StopReason::Delivered);
    assert_eq!(outcome.steps, 3);
    assert_eq!(outcome.global_time, 3);
}

#[test]
fn test_config_without_stop_condition_cannot_run() {
    let config = SimulationConfig::from_json(r#"{ "stop": {} }"#).unwrap();
    let graph = Graph::from_edges([("A", "B")]);

    let mut engine = SimulationEngine::from_config(&graph, &config).unwrap();
    assert_eq!(
        engine.run_configured(&config),
        Err(SimulationError::NoStopCondition)
    );
}

#[test]
fn test_config_timing_errors_surface_at_construction() {
    let config = SimulationConfig::from_json(
        r#"{ "timing": { "explicit": { "loop_length": [3, 4, 5] } }, "stop": { "iterations": 1 } }"#,
    )
    .unwrap();
    let graph = Graph::from_edges([("A", "B")]);

    assert!(matches!(
        SimulationEngine::from_config(&graph, &config),
        Err(SimulationError::Timing(_))
    ));
}
