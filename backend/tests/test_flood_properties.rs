//! Property tests for flood routing
//!
//! Random connected graphs with random clocks. Every graph contains a spanning
//! path N0-N1-...-N(n-1) plus arbitrary extra edges; "Far" is an extra node
//! with no edges, so addressing it forces a pure flood.

use flood_simulator_core_rs::{
    AgentId, EngineSnapshot, Graph, LogLevel, Message, SimulationEngine, StopConditions,
    StopReason, TimingProfile,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

const MAX_LOOP: u64 = 4;

#[derive(Debug, Clone)]
struct Scenario {
    nodes: usize,
    extra_edges: Vec<(usize, usize)>,
    clocks: Vec<(u64, u64)>,
    source: usize,
    target: usize,
}

fn node(i: usize) -> AgentId {
    AgentId::from(format!("N{}", i))
}

fn scenario() -> impl Strategy<Value = Scenario> {
    (2usize..7).prop_flat_map(|nodes| {
        (
            Just(nodes),
            prop::collection::vec((0..nodes, 0..nodes), 0..8),
            // one clock per agent including "Far"
            prop::collection::vec((1..=MAX_LOOP, 0u64..6), nodes + 1),
            0..nodes,
            0..nodes,
        )
            .prop_map(|(nodes, extra_edges, clocks, source, target)| Scenario {
                nodes,
                extra_edges,
                clocks,
                source,
                target,
            })
    })
}

impl Scenario {
    fn graph(&self) -> Graph {
        let mut graph = Graph::new();
        for i in 1..self.nodes {
            graph.add_edge(node(i - 1), node(i));
        }
        for &(a, b) in &self.extra_edges {
            graph.add_edge(node(a), node(b));
        }
        graph.add_node(AgentId::from("Far"));
        graph
    }

    fn engine(&self) -> SimulationEngine {
        let profiles = self
            .clocks
            .iter()
            .map(|&(loop_length, offset)| TimingProfile::new(loop_length, offset, 1).unwrap())
            .collect();
        SimulationEngine::with_profiles(&self.graph(), profiles).unwrap()
    }

    /// Enough steps for any simple path to be fully travelled
    fn step_budget(&self) -> u64 {
        (self.nodes as u64 + 1) * (MAX_LOOP + 1) + 5
    }
}

fn terminal_messages(engine: &SimulationEngine) -> Vec<&Message> {
    engine
        .agents()
        .flat_map(|agent| agent.delivered().iter().chain(agent.dead_ends().iter()))
        .collect()
}

fn assert_well_formed(message: &Message, node_count: usize) {
    let chain = message.propagation_chain();
    let unique: BTreeSet<&AgentId> = chain.iter().collect();
    assert_eq!(unique.len(), chain.len(), "repeated id in {:?}", chain);
    assert!(chain.len() <= node_count);
    assert_eq!(message.global_arrival_times().len(), chain.len() - 1);
    assert_eq!(message.local_arrival_times().len(), chain.len());
    assert!(
        message
            .global_arrival_times()
            .windows(2)
            .all(|pair| pair[0] < pair[1]),
        "arrival times not increasing: {:?}",
        message.global_arrival_times()
    );
}

proptest! {
    #[test]
    fn flood_to_unreachable_target_always_dead_ends(s in scenario()) {
        let mut engine = s.engine();
        engine.inject(&node(s.source), &AgentId::from("Far")).unwrap();

        engine
            .run(&StopConditions::iterations(s.step_budget()), LogLevel::Summary)
            .unwrap();

        prop_assert_eq!(EngineSnapshot::capture(&engine).in_flight(), 0);

        let finished = terminal_messages(&engine);
        prop_assert!(!finished.is_empty());
        for message in finished {
            assert_well_formed(message, s.nodes);
            prop_assert!(message.target_agent_id() != message.current_holder());
        }
        prop_assert!(engine
            .agent(&AgentId::from("Far"))
            .unwrap()
            .delivered()
            .is_empty());
    }

    #[test]
    fn flood_to_reachable_target_is_delivered(s in scenario()) {
        prop_assume!(s.source != s.target);
        let mut engine = s.engine();
        engine.inject(&node(s.source), &node(s.target)).unwrap();

        let outcome = engine
            .run(
                &StopConditions::delivered_any().with_iterations(s.step_budget()),
                LogLevel::Summary,
            )
            .unwrap();

        prop_assert_eq!(outcome.reason, StopReason::Delivered);
        let target = engine.agent(&node(s.target)).unwrap();
        prop_assert!(target.received_for_me());
        for message in target.delivered() {
            assert_well_formed(message, s.nodes);
            prop_assert_eq!(message.propagation_chain().first(), Some(&node(s.source)));
            prop_assert_eq!(message.current_holder(), &node(s.target));
        }
    }

    #[test]
    fn in_flight_copies_keep_history_aligned(s in scenario(), steps in 1u64..20) {
        let mut engine = s.engine();
        engine.inject(&node(s.source), &AgentId::from("Far")).unwrap();
        for _ in 0..steps {
            engine.step();
        }
        for agent in engine.agents() {
            for message in agent.inbox() {
                assert_well_formed(message, s.nodes);
                prop_assert_eq!(message.current_holder(), agent.id());
            }
        }
    }
}
