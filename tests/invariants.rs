use proptest::prelude::*;
use pushflow::assignment::AssignmentEngine;
use pushflow::graph::StarGraph;
use pushflow::maxflow::MaxFlowEngine;
use pushflow::mincost::MinCostFlowEngine;
use pushflow::{AssignmentConfig, MaxFlowConfig, MinCostFlowConfig, Quantity, Status};

/// Fixed six-node topology (source 0, sink 5) with nine arcs; only capacities vary.
fn layered_topology() -> (StarGraph, Vec<(i32, i32)>) {
    let edges = [
        (0, 1),
        (0, 2),
        (0, 3),
        (0, 4),
        (1, 3),
        (2, 3),
        (3, 4),
        (3, 5),
        (4, 5),
    ];
    let mut g = StarGraph::reserve(6, edges.len()).unwrap();
    for &(u, v) in &edges {
        g.add_arc(u, v);
    }
    g.build_representation();
    (g, edges.to_vec())
}

fn capacities_strategy(n: usize) -> impl Strategy<Value = Vec<Quantity>> {
    prop::collection::vec(0..20i64, n)
}

proptest! {
    #[test]
    fn maxflow_respects_capacity_and_reverse_arc_bounds(caps in capacities_strategy(9)) {
        let (g, _edges) = layered_topology();
        let mut engine = MaxFlowEngine::new(&g, 0, 5, MaxFlowConfig::default());
        for (a, &cap) in caps.iter().enumerate() {
            engine.set_arc_capacity(a as i32, cap);
        }
        let status = engine.solve();
        prop_assert_eq!(status, Status::Optimal);

        for (a, &cap) in caps.iter().enumerate() {
            let a = a as i32;
            let f = engine.flow(a);
            prop_assert!(f >= 0 && f <= cap);
            prop_assert_eq!(engine.flow(g.opposite(a)), -f);
        }
    }

    #[test]
    fn maxflow_conserves_flow_at_interior_nodes(caps in capacities_strategy(9)) {
        let (g, edges) = layered_topology();
        let mut engine = MaxFlowEngine::new(&g, 0, 5, MaxFlowConfig::default());
        for (a, &cap) in caps.iter().enumerate() {
            engine.set_arc_capacity(a as i32, cap);
        }
        prop_assert_eq!(engine.solve(), Status::Optimal);

        for node in 1..5 {
            let mut net = 0i64;
            for (a, &(u, v)) in edges.iter().enumerate() {
                let a = a as i32;
                if u == node {
                    net += engine.flow(a);
                }
                if v == node {
                    net -= engine.flow(a);
                }
            }
            prop_assert_eq!(net, 0);
        }
    }

    #[test]
    fn maxflow_equals_min_cut_capacity(caps in capacities_strategy(9)) {
        let (g, edges) = layered_topology();
        let mut engine = MaxFlowEngine::new(&g, 0, 5, MaxFlowConfig::default());
        for (a, &cap) in caps.iter().enumerate() {
            engine.set_arc_capacity(a as i32, cap);
        }
        prop_assert_eq!(engine.solve(), Status::Optimal);

        let mut source_side = Vec::new();
        engine.source_side_min_cut(&mut source_side);

        let cut_capacity: Quantity = edges
            .iter()
            .enumerate()
            .filter(|(_, &(u, v))| source_side.contains(&u) && !source_side.contains(&v))
            .map(|(a, _)| caps[a])
            .sum();

        prop_assert_eq!(engine.optimal_flow(), cut_capacity);
    }
}

/// Fixed 3x3 bipartite topology: left nodes [0,3), right nodes [3,6).
fn bipartite_topology() -> (StarGraph, [[i32; 3]; 3]) {
    let mut g = StarGraph::reserve(6, 9).unwrap();
    let mut arcs = [[0i32; 3]; 3];
    for l in 0..3 {
        for r in 0..3 {
            arcs[l][r] = g.add_arc(l as i32, (3 + r) as i32);
        }
    }
    g.build_representation();
    (g, arcs)
}

fn cost_matrix_strategy() -> impl Strategy<Value = [[Quantity; 3]; 3]> {
    prop::collection::vec(0..50i64, 9).prop_map(|v| {
        let mut m = [[0i64; 3]; 3];
        for l in 0..3 {
            for r in 0..3 {
                m[l][r] = v[l * 3 + r];
            }
        }
        m
    })
}

proptest! {
    #[test]
    fn mincost_conserves_flow_and_respects_capacity(costs in cost_matrix_strategy()) {
        let (g, arcs) = bipartite_topology();
        let mut engine = MinCostFlowEngine::new(&g, MinCostFlowConfig::default());
        for l in 0..3 {
            for r in 0..3 {
                engine.set_arc_capacity(arcs[l][r], 1);
                engine.set_arc_cost(arcs[l][r], costs[l][r]);
            }
        }
        for l in 0..3 {
            engine.set_node_supply(l as i32, 1);
        }
        for r in 0..3 {
            engine.set_node_supply((3 + r) as i32, -1);
        }
        prop_assert_eq!(engine.solve(), Status::Optimal);

        for l in 0..3 {
            let mut out_flow = 0;
            for r in 0..3 {
                let f = engine.flow(arcs[l][r]);
                prop_assert!(f >= 0 && f <= 1);
                out_flow += f;
            }
            prop_assert_eq!(out_flow, 1);
        }
        for r in 0..3 {
            let in_flow: Quantity = (0..3).map(|l| engine.flow(arcs[l][r])).sum();
            prop_assert_eq!(in_flow, 1);
        }
    }

    #[test]
    fn mincost_matches_brute_force_optimum(costs in cost_matrix_strategy()) {
        let (g, arcs) = bipartite_topology();
        let mut engine = MinCostFlowEngine::new(&g, MinCostFlowConfig::default());
        for l in 0..3 {
            for r in 0..3 {
                engine.set_arc_capacity(arcs[l][r], 1);
                engine.set_arc_cost(arcs[l][r], costs[l][r]);
            }
        }
        for l in 0..3 {
            engine.set_node_supply(l as i32, 1);
        }
        for r in 0..3 {
            engine.set_node_supply((3 + r) as i32, -1);
        }
        prop_assert_eq!(engine.solve(), Status::Optimal);

        let best = brute_force_assignment_cost(&costs);
        prop_assert_eq!(engine.total_cost(), best);
    }

    #[test]
    fn assignment_matches_brute_force_optimum(costs in cost_matrix_strategy()) {
        let (g, arcs) = bipartite_topology();
        let mut engine = AssignmentEngine::new(&g, 3, AssignmentConfig::default());
        for l in 0..3 {
            for r in 0..3 {
                engine.set_arc_cost(arcs[l][r], costs[l][r]);
            }
        }
        prop_assert!(engine.solve());
        prop_assert_eq!(engine.status(), Status::Optimal);

        // every left node perfectly matched to a distinct right node
        let mut seen = [false; 3];
        for l in 0..3 {
            let m = engine.mate(l as i32);
            prop_assert!(m >= 3 && m < 6);
            let idx = (m as usize) - 3;
            prop_assert!(!seen[idx]);
            seen[idx] = true;
        }

        let best = brute_force_assignment_cost(&costs);
        prop_assert_eq!(engine.cost(), best);
    }
}

fn brute_force_assignment_cost(costs: &[[Quantity; 3]; 3]) -> Quantity {
    let mut perms = [[0usize, 1, 2]; 6];
    let mut i = 0;
    for a in 0..3 {
        for b in 0..3 {
            if b == a {
                continue;
            }
            let c = 3 - a - b;
            perms[i] = [a, b, c];
            i += 1;
        }
    }
    perms[..i]
        .iter()
        .map(|p| costs[0][p[0]] + costs[1][p[1]] + costs[2][p[2]])
        .min()
        .unwrap()
}

#[test]
fn mincost_feasibility_round_trip_on_unreachable_demand() {
    let mut g = StarGraph::reserve(4, 1).unwrap();
    let a01 = g.add_arc(0, 1);
    g.build_representation();

    let mut engine = MinCostFlowEngine::new(&g, MinCostFlowConfig::default());
    engine.set_arc_capacity(a01, 1);
    engine.set_node_supply(0, 1);
    engine.set_node_supply(3, -1);

    assert_eq!(engine.solve(), Status::Infeasible);
}

#[test]
fn mincost_unbalanced_supply_is_reported_before_feasibility_is_checked() {
    let mut g = StarGraph::reserve(2, 1).unwrap();
    let a01 = g.add_arc(0, 1);
    g.build_representation();

    let mut engine = MinCostFlowEngine::new(&g, MinCostFlowConfig::default());
    engine.set_arc_capacity(a01, 5);
    engine.set_node_supply(0, 3);
    engine.set_node_supply(1, -2);

    assert_eq!(engine.solve(), Status::Unbalanced);
}
