use super::*;
use crate::graph::StarGraph;

/// A complete bipartite graph on `k=3`, arcs indexed `[left][right]`.
fn complete_k3() -> (StarGraph, [[ArcIndex; 3]; 3]) {
    let mut g = StarGraph::reserve(6, 9).unwrap();
    let mut arcs = [[0 as ArcIndex; 3]; 3];
    for l in 0..3 {
        for r in 0..3 {
            arcs[l][r] = g.add_arc(l as NodeIndex, (3 + r) as NodeIndex);
        }
    }
    g.build_representation();
    (g, arcs)
}

#[test]
fn finds_the_minimum_cost_perfect_matching() {
    let costs: [[Quantity; 3]; 3] = [[4, 1, 3], [2, 0, 5], [3, 2, 2]];
    let (g, arcs) = complete_k3();
    let mut engine = AssignmentEngine::new(&g, 3, AssignmentConfig::default());
    for l in 0..3 {
        for r in 0..3 {
            engine.set_arc_cost(arcs[l][r], costs[l][r]);
        }
    }

    assert!(engine.solve());
    assert_eq!(engine.status(), Status::Optimal);

    let mut mates = [NIL_NODE; 3];
    for l in 0..3 {
        mates[l] = engine.mate(l as NodeIndex);
    }
    // every left node perfectly matched to a distinct right node
    let mut seen = [false; 3];
    for &m in &mates {
        assert!(m != NIL_NODE);
        let idx = (m as usize) - 3;
        assert!(!seen[idx]);
        seen[idx] = true;
    }
    assert_eq!(engine.cost(), 1 + 2 + 2);
}

#[test]
fn fifo_ordering_still_finds_optimum() {
    let costs: [[Quantity; 3]; 3] = [[4, 1, 3], [2, 0, 5], [3, 2, 2]];
    let (g, arcs) = complete_k3();
    let mut config = AssignmentConfig::default();
    config.use_stack_order = false;
    let mut engine = AssignmentEngine::new(&g, 3, config);
    for l in 0..3 {
        for r in 0..3 {
            engine.set_arc_cost(arcs[l][r], costs[l][r]);
        }
    }
    assert!(engine.solve());
    assert_eq!(engine.cost(), 5);
}

#[test]
fn left_node_with_no_arcs_is_infeasible() {
    let mut g = StarGraph::reserve(4, 2).unwrap();
    let a0 = g.add_arc(0, 2);
    let a1 = g.add_arc(0, 3);
    g.build_representation();
    let mut engine = AssignmentEngine::new(&g, 2, AssignmentConfig::default());
    engine.set_arc_cost(a0, 1);
    engine.set_arc_cost(a1, 2);
    // left node 1 has no outgoing arcs at all.

    assert!(!engine.solve());
    assert_eq!(engine.status(), Status::Infeasible);
}

#[test]
fn trivial_empty_instance_is_optimal() {
    let g = StarGraph::reserve(0, 0).unwrap();
    let mut engine = AssignmentEngine::new(&g, 0, AssignmentConfig::default());
    assert!(engine.solve());
    assert_eq!(engine.status(), Status::Optimal);
}
