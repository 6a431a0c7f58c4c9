use super::*;
use crate::graph::StarGraph;

/// Two supply nodes feeding two demand nodes through a shared transshipment
/// node, with costs that make one route strictly cheaper.
fn transport_network() -> (StarGraph, ArcIndex, ArcIndex, ArcIndex, ArcIndex) {
    let mut g = StarGraph::reserve(4, 4).unwrap();
    let a01 = g.add_arc(0, 1);
    let a02 = g.add_arc(0, 2);
    let a13 = g.add_arc(1, 3);
    let a23 = g.add_arc(2, 3);
    g.build_representation();
    (g, a01, a02, a13, a23)
}

#[test]
fn routes_supply_through_the_cheaper_arc() {
    let (g, a01, a02, a13, a23) = transport_network();
    let mut engine = MinCostFlowEngine::new(&g, MinCostFlowConfig::default());
    engine.set_arc_capacity(a01, 10);
    engine.set_arc_capacity(a02, 10);
    engine.set_arc_capacity(a13, 10);
    engine.set_arc_capacity(a23, 10);
    engine.set_arc_cost(a01, 1);
    engine.set_arc_cost(a02, 5);
    engine.set_arc_cost(a13, 1);
    engine.set_arc_cost(a23, 5);
    engine.set_node_supply(0, 5);
    engine.set_node_supply(3, -5);

    assert_eq!(engine.solve(), Status::Optimal);
    assert_eq!(engine.flow(a01), 5);
    assert_eq!(engine.flow(a02), 0);
    assert_eq!(engine.total_cost(), 10);
}

#[test]
fn unbalanced_supply_is_rejected() {
    let (g, a01, a02, a13, a23) = transport_network();
    let mut engine = MinCostFlowEngine::new(&g, MinCostFlowConfig::default());
    for a in [a01, a02, a13, a23] {
        engine.set_arc_capacity(a, 10);
    }
    engine.set_node_supply(0, 5);
    engine.set_node_supply(3, -3);
    assert_eq!(engine.solve(), Status::Unbalanced);
}

#[test]
fn insufficient_capacity_is_infeasible() {
    let (g, a01, a02, a13, a23) = transport_network();
    let mut engine = MinCostFlowEngine::new(&g, MinCostFlowConfig::default());
    engine.set_arc_capacity(a01, 1);
    engine.set_arc_capacity(a02, 1);
    engine.set_arc_capacity(a13, 1);
    engine.set_arc_capacity(a23, 1);
    engine.set_node_supply(0, 5);
    engine.set_node_supply(3, -5);
    assert_eq!(engine.solve(), Status::Infeasible);
}

#[test]
fn zero_cost_instance_still_routes_supply() {
    let (g, a01, a02, a13, a23) = transport_network();
    let mut engine = MinCostFlowEngine::new(&g, MinCostFlowConfig::default());
    for a in [a01, a02, a13, a23] {
        engine.set_arc_capacity(a, 10);
    }
    engine.set_node_supply(0, 4);
    engine.set_node_supply(3, -4);

    assert_eq!(engine.solve(), Status::Optimal);
    assert_eq!(engine.flow(a01) + engine.flow(a02), 4);
    assert_eq!(engine.flow(a13) + engine.flow(a23), 4);
}

#[test]
fn slow_potential_update_still_reaches_optimum() {
    let (g, a01, a02, a13, a23) = transport_network();
    let mut config = MinCostFlowConfig::default();
    config.fast_potential_update = false;
    let mut engine = MinCostFlowEngine::new(&g, config);
    engine.set_arc_capacity(a01, 10);
    engine.set_arc_capacity(a02, 10);
    engine.set_arc_capacity(a13, 10);
    engine.set_arc_capacity(a23, 10);
    engine.set_arc_cost(a01, 2);
    engine.set_arc_cost(a02, 1);
    engine.set_arc_cost(a13, 2);
    engine.set_arc_cost(a23, 1);
    engine.set_node_supply(0, 6);
    engine.set_node_supply(3, -6);

    assert_eq!(engine.solve(), Status::Optimal);
    assert_eq!(engine.total_cost(), 12);
}
