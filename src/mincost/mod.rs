//! Goldberg-Tarjan cost-scaling minimum-cost flow. Feasibility is checked up
//! front using an internal [`crate::maxflow::MaxFlowEngine`] as an oracle on an
//! auxiliary super-source/super-sink graph.

#[cfg(test)]
mod test;

use tracing::{info, warn};

use crate::collections::{DenseVec, SignedVec};
use crate::config::{MaxFlowConfig, MinCostFlowConfig};
use crate::graph::{ArcIndex, NodeIndex, StarGraph};
use crate::maxflow::MaxFlowEngine;
use crate::status::Status;
use crate::Quantity;

pub struct MinCostFlowEngine<'g> {
    graph: &'g StarGraph,
    config: MinCostFlowConfig,
    num_nodes: usize,

    capacity: DenseVec<Quantity>,
    cost: DenseVec<Quantity>,
    supply: DenseVec<Quantity>,

    scaled_cost: SignedVec<Quantity>,
    residual_cap: SignedVec<Quantity>,
    potential: DenseVec<Quantity>,
    excess: DenseVec<Quantity>,
    adjacency: Vec<Vec<ArcIndex>>,
    cursor: DenseVec<usize>,

    status: Status,
}

impl<'g> MinCostFlowEngine<'g> {
    pub fn new(graph: &'g StarGraph, config: MinCostFlowConfig) -> Self {
        let num_nodes = graph.num_nodes() as usize;
        let max_arcs = graph.max_num_arcs();
        let adjacency: Vec<Vec<ArcIndex>> =
            (0..graph.num_nodes()).map(|u| graph.incident(u).collect()).collect();

        MinCostFlowEngine {
            graph,
            config,
            num_nodes,
            capacity: DenseVec::filled(max_arcs.max(0) as usize, 0),
            cost: DenseVec::filled(max_arcs.max(0) as usize, 0),
            supply: DenseVec::filled(num_nodes, 0),
            scaled_cost: SignedVec::filled(max_arcs as i64, 0),
            residual_cap: SignedVec::filled(max_arcs as i64, 0),
            potential: DenseVec::filled(num_nodes, 0),
            excess: DenseVec::filled(num_nodes, 0),
            adjacency,
            cursor: DenseVec::filled(num_nodes, 0),
            status: Status::NotSolved,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn set_arc_capacity(&mut self, arc: ArcIndex, cap: Quantity) {
        debug_assert!(StarGraph::is_direct(arc));
        self.capacity.set(arc as usize, cap);
        self.status = Status::NotSolved;
    }

    pub fn set_arc_cost(&mut self, arc: ArcIndex, cost: Quantity) {
        debug_assert!(StarGraph::is_direct(arc));
        self.cost.set(arc as usize, cost);
        self.status = Status::NotSolved;
    }

    pub fn set_node_supply(&mut self, node: NodeIndex, supply: Quantity) {
        self.supply.set(node as usize, supply);
        self.status = Status::NotSolved;
    }

    pub fn flow(&self, arc: ArcIndex) -> Quantity {
        if StarGraph::is_direct(arc) {
            self.rc_cap(self.graph.opposite(arc))
        } else {
            -self.rc_cap(arc)
        }
    }

    pub fn total_cost(&self) -> Quantity {
        (0..self.graph.num_arcs()).map(|a| self.flow(a) * self.cost[a as usize]).sum()
    }

    #[inline]
    fn rc_cap(&self, a: ArcIndex) -> Quantity {
        *self.residual_cap.get(a as i64)
    }

    #[inline]
    fn rc_cap_mut(&mut self, a: ArcIndex) -> &mut Quantity {
        self.residual_cap.get_mut(a as i64)
    }

    #[inline]
    fn set_rc_cap(&mut self, a: ArcIndex, value: Quantity) {
        self.residual_cap.set(a as i64, value);
    }

    #[inline]
    fn scaled(&self, a: ArcIndex) -> Quantity {
        *self.scaled_cost.get(a as i64)
    }

    #[inline]
    fn reduced_cost(&self, a: ArcIndex) -> Quantity {
        self.scaled(a) + self.potential[self.graph.tail(a) as usize] - self.potential[self.graph.head(a) as usize]
    }

    fn apply_push(&mut self, a: ArcIndex, amount: Quantity) {
        let rev = self.graph.opposite(a);
        let tail = self.graph.tail(a);
        let head = self.graph.head(a);
        *self.rc_cap_mut(a) -= amount;
        *self.rc_cap_mut(rev) += amount;
        self.excess[tail as usize] -= amount;
        self.excess[head as usize] += amount;
    }

    pub fn solve(&mut self) -> Status {
        let _span = tracing::info_span!("mincost_solve", num_nodes = self.num_nodes).entered();
        info!(num_arcs = self.graph.num_arcs(), "starting min-cost-flow solve");

        if self.config.check_balance {
            let total: Quantity = (0..self.num_nodes).map(|u| self.supply[u]).sum();
            if total != 0 {
                warn!(total, "supplies do not sum to zero");
                self.status = Status::Unbalanced;
                return self.status;
            }
        }

        let alpha = (self.num_nodes + 1) as Quantity;
        if self.config.check_costs {
            let max_abs_cost = (0..self.graph.num_arcs()).map(|a| self.cost[a as usize].abs()).max().unwrap_or(0);
            if max_abs_cost.checked_mul(alpha).is_none() {
                warn!(max_abs_cost, alpha, "scaled cost range would overflow");
                self.status = Status::BadCostRange;
                return self.status;
            }
        }

        if self.config.check_feasibility && !self.check_feasibility() {
            self.status = Status::Infeasible;
            return self.status;
        }

        self.setup_scaled_costs(alpha);
        self.init_solve_state();

        let mut eps = self.initial_epsilon().max(1);
        loop {
            eps = if eps > 1 { (eps / self.config.alpha).max(1) } else { 1 };
            self.refine(eps);
            if eps == 1 {
                break;
            }
        }

        if self.config.check_result && !self.result_is_consistent() {
            self.status = Status::BadResult;
            return self.status;
        }

        info!(total_cost = self.total_cost(), "min-cost-flow solve complete");
        self.status = Status::Optimal;
        self.status
    }

    /// Build an auxiliary super-source/super-sink graph and run the max-flow
    /// engine on it; feasible iff it saturates total supply.
    fn check_feasibility(&self) -> bool {
        let n = self.num_nodes;
        let total_supply: Quantity = (0..n).map(|u| self.supply[u].max(0)).sum();
        if total_supply == 0 {
            return true;
        }

        let m = self.graph.num_arcs() as usize;
        let mut aux = StarGraph::reserve(n + 2, m + n).expect("auxiliary graph sizing is derived from this graph");
        let super_source = n as NodeIndex;
        let super_sink = (n + 1) as NodeIndex;

        let mut mirrored_arcs = Vec::with_capacity(m);
        for a in 0..self.graph.num_arcs() {
            let arc = aux.add_arc(self.graph.tail(a), self.graph.head(a));
            mirrored_arcs.push(arc);
        }
        let mut super_arcs = Vec::new();
        for u in 0..n as NodeIndex {
            let s = self.supply[u as usize];
            if s > 0 {
                super_arcs.push((aux.add_arc(super_source, u), s));
            } else if s < 0 {
                super_arcs.push((aux.add_arc(u, super_sink), -s));
            }
        }
        aux.build_representation();

        let mut mf = MaxFlowEngine::new(&aux, super_source, super_sink, MaxFlowConfig::default());
        for (a, &aux_arc) in mirrored_arcs.iter().enumerate() {
            mf.set_arc_capacity(aux_arc, self.capacity[a]);
        }
        for &(arc, cap) in &super_arcs {
            mf.set_arc_capacity(arc, cap);
        }
        mf.solve();
        mf.optimal_flow() == total_supply
    }

    fn setup_scaled_costs(&mut self, alpha: Quantity) {
        for a in 0..self.graph.num_arcs() {
            let scaled = self.cost[a as usize] * alpha;
            self.scaled_cost.set(a as i64, scaled);
            self.scaled_cost.set(StarGraph::opposite_of(a) as i64, -scaled);
        }
    }

    fn init_solve_state(&mut self) {
        for a in 0..self.graph.num_arcs() {
            self.set_rc_cap(a, self.capacity[a as usize]);
            self.set_rc_cap(StarGraph::opposite_of(a), 0);
        }
        self.potential.fill(0);
        for u in 0..self.num_nodes {
            self.excess[u] = self.supply[u];
        }
        self.cursor.fill(0);
    }

    fn initial_epsilon(&self) -> Quantity {
        (0..self.graph.num_arcs()).map(|a| self.scaled(a).abs()).max().unwrap_or(0)
    }

    /// One Refine phase at scaling level `eps`.
    fn refine(&mut self, eps: Quantity) {
        self.saturate_negative_arcs();

        let mut stack: Vec<NodeIndex> = Vec::new();
        let mut in_stack = vec![false; self.num_nodes];
        for u in 0..self.num_nodes as NodeIndex {
            if self.excess[u as usize] > 0 {
                stack.push(u);
                in_stack[u as usize] = true;
            }
        }
        for u in 0..self.num_nodes {
            self.cursor[u] = 0;
        }

        while let Some(v) = stack.pop() {
            in_stack[v as usize] = false;
            self.discharge(v, eps, &mut stack, &mut in_stack);
        }
    }

    fn saturate_negative_arcs(&mut self) {
        for a in 0..self.graph.num_arcs() {
            let rev = self.graph.opposite(a);
            for &candidate in &[a, rev] {
                if self.rc_cap(candidate) > 0 && self.reduced_cost(candidate) < 0 {
                    let amount = self.rc_cap(candidate);
                    self.apply_push(candidate, amount);
                }
            }
        }
    }

    fn discharge(&mut self, v: NodeIndex, eps: Quantity, stack: &mut Vec<NodeIndex>, in_stack: &mut [bool]) {
        loop {
            let degree = self.adjacency[v as usize].len();
            while self.cursor[v as usize] < degree {
                let a = self.adjacency[v as usize][self.cursor[v as usize]];
                if self.rc_cap(a) > 0 && self.reduced_cost(a) < 0 {
                    let push_amount = self.excess[v as usize].min(self.rc_cap(a));
                    let head = self.graph.head(a);
                    let was_active = self.excess[head as usize] > 0;
                    self.apply_push(a, push_amount);
                    if head != v && !was_active && self.excess[head as usize] > 0 && !in_stack[head as usize] {
                        stack.push(head);
                        in_stack[head as usize] = true;
                    }
                    if self.excess[v as usize] == 0 {
                        return;
                    }
                    if self.rc_cap(a) == 0 {
                        self.cursor[v as usize] += 1;
                    }
                } else {
                    self.cursor[v as usize] += 1;
                }
            }
            self.relabel(v, eps);
            self.cursor[v as usize] = 0;
        }
    }

    fn relabel(&mut self, v: NodeIndex, eps: Quantity) {
        if self.config.fast_potential_update {
            self.potential[v as usize] -= eps;
            return;
        }
        let mut best: Option<Quantity> = None;
        for &a in &self.adjacency[v as usize] {
            if self.rc_cap(a) > 0 {
                let candidate = self.potential[self.graph.head(a) as usize] - self.scaled(a) - eps;
                best = Some(best.map_or(candidate, |b| b.max(candidate)));
            }
        }
        self.potential[v as usize] = best.unwrap_or(self.potential[v as usize] - eps);
    }

    fn result_is_consistent(&self) -> bool {
        for u in 0..self.num_nodes {
            if self.excess[u] != 0 {
                return false;
            }
        }
        for a in 0..self.graph.num_arcs() {
            let f = self.flow(a);
            if f < 0 || f > self.capacity[a as usize] {
                return false;
            }
        }
        true
    }
}
