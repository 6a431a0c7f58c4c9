//! Goldberg-Kennedy cost-scaling bipartite matching: the hardest of the three
//! engines, with asymmetric ε-optimality and an implicit left-side price.

#[cfg(test)]
mod test;

use tracing::{info, warn};

use crate::active_nodes::ActiveNodeOrder;
use crate::collections::DenseVec;
use crate::config::AssignmentConfig;
use crate::graph::{ArcIndex, NodeIndex, StarGraph, NIL_ARC, NIL_NODE};
use crate::status::Status;
use crate::Quantity;

enum PushOutcome {
    Single,
    Double,
    Infeasible,
}

/// A bipartite graph with `k` left nodes `[0, k)` and `k` right nodes `[k, 2k)`,
/// every arc oriented left-to-right.
pub struct AssignmentEngine<'g> {
    graph: &'g StarGraph,
    config: AssignmentConfig,
    k: usize,

    cost: DenseVec<Quantity>,
    scaled_cost: DenseVec<Quantity>,
    adjacency: Vec<Vec<ArcIndex>>,

    matched_arc: DenseVec<ArcIndex>,
    right_mate: DenseVec<NodeIndex>,
    price: DenseVec<Quantity>,

    status: Status,
}

impl<'g> AssignmentEngine<'g> {
    pub fn new(graph: &'g StarGraph, k: usize, config: AssignmentConfig) -> Self {
        let max_arcs = graph.max_num_arcs();
        let adjacency: Vec<Vec<ArcIndex>> = (0..k as NodeIndex).map(|l| graph.outgoing(l).collect()).collect();

        AssignmentEngine {
            graph,
            config,
            k,
            cost: DenseVec::filled(max_arcs.max(0) as usize, 0),
            scaled_cost: DenseVec::filled(max_arcs.max(0) as usize, 0),
            adjacency,
            matched_arc: DenseVec::filled(k, NIL_ARC),
            right_mate: DenseVec::filled(k, NIL_NODE),
            price: DenseVec::filled(k, 0),
            status: Status::NotSolved,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn set_arc_cost(&mut self, arc: ArcIndex, cost: Quantity) {
        debug_assert!(StarGraph::is_direct(arc));
        self.cost.set(arc as usize, cost);
        self.status = Status::NotSolved;
    }

    pub fn assignment_arc(&self, left: NodeIndex) -> ArcIndex {
        self.matched_arc[left as usize]
    }

    pub fn mate(&self, left: NodeIndex) -> NodeIndex {
        let a = self.matched_arc[left as usize];
        if a == NIL_ARC {
            NIL_NODE
        } else {
            self.graph.head(a)
        }
    }

    pub fn cost(&self) -> Quantity {
        (0..self.k as NodeIndex)
            .map(|l| {
                let a = self.matched_arc[l as usize];
                if a == NIL_ARC {
                    0
                } else {
                    self.cost[a as usize]
                }
            })
            .sum()
    }

    /// Runs cost scaling to a perfect matching. Returns `true` (and `Status::Optimal`)
    /// iff a feasible perfect matching was found; the per-engine [`Status`] mirrors the
    /// other two engines so callers can treat all three uniformly, and also records
    /// *why* a solve failed rather than just that it did.
    pub fn solve(&mut self) -> bool {
        let _span = tracing::info_span!("assignment_solve", k = self.k).entered();
        info!("starting assignment solve");

        if self.k == 0 {
            self.status = Status::Optimal;
            return true;
        }

        let alpha_scale = 1 + (self.k as Quantity) / 2;
        self.setup_scaled_costs(alpha_scale);
        self.warn_if_overflow_risk();

        let mut eps = self.initial_epsilon().max(1);
        loop {
            eps = if eps > 1 { (eps / self.config.alpha).max(1) } else { 1 };
            if !self.refine(eps) {
                self.status = Status::Infeasible;
                return false;
            }
            if eps == 1 {
                break;
            }
        }

        info!(total_cost = self.cost(), "assignment solve complete");
        self.status = Status::Optimal;
        true
    }

    fn setup_scaled_costs(&mut self, alpha_scale: Quantity) {
        for a in 0..self.graph.num_arcs() {
            self.scaled_cost.set(a as usize, self.cost[a as usize] * alpha_scale);
        }
    }

    fn initial_epsilon(&self) -> Quantity {
        (0..self.graph.num_arcs()).map(|a| self.scaled_cost[a as usize].abs()).max().unwrap_or(0)
    }

    fn warn_if_overflow_risk(&self) {
        let k = self.k as f64;
        let alpha = self.config.alpha as f64;
        let bound = ((k - 1.0).max(0.0) / 2.0 * (1.0 + alpha)).ceil();
        if bound > Quantity::MAX as f64 {
            warn!(bound, "predicted price_reduction_bound may overflow the quantity type");
        }
    }

    #[inline]
    fn prc(&self, a: ArcIndex) -> Quantity {
        let r = self.graph.head(a);
        self.scaled_cost[a as usize] - self.price[(r as usize) - self.k]
    }

    fn price_reduction_bound(&self, eps: Quantity) -> Quantity {
        let k = self.k as i128;
        let alpha = self.config.alpha as i128;
        let numerator = (k - 1).max(0) * eps as i128 * (1 + alpha);
        let bound = (numerator + 1) / 2;
        bound.min(Quantity::MAX as i128) as Quantity
    }

    fn price_lower_bound(&self, bound: Quantity) -> Quantity {
        let alpha = self.config.alpha as i128;
        let v = -(bound as i128 * (alpha - 1).max(0));
        v.max(Quantity::MIN as i128) as Quantity
    }

    /// One Refine phase at scaling level `eps`: unmatch every left node, then
    /// repeatedly `DoublePush` active left nodes until none remain.
    fn refine(&mut self, eps: Quantity) -> bool {
        self.matched_arc.fill(NIL_ARC);
        self.right_mate.fill(NIL_NODE);

        let mut active = ActiveNodeOrder::new(self.config.use_stack_order);
        for l in 0..self.k as NodeIndex {
            active.push(l);
        }
        let mut total_excess = self.k;

        let bound = self.price_reduction_bound(eps);
        let lower_bound = self.price_lower_bound(bound);

        while total_excess > 0 {
            let l = active.pop().expect("active container empty while excess remains");
            match self.double_push(l, eps, bound, lower_bound, &mut active) {
                PushOutcome::Single => total_excess -= 1,
                PushOutcome::Double => {}
                PushOutcome::Infeasible => return false,
            }
        }
        true
    }

    fn double_push(
        &mut self,
        l: NodeIndex,
        eps: Quantity,
        default_gap: Quantity,
        lower_bound: Quantity,
        active: &mut ActiveNodeOrder,
    ) -> PushOutcome {
        let arcs = &self.adjacency[l as usize];
        if arcs.is_empty() {
            return PushOutcome::Infeasible;
        }

        let mut best_arc = arcs[0];
        let mut best_prc = self.prc(best_arc);
        let mut second_prc: Option<Quantity> = None;
        for &a in &arcs[1..] {
            let p = self.prc(a);
            if p < best_prc {
                second_prc = Some(best_prc);
                best_arc = a;
                best_prc = p;
            } else {
                second_prc = Some(second_prc.map_or(p, |s| s.min(p)));
            }
        }

        let gap = second_prc.map_or(default_gap, |s| s - best_prc);
        let r = self.graph.head(best_arc);
        let r_idx = (r as usize) - self.k;
        let previous_left = self.right_mate[r_idx];

        self.matched_arc[l as usize] = best_arc;
        self.right_mate[r_idx] = l;

        let outcome = if previous_left != NIL_NODE {
            self.matched_arc[previous_left as usize] = NIL_ARC;
            active.push(previous_left);
            PushOutcome::Double
        } else {
            PushOutcome::Single
        };

        self.price[r_idx] -= gap + eps;
        if self.price[r_idx] < lower_bound {
            return PushOutcome::Infeasible;
        }
        outcome
    }
}
