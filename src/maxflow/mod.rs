//! Goldberg-Tarjan push-relabel maximum flow.


use std::collections::VecDeque;

use tracing::{info, trace, warn};

use crate::active_nodes::BucketQueue;
use crate::collections::{DenseVec, SignedVec};
use crate::config::MaxFlowConfig;
use crate::graph::{ArcIndex, NodeIndex, StarGraph};
use crate::status::{Status, TickSignal};
use crate::Quantity;

/// Push-relabel maximum flow engine attached to a [`StarGraph`]. Owns its own
/// residual/potential/excess arrays; the graph is borrowed immutably for the
/// engine's whole lifetime.
pub struct MaxFlowEngine<'g> {
    graph: &'g StarGraph,
    config: MaxFlowConfig,
    source: NodeIndex,
    sink: NodeIndex,
    num_nodes: usize,

    capacity: DenseVec<Quantity>,
    initial_flow: DenseVec<Quantity>,
    residual_cap: SignedVec<Quantity>,
    excess: DenseVec<Quantity>,
    potential: DenseVec<i64>,
    /// `incident(u)` computed once at attach time; a discharge cursor indexes
    /// into this rather than into the graph's own (non-resumable) iterator.
    adjacency: Vec<Vec<ArcIndex>>,
    cursor: DenseVec<usize>,

    status: Status,
    overflow_possible: bool,

    tick_hook: Option<Box<dyn FnMut() -> TickSignal>>,
}

impl<'g> MaxFlowEngine<'g> {
    pub fn new(graph: &'g StarGraph, source: NodeIndex, sink: NodeIndex, config: MaxFlowConfig) -> Self {
        let num_nodes = graph.num_nodes() as usize;
        let max_arcs = graph.max_num_arcs();
        let adjacency: Vec<Vec<ArcIndex>> =
            (0..graph.num_nodes()).map(|u| graph.incident(u).collect()).collect();

        MaxFlowEngine {
            graph,
            config,
            source,
            sink,
            num_nodes,
            capacity: DenseVec::filled(max_arcs.max(0) as usize, 0),
            initial_flow: DenseVec::filled(max_arcs.max(0) as usize, 0),
            residual_cap: SignedVec::filled(max_arcs as i64, 0),
            excess: DenseVec::filled(num_nodes, 0),
            potential: DenseVec::filled(num_nodes, 0),
            adjacency,
            cursor: DenseVec::filled(num_nodes, 0),
            status: Status::NotSolved,
            overflow_possible: false,
            tick_hook: None,
        }
    }

    pub fn set_tick_hook(&mut self, hook: Option<Box<dyn FnMut() -> TickSignal>>) {
        self.tick_hook = hook;
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn set_arc_capacity(&mut self, arc: ArcIndex, cap: Quantity) {
        debug_assert!(StarGraph::is_direct(arc));
        self.capacity.set(arc as usize, cap);
        self.status = Status::NotSolved;
    }

    /// Warm-start: seed the solve with an existing flow `f` on `arc` (must
    /// satisfy `0 <= f <= capacity(arc)`; not checked until `solve`).
    pub fn set_arc_flow(&mut self, arc: ArcIndex, f: Quantity) {
        debug_assert!(StarGraph::is_direct(arc));
        self.initial_flow.set(arc as usize, f);
        self.status = Status::NotSolved;
    }

    pub fn optimal_flow(&self) -> Quantity {
        self.excess[self.sink as usize]
    }

    pub fn flow(&self, arc: ArcIndex) -> Quantity {
        if StarGraph::is_direct(arc) {
            self.rc(self.graph.opposite(arc))
        } else {
            -self.rc(arc)
        }
    }

    #[inline]
    fn rc(&self, a: ArcIndex) -> Quantity {
        *self.residual_cap.get(a as i64)
    }

    #[inline]
    fn rc_mut(&mut self, a: ArcIndex) -> &mut Quantity {
        self.residual_cap.get_mut(a as i64)
    }

    #[inline]
    fn set_rc(&mut self, a: ArcIndex, value: Quantity) {
        self.residual_cap.set(a as i64, value);
    }

    /// Node indices reachable from the source in the final residual graph.
    pub fn source_side_min_cut(&self, out: &mut Vec<NodeIndex>) {
        out.clear();
        self.residual_bfs(self.source, true, out);
    }

    /// Node indices that can reach the sink in the final residual graph.
    pub fn sink_side_min_cut(&self, out: &mut Vec<NodeIndex>) {
        out.clear();
        self.residual_bfs(self.sink, false, out);
    }

    pub fn solve(&mut self) -> Status {
        let _span = tracing::info_span!("maxflow_solve", source = self.source, sink = self.sink).entered();
        info!(num_nodes = self.num_nodes, num_arcs = self.graph.num_arcs(), "starting max-flow solve");

        if self.source == self.sink {
            self.status = Status::BadInput;
            return self.status;
        }
        if self.config.check_input {
            for a in 0..self.graph.num_arcs() {
                if self.capacity[a as usize] < 0 {
                    warn!(arc = a, "negative capacity at setup");
                    self.status = Status::BadInput;
                    return self.status;
                }
            }
        }

        self.init_preflow();

        let mut queue = BucketQueue::new(self.num_nodes, 2 * self.num_nodes);
        for u in 0..self.num_nodes as NodeIndex {
            if u != self.source && u != self.sink && self.excess[u as usize] > 0 {
                queue.push(u, self.potential[u as usize] as usize);
            }
        }

        let mut relabels_since_update = 0usize;
        while let Some(v) = queue.pop_highest() {
            if let Some(hook) = self.tick_hook.as_mut() {
                if hook() == TickSignal::Abort {
                    self.status = Status::NotSolved;
                    return self.status;
                }
            }
            let relabels = self.discharge(v, &mut queue);
            relabels_since_update += relabels;
            trace!(node = v, relabels, "discharged node");

            if self.config.use_global_update && relabels_since_update >= self.num_nodes.max(1) {
                self.global_update(&mut queue);
                relabels_since_update = 0;
            }
        }

        if self.config.use_two_phase_algorithm {
            self.return_excess_to_source();
        }

        if self.overflow_possible && self.has_residual_path(self.source, self.sink) {
            warn!("optimal flow saturated the quantity type with a residual path remaining");
            self.status = Status::IntOverflow;
            return self.status;
        }

        if self.config.check_result && !self.result_is_consistent() {
            self.status = Status::BadResult;
            return self.status;
        }

        info!(optimal_flow = self.optimal_flow(), "max-flow solve complete");
        self.status = Status::Optimal;
        self.status
    }

    fn init_preflow(&mut self) {
        for a in 0..self.graph.num_arcs() {
            let cap = self.capacity[a as usize];
            let f = self.initial_flow[a as usize];
            self.set_rc(a, cap - f);
            self.set_rc(StarGraph::opposite_of(a), f);
        }
        self.excess.fill(0);
        self.potential.fill(0);
        self.potential.set(self.source as usize, self.num_nodes as i64);
        self.cursor.fill(0);
        self.overflow_possible = false;

        let source = self.source;
        let outgoing: Vec<ArcIndex> = self.graph.outgoing(source).collect();
        for a in outgoing {
            let cap = self.rc(a);
            if cap <= 0 {
                continue;
            }
            let head = self.graph.head(a);

            // Push only as much of this arc's capacity as fits without
            // overflowing the head's excess. Any remainder stays behind as
            // forward residual capacity on the arc itself, a genuine
            // augmenting opportunity `has_residual_path` can still find at
            // the end of the solve, rather than a push we silently dropped.
            let headroom = Quantity::MAX - self.excess[head as usize];
            let amount = cap.min(headroom.max(0));
            if amount < cap {
                self.overflow_possible = true;
            }
            if amount <= 0 {
                continue;
            }

            self.set_rc(a, cap - amount);
            let rev = StarGraph::opposite_of(a);
            match self.rc(rev).checked_add(amount) {
                Some(v) => self.set_rc(rev, v),
                None => {
                    self.set_rc(rev, Quantity::MAX);
                    self.overflow_possible = true;
                }
            }

            match self.excess[source as usize].checked_sub(amount) {
                Some(v) => self.excess[source as usize] = v,
                None => {
                    self.excess[source as usize] = Quantity::MIN;
                    self.overflow_possible = true;
                }
            }
            self.excess[head as usize] += amount;
        }
    }

    #[inline]
    fn is_admissible(&self, v: NodeIndex, a: ArcIndex) -> bool {
        self.rc(a) > 0 && self.potential[v as usize] == self.potential[self.graph.head(a) as usize] + 1
    }

    fn apply_push(&mut self, a: ArcIndex, amount: Quantity) {
        let rev = self.graph.opposite(a);
        let tail = self.graph.tail(a);
        let head = self.graph.head(a);
        *self.rc_mut(a) -= amount;
        *self.rc_mut(rev) += amount;
        self.excess[tail as usize] -= amount;
        self.excess[head as usize] += amount;
    }

    /// Discharge `v` to completion; returns the number of
    /// relabels performed so the caller can pace global updates.
    fn discharge(&mut self, v: NodeIndex, queue: &mut BucketQueue) -> usize {
        let mut relabels = 0usize;
        loop {
            if self.potential[v as usize] as usize >= self.num_nodes {
                // Two-phase: flow can no longer reach the sink from v.
                return relabels;
            }

            let degree = self.adjacency[v as usize].len();
            while self.cursor[v as usize] < degree {
                let a = self.adjacency[v as usize][self.cursor[v as usize]];
                if self.is_admissible(v, a) {
                    let push_amount = self.excess[v as usize].min(self.rc(a));
                    let head = self.graph.head(a);
                    let was_active = head != self.sink && head != self.source && self.excess[head as usize] > 0;
                    self.apply_push(a, push_amount);
                    if head != self.sink && head != self.source && !was_active && self.excess[head as usize] > 0 {
                        queue.push(head, self.potential[head as usize] as usize);
                    }
                    if self.excess[v as usize] == 0 {
                        return relabels;
                    }
                    if self.rc(a) == 0 {
                        self.cursor[v as usize] += 1;
                    }
                } else {
                    self.cursor[v as usize] += 1;
                }
            }

            self.relabel(v);
            relabels += 1;
            self.cursor[v as usize] = 0;
            if relabels as u32 > self.config.skip_relabel_threshold {
                // Heuristic: defer this node rather than keep relabeling it
                // against a stale global picture.
                queue.push(v, self.potential[v as usize] as usize);
                return relabels;
            }
        }
    }

    fn relabel(&mut self, v: NodeIndex) {
        let mut new_height = 2 * self.num_nodes as i64;
        for &a in &self.adjacency[v as usize] {
            if self.rc(a) > 0 {
                let h = self.potential[self.graph.head(a) as usize] + 1;
                if h < new_height {
                    new_height = h;
                }
            }
        }
        self.potential[v as usize] = new_height;
    }

    /// Reverse BFS from the sink (distance-to-sink), then a second pass from
    /// the source for nodes that can only reach the source. Active nodes are
    /// re-enqueued at their recomputed height.
    fn global_update(&mut self, queue: &mut BucketQueue) {
        if let Some(hook) = self.tick_hook.as_mut() {
            if hook() == TickSignal::Abort {
                return;
            }
        }
        let n = self.num_nodes;
        let sentinel = (2 * n).saturating_sub(1) as i64;
        self.potential.fill(sentinel);

        let mut visited = vec![false; n];
        let mut bfs = VecDeque::new();
        self.potential[self.sink as usize] = 0;
        visited[self.sink as usize] = true;
        bfs.push_back(self.sink);
        while let Some(w) = bfs.pop_front() {
            for &b in &self.adjacency[w as usize] {
                let e = self.graph.opposite(b);
                let x = self.graph.head(b);
                if !visited[x as usize] && self.rc(e) > 0 {
                    visited[x as usize] = true;
                    self.potential[x as usize] = self.potential[w as usize] + 1;
                    bfs.push_back(x);
                }
            }
        }

        if !visited[self.source as usize] {
            let mut dist_to_source = vec![usize::MAX; n];
            dist_to_source[self.source as usize] = 0;
            bfs.push_back(self.source);
            while let Some(w) = bfs.pop_front() {
                for &b in &self.adjacency[w as usize] {
                    let e = self.graph.opposite(b);
                    let x = self.graph.head(b);
                    if !visited[x as usize]
                        && dist_to_source[x as usize] == usize::MAX
                        && self.rc(e) > 0
                    {
                        dist_to_source[x as usize] = dist_to_source[w as usize] + 1;
                        bfs.push_back(x);
                    }
                }
            }
            for u in 0..n as NodeIndex {
                if !visited[u as usize] && dist_to_source[u as usize] != usize::MAX {
                    self.potential[u as usize] = n as i64 + dist_to_source[u as usize] as i64;
                }
            }
        }

        queue.clear();
        for u in 0..n as NodeIndex {
            if u != self.source && u != self.sink && self.excess[u as usize] > 0 {
                queue.push(u, self.potential[u as usize] as usize);
            }
        }
        for u in 0..n {
            self.cursor[u] = 0;
        }
    }

    /// Phase two: cancel flow cycles and route any remaining excess back to the
    /// source via an explicit-stack DFS over arcs carrying positive flow (no
    /// recursion).
    fn return_excess_to_source(&mut self) {
        let n = self.num_nodes;
        let mut cursor2 = vec![0usize; n];
        let mut position: Vec<i64> = vec![-1; n];

        let candidates: Vec<NodeIndex> = (0..n as NodeIndex)
            .filter(|&u| u != self.source && u != self.sink && self.excess[u as usize] > 0)
            .collect();

        for u0 in candidates {
            while self.excess[u0 as usize] > 0 {
                let mut node_seq: Vec<NodeIndex> = vec![u0];
                let mut arcs_used: Vec<ArcIndex> = Vec::new();
                position[u0 as usize] = 0;

                loop {
                    let cur = *node_seq.last().unwrap();
                    let degree = self.adjacency[cur as usize].len();
                    let mut found: Option<ArcIndex> = None;
                    while cursor2[cur as usize] < degree {
                        let b = self.adjacency[cur as usize][cursor2[cur as usize]];
                        if self.rc(b) > 0 {
                            found = Some(b);
                            break;
                        }
                        cursor2[cur as usize] += 1;
                    }

                    match found {
                        None => {
                            debug_assert_eq!(cur, self.source, "phase two DFS dead-ended off source");
                            for &nd in &node_seq {
                                position[nd as usize] = -1;
                            }
                            break;
                        }
                        Some(b) => {
                            let x = self.graph.head(b);
                            if x == self.source {
                                arcs_used.push(b);
                                let amount = arcs_used
                                    .iter()
                                    .map(|&a| self.rc(a))
                                    .min()
                                    .unwrap()
                                    .min(self.excess[u0 as usize]);
                                for &a in &arcs_used {
                                    self.apply_push(a, amount);
                                }
                                for &nd in &node_seq {
                                    position[nd as usize] = -1;
                                }
                                break;
                            } else if position[x as usize] >= 0 {
                                let p = position[x as usize] as usize;
                                let cycle_amount =
                                    arcs_used[p..].iter().map(|&a| self.rc(a)).min().unwrap();
                                for &a in &arcs_used[p..] {
                                    self.apply_push(a, cycle_amount);
                                }
                                for &nd in &node_seq[(p + 1)..] {
                                    position[nd as usize] = -1;
                                }
                                node_seq.truncate(p + 1);
                                arcs_used.truncate(p);
                            } else {
                                arcs_used.push(b);
                                node_seq.push(x);
                                position[x as usize] = (node_seq.len() - 1) as i64;
                            }
                        }
                    }
                }
            }
        }
    }

    fn has_residual_path(&self, from: NodeIndex, to: NodeIndex) -> bool {
        let mut visited = vec![false; self.num_nodes];
        let mut queue = VecDeque::new();
        visited[from as usize] = true;
        queue.push_back(from);
        while let Some(u) = queue.pop_front() {
            if u == to {
                return true;
            }
            for &a in &self.adjacency[u as usize] {
                let v = self.graph.head(a);
                if !visited[v as usize] && self.rc(a) > 0 {
                    visited[v as usize] = true;
                    queue.push_back(v);
                }
            }
        }
        false
    }

    /// BFS over the residual graph. `forward = true` walks outgoing residual
    /// arcs from `start` (source-side cut); `false` walks them in reverse,
    /// i.e. which nodes can reach `start` (sink-side cut).
    fn residual_bfs(&self, start: NodeIndex, forward: bool, out: &mut Vec<NodeIndex>) {
        let mut visited = vec![false; self.num_nodes];
        let mut queue = VecDeque::new();
        visited[start as usize] = true;
        queue.push_back(start);
        out.push(start);
        while let Some(u) = queue.pop_front() {
            for &a in &self.adjacency[u as usize] {
                let (probe_arc, next) = if forward {
                    (a, self.graph.head(a))
                } else {
                    (self.graph.opposite(a), self.graph.head(a))
                };
                if !visited[next as usize] && self.rc(probe_arc) > 0 {
                    visited[next as usize] = true;
                    out.push(next);
                    queue.push_back(next);
                }
            }
        }
    }

    fn result_is_consistent(&self) -> bool {
        for u in 0..self.num_nodes as NodeIndex {
            if u == self.source || u == self.sink {
                continue;
            }
            if self.excess[u as usize] != 0 {
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
