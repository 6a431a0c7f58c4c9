//! The forward/reverse star graph: the one graph representation the three solve
//! engines share, in place of a templated list/static/mixed graph matrix.
//!
//! Nodes live in `[0, n)`. Forward arcs live in `[0, m)`; arc `a`'s reverse is
//! `~a = opposite(a) = -a - 1`, living in `[-m, 0)`. Arc and node data are stored
//! in [`crate::collections::SignedVec`] / [`crate::collections::DenseVec`] so that
//! there is no raw pointer arithmetic anywhere in the crate.

mod iter;

pub use iter::IncidentArcs;

use crate::collections::{DenseVec, SignedVec};
use crate::error::GraphError;

/// Index of a node in `[0, n)`. `NIL_NODE` marks "no such node".
pub type NodeIndex = i32;
/// Index of an arc in `[-m, m)`. `NIL_ARC` marks "no such arc".
pub type ArcIndex = i32;

pub const NIL_NODE: NodeIndex = -1;
pub const NIL_ARC: ArcIndex = ArcIndex::MAX;

/// The static forward/reverse star representation.
///
/// Topology is built once via [`StarGraph::add_arc`] and then frozen: engines
/// borrow the graph immutably for the lifetime of a solve.
pub struct StarGraph {
    num_nodes: NodeIndex,
    max_arcs: ArcIndex,
    num_arcs: ArcIndex,
    /// `node[a] = head(a)` for `a` in `[-m, m)`; in particular `node[~a] = tail(a)`.
    node: SignedVec<NodeIndex>,
    /// Head of the singly-linked incidence chain for each node.
    first_incident_arc: DenseVec<ArcIndex>,
    /// `next_adjacent_arc[a]` continues the incidence chain arc `a` was pushed onto.
    next_adjacent_arc: SignedVec<ArcIndex>,
}

impl StarGraph {
    /// Reserve storage for exactly `max_nodes` nodes (node ids are `[0, max_nodes)`
    /// from here on) and up to `max_arcs` forward arcs.
    pub fn reserve(max_nodes: usize, max_arcs: usize) -> Result<Self, GraphError> {
        let num_nodes = NodeIndex::try_from(max_nodes).map_err(|_| GraphError::TooManyNodes {
            requested: max_nodes,
        })?;
        let max_arcs_i = ArcIndex::try_from(max_arcs).map_err(|_| GraphError::TooManyArcs {
            requested: max_arcs,
        })?;
        if max_arcs_i >= NIL_ARC {
            return Err(GraphError::TooManyArcs { requested: max_arcs });
        }

        Ok(StarGraph {
            num_nodes,
            max_arcs: max_arcs_i,
            num_arcs: 0,
            node: SignedVec::filled(max_arcs_i, NIL_NODE),
            first_incident_arc: DenseVec::filled(max_nodes, NIL_ARC),
            next_adjacent_arc: SignedVec::filled(max_arcs_i, NIL_ARC),
        })
    }

    pub fn num_nodes(&self) -> NodeIndex {
        self.num_nodes
    }

    pub fn num_arcs(&self) -> ArcIndex {
        self.num_arcs
    }

    pub fn max_num_arcs(&self) -> ArcIndex {
        self.max_arcs
    }

    #[inline]
    fn in_node_range(&self, u: NodeIndex) -> bool {
        u >= 0 && u < self.num_nodes
    }

    /// Append a forward arc `tail -> head`, returning its index, or `NIL_ARC` if
    /// the reservation made in [`StarGraph::reserve`] is exhausted.
    pub fn add_arc(&mut self, tail: NodeIndex, head: NodeIndex) -> ArcIndex {
        debug_assert!(self.in_node_range(tail), "tail {tail} out of range");
        debug_assert!(self.in_node_range(head), "head {head} out of range");
        if self.num_arcs >= self.max_arcs {
            return NIL_ARC;
        }

        let a = self.num_arcs;
        self.num_arcs += 1;
        let rev = Self::opposite_of(a);

        self.node.set(a, head);
        self.node.set(rev, tail);

        self.next_adjacent_arc.set(a, *self.first_incident_arc.get(tail as usize));
        self.first_incident_arc.set(tail as usize, a);

        self.next_adjacent_arc.set(rev, *self.first_incident_arc.get(head as usize));
        self.first_incident_arc.set(head as usize, rev);

        a
    }

    /// No-op consistency pass; this representation keeps incidence lists in sync
    /// incrementally, but callers still call this after bulk edits, and in debug
    /// builds it re-validates the forward/reverse pairing invariants.
    pub fn build_representation(&self) {
        #[cfg(debug_assertions)]
        {
            for a in 0..self.num_arcs {
                let rev = Self::opposite_of(a);
                debug_assert_eq!(Self::opposite_of(rev), a);
                debug_assert_eq!(self.tail(rev), self.head(a));
                debug_assert_eq!(self.head(rev), self.tail(a));
            }
        }
    }

    #[inline]
    pub fn opposite_of(a: ArcIndex) -> ArcIndex {
        -a - 1
    }

    #[inline]
    pub fn opposite(&self, a: ArcIndex) -> ArcIndex {
        if a == NIL_ARC {
            NIL_ARC
        } else {
            Self::opposite_of(a)
        }
    }

    #[inline]
    pub fn is_direct(a: ArcIndex) -> bool {
        a >= 0
    }

    #[inline]
    pub fn head(&self, a: ArcIndex) -> NodeIndex {
        if a == NIL_ARC {
            NIL_NODE
        } else {
            *self.node.get(a)
        }
    }

    #[inline]
    pub fn tail(&self, a: ArcIndex) -> NodeIndex {
        self.head(self.opposite(a))
    }

    #[inline]
    fn first_incident(&self, u: NodeIndex) -> ArcIndex {
        *self.first_incident_arc.get(u as usize)
    }

    #[inline]
    fn next_in_chain(&self, a: ArcIndex) -> ArcIndex {
        *self.next_adjacent_arc.get(a)
    }

    /// All arcs incident to `u`: both the direct arcs with `tail(a) = u` and the
    /// reverse arcs `~b` of arcs `b` with `head(b) = u`.
    pub fn incident(&self, u: NodeIndex) -> IncidentArcs<'_> {
        IncidentArcs::new(self, u, iter::Filter::All)
    }

    /// Only the direct arcs with `tail(a) = u`.
    pub fn outgoing(&self, u: NodeIndex) -> IncidentArcs<'_> {
        IncidentArcs::new(self, u, iter::Filter::Direct)
    }

    /// Only the reverse arcs `~b` with `tail(~b) = u` (equivalently `head(b) = u`).
    pub fn incoming(&self, u: NodeIndex) -> IncidentArcs<'_> {
        IncidentArcs::new(self, u, iter::Filter::Reverse)
    }

    /// Permute the forward arcs so iterating `0..num_arcs` yields them grouped by
    /// tail (ties broken by `tie_break`), then rebuild incidence lists from
    /// scratch. Returns the permutation `old_index -> new_index`; the caller must
    /// apply it to any parallel per-arc annotation array.
    pub fn group_forward_arcs_by_tail<F>(&mut self, mut tie_break: F) -> Vec<ArcIndex>
    where
        F: FnMut(ArcIndex, ArcIndex) -> std::cmp::Ordering,
    {
        let n = self.num_arcs as usize;
        let mut order: Vec<ArcIndex> = (0..self.num_arcs).collect();
        order.sort_by(|&a, &b| self.tail(a).cmp(&self.tail(b)).then_with(|| tie_break(a, b)));

        let tails: Vec<NodeIndex> = order.iter().map(|&a| self.tail(a)).collect();
        let heads: Vec<NodeIndex> = order.iter().map(|&a| self.head(a)).collect();

        self.first_incident_arc.fill(NIL_ARC);
        self.next_adjacent_arc.fill(NIL_ARC);
        self.node.fill(NIL_NODE);
        self.num_arcs = 0;
        for i in 0..n {
            self.add_arc(tails[i], heads[i]);
        }

        let mut permutation = vec![0 as ArcIndex; n];
        for (new_index, &old_index) in order.iter().enumerate() {
            permutation[old_index as usize] = new_index as ArcIndex;
        }
        permutation
    }
}
