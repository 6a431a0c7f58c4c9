use super::{ArcIndex, NodeIndex, StarGraph, NIL_ARC};

#[derive(Clone, Copy)]
pub(super) enum Filter {
    All,
    Direct,
    Reverse,
}

/// A one-shot, LIFO-ordered walk over a node's incidence chain, filtered to
/// direct arcs, reverse arcs, or both. Order within a sequence is insertion-order
/// reversed; the iterator is finite and not restartable except by constructing a
/// new one.
pub struct IncidentArcs<'g> {
    graph: &'g StarGraph,
    next: ArcIndex,
    filter: Filter,
}

impl<'g> IncidentArcs<'g> {
    pub(super) fn new(graph: &'g StarGraph, u: NodeIndex, filter: Filter) -> Self {
        IncidentArcs { graph, next: graph.first_incident(u), filter }
    }
}

impl<'g> Iterator for IncidentArcs<'g> {
    type Item = ArcIndex;

    fn next(&mut self) -> Option<ArcIndex> {
        while self.next != NIL_ARC {
            let arc = self.next;
            self.next = self.graph.next_in_chain(arc);
            let keep = match self.filter {
                Filter::All => true,
                Filter::Direct => StarGraph::is_direct(arc),
                Filter::Reverse => !StarGraph::is_direct(arc),
            };
            if keep {
                return Some(arc);
            }
        }
        None
    }
}
