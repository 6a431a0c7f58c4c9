//! Active-node containers, selected by configuration rather than by a
//! runtime-dispatched trait object: a highest-label-first bucket queue for the
//! max-flow engine, and a pluggable LIFO/FIFO container for the assignment
//! engine's double-push loop.

use std::collections::VecDeque;

use crate::graph::NodeIndex;

/// Highest-label-first priority queue of active nodes, bucketed by potential.
/// Buckets are indexed `0..=max_height`; `pop_highest` always returns a node
/// from the highest non-empty bucket.
pub struct BucketQueue {
    buckets: Vec<Vec<NodeIndex>>,
    in_queue: Vec<bool>,
    highest: usize,
}

impl BucketQueue {
    pub fn new(num_nodes: usize, max_height: usize) -> Self {
        BucketQueue {
            buckets: (0..=max_height).map(|_| Vec::new()).collect(),
            in_queue: vec![false; num_nodes],
            highest: 0,
        }
    }

    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        for flag in &mut self.in_queue {
            *flag = false;
        }
        self.highest = 0;
    }

    pub fn push(&mut self, node: NodeIndex, height: usize) {
        let idx = node as usize;
        if self.in_queue[idx] {
            return;
        }
        self.in_queue[idx] = true;
        self.buckets[height].push(node);
        if height > self.highest {
            self.highest = height;
        }
    }

    pub fn pop_highest(&mut self) -> Option<NodeIndex> {
        while self.highest > 0 || !self.buckets[0].is_empty() {
            if let Some(node) = self.buckets[self.highest].pop() {
                self.in_queue[node as usize] = false;
                return Some(node);
            }
            if self.highest == 0 {
                return None;
            }
            self.highest -= 1;
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}

/// A plain FIFO queue of active nodes: the assignment engine's non-default
/// ordering, simpler and slower than its LIFO default. The max-flow engine has
/// no FIFO mode; it always drains the highest-label `BucketQueue`, which the
/// stated complexity bound depends on.
pub struct Fifo {
    queue: VecDeque<NodeIndex>,
}

impl Fifo {
    pub fn new() -> Self {
        Fifo { queue: VecDeque::new() }
    }

    pub fn push(&mut self, node: NodeIndex) {
        self.queue.push_back(node);
    }

    pub fn pop(&mut self) -> Option<NodeIndex> {
        self.queue.pop_front()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// The assignment engine's pluggable active-left-node container, switching
/// between LIFO (stack) and FIFO (queue) ordering.
pub enum ActiveNodeOrder {
    Stack(Vec<NodeIndex>),
    Queue(Fifo),
}

impl ActiveNodeOrder {
    pub fn new(use_stack_order: bool) -> Self {
        if use_stack_order {
            ActiveNodeOrder::Stack(Vec::new())
        } else {
            ActiveNodeOrder::Queue(Fifo::new())
        }
    }

    pub fn push(&mut self, node: NodeIndex) {
        match self {
            ActiveNodeOrder::Stack(stack) => stack.push(node),
            ActiveNodeOrder::Queue(queue) => queue.push(node),
        }
    }

    pub fn pop(&mut self) -> Option<NodeIndex> {
        match self {
            ActiveNodeOrder::Stack(stack) => stack.pop(),
            ActiveNodeOrder::Queue(queue) => queue.pop(),
        }
    }

    pub fn clear(&mut self) {
        match self {
            ActiveNodeOrder::Stack(stack) => stack.clear(),
            ActiveNodeOrder::Queue(queue) => queue.clear(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ActiveNodeOrder::Stack(stack) => stack.is_empty(),
            ActiveNodeOrder::Queue(queue) => queue.is_empty(),
        }
    }
}
