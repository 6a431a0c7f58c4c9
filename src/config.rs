//! Plain-data configuration structs, one per engine, gathering what would
//! otherwise be process-wide tunable flags into a struct passed to each engine
//! at construction.

/// Tunables for [`crate::maxflow::MaxFlowEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxFlowConfig {
    /// Periodically recompute potentials via reverse BFS from the sink (and a
    /// second pass from the source) instead of relying purely on relabeling.
    pub use_global_update: bool,
    /// After phase one (draining active nodes), run phase two to cancel cycles
    /// and route any remaining excess back to the source, recovering a true flow.
    pub use_two_phase_algorithm: bool,
    /// Validate capacities are non-negative before solving.
    pub check_input: bool,
    /// Re-verify flow conservation and capacity bounds after solving.
    pub check_result: bool,
    /// A node is skipped once it has been relabeled more than this many times
    /// since it was last discharged; tunable, no effect on correctness.
    pub skip_relabel_threshold: u32,
}

impl Default for MaxFlowConfig {
    fn default() -> Self {
        MaxFlowConfig {
            use_global_update: true,
            use_two_phase_algorithm: true,
            check_input: false,
            check_result: false,
            skip_relabel_threshold: 1,
        }
    }
}

/// Tunables for [`crate::mincost::MinCostFlowEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinCostFlowConfig {
    /// Cost-scaling divisor `Α` applied to `ε` between Refine phases.
    pub alpha: i64,
    /// Run the max-flow feasibility pre-check before cost scaling.
    pub check_feasibility: bool,
    /// Verify supplies sum to zero before solving.
    pub check_balance: bool,
    /// Verify `log(max |cost|) + log(n + 1)` fits the quantity type before scaling.
    pub check_costs: bool,
    /// `true`: relabel by `potential[v] -= ε` (fast). `false`: relabel to the max
    /// over admissible-with-new-price neighbors (slower, detects infeasibility
    /// more precisely). The max-flow feasibility pre-check is authoritative
    /// either way.
    pub fast_potential_update: bool,
    /// Re-verify conservation and ε-optimality after solving.
    pub check_result: bool,
}

impl Default for MinCostFlowConfig {
    fn default() -> Self {
        MinCostFlowConfig {
            alpha: 5,
            check_feasibility: true,
            check_balance: true,
            check_costs: true,
            fast_potential_update: true,
            check_result: true,
        }
    }
}

/// Tunables for [`crate::assignment::AssignmentEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentConfig {
    /// Cost-scaling divisor `Α` applied to `ε` between Refine phases.
    pub alpha: i64,
    /// `true`: active left nodes are popped LIFO (stack order, the default).
    /// `false`: FIFO (queue order). Affects runtime, not correctness.
    pub use_stack_order: bool,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        AssignmentConfig { alpha: 5, use_stack_order: true }
    }
}
