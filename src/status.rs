/// Outcome of a solve, shared by all three engines.
///
/// Any mutation to an engine's input (capacity, cost, supply) after a solve
/// resets its status back to `NotSolved`. Results (flow values, the matching)
/// are only meaningful when the status is `Optimal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// No solve has been attempted yet, or input was edited since the last solve.
    NotSolved,
    /// A valid optimal solution is available.
    Optimal,
    /// Provably no feasible solution exists.
    Infeasible,
    /// Supplies do not sum to zero (min-cost-flow only).
    Unbalanced,
    /// Costs scaled by `(n+1)` (or `1+k/2`) could overflow the quantity type.
    BadCostRange,
    /// The true optimum exceeds the representable flow value.
    IntOverflow,
    /// Negative capacity or another setup error was detected.
    BadInput,
    /// An internal invariant was violated; this indicates a bug, not bad input.
    BadResult,
}

impl Default for Status {
    fn default() -> Self {
        Status::NotSolved
    }
}

impl Status {
    pub fn is_optimal(self) -> bool {
        matches!(self, Status::Optimal)
    }
}

/// Returned by an optional tick hook, invoked once per discharge and once per
/// global update so a caller can cooperatively cancel a long solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickSignal {
    Continue,
    Abort,
}
