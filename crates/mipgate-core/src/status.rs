//! Solve outcome shared by all backends.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStatus {
    /// Optimal solution found.
    Optimal,
    /// Time limit reached (may carry the best solution found so far).
    TimeLimit,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// Objective improves without limit.
    Unbounded,
    /// Engine proved one of the two without telling which.
    InfeasibleOrUnbounded,
    /// Engine stopped for any other reason (numerical trouble, interrupt).
    Error,
}

impl SolverStatus {
    pub fn is_optimal(self) -> bool {
        matches!(self, SolverStatus::Optimal)
    }

    /// Statuses that may carry a variable assignment.
    pub fn may_have_solution(self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::TimeLimit)
    }

    pub fn is_infeasible(self) -> bool {
        matches!(self, SolverStatus::Infeasible)
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, SolverStatus::Unbounded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::Optimal => "optimal",
            SolverStatus::TimeLimit => "time_limit",
            SolverStatus::Infeasible => "infeasible",
            SolverStatus::Unbounded => "unbounded",
            SolverStatus::InfeasibleOrUnbounded => "infeasible_or_unbounded",
            SolverStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
