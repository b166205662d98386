//! The error taxonomy for pre-solver failures.
//!
//! Solver-reported outcomes (infeasible, unbounded, solver error) are not
//! errors; they are reported via [`PlanOutcome`](crate::planning::PlanOutcome).

/// An error raised before the solver is ever invoked.
///
/// The two variants let callers tell "bad input shape" apart from "no optimal
/// trade-off exists", which is only ever reported by the solver itself.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum PlanError {
    /// Malformed or out-of-range input, rejected at registration time
    #[display("invalid planning input: {_0}")]
    Config(String),
    /// Balance arithmetic proves no feasible schedule exists for these inputs
    #[display("structurally infeasible: {_0}")]
    StructurallyInfeasible(String),
}

impl std::error::Error for PlanError {}

impl PlanError {
    /// Create a [`PlanError::Config`] from a message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a [`PlanError::StructurallyInfeasible`] from a message
    pub fn structurally_infeasible(message: impl Into<String>) -> Self {
        Self::StructurallyInfeasible(message.into())
    }
}

/// Result type for registry and ledger operations
pub type PlanResult<T> = Result<T, PlanError>;
