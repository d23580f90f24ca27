use playground_expr::ExprError;
use thiserror::Error;

/// Why a single check failed to produce a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Expr(#[from] ExprError),

    #[error("{0}")]
    Panicked(String),
}

impl CheckError {
    pub fn failed(msg: impl Into<String>) -> Self {
        CheckError::Failed(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a run is already in progress")]
    RunInFlight,
}
