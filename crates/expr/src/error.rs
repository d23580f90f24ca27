use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("lexer error at line {line}, col {col}: {msg}")]
    Lexer { line: usize, col: usize, msg: String },

    #[error("parse error at line {line}, col {col}: {msg}")]
    Parse { line: usize, col: usize, msg: String },

    #[error("{0}")]
    Eval(String),
}

impl ExprError {
    pub(crate) fn eval(msg: impl Into<String>) -> Self {
        ExprError::Eval(msg.into())
    }
}
