pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;

pub use error::ExprError;
pub use eval::{Evaluator, Host, NoHost};

use playground_value::Value;

/// Parse source text into an expression tree.
pub fn parse_expression(source: &str) -> Result<ast::Expr, ExprError> {
    let tokens = lexer::lex(source)?;
    parser::parse(tokens)
}

/// Evaluate source text with only the core builtins.
pub fn evaluate(source: &str) -> Result<Value, ExprError> {
    evaluate_with(source, &NoHost)
}

/// Evaluate source text, resolving unknown function names through `host`.
pub fn evaluate_with(source: &str, host: &dyn Host) -> Result<Value, ExprError> {
    let expr = parse_expression(source)?;
    Evaluator::new(host).eval(&expr)
}
