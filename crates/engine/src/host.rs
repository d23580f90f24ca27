use chrono::Utc;

use playground_expr::eval::{arity_error, type_error};
use playground_expr::{ExprError, Host};
use playground_value::Value;

use crate::checks;
use crate::error::CheckError;

/// Exposes the check library to custom expressions.
pub struct CheckHost;

impl Host for CheckHost {
    fn call(&self, name: &str, args: &[Value]) -> Option<Result<Value, ExprError>> {
        let result = match name {
            "sum" => numbers(name, args).map(|n| Value::Float(checks::sum(&n))),
            "median" => numbers(name, args)
                .and_then(|n| checks::median(&n).map_err(into_expr_error))
                .map(Value::Float),
            "fibonacci" => match args {
                [Value::Int(n)] => match u32::try_from(*n) {
                    Ok(n) if n <= checks::MAX_FIBONACCI_INDEX => {
                        Ok(Value::Int(checks::fibonacci(n) as i64))
                    }
                    _ => Err(ExprError::Eval(format!(
                        "fibonacci index must be between 0 and {}",
                        checks::MAX_FIBONACCI_INDEX
                    ))),
                },
                [_] => Err(type_error(name, args)),
                _ => Err(arity_error(name, 1, args.len())),
            },
            "slugify" => text(name, args).map(|s| Value::Text(checks::slugify(s))),
            "is_blocked" => text(name, args).map(|s| Value::Bool(checks::is_blocked(s))),
            "today" => match args {
                [] => Ok(Value::Date(checks::truncate_to_date(Utc::now()))),
                _ => Err(arity_error(name, 0, args.len())),
            },
            "add_days" => match args {
                [Value::Date(d), Value::Int(days)] => checks::add_days(*d, *days)
                    .map(Value::Date)
                    .map_err(into_expr_error),
                [_, _] => Err(type_error(name, args)),
                _ => Err(arity_error(name, 2, args.len())),
            },
            _ => return None,
        };
        Some(result)
    }
}

fn into_expr_error(err: CheckError) -> ExprError {
    ExprError::Eval(err.to_string())
}

/// A single list argument of numbers.
fn numbers(name: &str, args: &[Value]) -> Result<Vec<f64>, ExprError> {
    match args {
        [Value::List(items)] => items
            .iter()
            .map(|v| v.as_f64().ok_or_else(|| type_error(name, items)))
            .collect(),
        [_] => Err(type_error(name, args)),
        _ => Err(arity_error(name, 1, args.len())),
    }
}

fn text<'a>(name: &str, args: &'a [Value]) -> Result<&'a str, ExprError> {
    match args {
        [Value::Text(s)] => Ok(s),
        [_] => Err(type_error(name, args)),
        _ => Err(arity_error(name, 1, args.len())),
    }
}
