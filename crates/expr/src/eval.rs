use playground_value::{format_value, is_same_value, Value};

use crate::ast::*;
use crate::error::ExprError;
use crate::parser::MAX_DEPTH;

/// Deepest recursion the evaluator allows. Matches the parser's tree limit,
/// so anything `parse` accepts can be walked.
pub const MAX_EVAL_DEPTH: usize = MAX_DEPTH;

/// Functions supplied by the embedding application.
///
/// The evaluator has no ambient environment: apart from the core builtins,
/// every callable name must come from a `Host`.
pub trait Host {
    /// Call `name` with already-evaluated arguments.
    /// Returns `None` when the host does not provide `name`.
    fn call(&self, name: &str, args: &[Value]) -> Option<Result<Value, ExprError>>;
}

/// Host with no functions of its own.
pub struct NoHost;

impl Host for NoHost {
    fn call(&self, _name: &str, _args: &[Value]) -> Option<Result<Value, ExprError>> {
        None
    }
}

/// Tree-walking evaluator for a parsed expression.
pub struct Evaluator<'h> {
    host: &'h dyn Host,
    depth: usize,
}

impl<'h> Evaluator<'h> {
    pub fn new(host: &'h dyn Host) -> Self {
        Evaluator { host, depth: 0 }
    }

    pub fn eval(&mut self, expr: &Expr) -> Result<Value, ExprError> {
        self.depth += 1;
        if self.depth > MAX_EVAL_DEPTH {
            self.depth -= 1;
            return Err(ExprError::eval(format!(
                "expression nested deeper than {MAX_EVAL_DEPTH} levels"
            )));
        }
        let result = self.eval_inner(expr);
        self.depth -= 1;
        result
    }

    fn eval_inner(&mut self, expr: &Expr) -> Result<Value, ExprError> {
        match expr {
            Expr::IntLit(n) => Ok(Value::Int(*n)),
            Expr::FloatLit(f) => Ok(Value::Float(*f)),
            Expr::StringLit(s) => Ok(Value::Text(s.clone())),
            Expr::BoolLit(b) => Ok(Value::Bool(*b)),
            Expr::NullLit => Ok(Value::Null),
            Expr::Ident(name) => Err(ExprError::eval(format!("unknown identifier: {name}"))),
            Expr::List(items) => {
                let values = items
                    .iter()
                    .map(|item| self.eval(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::List(values))
            }
            Expr::Unary { op, expr } => {
                let value = self.eval(expr)?;
                unary(*op, value)
            }
            Expr::Conditional { condition, then_expr, else_expr } => {
                if self.eval(condition)?.is_truthy() {
                    self.eval(then_expr)
                } else {
                    self.eval(else_expr)
                }
            }
            Expr::Call { func, args } => {
                let name = callee_name(func)?;
                let values = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(&name, &values)
            }
            Expr::Member { object, field } => match object.as_ref() {
                Expr::Ident(ns) => constant(ns, field),
                _ => self.eval_chain(expr),
            },
            Expr::Binary { .. } | Expr::Index { .. } => self.eval_chain(expr),
        }
    }

    /// Evaluate a left-leaning chain (`a + b + c`, `x.a.b`, `xs[0][1]`) from
    /// its innermost operand outwards, one loop step per link.
    fn eval_chain(&mut self, expr: &Expr) -> Result<Value, ExprError> {
        let mut links = Vec::new();
        let mut base = expr;
        loop {
            match base {
                Expr::Binary { op, left, right } => {
                    links.push(Link::Binary(*op, right.as_ref()));
                    base = left.as_ref();
                }
                Expr::Member { object, field } if !matches!(object.as_ref(), Expr::Ident(_)) => {
                    links.push(Link::Member(field.as_str()));
                    base = object.as_ref();
                }
                Expr::Index { object, index } => {
                    links.push(Link::Index(index.as_ref()));
                    base = object.as_ref();
                }
                _ => break,
            }
        }

        let mut value = self.eval_inner(base)?;
        for link in links.into_iter().rev() {
            value = match link {
                Link::Binary(BinOp::And, right) => {
                    if value.is_truthy() { self.eval(right)? } else { value }
                }
                Link::Binary(BinOp::Or, right) => {
                    if value.is_truthy() { value } else { self.eval(right)? }
                }
                Link::Binary(op, right) => {
                    let r = self.eval(right)?;
                    binary(op, value, r)?
                }
                Link::Member(field) => member(&value, field)?,
                Link::Index(index) => {
                    let key = self.eval(index)?;
                    index_value(&value, &key)?
                }
            };
        }
        Ok(value)
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value, ExprError> {
        if let Some(result) = builtin(name, args) {
            return result;
        }
        match self.host.call(name, args) {
            Some(result) => result,
            None => Err(ExprError::eval(format!("unknown function: {name}"))),
        }
    }
}

/// One step outwards from the innermost operand of a chain.
enum Link<'e> {
    Binary(BinOp, &'e Expr),
    Member(&'e str),
    Index(&'e Expr),
}

/// Resolve a callee to a plain or dotted name (`len`, `Math.pow`).
fn callee_name(func: &Expr) -> Result<String, ExprError> {
    match func {
        Expr::Ident(name) => Ok(name.clone()),
        Expr::Member { object, field } => match object.as_ref() {
            Expr::Ident(ns) => Ok(format!("{ns}.{field}")),
            _ => Err(ExprError::eval("only named functions can be called")),
        },
        _ => Err(ExprError::eval("only named functions can be called")),
    }
}

fn constant(ns: &str, field: &str) -> Result<Value, ExprError> {
    match (ns, field) {
        ("Math", "PI") => Ok(Value::Float(std::f64::consts::PI)),
        ("Math", "E") => Ok(Value::Float(std::f64::consts::E)),
        _ => Err(ExprError::eval(format!("unknown identifier: {ns}.{field}"))),
    }
}

fn member(value: &Value, field: &str) -> Result<Value, ExprError> {
    match (value, field) {
        (Value::Text(s), "length") => Ok(Value::Int(s.chars().count() as i64)),
        (Value::List(items), "length") => Ok(Value::Int(items.len() as i64)),
        (Value::Map(entries), _) => Ok(entries.get(field).cloned().unwrap_or(Value::Null)),
        _ => Err(ExprError::eval(format!(
            "{} has no property `{field}`",
            value.type_name()
        ))),
    }
}

fn index_value(value: &Value, key: &Value) -> Result<Value, ExprError> {
    match (value, key) {
        (Value::List(items), Value::Int(i)) => Ok(usize::try_from(*i)
            .ok()
            .and_then(|i| items.get(i).cloned())
            .unwrap_or(Value::Null)),
        (Value::Text(s), Value::Int(i)) => Ok(usize::try_from(*i)
            .ok()
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::Text(c.to_string()))
            .unwrap_or(Value::Null)),
        (Value::Map(entries), Value::Text(k)) => Ok(entries.get(k).cloned().unwrap_or(Value::Null)),
        _ => Err(ExprError::eval(format!(
            "cannot index {} with {}",
            value.type_name(),
            key.type_name()
        ))),
    }
}

fn unary(op: UnaryOp, value: Value) -> Result<Value, ExprError> {
    match (op, value) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
        (UnaryOp::Neg, Value::Int(n)) => Ok(n
            .checked_neg()
            .map(Value::Int)
            .unwrap_or(Value::Float(-(n as f64)))),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Neg, v) => Err(ExprError::eval(format!("cannot negate {}", v.type_name()))),
    }
}

fn binary(op: BinOp, l: Value, r: Value) -> Result<Value, ExprError> {
    match op {
        BinOp::Eq => Ok(Value::Bool(is_same_value(&l, &r))),
        BinOp::Neq => Ok(Value::Bool(!is_same_value(&l, &r))),
        BinOp::Lt | BinOp::Lte | BinOp::Gt | BinOp::Gte => compare(op, &l, &r),
        BinOp::Add => {
            if matches!(l, Value::Text(_)) || matches!(r, Value::Text(_)) {
                return Ok(Value::Text(format_value(&l) + &format_value(&r)));
            }
            arithmetic(op, &l, &r)
        }
        _ => arithmetic(op, &l, &r),
    }
}

fn compare(op: BinOp, l: &Value, r: &Value) -> Result<Value, ExprError> {
    let ordering = match (l, r) {
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        _ => match (l.as_f64(), r.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => {
                return Err(ExprError::eval(format!(
                    "cannot compare {} with {}",
                    l.type_name(),
                    r.type_name()
                )))
            }
        },
    };
    // NaN compares false against everything
    let Some(ordering) = ordering else {
        return Ok(Value::Bool(false));
    };
    let result = match op {
        BinOp::Lt => ordering.is_lt(),
        BinOp::Lte => ordering.is_le(),
        BinOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    };
    Ok(Value::Bool(result))
}

fn arithmetic(op: BinOp, l: &Value, r: &Value) -> Result<Value, ExprError> {
    if let (Value::Int(a), Value::Int(b)) = (l, r) {
        return int_arithmetic(op, *a, *b);
    }
    let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) else {
        return Err(ExprError::eval(format!(
            "unsupported operand types for {:?}: {} and {}",
            op,
            l.type_name(),
            r.type_name()
        )));
    };
    float_arithmetic(op, a, b)
}

/// Checked integer arithmetic; overflow falls back to floats.
fn int_arithmetic(op: BinOp, a: i64, b: i64) -> Result<Value, ExprError> {
    let checked = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Sub => a.checked_sub(b),
        BinOp::Mul => a.checked_mul(b),
        BinOp::Div => {
            if b == 0 {
                return Err(ExprError::eval("division by zero"));
            }
            if a % b != 0 {
                return float_arithmetic(op, a as f64, b as f64);
            }
            a.checked_div(b)
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(ExprError::eval("modulo by zero"));
            }
            a.checked_rem(b)
        }
        BinOp::Pow => u32::try_from(b).ok().and_then(|e| a.checked_pow(e)),
        _ => None,
    };
    match checked {
        Some(n) => Ok(Value::Int(n)),
        None => float_arithmetic(op, a as f64, b as f64),
    }
}

fn float_arithmetic(op: BinOp, a: f64, b: f64) -> Result<Value, ExprError> {
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if b == 0.0 {
                return Err(ExprError::eval("division by zero"));
            }
            a / b
        }
        BinOp::Mod => {
            if b == 0.0 {
                return Err(ExprError::eval("modulo by zero"));
            }
            a % b
        }
        BinOp::Pow => a.powf(b),
        other => return Err(ExprError::eval(format!("{other:?} is not an arithmetic operator"))),
    };
    Ok(Value::Float(result))
}

/// Core builtins available to every expression. `None` means "not a builtin".
fn builtin(name: &str, args: &[Value]) -> Option<Result<Value, ExprError>> {
    let result = match name {
        "Math.pow" => numbers(name, args, 2).map(|n| Value::Float(n[0].powf(n[1]))),
        "Math.sqrt" => numbers(name, args, 1).map(|n| Value::Float(n[0].sqrt())),
        "Math.abs" => match args {
            [Value::Int(n)] => Ok(n.checked_abs().map(Value::Int).unwrap_or(Value::Float((*n as f64).abs()))),
            _ => numbers(name, args, 1).map(|n| Value::Float(n[0].abs())),
        },
        "Math.floor" => numbers(name, args, 1).map(|n| integral(n[0].floor())),
        "Math.ceil" => numbers(name, args, 1).map(|n| integral(n[0].ceil())),
        "Math.round" => numbers(name, args, 1).map(|n| integral((n[0] + 0.5).floor())),
        "Math.min" => variadic(name, args).map(|n| Value::Float(n.into_iter().fold(f64::INFINITY, f64::min))),
        "Math.max" => variadic(name, args).map(|n| Value::Float(n.into_iter().fold(f64::NEG_INFINITY, f64::max))),
        "len" => match args {
            [Value::Text(s)] => Ok(Value::Int(s.chars().count() as i64)),
            [Value::List(items)] => Ok(Value::Int(items.len() as i64)),
            [Value::Map(entries)] => Ok(Value::Int(entries.len() as i64)),
            _ => Err(type_error(name, args)),
        },
        "upper" => text(name, args).map(|s| Value::Text(s.to_uppercase())),
        "lower" => text(name, args).map(|s| Value::Text(s.to_lowercase())),
        "trim" => text(name, args).map(|s| Value::Text(s.trim().to_string())),
        "str" => match args {
            [v] => Ok(Value::Text(format_value(v))),
            _ => Err(arity_error(name, 1, args.len())),
        },
        _ => return None,
    };
    Some(result)
}

fn integral(f: f64) -> Value {
    if f.is_finite() && f.abs() < i64::MAX as f64 {
        Value::Int(f as i64)
    } else {
        Value::Float(f)
    }
}

fn numbers(name: &str, args: &[Value], arity: usize) -> Result<Vec<f64>, ExprError> {
    if args.len() != arity {
        return Err(arity_error(name, arity, args.len()));
    }
    variadic(name, args)
}

fn variadic(name: &str, args: &[Value]) -> Result<Vec<f64>, ExprError> {
    args.iter()
        .map(|v| v.as_f64().ok_or_else(|| type_error(name, args)))
        .collect()
}

fn text<'a>(name: &str, args: &'a [Value]) -> Result<&'a str, ExprError> {
    match args {
        [Value::Text(s)] => Ok(s),
        [_] => Err(type_error(name, args)),
        _ => Err(arity_error(name, 1, args.len())),
    }
}

pub fn arity_error(name: &str, expected: usize, got: usize) -> ExprError {
    ExprError::eval(format!("{name} expects {expected} argument(s), got {got}"))
}

pub fn type_error(name: &str, args: &[Value]) -> ExprError {
    let types: Vec<&str> = args.iter().map(Value::type_name).collect();
    ExprError::eval(format!("{name} does not accept ({})", types.join(", ")))
}
