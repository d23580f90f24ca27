use crate::ast::*;
use crate::error::ExprError;
use crate::lexer::{Token, TokenKind};

/// Deepest recursion through parentheses, brackets, unary and `**` operands.
pub const MAX_NESTING: usize = 64;

/// Tallest expression tree the parser will build. Operator and postfix
/// chains count one level per link, so every tree the evaluator or `Drop`
/// walks is bounded.
pub const MAX_DEPTH: usize = 512;

/// Parse a full token stream as a single expression.
pub fn parse(tokens: Vec<Token>) -> Result<Expr, ExprError> {
    let mut parser = Parser::new(tokens);
    if parser.peek().is_none() {
        return Err(parser.error("empty expression".into()));
    }
    let parsed = parser.parse_expr()?;
    if let Some(tok) = parser.peek() {
        return Err(parser.error(format!("unexpected trailing token {:?}", tok)));
    }
    Ok(parsed.expr)
}

/// A sub-expression and the height of its tree.
struct Parsed {
    expr: Expr,
    height: usize,
}

impl Parsed {
    fn leaf(expr: Expr) -> Self {
        Parsed { expr, height: 1 }
    }
}

/// Split parsed items into their expressions and the tallest height.
fn unzip(items: Vec<Parsed>) -> (Vec<Expr>, usize) {
    let height = items.iter().map(|p| p.height).max().unwrap_or(0);
    (items.into_iter().map(|p| p.expr).collect(), height)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0, depth: 0 }
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn position(&self) -> (usize, usize) {
        match self.tokens.get(self.pos).or_else(|| self.tokens.last()) {
            Some(t) => (t.line, t.col),
            None => (1, 1),
        }
    }

    fn advance(&mut self) -> Option<TokenKind> {
        let tok = self.tokens.get(self.pos).map(|t| t.kind.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &TokenKind) -> Result<TokenKind, ExprError> {
        match self.peek() {
            None => Err(self.error(format!("expected {:?}, got end of input", expected))),
            Some(tok) if std::mem::discriminant(tok) == std::mem::discriminant(expected) => {
                let tok = tok.clone();
                self.pos += 1;
                Ok(tok)
            }
            Some(tok) => {
                let msg = format!("expected {:?}, got {:?}", expected, tok);
                Err(self.error(msg))
            }
        }
    }

    fn expect_ident(&mut self) -> Result<String, ExprError> {
        match self.peek() {
            Some(TokenKind::Ident(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            Some(other) => {
                let msg = format!("expected identifier, got {:?}", other);
                Err(self.error(msg))
            }
            None => Err(self.error("expected identifier, got end of input".into())),
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        match self.peek() {
            Some(k) => std::mem::discriminant(k) == std::mem::discriminant(kind),
            None => false,
        }
    }

    fn error(&self, msg: String) -> ExprError {
        let (line, col) = self.position();
        ExprError::Parse { line, col, msg }
    }

    fn enter(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.error(format!("expression nested deeper than {MAX_NESTING} levels")));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Build a node one level above its tallest child.
    fn node(&self, child_height: usize, expr: Expr) -> Result<Parsed, ExprError> {
        let height = child_height + 1;
        if height > MAX_DEPTH {
            return Err(self.error(format!("expression tree deeper than {MAX_DEPTH} levels")));
        }
        Ok(Parsed { expr, height })
    }

    fn binary(&self, op: BinOp, left: Parsed, right: Parsed) -> Result<Parsed, ExprError> {
        let height = left.height.max(right.height);
        self.node(
            height,
            Expr::Binary { op, left: Box::new(left.expr), right: Box::new(right.expr) },
        )
    }

    fn parse_expr(&mut self) -> Result<Parsed, ExprError> {
        self.enter()?;
        let expr = self.parse_conditional();
        self.leave();
        expr
    }

    fn parse_conditional(&mut self) -> Result<Parsed, ExprError> {
        let condition = self.parse_or()?;
        if !self.check(&TokenKind::Question) {
            return Ok(condition);
        }
        self.advance();
        let then_expr = self.parse_expr()?;
        self.expect(&TokenKind::Colon)?;
        let else_expr = self.parse_expr()?;
        let height = condition.height.max(then_expr.height).max(else_expr.height);
        self.node(
            height,
            Expr::Conditional {
                condition: Box::new(condition.expr),
                then_expr: Box::new(then_expr.expr),
                else_expr: Box::new(else_expr.expr),
            },
        )
    }

    fn parse_or(&mut self) -> Result<Parsed, ExprError> {
        let mut left = self.parse_and()?;
        while self.check(&TokenKind::OrOr) {
            self.advance();
            let right = self.parse_and()?;
            left = self.binary(BinOp::Or, left, right)?;
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Parsed, ExprError> {
        let mut left = self.parse_equality()?;
        while self.check(&TokenKind::AndAnd) {
            self.advance();
            let right = self.parse_equality()?;
            left = self.binary(BinOp::And, left, right)?;
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Parsed, ExprError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::EqEq) | Some(TokenKind::EqEqEq) => BinOp::Eq,
                Some(TokenKind::BangEq) | Some(TokenKind::BangEqEq) => BinOp::Neq,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = self.binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Parsed, ExprError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Lt) => BinOp::Lt,
                Some(TokenKind::LtEq) => BinOp::Lte,
                Some(TokenKind::Gt) => BinOp::Gt,
                Some(TokenKind::GtEq) => BinOp::Gte,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = self.binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Parsed, ExprError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Parsed, ExprError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                Some(TokenKind::Percent) => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = self.binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Parsed, ExprError> {
        let op = match self.peek() {
            Some(TokenKind::Minus) => UnaryOp::Neg,
            Some(TokenKind::Bang) => UnaryOp::Not,
            _ => return self.parse_power(),
        };
        self.advance();
        self.enter()?;
        let operand = self.parse_unary();
        self.leave();
        let operand = operand?;
        self.node(operand.height, Expr::Unary { op, expr: Box::new(operand.expr) })
    }

    // `**` binds tighter than unary minus on its left and is right-associative.
    fn parse_power(&mut self) -> Result<Parsed, ExprError> {
        let base = self.parse_postfix()?;
        if !self.check(&TokenKind::StarStar) {
            return Ok(base);
        }
        self.advance();
        self.enter()?;
        let exponent = self.parse_unary();
        self.leave();
        self.binary(BinOp::Pow, base, exponent?)
    }

    fn parse_postfix(&mut self) -> Result<Parsed, ExprError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.check(&TokenKind::LParen) {
                self.advance();
                let (args, height) = unzip(self.parse_list(&TokenKind::RParen)?);
                expr = self.node(
                    expr.height.max(height),
                    Expr::Call { func: Box::new(expr.expr), args },
                )?;
            } else if self.check(&TokenKind::Dot) {
                self.advance();
                let field = self.expect_ident()?;
                expr = self.node(expr.height, Expr::Member { object: Box::new(expr.expr), field })?;
            } else if self.check(&TokenKind::LBracket) {
                self.advance();
                let index = self.parse_expr()?;
                self.expect(&TokenKind::RBracket)?;
                expr = self.node(
                    expr.height.max(index.height),
                    Expr::Index { object: Box::new(expr.expr), index: Box::new(index.expr) },
                )?;
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// Comma-separated expressions up to `close`, trailing comma allowed.
    fn parse_list(&mut self, close: &TokenKind) -> Result<Vec<Parsed>, ExprError> {
        let mut items = Vec::new();
        while !self.check(close) {
            if !items.is_empty() {
                self.expect(&TokenKind::Comma)?;
                if self.check(close) { break; }
            }
            items.push(self.parse_expr()?);
        }
        self.expect(close)?;
        Ok(items)
    }

    fn parse_primary(&mut self) -> Result<Parsed, ExprError> {
        match self.advance() {
            Some(TokenKind::IntLit(n)) => Ok(Parsed::leaf(Expr::IntLit(n))),
            Some(TokenKind::FloatLit(n)) => Ok(Parsed::leaf(Expr::FloatLit(n))),
            Some(TokenKind::StringLit(s)) => Ok(Parsed::leaf(Expr::StringLit(s))),
            Some(TokenKind::True) => Ok(Parsed::leaf(Expr::BoolLit(true))),
            Some(TokenKind::False) => Ok(Parsed::leaf(Expr::BoolLit(false))),
            Some(TokenKind::Null) => Ok(Parsed::leaf(Expr::NullLit)),
            Some(TokenKind::Ident(name)) => Ok(Parsed::leaf(Expr::Ident(name))),
            Some(TokenKind::LParen) => {
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(expr)
            }
            Some(TokenKind::LBracket) => {
                self.enter()?;
                let items = self.parse_list(&TokenKind::RBracket);
                self.leave();
                let (items, height) = unzip(items?);
                self.node(height, Expr::List(items))
            }
            Some(other) => {
                self.pos -= 1;
                Err(self.error(format!("expected expression, got {:?}", other)))
            }
            None => Err(self.error("expected expression, got end of input".into())),
        }
    }
}
