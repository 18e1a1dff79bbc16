use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::BasilError;
use crate::lexer::{Keyword, Token, TokenKind};
use crate::position::Span;
use crate::value::Value;

/// Recursive-descent parser. Each grammar level is one method; every
/// alternative is keyed by a unique leading token, so no backtracking is
/// needed.
///
/// Error precedence: the deepest failure wins, except that an enclosing rule
/// may replace a nested failure with its own, more contextual message when
/// the nested attempt consumed zero tokens. Each such rule checkpoints the
/// cursor before descending and compares on the way out.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    /// A program is exactly one expression followed by end of input.
    pub fn parse(&mut self) -> Result<Expr, BasilError> {
        let expr = self.expr()?;

        if !self.check(TokenKind::Eof) {
            return Err(self.error_at_current("Expected operator or EOF"));
        }

        Ok(expr)
    }

    fn expr(&mut self) -> Result<Expr, BasilError> {
        if self.check_keyword(Keyword::Var) {
            return self.var_assign();
        }

        let checkpoint = self.current;
        match self.logic_expr() {
            Err(_) if self.current == checkpoint => Err(self.error_at_current(
                "Expected 'VAR', 'IF', 'FOR', 'WHILE', int, float, identifier, '+', '-', '('",
            )),
            other => other,
        }
    }

    fn var_assign(&mut self) -> Result<Expr, BasilError> {
        self.advance(); // VAR

        if !self.check(TokenKind::Identifier) {
            return Err(self.error_at_current("Expected identifier"));
        }
        let name_token = self.advance().clone();

        if !self.check(TokenKind::Eq) {
            return Err(self.error_at_current("Expected '='"));
        }
        self.advance();

        let value = self.expr()?;
        let span = Span::new(name_token.span.start, value.span().end.clone());

        Ok(Expr::VarAssign {
            name: name_token.lexeme,
            value: Box::new(value),
            span,
        })
    }

    fn logic_expr(&mut self) -> Result<Expr, BasilError> {
        let mut expr = self.comp_expr()?;

        loop {
            let operator = if self.check_keyword(Keyword::And) {
                BinaryOp::And
            } else if self.check_keyword(Keyword::Or) {
                BinaryOp::Or
            } else {
                break;
            };
            self.advance();

            let right = self.comp_expr()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn comp_expr(&mut self) -> Result<Expr, BasilError> {
        let checkpoint = self.current;
        match self.comparison() {
            Err(_) if self.current == checkpoint => {
                Err(self.error_at_current("Expected int, float, identifier, '+', '-', '('"))
            }
            other => other,
        }
    }

    fn comparison(&mut self) -> Result<Expr, BasilError> {
        let mut expr = self.arith_expr()?;

        while let Some(operator) = comparison_op(self.peek().kind) {
            self.advance();
            let right = self.arith_expr()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn arith_expr(&mut self) -> Result<Expr, BasilError> {
        let mut expr = self.term()?;

        loop {
            let operator = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();

            let right = self.term()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, BasilError> {
        let mut expr = self.factor()?;

        loop {
            let operator = match self.peek().kind {
                TokenKind::Mul => BinaryOp::Multiply,
                TokenKind::Div => BinaryOp::Divide,
                _ => break,
            };
            self.advance();

            let right = self.factor()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, BasilError> {
        let operator = match self.peek().kind {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Negate,
            _ => return self.power(),
        };

        let op_token = self.advance().clone();
        let operand = self.factor()?;
        let span = Span::new(op_token.span.start, operand.span().end.clone());

        Ok(Expr::Unary {
            operator,
            operand: Box::new(operand),
            span,
        })
    }

    /// Right-associative: the right operand recurses through `factor`, which
    /// descends back into `power`.
    fn power(&mut self) -> Result<Expr, BasilError> {
        let mut expr = self.call()?;

        while self.check(TokenKind::Pow) {
            self.advance();
            let right = self.factor()?;
            expr = binary(expr, BinaryOp::Power, right);
        }

        Ok(expr)
    }

    /// Parses an optional single parenthesized argument after an atom. There
    /// are no callable values yet, so the argument is checked for syntax and
    /// discarded.
    fn call(&mut self) -> Result<Expr, BasilError> {
        let atom = self.atom()?;

        if self.check(TokenKind::LParen) {
            self.advance();

            if self.check(TokenKind::RParen) {
                self.advance();
            } else {
                let checkpoint = self.current;
                match self.expr() {
                    Err(_) if self.current == checkpoint => {
                        return Err(self.error_at_current(
                            "Expected ')', 'VAR', 'IF', 'FOR', 'WHILE', int, float, \
                             identifier, '+', '-', '('",
                        ))
                    }
                    Err(err) => return Err(err),
                    Ok(_) => {}
                }

                if !self.check(TokenKind::RParen) {
                    return Err(self.error_at_current("Expected ',' or ')'"));
                }
                self.advance();
            }
        }

        Ok(atom)
    }

    fn atom(&mut self) -> Result<Expr, BasilError> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::Int => {
                self.advance();
                // An Int literal past i64 range becomes a Double; the lexer
                // only admitted digits, so the literal itself never fails.
                let value = match token.lexeme.parse::<i64>() {
                    Ok(n) => Value::Int(n),
                    Err(_) => Value::Double(token.lexeme.parse().unwrap_or_default()),
                };
                Ok(Expr::Number {
                    value,
                    span: token.span,
                })
            }
            TokenKind::Float => {
                self.advance();
                Ok(Expr::Number {
                    value: Value::Double(token.lexeme.parse().unwrap_or_default()),
                    span: token.span,
                })
            }
            TokenKind::Str => {
                self.advance();
                Ok(Expr::Str {
                    value: token.lexeme,
                    span: token.span,
                })
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::VarAccess {
                    name: token.lexeme,
                    span: token.span,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.expr()?;
                if !self.check(TokenKind::RParen) {
                    return Err(self.error_at_current("Expected ')'"));
                }
                self.advance();
                Ok(expr)
            }
            TokenKind::Keyword(Keyword::If) => self.if_expr(),
            TokenKind::Keyword(Keyword::For) => self.for_expr(),
            TokenKind::Keyword(Keyword::While) => self.while_expr(),
            _ => Err(BasilError::invalid_syntax(
                token.span,
                "Expected int, float, identifier, '+', '-', '(', 'IF', 'FOR', 'WHILE'"
                    .to_string(),
            )),
        }
    }

    fn if_expr(&mut self) -> Result<Expr, BasilError> {
        self.advance(); // IF

        let mut cases = Vec::new();

        let condition = self.expr()?;
        self.expect_keyword(Keyword::Then)?;
        let branch = self.expr()?;
        cases.push((condition, branch));

        while self.check_keyword(Keyword::Elif) {
            self.advance();
            let condition = self.expr()?;
            self.expect_keyword(Keyword::Then)?;
            let branch = self.expr()?;
            cases.push((condition, branch));
        }

        let else_case = if self.check_keyword(Keyword::Else) {
            self.advance();
            Some(Box::new(self.expr()?))
        } else {
            None
        };

        let start = cases[0].0.span().start.clone();
        let end = match &else_case {
            Some(else_expr) => else_expr.span().end.clone(),
            None => cases[cases.len() - 1].0.span().end.clone(),
        };

        Ok(Expr::If {
            cases,
            else_case,
            span: Span::new(start, end),
        })
    }

    fn for_expr(&mut self) -> Result<Expr, BasilError> {
        self.advance(); // FOR

        if !self.check(TokenKind::Identifier) {
            return Err(self.error_at_current("Expected identifier"));
        }
        let name_token = self.advance().clone();

        if !self.check(TokenKind::Eq) {
            return Err(self.error_at_current("Expected '='"));
        }
        self.advance();

        let start = self.expr()?;
        self.expect_keyword(Keyword::To)?;
        let end = self.expr()?;

        let step = if self.check_keyword(Keyword::Step) {
            self.advance();
            Some(Box::new(self.expr()?))
        } else {
            None
        };

        self.expect_keyword(Keyword::Then)?;
        let body = self.expr()?;

        let span = Span::new(name_token.span.start, body.span().end.clone());
        Ok(Expr::For {
            var_name: name_token.lexeme,
            start: Box::new(start),
            end: Box::new(end),
            step,
            body: Box::new(body),
            span,
        })
    }

    fn while_expr(&mut self) -> Result<Expr, BasilError> {
        self.advance(); // WHILE

        let condition = self.expr()?;
        self.expect_keyword(Keyword::Then)?;
        let body = self.expr()?;

        let span = Span::new(condition.span().start.clone(), body.span().end.clone());
        Ok(Expr::While {
            condition: Box::new(condition),
            body: Box::new(body),
            span,
        })
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn advance(&mut self) -> &Token {
        if self.peek().kind != TokenKind::Eof {
            self.current += 1;
        }
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().is_keyword(keyword)
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), BasilError> {
        if !self.check_keyword(keyword) {
            return Err(self.error_at_current(&format!("Expected '{}'", keyword.as_str())));
        }
        self.advance();
        Ok(())
    }

    fn error_at_current(&self, message: &str) -> BasilError {
        BasilError::invalid_syntax(self.peek().span.clone(), message.to_string())
    }
}

fn binary(left: Expr, operator: BinaryOp, right: Expr) -> Expr {
    let span = Span::new(left.span().start.clone(), right.span().end.clone());
    Expr::Binary {
        left: Box::new(left),
        operator,
        right: Box::new(right),
        span,
    }
}

fn comparison_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Ee => Some(BinaryOp::Equal),
        TokenKind::Ne => Some(BinaryOp::NotEqual),
        TokenKind::Lt => Some(BinaryOp::Less),
        TokenKind::Gt => Some(BinaryOp::Greater),
        TokenKind::Lte => Some(BinaryOp::LessEqual),
        TokenKind::Gte => Some(BinaryOp::GreaterEqual),
        _ => None,
    }
}
