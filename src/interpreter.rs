use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::BasilError;
use crate::position::{Position, Span};
use crate::value::Value;
use std::collections::HashMap;

/// A scope's name bindings plus a borrowed link to the enclosing scope.
/// Lookup walks the chain; `set` always writes locally.
#[derive(Debug, Default)]
pub struct SymbolTable<'p> {
    symbols: HashMap<String, Value>,
    parent: Option<&'p SymbolTable<'p>>,
}

impl<'p> SymbolTable<'p> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: &'p SymbolTable<'p>) -> Self {
        Self {
            symbols: HashMap::new(),
            parent: Some(parent),
        }
    }

    /// The root scope every program starts from.
    pub fn global() -> SymbolTable<'static> {
        let mut table = SymbolTable::new();
        table.set("NULL", Value::Int(0));
        table.set("FALSE", Value::Int(0));
        table.set("TRUE", Value::Int(1));
        table
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        match self.symbols.get(name) {
            Some(value) => Some(value.clone()),
            None => self.parent.and_then(|parent| parent.get(name)),
        }
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.symbols.insert(name.to_string(), value);
    }
}

/// One frame of the call chain, used only to build runtime tracebacks. The
/// chain is borrowed stack data: each frame lives exactly as long as the
/// evaluation that entered it.
#[derive(Debug)]
pub struct Context<'a> {
    pub display_name: &'a str,
    pub parent: Option<&'a Context<'a>>,
    pub parent_entry_pos: Option<Position>,
}

impl<'a> Context<'a> {
    pub fn root(display_name: &'a str) -> Self {
        Self {
            display_name,
            parent: None,
            parent_entry_pos: None,
        }
    }
}

/// Tree-walking evaluator. Every visit yields `Some` value or `None` for
/// constructs with no result (loops, an `IF` where no branch ran).
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    pub fn visit(
        &self,
        node: &Expr,
        context: &Context,
        table: &mut SymbolTable,
    ) -> Result<Option<Value>, BasilError> {
        match node {
            Expr::Number { value, .. } => Ok(Some(value.clone())),
            Expr::Str { value, .. } => Ok(Some(Value::Str(value.clone()))),
            Expr::VarAccess { name, span } => match table.get(name) {
                Some(value) => Ok(Some(value)),
                None => Err(BasilError::runtime(
                    span.clone(),
                    format!("'{}' is not defined", name),
                    context,
                )),
            },
            Expr::VarAssign { name, value, .. } => {
                let result = self.visit(value, context, table)?;
                let result = self.expect_value(result, value.span(), context)?;
                table.set(name, result.clone());
                Ok(Some(result))
            }
            Expr::Binary {
                left,
                operator,
                right,
                span,
            } => {
                let left_value = self.visit(left, context, table)?;
                let left_value = self.expect_value(left_value, left.span(), context)?;
                let right_value = self.visit(right, context, table)?;
                let right_value = self.expect_value(right_value, right.span(), context)?;

                self.binary_op(*operator, left_value, right_value, span, right.span(), context)
                    .map(Some)
            }
            Expr::Unary {
                operator,
                operand,
                span,
            } => {
                let value = self.visit(operand, context, table)?;
                let value = self.expect_value(value, operand.span(), context)?;
                self.unary_op(*operator, value, span, context).map(Some)
            }
            Expr::If {
                cases, else_case, ..
            } => {
                for (condition, branch) in cases {
                    let condition_value = self.visit(condition, context, table)?;
                    let condition_value =
                        self.expect_value(condition_value, condition.span(), context)?;

                    if condition_value.is_truthy() {
                        return self.visit(branch, context, table);
                    }
                }

                if let Some(else_expr) = else_case {
                    return self.visit(else_expr, context, table);
                }

                Ok(None)
            }
            Expr::For {
                var_name,
                start,
                end,
                step,
                body,
                ..
            } => {
                let start_value = self.visit(start, context, table)?;
                let start_value = self.expect_number(start_value, start.span(), context)?;
                let end_value = self.visit(end, context, table)?;
                let end_value = self.expect_number(end_value, end.span(), context)?;

                let step_value = match step {
                    Some(step_expr) => {
                        let value = self.visit(step_expr, context, table)?;
                        self.expect_number(value, step_expr.span(), context)?
                    }
                    None => Value::Int(1),
                };

                let ascending = match step_value {
                    Value::Int(n) => n >= 0,
                    Value::Double(d) => d >= 0.0,
                    Value::Str(_) => unreachable!("step checked numeric"),
                };

                // The counter is bound in the current scope and leaks past
                // the loop end; no new scope is pushed.
                let mut counter = start_value;
                loop {
                    let keep_going = if ascending {
                        number_lt(&counter, &end_value)
                    } else {
                        number_gt(&counter, &end_value)
                    };
                    if !keep_going {
                        break;
                    }

                    table.set(var_name, counter.clone());
                    counter = number_add(&counter, &step_value);

                    self.visit(body, context, table)?;
                }

                Ok(None)
            }
            Expr::While {
                condition, body, ..
            } => {
                loop {
                    let condition_value = self.visit(condition, context, table)?;
                    let condition_value =
                        self.expect_value(condition_value, condition.span(), context)?;

                    if !condition_value.is_truthy() {
                        break;
                    }

                    self.visit(body, context, table)?;
                }

                Ok(None)
            }
        }
    }

    /// A construct that produced no value cannot be used as an operand,
    /// condition, or assignment source.
    fn expect_value(
        &self,
        result: Option<Value>,
        span: &Span,
        context: &Context,
    ) -> Result<Value, BasilError> {
        result.ok_or_else(|| {
            BasilError::runtime(span.clone(), "Illegal operation".to_string(), context)
        })
    }

    fn expect_number(
        &self,
        result: Option<Value>,
        span: &Span,
        context: &Context,
    ) -> Result<Value, BasilError> {
        let value = self.expect_value(result, span, context)?;
        if !value.is_number() {
            return Err(BasilError::runtime(
                span.clone(),
                "Illegal operation".to_string(),
                context,
            ));
        }
        Ok(value)
    }

    fn binary_op(
        &self,
        operator: BinaryOp,
        left: Value,
        right: Value,
        span: &Span,
        right_span: &Span,
        context: &Context,
    ) -> Result<Value, BasilError> {
        let illegal = || {
            BasilError::runtime(span.clone(), "Illegal operation".to_string(), context)
        };

        match operator {
            BinaryOp::Add => match (left, right) {
                (Value::Int(l), Value::Int(r)) => Ok(int_or_promote(
                    l.checked_add(r),
                    l as f64 + r as f64,
                )),
                (l, r) if l.is_number() && r.is_number() => {
                    Ok(Value::Double(as_double(&l) + as_double(&r)))
                }
                (Value::Str(l), Value::Str(r)) => Ok(Value::Str(l + &r)),
                _ => Err(illegal()),
            },
            BinaryOp::Subtract => match (left, right) {
                (Value::Int(l), Value::Int(r)) => Ok(int_or_promote(
                    l.checked_sub(r),
                    l as f64 - r as f64,
                )),
                (l, r) if l.is_number() && r.is_number() => {
                    Ok(Value::Double(as_double(&l) - as_double(&r)))
                }
                _ => Err(illegal()),
            },
            BinaryOp::Multiply => match (left, right) {
                (Value::Int(l), Value::Int(r)) => Ok(int_or_promote(
                    l.checked_mul(r),
                    l as f64 * r as f64,
                )),
                (l, r) if l.is_number() && r.is_number() => {
                    Ok(Value::Double(as_double(&l) * as_double(&r)))
                }
                // String repetition; a negative count yields "".
                (Value::Str(s), Value::Int(n)) => {
                    Ok(Value::Str(s.repeat(usize::try_from(n).unwrap_or(0))))
                }
                _ => Err(illegal()),
            },
            BinaryOp::Divide => {
                if !left.is_number() || !right.is_number() {
                    return Err(illegal());
                }
                if matches!(right, Value::Int(0)) || matches!(right, Value::Double(d) if d == 0.0)
                {
                    return Err(BasilError::runtime(
                        right_span.clone(),
                        "Can not divide anything by 0".to_string(),
                        context,
                    ));
                }
                // Division always yields a double, even between ints.
                Ok(Value::Double(as_double(&left) / as_double(&right)))
            }
            BinaryOp::Power => match (left, right) {
                (Value::Int(l), Value::Int(r)) if (0..=u32::MAX as i64).contains(&r) => {
                    Ok(int_or_promote(
                        l.checked_pow(r as u32),
                        (l as f64).powf(r as f64),
                    ))
                }
                (l, r) if l.is_number() && r.is_number() => {
                    Ok(Value::Double(as_double(&l).powf(as_double(&r))))
                }
                _ => Err(illegal()),
            },
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::Less
            | BinaryOp::Greater
            | BinaryOp::LessEqual
            | BinaryOp::GreaterEqual => {
                if !left.is_number() || !right.is_number() {
                    return Err(illegal());
                }
                Ok(Value::Int(compare_numbers(operator, &left, &right) as i64))
            }
            // AND/OR evaluate both sides, select by truthiness, and truncate
            // the selected operand to an int.
            BinaryOp::And => {
                if !left.is_number() || !right.is_number() {
                    return Err(illegal());
                }
                let picked = if left.is_truthy() { right } else { left };
                Ok(Value::Int(truncate_to_int(&picked)))
            }
            BinaryOp::Or => {
                if !left.is_number() || !right.is_number() {
                    return Err(illegal());
                }
                let picked = if left.is_truthy() { left } else { right };
                Ok(Value::Int(truncate_to_int(&picked)))
            }
        }
    }

    fn unary_op(
        &self,
        operator: UnaryOp,
        operand: Value,
        span: &Span,
        context: &Context,
    ) -> Result<Value, BasilError> {
        match operator {
            UnaryOp::Plus => Ok(operand),
            // Negation is multiplication by -1, so a string repeated -1
            // times collapses to "".
            UnaryOp::Negate => match operand {
                Value::Int(n) => Ok(int_or_promote(n.checked_neg(), -(n as f64))),
                Value::Double(d) => Ok(Value::Double(-d)),
                Value::Str(_) => Ok(Value::Str(String::new())),
            },
            UnaryOp::Not => match operand {
                Value::Int(n) => Ok(Value::Int((n == 0) as i64)),
                Value::Double(d) => Ok(Value::Int((d == 0.0) as i64)),
                Value::Str(_) => Err(BasilError::runtime(
                    span.clone(),
                    "Illegal operation".to_string(),
                    context,
                )),
            },
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn as_double(value: &Value) -> f64 {
    match value {
        Value::Int(n) => *n as f64,
        Value::Double(d) => *d,
        Value::Str(_) => 0.0,
    }
}

/// Int arithmetic promotes to a double instead of overflowing.
fn int_or_promote(int_result: Option<i64>, promoted: f64) -> Value {
    match int_result {
        Some(n) => Value::Int(n),
        None => Value::Double(promoted),
    }
}

fn truncate_to_int(value: &Value) -> i64 {
    match value {
        Value::Int(n) => *n,
        Value::Double(d) => *d as i64,
        Value::Str(_) => 0,
    }
}

fn compare_numbers(operator: BinaryOp, left: &Value, right: &Value) -> bool {
    if let (Value::Int(l), Value::Int(r)) = (left, right) {
        return match operator {
            BinaryOp::Equal => l == r,
            BinaryOp::NotEqual => l != r,
            BinaryOp::Less => l < r,
            BinaryOp::Greater => l > r,
            BinaryOp::LessEqual => l <= r,
            BinaryOp::GreaterEqual => l >= r,
            _ => false,
        };
    }

    let (l, r) = (as_double(left), as_double(right));
    match operator {
        BinaryOp::Equal => l == r,
        BinaryOp::NotEqual => l != r,
        BinaryOp::Less => l < r,
        BinaryOp::Greater => l > r,
        BinaryOp::LessEqual => l <= r,
        BinaryOp::GreaterEqual => l >= r,
        _ => false,
    }
}

fn number_add(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Int(l), Value::Int(r)) => {
            int_or_promote(l.checked_add(*r), *l as f64 + *r as f64)
        }
        _ => Value::Double(as_double(left) + as_double(right)),
    }
}

fn number_lt(left: &Value, right: &Value) -> bool {
    compare_numbers(BinaryOp::Less, left, right)
}

fn number_gt(left: &Value, right: &Value) -> bool {
    compare_numbers(BinaryOp::Greater, left, right)
}
