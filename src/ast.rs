use crate::position::Span;
use crate::value::Value;

/// One syntactic construct of a parsed program. A program is a single
/// expression; there is no statement sequencing in this language.
#[derive(Debug, Clone)]
pub enum Expr {
    Number {
        value: Value,
        span: Span,
    },
    Str {
        value: String,
        span: Span,
    },
    VarAccess {
        name: String,
        span: Span,
    },
    VarAssign {
        name: String,
        value: Box<Expr>,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
        span: Span,
    },
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    If {
        /// (condition, branch) pairs, tried in order.
        cases: Vec<(Expr, Expr)>,
        else_case: Option<Box<Expr>>,
        span: Span,
    },
    For {
        var_name: String,
        start: Box<Expr>,
        end: Box<Expr>,
        step: Option<Box<Expr>>,
        body: Box<Expr>,
        span: Span,
    },
    While {
        condition: Box<Expr>,
        body: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Number { span, .. } => span,
            Expr::Str { span, .. } => span,
            Expr::VarAccess { span, .. } => span,
            Expr::VarAssign { span, .. } => span,
            Expr::Binary { span, .. } => span,
            Expr::Unary { span, .. } => span,
            Expr::If { span, .. } => span,
            Expr::For { span, .. } => span,
            Expr::While { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    /// Unary plus leaves its operand untouched.
    Plus,
    Negate,
    /// Logical complement. No surface syntax produces it yet, but the
    /// operator set is closed and the evaluator handles every member.
    Not,
}
