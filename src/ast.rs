//! Tagged AST over the accepted subset: a single function declaration with
//! scalar parameters, straight-line statements, `if`/`else if`/`else`, and
//! `return`. All nodes carry a [`Span`] for diagnostics and PathNote
//! line-range attribution.

use serde::{Deserialize, Serialize};

/// Byte-offset range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// The only two declared scalar types accepted by the Source Validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Int,
    Bool,
}

impl Type {
    pub fn from_source_name(name: &str) -> Option<Type> {
        match name {
            "number" => Some(Type::Int),
            "boolean" => Some(Type::Bool),
            _ => None,
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "number"),
            Type::Bool => write!(f, "boolean"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinOp {
    pub fn from_token(token: &str) -> Option<BinOp> {
        match token {
            "<" => Some(BinOp::Lt),
            "<=" => Some(BinOp::Le),
            ">" => Some(BinOp::Gt),
            ">=" => Some(BinOp::Ge),
            "==" => Some(BinOp::Eq),
            "!=" => Some(BinOp::Ne),
            "&&" => Some(BinOp::And),
            "||" => Some(BinOp::Or),
            _ => None,
        }
    }
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        };
        write!(f, "{s}")
    }
}

/// An expression AST fragment. Recognized forms per spec.md §3: integer and
/// boolean literals, identifiers, and the binary comparison/boolean
/// operators. `Not` covers `!`; `NonNullUnwrap` is the transparent wrapper
/// from spec.md §4.F. `Ternary` is parsed but always rejected by the
/// Condition Evaluator (spec.md §9 Open Questions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    IntLiteral(i64, Span),
    BoolLiteral(bool, Span),
    Identifier(String, Span),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Not {
        operand: Box<Expr>,
        span: Span,
    },
    NonNullUnwrap {
        operand: Box<Expr>,
        span: Span,
    },
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
        span: Span,
    },
    /// An operator or node kind the AST Adapter recognized syntactically
    /// but does not know how to lower; carries the source text for the
    /// warning message produced by §4.B / §4.F.
    Unrecognized(String, Span),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::IntLiteral(_, s)
            | Expr::BoolLiteral(_, s)
            | Expr::Identifier(_, s)
            | Expr::Unrecognized(_, s) => *s,
            Expr::Binary { span, .. }
            | Expr::Not { span, .. }
            | Expr::NonNullUnwrap { span, .. }
            | Expr::Ternary { span, .. } => *span,
        }
    }

    /// Free identifiers referenced anywhere in this expression.
    pub fn referenced_vars(&self, out: &mut std::collections::HashSet<String>) {
        match self {
            Expr::IntLiteral(..) | Expr::BoolLiteral(..) | Expr::Unrecognized(..) => {}
            Expr::Identifier(name, _) => {
                out.insert(name.clone());
            }
            Expr::Binary { lhs, rhs, .. } => {
                lhs.referenced_vars(out);
                rhs.referenced_vars(out);
            }
            Expr::Not { operand, .. } | Expr::NonNullUnwrap { operand, .. } => {
                operand.referenced_vars(out);
            }
            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                condition.referenced_vars(out);
                then_branch.referenced_vars(out);
                else_branch.referenced_vars(out);
            }
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::IntLiteral(n, _) => write!(f, "{n}"),
            Expr::BoolLiteral(b, _) => write!(f, "{b}"),
            Expr::Identifier(name, _) => write!(f, "{name}"),
            Expr::Binary { op, lhs, rhs, .. } => write!(f, "({lhs} {op} {rhs})"),
            Expr::Not { operand, .. } => write!(f, "!{operand}"),
            Expr::NonNullUnwrap { operand, .. } => write!(f, "{operand}!"),
            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
                ..
            } => write!(f, "({condition} ? {then_branch} : {else_branch})"),
            Expr::Unrecognized(text, _) => write!(f, "{text}"),
        }
    }
}

/// A typed function parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty_name: String,
    pub span: Span,
}

/// Statements drawn from the accepted subset (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    /// `let`/`const` declaration with initializer.
    VarDecl {
        name: String,
        ty_name: Option<String>,
        init: Expr,
        span: Span,
    },
    /// `name = expr;`
    Assign {
        name: String,
        value: Expr,
        span: Span,
    },
    /// `if (cond) { then } else if (...) {...} else { ... }`, desugared into
    /// a binary then/else tree by the parser (an `else if` cascade is
    /// nested `If`s inside the `else` branch, per spec.md §4.C).
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
        /// Line range of the originating `if` statement (1-indexed,
        /// inclusive), used for PathNote attribution.
        line_range: (usize, usize),
        span: Span,
    },
    Return {
        value: Option<Expr>,
        span: Span,
    },
    /// A statement kind the AST Adapter recognized but the Builder is not
    /// instructed to handle; observed only, no effect (spec.md §4.C).
    Unrecognized(Span),
}

/// A single top-level function declaration with typed scalar parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// A top-level constant/variable declaration outside the function body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopLevelDecl {
    pub name: String,
    pub ty_name: Option<String>,
    pub init: Expr,
    pub span: Span,
}

/// The parsed program: one function declaration, any number of top-level
/// declarations, and an optional call site (unused by the analysis — the
/// analyzer reasons about the function body's own parameters).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub top_level: Vec<TopLevelDecl>,
    pub function: Function,
}
