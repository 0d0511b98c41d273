//! Statement Processor (spec.md §4.E).
//!
//! Walks a single [`Path`] and turns it into an ordered [`Condition`] list
//! ready for SMT lowering. Per the Open Question decision recorded in
//! DESIGN.md, this is substitution-based rather than SSA-renaming-based:
//! each assignment's right-hand side is first rewritten against the
//! current substitution environment, and the *resolved* expression both
//! becomes the Condition's payload and replaces the variable's entry in
//! the environment for anything coming after it on the path. A branch
//! predicate is resolved against that same environment before the
//! Condition is recorded, so every Condition handed to the SMT Driver
//! (§4.F/§4.G) is already expressed purely in terms of parameters,
//! top-level constants, and literals.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::ast::Expr;
use crate::pathenum::{Path, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    Assign,
    Branch,
}

/// One element of the Condition list spec.md §4.E emits per Path.
#[derive(Debug, Clone)]
pub struct Condition {
    pub kind: ConditionKind,
    pub variable: Option<String>,
    pub expression: Expr,
    pub polarity: Option<bool>,
    pub line_range: Option<(usize, usize)>,
    pub referenced_vars: HashSet<String>,
}

/// Resolves every step of `path` against a running substitution
/// environment and returns the resulting Condition list, in path order.
pub fn process_path(path: &Path<'_>) -> Vec<Condition> {
    let mut env: HashMap<String, Expr> = HashMap::new();
    let mut conditions = Vec::with_capacity(path.steps.len());

    for step in &path.steps {
        match step {
            Step::Assignment {
                variable,
                expression,
            } => {
                let resolved = substitute(expression, &env);
                let mut referenced = HashSet::new();
                resolved.referenced_vars(&mut referenced);
                conditions.push(Condition {
                    kind: ConditionKind::Assign,
                    variable: Some((*variable).to_string()),
                    expression: resolved.clone(),
                    polarity: None,
                    line_range: None,
                    referenced_vars: referenced,
                });
                env.insert((*variable).to_string(), resolved);
            }
            Step::Branch {
                predicate,
                polarity,
                line_range,
            } => {
                let resolved = substitute(predicate, &env);
                let expression = if *polarity {
                    resolved.clone()
                } else {
                    let span = resolved.span();
                    Expr::Not {
                        operand: Box::new(resolved.clone()),
                        span,
                    }
                };
                let mut referenced = HashSet::new();
                expression.referenced_vars(&mut referenced);
                conditions.push(Condition {
                    kind: ConditionKind::Branch,
                    variable: None,
                    expression,
                    polarity: Some(*polarity),
                    line_range: Some(*line_range),
                    referenced_vars: referenced,
                });
            }
        }
    }

    conditions
}

/// Replaces every identifier found in `env` with its current resolved
/// expression. Identifiers with no entry are left untouched — they must be
/// parameters or top-level constants, and are looked up against the Root
/// symbol table by the SMT Driver; if they resolve to nothing there, that
/// driver raises `UnknownSymbol` (spec.md §4.F).
fn substitute(expr: &Expr, env: &HashMap<String, Expr>) -> Expr {
    match expr {
        Expr::IntLiteral(..) | Expr::BoolLiteral(..) | Expr::Unrecognized(..) => expr.clone(),
        Expr::Identifier(name, _) => env.get(name).cloned().unwrap_or_else(|| expr.clone()),
        Expr::Binary { op, lhs, rhs, span } => Expr::Binary {
            op: *op,
            lhs: Box::new(substitute(lhs, env)),
            rhs: Box::new(substitute(rhs, env)),
            span: *span,
        },
        Expr::Not { operand, span } => Expr::Not {
            operand: Box::new(substitute(operand, env)),
            span: *span,
        },
        Expr::NonNullUnwrap { operand, span } => Expr::NonNullUnwrap {
            operand: Box::new(substitute(operand, env)),
            span: *span,
        },
        Expr::Ternary {
            condition,
            then_branch,
            else_branch,
            span,
        } => Expr::Ternary {
            condition: Box::new(substitute(condition, env)),
            then_branch: Box::new(substitute(then_branch, env)),
            else_branch: Box::new(substitute(else_branch, env)),
            span: *span,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, Span};

    #[test]
    fn assignment_substitutes_into_later_branch() {
        let steps = vec![
            Step::Assignment {
                variable: "x",
                expression: &Expr::IntLiteral(5, Span::default()),
            },
            Step::Branch {
                predicate: &Expr::Binary {
                    op: BinOp::Gt,
                    lhs: Box::new(Expr::Identifier("x".to_string(), Span::default())),
                    rhs: Box::new(Expr::IntLiteral(0, Span::default())),
                    span: Span::default(),
                },
                polarity: true,
                line_range: (1, 1),
            },
        ];
        let path = Path { steps };
        let conditions = process_path(&path);
        assert_eq!(conditions.len(), 2);
        match &conditions[1].expression {
            Expr::Binary { lhs, .. } => {
                assert_eq!(**lhs, Expr::IntLiteral(5, Span::default()));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn false_polarity_wraps_predicate_in_not() {
        let steps = vec![Step::Branch {
            predicate: &Expr::BoolLiteral(true, Span::default()),
            polarity: false,
            line_range: (2, 2),
        }];
        let path = Path { steps };
        let conditions = process_path(&path);
        assert!(matches!(conditions[0].expression, Expr::Not { .. }));
    }
}
