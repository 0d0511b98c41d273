//! Path Enumerator (spec.md §4.D).
//!
//! Performs an explicit-accumulator depth-first walk of the Context tree
//! (no parent back-links, no implicit recursion stack reused across calls)
//! and emits one [`Path`] per root-to-leaf route, in the order the tree's
//! children appear. Conditional contexts are always walked true-branch
//! first, then false-branch, which is what gives the enumerator's overall
//! output its "true before false" ordering guarantee (spec.md §4.D
//! invariant).
//!
//! Grounded in the teacher's explicit-stack tree walkers (`eval.rs`'s
//! recursive evaluation of nested forms passes an owned accumulator down
//! rather than mutating shared state).

use crate::ast::Expr;
use crate::context::Context;

/// One edge of a [`Path`]: either a variable update or a branch taken with
/// a fixed polarity.
#[derive(Debug, Clone, Copy)]
pub enum Step<'ctx> {
    Assignment {
        variable: &'ctx str,
        expression: &'ctx Expr,
    },
    Branch {
        predicate: &'ctx Expr,
        polarity: bool,
        line_range: (usize, usize),
    },
}

/// A single root-to-leaf route through the Context tree: the ordered
/// sequence of assignments and branch decisions encountered along the way.
#[derive(Debug, Clone)]
pub struct Path<'ctx> {
    pub steps: Vec<Step<'ctx>>,
}

/// Enumerates every Path in `root`, in true-before-false / left-to-right
/// order.
pub fn enumerate_paths(root: &Context) -> Vec<Path<'_>> {
    let mut acc = Vec::new();
    let mut paths = Vec::new();
    walk(root, &mut acc, &mut paths);
    paths
}

fn walk<'ctx>(ctx: &'ctx Context, acc: &mut Vec<Step<'ctx>>, paths: &mut Vec<Path<'ctx>>) {
    match ctx {
        Context::Root { children, .. } => walk_children(children, acc, paths),
        Context::Assignment {
            variable,
            expression,
            children,
        } => {
            acc.push(Step::Assignment {
                variable,
                expression,
            });
            walk_children(children, acc, paths);
            acc.pop();
        }
        Context::Conditional {
            predicate,
            line_range,
            then_children,
            else_children,
        } => {
            acc.push(Step::Branch {
                predicate,
                polarity: true,
                line_range: *line_range,
            });
            walk_children(then_children, acc, paths);
            acc.pop();

            acc.push(Step::Branch {
                predicate,
                polarity: false,
                line_range: *line_range,
            });
            walk_children(else_children, acc, paths);
            acc.pop();
        }
    }
}

fn walk_children<'ctx>(
    children: &'ctx [Context],
    acc: &mut Vec<Step<'ctx>>,
    paths: &mut Vec<Path<'ctx>>,
) {
    if children.is_empty() {
        paths.push(Path { steps: acc.clone() });
        return;
    }
    for child in children {
        walk(child, acc, paths);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Span, Type};
    use std::collections::HashMap;

    fn leaf_assign(name: &str, value: i64) -> Context {
        Context::Assignment {
            variable: name.to_string(),
            expression: Expr::IntLiteral(value, Span::default()),
            children: vec![],
        }
    }

    #[test]
    fn straight_line_yields_single_path() {
        let root = Context::Root {
            symbols: HashMap::from([("x".to_string(), Type::Int)]),
            children: vec![leaf_assign("x", 1)],
        };
        let paths = enumerate_paths(&root);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].steps.len(), 1);
    }

    #[test]
    fn branch_yields_two_paths_true_first() {
        let root = Context::Root {
            symbols: HashMap::new(),
            children: vec![Context::Conditional {
                predicate: Expr::BoolLiteral(true, Span::default()),
                line_range: (1, 1),
                then_children: vec![leaf_assign("a", 1)],
                else_children: vec![leaf_assign("b", 2)],
            }],
        };
        let paths = enumerate_paths(&root);
        assert_eq!(paths.len(), 2);
        match &paths[0].steps[0] {
            Step::Branch { polarity, .. } => assert!(*polarity),
            _ => panic!("expected branch step"),
        }
        match &paths[1].steps[0] {
            Step::Branch { polarity, .. } => assert!(!*polarity),
            _ => panic!("expected branch step"),
        }
    }

    #[test]
    fn if_without_else_still_yields_false_path() {
        let root = Context::Root {
            symbols: HashMap::new(),
            children: vec![Context::Conditional {
                predicate: Expr::BoolLiteral(true, Span::default()),
                line_range: (1, 1),
                then_children: vec![leaf_assign("a", 1)],
                else_children: vec![],
            }],
        };
        let paths = enumerate_paths(&root);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[1].steps.len(), 1);
    }
}
