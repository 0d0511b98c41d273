//! Condition Evaluator + SMT Driver (spec.md §4.F, §4.G).
//!
//! Lowers a Path's (already-substituted) Condition list into a single z3
//! query and reads back a reachability verdict. Grounded in the pack's z3
//! usage example (`cbse-sevm-src-path.rs.rs`): one [`Solver`] per path,
//! asserting conditions onto it in order and reading `solver.check()`.
//! Unlike that example this driver shares one [`z3::Context`] across every
//! path of a single analysis request (spec.md §9 Open Question decision)
//! rather than one Context per path — paths are independent so a fresh
//! `Solver` per path is enough isolation.

use std::collections::HashMap;

use z3::ast::{Ast, Bool, Int};
use z3::{Context as Z3Context, Params, SatResult, Solver};

use crate::ast::{BinOp, Expr, Type};
use crate::condition::{Condition, ConditionKind};
use crate::diagnostics::{named_source, to_source_span, AnalysisError, Diagnostic};

/// An output annotation recording a source line range and whether the
/// corresponding Path is reachable (spec.md §3, §6). Per §4.G, a `sat`
/// path emits no PathNote at all by default — only `unsat` (dead code,
/// `reachable: false`) and `unknown` (`reachable: true` with an
/// explanation) paths are surfaced.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathNote {
    pub start_line: usize,
    pub end_line: usize,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Either half of a lowered expression: the accepted subset is exactly
/// integers and booleans (spec.md §3), so no other z3 sort ever appears.
enum ZValue<'z> {
    Int(Int<'z>),
    Bool(Bool<'z>),
}

/// Evaluates a single Path's Condition list against a fresh [`Solver`]
/// inside the shared request-scoped `z3ctx`. `root_symbols` supplies the
/// declared type of every parameter/top-level constant, used to create
/// the matching z3 constant for each one before any condition references
/// it.
pub fn evaluate_path(
    z3ctx: &Z3Context,
    root_symbols: &HashMap<String, Type>,
    source_name: &str,
    source_text: &str,
    conditions: &[Condition],
    path_solver_timeout_ms: u32,
    warnings: &mut Vec<Diagnostic>,
) -> Result<Option<PathNote>, AnalysisError> {
    let mut declared: HashMap<String, ZValue> = HashMap::new();
    for (name, ty) in root_symbols {
        let value = match ty {
            Type::Int => ZValue::Int(Int::new_const(z3ctx, name.as_str())),
            Type::Bool => ZValue::Bool(Bool::new_const(z3ctx, name.as_str())),
        };
        declared.insert(name.clone(), value);
    }

    let solver = Solver::new(z3ctx);
    let mut params = Params::new(z3ctx);
    params.set_u32("timeout", path_solver_timeout_ms);
    solver.set_params(&params);

    let mut line_range = None;
    for cond in conditions {
        if cond.kind != ConditionKind::Branch {
            // Assign conditions are already fully baked into every later
            // Branch expression by the Statement Processor's substitution
            // (§4.E); they carry no separate SMT assertion.
            continue;
        }
        let bool_expr = lower_bool(
            &cond.expression,
            z3ctx,
            &declared,
            source_name,
            source_text,
            warnings,
        )?;
        solver.assert(&bool_expr);
        line_range = cond.line_range;
    }

    // Only unsat (dead code) and unknown (inconclusive) paths are reported;
    // a satisfiable path is the silent, expected case (spec.md §4.G, §8 S1).
    let note = match solver.check() {
        SatResult::Sat => None,
        SatResult::Unsat => {
            let (start_line, end_line) = line_range.unwrap_or((0, 0));
            Some(PathNote {
                start_line,
                end_line,
                reachable: false,
                explanation: None,
            })
        }
        SatResult::Unknown => {
            let (start_line, end_line) = line_range.unwrap_or((0, 0));
            Some(PathNote {
                start_line,
                end_line,
                reachable: true,
                explanation: Some("solver returned unknown".to_string()),
            })
        }
    };

    Ok(note)
}

fn lower_bool<'z>(
    expr: &Expr,
    z3ctx: &'z Z3Context,
    declared: &HashMap<String, ZValue<'z>>,
    source_name: &str,
    source_text: &str,
    warnings: &mut Vec<Diagnostic>,
) -> Result<Bool<'z>, AnalysisError> {
    match lower_expr(expr, z3ctx, declared, source_name, source_text, warnings)? {
        ZValue::Bool(b) => Ok(b),
        ZValue::Int(_) => {
            warnings.push(Diagnostic::warning(
                format!("expression '{expr}' does not evaluate to a boolean; treated as true"),
                expr.span(),
            ));
            Ok(Bool::from_bool(z3ctx, true))
        }
    }
}

fn lower_expr<'z>(
    expr: &Expr,
    z3ctx: &'z Z3Context,
    declared: &HashMap<String, ZValue<'z>>,
    source_name: &str,
    source_text: &str,
    warnings: &mut Vec<Diagnostic>,
) -> Result<ZValue<'z>, AnalysisError> {
    match expr {
        Expr::IntLiteral(n, _) => Ok(ZValue::Int(Int::from_i64(z3ctx, *n))),
        Expr::BoolLiteral(b, _) => Ok(ZValue::Bool(Bool::from_bool(z3ctx, *b))),
        Expr::Identifier(name, span) => declared.get(name).map(clone_value).ok_or_else(|| {
            AnalysisError::UnknownSymbol {
                symbol: name.clone(),
                src: named_source(source_name, source_text),
                span: to_source_span(*span),
            }
        }),
        Expr::Not { operand, .. } => {
            let inner = lower_bool(operand, z3ctx, declared, source_name, source_text, warnings)?;
            Ok(ZValue::Bool(inner.not()))
        }
        Expr::NonNullUnwrap { operand, .. } => {
            lower_expr(operand, z3ctx, declared, source_name, source_text, warnings)
        }
        Expr::Binary {
            op, lhs, rhs, span, ..
        } => lower_binary(
            *op,
            lhs,
            rhs,
            *span,
            z3ctx,
            declared,
            source_name,
            source_text,
            warnings,
        ),
        // Ternary expressions are parsed but never evaluated (spec.md §9
        // Open Question decision); fall back to the "top" sentinel like any
        // other unsupported construct.
        Expr::Ternary { .. } | Expr::Unrecognized(..) => {
            warnings.push(Diagnostic::warning(
                format!("unsupported expression '{expr}'; treated as an unconstrained true"),
                expr.span(),
            ));
            Ok(ZValue::Bool(Bool::from_bool(z3ctx, true)))
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn lower_binary<'z>(
    op: BinOp,
    lhs: &Expr,
    rhs: &Expr,
    span: crate::ast::Span,
    z3ctx: &'z Z3Context,
    declared: &HashMap<String, ZValue<'z>>,
    source_name: &str,
    source_text: &str,
    warnings: &mut Vec<Diagnostic>,
) -> Result<ZValue<'z>, AnalysisError> {
    if matches!(op, BinOp::And | BinOp::Or) {
        let l = lower_bool(lhs, z3ctx, declared, source_name, source_text, warnings)?;
        let r = lower_bool(rhs, z3ctx, declared, source_name, source_text, warnings)?;
        let result = match op {
            BinOp::And => Bool::and(z3ctx, &[&l, &r]),
            BinOp::Or => Bool::or(z3ctx, &[&l, &r]),
            _ => unreachable!(),
        };
        return Ok(ZValue::Bool(result));
    }

    let l = lower_expr(lhs, z3ctx, declared, source_name, source_text, warnings)?;
    let r = lower_expr(rhs, z3ctx, declared, source_name, source_text, warnings)?;

    match (op, l, r) {
        (BinOp::Eq, ZValue::Int(a), ZValue::Int(b)) => Ok(ZValue::Bool(a._eq(&b))),
        (BinOp::Eq, ZValue::Bool(a), ZValue::Bool(b)) => Ok(ZValue::Bool(a._eq(&b))),
        (BinOp::Ne, ZValue::Int(a), ZValue::Int(b)) => Ok(ZValue::Bool(a._eq(&b).not())),
        (BinOp::Ne, ZValue::Bool(a), ZValue::Bool(b)) => Ok(ZValue::Bool(a._eq(&b).not())),
        (BinOp::Lt, ZValue::Int(a), ZValue::Int(b)) => Ok(ZValue::Bool(a.lt(&b))),
        (BinOp::Le, ZValue::Int(a), ZValue::Int(b)) => Ok(ZValue::Bool(a.le(&b))),
        (BinOp::Gt, ZValue::Int(a), ZValue::Int(b)) => Ok(ZValue::Bool(a.gt(&b))),
        (BinOp::Ge, ZValue::Int(a), ZValue::Int(b)) => Ok(ZValue::Bool(a.ge(&b))),
        _ => {
            warnings.push(Diagnostic::warning(
                format!("operator '{op}' cannot be applied to its operand types; treated as true"),
                span,
            ));
            Ok(ZValue::Bool(Bool::from_bool(z3ctx, true)))
        }
    }
}

fn clone_value<'z>(v: &ZValue<'z>) -> ZValue<'z> {
    match v {
        ZValue::Int(i) => ZValue::Int(i.clone()),
        ZValue::Bool(b) => ZValue::Bool(b.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::process_path;
    use crate::context::build_context_tree;
    use crate::pathenum::enumerate_paths;
    use crate::validator::validate;

    /// spec.md §8 S2-shaped fixture, spread across multiple lines so the
    /// outer and inner `if`s have distinct, non-overlapping line ranges.
    /// The unsat outer-true/inner-true path must attribute to the inner
    /// `if` (lines 3-5), not the outer one (lines 2-6) — a regression that
    /// kept the first Branch condition's range instead of the last would
    /// pass every single-line nested-if test elsewhere in this crate but
    /// fail this one.
    #[test]
    fn attributes_unreachable_path_to_innermost_conditional_line_range() {
        let source = "function f(a: number) {\n\
                       if (a > 0) {\n\
                       if (a < 0) {\n\
                       return 1;\n\
                       }\n\
                       }\n\
                       }";
        let (program, mut warnings) = validate(source).unwrap();
        let root = build_context_tree(&program, &mut warnings).unwrap();
        let paths = enumerate_paths(&root);
        // True-branch-first traversal (spec.md §4.D): the first path is
        // outer-true/inner-true, the unsatisfiable one.
        let conditions = process_path(&paths[0]);

        let config = z3::Config::new();
        let z3ctx = z3::Context::new(&config);
        let mut root_symbols = HashMap::new();
        root_symbols.insert("a".to_string(), Type::Int);

        let note = evaluate_path(
            &z3ctx,
            &root_symbols,
            "test.src",
            source,
            &conditions,
            2_000,
            &mut warnings,
        )
        .unwrap()
        .expect("outer-true/inner-true should be unsat");

        assert!(!note.reachable);
        assert_eq!((note.start_line, note.end_line), (3, 5));
    }
}
