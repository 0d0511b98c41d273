//! AST Adapter (spec.md §4.B).
//!
//! Converts source text into the tagged [`crate::ast::Program`] using a
//! `pest`-generated grammar (`grammar/grammar.pest`), the same
//! parsing-library choice the teacher makes. `build_*` functions dispatch
//! on `Pair::as_rule()` the way the teacher's `build_node` dispatches on
//! pest rules — this is the "dispatch table over node kinds" design note
//! from spec.md §9, applied at the grammar-rule level rather than over the
//! TypeScript compiler's `SyntaxKind` enum the original tool walked. Each
//! recognized rule maps to exactly one AST node; an unreachable/unhandled
//! rule falls into a catch-all that returns a non-fatal warning, matching
//! the "unknown kind produces a non-fatal warning and is skipped" policy.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::ast::{BinOp, Expr, Function, Param, Program, Span, Stmt, TopLevelDecl};

#[derive(Parser)]
#[grammar = "grammar/grammar.pest"]
struct SourceParser;

/// A non-fatal parse-stage observation: an unrecognized construct that was
/// skipped rather than rejected (spec.md §4.B).
#[derive(Debug, Clone)]
pub struct ParseWarning {
    pub message: String,
    pub span: Span,
}

/// Parses `source_text` into a [`Program`], or a human-readable syntax
/// error message on failure. Syntax errors are folded into the Source
/// Validator's diagnostic list (§4.A) rather than raised directly, since
/// the Validator owns the `PrecheckFailed` envelope.
pub fn parse(source_text: &str) -> Result<(Program, Vec<ParseWarning>), String> {
    let mut pairs =
        SourceParser::parse(Rule::program, source_text).map_err(|e| format!("syntax error: {e}"))?;
    let program_pair = pairs.next().expect("grammar guarantees a program node");

    let mut top_level = Vec::new();
    let mut function: Option<Function> = None;
    let mut warnings = Vec::new();

    for item in program_pair.into_inner() {
        match item.as_rule() {
            Rule::item => {
                let inner = item.into_inner().next().expect("item has one child");
                match inner.as_rule() {
                    Rule::const_decl => top_level.push(build_top_level_decl(inner, &mut warnings)),
                    Rule::function_decl => {
                        if function.is_some() {
                            warnings.push(ParseWarning {
                                message: "multiple function declarations; only the first is analyzed"
                                    .to_string(),
                                span: span_of(&inner),
                            });
                        } else {
                            function = Some(build_function(inner, &mut warnings));
                        }
                    }
                    Rule::call_site => {
                        // Out of scope for analysis (spec.md §3); observed only.
                    }
                    other => warn_unrecognized(other, span_of(&inner), &mut warnings),
                }
            }
            Rule::EOI => {}
            other => warn_unrecognized(other, Span::default(), &mut warnings),
        }
    }

    let function = function.ok_or_else(|| "no function declaration found".to_string())?;
    Ok((Program { top_level, function }, warnings))
}

fn warn_unrecognized(rule: Rule, span: Span, warnings: &mut Vec<ParseWarning>) {
    warnings.push(ParseWarning {
        message: format!("unrecognized node kind '{rule:?}'; skipped"),
        span,
    });
}

fn span_of(pair: &Pair<Rule>) -> Span {
    let s = pair.as_span();
    Span::new(s.start(), s.end())
}

fn build_top_level_decl(pair: Pair<Rule>, warnings: &mut Vec<ParseWarning>) -> TopLevelDecl {
    let span = span_of(&pair);
    let mut inner = pair.into_inner();
    let name = inner.next().expect("const_decl has a name").as_str().to_string();
    let mut next = inner.next().expect("const_decl has a type or initializer");
    let ty_name = if next.as_rule() == Rule::type_name {
        let ty = next.as_str().to_string();
        next = inner.next().expect("const_decl has an initializer");
        Some(ty)
    } else {
        None
    };
    let init = build_expr(next, warnings);
    TopLevelDecl {
        name,
        ty_name,
        init,
        span,
    }
}

fn build_function(pair: Pair<Rule>, warnings: &mut Vec<ParseWarning>) -> Function {
    let span = span_of(&pair);
    let mut inner = pair.into_inner();
    let name = inner.next().expect("function_decl has a name").as_str().to_string();

    let mut params = Vec::new();
    let mut next = inner.next();
    if let Some(p) = &next {
        if p.as_rule() == Rule::param_list {
            for param_pair in p.clone().into_inner() {
                params.push(build_param(param_pair));
            }
            next = inner.next();
        }
    }

    let block_pair = next.expect("function_decl has a block");
    let body = build_block(block_pair, warnings);

    Function {
        name,
        params,
        body,
        span,
    }
}

fn build_param(pair: Pair<Rule>) -> Param {
    let span = span_of(&pair);
    let mut inner = pair.into_inner();
    let name = inner.next().expect("param has a name").as_str().to_string();
    let ty_name = inner.next().expect("param has a type").as_str().to_string();
    Param { name, ty_name, span }
}

fn build_block(pair: Pair<Rule>, warnings: &mut Vec<ParseWarning>) -> Vec<Stmt> {
    pair.into_inner().map(|s| build_stmt(s, warnings)).collect()
}

fn build_stmt(pair: Pair<Rule>, warnings: &mut Vec<ParseWarning>) -> Stmt {
    let span = span_of(&pair);
    let inner = pair.into_inner().next().expect("stmt has one child");
    match inner.as_rule() {
        Rule::var_decl => build_var_decl(inner, warnings),
        Rule::assign_stmt => build_assign(inner, warnings),
        Rule::if_stmt => build_if(inner, warnings),
        Rule::return_stmt => build_return(inner, warnings),
        other => {
            warn_unrecognized(other, span, warnings);
            Stmt::Unrecognized(span)
        }
    }
}

fn build_var_decl(pair: Pair<Rule>, warnings: &mut Vec<ParseWarning>) -> Stmt {
    let span = span_of(&pair);
    let mut inner = pair.into_inner();
    let name = inner.next().expect("var_decl has a name").as_str().to_string();
    let mut next = inner.next().expect("var_decl has a type or initializer");
    let ty_name = if next.as_rule() == Rule::type_name {
        let ty = next.as_str().to_string();
        next = inner.next().expect("var_decl has an initializer");
        Some(ty)
    } else {
        None
    };
    let init = build_expr(next, warnings);
    Stmt::VarDecl {
        name,
        ty_name,
        init,
        span,
    }
}

fn build_assign(pair: Pair<Rule>, warnings: &mut Vec<ParseWarning>) -> Stmt {
    let span = span_of(&pair);
    let mut inner = pair.into_inner();
    let name = inner.next().expect("assign_stmt has a name").as_str().to_string();
    let value = build_expr(inner.next().expect("assign_stmt has a value"), warnings);
    Stmt::Assign { name, value, span }
}

fn build_if(pair: Pair<Rule>, warnings: &mut Vec<ParseWarning>) -> Stmt {
    let span = span_of(&pair);
    let line_range = line_range_of(&pair);
    let mut inner = pair.into_inner();
    let condition = build_expr(inner.next().expect("if_stmt has a condition"), warnings);
    let then_branch = build_block(inner.next().expect("if_stmt has a then block"), warnings);
    let else_branch = inner.next().map(|tail| match tail.as_rule() {
        Rule::if_stmt => vec![build_if(tail, warnings)],
        Rule::block => build_block(tail, warnings),
        other => {
            warn_unrecognized(other, span, warnings);
            vec![]
        }
    });
    Stmt::If {
        condition,
        then_branch,
        else_branch,
        line_range,
        span,
    }
}

fn build_return(pair: Pair<Rule>, warnings: &mut Vec<ParseWarning>) -> Stmt {
    let span = span_of(&pair);
    let value = pair
        .into_inner()
        .next()
        .map(|e| build_expr(e, warnings));
    Stmt::Return { value, span }
}

fn build_expr(pair: Pair<Rule>, warnings: &mut Vec<ParseWarning>) -> Expr {
    match pair.as_rule() {
        Rule::expr => build_expr(pair.into_inner().next().expect("expr wraps or_expr"), warnings),
        Rule::or_expr => build_left_assoc_binary(pair, warnings),
        Rule::and_expr => build_left_assoc_binary(pair, warnings),
        Rule::not_expr => build_not(pair, warnings),
        Rule::cmp_expr => build_cmp(pair, warnings),
        Rule::ternary_expr => build_ternary(pair, warnings),
        Rule::unwrap_expr => build_unwrap(pair, warnings),
        Rule::atom => build_atom(pair, warnings),
        other => {
            let span = span_of(&pair);
            warn_unrecognized(other, span, warnings);
            Expr::Unrecognized(pair.as_str().to_string(), span)
        }
    }
}

/// Handles `or_expr`/`and_expr`, which are grammar-level left-recursion
/// flattened by pest into `operand (op operand)*`.
fn build_left_assoc_binary(pair: Pair<Rule>, warnings: &mut Vec<ParseWarning>) -> Expr {
    let span = span_of(&pair);
    let mut items = pair.into_inner();
    let mut lhs = build_expr(items.next().expect("binary expr has a first operand"), warnings);
    while let Some(op_pair) = items.next() {
        let op = BinOp::from_token(op_pair.as_str()).expect("grammar only emits known operators");
        let rhs = build_expr(items.next().expect("binary expr has a matching operand"), warnings);
        lhs = Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span,
        };
    }
    lhs
}

fn build_not(pair: Pair<Rule>, warnings: &mut Vec<ParseWarning>) -> Expr {
    let span = span_of(&pair);
    let mut items = pair.into_inner();
    let first = items.next().expect("not_expr has a child");
    if first.as_rule() == Rule::not_op {
        let operand = build_expr(items.next().expect("not_expr has an operand"), warnings);
        Expr::Not {
            operand: Box::new(operand),
            span,
        }
    } else {
        build_expr(first, warnings)
    }
}

fn build_cmp(pair: Pair<Rule>, warnings: &mut Vec<ParseWarning>) -> Expr {
    let span = span_of(&pair);
    let mut items = pair.into_inner();
    let lhs = build_expr(items.next().expect("cmp_expr has a left operand"), warnings);
    match items.next() {
        None => lhs,
        Some(op_pair) => {
            let op = BinOp::from_token(op_pair.as_str()).expect("grammar only emits known operators");
            let rhs = build_expr(items.next().expect("cmp_expr has a right operand"), warnings);
            Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            }
        }
    }
}

fn build_ternary(pair: Pair<Rule>, warnings: &mut Vec<ParseWarning>) -> Expr {
    let span = span_of(&pair);
    let mut items = pair.into_inner();
    let condition = build_expr(items.next().expect("ternary_expr has a condition"), warnings);
    match items.next() {
        None => condition,
        Some(_q) => {
            let then_branch = build_expr(items.next().expect("ternary_expr has a then branch"), warnings);
            let _c = items.next();
            let else_branch = build_expr(items.next().expect("ternary_expr has an else branch"), warnings);
            Expr::Ternary {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
                span,
            }
        }
    }
}

fn build_unwrap(pair: Pair<Rule>, warnings: &mut Vec<ParseWarning>) -> Expr {
    let span = span_of(&pair);
    let mut items = pair.into_inner();
    let operand = build_expr(items.next().expect("unwrap_expr has an operand"), warnings);
    if items.next().is_some() {
        Expr::NonNullUnwrap {
            operand: Box::new(operand),
            span,
        }
    } else {
        operand
    }
}

fn build_atom(pair: Pair<Rule>, warnings: &mut Vec<ParseWarning>) -> Expr {
    let span = span_of(&pair);
    let inner = pair.into_inner().next().expect("atom has one child");
    match inner.as_rule() {
        Rule::number => Expr::IntLiteral(
            inner.as_str().parse().expect("grammar only emits valid integers"),
            span,
        ),
        Rule::boolean => Expr::BoolLiteral(inner.as_str() == "true", span),
        Rule::identifier => Expr::Identifier(inner.as_str().to_string(), span),
        Rule::expr => build_expr(inner, warnings),
        other => {
            warn_unrecognized(other, span, warnings);
            Expr::Unrecognized(inner.as_str().to_string(), span)
        }
    }
}

/// Derives the 1-indexed inclusive source line range of a parsed node, used
/// for PathNote attribution (spec.md §3, §4.G).
fn line_range_of(pair: &Pair<Rule>) -> (usize, usize) {
    let span = pair.as_span();
    let (start_line, _) = span.start_pos().line_col();
    let (end_line, _) = span.end_pos().line_col();
    (start_line, end_line)
}
