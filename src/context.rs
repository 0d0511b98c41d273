//! Context Tree Builder (spec.md §4.C).
//!
//! A depth-first visitor over the parsed [`crate::ast::Program`] that emits
//! a tree of [`Context`] nodes. Grounded in the teacher's recursive-descent
//! AST-walking style (`eval.rs`, `validate.rs`: a function threading an
//! explicit context/environment parameter through recursive calls), but the
//! node shape itself has no teacher analogue — it is built directly from
//! spec.md §3/§4.C.
//!
//! Per the Design Notes in spec.md §9, the "transient polarity flag"
//! anti-pattern is not reproduced: [`Context::Conditional`] holds separate
//! `then_children`/`else_children` lists, and polarity is never stored as
//! mutable state on a node.

use std::collections::HashMap;

use crate::ast::{Expr, Function, Program, Stmt, Type};
use crate::diagnostics::{AnalysisError, Diagnostic};

/// A single node of the Context tree. The root exclusively owns its
/// subtree (`Vec<Context>` children, no `Rc`/`Weak`); path extraction
/// (§4.D) carries an explicit accumulator instead of following parent
/// back-links, so no parent field exists on this type at all.
#[derive(Debug, Clone)]
pub enum Context {
    Root {
        symbols: HashMap<String, Type>,
        children: Vec<Context>,
    },
    Conditional {
        predicate: Expr,
        line_range: (usize, usize),
        then_children: Vec<Context>,
        else_children: Vec<Context>,
    },
    Assignment {
        variable: String,
        expression: Expr,
        children: Vec<Context>,
    },
}

impl Context {
    pub fn children(&self) -> &[Context] {
        match self {
            Context::Root { children, .. } => children,
            Context::Assignment { children, .. } => children,
            Context::Conditional { .. } => &[],
        }
    }
}

/// Builds the Context tree for `program`. Non-fatal observations (e.g. an
/// unrecognized statement kind) are appended to `warnings` and do not abort
/// construction, per spec.md §4.C / §7 propagation policy.
pub fn build_context_tree(
    program: &Program,
    warnings: &mut Vec<Diagnostic>,
) -> Result<Context, AnalysisError> {
    let mut symbols = HashMap::new();
    for decl in &program.top_level {
        let ty = resolve_top_level_type(decl, warnings)?;
        symbols.insert(decl.name.clone(), ty);
    }
    register_params(&program.function, &mut symbols)?;

    let children = build_top_level_chain(&program.top_level, &program.function, &mut symbols, warnings);

    Ok(Context::Root { symbols, children })
}

/// Synthesizes a leading `Context::Assignment` chain from the program's
/// top-level declarations, each wrapping the next, with the function body
/// nested as the innermost chain's children (spec.md §4.C: a
/// VariableDeclaration with an initializer appends an Assignment child
/// `{varName, expression: initializer}` — top-level declarations get the
/// same treatment as in-body `let`/`const`, so their initializer value
/// flows through the Statement Processor's substitution instead of being
/// erased after type inference).
fn build_top_level_chain(
    decls: &[crate::ast::TopLevelDecl],
    function: &Function,
    symbols: &mut HashMap<String, Type>,
    warnings: &mut Vec<Diagnostic>,
) -> Vec<Context> {
    let Some((first, rest)) = decls.split_first() else {
        return build_stmt_chain(&function.body, symbols, warnings);
    };

    vec![Context::Assignment {
        variable: first.name.clone(),
        expression: first.init.clone(),
        children: build_top_level_chain(rest, function, symbols, warnings),
    }]
}

fn register_params(
    function: &Function,
    symbols: &mut HashMap<String, Type>,
) -> Result<(), AnalysisError> {
    for param in &function.params {
        let ty = Type::from_source_name(&param.ty_name).ok_or_else(|| {
            AnalysisError::UnsupportedType {
                ty: param.ty_name.clone(),
                src: crate::diagnostics::named_source("<source>", ""),
                span: crate::diagnostics::to_source_span(param.span),
            }
        })?;
        symbols.insert(param.name.clone(), ty);
    }
    Ok(())
}

fn resolve_top_level_type(
    decl: &crate::ast::TopLevelDecl,
    warnings: &mut Vec<Diagnostic>,
) -> Result<Type, AnalysisError> {
    if let Some(ty_name) = &decl.ty_name {
        return Type::from_source_name(ty_name).ok_or_else(|| AnalysisError::UnsupportedType {
            ty: ty_name.clone(),
            src: crate::diagnostics::named_source("<source>", ""),
            span: crate::diagnostics::to_source_span(decl.span),
        });
    }
    // No declared type: infer from the initializer literal. Anything else
    // is permissively treated as Int with a warning, matching spec.md's
    // general "unknown constructs do not cause spurious failures" stance.
    match &decl.init {
        Expr::BoolLiteral(..) => Ok(Type::Bool),
        Expr::IntLiteral(..) => Ok(Type::Int),
        other => {
            warnings.push(Diagnostic::warning(
                format!("cannot infer a type for '{}'; assuming number", decl.name),
                other.span(),
            ));
            Ok(Type::Int)
        }
    }
}

/// Builds the chain of Context nodes for a sequence of statements. Each
/// Assignment/Conditional statement becomes a Context node whose children
/// are the Contexts built from the remaining statements — this is how a
/// straight-line sequence becomes nested Context ownership (spec.md §3,
/// §4.C).
fn build_stmt_chain(
    stmts: &[Stmt],
    symbols: &mut HashMap<String, Type>,
    warnings: &mut Vec<Diagnostic>,
) -> Vec<Context> {
    let Some((first, rest)) = stmts.split_first() else {
        return vec![];
    };

    match first {
        Stmt::VarDecl {
            name, ty_name, init, ..
        } => {
            if let Some(ty_name) = ty_name {
                if let Some(ty) = Type::from_source_name(ty_name) {
                    symbols.insert(name.clone(), ty);
                } else {
                    warnings.push(Diagnostic::warning(
                        format!("unsupported declared type '{ty_name}' for '{name}'"),
                        init.span(),
                    ));
                }
            } else {
                symbols.entry(name.clone()).or_insert(match init {
                    Expr::BoolLiteral(..) => Type::Bool,
                    _ => Type::Int,
                });
            }
            vec![Context::Assignment {
                variable: name.clone(),
                expression: init.clone(),
                children: build_stmt_chain(rest, symbols, warnings),
            }]
        }
        Stmt::Assign { name, value, .. } => vec![Context::Assignment {
            variable: name.clone(),
            expression: value.clone(),
            children: build_stmt_chain(rest, symbols, warnings),
        }],
        Stmt::If {
            condition,
            then_branch,
            else_branch,
            line_range,
            ..
        } => {
            let then_stmts: Vec<Stmt> = then_branch
                .iter()
                .cloned()
                .chain(rest.iter().cloned())
                .collect();
            let else_stmts: Vec<Stmt> = else_branch
                .clone()
                .unwrap_or_default()
                .into_iter()
                .chain(rest.iter().cloned())
                .collect();

            // Both branches share the same enclosing symbol table; clone it
            // so divergent local declarations in one branch don't leak into
            // the other's continuation.
            let mut then_symbols = symbols.clone();
            let mut else_symbols = symbols.clone();
            let then_children = build_stmt_chain(&then_stmts, &mut then_symbols, warnings);
            let else_children = build_stmt_chain(&else_stmts, &mut else_symbols, warnings);
            symbols.extend(then_symbols);

            vec![Context::Conditional {
                predicate: condition.clone(),
                line_range: *line_range,
                then_children,
                else_children,
            }]
        }
        // `return` terminates the path; no Context node is modeled for it
        // and no continuation is built (spec.md §3 data model: only
        // Root/Conditional/Assignment Context variants exist).
        Stmt::Return { .. } => vec![],
        Stmt::Unrecognized(span) => {
            warnings.push(Diagnostic::warning(
                "unrecognized statement kind; skipped".to_string(),
                *span,
            ));
            build_stmt_chain(rest, symbols, warnings)
        }
    }
}

/// Returns the line range spec.md §3 carries on every Context for source
/// attribution — only Conditional contexts carry one.
pub fn line_range(ctx: &Context) -> Option<(usize, usize)> {
    match ctx {
        Context::Conditional { line_range, .. } => Some(*line_range),
        _ => None,
    }
}

