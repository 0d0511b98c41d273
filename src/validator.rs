//! Source Validator (spec.md §4.A).
//!
//! The pipeline's entry point: parses source text (§4.B) and performs the
//! structural checks that must hold before a Context tree can be built —
//! every declared type is one of `{number, boolean}`, no two
//! parameters/top-level constants share a name, every assignment target was
//! previously declared, and every `return` value is an integer literal or
//! an identifier. Failing any of these produces `PrecheckFailed` with the
//! full list of reasons rather than stopping at the first one, the same
//! "collect, don't short-circuit" posture the teacher's validation pass
//! takes over a list of AST nodes.

use std::collections::HashSet;

use crate::ast::{Expr, Program, Stmt, Type};
use crate::diagnostics::{AnalysisError, Diagnostic, Severity};
use crate::parser;

/// Parses and validates `source_text`. On success returns the [`Program`]
/// plus any non-fatal [`Diagnostic`]s gathered along the way (unrecognized
/// constructs observed by the parser). On failure returns
/// `AnalysisError::PrecheckFailed` carrying every violation found.
pub fn validate(source_text: &str) -> Result<(Program, Vec<Diagnostic>), AnalysisError> {
    let (program, parse_warnings) = parser::parse(source_text).map_err(|message| {
        AnalysisError::PrecheckFailed {
            diagnostics: vec![message],
        }
    })?;

    let mut failures = Vec::new();
    let mut seen_names: HashSet<&str> = HashSet::new();

    for param in &program.function.params {
        if !seen_names.insert(param.name.as_str()) {
            failures.push(format!("duplicate parameter name '{}'", param.name));
        }
        if Type::from_source_name(&param.ty_name).is_none() {
            failures.push(format!(
                "parameter '{}' has unsupported declared type '{}'",
                param.name, param.ty_name
            ));
        }
    }

    for decl in &program.top_level {
        if !seen_names.insert(decl.name.as_str()) {
            failures.push(format!(
                "'{}' is declared more than once at top level or collides with a parameter",
                decl.name
            ));
        }
        if let Some(ty_name) = &decl.ty_name {
            if Type::from_source_name(ty_name).is_none() {
                failures.push(format!(
                    "'{}' has unsupported declared type '{}'",
                    decl.name, ty_name
                ));
            }
        }
    }

    let mut declared: HashSet<String> = program
        .function
        .params
        .iter()
        .map(|p| p.name.clone())
        .collect();
    declared.extend(program.top_level.iter().map(|d| d.name.clone()));
    check_body(&program.function.body, &mut declared, &mut failures);

    if !failures.is_empty() {
        return Err(AnalysisError::PrecheckFailed {
            diagnostics: failures,
        });
    }

    let warnings = parse_warnings
        .into_iter()
        .map(|w| Diagnostic {
            severity: Severity::Warning,
            message: w.message,
            span: w.span,
        })
        .collect();

    Ok((program, warnings))
}

/// Recursively checks a statement sequence for two scope-sensitive rules
/// (spec.md §4.A): every `name = value;` assignment target must already be
/// declared, and every `return`'s value must be an integer literal or an
/// identifier. `declared` tracks parameters, top-level constants, and every
/// `let`/`const` seen so far in the enclosing scopes; each `if` branch gets
/// its own clone so a declaration made in one branch does not leak into its
/// sibling.
fn check_body(stmts: &[Stmt], declared: &mut HashSet<String>, failures: &mut Vec<String>) {
    for stmt in stmts {
        match stmt {
            Stmt::VarDecl { name, .. } => {
                declared.insert(name.clone());
            }
            Stmt::Assign { name, .. } => {
                if !declared.contains(name) {
                    failures.push(format!("assignment to undeclared variable '{name}'"));
                }
            }
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                let mut then_scope = declared.clone();
                check_body(then_branch, &mut then_scope, failures);
                if let Some(else_branch) = else_branch {
                    let mut else_scope = declared.clone();
                    check_body(else_branch, &mut else_scope, failures);
                }
            }
            Stmt::Return { value: Some(expr), .. } => {
                if !matches!(expr, Expr::IntLiteral(..) | Expr::Identifier(..)) {
                    failures.push(
                        "return value must be an integer literal or an identifier".to_string(),
                    );
                }
            }
            Stmt::Return { value: None, .. } | Stmt::Unrecognized(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsupported_parameter_type() {
        let source = "function f(a: string) { return; }";
        let err = validate(source).unwrap_err();
        match err {
            AnalysisError::PrecheckFailed { diagnostics } => {
                assert!(diagnostics
                    .iter()
                    .any(|d| d.contains("unsupported declared type")));
            }
            other => panic!("expected PrecheckFailed, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_parameter_names() {
        let source = "function f(a: number, a: number) { return; }";
        let err = validate(source).unwrap_err();
        match err {
            AnalysisError::PrecheckFailed { diagnostics } => {
                assert!(diagnostics.iter().any(|d| d.contains("duplicate parameter")));
            }
            other => panic!("expected PrecheckFailed, got {other:?}"),
        }
    }

    #[test]
    fn accepts_well_formed_program() {
        let source =
            "function f(a: number, b: number) { if (a > b) { return a; } else { return b; } }";
        let (program, _warnings) = validate(source).expect("should validate");
        assert_eq!(program.function.params.len(), 2);
    }

    #[test]
    fn rejects_assignment_to_undeclared_variable() {
        let source = "function f(a: number) { x = a; return x; }";
        let err = validate(source).unwrap_err();
        match err {
            AnalysisError::PrecheckFailed { diagnostics } => {
                assert!(diagnostics
                    .iter()
                    .any(|d| d.contains("assignment to undeclared variable")));
            }
            other => panic!("expected PrecheckFailed, got {other:?}"),
        }
    }

    #[test]
    fn accepts_assignment_to_previously_declared_variable() {
        let source = "function f(a: number) { let x: number = 0; x = a; return x; }";
        validate(source).expect("should validate");
    }

    #[test]
    fn rejects_return_of_non_integer_non_identifier_expression() {
        let source = "function f(a: number, b: number) { return a + b; }";
        let err = validate(source).unwrap_err();
        match err {
            AnalysisError::PrecheckFailed { diagnostics } => {
                assert!(diagnostics
                    .iter()
                    .any(|d| d.contains("return value must be")));
            }
            other => panic!("expected PrecheckFailed, got {other:?}"),
        }
    }
}
