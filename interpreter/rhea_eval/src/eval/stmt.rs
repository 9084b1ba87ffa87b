//! Statement node semantics.

use std::sync::Arc;
use std::time::Instant;

use rhea_ir::{Expr, Token};

use super::visit_expr;
use crate::render::render;
use crate::signal::{EvalResult, Unwind};
use crate::symbol_table::SymbolTable;
use crate::value::Value;

pub(super) fn break_signal(address: &Token) -> EvalResult {
    Err(Unwind::Break {
        origin: address.clone(),
    })
}

pub(super) fn continue_signal(address: &Token) -> EvalResult {
    Err(Unwind::Continue {
        origin: address.clone(),
    })
}

pub(super) fn return_signal(expression: &Arc<Expr>, scope: &SymbolTable) -> EvalResult {
    let value = visit_expr(expression, scope)?;
    Err(Unwind::Return { value })
}

pub(super) fn throw_signal(
    address: &Token,
    expression: &Arc<Expr>,
    scope: &SymbolTable,
) -> EvalResult {
    let value = visit_expr(expression, scope)?;
    Err(Unwind::Throw {
        origin: address.clone(),
        value,
    })
}

pub(super) fn wait(scope: &SymbolTable) -> EvalResult {
    scope.wait_for_tasks();
    Ok(Value::Nil)
}

pub(super) fn halt() -> EvalResult {
    std::process::exit(0);
}

pub(super) fn delete(names: &[Token], scope: &SymbolTable) -> EvalResult {
    for name in names {
        scope.remove(name)?;
    }
    Ok(Value::Nil)
}

/// `enum` and `mod` lower the same way: each member evaluates and binds
/// under `Name.member` in the current scope.
pub(super) fn install_members(
    name: &Token,
    members: &[(Token, Arc<Expr>)],
    scope: &SymbolTable,
) -> EvalResult {
    for (member, initialiser) in members {
        let mut qualified = member.clone();
        qualified.modify(format!("{}.{}", name.image(), member.image()));

        let value = visit_expr(initialiser, scope)?;
        scope.set(qualified.image(), value);
    }
    Ok(Value::Nil)
}

pub(super) fn use_module(
    address: &Token,
    name: &Token,
    version: &Arc<Expr>,
    scope: &SymbolTable,
) -> EvalResult {
    let module_name = name.image();
    let version_value = visit_expr(version, scope)?;
    let version_text = version_value.to_display_string();

    if !rhea_runtime::SemVer::validate(&version_text) {
        return Err(Unwind::node(
            address,
            format!("Invalid semantic version '{version_text}' for library {module_name}"),
        ));
    }

    if !rhea_runtime::is_module_installed(module_name, &version_text) {
        return Err(Unwind::node(
            address,
            format!("Library not installed: {module_name}@{version_text}"),
        ));
    }

    let files = rhea_runtime::module_source_files(module_name, &version_text);
    tracing::debug!(module = module_name, version = %version_text, files = files.len(), "loading module");

    // Diagnostics inside module files are reported, not propagated; the
    // file-hash registry makes cyclic loads a no-op.
    crate::interp::interpret_files(scope, &files);
    Ok(Value::Nil)
}

pub(super) fn import(path: &Arc<Expr>, scope: &SymbolTable) -> EvalResult {
    let path_value = visit_expr(path, scope)?;
    let path_text = path_value.to_display_string();
    tracing::debug!(path = %path_text, "importing file");

    crate::interp::interpret_files(scope, &[std::path::PathBuf::from(path_text)]);
    Ok(Value::Nil)
}

/// In test mode only: run the body, time it, and report. A nil assertion
/// means the body must be truthy; otherwise the body must equal the
/// assertion value.
pub(super) fn test(
    name: &Arc<Expr>,
    assertion: &Arc<Expr>,
    body: &Arc<Expr>,
    scope: &SymbolTable,
) -> EvalResult {
    if !rhea_runtime::is_test_mode() {
        return Ok(Value::Nil);
    }

    let started = Instant::now();
    let assertion_value = visit_expr(assertion, scope)?;
    let body_value = visit_expr(body, scope)?;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    let passed = (assertion_value.is_nil() && body_value.boolean_equivalent())
        || (!assertion_value.is_nil() && assertion_value == body_value);

    if passed {
        render("[\u{1b}[1;32m SUCCESS \u{1b}[0m]");
    } else {
        render("[\u{1b}[1;31m FAILED  \u{1b}[0m]");
    }

    let name_value = visit_expr(name, scope)?;
    render(&format!(
        " {elapsed_ms:.6} ms\t\u{1b}[3;97m{}\u{1b}[0m\n",
        name_value.to_display_string()
    ));
    Ok(Value::Nil)
}
