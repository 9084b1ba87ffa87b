//! Expression node semantics.

use std::sync::Arc;

use rhea_ir::{Expr, FunctionDecl, Stmt, Token};
use smallvec::SmallVec;

use super::{visit_expr, visit_stmt};
use crate::native::resolve_native;
use crate::operators::evaluate_binary;
use crate::render as output;
use crate::signal::{EvalResult, Unwind};
use crate::symbol_table::SymbolTable;
use crate::value::{FunctionValue, Value};

pub(super) fn array_literal(elements: &[Arc<Expr>], scope: &SymbolTable) -> EvalResult {
    let mut values = Vec::with_capacity(elements.len());
    for element in elements {
        values.push(visit_expr(element, scope)?);
    }
    Ok(Value::array(values))
}

pub(super) fn array_access(
    address: &Token,
    array: &Arc<Expr>,
    index: &Arc<Expr>,
    scope: &SymbolTable,
) -> EvalResult {
    let origin = visit_expr(array, scope)?;
    let index_value = visit_expr(index, scope)?;

    let Some(index_number) = index_value.as_number() else {
        return Err(Unwind::node(
            address,
            "Accessing with non-number index is not allowed.",
        ));
    };
    if index_number < 0.0 {
        return Err(Unwind::throw_message(
            address,
            format!("Index {index_number} is out of bounds."),
        ));
    }
    let index = index_number as usize;

    match origin {
        Value::Str(text) => match text.chars().nth(index) {
            Some(ch) => Ok(Value::string(ch.to_string())),
            None => Err(Unwind::throw_message(
                address,
                format!("String index {index} is out of bounds."),
            )),
        },
        Value::Array(elements) => match elements.get(index) {
            Some(value) => Ok(value),
            None => Err(Unwind::throw_message(
                address,
                format!("Array index {index} is out of bounds."),
            )),
        },
        _ => Err(Unwind::node(
            address,
            "Accessing non-array and non-string object is invalid.",
        )),
    }
}

pub(super) fn binary(
    address: &Token,
    operator: &str,
    left: &Arc<Expr>,
    right: &Arc<Expr>,
    scope: &SymbolTable,
) -> EvalResult {
    if operator == "=" {
        return assignment(address, left, right, scope);
    }

    let left_value = visit_expr(left, scope)?;
    let right_value = visit_expr(right, scope)?;
    evaluate_binary(address, operator, left_value, right_value)
}

/// The three legal assignment shapes, matched on the LHS node.
fn assignment(
    address: &Token,
    left: &Arc<Expr>,
    right: &Arc<Expr>,
    scope: &SymbolTable,
) -> EvalResult {
    match left.as_ref() {
        Expr::VariableAccess { address: name } => {
            let value = visit_expr(right, scope)?;
            scope.set(name.image(), value.clone());
            Ok(value)
        }
        Expr::ArrayAccess { array, index, .. } => {
            let target = visit_expr(array, scope)?;
            let Value::Array(elements) = target else {
                return Err(Unwind::node(
                    address,
                    "Object is not an array, cannot update value in specified index.",
                ));
            };

            let index_value = visit_expr(index, scope)?;
            let Some(index_number) = index_value.as_number() else {
                return Err(Unwind::node(address, "Specified index is not a number."));
            };
            if index_number < 0.0 {
                return Err(Unwind::throw_message(
                    address,
                    format!("Index {index_number} is out of bounds."),
                ));
            }

            let value = visit_expr(right, scope)?;
            if !elements.set(index_number as usize, value.clone()) {
                return Err(Unwind::throw_message(
                    address,
                    format!("Array index {} is out of bounds.", index_number as usize),
                ));
            }
            Ok(value)
        }
        _ => Err(Unwind::node(address, "Invalid assignment target.")),
    }
}

pub(super) fn block(statements: &[Arc<Stmt>], scope: &SymbolTable) -> EvalResult {
    let local = SymbolTable::with_parent(scope);
    let mut value = Value::Nil;

    for statement in statements {
        value = visit_stmt(statement, &local)?;
    }
    Ok(value)
}

pub(super) fn regex_literal(address: &Token, pattern: &str) -> EvalResult {
    Value::regex_from_pattern(pattern).map_err(|message| Unwind::throw_message(address, message))
}

pub(super) fn function_decl(declaration: &Arc<FunctionDecl>, scope: &SymbolTable) -> EvalResult {
    Ok(Value::Function(FunctionValue {
        declaration: Arc::clone(declaration),
        scope: scope.clone(),
    }))
}

pub(super) fn function_call(
    address: &Token,
    callable: &Arc<Expr>,
    arguments: &[Arc<Expr>],
    scope: &SymbolTable,
) -> EvalResult {
    let target = visit_expr(callable, scope)?;

    let mut args: SmallVec<[Value; 4]> = SmallVec::with_capacity(arguments.len());
    for argument in arguments {
        args.push(visit_expr(argument, scope)?);
    }

    match target {
        Value::Function(function) => call_function(address, &function, args.into_vec()),
        Value::Native(native) => native(
            address.clone(),
            scope,
            args.into_vec(),
            rhea_runtime::is_unsafe_mode(),
        ),
        _ => Err(Unwind::node(address, "Expression is not a function.")),
    }
}

/// Bind parameters in a child of the captured scope, then run the body.
/// `ret` escapes here with the body's value.
pub(crate) fn call_function(
    address: &Token,
    function: &FunctionValue,
    args: Vec<Value>,
) -> EvalResult {
    let declaration = &function.declaration;
    if args.len() != declaration.parameters.len() {
        return Err(Unwind::node(
            address,
            format!(
                "Argument count mismatch, expecting {} but got only {}.",
                declaration.parameters.len(),
                args.len()
            ),
        ));
    }

    let local = SymbolTable::with_parent(&function.scope);
    for (parameter, value) in declaration.parameters.iter().zip(args) {
        local.set(parameter.image(), value);
    }

    match visit_expr(&declaration.body, &local) {
        Err(Unwind::Return { value }) => Ok(value),
        other => other,
    }
}

pub(super) fn if_else(
    condition: &Arc<Expr>,
    then_branch: &Arc<Expr>,
    else_branch: Option<&Arc<Expr>>,
    scope: &SymbolTable,
) -> EvalResult {
    if visit_expr(condition, scope)?.boolean_equivalent() {
        visit_expr(then_branch, scope)
    } else {
        match else_branch {
            Some(branch) => visit_expr(branch, scope),
            None => Ok(Value::Nil),
        }
    }
}

pub(super) fn unless(
    condition: &Arc<Expr>,
    then_branch: &Arc<Expr>,
    else_branch: Option<&Arc<Expr>>,
    scope: &SymbolTable,
) -> EvalResult {
    if visit_expr(condition, scope)?.boolean_equivalent() {
        match else_branch {
            Some(branch) => visit_expr(branch, scope),
            None => Ok(Value::Nil),
        }
    } else {
        visit_expr(then_branch, scope)
    }
}

pub(super) fn when(
    expression: &Arc<Expr>,
    cases: &[(Arc<Expr>, Arc<Expr>)],
    default_case: Option<&Arc<Expr>>,
    scope: &SymbolTable,
) -> EvalResult {
    let subject = visit_expr(expression, scope)?;

    for (case, body) in cases {
        if visit_expr(case, scope)? == subject {
            return visit_expr(body, scope);
        }
    }

    match default_case {
        Some(body) => visit_expr(body, scope),
        None => Ok(Value::Nil),
    }
}

/// `loop` and `while` share one body; `while` has no init/post expression.
///
/// `break` exits with nil; `continue` jumps to the post expression and the
/// next condition test. Natural exit yields the last body value.
pub(super) fn loop_for(
    initial: Option<&Arc<Expr>>,
    condition: &Arc<Expr>,
    postexpr: Option<&Arc<Expr>>,
    body: &Arc<Expr>,
    scope: &SymbolTable,
) -> EvalResult {
    if let Some(initial) = initial {
        visit_expr(initial, scope)?;
    }

    let mut value = Value::Nil;
    while visit_expr(condition, scope)?.boolean_equivalent() {
        match visit_expr(body, scope) {
            Ok(result) => value = result,
            Err(Unwind::Break { .. }) => return Ok(Value::Nil),
            Err(Unwind::Continue { .. }) => {
                if let Some(postexpr) = postexpr {
                    visit_expr(postexpr, scope)?;
                }
                continue;
            }
            Err(other) => return Err(other),
        }

        if let Some(postexpr) = postexpr {
            visit_expr(postexpr, scope)?;
        }
    }
    Ok(value)
}

pub(super) fn random(
    then_branch: &Arc<Expr>,
    else_branch: Option<&Arc<Expr>>,
    scope: &SymbolTable,
) -> EvalResult {
    if rand::random::<bool>() {
        visit_expr(then_branch, scope)
    } else {
        match else_branch {
            Some(branch) => visit_expr(branch, scope),
            None => Ok(Value::Nil),
        }
    }
}

pub(super) fn render(
    to_error: bool,
    newline: bool,
    expression: &Arc<Expr>,
    scope: &SymbolTable,
) -> EvalResult {
    let value = visit_expr(expression, scope)?;
    let mut text = value.to_display_string();
    if newline {
        text.push('\n');
    }

    if to_error {
        output::render_error(&text);
    } else {
        output::render(&text);
    }
    Ok(value)
}

pub(super) fn size(address: &Token, expression: &Arc<Expr>, scope: &SymbolTable) -> EvalResult {
    let value = visit_expr(expression, scope)?;
    let size = match &value {
        Value::Array(elements) => elements.len() as f64,
        Value::Str(text) => text.chars().count() as f64,
        Value::Regex(pattern) => pattern.pattern().chars().count() as f64,
        Value::Bool(_) | Value::Number(_) => 1.0,
        Value::Nil => 0.0,
        Value::Function(_) | Value::Native(_) => {
            return Err(Unwind::throw_message(
                address,
                "Unsupported size operation for this type.",
            ))
        }
    };
    Ok(Value::Number(size))
}

pub(super) fn variable_decl(
    declarations: &[(Token, Arc<Expr>)],
    scope: &SymbolTable,
) -> EvalResult {
    for (name, initialiser) in declarations {
        let value = visit_expr(initialiser, scope)?;
        scope.set(name.image(), value);
    }
    Ok(Value::Nil)
}

pub(super) fn native_decl(
    address: &Token,
    library: &str,
    declarations: &[(Token, String)],
    scope: &SymbolTable,
) -> EvalResult {
    for (name, symbol) in declarations {
        let function = resolve_native(address, library, symbol)?;
        scope.set(name.image(), Value::Native(function));
    }
    Ok(Value::Nil)
}

/// Spawn one task evaluating the expression against a clone of the
/// current scope. Every outcome is caught at the task boundary and
/// written to stderr; nothing unwinds into the spawning scope.
pub(super) fn parallel(expression: &Arc<Expr>, scope: &SymbolTable) -> EvalResult {
    let task_expression = Arc::clone(expression);
    let task_scope = scope.task_clone();

    let handle = std::thread::spawn(move || {
        if let Err(unwind) = visit_expr(&task_expression, &task_scope) {
            task_scope.wait_for_tasks();
            crate::interp::report_unwind(&unwind);
        }
    });

    scope.add_task(handle);
    Ok(Value::Nil)
}

pub(super) fn catch_handle(
    address: &Token,
    catch_block: &Arc<Expr>,
    handler: &Token,
    handle_block: &Arc<Expr>,
    final_block: Option<&Arc<Expr>>,
    scope: &SymbolTable,
) -> EvalResult {
    let local = SymbolTable::with_parent(scope);

    let outcome = match visit_expr(catch_block, &local) {
        Err(Unwind::Throw { value, .. }) => {
            if local.has(handler.image()) {
                return Err(Unwind::node(
                    address,
                    "Handle name for catch-handle is already in-use.",
                ));
            }
            local.set(handler.image(), value);
            visit_expr(handle_block, &local)
        }
        other => other,
    };

    // The cleanup block runs on every exit path.
    if let Some(final_block) = final_block {
        visit_expr(final_block, &local)?;
    }
    outcome
}

/// Advisory-lock the binding for the duration of the body; unlocked on
/// every exit path.
pub(super) fn lock(name: &Token, body: &Arc<Expr>, scope: &SymbolTable) -> EvalResult {
    scope.lock(name.image(), scope);
    let outcome = visit_expr(body, scope);
    scope.unlock(name.image(), scope);
    outcome
}

pub(super) fn single_statement(statement: &Arc<Stmt>, scope: &SymbolTable) -> EvalResult {
    let local = SymbolTable::with_parent(scope);
    match visit_stmt(statement, &local) {
        Err(Unwind::Return { value }) => Ok(value),
        other => other,
    }
}
