//! The `visit` bodies for every AST node.
//!
//! `visit_expr`/`visit_stmt` are thin dispatchers; the per-node logic
//! lives in the `expr` and `stmt` helper modules. The match stays the
//! coordination point so signal handling (which node catches which
//! unwinding) is visible in one place per node kind.

mod expr;
mod stmt;

use std::sync::Arc;

use rhea_ir::{Expr, Stmt};

use crate::signal::EvalResult;
use crate::symbol_table::SymbolTable;
use crate::value::Value;

/// Evaluate an expression node against a scope.
pub fn visit_expr(expr: &Arc<Expr>, scope: &SymbolTable) -> EvalResult {
    match expr.as_ref() {
        Expr::ArrayLiteral { elements, .. } => expr::array_literal(elements, scope),
        Expr::ArrayAccess {
            address,
            array,
            index,
        } => expr::array_access(address, array, index, scope),
        Expr::Binary {
            address,
            operator,
            left,
            right,
        } => expr::binary(address, operator, left, right, scope),
        Expr::Block { statements, .. } => expr::block(statements, scope),
        Expr::BooleanLiteral { value, .. } => Ok(Value::Bool(*value)),
        Expr::NumberLiteral { value, .. } => Ok(Value::Number(*value)),
        Expr::StringLiteral { value, .. } => Ok(Value::string(value.clone())),
        Expr::NilLiteral { .. } => Ok(Value::Nil),
        Expr::RegexLiteral { address, pattern } => expr::regex_literal(address, pattern),
        Expr::FunctionDecl(declaration) => expr::function_decl(declaration, scope),
        Expr::FunctionCall {
            address,
            callable,
            arguments,
        } => expr::function_call(address, callable, arguments, scope),
        Expr::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => expr::if_else(condition, then_branch, else_branch.as_ref(), scope),
        Expr::Unless {
            condition,
            then_branch,
            else_branch,
            ..
        } => expr::unless(condition, then_branch, else_branch.as_ref(), scope),
        Expr::When {
            expression,
            cases,
            default_case,
            ..
        } => expr::when(expression, cases, default_case.as_ref(), scope),
        Expr::Loop {
            initial,
            condition,
            postexpr,
            body,
            ..
        } => expr::loop_for(Some(initial), condition, Some(postexpr), body, scope),
        Expr::While {
            condition, body, ..
        } => expr::loop_for(None, condition, None, body, scope),
        Expr::Random {
            then_branch,
            else_branch,
            ..
        } => expr::random(then_branch, else_branch.as_ref(), scope),
        Expr::Render {
            to_error,
            newline,
            expression,
            ..
        } => expr::render(*to_error, *newline, expression, scope),
        Expr::Size {
            address,
            expression,
        } => expr::size(address, expression, scope),
        Expr::TypeOf { expression, .. } => {
            let value = visit_expr(expression, scope)?;
            Ok(Value::string(value.type_name()))
        }
        Expr::Unary {
            address,
            operator,
            expression,
        } => {
            let value = visit_expr(expression, scope)?;
            crate::operators::evaluate_unary(address, operator, &value)
        }
        Expr::VariableAccess { address } => scope.get(address, address.image()),
        Expr::VariableDecl { declarations, .. } => expr::variable_decl(declarations, scope),
        Expr::NativeDecl {
            address,
            library,
            declarations,
        } => expr::native_decl(address, library, declarations, scope),
        Expr::Parallel { expression, .. } => expr::parallel(expression, scope),
        Expr::CatchHandle {
            address,
            catch_block,
            handler,
            handle_block,
            final_block,
        } => expr::catch_handle(
            address,
            catch_block,
            handler,
            handle_block,
            final_block.as_ref(),
            scope,
        ),
        Expr::Lock { name, body, .. } => expr::lock(name, body, scope),
        Expr::SingleStatement { statement, .. } => expr::single_statement(statement, scope),
    }
}

/// Evaluate a statement node against a scope.
pub fn visit_stmt(stmt: &Arc<Stmt>, scope: &SymbolTable) -> EvalResult {
    match stmt.as_ref() {
        Stmt::Break { address } => stmt::break_signal(address),
        Stmt::Continue { address } => stmt::continue_signal(address),
        Stmt::Return {
            address: _,
            expression,
        } => stmt::return_signal(expression, scope),
        Stmt::Throw {
            address,
            expression,
        } => stmt::throw_signal(address, expression, scope),
        Stmt::Wait { .. } => stmt::wait(scope),
        Stmt::Halt { .. } => stmt::halt(),
        Stmt::Delete { names, .. } => stmt::delete(names, scope),
        Stmt::Enum { name, items, .. } => stmt::install_members(name, items, scope),
        Stmt::Mod { name, members, .. } => stmt::install_members(name, members, scope),
        Stmt::Use {
            address,
            name,
            version,
        } => stmt::use_module(address, name, version, scope),
        Stmt::Import { path, .. } => stmt::import(path, scope),
        Stmt::Test {
            name,
            assertion,
            body,
            ..
        } => stmt::test(name, assertion, body, scope),
        Stmt::Expression { expression } => visit_expr(expression, scope),
    }
}
