//! Non-local control flow as unwinding signals.
//!
//! The evaluator returns `Result<Value, Unwind>` everywhere; the four
//! language-level transfers and the fatal structural error travel the
//! error channel. Only specific node evaluations catch specific signals:
//! loops take `Break`/`Continue`, function calls and single-statement
//! expressions take `Return`, catch-handle takes `Throw`. Anything that
//! reaches the top of a file becomes a diagnostic.

use rhea_ir::Token;

use crate::value::Value;

/// Structural evaluation error: wrong arity, unresolved symbol, bad
/// assignment target. Fatal for the file unlike a `Throw`, which scripts
/// can catch.
#[derive(Clone, Debug)]
pub struct NodeError {
    pub address: Token,
    pub message: String,
}

/// An in-flight non-local transfer.
#[derive(Clone, Debug)]
pub enum Unwind {
    Break { origin: Token },
    Continue { origin: Token },
    Return { value: Value },
    Throw { origin: Token, value: Value },
    Node(NodeError),
}

/// Result of evaluating one node.
pub type EvalResult = Result<Value, Unwind>;

impl Unwind {
    /// A structural error at `address`.
    pub fn node(address: &Token, message: impl Into<String>) -> Self {
        Unwind::Node(NodeError {
            address: address.clone(),
            message: message.into(),
        })
    }

    /// A catchable thrown string value at `origin`.
    pub fn throw_message(origin: &Token, message: impl Into<String>) -> Self {
        Unwind::Throw {
            origin: origin.clone(),
            value: Value::string(message.into()),
        }
    }
}
