//! The native function ABI.
//!
//! A native receives the call-site token, the caller's scope, the
//! evaluated arguments, and the unsafe-mode flag, and returns a value or a
//! `Throw` unwinding. Any other `Unwind` variant crossing the boundary is
//! undefined behaviour; the loaded library is trusted by design.
//!
//! Symbols are exported with dots replaced by underscores: `math.cos` in
//! source resolves to `math_cos` in the library.

#![allow(
    unsafe_code,
    reason = "casting resolved symbols to the native ABI signature"
)]

use rhea_ir::Token;

use crate::signal::Unwind;
use crate::symbol_table::SymbolTable;
use crate::value::Value;

/// What a native call produces.
pub type NativeResult = Result<Value, Unwind>;

/// Calling convention for functions loaded from shared libraries.
pub type NativeFunction = fn(Token, &SymbolTable, Vec<Value>, bool) -> NativeResult;

/// Resolve `dotted_name` inside `library` to a callable native.
///
/// The handle behind the returned pointer lives in the process-wide
/// registry until exit, so the pointer never dangles.
pub fn resolve_native(
    address: &Token,
    library: &str,
    dotted_name: &str,
) -> Result<NativeFunction, Unwind> {
    let raw = rhea_runtime::load_native_symbol(library, dotted_name)
        .map_err(|err| Unwind::node(address, err.to_string()))?;

    // SAFETY: the symbol was exported by a native module written against
    // this ABI; the signature cast is the library's contract.
    let function: NativeFunction = unsafe { std::mem::transmute(raw) };
    Ok(function)
}
