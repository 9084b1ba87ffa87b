//! Tree-walking evaluator for Rhea.
//!
//! The semantic heart of the interpreter: tagged dynamic values, the
//! lexically scoped symbol table with advisory locks and parallel task
//! handles, non-local control flow as unwinding signals, the `visit`
//! bodies for every AST node, the native ABI, and the file-list driver
//! used by the CLI, the REPL, and `use`/`import`.

mod eval;
mod interp;
mod native;
mod operators;
mod render;
mod signal;
mod symbol_table;
mod value;

pub use eval::{visit_expr, visit_stmt};
pub use interp::{interpret_files, report, run_source, Diagnostic};
pub use native::{resolve_native, NativeFunction, NativeResult};
pub use operators::{evaluate_binary, evaluate_unary};
pub use render::{install_render_target, render, render_error, BufferTarget, RenderTarget};
pub use signal::{EvalResult, NodeError, Unwind};
pub use symbol_table::SymbolTable;
pub use value::{ArrayRef, FunctionValue, Heap, RegexValue, Value};
