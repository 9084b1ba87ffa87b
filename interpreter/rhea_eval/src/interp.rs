//! The file-list interpreter driver.
//!
//! `run_source` takes one named source through lex, parse, and evaluate;
//! `interpret_files` drives a whole file list with content-hash no-op
//! reloads and the coloured diagnostic banners. Pending parallel tasks are
//! joined before any diagnostic is reported, and subsequent files still
//! execute after a failure.

use std::path::PathBuf;

use rhea_lexer::{Lexer, LexicalError};
use rhea_parse::{Parser, ParserError};
use sha2::{Digest, Sha256};

use crate::eval::visit_stmt;
use crate::render::render_error;
use crate::signal::Unwind;
use crate::symbol_table::SymbolTable;
use crate::value::Value;

/// Everything a file or REPL submission can fail with.
#[derive(Debug)]
pub enum Diagnostic {
    Lexical(LexicalError),
    Parser(ParserError),
    Unwind(Unwind),
    System(String),
}

/// Lex, parse, and evaluate one named source against `scope`.
///
/// Returns the value of the last global statement.
pub fn run_source(
    file_name: &str,
    source: &str,
    scope: &SymbolTable,
) -> Result<Value, Diagnostic> {
    let tokens = Lexer::new(source, file_name)
        .scan()
        .map_err(Diagnostic::Lexical)?;
    let statements = Parser::new(tokens).parse().map_err(Diagnostic::Parser)?;

    let mut value = Value::Nil;
    for statement in &statements {
        value = visit_stmt(statement, scope).map_err(Diagnostic::Unwind)?;
    }
    Ok(value)
}

/// Evaluate a list of files into `scope`, reporting diagnostics as they
/// happen. Returns the process exit code: 0 when every file succeeded.
///
/// Each file's content hash registers on first load; re-loading identical
/// content is a no-op, which is what makes cyclic `use`/`import` chains
/// terminate.
pub fn interpret_files(scope: &SymbolTable, files: &[PathBuf]) -> i32 {
    let mut exit_code = 0;

    for file in files {
        let name = file.to_string_lossy().to_string();

        let source = match std::fs::read_to_string(file) {
            Ok(source) => source,
            Err(err) => {
                report(&Diagnostic::System(format!("Cannot read file {name}: {err}")));
                exit_code = 1;
                continue;
            }
        };

        let hash = format!("{:x}", Sha256::digest(source.as_bytes()));
        if !rhea_runtime::add_file_hash(hash) {
            tracing::debug!(file = %name, "content already loaded, skipping");
            continue;
        }

        tracing::debug!(file = %name, "interpreting");
        if let Err(diagnostic) = run_source(&name, &source, scope) {
            scope.wait_for_tasks();
            report(&diagnostic);
            exit_code = 1;
        }
    }

    scope.wait_for_tasks();
    exit_code
}

/// Print a diagnostic banner to the error stream.
pub fn report(diagnostic: &Diagnostic) {
    match diagnostic {
        Diagnostic::Lexical(err) => {
            render_error(&format!(
                "[\u{1b}[1;31mLexical Error\u{1b}[0m]:\n\t{err}\n"
            ));
        }
        Diagnostic::Parser(err) => {
            render_error(&format!(
                "[\u{1b}[1;31mParser Error\u{1b}[0m]:  \u{1b}[3;37m{err}\u{1b}[0m\n"
            ));
            if let Some(token) = &err.token {
                render_error(&format!("                 {token}\n"));
            }
        }
        Diagnostic::Unwind(unwind) => report_unwind(unwind),
        Diagnostic::System(message) => {
            render_error(&format!(
                "[\u{1b}[1;31mSystem Error\u{1b}[0m]: \u{1b}[3;37m{message}\u{1b}[0m\n"
            ));
        }
    }
}

/// Banner formats for uncaught unwindings, shared with the parallel-task
/// boundary.
pub(crate) fn report_unwind(unwind: &Unwind) {
    match unwind {
        Unwind::Break { origin } => {
            render_error(
                "[\u{1b}[1;31mRuntime Error\u{1b}[0m]: \
                 \u{1b}[3;37mInvalid break statement signal caught.\u{1b}[0m\n",
            );
            render_error(&format!("                 {origin}\n"));
        }
        Unwind::Continue { origin } => {
            render_error(
                "[\u{1b}[1;31mRuntime Error\u{1b}[0m]: \
                 \u{1b}[3;37mInvalid continue statement signal caught.\u{1b}[0m\n",
            );
            render_error(&format!("                 {origin}\n"));
        }
        Unwind::Return { value } => {
            render_error(&format!(
                "\u{1b}[0;93m{}\u{1b}[0m\n",
                value.to_display_string()
            ));
        }
        Unwind::Throw { origin, value } => {
            render_error(&format!(
                "[\u{1b}[1;31mUncaught Error\u{1b}[0m]: \u{1b}[3;37m{}\u{1b}[0m\n",
                value.to_display_string()
            ));
            render_error(&format!("                  {origin}\n"));
        }
        Unwind::Node(err) => {
            render_error(&format!(
                "[\u{1b}[1;31mRuntime Error\u{1b}[0m]: \u{1b}[3;37m{}\u{1b}[0m\n",
                err.message
            ));
            render_error(&format!("                 {}\n", err.address));
        }
    }
}
