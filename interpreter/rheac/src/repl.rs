//! The read-eval-print loop.
//!
//! Lines accumulate until the `()`/`[]`/`{}` brackets balance, then the
//! buffer runs as one submission named `<repl, iteration: N>`. Strings and
//! comments are not considered by the balance check; a bracket inside a
//! string literal will confuse the continuation prompt. Known limitation.

use rhea_eval::{report, run_source, SymbolTable};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Bracket balance over the raw input.
fn is_balanced(input: &str) -> bool {
    let mut stack = Vec::new();

    for ch in input.chars() {
        match ch {
            '(' | '[' | '{' => stack.push(ch),
            ')' | ']' | '}' => {
                let Some(open) = stack.pop() else {
                    return false;
                };
                let matches = matches!((open, ch), ('(', ')') | ('[', ']') | ('{', '}'));
                if !matches {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty()
}

/// Run the interactive loop until end-of-input.
pub fn run() {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Cannot start the interactive interpreter: {err}");
            return;
        }
    };

    let symbols = SymbolTable::new();
    let mut buffer = String::new();
    let mut iteration = 1_u64;

    loop {
        let prompt = if buffer.is_empty() { ">>> " } else { "... " };

        match editor.readline(prompt) {
            Ok(line) => {
                buffer.push_str(&line);
                buffer.push('\n');

                if !is_balanced(&buffer) {
                    continue;
                }

                let _ = editor.add_history_entry(buffer.trim_end());
                let name = format!("<repl, iteration: {iteration}>");

                if let Err(diagnostic) = run_source(&name, &buffer, &symbols) {
                    symbols.wait_for_tasks();
                    report(&diagnostic);
                }

                buffer.clear();
                iteration += 1;
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Input error: {err}");
                break;
            }
        }
    }

    symbols.wait_for_tasks();
}

#[cfg(test)]
mod tests {
    use super::is_balanced;

    #[test]
    fn balanced_inputs() {
        assert!(is_balanced(""));
        assert!(is_balanced("val x = 1;"));
        assert!(is_balanced("if (x) { render [1, 2]; }"));
    }

    #[test]
    fn open_brackets_request_continuation() {
        assert!(!is_balanced("func(a, b) {"));
        assert!(!is_balanced("val a = [1, 2,"));
    }

    #[test]
    fn mismatched_brackets_do_not_hang() {
        assert!(!is_balanced(")"));
        assert!(!is_balanced("(]"));
        assert!(!is_balanced("{ ) }"));
    }
}
