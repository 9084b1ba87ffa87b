//! The `rhea` binary: CLI flags, file mode, REPL mode, crash handling.

mod banner;
mod crash;
mod repl;
mod tracing_setup;

use std::path::PathBuf;

use clap::Parser;
use rhea_eval::{interpret_files, SymbolTable};

/// Command-line surface of the interpreter.
#[derive(Parser, Debug)]
#[command(name = "rhea", disable_help_flag = true, disable_version_flag = true)]
struct Args {
    /// Show the help banner and exit.
    #[arg(short = 'h', long = "help")]
    help: bool,

    /// Enter the interactive interpreter (REPL).
    #[arg(short = 'r', long = "repl")]
    repl: bool,

    /// Run script files in test mode.
    #[arg(short = 't', long = "test")]
    test: bool,

    /// Run script files in unsafe mode (flag passed to natives).
    #[arg(short = 'u', long = "unsafe")]
    unsafe_mode: bool,

    /// Script files to interpret, in order.
    files: Vec<PathBuf>,
}

fn main() {
    crash::install_segfault_handler();
    tracing_setup::init();

    let args = Args::parse();
    tracing::debug!(?args, "parsed command line");

    if args.help {
        banner::print(true);
        std::process::exit(1);
    }

    if args.test {
        rhea_runtime::set_test_mode(true);
    }
    if args.unsafe_mode {
        rhea_runtime::set_unsafe_mode(true);
    }

    if args.repl {
        repl::run();
        rhea_runtime::clean_up();
        return;
    }

    if !args.files.is_empty() {
        let symbols = SymbolTable::new();
        let code = interpret_files(&symbols, &args.files);
        rhea_runtime::clean_up();
        std::process::exit(code);
    }

    banner::print(false);
}
