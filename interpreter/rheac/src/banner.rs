//! The startup banner and usage text.

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Print the banner; with `usage` the flag table follows.
pub fn print(usage: bool) {
    println!("Rhea {VERSION} - expression-oriented scripting language");
    println!();
    println!("\u{1b}[3;37mRhea is free software, please check the source for copying");
    println!("terms and conditions. This includes no warranty, not even");
    println!("for fitness and/or merchantability for any particular purpose.\u{1b}[0m");

    if usage {
        println!();
        println!("\u{1b}[32mUsage\u{1b}[0m:");
        println!("  rhea [args] <file-list>");
        println!("    -h, --help     Show this help banner.");
        println!("    -r, --repl     Interactive interpreter mode (REPL).");
        println!("    -t, --test     Run the script files in test mode.");
        println!("    -u, --unsafe   Run the script files in unsafe mode.");
    }
    println!();
}
