#![forbid(unsafe_code)]

use colored::*;

fn main() {
    println!("{}", "HashLedger CLI".bright_cyan().bold());
    println!("{}", "--------------".bright_cyan());
    println!();
    println!(
        "{}",
        "This is the main entry point, but all functionality is in separate binaries.".yellow()
    );
    println!(
        "{}",
        "Use 'cargo run --bin <binary_name>' to run a specific command.".yellow()
    );
    println!();
    println!("{}", "Available binaries:".bright_green().underline());
    println!(
        "  - {}  build a chain from generated transfers and audit it",
        "ledger-demo".bright_white()
    );
    println!(
        "  - {} audit a chain snapshot from a JSON file",
        "ledger-audit".bright_white()
    );
    println!();
    println!("{}", "Example:".bright_green().underline());
    println!("{}", "  cargo run --bin ledger-demo -- --out chain.json".italic());
    println!("{}", "  cargo run --bin ledger-audit -- chain.json".italic());
}
