//! List rules command implementation.

use ktscan_rules::catalog;

/// Runs the list-rules command.
pub fn run() {
    println!("Available listeners:\n");
    println!("{:<25} {:<16} Description", "Id", "Severity");
    println!("{}", "-".repeat(80));

    for info in catalog() {
        let severity = info
            .severity
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        println!("{:<25} {:<16} {}", info.id, severity, info.description);
    }

    println!("\nPresets:");
    println!("  default  - All rules and processors");
    println!("  rules    - UnnecessaryParentheses, ComplexMethod");
    println!("  metrics  - Package, class, function and line counts");

    println!("\nUse --rules to run specific listeners, e.g.:");
    println!("  ktscan check --rules UnnecessaryParentheses,ComplexMethod");
}
