//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const CONFIG_NAME: &str = "ktscan.toml";

const DEFAULT_CONFIG: &str = r#"# ktscan configuration

# Listener selection: "default", "rules" or "metrics"
preset = "default"

[analyzer]
# Directory analyzed when `ktscan check` gets no path, relative to this file
root = "."

# Glob patterns to exclude from analysis
exclude = [
    "**/build/**",
    "**/.gradle/**",
]

# Worker threads (default: number of CPUs)
# parallelism = 4

# Stop the run after this many seconds
# timeout_secs = 300

# Rule configurations
# Each listener can be disabled; rules can have their severity overridden

[rules.UnnecessaryParentheses]
enabled = true
# severity = "warning"

[rules.ComplexMethod]
enabled = true
threshold = 10
"#;

/// Runs the init command, writing the config into `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {CONFIG_NAME}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to configure rules");
    println!("  2. Run: ktscan check");

    Ok(())
}
