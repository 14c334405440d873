//! # ktscan-rules
//!
//! Built-in rules and processors for ktscan.
//!
//! ## Available Listeners
//!
//! | Id | Kind | Description |
//! |----|------|-------------|
//! | `UnnecessaryParentheses` | rule (style) | Parentheses that can be removed |
//! | `ComplexMethod` | rule (maintainability) | Functions with high cyclomatic complexity |
//! | `PackageCountProcessor` | processor | `number of packages` |
//! | `ClassCountProcessor` | processor | `number of classes` |
//! | `FunctionCountProcessor` | processor | `number of functions` |
//! | `LinesOfCodeProcessor` | processor | `lines of code` |
//!
//! ## Usage
//!
//! ```ignore
//! use ktscan_core::Analyzer;
//! use ktscan_rules::{ComplexMethod, UnnecessaryParentheses};
//!
//! let analyzer = Analyzer::builder()
//!     .listener(UnnecessaryParentheses::new())
//!     .listener(ComplexMethod::new().threshold(15))
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod complex_method;
pub mod package_count;
mod presets;
pub mod project_counts;
pub mod unnecessary_parentheses;

pub use complex_method::ComplexMethod;
pub use package_count::PackageCountProcessor;
pub use presets::{all_listeners, catalog, listeners_from_config, ListenerInfo, Preset};
pub use project_counts::CountProcessor;
pub use unnecessary_parentheses::UnnecessaryParentheses;

/// Re-export core types for convenience.
pub use ktscan_core::{Listener, Rule, Severity};
