//! # ktscan-kotlin
//!
//! Kotlin front end for ktscan.
//!
//! This crate turns Kotlin source into the [`SourceFile`] values the
//! analyzer dispatches, and gives rules a few helpers over the
//! `tree-sitter-kotlin-ng` syntax tree:
//!
//! - [`KotlinParser`] for strict parsing (syntax errors become failures)
//! - [`syntax`] for tree walking, package names and declaration lookup
//! - [`entity_of`] for building the [`Entity`] a finding is attached to
//!
//! [`SourceFile`]: ktscan_core::SourceFile
//! [`Entity`]: ktscan_core::Entity

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod entity;
mod parser;
pub mod syntax;

pub use entity::entity_of;
pub use parser::{KotlinParser, KOTLIN_EXTENSIONS};
