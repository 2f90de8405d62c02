//! Core utilities for gqlbind.
//!
//! This crate provides foundational types used throughout gqlbind:
//! - `span`: Byte-offset source spans
//! - `location`: 1-based line/column locations
//! - `diagnostics`: Error reporting

pub mod diagnostics;
pub mod location;
pub mod span;

pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticSeverity, Label};
pub use location::{LineIndex, SourceLocation};
pub use span::Span;
