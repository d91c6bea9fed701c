#![forbid(unsafe_code)]
//! Stack Generator
//!
//! Generates C# infrastructure programs from a typed, linearized program representation. A front-end resolves and
//! orders the declarations; this crate owns everything from there to source text.
//!
//! - [`ir`]: the consumed program representation (nodes, typed expressions, types)
//! - [`backend`]: rewrites, emission and the [`Generator`](backend::Generator) facade
//! - [`diagnostics`]: non-fatal problems reported alongside the output
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `backend` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Unsupported input**: constructs the generator cannot render become inline placeholders, never panics.

pub mod backend;
pub mod cli;
pub mod diagnostics;
pub mod ir;

pub use backend::{GenerateResult, GenerationError, Generator, GeneratorConfig, PackageNamespaces, generate};
pub use diagnostics::{Diagnostic, Severity};
pub use ir::Program;
