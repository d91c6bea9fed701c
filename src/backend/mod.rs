//! Stack Generator Backend
//!
//! This module turns a typed [`Program`](crate::ir::Program) into C# source for the infrastructure runtime.
//!
//! The pipeline is:
//! 1. Each expression is rewritten: reactive values are lifted into explicit applies, conversions are made explicit,
//!    and argument-bundle objects are annotated with their constructor type.
//! 2. The emitter walks the nodes in order and prints declarations and expressions through a [`CodeWriter`].
//! 3. The generator packages the single output file with the collected diagnostics and placeholders.
//!
//! ## Module Organization
//!
//! - `codegen.rs` - [`Generator`] facade and [`GenerationError`]
//! - `config.rs` - [`GeneratorConfig`]
//! - `namespaces.rs` - token → C# type name resolution and `using` collection
//! - `rewrite/` - expression rewrites (applies, conversions, constructors)
//! - `emit/` - C# emission
//!   - `program.rs` - preamble, imports, postamble
//!   - `nodes.rs` - one declaration per IR node
//!   - `expressions/` - expression printer and intrinsic dispatch
//! - `writer.rs` - indentation-aware string builder

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]

pub mod codegen;
pub mod config;
mod emit;
pub mod namespaces;
pub mod rewrite;
pub mod writer;

pub use codegen::{GenerateResult, GenerationError, Generator, generate};
pub use config::GeneratorConfig;
pub use emit::{CSHARP_PRECEDENCE, EmitError, Unsupported};
pub use namespaces::{NamespaceMetadata, PackageNamespaces};
pub use writer::CodeWriter;
