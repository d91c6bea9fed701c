//! Emit C# source from the typed IR.
//!
//! This module defines [`Emitter`] and wires together the submodules that implement IR → C# emission. The heavy
//! lifting lives in those submodules; `mod.rs` only holds the shared state and a few helpers.
//!
//! ## Notes
//! - Expressions are rendered to `String`s at an explicit indentation level; declarations are written through a
//!   [`CodeWriter`](super::writer::CodeWriter).
//! - Every expression goes through [`super::rewrite::process_expression`] before it is printed, so the printer only
//!   deals with explicit `__convert`/`__apply`/`__constructor` calls and never compares types to decide structure.
//! - Unsupported constructs become inline `/* TODO (...) */` placeholders and are recorded as [`Unsupported`] values;
//!   generation never stops for them. Fatal problems are [`EmitError`]s.
//!
//! ## See also
//! - [`program`]: preamble, imports, postamble
//! - [`nodes`]: one declaration per IR node
//! - [`expressions`]: the expression printer and intrinsic dispatch

mod errors;
mod expressions;
mod nodes;
mod precedence;
mod program;

pub use errors::EmitError;
pub use precedence::CSHARP_PRECEDENCE;

use serde::Serialize;
use stackgen_core::lang::csharp_keywords;
use stackgen_core::strings::{clean_name, title};

use super::config::GeneratorConfig;
use super::namespaces::NamespaceMetadata;
use crate::diagnostics::Diagnostic;
use crate::ir::{Package, SourceSpan};

/// A construct the generator emitted a placeholder for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unsupported {
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
}

/// Emit one C# program from typed IR.
///
/// The emitter is stateful for the duration of one generation call: it accumulates diagnostics and placeholders in
/// program order and remembers whether the config block has been opened.
pub struct Emitter<'a> {
    config: &'a GeneratorConfig,
    namespaces: &'a dyn NamespaceMetadata,
    /// Packages the program declares; resources from other packages get a warning.
    packages: &'a [Package],
    diagnostics: Vec<Diagnostic>,
    unsupported: Vec<Unsupported>,
    /// Whether `var config = new Config();` has been emitted.
    config_created: bool,
}

impl<'a> Emitter<'a> {
    pub fn new(config: &'a GeneratorConfig, namespaces: &'a dyn NamespaceMetadata, packages: &'a [Package]) -> Self {
        Self {
            config,
            namespaces,
            packages,
            diagnostics: Vec::new(),
            unsupported: Vec::new(),
            config_created: false,
        }
    }

    /// Consume the emitter, returning what it accumulated.
    pub fn finish(self) -> (Vec<Diagnostic>, Vec<Unsupported>) {
        (self.diagnostics, self.unsupported)
    }

    fn pad(&self, level: usize) -> String {
        " ".repeat(level * self.config.indent_width)
    }

    /// Render an inline placeholder and record it.
    fn placeholder(&mut self, reason: impl Into<String>, span: Option<&SourceSpan>) -> String {
        let reason = reason.into();
        tracing::debug!(%reason, "emitting placeholder");
        let quoted = format!("{reason:?}").replace("*/", "*\\/");
        self.unsupported.push(Unsupported {
            reason,
            span: span.cloned(),
        });
        format!("/* TODO ({quoted}) */")
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(%diagnostic, "generation diagnostic");
        self.diagnostics.push(diagnostic);
    }
}

/// A legal C# identifier for an IR name; keywords are escaped with `@`.
fn csharp_identifier(name: &str) -> String {
    let name = clean_name(name);
    if csharp_keywords::is_keyword(&name) {
        format!("@{name}")
    } else {
        name
    }
}

/// The C# property name for an IR attribute or input name.
fn property_name(name: &str) -> String {
    title(&clean_name(name))
}
