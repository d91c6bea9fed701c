//! Generation facade
//!
//! [`Generator`] is the entry point of the backend: it validates its [`GeneratorConfig`], runs the emitter over a
//! [`Program`] and packages the result.
//!
//! ```text
//! Program → rewrite (per expression) → Emitter → CodeWriter → MyStack.cs
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stackgen::backend::{Generator, GeneratorConfig, PackageNamespaces};
//!
//! let result = Generator::new(GeneratorConfig::default()).generate(&program, &PackageNamespaces::new())?;
//! for (name, bytes) in &result.files {
//!     std::fs::write(name, bytes)?;
//! }
//! ```
//!
//! ## Error Handling
//!
//! Only fatal problems are `Err`: an invalid configuration, or an [`EmitError`] (an IR shape the generator's
//! contract rules out). Input problems the generator works around are [`Diagnostic`]s; constructs it cannot render
//! are [`Unsupported`] placeholders. Both are returned inside [`GenerateResult`].

use std::collections::BTreeMap;

use miette::Diagnostic as MietteDiagnostic;
use stackgen_core::strings::is_legal_identifier;
use thiserror::Error;

use super::config::GeneratorConfig;
use super::emit::{EmitError, Emitter, Unsupported};
use super::namespaces::NamespaceMetadata;
use crate::diagnostics::Diagnostic;
use crate::ir::Program;

/// Fatal error during generation.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum GenerationError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Emission(#[from] EmitError),

    #[error("invalid generator configuration: {0}")]
    #[diagnostic(code(stackgen::config))]
    Config(String),
}

/// What one generation call produced.
#[derive(Debug, Clone, Default)]
pub struct GenerateResult {
    /// Output file name → generated source
    pub files: BTreeMap<String, Vec<u8>>,
    /// Non-fatal problems, in program order
    pub diagnostics: Vec<Diagnostic>,
    /// Placeholders emitted for unsupported constructs, in program order
    pub unsupported: Vec<Unsupported>,
}

impl GenerateResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// C# program generator
pub struct Generator {
    config: GeneratorConfig,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the C# program for `program`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Config`] when the configuration cannot produce a valid program, and
    /// [`GenerationError::Emission`] on a fatal invariant violation in the IR.
    #[tracing::instrument(skip_all, fields(node_count = program.nodes.len(), file = %self.config.file_name))]
    pub fn generate(
        &self,
        program: &Program,
        namespaces: &dyn NamespaceMetadata,
    ) -> Result<GenerateResult, GenerationError> {
        self.validate()?;

        let mut emitter = Emitter::new(&self.config, namespaces, &program.packages);
        let source = emitter.emit_program(program)?;
        let (diagnostics, unsupported) = emitter.finish();

        tracing::info!(
            diagnostics = diagnostics.len(),
            unsupported = unsupported.len(),
            "generated {}",
            self.config.file_name
        );

        let mut files = BTreeMap::new();
        files.insert(self.config.file_name.clone(), source.into_bytes());
        Ok(GenerateResult {
            files,
            diagnostics,
            unsupported,
        })
    }

    fn validate(&self) -> Result<(), GenerationError> {
        let config = &self.config;
        for (what, name) in [("class name", &config.class_name), ("base class", &config.base_class)] {
            if !is_legal_identifier(name) {
                return Err(GenerationError::Config(format!("{what} `{name}` is not a legal identifier")));
            }
        }
        if config.runtime_namespace.split('.').any(|segment| !is_legal_identifier(segment)) {
            return Err(GenerationError::Config(format!(
                "runtime namespace `{}` is not a dotted identifier",
                config.runtime_namespace
            )));
        }
        if config.file_name.is_empty() {
            return Err(GenerationError::Config("file name is empty".to_string()));
        }
        if config.indent_width == 0 {
            return Err(GenerationError::Config("indent width must be positive".to_string()));
        }
        Ok(())
    }
}

/// Generate with the default configuration.
pub fn generate(program: &Program, namespaces: &dyn NamespaceMetadata) -> Result<GenerateResult, GenerationError> {
    Generator::default().generate(program, namespaces)
}
