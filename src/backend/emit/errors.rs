//! Define error types for IR → C# emission.
//!
//! These errors are *fatal invariant violations*: a type or expression shape the IR contract rules out (a binary
//! operator without a precedence entry, a literal of non-primitive type, an object mixing key forms). They indicate a
//! bug upstream or in the generator, so generation stops.
//!
//! ## Notes
//!
//! - Constructs the backend merely does not support yet are **not** errors; they become
//!   [`super::Unsupported`] placeholders and generation continues.

use miette::Diagnostic;
use thiserror::Error;

use crate::ir::{SourceSpan, Type};

/// Fatal error during C# emission.
#[derive(Debug, Error, Diagnostic)]
pub enum EmitError {
    #[error("no precedence entry for binary operator `{op}`")]
    #[diagnostic(
        code(stackgen::emit::missing_operator),
        help("every binary operator needs an entry in the backend precedence table")
    )]
    MissingOperator { op: &'static str },

    #[error("literal has non-primitive type `{ty}`{}", at(.span))]
    #[diagnostic(code(stackgen::emit::non_primitive_literal))]
    NonPrimitiveLiteral { ty: Type, span: Option<SourceSpan> },

    #[error("object construction mixes named and dynamic keys{}", at(.span))]
    #[diagnostic(code(stackgen::emit::mixed_object_keys))]
    MixedObjectKeys { span: Option<SourceSpan> },

    #[error("malformed apply: {reason}{}", at(.span))]
    #[diagnostic(code(stackgen::emit::malformed_apply))]
    MalformedApply { reason: String, span: Option<SourceSpan> },

    #[error("intrinsic `{name}` called with {found} argument(s){}", at(.span))]
    #[diagnostic(code(stackgen::emit::intrinsic_arity))]
    IntrinsicArity {
        name: &'static str,
        found: usize,
        span: Option<SourceSpan>,
    },

    #[error("internal invariant violated: {0}")]
    #[diagnostic(code(stackgen::emit::invariant))]
    Invariant(String),
}

fn at(span: &Option<SourceSpan>) -> String {
    span.as_ref().map(|s| format!(" at {s}")).unwrap_or_default()
}
