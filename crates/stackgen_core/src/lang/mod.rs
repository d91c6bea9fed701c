//! Generator vocabulary registries.
//!
//! This module is the “front door” for the names the generator works with: intrinsic functions introduced by the
//! rewrite pipeline or offered by the source language, operator identities, the precedence-table shape each backend
//! fills in, and target keyword lists.
//!
//! Callers work with **stable IDs** (e.g. `IntrinsicId`, `BinaryOp`) and look up spellings/metadata via registry
//! tables instead of matching on strings across the backend.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no IR types, no IO, no side effects.
//!
//! ## Examples
//! ```rust
//! use stackgen_core::lang::intrinsics::{self, IntrinsicId};
//!
//! assert_eq!(intrinsics::from_str("__apply"), Some(IntrinsicId::Apply));
//! assert_eq!(intrinsics::as_str(IntrinsicId::Entries), "entries");
//! ```

pub mod csharp_keywords;
pub mod intrinsics;
pub mod operators;
pub mod precedence;
