//! Provide shared, pure vocabulary for the stackgen program generator.
//!
//! This crate holds the backend-independent pieces that every target backend agrees on:
//! - the intrinsic function names the rewrite pipeline introduces and the dispatch table resolves,
//! - operator identities and the shape of a backend-supplied precedence table,
//! - identifier/string helpers (title-casing, identifier cleaning, keyword escaping).
//!
//! ## Notes
//!
//! - This is a “vocabulary” crate: **no IO**, no global state, and no IR types.
//! - Registries are `const` tables; lookups go through `from_str` / `as_str` / `info_for`.

pub mod lang;
pub mod strings;
