//! Intrinsic function vocabulary.
//!
//! An intrinsic is an abstract, backend-independent operation name that appears as the callee of a function-call
//! expression. Some are written by users of the source language (`invoke`, `entries`, `readFile`, ...); others are
//! introduced by the rewrite pipeline (`__apply`, `__convert`, `__constructor`, ...) and never appear in source.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - [`INTRINSICS`] is ordered exactly like [`IntrinsicId`]; [`info_for`] indexes by discriminant. The registry
//!   guardrail tests enforce this.
//! - A name that is not in this table is still a valid call; backends render it as an unsupported placeholder.
//!
//! ## Examples
//! ```rust
//! use stackgen_core::lang::intrinsics::{self, IntrinsicId};
//!
//! assert_eq!(intrinsics::from_str("toJSON"), Some(IntrinsicId::ToJson));
//! assert!(intrinsics::info_for(IntrinsicId::Invoke).accepts(3));
//! assert!(!intrinsics::info_for(IntrinsicId::Length).accepts(2));
//! ```

/// Stable identifier for every intrinsic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntrinsicId {
    // Introduced by the rewrite pipeline
    Apply,
    Convert,
    Await,
    Constructor,
    ToOutput,

    // Source-level functions
    Element,
    Entries,
    FileArchive,
    FileAsset,
    Invoke,
    Length,
    Lookup,
    Range,
    ReadFile,
    ReadDir,
    Split,
    ToJson,
}

/// Where an intrinsic originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntrinsicOrigin {
    /// Inserted by a rewrite pass; never written in source programs.
    Rewrite,
    /// Part of the source language's function library.
    Library,
}

/// Metadata for an intrinsic.
#[derive(Debug, Clone, Copy)]
pub struct IntrinsicInfo {
    pub id: IntrinsicId,
    pub canonical: &'static str,
    pub origin: IntrinsicOrigin,
    /// Minimum accepted argument count.
    pub min_args: usize,
    /// Maximum accepted argument count (`None` = variadic).
    pub max_args: Option<usize>,
    pub description: &'static str,
}

impl IntrinsicInfo {
    /// Check whether `count` arguments are within this intrinsic's declared arity.
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.is_none_or(|max| count <= max)
    }
}

const fn info(
    id: IntrinsicId,
    canonical: &'static str,
    origin: IntrinsicOrigin,
    min_args: usize,
    max_args: Option<usize>,
    description: &'static str,
) -> IntrinsicInfo {
    IntrinsicInfo {
        id,
        canonical,
        origin,
        min_args,
        max_args,
        description,
    }
}

use IntrinsicOrigin::{Library, Rewrite};

/// Registry of all intrinsics, in [`IntrinsicId`] declaration order.
pub const INTRINSICS: &[IntrinsicInfo] = &[
    info(
        IntrinsicId::Apply,
        "__apply",
        Rewrite,
        1,
        None,
        "Unwrap eventual arguments and pass them to a trailing continuation.",
    ),
    info(
        IntrinsicId::Convert,
        "__convert",
        Rewrite,
        1,
        Some(1),
        "Mark a value as converted to its declared destination type.",
    ),
    info(IntrinsicId::Await, "__await", Rewrite, 1, Some(1), "Await a fire-once value."),
    info(
        IntrinsicId::Constructor,
        "__constructor",
        Rewrite,
        2,
        Some(2),
        "Instantiate a named argument type from an object literal.",
    ),
    info(
        IntrinsicId::ToOutput,
        "__toOutput",
        Rewrite,
        1,
        Some(1),
        "Lift a fire-once value into a tracked eventual value.",
    ),
    info(IntrinsicId::Element, "element", Library, 2, Some(2), "Select an element of a list."),
    info(
        IntrinsicId::Entries,
        "entries",
        Library,
        1,
        Some(1),
        "Enumerate a collection as key/value pairs.",
    ),
    info(
        IntrinsicId::FileArchive,
        "fileArchive",
        Library,
        1,
        Some(1),
        "Reference an archive on disk.",
    ),
    info(IntrinsicId::FileAsset, "fileAsset", Library, 1, Some(1), "Reference a file on disk."),
    info(
        IntrinsicId::Invoke,
        "invoke",
        Library,
        1,
        Some(3),
        "Call an external provider function by token.",
    ),
    info(IntrinsicId::Length, "length", Library, 1, Some(1), "Length of a string or collection."),
    info(IntrinsicId::Lookup, "lookup", Library, 2, Some(3), "Look up a key in a map."),
    info(IntrinsicId::Range, "range", Library, 1, Some(3), "Produce a numeric range."),
    info(IntrinsicId::ReadFile, "readFile", Library, 1, Some(1), "Read a file's contents."),
    info(IntrinsicId::ReadDir, "readDir", Library, 1, Some(1), "List the file names in a directory."),
    info(IntrinsicId::Split, "split", Library, 2, Some(2), "Split a string on a separator."),
    info(IntrinsicId::ToJson, "toJSON", Library, 1, Some(1), "Serialize a value to JSON."),
];

/// Return the canonical spelling for an intrinsic.
///
/// ## Examples
/// ```rust
/// use stackgen_core::lang::intrinsics::{self, IntrinsicId};
///
/// assert_eq!(intrinsics::as_str(IntrinsicId::ToOutput), "__toOutput");
/// ```
pub fn as_str(id: IntrinsicId) -> &'static str {
    info_for(id).canonical
}

/// Return the full metadata entry for an intrinsic.
pub fn info_for(id: IntrinsicId) -> &'static IntrinsicInfo {
    &INTRINSICS[id as usize]
}

/// Resolve a spelling to an intrinsic identifier.
///
/// ## Returns
/// - `Some(IntrinsicId)` if `name` matches a canonical spelling.
/// - `None` otherwise (the call is not an intrinsic).
pub fn from_str(name: &str) -> Option<IntrinsicId> {
    INTRINSICS.iter().find(|i| i.canonical == name).map(|i| i.id)
}
