//! Shape of a backend-supplied operator precedence table.
//!
//! Precedence is a property of the *target* syntax, so each backend provides one [`PrecedenceTable`] constant and the
//! printer consults it instead of hardcoding a switch.
//!
//! ## Notes
//! - Higher values bind tighter. The absolute scale is backend-defined.
//! - A binary operator missing from [`PrecedenceTable::binary`] is a backend bug; [`PrecedenceTable::binary_precedence`]
//!   returns `None` so the caller can report it.
//!
//! ## Examples
//! ```rust
//! use stackgen_core::lang::operators::BinaryOp;
//! use stackgen_core::lang::precedence::PrecedenceTable;
//!
//! const TABLE: PrecedenceTable = PrecedenceTable {
//!     lambda: 0,
//!     conditional: 1,
//!     binary: &[(BinaryOp::Add, 2)],
//!     unary: 3,
//!     suspend: 3,
//!     postfix: 4,
//!     primary: 5,
//! };
//! assert_eq!(TABLE.binary_precedence(BinaryOp::Add), Some(2));
//! assert_eq!(TABLE.binary_precedence(BinaryOp::Multiply), None);
//! ```

use super::operators::BinaryOp;

/// Relative binding strength of an expression form.
pub type Precedence = u8;

/// Per-backend precedence values for every expression form the printer distinguishes.
#[derive(Debug, Clone, Copy)]
pub struct PrecedenceTable {
    /// Anonymous functions.
    pub lambda: Precedence,
    /// `c ? a : b`
    pub conditional: Precedence,
    /// Infix operators.
    pub binary: &'static [(BinaryOp, Precedence)],
    /// Prefix operators.
    pub unary: Precedence,
    /// Awaiting a fire-once value.
    pub suspend: Precedence,
    /// Calls, member access, indexing, splats.
    pub postfix: Precedence,
    /// Literals, templates, object/tuple construction, names.
    pub primary: Precedence,
}

impl PrecedenceTable {
    /// Look up the precedence of a binary operator.
    pub fn binary_precedence(&self, op: BinaryOp) -> Option<Precedence> {
        self.binary.iter().find(|(candidate, _)| *candidate == op).map(|(_, p)| *p)
    }
}
