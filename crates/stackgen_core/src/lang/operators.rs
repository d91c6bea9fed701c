//! Operator vocabulary.
//!
//! Binary and unary operators as they appear in the IR. Each operator has a stable IR name (the spelling used when a
//! program is serialized) and a C-family symbol that every current backend prints verbatim.
//!
//! ## Notes
//! - Precedence is **not** recorded here. It is a property of the target syntax, supplied per backend through
//!   [`crate::lang::precedence::PrecedenceTable`].
//!
//! ## Examples
//! ```rust
//! use stackgen_core::lang::operators::{self, BinaryOp};
//!
//! assert_eq!(operators::binary_from_str("logical_or"), Some(BinaryOp::LogicalOr));
//! assert_eq!(operators::binary_info(BinaryOp::LogicalOr).symbol, "||");
//! ```

/// Stable identifier for every binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,

    // Equality
    Equal,
    NotEqual,

    // Relational
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,

    // Logical
    LogicalAnd,
    LogicalOr,
}

/// Stable identifier for every unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Negate,
}

/// Broad operator category, used for operand typing checks and docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorClass {
    Arithmetic,
    Equality,
    Relational,
    Logical,
}

/// Metadata for a binary operator.
#[derive(Debug, Clone, Copy)]
pub struct BinaryOpInfo {
    pub id: BinaryOp,
    pub name: &'static str,
    pub symbol: &'static str,
    pub class: OperatorClass,
}

/// Metadata for a unary operator.
#[derive(Debug, Clone, Copy)]
pub struct UnaryOpInfo {
    pub id: UnaryOp,
    pub name: &'static str,
    pub symbol: &'static str,
}

const fn bin(id: BinaryOp, name: &'static str, symbol: &'static str, class: OperatorClass) -> BinaryOpInfo {
    BinaryOpInfo {
        id,
        name,
        symbol,
        class,
    }
}

/// Registry of binary operators, in [`BinaryOp`] declaration order.
pub const BINARY_OPERATORS: &[BinaryOpInfo] = &[
    bin(BinaryOp::Add, "add", "+", OperatorClass::Arithmetic),
    bin(BinaryOp::Subtract, "subtract", "-", OperatorClass::Arithmetic),
    bin(BinaryOp::Multiply, "multiply", "*", OperatorClass::Arithmetic),
    bin(BinaryOp::Divide, "divide", "/", OperatorClass::Arithmetic),
    bin(BinaryOp::Modulo, "modulo", "%", OperatorClass::Arithmetic),
    bin(BinaryOp::Equal, "equal", "==", OperatorClass::Equality),
    bin(BinaryOp::NotEqual, "not_equal", "!=", OperatorClass::Equality),
    bin(BinaryOp::LessThan, "less_than", "<", OperatorClass::Relational),
    bin(BinaryOp::LessThanOrEqual, "less_than_or_equal", "<=", OperatorClass::Relational),
    bin(BinaryOp::GreaterThan, "greater_than", ">", OperatorClass::Relational),
    bin(BinaryOp::GreaterThanOrEqual, "greater_than_or_equal", ">=", OperatorClass::Relational),
    bin(BinaryOp::LogicalAnd, "logical_and", "&&", OperatorClass::Logical),
    bin(BinaryOp::LogicalOr, "logical_or", "||", OperatorClass::Logical),
];

/// Registry of unary operators, in [`UnaryOp`] declaration order.
pub const UNARY_OPERATORS: &[UnaryOpInfo] = &[
    UnaryOpInfo {
        id: UnaryOp::Not,
        name: "not",
        symbol: "!",
    },
    UnaryOpInfo {
        id: UnaryOp::Negate,
        name: "negate",
        symbol: "-",
    },
];

/// Return the metadata entry for a binary operator.
pub fn binary_info(op: BinaryOp) -> &'static BinaryOpInfo {
    &BINARY_OPERATORS[op as usize]
}

/// Return the metadata entry for a unary operator.
pub fn unary_info(op: UnaryOp) -> &'static UnaryOpInfo {
    &UNARY_OPERATORS[op as usize]
}

/// Resolve an IR name to a binary operator.
pub fn binary_from_str(name: &str) -> Option<BinaryOp> {
    BINARY_OPERATORS.iter().find(|o| o.name == name).map(|o| o.id)
}

/// Resolve an IR name to a unary operator.
pub fn unary_from_str(name: &str) -> Option<UnaryOp> {
    UNARY_OPERATORS.iter().find(|o| o.name == name).map(|o| o.id)
}

impl BinaryOp {
    /// IR spelling (e.g. `"not_equal"`).
    pub fn name(self) -> &'static str {
        binary_info(self).name
    }

    /// Printed symbol (e.g. `"!="`).
    pub fn symbol(self) -> &'static str {
        binary_info(self).symbol
    }

    pub fn class(self) -> OperatorClass {
        binary_info(self).class
    }
}

impl UnaryOp {
    /// IR spelling (e.g. `"negate"`).
    pub fn name(self) -> &'static str {
        unary_info(self).name
    }

    /// Printed symbol (e.g. `"-"`).
    pub fn symbol(self) -> &'static str {
        unary_info(self).symbol
    }
}
