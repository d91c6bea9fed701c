//! C# operator precedence.
//!
//! Values follow the C# operator table, spaced so relative order is what matters: higher binds tighter.

use stackgen_core::lang::intrinsics::IntrinsicId;
use stackgen_core::lang::operators::BinaryOp;
use stackgen_core::lang::precedence::{Precedence, PrecedenceTable};

use super::EmitError;
use crate::ir::{Expr, ExprKind};

pub const CSHARP_PRECEDENCE: PrecedenceTable = PrecedenceTable {
    lambda: 3,
    conditional: 4,
    binary: &[
        (BinaryOp::LogicalOr, 5),
        (BinaryOp::LogicalAnd, 6),
        (BinaryOp::Equal, 11),
        (BinaryOp::NotEqual, 11),
        (BinaryOp::LessThan, 12),
        (BinaryOp::LessThanOrEqual, 12),
        (BinaryOp::GreaterThan, 12),
        (BinaryOp::GreaterThanOrEqual, 12),
        (BinaryOp::Add, 14),
        (BinaryOp::Subtract, 14),
        (BinaryOp::Multiply, 15),
        (BinaryOp::Divide, 15),
        (BinaryOp::Modulo, 15),
    ],
    unary: 17,
    suspend: 17,
    postfix: 20,
    primary: 22,
};

/// Precedence of `expr` as printed by the C# printer.
///
/// `__convert` is transparent: it has the precedence of the value it wraps.
pub(super) fn precedence_of(table: &PrecedenceTable, expr: &Expr) -> Result<Precedence, EmitError> {
    Ok(match &expr.kind {
        ExprKind::Lambda { .. } => table.lambda,
        ExprKind::Conditional { .. } => table.conditional,
        ExprKind::Binary { op, .. } => table
            .binary_precedence(*op)
            .ok_or(EmitError::MissingOperator { op: op.symbol() })?,
        ExprKind::Unary { .. } => table.unary,
        ExprKind::Call(call) => match call.intrinsic() {
            Some(IntrinsicId::Await) => table.suspend,
            Some(IntrinsicId::Convert) if call.args.len() == 1 => precedence_of(table, &call.args[0])?,
            _ => table.postfix,
        },
        ExprKind::Index { .. } | ExprKind::RelativeTraversal { .. } | ExprKind::Splat { .. } => table.postfix,
        ExprKind::Literal(_)
        | ExprKind::Template(_)
        | ExprKind::Object(_)
        | ExprKind::Tuple(_)
        | ExprKind::ScopeTraversal { .. } => table.primary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Type;

    #[test]
    fn test_every_binary_operator_has_an_entry() {
        for info in stackgen_core::lang::operators::BINARY_OPERATORS {
            assert!(
                CSHARP_PRECEDENCE.binary_precedence(info.id).is_some(),
                "missing C# precedence for {:?}",
                info.id
            );
        }
    }

    #[test]
    fn test_relative_order() {
        let p = |op| CSHARP_PRECEDENCE.binary_precedence(op).unwrap();
        assert!(CSHARP_PRECEDENCE.lambda < CSHARP_PRECEDENCE.conditional);
        assert!(CSHARP_PRECEDENCE.conditional < p(BinaryOp::LogicalOr));
        assert!(p(BinaryOp::LogicalOr) < p(BinaryOp::LogicalAnd));
        assert!(p(BinaryOp::LogicalAnd) < p(BinaryOp::Equal));
        assert!(p(BinaryOp::Equal) < p(BinaryOp::LessThan));
        assert!(p(BinaryOp::LessThan) < p(BinaryOp::Add));
        assert!(p(BinaryOp::Add) < p(BinaryOp::Multiply));
        assert!(p(BinaryOp::Multiply) < CSHARP_PRECEDENCE.unary);
        assert!(CSHARP_PRECEDENCE.unary < CSHARP_PRECEDENCE.postfix);
    }

    #[test]
    fn test_lambda_binds_loosest() {
        let lambda = Expr::lambda(Vec::new(), Expr::number(1.0));
        let own = precedence_of(&CSHARP_PRECEDENCE, &lambda).unwrap();
        assert!(own < CSHARP_PRECEDENCE.conditional);
        assert!(own < CSHARP_PRECEDENCE.postfix);
    }

    #[test]
    fn test_convert_is_transparent() {
        let sum = Expr::binary(BinaryOp::Add, Expr::number(1.0), Expr::number(2.0), Type::Number);
        let converted = crate::backend::rewrite::convert_call(sum, Type::String);
        assert_eq!(precedence_of(&CSHARP_PRECEDENCE, &converted).unwrap(), 14);
    }
}
