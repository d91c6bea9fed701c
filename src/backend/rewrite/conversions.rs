//! Conversion insertion.
//!
//! Resource inputs carry the destination type declared by the resource schema. When the supplied value's type
//! differs from it by a safe conversion, the value is wrapped in `__convert` so later passes and the printer see an
//! explicit conversion instead of having to compare types.
//!
//! ## Notes
//! - Object, tuple and conditional expressions are descended into first, so nested values are converted against
//!   their own declared property/element types.
//! - `dynamic` destinations accept anything and never get a marker.

use super::convert_call;
use crate::ir::{Conversion, Expr, ExprKind, ObjectItem, ObjectKey, Type};

/// Insert `__convert` markers into `expr` for destination type `to`.
pub fn insert_conversions(expr: Expr, to: &Type) -> Expr {
    let Expr { kind, ty, span } = expr;
    let kind = match kind {
        ExprKind::Object(items) => ExprKind::Object(
            items
                .into_iter()
                .map(|ObjectItem { key, value }| {
                    let dest = match &key {
                        ObjectKey::Named(name) => to.property(name),
                        ObjectKey::Dynamic(_) => map_element(to),
                    };
                    let value = match dest {
                        Some(dest) => insert_conversions(value, dest),
                        None => value,
                    };
                    ObjectItem { key, value }
                })
                .collect(),
        ),
        ExprKind::Tuple(elements) => ExprKind::Tuple(
            elements
                .into_iter()
                .enumerate()
                .map(|(i, element)| match sequence_element(to, i) {
                    Some(dest) => insert_conversions(element, dest),
                    None => element,
                })
                .collect(),
        ),
        ExprKind::Conditional {
            condition,
            true_result,
            false_result,
        } => ExprKind::Conditional {
            condition,
            true_result: Box::new(insert_conversions(*true_result, to)),
            false_result: Box::new(insert_conversions(*false_result, to)),
        },
        other => other,
    };

    let expr = Expr { kind, ty, span };
    if expr.ty != *to && *to != Type::Dynamic && to.conversion_from(&expr.ty) == Conversion::Safe {
        tracing::debug!(from = %expr.ty, to = %to, "inserting conversion");
        convert_call(expr, to.clone())
    } else {
        expr
    }
}

fn map_element(to: &Type) -> Option<&Type> {
    match to.strip_wrappers() {
        Type::Map(t) => Some(t),
        _ => None,
    }
}

fn sequence_element(to: &Type, index: usize) -> Option<&Type> {
    match to.strip_wrappers() {
        Type::List(t) => Some(t),
        Type::Tuple(ts) => ts.get(index),
        _ => None,
    }
}
