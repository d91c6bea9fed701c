//! Expression traversal helpers.
//!
//! Rewrite passes rebuild trees with [`Expr::map_children`]; read-only scans (import collection, eventual-value
//! detection) use [`walk`].

use super::expr::{Expr, ExprKind, FunctionCall, ObjectItem, ObjectKey};

/// Visit `expr` and every sub-expression, parents before children, in source order.
pub fn walk<'e>(expr: &'e Expr, f: &mut impl FnMut(&'e Expr)) {
    f(expr);
    for child in expr.children() {
        walk(child, f);
    }
}

impl Expr {
    /// Direct sub-expressions in source order (object keys before their values).
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::ScopeTraversal { .. } => Vec::new(),
            ExprKind::Template(parts) | ExprKind::Tuple(parts) => parts.iter().collect(),
            ExprKind::Object(items) => items
                .iter()
                .flat_map(|item| {
                    let key = match &item.key {
                        ObjectKey::Dynamic(k) => Some(k),
                        ObjectKey::Named(_) => None,
                    };
                    key.into_iter().chain(std::iter::once(&item.value))
                })
                .collect(),
            ExprKind::RelativeTraversal { source, .. } | ExprKind::Splat { source, .. } => vec![source],
            ExprKind::Index { collection, key } => vec![collection, key],
            ExprKind::Conditional {
                condition,
                true_result,
                false_result,
            } => vec![condition, true_result, false_result],
            ExprKind::Binary { left, right, .. } => vec![left, right],
            ExprKind::Unary { operand, .. } => vec![operand],
            ExprKind::Call(call) => call.args.iter().collect(),
            ExprKind::Lambda { body, .. } => vec![body],
        }
    }

    /// Rebuild this expression with `f` applied to each direct sub-expression. Type and span are kept.
    pub fn map_children(self, f: &mut impl FnMut(Expr) -> Expr) -> Expr {
        let Expr { kind, ty, span } = self;
        let kind = match kind {
            ExprKind::Literal(_) | ExprKind::ScopeTraversal { .. } => kind,
            ExprKind::Template(parts) => ExprKind::Template(parts.into_iter().map(&mut *f).collect()),
            ExprKind::Tuple(elements) => ExprKind::Tuple(elements.into_iter().map(&mut *f).collect()),
            ExprKind::Object(items) => ExprKind::Object(
                items
                    .into_iter()
                    .map(|ObjectItem { key, value }| ObjectItem {
                        key: match key {
                            ObjectKey::Dynamic(k) => ObjectKey::Dynamic(f(k)),
                            named => named,
                        },
                        value: f(value),
                    })
                    .collect(),
            ),
            ExprKind::RelativeTraversal { source, steps } => ExprKind::RelativeTraversal {
                source: Box::new(f(*source)),
                steps,
            },
            ExprKind::Splat { source, each } => ExprKind::Splat {
                source: Box::new(f(*source)),
                each,
            },
            ExprKind::Index { collection, key } => ExprKind::Index {
                collection: Box::new(f(*collection)),
                key: Box::new(f(*key)),
            },
            ExprKind::Conditional {
                condition,
                true_result,
                false_result,
            } => ExprKind::Conditional {
                condition: Box::new(f(*condition)),
                true_result: Box::new(f(*true_result)),
                false_result: Box::new(f(*false_result)),
            },
            ExprKind::Binary { op, left, right } => ExprKind::Binary {
                op,
                left: Box::new(f(*left)),
                right: Box::new(f(*right)),
            },
            ExprKind::Unary { op, operand } => ExprKind::Unary {
                op,
                operand: Box::new(f(*operand)),
            },
            ExprKind::Call(FunctionCall { name, args, signature }) => ExprKind::Call(FunctionCall {
                name,
                args: args.into_iter().map(&mut *f).collect(),
                signature,
            }),
            ExprKind::Lambda { params, body } => ExprKind::Lambda {
                params,
                body: Box::new(f(*body)),
            },
        };
        Expr { kind, ty, span }
    }
}
