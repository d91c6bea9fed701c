//! Constructor annotation.
//!
//! Object literals with named keys are argument bundles: in C# they become `new SomeArgs { ... }`. This pass wraps
//! each of them in `__constructor(typeName, object)` so the printer knows which type to instantiate.
//!
//! ## Notes
//! - The type name is an explicit parameter of the traversal. It changes when entering the arguments of `invoke`
//!   (the function's `<Qualified>Args` type) or `toJSON` (anonymous objects), and when descending into a named
//!   property (`BucketArgs` + `website` gives `BucketWebsiteArgs`).
//! - Raw maps are never wrapped: objects with dynamic keys, and objects typed or converted to `map(T)`.
//! - Objects are wrapped after their children (post-order).

use stackgen_core::lang::intrinsics::IntrinsicId;
use stackgen_core::strings::title;

use super::constructor_call;
use crate::backend::namespaces::{NamespaceMetadata, resolve_function};
use crate::ir::{Expr, ExprKind, FunctionCall, ObjectItem, ObjectKey, Type};

/// Wrap argument-bundle objects in `expr` with `__constructor` calls, naming them from `context`.
///
/// An empty `context` produces anonymous objects (`new { ... }`).
pub fn annotate_constructors(expr: Expr, context: &str, metadata: &dyn NamespaceMetadata) -> Expr {
    if matches!(expr.kind, ExprKind::Object(_)) {
        return annotate_object(expr, context, metadata);
    }

    match expr.as_call().and_then(FunctionCall::intrinsic) {
        Some(IntrinsicId::Constructor) => expr,
        Some(IntrinsicId::Invoke) => annotate_invoke(expr, metadata),
        Some(IntrinsicId::ToJson) => expr.map_children(&mut |arg| annotate_constructors(arg, "", metadata)),
        Some(IntrinsicId::Convert) if is_map(&expr.ty) => {
            let ty = expr.ty.resolve_eventuals();
            expr.map_children(&mut |arg| {
                let arg = match arg.kind {
                    ExprKind::Object(_) => arg.with_type(ty.clone()),
                    _ => arg,
                };
                annotate_constructors(arg, context, metadata)
            })
        }
        _ => expr.map_children(&mut |child| annotate_constructors(child, context, metadata)),
    }
}

fn is_map(ty: &Type) -> bool {
    matches!(ty.strip_wrappers(), Type::Map(_))
}

fn annotate_object(expr: Expr, context: &str, metadata: &dyn NamespaceMetadata) -> Expr {
    let Expr { kind, ty, span } = expr;
    let ExprKind::Object(items) = kind else {
        return Expr { kind, ty, span };
    };

    let raw_map = is_map(&ty) || items.iter().any(|item| matches!(item.key, ObjectKey::Dynamic(_)));
    let items = items
        .into_iter()
        .map(|ObjectItem { key, value }| match key {
            ObjectKey::Named(name) if !raw_map => {
                let value = annotate_constructors(value, &property_context(context, &name), metadata);
                ObjectItem {
                    key: ObjectKey::Named(name),
                    value,
                }
            }
            ObjectKey::Named(name) => ObjectItem {
                key: ObjectKey::Named(name),
                value: annotate_constructors(value, context, metadata),
            },
            ObjectKey::Dynamic(k) => ObjectItem {
                key: ObjectKey::Dynamic(annotate_constructors(k, context, metadata)),
                value: annotate_constructors(value, context, metadata),
            },
        })
        .collect();

    let object = Expr {
        kind: ExprKind::Object(items),
        ty,
        span,
    };
    if raw_map {
        object
    } else {
        constructor_call(context, object)
    }
}

/// Type name for an object nested under property `property` of a `context` object.
pub fn property_context(context: &str, property: &str) -> String {
    if context.is_empty() {
        return String::new();
    }
    let base = context.strip_suffix("Args").unwrap_or(context);
    format!("{base}{}Args", title(property))
}

/// `invoke(token, args, options)`: `args` is the function's argument type, `options` is `InvokeOptions`.
fn annotate_invoke(expr: Expr, metadata: &dyn NamespaceMetadata) -> Expr {
    let args_type = expr
        .as_call()
        .and_then(|call| call.args.first())
        .and_then(Expr::as_string_literal)
        .map(|token| format!("{}Args", resolve_function(token, metadata, None).0.qualified()))
        .unwrap_or_default();

    let mut position = 0;
    expr.map_children(&mut |arg| {
        let context = match position {
            1 => args_type.as_str(),
            2 => "InvokeOptions",
            _ => "",
        };
        position += 1;
        annotate_constructors(arg, context, metadata)
    })
}
