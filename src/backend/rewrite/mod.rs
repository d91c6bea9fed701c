//! Expression rewrites applied before printing.
//!
//! Every expression the node emitter prints first goes through [`process_expression`], which runs three ordered
//! passes:
//!
//! 1. [`conversions`]: wrap values whose type differs from the declared destination by a safe conversion in
//!    `__convert`, so the printer never needs type knowledge.
//! 2. [`applies`]: desugar operations over eventual values into explicit `__apply` calls.
//! 3. [`constructors`]: wrap argument-bundle objects in `__constructor` calls naming the type to instantiate.
//!
//! ## Notes
//! - Passes are pure tree transforms: they take an [`Expr`] by value and return the rebuilt tree.
//! - The constructor type name is threaded through the constructor pass as an explicit parameter.
//!
//! ## See also
//! - `emit/`: prints the rewritten trees

mod applies;
mod constructors;
mod conversions;

pub use applies::rewrite_applies;
pub use constructors::{annotate_constructors, property_context};
pub use conversions::insert_conversions;

use stackgen_core::lang::intrinsics::{self, IntrinsicId};

use super::namespaces::NamespaceMetadata;
use crate::ir::{Expr, Parameter, Signature, Type};

/// Run the full rewrite pipeline over one expression.
///
/// ## Parameters
/// - `expr`: the expression to rewrite.
/// - `declared`: destination type from the resource schema, if the expression is a resource input.
/// - `context`: type name for argument-bundle objects (empty for anonymous objects).
/// - `metadata`: namespace metadata, used to name `invoke` argument types.
pub fn process_expression(
    expr: Expr,
    declared: Option<&Type>,
    context: &str,
    metadata: &dyn NamespaceMetadata,
) -> Expr {
    let expr = match declared {
        Some(to) => insert_conversions(expr, to),
        None => expr,
    };
    let expr = rewrite_applies(expr);
    annotate_constructors(expr, context, metadata)
}

// ============================================================================
// Intrinsic call builders
// ============================================================================

fn intrinsic_call(id: IntrinsicId, args: Vec<Expr>, params: Vec<Parameter>, return_type: Type) -> Expr {
    Expr::call(
        intrinsics::as_str(id),
        args,
        Signature {
            params,
            variadic: None,
            return_type,
        },
    )
}

/// `__convert(value)` typed as `to`.
pub fn convert_call(value: Expr, to: Type) -> Expr {
    let span = value.span.clone();
    let call = intrinsic_call(
        IntrinsicId::Convert,
        vec![value],
        vec![Parameter::new("value", to.clone())],
        to,
    );
    Expr { span, ..call }
}

/// `__constructor(name, object)`.
pub fn constructor_call(type_name: &str, object: Expr) -> Expr {
    let ty = object.ty.clone();
    let span = object.span.clone();
    let call = intrinsic_call(
        IntrinsicId::Constructor,
        vec![Expr::string(type_name), object],
        vec![Parameter::new("type", Type::String), Parameter::new("value", ty.clone())],
        ty,
    );
    Expr { span, ..call }
}

/// `__toOutput(promise)`; non-promises are returned unchanged.
pub fn to_output_call(value: Expr) -> Expr {
    let Type::Promise(inner) = &value.ty else {
        return value;
    };
    let inner = (**inner).clone();
    let span = value.span.clone();
    let param = Parameter::new("value", value.ty.clone());
    let call = intrinsic_call(IntrinsicId::ToOutput, vec![value], vec![param], Type::output(inner));
    Expr { span, ..call }
}

/// `__await(promise)`; non-promises are returned unchanged.
pub fn await_call(value: Expr) -> Expr {
    let Type::Promise(inner) = &value.ty else {
        return value;
    };
    let inner = (**inner).clone();
    let span = value.span.clone();
    let param = Parameter::new("value", value.ty.clone());
    let call = intrinsic_call(IntrinsicId::Await, vec![value], vec![param], inner);
    Expr { span, ..call }
}

/// `entries(collection)`: a list of `{ key, value }` objects.
pub fn entries_call(collection: Expr) -> Expr {
    let element = match collection.ty.strip_wrappers() {
        Type::List(t) | Type::Map(t) => (**t).clone(),
        _ => Type::Dynamic,
    };
    let key = match collection.ty.strip_wrappers() {
        Type::Map(_) | Type::Object(_) => Type::String,
        _ => Type::Number,
    };
    let span = collection.span.clone();
    let param = Parameter::new("collection", collection.ty.clone());
    let call = intrinsic_call(
        IntrinsicId::Entries,
        vec![collection],
        vec![param],
        Type::list(Type::object([("key", key), ("value", element)])),
    );
    Expr { span, ..call }
}

/// `__apply(args..., (params) => body)` typed `Output<resolved body type>`.
pub fn apply_call(args: Vec<Expr>, params: Vec<Parameter>, body: Expr) -> Expr {
    let return_type = Type::output(body.ty.resolve_eventuals());
    let mut signature_params: Vec<Parameter> = params
        .iter()
        .zip(&args)
        .map(|(p, arg)| Parameter::new(p.name.clone(), arg.ty.clone()))
        .collect();
    signature_params.push(Parameter::new("then", Type::Dynamic));

    let mut args = args;
    args.push(Expr::lambda(params, body));
    intrinsic_call(IntrinsicId::Apply, args, signature_params, return_type)
}
