//! Desugar operations over eventual values into explicit `__apply` calls.
//!
//! An expression that mixes plain values with eventual (`Promise`/`Output`) sub-values cannot be evaluated directly
//! by the target runtime. This pass rewrites it into
//!
//! ```text
//! __apply(leaf1, leaf2, ..., (p1, p2, ...) => <expression over p1, p2, ...>)
//! ```
//!
//! extracting every eventual *leaf* into the argument list and rebuilding the rest of the expression as a
//! continuation over already-unwrapped values.
//!
//! ## Notes
//! - Lifting is driven by types: an expression is lifted when its own type is eventual and it is not a leaf.
//! - Leaves are traversals whose first eventual point is their final step (or their root, with no steps), and calls
//!   whose declared return type is eventual and whose evaluated arguments carry no eventual values.
//! - Boundaries are rewritten independently and never pulled into an enclosing continuation: lambda bodies, and call
//!   arguments whose declared parameter type is itself eventual (including the operands of an existing `__apply`).
//! - Arguments are deduplicated structurally (ignoring source spans). Parameter names come from the last attribute of
//!   the extracted traversal, else its root, else the called function's name.
//! - A parameter name never captures a variable the continuation still reads, nor a parameter of an enclosing lambda.
//! - `Promise` arguments are lifted with `__toOutput`, except `invoke` calls, which already render as tracked values.

use std::collections::BTreeSet;

use stackgen_core::lang::intrinsics::IntrinsicId;
use stackgen_core::strings::{clean_name, unique_name};

use super::{apply_call, to_output_call};
use crate::backend::namespaces::decompose_token;
use crate::ir::visit::walk;
use crate::ir::{Expr, ExprKind, FunctionCall, Parameter, Signature, SourceSpan, StepKey, TraversalStep, Type};

/// Rewrite every eventual expression in `expr` into explicit `__apply` form.
pub fn rewrite_applies(expr: Expr) -> Expr {
    rewrite_in_scope(expr, &BTreeSet::new())
}

/// `scope` holds the parameter names of the lambdas enclosing `expr`.
fn rewrite_in_scope(expr: Expr, scope: &BTreeSet<String>) -> Expr {
    if needs_lift(&expr) {
        return lift(expr, scope);
    }
    let Expr { kind, ty, span } = expr;
    match kind {
        ExprKind::Lambda { params, body } => {
            let inner = scope
                .iter()
                .cloned()
                .chain(params.iter().map(|p| p.name.clone()))
                .collect();
            Expr {
                kind: ExprKind::Lambda {
                    params,
                    body: Box::new(rewrite_in_scope(*body, &inner)),
                },
                ty,
                span,
            }
        }
        kind => Expr { kind, ty, span }.map_children(&mut |child| rewrite_in_scope(child, scope)),
    }
}

fn needs_lift(expr: &Expr) -> bool {
    expr.ty.is_eventual()
        && !matches!(expr.kind, ExprKind::Lambda { .. })
        && !is_eventual_leaf(expr)
        && reaches_eventual(expr)
}

/// Index of the first eventual point of a traversal: 0 for the root, `i + 1` for step `i`.
fn first_eventual_point(root_ty: &Type, steps: &[TraversalStep]) -> Option<usize> {
    if root_ty.is_eventual() {
        return Some(0);
    }
    steps.iter().position(|s| s.ty.is_eventual()).map(|i| i + 1)
}

fn is_eventual_leaf(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::ScopeTraversal { root_ty, steps, .. } => first_eventual_point(root_ty, steps) == Some(steps.len()),
        ExprKind::RelativeTraversal { source, steps } => {
            !source.ty.is_eventual()
                && !reaches_eventual(source)
                && steps
                    .iter()
                    .position(|s| s.ty.is_eventual())
                    .is_some_and(|i| i + 1 == steps.len())
        }
        ExprKind::Call(call) => is_leaf_call(expr, call),
        _ => false,
    }
}

fn is_boundary(signature: &Signature, index: usize, arg: &Expr) -> bool {
    matches!(arg.kind, ExprKind::Lambda { .. }) || signature.param_type(index).is_some_and(Type::is_eventual)
}

fn is_leaf_call(expr: &Expr, call: &FunctionCall) -> bool {
    expr.ty.is_eventual()
        && call.signature.return_type.is_eventual()
        && call
            .args
            .iter()
            .enumerate()
            .all(|(i, arg)| is_boundary(&call.signature, i, arg) || !reaches_eventual(arg))
}

/// Whether an eventual value is reachable from `expr` without crossing a boundary.
fn reaches_eventual(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Lambda { .. } => false,
        ExprKind::ScopeTraversal { root_ty, steps, .. } => first_eventual_point(root_ty, steps).is_some(),
        ExprKind::RelativeTraversal { source, steps } => {
            source.ty.is_eventual() || steps.iter().any(|s| s.ty.is_eventual()) || reaches_eventual(source)
        }
        ExprKind::Call(call) => {
            is_leaf_call(expr, call)
                || call
                    .args
                    .iter()
                    .enumerate()
                    .any(|(i, arg)| !is_boundary(&call.signature, i, arg) && reaches_eventual(arg))
        }
        _ => expr.children().into_iter().any(reaches_eventual),
    }
}

// ============================================================================
// Extraction
// ============================================================================

struct Extraction<'s> {
    args: Vec<Expr>,
    params: Vec<Parameter>,
    /// `args` with spans stripped, for structural deduplication.
    keys: Vec<Expr>,
    /// Enclosing lambda parameters.
    scope: &'s BTreeSet<String>,
    /// Names a new parameter must not take.
    reserved: BTreeSet<String>,
}

impl<'s> Extraction<'s> {
    fn new(expr: &Expr, scope: &'s BTreeSet<String>) -> Self {
        let mut reserved = scope.clone();
        kept_names(expr, &mut reserved);
        Self {
            args: Vec::new(),
            params: Vec::new(),
            keys: Vec::new(),
            scope,
            reserved,
        }
    }

    /// Bind `arg` to a continuation parameter, reusing the parameter of a structurally equal argument.
    fn bind(&mut self, arg: Expr, hint: &str) -> Parameter {
        let key = without_spans(arg.clone());
        if let Some(i) = self.keys.iter().position(|k| *k == key) {
            return self.params[i].clone();
        }

        let name = unique_name(&clean_name(hint), |candidate| {
            self.reserved.contains(candidate) || self.params.iter().any(|p| p.name == candidate)
        });
        let param = Parameter::new(name, arg.ty.resolve_eventuals());
        self.params.push(param.clone());
        self.args.push(arg);
        self.keys.push(key);
        param
    }
}

/// Collect the names `expr` still reads once its eventual leaves are extracted.
///
/// Boundaries stay in the continuation as written, so every name they mention is kept.
fn kept_names(expr: &Expr, names: &mut BTreeSet<String>) {
    match &expr.kind {
        ExprKind::Lambda { .. } => all_names(expr, names),
        ExprKind::ScopeTraversal { root, root_ty, steps } => {
            if first_eventual_point(root_ty, steps).is_none() {
                names.insert(root.clone());
            }
        }
        ExprKind::RelativeTraversal { source, steps } => {
            if !source.ty.is_eventual() && !steps.iter().any(|s| s.ty.is_eventual()) {
                kept_names(source, names);
            }
        }
        ExprKind::Call(call) if is_leaf_call(expr, call) => {}
        ExprKind::Call(call) => {
            for (i, arg) in call.args.iter().enumerate() {
                if is_boundary(&call.signature, i, arg) {
                    all_names(arg, names);
                } else {
                    kept_names(arg, names);
                }
            }
        }
        _ => {
            for child in expr.children() {
                kept_names(child, names);
            }
        }
    }
}

fn all_names(expr: &Expr, names: &mut BTreeSet<String>) {
    walk(expr, &mut |e| match &e.kind {
        ExprKind::ScopeTraversal { root, .. } => {
            names.insert(root.clone());
        }
        ExprKind::Lambda { params, .. } => names.extend(params.iter().map(|p| p.name.clone())),
        _ => {}
    });
}

fn without_spans(expr: Expr) -> Expr {
    let mut expr = expr.map_children(&mut without_spans);
    expr.span = None;
    expr
}

fn lift(expr: Expr, scope: &BTreeSet<String>) -> Expr {
    let span = expr.span.clone();
    let mut extraction = Extraction::new(&expr, scope);
    let body = extract(expr, &mut extraction);

    tracing::debug!(values = extraction.args.len(), "lifting eventual expression into __apply");
    let args = extraction.args.into_iter().map(lift_promise).collect();
    Expr {
        span,
        ..apply_call(args, extraction.params, body)
    }
}

fn lift_promise(arg: Expr) -> Expr {
    match &arg.ty {
        Type::Promise(inner) if arg.is_intrinsic(IntrinsicId::Invoke) => {
            let ty = Type::output((**inner).clone());
            arg.with_type(ty)
        }
        Type::Promise(_) => to_output_call(arg),
        _ => arg,
    }
}

/// Replace every eventual leaf reachable from `expr` with a reference to a continuation parameter.
fn extract(expr: Expr, ex: &mut Extraction) -> Expr {
    if matches!(expr.kind, ExprKind::Lambda { .. }) {
        return rewrite_in_scope(expr, ex.scope);
    }
    if let ExprKind::Call(call) = &expr.kind {
        if is_leaf_call(&expr, call) {
            let hint = call_hint(call);
            let span = expr.span.clone();
            let arg = rewrite_in_scope(expr, ex.scope);
            let param = ex.bind(arg, &hint);
            return reference(param, Vec::new(), span);
        }
    }

    let Expr { kind, ty, span } = expr;
    let resolved = ty.resolve_eventuals();
    match kind {
        ExprKind::ScopeTraversal { root, root_ty, steps } => match first_eventual_point(&root_ty, &steps) {
            None => Expr {
                kind: ExprKind::ScopeTraversal { root, root_ty, steps },
                ty,
                span,
            },
            Some(point) => {
                let mut prefix = steps;
                let rest = prefix.split_off(point);
                let hint = last_attr(&prefix).unwrap_or(root.as_str()).to_string();
                let arg = Expr {
                    span: span.clone(),
                    ..Expr::traversal(root, root_ty, prefix)
                };
                let param = ex.bind(arg, &hint);
                reference(param, rest, span)
            }
        },
        ExprKind::RelativeTraversal { source, steps } => {
            if source.ty.is_eventual() {
                let hint = expr_hint(&source);
                let arg = rewrite_in_scope(*source, ex.scope);
                let param = ex.bind(arg, &hint);
                reference(param, steps, span)
            } else if let Some(i) = steps.iter().position(|s| s.ty.is_eventual()) {
                let mut prefix = steps;
                let rest = prefix.split_off(i + 1);
                let hint = last_attr(&prefix).map_or_else(|| expr_hint(&source), str::to_string);
                let arg = Expr {
                    span: span.clone(),
                    ..Expr::relative(rewrite_in_scope(*source, ex.scope), prefix)
                };
                let param = ex.bind(arg, &hint);
                reference(param, rest, span)
            } else {
                Expr {
                    kind: ExprKind::RelativeTraversal {
                        source: Box::new(extract(*source, ex)),
                        steps: resolve_steps(steps),
                    },
                    ty: resolved,
                    span,
                }
            }
        }
        ExprKind::Call(FunctionCall { name, args, signature }) => {
            let args = args
                .into_iter()
                .enumerate()
                .map(|(i, arg)| {
                    if is_boundary(&signature, i, &arg) {
                        rewrite_in_scope(arg, ex.scope)
                    } else {
                        extract(arg, ex)
                    }
                })
                .collect();
            Expr {
                kind: ExprKind::Call(FunctionCall { name, args, signature }),
                ty: resolved,
                span,
            }
        }
        kind => Expr {
            kind,
            ty: resolved,
            span,
        }
        .map_children(&mut |child| extract(child, ex)),
    }
}

/// A traversal rooted at a continuation parameter.
fn reference(param: Parameter, rest: Vec<TraversalStep>, span: Option<SourceSpan>) -> Expr {
    Expr {
        span,
        ..Expr::traversal(param.name, param.ty, resolve_steps(rest))
    }
}

fn resolve_steps(steps: Vec<TraversalStep>) -> Vec<TraversalStep> {
    steps
        .into_iter()
        .map(|s| TraversalStep {
            ty: s.ty.resolve_eventuals(),
            key: s.key,
        })
        .collect()
}

fn last_attr(steps: &[TraversalStep]) -> Option<&str> {
    steps.iter().rev().find_map(|s| match &s.key {
        StepKey::Attr(name) => Some(name.as_str()),
        StepKey::Index(_) => None,
    })
}

fn expr_hint(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::ScopeTraversal { root, steps, .. } => last_attr(steps).unwrap_or(root.as_str()).to_string(),
        ExprKind::RelativeTraversal { source, steps } => {
            last_attr(steps).map_or_else(|| expr_hint(source), str::to_string)
        }
        ExprKind::Call(call) => call_hint(call),
        _ => "arg".to_string(),
    }
}

fn call_hint(call: &FunctionCall) -> String {
    if call.intrinsic() == Some(IntrinsicId::Invoke) {
        let member = call
            .args
            .first()
            .and_then(Expr::as_string_literal)
            .and_then(decompose_token)
            .map(|(_, _, member)| member);
        if let Some(member) = member {
            return member.to_string();
        }
    }
    match call.name.trim_start_matches('_') {
        "" => "arg".to_string(),
        name => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket_ty() -> Type {
        Type::object([
            ("id", Type::output(Type::String)),
            ("arn", Type::output(Type::String)),
        ])
    }

    fn bucket_attr(bucket: &str, attr: &str) -> Expr {
        Expr::traversal(
            bucket,
            bucket_ty(),
            vec![TraversalStep::attr(attr, Type::output(Type::String))],
        )
    }

    fn apply_parts(expr: &Expr) -> (&[Expr], &[Parameter], &Expr) {
        let call = expr.as_call().expect("expected a call");
        assert_eq!(call.name, "__apply");
        let (then, args) = call.args.split_last().expect("apply has a continuation");
        let ExprKind::Lambda { params, body } = &then.kind else {
            panic!("continuation is not a lambda");
        };
        (args, params, body)
    }

    #[test]
    fn test_leaf_traversal_is_untouched() {
        let expr = bucket_attr("siteBucket", "id");
        assert_eq!(rewrite_applies(expr.clone()), expr);
    }

    #[test]
    fn test_plain_expression_is_untouched() {
        let expr = Expr::template(vec![Expr::string("a"), Expr::variable("x", Type::String)]);
        assert_eq!(rewrite_applies(expr.clone()), expr);
    }

    #[test]
    fn test_single_leaf_template() {
        let expr = Expr::template(vec![
            Expr::string("arn:aws:s3:::"),
            bucket_attr("siteBucket", "id"),
            Expr::string("/*"),
        ]);
        let rewritten = rewrite_applies(expr);
        assert_eq!(rewritten.ty, Type::output(Type::String));

        let (args, params, body) = apply_parts(&rewritten);
        assert_eq!(args, &[bucket_attr("siteBucket", "id")]);
        assert_eq!(params, &[Parameter::new("id", Type::String)]);
        let ExprKind::Template(parts) = &body.kind else {
            panic!("body should stay a template");
        };
        assert_eq!(parts[1], Expr::variable("id", Type::String));
        assert_eq!(body.ty, Type::String);
    }

    #[test]
    fn test_two_leaves_keep_source_order() {
        let expr = Expr::template(vec![bucket_attr("a", "arn"), bucket_attr("b", "id")]);
        let rewritten = rewrite_applies(expr);
        let (args, params, _) = apply_parts(&rewritten);
        assert_eq!(args, &[bucket_attr("a", "arn"), bucket_attr("b", "id")]);
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["arn", "id"]);
    }

    #[test]
    fn test_duplicate_leaves_share_a_parameter() {
        let first = bucket_attr("a", "id").with_span(SourceSpan::new("main.pp", (1, 1), (1, 5)));
        let second = bucket_attr("a", "id").with_span(SourceSpan::new("main.pp", (2, 1), (2, 5)));
        let rewritten = rewrite_applies(Expr::template(vec![first, second]));
        let (args, params, _) = apply_parts(&rewritten);
        assert_eq!(args.len(), 1);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_parameter_names_made_unique() {
        let expr = Expr::template(vec![bucket_attr("a", "id"), bucket_attr("b", "id")]);
        let rewritten = rewrite_applies(expr);
        let (_, params, _) = apply_parts(&rewritten);
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["id", "id2"]);
    }

    #[test]
    fn test_parameter_does_not_capture_a_kept_variable() {
        let expr = Expr::template(vec![
            bucket_attr("bucket", "id"),
            Expr::string("-"),
            Expr::variable("id", Type::String),
        ]);
        let rewritten = rewrite_applies(expr);
        let (_, params, body) = apply_parts(&rewritten);
        assert_eq!(params, &[Parameter::new("id2", Type::String)]);
        let ExprKind::Template(parts) = &body.kind else {
            panic!("body should stay a template");
        };
        assert_eq!(parts[0], Expr::variable("id2", Type::String));
        assert_eq!(parts[2], Expr::variable("id", Type::String));
    }

    #[test]
    fn test_parameter_does_not_shadow_an_enclosing_lambda_parameter() {
        let inner = Expr::template(vec![Expr::string("x-"), bucket_attr("a", "id")]);
        let lambda = Expr::lambda(vec![Parameter::new("id", Type::String)], inner);
        let rewritten = rewrite_applies(lambda);
        let ExprKind::Lambda { body, .. } = &rewritten.kind else {
            panic!("lambda should stay a lambda");
        };
        let (_, params, _) = apply_parts(body);
        assert_eq!(params[0].name, "id2");
    }

    #[test]
    fn test_eventual_root_with_steps_lifts_the_root() {
        let vpc_ty = Type::output(Type::object([("id", Type::String)]));
        let expr = Expr::traversal(
            "vpc",
            vpc_ty.clone(),
            vec![TraversalStep::attr("id", Type::output(Type::String))],
        );
        let rewritten = rewrite_applies(expr);
        let (args, params, body) = apply_parts(&rewritten);
        assert_eq!(args, &[Expr::variable("vpc", vpc_ty)]);
        assert_eq!(params[0].name, "vpc");
        assert_eq!(
            *body,
            Expr::traversal(
                "vpc",
                Type::object([("id", Type::String)]),
                vec![TraversalStep::attr("id", Type::String)]
            )
        );
    }

    #[test]
    fn test_promise_argument_is_lifted_to_output() {
        let zones_ty = Type::promise(Type::object([("names", Type::list(Type::String))]));
        let expr = Expr::traversal(
            "zones",
            zones_ty,
            vec![TraversalStep::attr("names", Type::promise(Type::list(Type::String)))],
        );
        let rewritten = rewrite_applies(expr);
        let (args, _, _) = apply_parts(&rewritten);
        assert!(args[0].is_intrinsic(IntrinsicId::ToOutput));
        assert!(args[0].ty.is_output());
    }

    #[test]
    fn test_lambda_body_rewritten_independently() {
        let inner = Expr::template(vec![bucket_attr("a", "id")]);
        let lambda = Expr::lambda(vec![Parameter::new("x", Type::String)], inner);
        let rewritten = rewrite_applies(lambda);
        let ExprKind::Lambda { body, .. } = &rewritten.kind else {
            panic!("lambda should stay a lambda");
        };
        assert!(body.is_intrinsic(IntrinsicId::Apply));
    }

    #[test]
    fn test_non_eventual_container_rewrites_children() {
        let object = Expr::object([
            ("bucket", bucket_attr("b", "id")),
            ("name", Expr::template(vec![Expr::string("x-"), bucket_attr("b", "arn")])),
        ]);
        let rewritten = rewrite_applies(object);
        let ExprKind::Object(items) = &rewritten.kind else {
            panic!("object should stay an object");
        };
        assert_eq!(items[0].value, bucket_attr("b", "id"));
        assert!(items[1].value.is_intrinsic(IntrinsicId::Apply));
    }

    #[test]
    fn test_existing_apply_is_a_leaf() {
        let body = Expr::variable("id", Type::String);
        let apply = apply_call(
            vec![bucket_attr("a", "id")],
            vec![Parameter::new("id", Type::String)],
            body,
        );
        assert_eq!(rewrite_applies(apply.clone()), apply);
    }

    #[test]
    fn test_call_hint_uses_invoke_member() {
        let call = FunctionCall {
            name: "invoke".to_string(),
            args: vec![Expr::string("aws:ec2/getVpc:getVpc")],
            signature: Signature {
                params: vec![Parameter::new("token", Type::String)],
                variadic: None,
                return_type: Type::promise(Type::Dynamic),
            },
        };
        assert_eq!(call_hint(&call), "getVpc");
    }
}
