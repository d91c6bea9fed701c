//! Traversals and splats.
//!
//! Attribute steps become title-cased member accesses (`.WebsiteEndpoint`), index steps become element accesses
//! (`[0]`). A step taken on an optional receiver is guarded with `?`.

use super::super::precedence::CSHARP_PRECEDENCE;
use super::super::{EmitError, Emitter, property_name};
use crate::ir::{Expr, StepKey, TraversalStep, Type};

/// Append `steps` to an already-printed receiver of type `receiver_ty`.
pub(super) fn print_steps(receiver: String, receiver_ty: &Type, steps: &[TraversalStep]) -> String {
    let mut out = receiver;
    let mut current = receiver_ty;
    for step in steps {
        if current.is_optional() {
            out.push('?');
        }
        match &step.key {
            StepKey::Attr(name) => {
                out.push('.');
                out.push_str(&property_name(name));
            }
            StepKey::Index(i) => out.push_str(&format!("[{i}]")),
        }
        current = &step.ty;
    }
    out
}

fn element_type(ty: &Type) -> &Type {
    match ty.strip_wrappers() {
        Type::List(t) => t,
        other => other,
    }
}

impl<'a> Emitter<'a> {
    /// `source.Select(__item => __item.Steps)`; a splat without steps is its source.
    pub(super) fn print_splat(
        &mut self,
        source: &Expr,
        each: &[TraversalStep],
        level: usize,
    ) -> Result<String, EmitError> {
        let receiver = self.print_expr(source, CSHARP_PRECEDENCE.postfix, level)?;
        if each.is_empty() {
            return Ok(receiver);
        }
        let projection = print_steps("__item".to_string(), element_type(&source.ty), each);
        Ok(format!("{receiver}.Select(__item => {projection})"))
    }
}
