//! Function calls and the intrinsic dispatch table.
//!
//! Every call whose name is a known intrinsic is rendered by a fixed C# rule; any other name becomes a placeholder
//! carrying the name and source position. The `using` directives each rule needs are collected separately, see
//! `program.rs`.
//!
//! ## Notes
//! - Argument counts are checked against the intrinsic registry first; a count outside the declared range is a
//!   fatal invariant violation.
//! - `__apply` renders as `x.Apply(f)` for one value and `Output.Tuple(a, b, ...).Apply(f)` for two to eight. The
//!   runtime's tuple combinator has no wider overload, so more values give a placeholder.

use stackgen_core::lang::intrinsics::{self, IntrinsicId};

use super::super::precedence::CSHARP_PRECEDENCE;
use super::super::{EmitError, Emitter};
use super::ANY;
use crate::backend::namespaces::resolve_function;
use crate::diagnostics::Diagnostic;
use crate::ir::{Expr, ExprKind, FunctionCall, Type};

/// Widest `Output.Tuple` overload.
const MAX_TUPLE_ARITY: usize = 8;

impl<'a> Emitter<'a> {
    pub(super) fn print_call(&mut self, expr: &Expr, call: &FunctionCall, level: usize) -> Result<String, EmitError> {
        let Some(id) = call.intrinsic() else {
            let reason = match &expr.span {
                Some(span) => format!("FunctionCallExpression: {} ({span})", call.name),
                None => format!("FunctionCallExpression: {}", call.name),
            };
            return Ok(self.placeholder(reason, expr.span.as_ref()));
        };

        let info = intrinsics::info_for(id);
        if !info.accepts(call.args.len()) {
            return Err(EmitError::IntrinsicArity {
                name: info.canonical,
                found: call.args.len(),
                span: expr.span.clone(),
            });
        }

        let args = &call.args;
        let postfix = CSHARP_PRECEDENCE.postfix;
        Ok(match id {
            IntrinsicId::Apply => self.print_apply(expr, args, level)?,
            // precedence was already taken from the wrapped value
            IntrinsicId::Convert => self.print_bare(&args[0], level)?,
            IntrinsicId::Await => format!("await {}", self.print_expr(&args[0], CSHARP_PRECEDENCE.suspend, level)?),
            IntrinsicId::Constructor => self.print_constructor(args, level)?,
            IntrinsicId::ToOutput => format!("Output.Create({})", self.print_expr(&args[0], ANY, level)?),
            IntrinsicId::Entries => self.print_entries(expr, &args[0], level)?,
            IntrinsicId::FileArchive => format!("new FileArchive({})", self.print_expr(&args[0], ANY, level)?),
            IntrinsicId::FileAsset => format!("new FileAsset({})", self.print_expr(&args[0], ANY, level)?),
            IntrinsicId::Invoke => self.print_invoke(expr, args, level)?,
            IntrinsicId::Length => format!("{}.Length", self.print_expr(&args[0], postfix, level)?),
            IntrinsicId::Split => {
                let source = self.print_expr(&args[1], postfix, level)?;
                let separator = self.print_expr(&args[0], ANY, level)?;
                format!("{source}.Split({separator})")
            }
            IntrinsicId::ReadFile => format!("File.ReadAllText({})", self.print_expr(&args[0], ANY, level)?),
            IntrinsicId::ReadDir => format!(
                "Directory.GetFiles({}).Select(Path.GetFileName)",
                self.print_expr(&args[0], ANY, level)?
            ),
            IntrinsicId::ToJson => format!("JsonSerializer.Serialize({})", self.print_expr(&args[0], ANY, level)?),
            IntrinsicId::Element | IntrinsicId::Lookup | IntrinsicId::Range => {
                self.placeholder(info.canonical, expr.span.as_ref())
            }
        })
    }

    fn print_apply(&mut self, expr: &Expr, args: &[Expr], level: usize) -> Result<String, EmitError> {
        let malformed = |reason: String| EmitError::MalformedApply {
            reason,
            span: expr.span.clone(),
        };
        let Some((then, values)) = args.split_last() else {
            return Err(malformed("missing continuation".to_string()));
        };
        let ExprKind::Lambda { params, body } = &then.kind else {
            return Err(malformed("continuation is not an anonymous function".to_string()));
        };
        if params.len() != values.len() {
            return Err(malformed(format!(
                "continuation takes {} parameter(s) for {} value(s)",
                params.len(),
                values.len()
            )));
        }

        match values {
            [] => Ok(format!("Output.Create({})", self.print_expr(body, ANY, level)?)),
            [value] => {
                let receiver = if value.ty.is_eventual() {
                    self.print_expr(value, CSHARP_PRECEDENCE.postfix, level)?
                } else {
                    format!("Output.Create({})", self.print_expr(value, ANY, level)?)
                };
                let then = self.print_expr(then, ANY, level)?;
                Ok(format!("{receiver}.Apply({then})"))
            }
            _ if values.len() > MAX_TUPLE_ARITY => {
                Ok(self.placeholder(format!("apply over {} values", values.len()), expr.span.as_ref()))
            }
            _ => {
                let values = values
                    .iter()
                    .map(|v| self.print_expr(v, ANY, level))
                    .collect::<Result<Vec<_>, _>>()?;
                let then = self.print_expr(then, ANY, level)?;
                Ok(format!("Output.Tuple({}).Apply({then})", values.join(", ")))
            }
        }
    }

    fn print_constructor(&mut self, args: &[Expr], level: usize) -> Result<String, EmitError> {
        let name = args[0]
            .as_string_literal()
            .ok_or_else(|| EmitError::Invariant("constructor type name is not a string literal".to_string()))?
            .to_string();
        let init = self.print_expr(&args[1], ANY, level)?;
        let head = if name.is_empty() { "new".to_string() } else { format!("new {name}") };
        Ok(if init.starts_with('\n') {
            format!("{head}{init}")
        } else {
            format!("{head} {init}")
        })
    }

    fn print_entries(&mut self, expr: &Expr, collection: &Expr, level: usize) -> Result<String, EmitError> {
        if collection.is_intrinsic(IntrinsicId::Range) {
            return Ok(self.placeholder("entries over range", expr.span.as_ref()));
        }
        match &collection.ty {
            Type::List(_) | Type::Tuple(_) => {
                let source = self.print_expr(collection, CSHARP_PRECEDENCE.postfix, level)?;
                Ok(format!("{source}.Select((v, k) => new {{ Key = k, Value = v }})"))
            }
            Type::Map(_) | Type::Object(_) => Ok(self.placeholder("MapOrObjectEntries", expr.span.as_ref())),
            other => Ok(self.placeholder(format!("entries over {other}"), expr.span.as_ref())),
        }
    }

    /// `Output.Create(Ns.Mod.Fn.InvokeAsync(args[, options]))`.
    fn print_invoke(&mut self, expr: &Expr, args: &[Expr], level: usize) -> Result<String, EmitError> {
        let Some(token) = args[0].as_string_literal() else {
            self.report(
                Diagnostic::error("invoke requires a literal function token").with_span(expr.span.clone()),
            );
            return Ok(self.placeholder("invoke with a computed token", expr.span.as_ref()));
        };

        let span = args[0].span.as_ref().or(expr.span.as_ref());
        let (name, diagnostic) = resolve_function(token, self.namespaces, span);
        if let Some(diagnostic) = diagnostic {
            self.report(diagnostic);
        }

        let mut call_args = match args.get(1) {
            Some(arguments) => self.print_expr(arguments, ANY, level)?,
            None => String::new(),
        };
        if let Some(options) = args.get(2) {
            call_args.push_str(", ");
            call_args.push_str(&self.print_expr(options, ANY, level)?);
        }
        Ok(format!("Output.Create({}.InvokeAsync({call_args}))", name.qualified()))
    }
}
