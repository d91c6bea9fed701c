//! Literals and string templates.

use super::super::precedence::CSHARP_PRECEDENCE;
use super::super::{EmitError, Emitter};
use crate::ir::{Expr, ExprKind, Literal, Type};

pub(super) fn print_literal(literal: &Literal, expr: &Expr) -> Result<String, EmitError> {
    let ty = expr.ty.strip_wrappers();
    if !ty.is_primitive() && *ty != Type::Dynamic {
        return Err(EmitError::NonPrimitiveLiteral {
            ty: expr.ty.clone(),
            span: expr.span.clone(),
        });
    }
    Ok(match literal {
        Literal::Bool(b) => b.to_string(),
        Literal::Number(n) => format_number(*n),
        Literal::String(s) => quote_string(s),
    })
}

/// Format a number literal.
///
/// Values exactly representable as `i64` print as integers (`8080`, never `8080.0`); anything else prints as the
/// shorter of its shortest round-trip decimal and exponent forms.
///
/// ## Examples
/// ```rust,ignore
/// assert_eq!(format_number(8080.0), "8080");
/// assert_eq!(format_number(0.5), "0.5");
/// assert_eq!(format_number(1e-7), "1e-7");
/// ```
pub(super) fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "double.NaN".to_string();
    }
    if value.is_infinite() {
        let name = if value > 0.0 { "PositiveInfinity" } else { "NegativeInfinity" };
        return format!("double.{name}");
    }
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        return (value as i64).to_string();
    }

    let decimal = value.to_string();
    let exponent = format!("{value:e}");
    if exponent.len() < decimal.len() { exponent } else { decimal }
}

/// Quote a string as a C# literal: verbatim (`@"..."`) when it spans lines, regular otherwise.
pub(in crate::backend::emit) fn quote_string(s: &str) -> String {
    if s.contains('\n') {
        format!("@\"{}\"", escape_fragment(s, true, false))
    } else {
        format!("\"{}\"", escape_fragment(s, false, false))
    }
}

/// Escape one literal fragment for a regular or verbatim string, doubling braces when it is interpolated.
fn escape_fragment(s: &str, verbatim: bool, interpolated: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' if verbatim => out.push_str("\"\""),
            '"' => out.push_str("\\\""),
            '\\' if !verbatim => out.push_str("\\\\"),
            '\r' if !verbatim => out.push_str("\\r"),
            '\t' if !verbatim => out.push_str("\\t"),
            '\0' if !verbatim => out.push_str("\\0"),
            // C# line terminators end a regular literal
            '\u{85}' | '\u{2028}' | '\u{2029}' if !verbatim => out.push_str(&format!("\\u{:04X}", c as u32)),
            c if !verbatim && c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            '{' if interpolated => out.push_str("{{"),
            '}' if interpolated => out.push_str("}}"),
            c => out.push(c),
        }
    }
    out
}

fn fragment(part: &Expr) -> Option<&str> {
    match &part.kind {
        ExprKind::Literal(Literal::String(s)) => Some(s),
        _ => None,
    }
}

impl<'a> Emitter<'a> {
    /// Print a template as a (possibly interpolated, possibly verbatim) string literal.
    ///
    /// Holes print at the precedence just above a conditional, so `a ? b : c` inside a hole is parenthesized.
    pub(super) fn print_template(&mut self, parts: &[Expr], level: usize) -> Result<String, EmitError> {
        let verbatim = parts.iter().filter_map(fragment).any(|s| s.contains('\n'));
        let interpolated = parts.iter().any(|p| fragment(p).is_none());

        let mut body = String::new();
        for part in parts {
            match fragment(part) {
                Some(s) => body.push_str(&escape_fragment(s, verbatim, interpolated)),
                None => {
                    let hole = self.print_expr(part, CSHARP_PRECEDENCE.conditional + 1, level)?;
                    body.push('{');
                    body.push_str(&hole);
                    body.push('}');
                }
            }
        }

        let prefix = match (interpolated, verbatim) {
            (true, true) => "$@",
            (true, false) => "$",
            (false, true) => "@",
            (false, false) => "",
        };
        Ok(format!("{prefix}\"{body}\""))
    }
}
