//! Print rewritten IR expressions as C# expression text.
//!
//! ## Module organization
//!
//! - [`literals`]: literals, strings and interpolated templates
//! - [`traversals`]: scope/relative traversals, indexing and splats
//! - [`intrinsics`]: function calls and the intrinsic dispatch table
//!
//! Objects, tuples, operators and anonymous functions are printed here.
//!
//! ## Notes
//! - Every printer takes the *required* precedence of its position and the indentation level multi-line fragments
//!   (object initializers, lambda blocks) are rendered at. An expression whose own precedence is lower than required
//!   is parenthesized.
//! - Binary operators are left-associative: the left operand prints at the operator's precedence, the right operand
//!   one higher.

mod intrinsics;
mod literals;
mod traversals;

pub(super) use literals::quote_string;

use stackgen_core::lang::operators::UnaryOp;
use stackgen_core::lang::precedence::Precedence;
use stackgen_core::strings::unique_name;

use super::precedence::{CSHARP_PRECEDENCE, precedence_of};
use super::{EmitError, Emitter, csharp_identifier, property_name};
use crate::ir::visit::walk;
use crate::ir::{Expr, ExprKind, ObjectItem, ObjectKey, Parameter, Type};

/// Lowest precedence: no parentheses needed.
pub(super) const ANY: Precedence = 0;

impl<'a> Emitter<'a> {
    /// Print `expr`, parenthesized if it binds looser than `required`.
    pub(super) fn print_expr(&mut self, expr: &Expr, required: Precedence, level: usize) -> Result<String, EmitError> {
        let own = precedence_of(&CSHARP_PRECEDENCE, expr)?;
        let text = self.print_bare(expr, level)?;
        Ok(if own < required { format!("({text})") } else { text })
    }

    fn print_bare(&mut self, expr: &Expr, level: usize) -> Result<String, EmitError> {
        let table = &CSHARP_PRECEDENCE;
        match &expr.kind {
            ExprKind::Literal(literal) => literals::print_literal(literal, expr),
            ExprKind::Template(parts) => self.print_template(parts, level),
            ExprKind::Object(items) => self.print_object(expr, items, level),
            ExprKind::Tuple(elements) => self.print_tuple(elements, level),
            ExprKind::ScopeTraversal { root, root_ty, steps } => {
                Ok(traversals::print_steps(csharp_identifier(root), root_ty, steps))
            }
            ExprKind::RelativeTraversal { source, steps } => {
                let receiver = self.print_expr(source, table.postfix, level)?;
                Ok(traversals::print_steps(receiver, &source.ty, steps))
            }
            ExprKind::Index { collection, key } => {
                let collection = self.print_expr(collection, table.postfix, level)?;
                let key = self.print_expr(key, ANY, level)?;
                Ok(format!("{collection}[{key}]"))
            }
            ExprKind::Splat { source, each } => self.print_splat(source, each, level),
            ExprKind::Conditional {
                condition,
                true_result,
                false_result,
            } => {
                let condition = self.print_expr(condition, table.conditional + 1, level)?;
                let t = self.print_expr(true_result, table.conditional, level)?;
                let f = self.print_expr(false_result, table.conditional, level)?;
                Ok(format!("{condition} ? {t} : {f}"))
            }
            ExprKind::Binary { op, left, right } => {
                let p = table
                    .binary_precedence(*op)
                    .ok_or(EmitError::MissingOperator { op: op.symbol() })?;
                let left = self.print_expr(left, p, level)?;
                let right = self.print_expr(right, p + 1, level)?;
                Ok(format!("{left} {} {right}", op.symbol()))
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.print_expr(operand, table.unary, level)?;
                // `- -x` would read as a decrement
                if *op == UnaryOp::Negate && operand.starts_with('-') {
                    Ok(format!("{}({operand})", op.symbol()))
                } else {
                    Ok(format!("{}{operand}", op.symbol()))
                }
            }
            ExprKind::Call(call) => self.print_call(expr, call, level),
            ExprKind::Lambda { params, body } => self.print_lambda(params, body, level),
        }
    }

    /// Named keys print as a property initializer, dynamic keys (or a `map`-typed object) as a dictionary
    /// initializer.
    fn print_object(&mut self, expr: &Expr, items: &[ObjectItem], level: usize) -> Result<String, EmitError> {
        if items.is_empty() {
            return Ok("{}".to_string());
        }

        let named = items.iter().filter(|i| matches!(i.key, ObjectKey::Named(_))).count();
        if named != 0 && named != items.len() {
            return Err(EmitError::MixedObjectKeys {
                span: expr.span.clone(),
            });
        }
        let dictionary = named == 0 || matches!(expr.ty.strip_wrappers(), Type::Map(_));

        let pad = self.pad(level);
        let inner = self.pad(level + 1);
        let mut out = format!("\n{pad}{{");
        for item in items {
            let value = self.print_expr(&item.value, ANY, level + 1)?;
            let line = match &item.key {
                ObjectKey::Named(name) if !dictionary => assignment(&property_name(name), &value),
                ObjectKey::Named(name) => format!("{{ {}, {value} }}", quote_string(name)),
                ObjectKey::Dynamic(key) => {
                    let key = self.print_expr(key, ANY, level + 1)?;
                    format!("{{ {key}, {value} }}")
                }
            };
            out.push_str(&format!("\n{inner}{line},"));
        }
        out.push_str(&format!("\n{pad}}}"));
        Ok(out)
    }

    fn print_tuple(&mut self, elements: &[Expr], level: usize) -> Result<String, EmitError> {
        if elements.is_empty() {
            return Ok("{}".to_string());
        }

        let pad = self.pad(level);
        let inner = self.pad(level + 1);
        let mut out = format!("\n{pad}{{");
        for element in elements {
            let value = self.print_expr(element, ANY, level + 1)?;
            out.push_str(&format!("\n{inner}{value},"));
        }
        out.push_str(&format!("\n{pad}}}"));
        Ok(out)
    }

    fn print_lambda(&mut self, params: &[Parameter], body: &Expr, level: usize) -> Result<String, EmitError> {
        match params {
            [] => Ok(format!("() => {}", self.print_expr(body, ANY, level)?)),
            [param] => Ok(format!(
                "{} => {}",
                csharp_identifier(&param.name),
                self.print_expr(body, ANY, level)?
            )),
            _ => {
                let tuple = tuple_parameter(params, body);
                let pad = self.pad(level);
                let inner = self.pad(level + 1);
                let mut out = format!("{tuple} =>\n{pad}{{");
                for (i, param) in params.iter().enumerate() {
                    out.push_str(&format!(
                        "\n{inner}var {} = {tuple}.Item{};",
                        csharp_identifier(&param.name),
                        i + 1
                    ));
                }
                let body = self.print_expr(body, ANY, level + 1)?;
                out.push_str(&format!("\n{inner}return {body};\n{pad}}}"));
                Ok(out)
            }
        }
    }
}

/// Name of the tuple parameter of a multi-parameter lambda: `values`, unless a parameter or the body uses it.
fn tuple_parameter(params: &[Parameter], body: &Expr) -> String {
    let mut used: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
    walk(body, &mut |e| match &e.kind {
        ExprKind::ScopeTraversal { root, .. } => used.push(root),
        ExprKind::Lambda { params, .. } => used.extend(params.iter().map(|p| p.name.as_str())),
        _ => {}
    });
    unique_name("values", |candidate| used.contains(&candidate))
}

/// `Name = value`, with no space before a value that starts on its own line.
pub(super) fn assignment(name: &str, value: &str) -> String {
    if value.starts_with('\n') {
        format!("{name} ={value}")
    } else {
        format!("{name} = {value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::config::GeneratorConfig;
    use crate::backend::namespaces::PackageNamespaces;
    use crate::ir::TraversalStep;
    use stackgen_core::lang::operators::BinaryOp;

    fn print(expr: &Expr) -> String {
        let config = GeneratorConfig::default();
        let namespaces = PackageNamespaces::new();
        let mut emitter = Emitter::new(&config, &namespaces, &[]);
        emitter.print_expr(expr, ANY, 0).expect("printable")
    }

    fn num(n: f64) -> Expr {
        Expr::number(n)
    }

    fn bin(op: BinaryOp, l: Expr, r: Expr) -> Expr {
        Expr::binary(op, l, r, Type::Number)
    }

    #[test]
    fn test_binary_precedence_parenthesizes_looser_operands() {
        let sum = bin(BinaryOp::Add, num(1.0), num(2.0));
        assert_eq!(print(&bin(BinaryOp::Multiply, sum.clone(), num(3.0))), "(1 + 2) * 3");
        assert_eq!(print(&bin(BinaryOp::Add, num(3.0), bin(BinaryOp::Multiply, num(1.0), num(2.0)))), "3 + 1 * 2");
    }

    #[test]
    fn test_right_operand_of_equal_precedence_is_parenthesized() {
        let diff = bin(BinaryOp::Subtract, num(2.0), num(3.0));
        assert_eq!(print(&bin(BinaryOp::Subtract, num(1.0), diff.clone())), "1 - (2 - 3)");
        assert_eq!(print(&bin(BinaryOp::Subtract, diff, num(1.0))), "2 - 3 - 1");
    }

    #[test]
    fn test_conditional() {
        let cond = Expr::conditional(Expr::bool(true), num(1.0), num(2.0));
        assert_eq!(print(&cond), "true ? 1 : 2");
        let nested = Expr::conditional(cond.clone(), num(3.0), num(4.0));
        assert_eq!(print(&nested), "(true ? 1 : 2) ? 3 : 4");
    }

    #[test]
    fn test_double_negation_is_parenthesized() {
        let inner = Expr::unary(UnaryOp::Negate, Expr::variable("x", Type::Number), Type::Number);
        let outer = Expr::unary(UnaryOp::Negate, inner, Type::Number);
        assert_eq!(print(&outer), "-(-x)");
        let not = Expr::unary(UnaryOp::Not, Expr::variable("ok", Type::Bool), Type::Bool);
        assert_eq!(print(&not), "!ok");
    }

    #[test]
    fn test_named_object_initializer() {
        let object = Expr::object([("indexDocument", Expr::string("index.html"))]);
        assert_eq!(print(&object), "\n{\n    IndexDocument = \"index.html\",\n}");
    }

    #[test]
    fn test_dictionary_initializer() {
        let map = Expr::map_literal(vec![(Expr::string("Name"), Expr::string("site"))], Type::String);
        assert_eq!(print(&map), "\n{\n    { \"Name\", \"site\" },\n}");
    }

    #[test]
    fn test_map_typed_named_object_prints_as_dictionary() {
        let object = Expr::object([("Name", Expr::string("site"))]).with_type(Type::map(Type::String));
        assert_eq!(print(&object), "\n{\n    { \"Name\", \"site\" },\n}");
    }

    #[test]
    fn test_empty_object_and_tuple() {
        assert_eq!(print(&Expr::object(Vec::<(String, Expr)>::new())), "{}");
        assert_eq!(print(&Expr::tuple(Vec::new())), "{}");
    }

    #[test]
    fn test_tuple_elements_one_per_line() {
        let tuple = Expr::tuple(vec![Expr::string("a"), Expr::string("b")]);
        assert_eq!(print(&tuple), "\n{\n    \"a\",\n    \"b\",\n}");
    }

    #[test]
    fn test_mixed_object_keys_are_fatal() {
        let object = Expr::new(
            ExprKind::Object(vec![
                ObjectItem {
                    key: ObjectKey::Named("a".into()),
                    value: num(1.0),
                },
                ObjectItem {
                    key: ObjectKey::Dynamic(Expr::string("b")),
                    value: num(2.0),
                },
            ]),
            Type::Dynamic,
        );
        let config = GeneratorConfig::default();
        let namespaces = PackageNamespaces::new();
        let mut emitter = Emitter::new(&config, &namespaces, &[]);
        assert!(matches!(
            emitter.print_expr(&object, ANY, 0),
            Err(EmitError::MixedObjectKeys { .. })
        ));
    }

    #[test]
    fn test_lambdas() {
        let body = Expr::traversal(
            "x",
            Type::object([("id", Type::String)]),
            vec![TraversalStep::attr("id", Type::String)],
        );
        let none = Expr::lambda(Vec::new(), num(1.0));
        assert_eq!(print(&none), "() => 1");
        let one = Expr::lambda(vec![Parameter::new("x", Type::Dynamic)], body);
        assert_eq!(print(&one), "x => x.Id");

        let two = Expr::lambda(
            vec![Parameter::new("a", Type::String), Parameter::new("b", Type::String)],
            Expr::template(vec![Expr::variable("a", Type::String), Expr::variable("b", Type::String)]),
        );
        assert_eq!(
            print(&two),
            "values =>\n{\n    var a = values.Item1;\n    var b = values.Item2;\n    return $\"{a}{b}\";\n}"
        );
    }

    #[test]
    fn test_tuple_parameter_avoids_parameter_names() {
        let two = Expr::lambda(
            vec![Parameter::new("values", Type::String), Parameter::new("id", Type::String)],
            Expr::template(vec![
                Expr::variable("values", Type::String),
                Expr::variable("id", Type::String),
            ]),
        );
        assert_eq!(
            print(&two),
            "values2 =>\n{\n    var values = values2.Item1;\n    var id = values2.Item2;\n    return $\"{values}{id}\";\n}"
        );
    }

    #[test]
    fn test_tuple_parameter_avoids_names_read_by_the_body() {
        let two = Expr::lambda(
            vec![Parameter::new("a", Type::String), Parameter::new("b", Type::String)],
            Expr::template(vec![
                Expr::variable("a", Type::String),
                Expr::variable("b", Type::String),
                Expr::variable("values", Type::String),
            ]),
        );
        assert!(print(&two).starts_with("values2 =>\n{\n    var a = values2.Item1;"));
    }

    #[test]
    fn test_lambda_operand_is_parenthesized() {
        let lambda = Expr::lambda(vec![Parameter::new("x", Type::Dynamic)], Expr::variable("x", Type::Dynamic));
        let cond = Expr::conditional(Expr::variable("ok", Type::Bool), lambda.clone(), lambda);
        assert_eq!(print(&cond), "ok ? (x => x) : (x => x)");
    }

    #[test]
    fn test_assignment_spacing() {
        assert_eq!(assignment("A", "1"), "A = 1");
        assert_eq!(assignment("A", "\n{}"), "A =\n{}");
    }
}
