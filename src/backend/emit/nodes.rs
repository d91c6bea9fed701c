//! Emit one declaration per IR node.
//!
//! ## Notes
//! - Resources bind `var name = new Ns.Mod.Member("name", new MemberArgs { ... });`. Each input is rewritten on its
//!   own, with `MemberArgs` plus the input name as its constructor context.
//! - Ranged resources collect their instances in a `List<T>` filled by a `foreach` over `entries(range)`. Only a
//!   plain (or awaited) sequence can be enumerated; every other range shape is a placeholder.
//! - Config variables are not supported yet: the first one opens the config block, each one emits a placeholder.

use super::expressions::{ANY, assignment, quote_string};
use super::{EmitError, Emitter, csharp_identifier, property_name};
use crate::backend::namespaces::resolve_resource;
use crate::backend::rewrite::{await_call, entries_call, process_expression, property_context};
use crate::backend::writer::CodeWriter;
use crate::diagnostics::Diagnostic;
use crate::ir::{
    ConfigVariable, Conversion, Expr, LocalVariable, Node, OutputVariable, Resource, TraversalStep, Type,
};

impl<'a> Emitter<'a> {
    #[tracing::instrument(skip_all, fields(node = node.name()))]
    pub(super) fn emit_node(&mut self, w: &mut CodeWriter, node: &Node) -> Result<(), EmitError> {
        match node {
            Node::Resource(resource) => self.emit_resource(w, resource),
            Node::ConfigVariable(config) => {
                self.emit_config_variable(w, config);
                Ok(())
            }
            Node::LocalVariable(local) => self.emit_local_variable(w, local),
            Node::OutputVariable(output) => self.emit_output_assignment(w, output),
        }
    }

    fn emit_resource(&mut self, w: &mut CodeWriter, resource: &Resource) -> Result<(), EmitError> {
        let (type_name, diagnostic) = resolve_resource(&resource.token, self.namespaces, resource.span.as_ref());
        if let Some(diagnostic) = diagnostic {
            self.report(diagnostic);
        }
        let declared = self.packages.is_empty()
            || type_name.package.is_empty()
            || self.packages.iter().any(|p| p.name == type_name.package);
        if !declared {
            self.report(
                Diagnostic::warning(format!(
                    "resource `{}` uses package `{}`, which the program does not declare",
                    resource.name, type_name.package
                ))
                .with_span(resource.span.clone()),
            );
        }

        for line in &resource.trivia.leading {
            w.writeln(&format!("//{line}"));
        }

        let target = Instantiation {
            resource,
            qualified: type_name.qualified(),
            args_type: format!("{}Args", type_name.member),
        };
        let binding = csharp_identifier(&resource.name);
        match resource.range() {
            None => {
                let instance = self.instantiate(&target, &quote_string(&resource.name), w.current_indent())?;
                w.writeln(&format!("var {binding} = {instance};"));
            }
            Some(range) => self.emit_ranged_resource(w, &target, &binding, range)?,
        }

        for line in &resource.trivia.trailing {
            w.writeln(&format!("//{line}"));
        }
        Ok(())
    }

    fn emit_ranged_resource(
        &mut self,
        w: &mut CodeWriter,
        target: &Instantiation<'_>,
        binding: &str,
        range: &Expr,
    ) -> Result<(), EmitError> {
        let range = await_call(process_expression(range.clone(), None, "", self.namespaces));
        let span = range.span.clone();

        if Type::output(Type::Bool).conversion_from(&range.ty) == Conversion::Safe {
            let text = self.placeholder(format!("OptionsRangeSafeConversion {}", range.ty), span.as_ref());
            w.writeln(&text);
            return Ok(());
        }

        w.writeln(&format!("var {binding} = new List<{}>();", target.qualified));
        if Type::output(Type::Number).conversion_from(&range.ty) != Conversion::None {
            let text = self.placeholder(format!("OptionsRangeConversion {}", range.ty), span.as_ref());
            w.writeln(&text);
            return Ok(());
        }
        if range.ty.is_eventual() {
            let text = self.placeholder(format!("OptionsRangeEventual {}", range.ty), span.as_ref());
            w.writeln(&text);
            return Ok(());
        }

        let entries = self.print_expr(&entries_call(range), ANY, w.current_indent())?;
        w.writeln(&format!("foreach (var range in {entries})"));
        w.writeln("{");
        w.indent();
        let name = self.print_expr(&iteration_name(&target.resource.name), ANY, w.current_indent())?;
        let instance = self.instantiate(target, &name, w.current_indent())?;
        w.writeln(&format!("{binding}.Add({instance});"));
        w.dedent();
        w.writeln("}");
        Ok(())
    }

    /// `new Q(name, new QArgs { ... })`, with the initializer braces at `level`.
    fn instantiate(&mut self, target: &Instantiation<'_>, name: &str, level: usize) -> Result<String, EmitError> {
        let pad = self.pad(level);
        let inner = self.pad(level + 1);
        let mut out = format!("new {}({name}, new {}\n{pad}{{", target.qualified, target.args_type);
        for input in &target.resource.inputs {
            let context = property_context(&target.args_type, &input.name);
            let value = process_expression(
                input.value.clone(),
                input.declared_type.as_ref(),
                &context,
                self.namespaces,
            );
            let value = self.print_expr(&value, ANY, level + 1)?;
            out.push_str(&format!("\n{inner}{},", assignment(&property_name(&input.name), &value)));
        }
        out.push_str(&format!("\n{pad}}})"));
        Ok(out)
    }

    fn emit_config_variable(&mut self, w: &mut CodeWriter, config: &ConfigVariable) {
        if !self.config_created {
            w.writeln("var config = new Config();");
            self.config_created = true;
        }
        let text = self.placeholder(format!("ConfigVariable: {}", config.name), None);
        w.writeln(&text);
    }

    fn emit_local_variable(&mut self, w: &mut CodeWriter, local: &LocalVariable) -> Result<(), EmitError> {
        let value = process_expression(local.value.clone(), None, "", self.namespaces);
        let value = self.print_expr(&value, ANY, w.current_indent())?;
        w.writeln(&format!("{};", assignment(&format!("var {}", csharp_identifier(&local.name)), &value)));
        Ok(())
    }

    fn emit_output_assignment(&mut self, w: &mut CodeWriter, output: &OutputVariable) -> Result<(), EmitError> {
        let value = process_expression(output.value.clone(), None, "", self.namespaces);
        let value = self.print_expr(&value, ANY, w.current_indent())?;
        w.writeln(&format!("{};", assignment(&format!("this.{}", property_name(&output.name)), &value)));
        Ok(())
    }
}

/// What a resource declaration instantiates.
struct Instantiation<'r> {
    resource: &'r Resource,
    /// `Ns.Mod.Member`
    qualified: String,
    /// `MemberArgs`
    args_type: String,
}

/// `$"name-{range.Key}"`
fn iteration_name(name: &str) -> Expr {
    let key = Expr::traversal(
        "range",
        Type::object([("key", Type::Number)]),
        vec![TraversalStep::attr("key", Type::Number)],
    );
    Expr::template(vec![Expr::string(format!("{name}-")), key])
}

/// The C# type of a stack output property.
pub(super) fn output_property_type(ty: &Type) -> String {
    match ty.resolve_eventuals() {
        Type::String => "string".to_string(),
        Type::Number => "double".to_string(),
        Type::Bool => "bool".to_string(),
        Type::List(element) => format!("ImmutableArray<{}>", output_property_type(&element)),
        Type::Map(element) => format!("ImmutableDictionary<string, {}>", output_property_type(&element)),
        Type::Optional(inner) => output_property_type(&inner),
        _ => "object".to_string(),
    }
}

/// `[Output("name")] public Output<T> Name { get; set; }`
pub(super) fn output_property(output: &OutputVariable) -> String {
    format!(
        "[Output({})] public Output<{}> {} {{ get; set; }}",
        quote_string(&output.name),
        output_property_type(&output.value.ty),
        property_name(&output.name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::config::GeneratorConfig;
    use crate::backend::namespaces::PackageNamespaces;
    use crate::ir::Package;

    fn emit(nodes: &[Node], packages: &[Package]) -> (String, Vec<Diagnostic>) {
        let config = GeneratorConfig::default();
        let namespaces = PackageNamespaces::new();
        let mut emitter = Emitter::new(&config, &namespaces, packages);
        let mut w = CodeWriter::new(4);
        for node in nodes {
            emitter.emit_node(&mut w, node).expect("emits");
        }
        (w.finish(), emitter.diagnostics)
    }

    #[test]
    fn test_resource_binding() {
        let thing = Resource::new("thing", "pkg:index:Thing").with_input("value", Expr::string("hello"));
        let (text, diagnostics) = emit(&[Node::Resource(thing)], &[]);
        assert_eq!(
            text,
            "var thing = new Pkg.Thing(\"thing\", new ThingArgs\n{\n    Value = \"hello\",\n});\n"
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_resource_trivia() {
        let mut thing = Resource::new("thing", "pkg:index:Thing");
        thing.trivia.leading.push(" the thing".to_string());
        thing.trivia.trailing.push(" done".to_string());
        let (text, _) = emit(&[Node::Resource(thing)], &[]);
        assert!(text.starts_with("// the thing\nvar thing"));
        assert!(text.ends_with("});\n// done\n"));
    }

    #[test]
    fn test_undeclared_package_warns() {
        let thing = Resource::new("thing", "pkg:index:Thing");
        let packages = [Package {
            name: "aws".to_string(),
            version: None,
        }];
        let (_, diagnostics) = emit(&[Node::Resource(thing)], &packages);
        assert_eq!(diagnostics.len(), 1);
        assert!(!diagnostics[0].is_error());
    }

    #[test]
    fn test_malformed_token_is_reported_and_emitted() {
        let thing = Resource::new("thing", "not-a-token");
        let (text, diagnostics) = emit(&[Node::Resource(thing)], &[]);
        assert!(text.starts_with("var thing = new not-a-token(\"thing\""));
        assert!(diagnostics[0].is_error());
    }

    #[test]
    fn test_ranged_resource_loop() {
        let names = Expr::variable("names", Type::list(Type::String));
        let thing = Resource::new("thing", "pkg:index:Thing").with_range(names);
        let (text, _) = emit(&[Node::Resource(thing)], &[]);
        assert_eq!(
            text,
            "var thing = new List<Pkg.Thing>();\n\
             foreach (var range in names.Select((v, k) => new { Key = k, Value = v }))\n\
             {\n\
             \x20   thing.Add(new Pkg.Thing($\"thing-{range.Key}\", new ThingArgs\n\
             \x20   {\n\
             \x20   }));\n\
             }\n"
        );
    }

    #[test]
    fn test_number_range_is_a_placeholder() {
        let thing = Resource::new("thing", "pkg:index:Thing").with_range(Expr::number(3.0));
        let (text, _) = emit(&[Node::Resource(thing)], &[]);
        assert_eq!(
            text,
            "var thing = new List<Pkg.Thing>();\n/* TODO (\"OptionsRangeConversion number\") */\n"
        );
    }

    #[test]
    fn test_bool_range_is_a_placeholder() {
        let thing = Resource::new("thing", "pkg:index:Thing").with_range(Expr::bool(true));
        let (text, _) = emit(&[Node::Resource(thing)], &[]);
        assert_eq!(text, "/* TODO (\"OptionsRangeSafeConversion bool\") */\n");
    }

    #[test]
    fn test_config_block_opened_once() {
        let config = |name: &str| {
            Node::ConfigVariable(ConfigVariable {
                name: name.to_string(),
                ty: Type::String,
                default: None,
            })
        };
        let (text, _) = emit(&[config("a"), config("b")], &[]);
        assert_eq!(text.matches("var config = new Config();").count(), 1);
        assert!(text.contains("ConfigVariable: a"));
        assert!(text.contains("ConfigVariable: b"));
    }

    #[test]
    fn test_local_and_output() {
        let local = Node::LocalVariable(LocalVariable {
            name: "x".to_string(),
            value: Expr::string("v"),
        });
        let output = Node::OutputVariable(OutputVariable {
            name: "result".to_string(),
            value: Expr::variable("x", Type::String),
        });
        let (text, _) = emit(&[local, output], &[]);
        assert_eq!(text, "var x = \"v\";\nthis.Result = x;\n");
    }

    #[test]
    fn test_output_property_types() {
        assert_eq!(output_property_type(&Type::output(Type::String)), "string");
        assert_eq!(output_property_type(&Type::Number), "double");
        assert_eq!(output_property_type(&Type::list(Type::Bool)), "ImmutableArray<bool>");
        assert_eq!(
            output_property_type(&Type::map(Type::list(Type::String))),
            "ImmutableDictionary<string, ImmutableArray<string>>"
        );
        assert_eq!(output_property_type(&Type::Dynamic), "object");
    }
}
