//! Program-level emission: `using` block, stack class, constructor body, output properties.
//!
//! ## Notes
//! - Imports are collected from the *source* expressions before any rewrite: resource and `invoke` packages, the
//!   collection namespaces ranged resources need, and the per-intrinsic usings below.
//! - The runtime namespace is always printed first; every other import is sorted and deduplicated.

use stackgen_core::lang::intrinsics::IntrinsicId;

use super::nodes::output_property;
use super::{EmitError, Emitter};
use crate::backend::namespaces::{ImportSet, NamespaceMetadata, resolve_function, resolve_resource};
use crate::backend::writer::CodeWriter;
use crate::ir::visit::walk;
use crate::ir::{Expr, ExprKind, Node, Program, Type};

const COLLECTIONS: &str = "System.Collections.Generic";
const IMMUTABLE: &str = "System.Collections.Immutable";
const LINQ: &str = "System.Linq";

/// Namespaces an intrinsic's C# rendering needs (besides package aliases for `invoke`).
fn intrinsic_usings(id: IntrinsicId) -> &'static [&'static str] {
    match id {
        IntrinsicId::Entries => &[LINQ],
        IntrinsicId::ReadFile => &["System.IO"],
        IntrinsicId::ReadDir => &["System.IO", LINQ],
        IntrinsicId::ToJson => &["System.Text.Json"],
        _ => &[],
    }
}

impl<'a> Emitter<'a> {
    /// Emit the whole program as one C# source file.
    #[tracing::instrument(skip_all, fields(nodes = program.nodes.len()))]
    pub fn emit_program(&mut self, program: &Program) -> Result<String, EmitError> {
        let mut w = CodeWriter::new(self.config.indent_width);
        self.emit_preamble(&mut w, program);

        w.indent();
        w.indent();
        for node in &program.nodes {
            self.emit_node(&mut w, node)?;
        }
        w.dedent();
        w.dedent();

        emit_postamble(&mut w, program);
        Ok(w.finish())
    }

    fn emit_preamble(&self, w: &mut CodeWriter, program: &Program) {
        let runtime = &self.config.runtime_namespace;
        let imports = collect_imports(program, self.namespaces, runtime);

        w.writeln(&format!("using {runtime};"));
        for import in imports.sorted() {
            w.writeln(&format!("using {import};"));
        }
        w.newline();

        let class = &self.config.class_name;
        w.writeln(&format!("class {class} : {}", self.config.base_class));
        w.writeln("{");
        w.indented(|w| {
            w.writeln(&format!("public {class}()"));
            w.writeln("{");
        });
    }
}

fn emit_postamble(w: &mut CodeWriter, program: &Program) {
    w.indented(|w| w.writeln("}"));

    let mut outputs = program.outputs().peekable();
    if outputs.peek().is_some() {
        w.newline();
        w.indented(|w| {
            for output in outputs {
                w.writeln(&output_property(output));
            }
        });
    }
    w.writeln("}");
}

/// Every `using` the program needs.
pub(super) fn collect_imports(program: &Program, namespaces: &dyn NamespaceMetadata, runtime: &str) -> ImportSet {
    let mut imports = ImportSet::new(runtime);
    for node in &program.nodes {
        match node {
            Node::Resource(resource) => {
                let (name, _) = resolve_resource(&resource.token, namespaces, None);
                if let Some(using) = name.package_using(runtime) {
                    imports.add(using);
                }
                if resource.range().is_some() {
                    imports.add(COLLECTIONS);
                    imports.add(LINQ);
                }
            }
            Node::OutputVariable(output) => {
                if matches!(output.value.ty.resolve_eventuals(), Type::List(_) | Type::Map(_)) {
                    imports.add(IMMUTABLE);
                }
            }
            Node::ConfigVariable(_) | Node::LocalVariable(_) => {}
        }

        for expr in node.expressions() {
            walk(expr, &mut |e: &Expr| expression_imports(e, namespaces, runtime, &mut imports));
        }
    }
    imports
}

fn expression_imports(expr: &Expr, namespaces: &dyn NamespaceMetadata, runtime: &str, imports: &mut ImportSet) {
    match &expr.kind {
        ExprKind::Splat { .. } => imports.add(LINQ),
        ExprKind::Call(call) => {
            let Some(id) = call.intrinsic() else {
                return;
            };
            if id == IntrinsicId::Invoke {
                let token = call.args.first().and_then(Expr::as_string_literal);
                if let Some(using) = token.and_then(|t| resolve_function(t, namespaces, None).0.package_using(runtime))
                {
                    imports.add(using);
                }
            }
            for using in intrinsic_usings(id) {
                imports.add(*using);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::config::GeneratorConfig;
    use crate::backend::namespaces::PackageNamespaces;
    use crate::ir::{LocalVariable, OutputVariable, Parameter, Resource, Signature, TraversalStep};

    fn emit(program: &Program) -> String {
        let config = GeneratorConfig::default();
        let namespaces = PackageNamespaces::new();
        let mut emitter = Emitter::new(&config, &namespaces, &program.packages);
        emitter.emit_program(program).expect("emits")
    }

    fn read_dir(path: &str) -> Expr {
        Expr::call(
            "readDir",
            vec![Expr::string(path)],
            Signature {
                params: vec![Parameter::new("path", Type::String)],
                variadic: None,
                return_type: Type::list(Type::String),
            },
        )
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(
            emit(&Program::default()),
            "using Pulumi;\n\nclass MyStack : Stack\n{\n    public MyStack()\n    {\n    }\n}\n"
        );
    }

    #[test]
    fn test_outputs_get_properties() {
        let program = Program::new(vec![Node::OutputVariable(OutputVariable {
            name: "bucketName".to_string(),
            value: Expr::traversal(
                "bucket",
                Type::object([("id", Type::output(Type::String))]),
                vec![TraversalStep::attr("id", Type::output(Type::String))],
            ),
        })]);
        assert_eq!(
            emit(&program),
            "using Pulumi;\n\
             \n\
             class MyStack : Stack\n\
             {\n\
             \x20   public MyStack()\n\
             \x20   {\n\
             \x20       this.BucketName = bucket.Id;\n\
             \x20   }\n\
             \n\
             \x20   [Output(\"bucketName\")] public Output<string> BucketName { get; set; }\n\
             }\n"
        );
    }

    #[test]
    fn test_imports_are_sorted_and_deduplicated() {
        let program = Program::new(vec![
            Node::Resource(Resource::new("b", "aws:s3/bucket:Bucket").with_range(read_dir("./www"))),
            Node::Resource(Resource::new("a", "aws:s3/bucket:Bucket")),
            Node::Resource(Resource::new("p", "pulumi:providers:kubernetes")),
            Node::LocalVariable(LocalVariable {
                name: "files".to_string(),
                value: read_dir("./site"),
            }),
        ]);
        let imports = collect_imports(&program, &PackageNamespaces::new(), "Pulumi");
        assert_eq!(
            imports.sorted(),
            [
                "Aws = Pulumi.Aws",
                "Kubernetes = Pulumi.Kubernetes",
                "System.Collections.Generic",
                "System.IO",
                "System.Linq",
            ]
        );
        assert!(imports.contains("Pulumi"));
    }

    #[test]
    fn test_list_output_needs_immutable() {
        let program = Program::new(vec![Node::OutputVariable(OutputVariable {
            name: "files".to_string(),
            value: read_dir("."),
        })]);
        let imports = collect_imports(&program, &PackageNamespaces::new(), "Pulumi");
        assert!(imports.contains(IMMUTABLE));
    }
}
