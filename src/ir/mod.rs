//! The program representation consumed by the generator.
//!
//! A [`Program`] is an ordered list of declaration [`Node`]s plus the packages they reference. Order is emission order:
//! it is fixed by an upstream linearization step and the generator only consumes it.
//!
//! ## Notes
//! - Everything here is plain data, serde-(de)serializable so a front-end can hand a program over as JSON.
//! - The generator treats programs as immutable; rewrites clone the expressions they transform.
//!
//! ## See also
//! - [`expr`]: typed expression trees
//! - [`types`]: resolved types and conversion rules
//! - [`visit`]: traversal helpers shared by the rewrite passes and import collection

pub mod expr;
pub mod span;
pub mod types;
pub mod visit;

pub use expr::{
    Expr, ExprKind, FunctionCall, Literal, ObjectItem, ObjectKey, Parameter, Signature, StepKey, TraversalStep,
};
pub use span::{Pos, SourceSpan};
pub use stackgen_core::lang::operators::{BinaryOp, UnaryOp};
pub use types::{Conversion, Type};

use serde::{Deserialize, Serialize};

/// A complete, ordered program.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub packages: Vec<Package>,
}

/// A referenced provider package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Resource(Resource),
    ConfigVariable(ConfigVariable),
    LocalVariable(LocalVariable),
    OutputVariable(OutputVariable),
}

impl Node {
    /// The declaration's logical name.
    pub fn name(&self) -> &str {
        match self {
            Node::Resource(r) => &r.name,
            Node::ConfigVariable(c) => &c.name,
            Node::LocalVariable(l) => &l.name,
            Node::OutputVariable(o) => &o.name,
        }
    }

    /// Every top-level expression owned by this node, in source order.
    pub fn expressions(&self) -> Vec<&Expr> {
        match self {
            Node::Resource(r) => {
                let mut exprs: Vec<&Expr> = r.inputs.iter().map(|i| &i.value).collect();
                if let Some(range) = r.range() {
                    exprs.push(range);
                }
                exprs
            }
            Node::ConfigVariable(c) => c.default.iter().collect(),
            Node::LocalVariable(l) => vec![&l.value],
            Node::OutputVariable(o) => vec![&o.value],
        }
    }
}

/// A resource instantiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Logical name; also the local binding name after cleaning.
    pub name: String,
    /// `package:module:member`.
    pub token: String,
    #[serde(default)]
    pub inputs: Vec<ResourceInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ResourceOptions>,
    #[serde(default)]
    pub trivia: Trivia,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
}

impl Resource {
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
            inputs: Vec::new(),
            options: None,
            trivia: Trivia::default(),
            span: None,
        }
    }

    /// Append an input binding without a declared destination type.
    pub fn with_input(mut self, name: impl Into<String>, value: Expr) -> Self {
        self.inputs.push(ResourceInput {
            name: name.into(),
            value,
            declared_type: None,
        });
        self
    }

    /// Append an input binding with the declared destination type from the resource schema.
    pub fn with_typed_input(mut self, name: impl Into<String>, value: Expr, declared_type: Type) -> Self {
        self.inputs.push(ResourceInput {
            name: name.into(),
            value,
            declared_type: Some(declared_type),
        });
        self
    }

    pub fn with_range(mut self, range: Expr) -> Self {
        self.options = Some(ResourceOptions { range: Some(range) });
        self
    }

    pub fn range(&self) -> Option<&Expr> {
        self.options.as_ref().and_then(|o| o.range.as_ref())
    }
}

/// A named input binding of a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInput {
    pub name: String,
    pub value: Expr,
    /// Destination type from the resource's input schema, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<Type>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceOptions {
    /// Drives iteration: one instance per entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Expr>,
}

/// Comment lines attached around a declaration, without their comment markers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Trivia {
    #[serde(default)]
    pub leading: Vec<String>,
    #[serde(default)]
    pub trailing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigVariable {
    pub name: String,
    pub ty: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalVariable {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputVariable {
    pub name: String,
    pub value: Expr,
}

impl Program {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            packages: Vec::new(),
        }
    }

    pub fn with_package(mut self, name: impl Into<String>) -> Self {
        self.packages.push(Package {
            name: name.into(),
            version: None,
        });
        self
    }

    /// Output variables in program order.
    pub fn outputs(&self) -> impl Iterator<Item = &OutputVariable> {
        self.nodes.iter().filter_map(|n| match n {
            Node::OutputVariable(o) => Some(o),
            _ => None,
        })
    }
}
