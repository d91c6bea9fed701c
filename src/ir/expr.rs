//! Typed IR expressions.
//!
//! An [`Expr`] is a tagged [`ExprKind`] plus its resolved [`Type`] and an optional source span. Expression trees are
//! immutable inputs to generation; the rewrite pipeline consumes them by value and rebuilds what it changes.
//!
//! ## Notes
//! - Object keys are either all [`ObjectKey::Named`] (an argument bundle / property initializer) or all
//!   [`ObjectKey::Dynamic`] (a map literal). The printer rejects mixed objects.
//! - Literal string fragments of a template are ordinary string [`Literal`]s.
//! - Calls carry their resolved [`Signature`]; the rewrite pipeline uses declared parameter types to decide which
//!   arguments are evaluated independently of an enclosing `__apply`.

use serde::{Deserialize, Serialize};
use stackgen_core::lang::intrinsics::{self, IntrinsicId};
use stackgen_core::lang::operators::{BinaryOp, UnaryOp};

use super::span::SourceSpan;
use super::types::Type;

/// A typed expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    Literal(Literal),
    /// String interpolation; parts are literal string fragments or arbitrary expressions.
    Template(Vec<Expr>),
    Object(Vec<ObjectItem>),
    Tuple(Vec<Expr>),
    /// A named root followed by attribute/index steps (`bucket.website.endpoint`).
    ScopeTraversal {
        root: String,
        root_ty: Type,
        #[serde(default)]
        steps: Vec<TraversalStep>,
    },
    /// Steps applied to an arbitrary expression (`f(x).name`).
    RelativeTraversal {
        source: Box<Expr>,
        steps: Vec<TraversalStep>,
    },
    Index {
        collection: Box<Expr>,
        key: Box<Expr>,
    },
    /// `source[*].each...`: project every element of `source` through `each`.
    Splat {
        source: Box<Expr>,
        each: Vec<TraversalStep>,
    },
    Conditional {
        condition: Box<Expr>,
        true_result: Box<Expr>,
        false_result: Box<Expr>,
    },
    Binary {
        #[serde(with = "binary_op_name")]
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        #[serde(with = "unary_op_name")]
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Call(FunctionCall),
    Lambda {
        params: Vec<Parameter>,
        body: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Bool(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKey {
    /// A literal property name.
    Named(String),
    /// An arbitrary expression naming a map entry.
    Dynamic(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectItem {
    pub key: ObjectKey,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKey {
    Attr(String),
    Index(i64),
}

/// One traversal step and the type it produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraversalStep {
    pub key: StepKey,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
}

/// A resolved call signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<Parameter>,
    /// Type of any arguments past `params`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variadic: Option<Parameter>,
    pub return_type: Type,
}

impl Signature {
    /// Declared type of the argument at `index`, if the signature covers it.
    pub fn param_type(&self, index: usize) -> Option<&Type> {
        self.params
            .get(index)
            .or(self.variadic.as_ref())
            .map(|p| &p.ty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub signature: Signature,
}

impl FunctionCall {
    /// The intrinsic this call names, if any.
    pub fn intrinsic(&self) -> Option<IntrinsicId> {
        intrinsics::from_str(&self.name)
    }
}

impl TraversalStep {
    pub fn attr(name: impl Into<String>, ty: Type) -> Self {
        Self {
            key: StepKey::Attr(name.into()),
            ty,
        }
    }

    pub fn index(index: i64, ty: Type) -> Self {
        Self {
            key: StepKey::Index(index),
            ty,
        }
    }
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl Expr {
    pub fn new(kind: ExprKind, ty: Type) -> Self {
        Self { kind, ty, span: None }
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ExprKind::Literal(Literal::Bool(value)), Type::Bool)
    }

    pub fn number(value: f64) -> Self {
        Self::new(ExprKind::Literal(Literal::Number(value)), Type::Number)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ExprKind::Literal(Literal::String(value.into())), Type::String)
    }

    /// A template of `parts`; typed `Output<string>` when any part is eventual.
    pub fn template(parts: Vec<Expr>) -> Self {
        let ty = if parts.iter().any(|p| p.ty.is_eventual()) {
            Type::output(Type::String)
        } else {
            Type::String
        };
        Self::new(ExprKind::Template(parts), ty)
    }

    /// An object with literal-named properties, typed from its values.
    pub fn object<K: Into<String>>(items: impl IntoIterator<Item = (K, Expr)>) -> Self {
        let items: Vec<ObjectItem> = items
            .into_iter()
            .map(|(k, value)| ObjectItem {
                key: ObjectKey::Named(k.into()),
                value,
            })
            .collect();
        let ty = Type::Object(
            items
                .iter()
                .filter_map(|item| match &item.key {
                    ObjectKey::Named(name) => Some((name.clone(), item.value.ty.clone())),
                    ObjectKey::Dynamic(_) => None,
                })
                .collect(),
        );
        Self::new(ExprKind::Object(items), ty)
    }

    /// A map literal with dynamic keys.
    pub fn map_literal(items: Vec<(Expr, Expr)>, element: Type) -> Self {
        let items = items
            .into_iter()
            .map(|(key, value)| ObjectItem {
                key: ObjectKey::Dynamic(key),
                value,
            })
            .collect();
        Self::new(ExprKind::Object(items), Type::map(element))
    }

    pub fn tuple(elements: Vec<Expr>) -> Self {
        let ty = Type::Tuple(elements.iter().map(|e| e.ty.clone()).collect());
        Self::new(ExprKind::Tuple(elements), ty)
    }

    /// A bare variable reference.
    pub fn variable(name: impl Into<String>, ty: Type) -> Self {
        Self::traversal(name, ty, Vec::new())
    }

    /// A scope traversal; the expression type is the last step's type (or the root's).
    pub fn traversal(root: impl Into<String>, root_ty: Type, steps: Vec<TraversalStep>) -> Self {
        let ty = steps.last().map_or_else(|| root_ty.clone(), |s| s.ty.clone());
        Self::new(
            ExprKind::ScopeTraversal {
                root: root.into(),
                root_ty,
                steps,
            },
            ty,
        )
    }

    pub fn relative(source: Expr, steps: Vec<TraversalStep>) -> Self {
        let ty = steps.last().map_or_else(|| source.ty.clone(), |s| s.ty.clone());
        Self::new(
            ExprKind::RelativeTraversal {
                source: Box::new(source),
                steps,
            },
            ty,
        )
    }

    pub fn index(collection: Expr, key: Expr, ty: Type) -> Self {
        Self::new(
            ExprKind::Index {
                collection: Box::new(collection),
                key: Box::new(key),
            },
            ty,
        )
    }

    pub fn splat(source: Expr, each: Vec<TraversalStep>, ty: Type) -> Self {
        Self::new(
            ExprKind::Splat {
                source: Box::new(source),
                each,
            },
            ty,
        )
    }

    pub fn conditional(condition: Expr, true_result: Expr, false_result: Expr) -> Self {
        let ty = true_result.ty.clone();
        Self::new(
            ExprKind::Conditional {
                condition: Box::new(condition),
                true_result: Box::new(true_result),
                false_result: Box::new(false_result),
            },
            ty,
        )
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr, ty: Type) -> Self {
        Self::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
        )
    }

    pub fn unary(op: UnaryOp, operand: Expr, ty: Type) -> Self {
        Self::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            ty,
        )
    }

    /// A call whose type is the signature's return type.
    pub fn call(name: impl Into<String>, args: Vec<Expr>, signature: Signature) -> Self {
        let ty = signature.return_type.clone();
        Self::new(
            ExprKind::Call(FunctionCall {
                name: name.into(),
                args,
                signature,
            }),
            ty,
        )
    }

    pub fn lambda(params: Vec<Parameter>, body: Expr) -> Self {
        Self::new(
            ExprKind::Lambda {
                params,
                body: Box::new(body),
            },
            Type::Dynamic,
        )
    }

    /// Re-type this expression, keeping its kind and span.
    pub fn with_type(mut self, ty: Type) -> Self {
        self.ty = ty;
        self
    }

    pub fn as_call(&self) -> Option<&FunctionCall> {
        match &self.kind {
            ExprKind::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Whether this is a call to `intrinsic`.
    pub fn is_intrinsic(&self, intrinsic: IntrinsicId) -> bool {
        self.as_call().and_then(FunctionCall::intrinsic) == Some(intrinsic)
    }

    /// The literal string payload, if this is a string literal or a template of exactly one literal fragment.
    pub fn as_string_literal(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Literal(Literal::String(s)) => Some(s),
            ExprKind::Template(parts) if parts.len() == 1 => parts[0].as_string_literal(),
            _ => None,
        }
    }
}

mod binary_op_name {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use stackgen_core::lang::operators::{self, BinaryOp};

    pub fn serialize<S: Serializer>(op: &BinaryOp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(op.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BinaryOp, D::Error> {
        let name = String::deserialize(deserializer)?;
        operators::binary_from_str(&name).ok_or_else(|| D::Error::custom(format!("unknown binary operator `{name}`")))
    }
}

mod unary_op_name {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use stackgen_core::lang::operators::{self, UnaryOp};

    pub fn serialize<S: Serializer>(op: &UnaryOp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(op.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<UnaryOp, D::Error> {
        let name = String::deserialize(deserializer)?;
        operators::unary_from_str(&name).ok_or_else(|| D::Error::custom(format!("unknown unary operator `{name}`")))
    }
}
