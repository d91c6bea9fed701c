//! Resolved IR types.
//!
//! Every expression handed to the generator carries a fully resolved [`Type`]. The generator never infers types; it
//! consumes them, propagates them through rewrites, and consults them for conversion and eventual-value decisions.
//!
//! ## Notes
//! - `Promise<T>` is a fire-once eventual value; `Output<T>` additionally tracks dependencies. Both are *eventual*.
//! - [`Type::conversion_from`] mirrors the source language's assignability rules closely enough to decide where an
//!   explicit conversion marker is needed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A resolved IR type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Bool,
    Number,
    String,
    /// Accepts any value.
    Dynamic,
    List(Box<Type>),
    /// String-keyed map.
    Map(Box<Type>),
    /// Object with ordered, named properties.
    Object(Vec<(String, Type)>),
    Tuple(Vec<Type>),
    Optional(Box<Type>),
    Promise(Box<Type>),
    Output(Box<Type>),
}

/// Strength of an implicit conversion. Ordered so the weakest of several conversions is their `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Conversion {
    None,
    Unsafe,
    Safe,
}

impl Type {
    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }

    pub fn map(element: Type) -> Self {
        Type::Map(Box::new(element))
    }

    pub fn optional(inner: Type) -> Self {
        Type::Optional(Box::new(inner))
    }

    pub fn promise(inner: Type) -> Self {
        Type::Promise(Box::new(inner))
    }

    pub fn output(inner: Type) -> Self {
        Type::Output(Box::new(inner))
    }

    pub fn object<K: Into<String>>(properties: impl IntoIterator<Item = (K, Type)>) -> Self {
        Type::Object(properties.into_iter().map(|(k, t)| (k.into(), t)).collect())
    }

    /// Whether this type is `Promise<_>` or `Output<_>`.
    pub fn is_eventual(&self) -> bool {
        matches!(self, Type::Promise(_) | Type::Output(_))
    }

    pub fn is_output(&self) -> bool {
        matches!(self, Type::Output(_))
    }

    pub fn is_promise(&self) -> bool {
        matches!(self, Type::Promise(_))
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Type::Optional(_))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Bool | Type::Number | Type::String)
    }

    /// Whether an eventual type appears anywhere inside this type.
    pub fn contains_eventuals(&self) -> bool {
        match self {
            Type::Promise(_) | Type::Output(_) => true,
            Type::Bool | Type::Number | Type::String | Type::Dynamic => false,
            Type::List(t) | Type::Map(t) | Type::Optional(t) => t.contains_eventuals(),
            Type::Object(props) => props.iter().any(|(_, t)| t.contains_eventuals()),
            Type::Tuple(elems) => elems.iter().any(Type::contains_eventuals),
        }
    }

    /// Strip every eventual wrapper, at any depth.
    ///
    /// ## Examples
    /// ```rust
    /// use stackgen::ir::Type;
    ///
    /// let t = Type::output(Type::list(Type::promise(Type::String)));
    /// assert_eq!(t.resolve_eventuals(), Type::list(Type::String));
    /// ```
    pub fn resolve_eventuals(&self) -> Type {
        match self {
            Type::Promise(t) | Type::Output(t) => t.resolve_eventuals(),
            Type::Bool | Type::Number | Type::String | Type::Dynamic => self.clone(),
            Type::List(t) => Type::list(t.resolve_eventuals()),
            Type::Map(t) => Type::map(t.resolve_eventuals()),
            Type::Optional(t) => Type::optional(t.resolve_eventuals()),
            Type::Object(props) => Type::Object(
                props
                    .iter()
                    .map(|(name, t)| (name.clone(), t.resolve_eventuals()))
                    .collect(),
            ),
            Type::Tuple(elems) => Type::Tuple(elems.iter().map(Type::resolve_eventuals).collect()),
        }
    }

    /// Strip `Optional` and eventual wrappers from the outside only.
    pub fn strip_wrappers(&self) -> &Type {
        match self {
            Type::Optional(t) | Type::Promise(t) | Type::Output(t) => t.strip_wrappers(),
            _ => self,
        }
    }

    /// Type of a named property, if this is an object (through wrappers) that declares one.
    pub fn property(&self, name: &str) -> Option<&Type> {
        match self.strip_wrappers() {
            Type::Object(props) => props.iter().find(|(n, _)| n == name).map(|(_, t)| t),
            Type::Map(t) => Some(t),
            _ => None,
        }
    }

    /// Determine how a value of type `src` converts into this type.
    ///
    /// ## Returns
    /// - [`Conversion::Safe`] when every value of `src` is a value of `self`.
    /// - [`Conversion::Unsafe`] when the conversion may fail at runtime.
    /// - [`Conversion::None`] when no conversion exists.
    pub fn conversion_from(&self, src: &Type) -> Conversion {
        if self == src {
            return Conversion::Safe;
        }

        match (self, src) {
            (Type::Dynamic, _) => Conversion::Safe,
            (_, Type::Dynamic) => Conversion::Unsafe,

            (Type::Output(t), Type::Output(u) | Type::Promise(u)) => t.conversion_from(u),
            (Type::Output(t), u) => t.conversion_from(u),
            (Type::Promise(_), Type::Output(_)) => Conversion::None,
            (Type::Promise(t), Type::Promise(u)) => t.conversion_from(u),
            (Type::Promise(t), u) => t.conversion_from(u),
            (_, Type::Promise(_) | Type::Output(_)) => Conversion::None,

            (Type::Optional(t), Type::Optional(u)) => t.conversion_from(u),
            (Type::Optional(t), u) => t.conversion_from(u),
            (t, Type::Optional(u)) => t.conversion_from(u).min(Conversion::Unsafe),

            (Type::String, Type::Number | Type::Bool) => Conversion::Safe,
            (Type::Number | Type::Bool, Type::String) => Conversion::Unsafe,

            (Type::List(t), Type::List(u)) => t.conversion_from(u),
            (Type::List(t), Type::Tuple(us)) => weakest(us.iter().map(|u| t.conversion_from(u))),
            (Type::Map(t), Type::Map(u)) => t.conversion_from(u),
            (Type::Map(t), Type::Object(props)) => weakest(props.iter().map(|(_, u)| t.conversion_from(u))),
            (Type::Object(dst), Type::Object(src)) => weakest(dst.iter().map(|(name, t)| {
                match src.iter().find(|(n, _)| n == name) {
                    Some((_, u)) => t.conversion_from(u),
                    None if t.is_optional() || *t == Type::Dynamic => Conversion::Safe,
                    None => Conversion::Unsafe,
                }
            })),
            (Type::Tuple(ts), Type::Tuple(us)) if ts.len() == us.len() => {
                weakest(ts.iter().zip(us).map(|(t, u)| t.conversion_from(u)))
            }

            _ => Conversion::None,
        }
    }
}

fn weakest(conversions: impl Iterator<Item = Conversion>) -> Conversion {
    conversions.min().unwrap_or(Conversion::Safe)
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Number => write!(f, "number"),
            Type::String => write!(f, "string"),
            Type::Dynamic => write!(f, "dynamic"),
            Type::List(t) => write!(f, "list({t})"),
            Type::Map(t) => write!(f, "map({t})"),
            Type::Optional(t) => write!(f, "optional({t})"),
            Type::Promise(t) => write!(f, "promise({t})"),
            Type::Output(t) => write!(f, "output({t})"),
            Type::Object(props) => {
                write!(f, "object({{")?;
                for (i, (name, t)) in props.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name} = {t}")?;
                }
                write!(f, "}})")
            }
            Type::Tuple(elems) => {
                write!(f, "tuple([")?;
                for (i, t) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, "])")
            }
        }
    }
}
