//! Runtime shape of a validatable value.
//!
//! Instead of inspecting struct fields through reflection, every type that
//! takes part in validation describes itself as a [`Shape`]. Scalars report
//! their value, containers hand out borrowed children, and structs list their
//! fields together with the tag string that governs each one.
//!
//! Children are borrowed trait objects, so a graph is only expanded as far as
//! the walker actually descends into it.

use std::borrow::Cow;
use std::fmt;

/// A value that can be walked by the validator.
///
/// # Example
///
/// ```rust
/// use tagcheck::core::{Shape, StructShape, Validatable};
///
/// struct Login {
///     name: String,
///     password: String,
/// }
///
/// impl Validatable for Login {
///     fn shape(&self) -> Shape<'_> {
///         Shape::Struct(
///             StructShape::new("Login")
///                 .field("name", "required,email", &self.name)
///                 .field("password", "required,min=5", &self.password),
///         )
///     }
/// }
///
/// let login = Login {
///     name: "user@example.com".to_string(),
///     password: "secret".to_string(),
/// };
/// assert!(matches!(login.shape(), Shape::Struct(_)));
/// ```
pub trait Validatable {
    /// Describe the value's runtime shape.
    fn shape(&self) -> Shape<'_>;
}

/// Coarse classification of a [`Shape`], used in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    Str,
    Ptr,
    Seq,
    Map,
    Struct,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::Str => "string",
            Self::Ptr => "pointer",
            Self::Seq => "sequence",
            Self::Map => "map",
            Self::Struct => "struct",
        };
        f.write_str(name)
    }
}

/// The runtime shape of one value in the graph.
pub enum Shape<'a> {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(Cow<'a, str>),
    /// An optional indirection; `None` is a nil pointer.
    Ptr(Option<&'a dyn Validatable>),
    Seq(Vec<&'a dyn Validatable>),
    /// Key/value pairs in the container's own iteration order.
    Map(Vec<(&'a dyn Validatable, &'a dyn Validatable)>),
    Struct(StructShape<'a>),
}

impl<'a> Shape<'a> {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Uint(_) => Kind::Uint,
            Self::Float(_) => Kind::Float,
            Self::Str(_) => Kind::Str,
            Self::Ptr(_) => Kind::Ptr,
            Self::Seq(_) => Kind::Seq,
            Self::Map(_) => Kind::Map,
            Self::Struct(_) => Kind::Struct,
        }
    }

    /// Whether the value equals its type's zero value.
    ///
    /// Structs are never considered zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Bool(b) => !b,
            Self::Int(n) => *n == 0,
            Self::Uint(n) => *n == 0,
            Self::Float(n) => *n == 0.0,
            Self::Str(s) => s.is_empty(),
            Self::Ptr(p) => p.is_none(),
            Self::Seq(items) => items.is_empty(),
            Self::Map(entries) => entries.is_empty(),
            Self::Struct(_) => false,
        }
    }

    /// Character count for strings, element count for collections.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Str(s) => Some(s.chars().count()),
            Self::Seq(items) => Some(items.len()),
            Self::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Render a scalar value as text. Containers and structs render as `None`.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(n) => Some(n.to_string()),
            Self::Uint(n) => Some(n.to_string()),
            Self::Float(n) => Some(n.to_string()),
            Self::Str(s) => Some(s.to_string()),
            Self::Ptr(Some(target)) => target.shape().render(),
            Self::Ptr(None) | Self::Seq(_) | Self::Map(_) | Self::Struct(_) => None,
        }
    }
}

impl fmt::Debug for Shape<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Int(n) => write!(f, "Int({n})"),
            Self::Uint(n) => write!(f, "Uint({n})"),
            Self::Float(n) => write!(f, "Float({n})"),
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::Ptr(None) => f.write_str("Ptr(nil)"),
            Self::Ptr(Some(_)) => f.write_str("Ptr(..)"),
            Self::Seq(items) => write!(f, "Seq(len={})", items.len()),
            Self::Map(entries) => write!(f, "Map(len={})", entries.len()),
            Self::Struct(s) => write!(f, "Struct({})", s.name()),
        }
    }
}

/// Follow pointers until a non-pointer shape or a nil pointer is reached.
///
/// Gives up after `limit` hops and returns the pointer it stopped at.
pub(crate) fn resolve<'a>(mut shape: Shape<'a>, limit: usize) -> Shape<'a> {
    let mut hops = 0;
    while let Shape::Ptr(Some(target)) = &shape {
        if hops == limit {
            break;
        }
        let target = *target;
        shape = target.shape();
        hops += 1;
    }
    shape
}

/// One declared field of a struct.
pub struct FieldShape<'a> {
    pub name: &'a str,
    pub tag: &'a str,
    pub value: &'a dyn Validatable,
}

/// Field list of a struct, in declaration order.
pub struct StructShape<'a> {
    name: &'a str,
    fields: Vec<FieldShape<'a>>,
}

impl<'a> StructShape<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// Declare the next field together with its rule tag.
    pub fn field(mut self, name: &'a str, tag: &'a str, value: &'a dyn Validatable) -> Self {
        self.fields.push(FieldShape { name, tag, value });
        self
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn fields(&self) -> &[FieldShape<'a>] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldShape<'a>> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
