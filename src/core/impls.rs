//! `Validatable` implementations for standard library types.
//!
//! `Option` models a nullable pointer. `Box`, `Rc`, `Arc` and plain
//! references are transparent: they can never be nil.

use super::shape::{Shape, Validatable};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

macro_rules! signed_shape {
    ($($t:ty),*) => {
        $(
            impl Validatable for $t {
                fn shape(&self) -> Shape<'_> {
                    Shape::Int(i64::from(*self))
                }
            }
        )*
    };
}

macro_rules! unsigned_shape {
    ($($t:ty),*) => {
        $(
            impl Validatable for $t {
                fn shape(&self) -> Shape<'_> {
                    Shape::Uint(u64::from(*self))
                }
            }
        )*
    };
}

signed_shape!(i8, i16, i32, i64);
unsigned_shape!(u8, u16, u32, u64);

impl Validatable for isize {
    fn shape(&self) -> Shape<'_> {
        Shape::Int(*self as i64)
    }
}

impl Validatable for usize {
    fn shape(&self) -> Shape<'_> {
        Shape::Uint(*self as u64)
    }
}

impl Validatable for f32 {
    fn shape(&self) -> Shape<'_> {
        Shape::Float(f64::from(*self))
    }
}

impl Validatable for f64 {
    fn shape(&self) -> Shape<'_> {
        Shape::Float(*self)
    }
}

impl Validatable for bool {
    fn shape(&self) -> Shape<'_> {
        Shape::Bool(*self)
    }
}

impl Validatable for char {
    fn shape(&self) -> Shape<'_> {
        Shape::Str(Cow::Owned(self.to_string()))
    }
}

impl Validatable for str {
    fn shape(&self) -> Shape<'_> {
        Shape::Str(Cow::Borrowed(self))
    }
}

impl Validatable for String {
    fn shape(&self) -> Shape<'_> {
        Shape::Str(Cow::Borrowed(self.as_str()))
    }
}

impl Validatable for Cow<'_, str> {
    fn shape(&self) -> Shape<'_> {
        Shape::Str(Cow::Borrowed(self.as_ref()))
    }
}

impl<T: Validatable + ?Sized> Validatable for &T {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Validatable + ?Sized> Validatable for Box<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Validatable + ?Sized> Validatable for Rc<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Validatable + ?Sized> Validatable for Arc<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Validatable> Validatable for Option<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Ptr(self.as_ref().map(|value| value as &dyn Validatable))
    }
}

impl<T: Validatable> Validatable for [T] {
    fn shape(&self) -> Shape<'_> {
        Shape::Seq(self.iter().map(|item| item as &dyn Validatable).collect())
    }
}

impl<T: Validatable, const N: usize> Validatable for [T; N] {
    fn shape(&self) -> Shape<'_> {
        self.as_slice().shape()
    }
}

impl<T: Validatable> Validatable for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        self.as_slice().shape()
    }
}

impl<T: Validatable> Validatable for VecDeque<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Seq(self.iter().map(|item| item as &dyn Validatable).collect())
    }
}

impl<T: Validatable, S> Validatable for HashSet<T, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Seq(self.iter().map(|item| item as &dyn Validatable).collect())
    }
}

impl<T: Validatable> Validatable for BTreeSet<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Seq(self.iter().map(|item| item as &dyn Validatable).collect())
    }
}

impl<K: Validatable, V: Validatable, S> Validatable for HashMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(
            self.iter()
                .map(|(key, value)| (key as &dyn Validatable, value as &dyn Validatable))
                .collect(),
        )
    }
}

impl<K: Validatable, V: Validatable> Validatable for BTreeMap<K, V> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(
            self.iter()
                .map(|(key, value)| (key as &dyn Validatable, value as &dyn Validatable))
                .collect(),
        )
    }
}

/// JSON documents validate like dynamically typed values: `null` is a nil
/// pointer, arrays are sequences and objects are maps.
impl Validatable for serde_json::Value {
    fn shape(&self) -> Shape<'_> {
        use serde_json::Value;

        match self {
            Value::Null => Shape::Ptr(None),
            Value::Bool(b) => Shape::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Shape::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Shape::Uint(u)
                } else {
                    Shape::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Shape::Str(Cow::Borrowed(s.as_str())),
            Value::Array(items) => items.as_slice().shape(),
            Value::Object(map) => Shape::Map(
                map.iter()
                    .map(|(key, value)| (key as &dyn Validatable, value as &dyn Validatable))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_widen_to_their_signedness() {
        assert!(matches!(7i8.shape(), Shape::Int(7)));
        assert!(matches!(7u16.shape(), Shape::Uint(7)));
        assert!(matches!(9_132_409_132i64.shape(), Shape::Int(9_132_409_132)));
    }

    #[test]
    fn option_is_a_pointer() {
        let none: Option<String> = None;
        assert!(matches!(none.shape(), Shape::Ptr(None)));
        assert!(matches!(Some(1u8).shape(), Shape::Ptr(Some(_))));
    }

    #[test]
    fn boxes_are_transparent() {
        let boxed = Box::new("abc".to_string());
        assert_eq!(boxed.shape().as_str(), Some("abc"));
    }

    #[test]
    fn collections_expose_children() {
        let items = vec![1, 2, 3];
        assert_eq!(items.shape().len(), Some(3));

        let mut map = HashMap::new();
        map.insert("SD".to_string(), 1u8);
        assert!(matches!(map.shape(), Shape::Map(entries) if entries.len() == 1));
    }

    #[test]
    fn json_values_map_onto_shapes() {
        let doc = json!({ "name": "x", "tags": ["a", "b"], "gone": null });
        let Shape::Map(entries) = doc.shape() else {
            panic!("expected map");
        };
        assert_eq!(entries.len(), 3);
        assert!(matches!(json!(null).shape(), Shape::Ptr(None)));
        assert!(matches!(json!(1.5).shape(), Shape::Float(_)));
    }
}
