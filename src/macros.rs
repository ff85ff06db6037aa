//! Macros for declaring validatable structs.

/// Declare a struct together with its field tags and generate the
/// [`Validatable`](crate::core::Validatable) implementation.
///
/// Each field may carry a tag after `=>`. Untagged fields are still visited,
/// so nested structs are validated even without a tag.
///
/// # Example
///
/// ```
/// use tagcheck::prelude::*;
/// use tagcheck::validatable;
///
/// validatable! {
///     #[derive(Debug, Clone)]
///     pub struct Login {
///         pub name: String => "required,email",
///         pub password: String => "required,min=5",
///         pub confirm: String => "eqfield=password",
///         pub remember: bool,
///     }
/// }
///
/// let login = Login {
///     name: "user@example.com".to_string(),
///     password: "hunter22".to_string(),
///     confirm: "hunter22".to_string(),
///     remember: false,
/// };
/// assert!(Validator::new().validate(&login).unwrap().is_success());
/// ```
#[macro_export]
macro_rules! validatable {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty $(=> $tag:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty
            ),*
        }

        impl $crate::core::Validatable for $name {
            fn shape(&self) -> $crate::core::Shape<'_> {
                $crate::core::Shape::Struct(
                    $crate::core::StructShape::new(stringify!($name))
                        $(.field(stringify!($field), concat!("" $(, $tag)?), &self.$field))*
                )
            }
        }
    };
}
