//! Tagcheck: declarative, tag-driven validation for Rust values
//!
//! Constraints are declared next to the data as short tag strings such as
//! `"required,min=5,max=10"` and checked by walking the value graph. Failures
//! are collected, attributed to a path like `addresses[1].city`, and returned
//! together so callers see every problem in one pass.
//!
//! # Core Concepts
//!
//! - **Validatable**: types describe their runtime [`Shape`](core::Shape)
//!   (scalar, pointer, sequence, map or struct with tagged fields)
//! - **Tags**: comma separated rules, `|` alternatives, aliases, and `dive`
//!   into collection elements (with `keys ... endkeys` for map keys)
//! - **Registry**: built-in and custom rules plus aliases, frozen before use
//! - **Validator**: walks a value and accumulates
//!   [`FieldError`](engine::FieldError)s with stillwater's `Validation`
//!
//! # Example
//!
//! ```rust
//! use tagcheck::prelude::*;
//! use tagcheck::validatable;
//!
//! validatable! {
//!     pub struct Address {
//!         pub street: String => "required",
//!         pub city: String => "required",
//!     }
//! }
//!
//! validatable! {
//!     pub struct User {
//!         pub first_name: String => "required",
//!         pub age: u8 => "gte=0,lte=130",
//!         pub email: String => "required,email",
//!         pub addresses: Vec<Address> => "required,dive,required",
//!     }
//! }
//!
//! let user = User {
//!     first_name: "Badger".to_string(),
//!     age: 135,
//!     email: "badger@smith.com".to_string(),
//!     addresses: vec![Address {
//!         street: "Eavesdown Docks".to_string(),
//!         city: String::new(),
//!     }],
//! };
//!
//! let validator = Validator::new();
//! match validator.validate(&user).unwrap() {
//!     Validation::Failure(errors) => {
//!         let errors = FieldErrors::from_failures(&errors);
//!         let paths: Vec<_> = errors.iter().map(|e| e.path.as_str()).collect();
//!         assert_eq!(paths, vec!["age", "addresses[0].city"]);
//!     }
//!     Validation::Success(_) => panic!("expected failures"),
//! }
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod macros;
pub mod registry;
pub mod tag;

// Re-export commonly used types
pub use config::{ConfigError, ValidatorConfig};
pub use core::{FieldPath, Kind, Shape, StructShape, Validatable};
pub use engine::{
    EngineError, FieldError, FieldErrors, Outcome, ValidationContext, Validator, ValidatorBuilder,
};
pub use registry::{ErrorKind, FieldLevel, Registry, RegistryBuilder, RegistryError, RuleError};
pub use tag::{parse_tag, FieldTag, TagError};

/// Everything needed to declare and validate values.
pub mod prelude {
    pub use crate::config::ValidatorConfig;
    pub use crate::core::{Shape, StructShape, Validatable};
    pub use crate::engine::{EngineError, FieldError, FieldErrors, Outcome, Validator};
    pub use crate::registry::{ErrorKind, FieldLevel, Registry, RegistryBuilder, RuleError};
    pub use stillwater::validation::Validation;
}
