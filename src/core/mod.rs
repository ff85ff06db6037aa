//! Value graph types.
//!
//! This module contains the data the validator walks:
//! - The `Validatable` trait through which types describe themselves
//! - `Shape`, the runtime form of one value
//! - `FieldPath`, the location of a value inside the graph
//!
//! Nothing here evaluates rules; it only describes values.

mod impls;
mod path;
mod shape;

pub use path::{FieldPath, Segment};
pub use shape::{FieldShape, Kind, Shape, StructShape, Validatable};

pub(crate) use shape::resolve;
