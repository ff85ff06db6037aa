//! Field path accumulation.
//!
//! Paths are immutable: descending into a field, index or key returns a new
//! path and leaves the parent untouched.

use std::fmt;

/// One step of a [`FieldPath`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(usize),
    /// Map entry; addresses the value stored under the key.
    Key(String),
    /// Map entry; addresses the key itself.
    MapKey(String),
}

/// Dotted and bracketed location of a value, e.g. `addresses[1].city`.
///
/// Map values are addressed as `schools[SD]` and map keys as `schools{SD}`,
/// so a key and the value stored under it never share a path.
///
/// # Example
///
/// ```rust
/// use tagcheck::core::FieldPath;
///
/// let path = FieldPath::root().field("addresses").index(1).field("city");
/// assert_eq!(path.to_string(), "addresses[1].city");
/// assert_eq!(path.leaf(), "city");
///
/// let key = FieldPath::root().field("schools").key("SD");
/// assert_eq!(key.to_string(), "schools[SD]");
/// assert_eq!(key.leaf(), "schools[SD]");
///
/// let key = FieldPath::root().field("schools").map_key("SD");
/// assert_eq!(key.to_string(), "schools{SD}");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn field(&self, name: &str) -> Self {
        self.push(Segment::Field(name.to_string()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.push(Segment::Index(index))
    }

    pub fn key(&self, key: &str) -> Self {
        self.push(Segment::Key(key.to_string()))
    }

    pub fn map_key(&self, key: &str) -> Self {
        self.push(Segment::MapKey(key.to_string()))
    }

    fn push(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The last field name together with any index or key that follows it.
    pub fn leaf(&self) -> String {
        let start = self
            .segments
            .iter()
            .rposition(|segment| matches!(segment, Segment::Field(_)))
            .unwrap_or(0);
        let mut out = String::new();
        for segment in &self.segments[start..] {
            write_segment(&mut out, segment, true);
        }
        out
    }
}

fn write_segment(out: &mut String, segment: &Segment, first: bool) {
    match segment {
        Segment::Field(name) => {
            if !first {
                out.push('.');
            }
            out.push_str(name);
        }
        Segment::Index(index) => {
            out.push('[');
            out.push_str(&index.to_string());
            out.push(']');
        }
        Segment::Key(key) => {
            out.push('[');
            out.push_str(key);
            out.push(']');
        }
        Segment::MapKey(key) => {
            out.push('{');
            out.push_str(key);
            out.push('}');
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            write_segment(&mut out, segment, i == 0);
        }
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_renders_empty() {
        let root = FieldPath::root();
        assert!(root.is_root());
        assert_eq!(root.to_string(), "");
        assert_eq!(root.leaf(), "");
    }

    #[test]
    fn descending_leaves_parent_untouched() {
        let parent = FieldPath::root().field("user");
        let child = parent.field("name");

        assert_eq!(parent.to_string(), "user");
        assert_eq!(child.to_string(), "user.name");
    }

    #[test]
    fn nested_collections_render_brackets() {
        let path = FieldPath::root()
            .field("grid")
            .index(0)
            .index(2)
            .field("cell");
        assert_eq!(path.to_string(), "grid[0][2].cell");
        assert_eq!(path.leaf(), "cell");
        assert_eq!(path.segments().len(), 5);
    }

    #[test]
    fn map_keys_and_values_render_apart() {
        let schools = FieldPath::root().field("schools");
        let key = schools.map_key("SD");
        let value = schools.key("SD");

        assert_eq!(key.to_string(), "schools{SD}");
        assert_eq!(value.to_string(), "schools[SD]");
        assert_ne!(key, value);
        assert_eq!(key.leaf(), "schools{SD}");
    }

    #[test]
    fn index_at_root_has_no_leading_dot() {
        let path = FieldPath::root().index(3).field("name");
        assert_eq!(path.to_string(), "[3].name");
    }
}
