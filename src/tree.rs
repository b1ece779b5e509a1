//! Instance tree
//!
//! The in-memory form of a NeXus file as handed over by a tree reader: a
//! hierarchy of groups (tagged with a base class) and fields (typed values),
//! each carrying attributes. The engine only reads these nodes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime storage type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit unsigned integer
    UInt64,
    /// Half precision float
    Float16,
    /// Single precision float
    Float32,
    /// Double precision float
    Float64,
    /// Complex of two single precision floats
    Complex64,
    /// Complex of two double precision floats
    Complex128,
    /// Boolean
    Bool,
    /// Text
    #[serde(alias = "str", alias = "unicode")]
    String,
    /// Raw byte string
    #[serde(alias = "bytes_")]
    Bytes,
}

impl DataType {
    /// Signed or unsigned integer
    pub fn is_integer(&self) -> bool {
        self.is_signed_integer() || self.is_unsigned()
    }

    /// Signed integer
    pub fn is_signed_integer(&self) -> bool {
        matches!(
            self,
            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64
        )
    }

    /// Unsigned integer
    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64
        )
    }

    /// Floating point
    pub fn is_float(&self) -> bool {
        matches!(self, DataType::Float16 | DataType::Float32 | DataType::Float64)
    }

    /// Complex floating point
    pub fn is_complex(&self) -> bool {
        matches!(self, DataType::Complex64 | DataType::Complex128)
    }

    /// Boolean
    pub fn is_bool(&self) -> bool {
        matches!(self, DataType::Bool)
    }

    /// Text or byte string
    pub fn is_char(&self) -> bool {
        matches!(self, DataType::String | DataType::Bytes)
    }

    /// Any numeric type (booleans are not numbers)
    pub fn is_number(&self) -> bool {
        self.is_integer() || self.is_float() || self.is_complex()
    }

    /// Name of the type as used in instance documents
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Int8 => "int8",
            DataType::Int16 => "int16",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::UInt8 => "uint8",
            DataType::UInt16 => "uint16",
            DataType::UInt32 => "uint32",
            DataType::UInt64 => "uint64",
            DataType::Float16 => "float16",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Complex64 => "complex64",
            DataType::Complex128 => "complex128",
            DataType::Bool => "bool",
            DataType::String => "string",
            DataType::Bytes => "bytes",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Field or attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean scalar
    Bool(bool),
    /// Integer scalar
    Int(i64),
    /// Floating point scalar
    Float(f64),
    /// Text scalar
    Text(String),
    /// Array of values
    Array(Vec<Value>),
}

impl Value {
    /// Shape inferred from array nesting
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Value::Array(items) => {
                let mut shape = vec![items.len()];
                if let Some(first) = items.first() {
                    shape.extend(first.shape());
                }
                shape
            }
            _ => Vec::new(),
        }
    }

    /// Storage type inferred from the first scalar
    pub fn infer_dtype(&self) -> DataType {
        match self {
            Value::Bool(_) => DataType::Bool,
            Value::Int(_) => DataType::Int64,
            Value::Float(_) => DataType::Float64,
            Value::Text(_) => DataType::String,
            Value::Array(items) => items
                .first()
                .map(|v| v.infer_dtype())
                .unwrap_or(DataType::Float64),
        }
    }

    /// All scalars, flattened in row-major order
    pub fn scalars(&self) -> Vec<&Value> {
        match self {
            Value::Array(items) => items.iter().flat_map(|v| v.scalars()).collect(),
            scalar => vec![scalar],
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A group node
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    /// Object name
    pub name: String,
    /// Base class of the group
    pub nxclass: String,
    /// Absolute path in the tree
    pub path: String,
    /// Attributes, in file order
    pub attributes: IndexMap<String, Value>,
    /// Children by name, in file order
    pub children: IndexMap<String, Node>,
}

impl GroupNode {
    /// Create an empty group
    pub fn new(name: impl Into<String>, nxclass: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: format!("/{}", name),
            name,
            nxclass: nxclass.into(),
            attributes: IndexMap::new(),
            children: IndexMap::new(),
        }
    }

    /// Add an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Add a child node
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        let child = child.into();
        self.children.insert(child.name().to_string(), child);
        self
    }

    /// Turn this group into the root of a tree and assign absolute paths
    pub fn into_root(mut self) -> Self {
        self.assign_paths("/");
        self
    }

    pub(crate) fn assign_paths(&mut self, path: &str) {
        self.path = path.to_string();
        for child in self.children.values_mut() {
            let child_path = join_path(path, child.name());
            match child {
                Node::Group(g) => g.assign_paths(&child_path),
                Node::Field(f) => f.path = child_path,
            }
        }
    }

    /// Get an attribute value
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Get a direct child by name
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Get a direct child field by name
    pub fn field(&self, name: &str) -> Option<&FieldNode> {
        self.child(name).and_then(Node::as_field)
    }

    /// Iterate over child groups
    pub fn groups(&self) -> impl Iterator<Item = &GroupNode> {
        self.children.values().filter_map(Node::as_group)
    }

    /// Iterate over child fields
    pub fn fields(&self) -> impl Iterator<Item = &FieldNode> {
        self.children.values().filter_map(Node::as_field)
    }

    /// Child groups of a given class
    pub fn groups_of_class<'a>(&'a self, nxclass: &'a str) -> impl Iterator<Item = &'a GroupNode> + 'a {
        self.groups().filter(move |g| g.nxclass == nxclass)
    }

    /// Look up a node by path relative to this group
    ///
    /// Leading and repeated slashes are ignored, so `/entry/data` and
    /// `entry/data` resolve the same way from the root.
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        let mut parts = path.split('/').filter(|p| !p.is_empty());
        let first = match parts.next() {
            Some(first) => first,
            None => return None,
        };
        let mut node = self.child(first)?;
        for part in parts {
            node = node.as_group()?.child(part)?;
        }
        Some(node)
    }

    /// Look up a group by path, where an empty path or `/` is this group
    pub fn lookup_group(&self, path: &str) -> Option<&GroupNode> {
        if path.split('/').all(|p| p.is_empty()) {
            return Some(self);
        }
        self.lookup(path).and_then(Node::as_group)
    }

    /// Parent group of the node at `path`, if it has one
    pub fn parent_of(&self, path: &str) -> Option<&GroupNode> {
        let trimmed = path.trim_end_matches('/');
        let (parent, name) = trimmed.rsplit_once('/')?;
        if name.is_empty() {
            return None;
        }
        self.lookup_group(parent)
    }
}

/// A field node
#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    /// Object name
    pub name: String,
    /// Absolute path in the tree
    pub path: String,
    /// Attributes, in file order
    pub attributes: IndexMap<String, Value>,
    /// Stored value
    pub value: Value,
    /// Runtime storage type
    pub dtype: DataType,
    /// Array shape (empty for scalars)
    pub shape: Vec<usize>,
}

impl FieldNode {
    /// Create a field, inferring type and shape from the value
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        let name = name.into();
        Self {
            path: format!("/{}", name),
            name,
            attributes: IndexMap::new(),
            dtype: value.infer_dtype(),
            shape: value.shape(),
            value,
        }
    }

    /// Override the storage type
    pub fn with_dtype(mut self, dtype: DataType) -> Self {
        self.dtype = dtype;
        self
    }

    /// Override the shape
    pub fn with_shape(mut self, shape: Vec<usize>) -> Self {
        self.shape = shape;
        self
    }

    /// Add an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }
}

/// A node of the instance tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A group
    Group(GroupNode),
    /// A field
    Field(FieldNode),
}

impl Node {
    /// Object name
    pub fn name(&self) -> &str {
        match self {
            Node::Group(g) => &g.name,
            Node::Field(f) => &f.name,
        }
    }

    /// The group, if this is one
    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            Node::Group(g) => Some(g),
            Node::Field(_) => None,
        }
    }

    /// The field, if this is one
    pub fn as_field(&self) -> Option<&FieldNode> {
        match self {
            Node::Field(f) => Some(f),
            Node::Group(_) => None,
        }
    }
}

impl From<GroupNode> for Node {
    fn from(group: GroupNode) -> Self {
        Node::Group(group)
    }
}

impl From<FieldNode> for Node {
    fn from(field: FieldNode) -> Self {
        Node::Field(field)
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> GroupNode {
        GroupNode::new("root", "NXroot")
            .with_child(
                GroupNode::new("entry", "NXentry")
                    .with_child(FieldNode::new("title", Value::Text("run 1".into())))
                    .with_child(
                        GroupNode::new("data", "NXdata").with_child(FieldNode::new(
                            "counts",
                            Value::Array(vec![
                                Value::Array(vec![Value::Int(1), Value::Int(2)]),
                                Value::Array(vec![Value::Int(3), Value::Int(4)]),
                            ]),
                        )),
                    ),
            )
            .into_root()
    }

    #[test]
    fn test_paths_are_assigned() {
        let root = sample_tree();
        assert_eq!(root.path, "/");
        let data = root.lookup_group("/entry/data").unwrap();
        assert_eq!(data.path, "/entry/data");
        assert_eq!(data.field("counts").unwrap().path, "/entry/data/counts");
    }

    #[test]
    fn test_lookup_and_parent() {
        let root = sample_tree();
        assert!(root.lookup("entry/title").unwrap().as_field().is_some());
        assert!(root.lookup("/missing").is_none());
        assert_eq!(root.lookup_group("/").unwrap().nxclass, "NXroot");
        assert_eq!(root.parent_of("/entry/data").unwrap().nxclass, "NXentry");
        assert_eq!(root.parent_of("/entry").unwrap().nxclass, "NXroot");
        assert!(root.parent_of("/").is_none());
    }

    #[test]
    fn test_field_shape_and_type_inference() {
        let root = sample_tree();
        let counts = root.lookup("/entry/data/counts").unwrap().as_field().unwrap();
        assert_eq!(counts.shape, vec![2, 2]);
        assert_eq!(counts.ndim(), 2);
        assert_eq!(counts.dtype, DataType::Int64);

        let title = root.lookup("/entry/title").unwrap().as_field().unwrap();
        assert_eq!(title.ndim(), 0);
        assert_eq!(title.dtype, DataType::String);
    }

    #[test]
    fn test_data_type_categories() {
        assert!(DataType::UInt16.is_integer());
        assert!(DataType::UInt16.is_unsigned());
        assert!(!DataType::Int16.is_unsigned());
        assert!(DataType::Complex64.is_number());
        assert!(!DataType::Bool.is_number());
        assert!(DataType::Bytes.is_char());
    }

    #[test]
    fn test_value_display() {
        let value = Value::Array(vec![Value::Float(1.5), Value::Text("a".into())]);
        assert_eq!(value.to_string(), "[1.5, a]");
    }
}
