//! Instance tree readers
//!
//! The engine does not parse container files itself. A [`TreeReader`]
//! turns a file into a [`GroupNode`] tree; [`JsonTreeReader`] reads the JSON
//! dump format below, which any HDF5 front end can produce.
//!
//! ```json
//! {
//!   "kind": "group", "name": "chopper", "class": "NXroot",
//!   "children": [
//!     {"kind": "group", "name": "entry", "class": "NXentry",
//!      "attributes": {"default": "data"},
//!      "children": [
//!        {"kind": "field", "name": "title", "value": "run 42"},
//!        {"kind": "field", "name": "counts", "value": [[1, 2], [3, 4]],
//!         "dtype": "int32", "attributes": {"units": "counts"}}
//!      ]}
//!   ]
//! }
//! ```

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::loaders::Loader;
use crate::tree::{DataType, FieldNode, GroupNode, Node, Value};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// Name given to a root group the document leaves unnamed
pub const ROOT_NAME: &str = "root";

/// Source of instance trees
pub trait TreeReader {
    /// Read the file at `path` and return its root group
    fn read(&self, path: &Path) -> Result<GroupNode>;
}

/// Reader for JSON tree dumps
#[derive(Debug, Clone, Default)]
pub struct JsonTreeReader {
    loader: Loader,
}

impl JsonTreeReader {
    /// Create a reader with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.loader = self.loader.with_limits(limits);
        self
    }

    /// Parse a JSON tree from a string
    ///
    /// `default_name` names the root group when the document leaves it out.
    pub fn from_str(&self, json: &str, default_name: &str) -> Result<GroupNode> {
        let raw: RawNode = serde_json::from_str(json)?;
        let mut root = match raw {
            RawNode::Group(group) => group,
            RawNode::Field(_) => {
                return Err(Error::Instance(
                    "The root of an instance tree must be a group".to_string(),
                ))
            }
        };
        if root.name.is_empty() {
            root.name = default_name.to_string();
        }
        let root = self.convert_group(root, 0)?;
        Ok(root.into_root())
    }

    fn convert_group(&self, raw: RawGroup, depth: usize) -> Result<GroupNode> {
        self.loader.limits().check_tree_depth(depth)?;

        let mut group = GroupNode::new(raw.name, raw.nxclass);
        group.attributes = raw.attributes;
        for child in raw.children {
            let node: Node = match child {
                RawNode::Group(g) => self.convert_group(g, depth + 1)?.into(),
                RawNode::Field(f) => convert_field(f).into(),
            };
            if group.children.contains_key(node.name()) {
                return Err(Error::Instance(format!(
                    "Duplicate child '{}' in group '{}'",
                    node.name(),
                    group.name
                )));
            }
            group.children.insert(node.name().to_string(), node);
        }
        Ok(group)
    }
}

impl TreeReader for JsonTreeReader {
    fn read(&self, path: &Path) -> Result<GroupNode> {
        let content = self.loader.load_instance(path)?;
        tracing::debug!(file = %path.display(), "reading instance tree");
        self.from_str(&content, ROOT_NAME)
    }
}

fn convert_field(raw: RawField) -> FieldNode {
    let mut field = FieldNode::new(raw.name, raw.value);
    if let Some(dtype) = raw.dtype {
        field = field.with_dtype(dtype);
    }
    if let Some(shape) = raw.shape {
        field = field.with_shape(shape);
    }
    field.attributes = raw.attributes;
    field
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum RawNode {
    Group(RawGroup),
    Field(RawField),
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    #[serde(default)]
    name: String,
    #[serde(rename = "class")]
    nxclass: String,
    #[serde(default)]
    attributes: IndexMap<String, Value>,
    #[serde(default)]
    children: Vec<RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    name: String,
    value: Value,
    #[serde(default)]
    dtype: Option<DataType>,
    #[serde(default)]
    shape: Option<Vec<usize>>,
    #[serde(default)]
    attributes: IndexMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TREE: &str = r#"{
        "kind": "group", "class": "NXroot",
        "children": [
            {"kind": "group", "name": "entry", "class": "NXentry",
             "attributes": {"default": "data"},
             "children": [
                {"kind": "field", "name": "title", "value": "run 42"},
                {"kind": "field", "name": "counts", "value": [[1, 2], [3, 4]],
                 "dtype": "int32", "attributes": {"units": "counts"}},
                {"kind": "field", "name": "image", "value": 0, "shape": [10, 20, 30]}
             ]}
        ]
    }"#;

    #[test]
    fn test_read_tree_from_string() {
        let root = JsonTreeReader::new().from_str(TREE, "chopper").unwrap();

        assert_eq!(root.name, "chopper");
        assert_eq!(root.path, "/");
        let entry = root.lookup_group("/entry").unwrap();
        assert_eq!(entry.attribute("default"), Some(&Value::Text("data".into())));

        let counts = entry.field("counts").unwrap();
        assert_eq!(counts.dtype, DataType::Int32);
        assert_eq!(counts.shape, vec![2, 2]);
        assert_eq!(counts.path, "/entry/counts");

        let image = entry.field("image").unwrap();
        assert_eq!(image.ndim(), 3);
    }

    #[test]
    fn test_unnamed_root_from_file() {
        let mut file = tempfile::Builder::new()
            .prefix("scan-2024")
            .suffix(".json")
            .tempfile()
            .unwrap();
        write!(file, "{}", TREE).unwrap();

        let root = JsonTreeReader::new().read(file.path()).unwrap();
        assert_eq!(root.name, ROOT_NAME);
        assert_eq!(root.path, "/");
    }

    #[test]
    fn test_field_root_is_rejected() {
        let json = r#"{"kind": "field", "name": "x", "value": 1}"#;
        let result = JsonTreeReader::new().from_str(json, ROOT_NAME);
        assert!(matches!(result, Err(Error::Instance(_))));
    }

    #[test]
    fn test_duplicate_children_are_rejected() {
        let json = r#"{"kind": "group", "class": "NXroot", "children": [
            {"kind": "field", "name": "x", "value": 1},
            {"kind": "field", "name": "x", "value": 2}
        ]}"#;
        let result = JsonTreeReader::new().from_str(json, ROOT_NAME);
        assert!(matches!(result, Err(Error::Instance(_))));
    }

    #[test]
    fn test_depth_limit() {
        let mut limits = Limits::default();
        limits.max_tree_depth = 1;
        let json = r#"{"kind": "group", "class": "NXroot", "children": [
            {"kind": "group", "name": "a", "class": "NXentry", "children": [
                {"kind": "group", "name": "b", "class": "NXdata"}
            ]}
        ]}"#;
        let result = JsonTreeReader::new().with_limits(limits).from_str(json, ROOT_NAME);
        assert!(matches!(result, Err(Error::LimitExceeded(_))));
    }
}
