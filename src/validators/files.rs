//! Whole-file validation
//!
//! Walks an instance tree depth first, node before children, and validates
//! every group against its base class.

use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::tree::GroupNode;
use crate::validators::diagnostics::Report;
use crate::validators::groups::GroupValidator;
use crate::validators::store::SchemaStore;

/// Validator for a complete instance tree
#[derive(Debug, Clone, Copy)]
pub struct FileValidator<'a> {
    groups: GroupValidator<'a>,
    settings: &'a Settings,
}

impl<'a> FileValidator<'a> {
    /// Create a validator
    pub fn new(store: &'a SchemaStore, settings: &'a Settings) -> Self {
        Self {
            groups: GroupValidator::new(store, settings),
            settings,
        }
    }

    /// Validate `tree`, or only the subtree at `path`
    ///
    /// When a subtree is validated its starting group is still checked against
    /// the class of its parent.
    #[tracing::instrument(level = "debug", skip(self, tree), fields(root = %tree.name))]
    pub fn validate(&self, tree: &GroupNode, path: Option<&str>) -> Result<Report> {
        let start = match path {
            Some(path) => tree
                .lookup_group(path)
                .ok_or_else(|| Error::Instance(format!("Group {} not found", path)))?,
            None => tree,
        };
        let parent = if std::ptr::eq(start, tree) {
            None
        } else {
            tree.parent_of(&start.path)
        };

        let mut report = Report::new(self.settings.threshold);
        self.walk(start, parent, 0, &mut report)?;
        Ok(report)
    }

    fn walk(
        &self,
        group: &GroupNode,
        parent: Option<&GroupNode>,
        depth: usize,
        report: &mut Report,
    ) -> Result<()> {
        report.emit(self.groups.validate(group, parent, depth)?);
        for child in group.groups() {
            self.walk(child, Some(group), depth + 1, report)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::Definitions;
    use crate::tree::{FieldNode, Value};
    use crate::validators::diagnostics::Severity;
    use std::fs;
    use tempfile::TempDir;

    fn definitions() -> TempDir {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("base_classes");
        fs::create_dir_all(&base).unwrap();
        fs::write(
            base.join("NXroot.nxdl.xml"),
            r#"<definition name="NXroot" extends="NXobject"><group type="NXentry"/></definition>"#,
        )
        .unwrap();
        fs::write(
            base.join("NXentry.nxdl.xml"),
            r#"<definition name="NXentry" extends="NXobject">
                <group type="NXsample"/><field name="title"/>
            </definition>"#,
        )
        .unwrap();
        dir
    }

    fn tree() -> GroupNode {
        GroupNode::new("scan", "NXroot")
            .with_child(
                GroupNode::new("entry", "NXentry")
                    .with_child(FieldNode::new("title", Value::Text("run".into())))
                    .with_child(GroupNode::new("sample", "NXsample")),
            )
            .into_root()
    }

    fn headers(report: &Report) -> Vec<(String, usize)> {
        report
            .lines()
            .iter()
            .filter(|d| d.header)
            .map(|d| (d.message.clone(), d.depth))
            .collect()
    }

    #[test]
    fn test_walk_order_and_depth() {
        let dir = definitions();
        let store = SchemaStore::new(Definitions::new(dir.path()));
        let settings = Settings::default().with_threshold(Severity::Info);

        let report = FileValidator::new(&store, &settings).validate(&tree(), None).unwrap();
        assert_eq!(
            headers(&report),
            vec![
                ("NXroot: /".to_string(), 0),
                ("NXentry: /entry".to_string(), 1),
                ("Field: /entry/title".to_string(), 2),
                ("NXsample: /entry/sample".to_string(), 2),
            ]
        );
        assert_eq!(report.errors(), 1);
    }

    #[test]
    fn test_subtree_checks_parent() {
        let dir = definitions();
        let store = SchemaStore::new(Definitions::new(dir.path()));
        let settings = Settings::default();

        let tree = GroupNode::new("scan", "NXroot")
            .with_child(GroupNode::new("misplaced", "NXsample"))
            .into_root();
        fs::write(
            dir.path().join("base_classes/NXsample.nxdl.xml"),
            r#"<definition name="NXsample" extends="NXobject"/>"#,
        )
        .unwrap();

        let report = FileValidator::new(&store, &settings)
            .validate(&tree, Some("/misplaced"))
            .unwrap();
        let errors: Vec<_> = report
            .lines()
            .iter()
            .filter(|d| !d.header)
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(errors, vec!["NXsample is an invalid class in NXroot"]);
    }

    #[test]
    fn test_unknown_path() {
        let dir = definitions();
        let store = SchemaStore::new(Definitions::new(dir.path()));
        let settings = Settings::default();

        let result = FileValidator::new(&store, &settings).validate(&tree(), Some("/entry/title"));
        assert!(matches!(result, Err(Error::Instance(_))));
    }
}
