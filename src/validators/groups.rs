//! Group validation
//!
//! Checks one instance group against its base class: name syntax, whether the
//! parent class admits it, its attributes, the plottable-data cross references
//! of `NXdata`, and every field it holds. Child groups are not visited here;
//! walking the tree is up to the caller.

use crate::error::Result;
use crate::names::{is_valid_name, split_axes, AXIS_PLACEHOLDER};
use crate::settings::Settings;
use crate::tree::{GroupNode, Value};
use crate::validators::diagnostics::Diagnostics;
use crate::validators::fields::FieldValidator;
use crate::validators::models::ConstraintModel;
use crate::validators::store::SchemaStore;

/// Class whose `signal` and `axes` attributes are cross-checked
pub const PLOTTABLE_CLASS: &str = "NXdata";

/// Validator for group nodes
#[derive(Debug, Clone, Copy)]
pub struct GroupValidator<'a> {
    store: &'a SchemaStore,
    settings: &'a Settings,
}

impl<'a> GroupValidator<'a> {
    /// Create a validator
    pub fn new(store: &'a SchemaStore, settings: &'a Settings) -> Self {
        Self { store, settings }
    }

    /// Validate `group`, whose parent (if any) is `parent`
    ///
    /// Only a malformed definition document makes this fail; everything about
    /// the instance itself ends up in the returned unit.
    pub fn validate(
        &self,
        group: &GroupNode,
        parent: Option<&GroupNode>,
        depth: usize,
    ) -> Result<Diagnostics> {
        let mut unit = Diagnostics::new();
        let level = depth + 1;
        let class = group.nxclass.as_str();

        unit.header(format!("{}: {}", class, group.path), depth);

        if !is_valid_name(&group.name) {
            unit.error(format!("\"{}\" is an invalid name", group.name), level);
        }

        let model = self.store.load(class)?;
        if !model.is_valid() {
            unit.error(format!("{} is not a valid base class", class), level);
            return Ok(unit);
        }

        if let Some(parent) = parent {
            self.check_parent(class, parent, &mut unit, level)?;
        }

        check_attributes(&model, group, &mut unit, level);

        if class == PLOTTABLE_CLASS {
            check_plottable(group, &mut unit, level);
        }

        let fields = FieldValidator::new(&self.settings.field_policy);
        for field in group.fields() {
            let constraint = model.valid_fields().get(&field.name);
            let field_unit = fields.validate(constraint, field, &model, level, None);
            unit.absorb(field_unit, self.settings.threshold);
        }

        Ok(unit)
    }

    fn check_parent(
        &self,
        class: &str,
        parent: &GroupNode,
        unit: &mut Diagnostics,
        level: usize,
    ) -> Result<()> {
        let parent_model = self.store.load(&parent.nxclass)?;
        // An unknown parent is reported on its own node
        if !parent_model.is_valid() || parent_model.content.permits_class(class) {
            return Ok(());
        }

        if parent_model.flags.allow_extra_groups {
            unit.info(
                format!(
                    "{} is not defined in {}. Additional classes are allowed.",
                    class, parent.nxclass
                ),
                level,
            );
        } else {
            unit.error(
                format!("{} is an invalid class in {}", class, parent.nxclass),
                level,
            );
        }
        Ok(())
    }
}

fn check_attributes(
    model: &ConstraintModel,
    group: &GroupNode,
    unit: &mut Diagnostics,
    level: usize,
) {
    let class = &model.name;
    for name in group.attributes.keys() {
        if model.valid_attributes().contains_key(name) {
            unit.info(format!("\"@{}\" is a valid attribute in {}", name, class), level);
        } else if model.flags.allow_extra_attributes {
            unit.info(
                format!(
                    "\"@{}\" is not defined as an attribute in {}. Additional attributes are allowed.",
                    name, class
                ),
                level,
            );
        } else {
            unit.warning(
                format!("\"@{}\" is not defined as an attribute in {}", name, class),
                level,
            );
        }
    }
}

fn check_plottable(group: &GroupNode, unit: &mut Diagnostics, level: usize) {
    let signal = match group.attribute("signal") {
        Some(value) => {
            let signal = value.to_string();
            if group.child(&signal).is_none() {
                unit.error(
                    format!("Signal \"{}\" not present in group \"{}\"", signal, group.path),
                    level,
                );
            }
            Some(signal)
        }
        None => {
            unit.error(
                format!("\"@signal\" not defined in NXdata group \"{}\"", group.path),
                level,
            );
            None
        }
    };

    let Some(axes) = group.attribute("axes").map(axis_names) else {
        return;
    };

    for axis in &axes {
        if axis != AXIS_PLACEHOLDER && group.child(axis).is_none() {
            unit.error(
                format!("Axis \"{}\" not present in group \"{}\"", axis, group.path),
                level,
            );
        }
    }

    if let Some(field) = signal.as_deref().and_then(|s| group.field(s)) {
        if axes.len() == field.ndim() {
            unit.info("\"@axes\" has the correct length", level);
        } else {
            unit.error("\"@axes\" length does not match the signal rank", level);
        }
    }
}

fn axis_names(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(|v| v.to_string()).collect(),
        other => split_axes(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::Definitions;
    use crate::tree::FieldNode;
    use crate::validators::diagnostics::Severity;
    use std::fs;
    use tempfile::TempDir;

    fn definitions() -> TempDir {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("base_classes");
        fs::create_dir_all(&base).unwrap();
        let classes = [
            (
                "NXroot",
                r#"<definition name="NXroot" extends="NXobject">
                    <attribute name="file_name"/>
                    <group type="NXentry"/>
                </definition>"#,
            ),
            (
                "NXentry",
                r#"<definition name="NXentry" extends="NXobject">
                    <group type="NXdata"/>
                    <group type="NXsample"/>
                    <field name="title"/>
                </definition>"#,
            ),
            (
                "NXdata",
                r#"<definition name="NXdata" extends="NXobject"
                    ignoreExtraGroups="true" ignoreExtraFields="true" ignoreExtraAttributes="true">
                    <attribute name="signal"/>
                    <attribute name="axes"/>
                </definition>"#,
            ),
            (
                "NXsample",
                r#"<definition name="NXsample" extends="NXobject">
                    <field name="name" type="NX_CHAR"/>
                </definition>"#,
            ),
        ];
        for (name, xml) in classes {
            fs::write(base.join(format!("{}.nxdl.xml", name)), xml).unwrap();
        }
        dir
    }

    fn messages(unit: &Diagnostics, severity: Severity) -> Vec<String> {
        unit.iter()
            .filter(|d| !d.header && d.severity == severity)
            .map(|d| d.message.clone())
            .collect()
    }

    fn plottable(signal: Option<&str>, axes: Option<&str>) -> GroupNode {
        let mut data = GroupNode::new("data", "NXdata")
            .with_child(FieldNode::new("data", Value::Int(0)).with_shape(vec![3, 4]))
            .with_child(FieldNode::new("x", Value::Int(0)).with_shape(vec![3]))
            .with_child(FieldNode::new("y", Value::Int(0)).with_shape(vec![4]));
        if let Some(signal) = signal {
            data = data.with_attribute("signal", Value::Text(signal.into()));
        }
        if let Some(axes) = axes {
            data = data.with_attribute("axes", Value::Text(axes.into()));
        }
        data
    }

    #[test]
    fn test_unknown_class_stops_checks() {
        let dir = definitions();
        let store = SchemaStore::new(Definitions::new(dir.path()));
        let settings = Settings::default();

        let group = GroupNode::new("thing", "NXunknown")
            .with_attribute("odd", Value::Int(1))
            .with_child(FieldNode::new("value", Value::Int(1)));
        let unit = GroupValidator::new(&store, &settings)
            .validate(&group, None, 0)
            .unwrap();

        assert_eq!(
            messages(&unit, Severity::Error),
            vec!["NXunknown is not a valid base class"]
        );
        assert_eq!(unit.len(), 2);
    }

    #[test]
    fn test_parent_legality() {
        let dir = definitions();
        let store = SchemaStore::new(Definitions::new(dir.path()));
        let settings = Settings::default();
        let validator = GroupValidator::new(&store, &settings);

        let entry = GroupNode::new("entry", "NXentry");
        let sample = GroupNode::new("sample", "NXsample");
        let unit = validator.validate(&sample, Some(&entry), 1).unwrap();
        assert!(messages(&unit, Severity::Error).is_empty());

        let root = GroupNode::new("root", "NXroot");
        let unit = validator.validate(&sample, Some(&root), 1).unwrap();
        assert_eq!(
            messages(&unit, Severity::Error),
            vec!["NXsample is an invalid class in NXroot"]
        );

        let data = GroupNode::new("data", "NXdata");
        let unit = validator.validate(&sample, Some(&data), 2).unwrap();
        assert_eq!(
            messages(&unit, Severity::Info),
            vec!["NXsample is not defined in NXdata. Additional classes are allowed."]
        );
    }

    #[test]
    fn test_unknown_parent_skips_legality() {
        let dir = definitions();
        let store = SchemaStore::new(Definitions::new(dir.path()));
        let settings = Settings::default();

        let parent = GroupNode::new("odd", "NXodd");
        let sample = GroupNode::new("sample", "NXsample");
        let unit = GroupValidator::new(&store, &settings)
            .validate(&sample, Some(&parent), 1)
            .unwrap();
        assert!(messages(&unit, Severity::Error).is_empty());
    }

    #[test]
    fn test_attributes() {
        let dir = definitions();
        let store = SchemaStore::new(Definitions::new(dir.path()));
        let settings = Settings::default();

        let root = GroupNode::new("root", "NXroot")
            .with_attribute("file_name", Value::Text("a.nxs".into()))
            .with_attribute("creator", Value::Text("me".into()));
        let unit = GroupValidator::new(&store, &settings)
            .validate(&root, None, 0)
            .unwrap();

        assert_eq!(
            messages(&unit, Severity::Info),
            vec!["\"@file_name\" is a valid attribute in NXroot"]
        );
        assert_eq!(
            messages(&unit, Severity::Warning),
            vec!["\"@creator\" is not defined as an attribute in NXroot"]
        );
    }

    #[test]
    fn test_axes_length_matches_signal_rank() {
        let dir = definitions();
        let store = SchemaStore::new(Definitions::new(dir.path()));
        let settings = Settings::default().with_threshold(Severity::Info);
        let validator = GroupValidator::new(&store, &settings);

        let unit = validator
            .validate(&plottable(Some("data"), Some("x:y")), None, 0)
            .unwrap();
        assert!(messages(&unit, Severity::Info).contains(&"\"@axes\" has the correct length".to_string()));
        assert!(messages(&unit, Severity::Error).is_empty());

        let unit = validator
            .validate(&plottable(Some("data"), Some("x")), None, 0)
            .unwrap();
        assert_eq!(
            messages(&unit, Severity::Error),
            vec!["\"@axes\" length does not match the signal rank"]
        );
    }

    #[test]
    fn test_axes_placeholder_and_missing_axis() {
        let dir = definitions();
        let store = SchemaStore::new(Definitions::new(dir.path()));
        let settings = Settings::default();
        let validator = GroupValidator::new(&store, &settings);

        let unit = validator
            .validate(&plottable(Some("data"), Some("[., y]")), None, 0)
            .unwrap();
        assert!(messages(&unit, Severity::Error).is_empty());

        let unit = validator
            .validate(&plottable(Some("data"), Some("x, y")), None, 0)
            .unwrap();
        assert!(messages(&unit, Severity::Error).is_empty());

        let unit = validator
            .validate(&plottable(Some("data"), Some("x,z")), None, 0)
            .unwrap();
        assert_eq!(
            messages(&unit, Severity::Error),
            vec!["Axis \"z\" not present in group \"/data\""]
        );
    }

    #[test]
    fn test_signal_problems() {
        let dir = definitions();
        let store = SchemaStore::new(Definitions::new(dir.path()));
        let settings = Settings::default();
        let validator = GroupValidator::new(&store, &settings);

        let unit = validator.validate(&plottable(None, None), None, 0).unwrap();
        assert_eq!(
            messages(&unit, Severity::Error),
            vec!["\"@signal\" not defined in NXdata group \"/data\""]
        );

        let unit = validator
            .validate(&plottable(Some("counts"), None), None, 0)
            .unwrap();
        assert_eq!(
            messages(&unit, Severity::Error),
            vec!["Signal \"counts\" not present in group \"/data\""]
        );
    }

    #[test]
    fn test_field_units_follow_threshold() {
        let dir = definitions();
        let store = SchemaStore::new(Definitions::new(dir.path()));

        let sample = GroupNode::new("sample", "NXsample")
            .with_child(FieldNode::new("name", Value::Text("Si".into())))
            .with_child(FieldNode::new("colour", Value::Text("grey".into())));

        let quiet = Settings::default();
        let unit = GroupValidator::new(&store, &quiet)
            .validate(&sample, None, 0)
            .unwrap();
        let headers: Vec<_> = unit.iter().filter(|d| d.header).map(|d| d.message.as_str()).collect();
        assert_eq!(headers, vec!["NXsample: /sample", "Field: /colour"]);

        let verbose = Settings::default().with_threshold(Severity::Info);
        let unit = GroupValidator::new(&store, &verbose)
            .validate(&sample, None, 0)
            .unwrap();
        assert_eq!(unit.iter().filter(|d| d.header).count(), 3);
    }
}
