//! Application definition validation
//!
//! Walks the merged template of an application definition in step with an
//! entry group. Only the shape the definition declares is visited; anything
//! else in the entry is left to the base-class walk.

use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::tree::{GroupNode, Value};
use crate::validators::diagnostics::{Diagnostics, Report};
use crate::validators::fields::FieldValidator;
use crate::validators::inheritance::InheritanceResolver;
use crate::validators::models::{ConstraintModel, Content, GroupConstraint};
use crate::validators::store::SchemaStore;

/// Classes an application definition can be checked against
pub const ENTRY_CLASSES: [&str; 2] = ["NXentry", "NXsubentry"];

/// Field of an entry naming its application definition
pub const DEFINITION_FIELD: &str = "definition";

/// Validator for one application definition
#[derive(Debug)]
pub struct ApplicationValidator<'a> {
    store: &'a SchemaStore,
    settings: &'a Settings,
    model: ConstraintModel,
}

impl<'a> ApplicationValidator<'a> {
    /// Resolve the application `name` and prepare a validator for it
    pub fn new(store: &'a SchemaStore, settings: &'a Settings, name: &str) -> Result<Self> {
        let model = InheritanceResolver::new(store).resolve(name)?;
        Ok(Self::from_model(store, settings, model))
    }

    /// Prepare a validator for an already resolved model
    pub fn from_model(store: &'a SchemaStore, settings: &'a Settings, model: ConstraintModel) -> Self {
        Self {
            store,
            settings,
            model,
        }
    }

    /// The merged model
    pub fn model(&self) -> &ConstraintModel {
        &self.model
    }

    /// Validate `entry` against the definition
    #[tracing::instrument(level = "debug", skip_all, fields(application = %self.model.name, entry = %entry.path))]
    pub fn validate(&self, entry: &GroupNode) -> Result<Report> {
        let mut report = Report::new(self.settings.threshold);
        self.validate_content(&self.model.content, entry, 0, &mut report)?;
        Ok(report)
    }

    fn validate_content(
        &self,
        content: &Content,
        group: &GroupNode,
        depth: usize,
        report: &mut Report,
    ) -> Result<()> {
        if !content.attributes.is_empty() {
            report.emit(check_attributes(content, group, depth));
        }

        for constraint in content.groups.values() {
            let matches = matching_groups(constraint, group);
            report.emit(check_group_count(constraint, matches.len(), depth));
            for child in matches {
                self.validate_content(&constraint.content, child, depth + 1, report)?;
            }
        }

        if content.fields.is_empty() {
            return Ok(());
        }

        let parent = self.store.load(&group.nxclass)?;
        let fields = FieldValidator::new(&self.settings.field_policy);
        for (name, constraint) in &content.fields {
            let unit = match group.field(name) {
                Some(field) => {
                    fields.validate(Some(constraint), field, &parent, depth, Some(constraint.occurs))
                }
                None => {
                    let mut unit = Diagnostics::new();
                    unit.header(format!("Field: {}", join_path(&group.path, name)), depth);
                    let occurs = constraint.occurs;
                    if occurs.min_occurs() > 0 {
                        unit.error("This required field is not in the NeXus file", depth + 1);
                    } else if occurs.is_recommended() {
                        unit.warning("This recommended field is not in the NeXus file", depth + 1);
                    } else {
                        unit.info("This optional field is not in the NeXus file", depth + 1);
                    }
                    unit
                }
            };
            report.emit(unit);
        }

        Ok(())
    }
}

fn matching_groups<'g>(constraint: &'g GroupConstraint, group: &'g GroupNode) -> Vec<&'g GroupNode> {
    group
        .groups_of_class(&constraint.nxclass)
        .filter(|g| constraint.name.as_deref().map_or(true, |name| g.name == name))
        .collect()
}

fn check_group_count(constraint: &GroupConstraint, found: usize, depth: usize) -> Diagnostics {
    let mut unit = Diagnostics::new();
    let class = &constraint.nxclass;
    match &constraint.name {
        Some(name) => unit.header(format!("Group: {}: {}", name, class), depth),
        None => unit.header(format!("Group: {}", class), depth),
    }

    let min = constraint.occurs.min_occurs() as usize;
    if found < min {
        unit.error(
            format!(
                "{} {} group(s) are in the NeXus file.  At least {} are required",
                found, class, min
            ),
            depth + 1,
        );
    } else if found == 0 {
        if constraint.occurs.is_recommended() {
            unit.warning("This recommended group is not in the NeXus file", depth + 1);
        } else {
            unit.info("This optional group is not in the NeXus file", depth + 1);
        }
    }
    unit
}

fn check_attributes(content: &Content, group: &GroupNode, depth: usize) -> Diagnostics {
    let mut unit = Diagnostics::new();
    unit.header(format!("Attributes: {}", group.path), depth);

    for (name, constraint) in &content.attributes {
        let level = depth + 1;
        if group.attributes.contains_key(name) {
            unit.info(format!("\"@{}\" is in the NeXus file", name), level);
        } else if constraint.min_occurs() > 0 {
            unit.error(
                format!("The required attribute \"@{}\" is not in the NeXus file", name),
                level,
            );
        } else if constraint.occurs.is_recommended() {
            unit.warning(
                format!("The recommended attribute \"@{}\" is not in the NeXus file", name),
                level,
            );
        } else {
            unit.info(
                format!("The optional attribute \"@{}\" is not in the NeXus file", name),
                level,
            );
        }
    }
    unit
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Validate the entry at `path` of `tree` against an application definition
///
/// Without a path the first `NXentry` of the root is used. Without a name the
/// entry's `definition` field selects the application.
#[tracing::instrument(level = "debug", skip(store, settings, tree))]
pub fn validate_application(
    store: &SchemaStore,
    settings: &Settings,
    tree: &GroupNode,
    path: Option<&str>,
    name: Option<&str>,
) -> Result<Report> {
    let entry = match path {
        Some(path) => tree
            .lookup_group(path)
            .ok_or_else(|| Error::Instance(format!("Path {} not found", path)))?,
        None => tree
            .groups_of_class(ENTRY_CLASSES[0])
            .next()
            .ok_or_else(|| Error::Instance("No NXentry group found".to_string()))?,
    };

    if !ENTRY_CLASSES.contains(&entry.nxclass.as_str()) {
        return Err(Error::Instance(format!(
            "Path {} not a NXentry or NXsubentry group",
            entry.path
        )));
    }

    let name = match name {
        Some(name) => name.to_string(),
        None => entry
            .field(DEFINITION_FIELD)
            .map(|f| match &f.value {
                Value::Text(text) => text.trim().to_string(),
                other => other.to_string(),
            })
            .ok_or_else(|| {
                Error::Instance(format!("No application definition defined in {}", entry.path))
            })?,
    };

    ApplicationValidator::new(store, settings, &name)?.validate(entry)
}
