//! Base class inspection
//!
//! Lists what a base class permits, as info lines ready for the output sink,
//! or as a JSON dump of its model.

use crate::error::{Error, Result};
use crate::validators::diagnostics::Diagnostics;
use crate::validators::models::{ConstraintModel, FieldConstraint, GroupConstraint, Occurs};
use crate::validators::store::SchemaStore;
use std::sync::Arc;

/// Describe the base class `name`
pub fn inspect_base_class(store: &SchemaStore, name: &str) -> Result<Diagnostics> {
    let model = load_valid(store, name)?;
    let mut listing = Diagnostics::new();

    listing.header(format!("Base Class: {}", name), 0);

    for attribute in model.valid_attributes().keys() {
        listing.info(format!("@{}", attribute), 1);
    }

    if !model.valid_groups().is_empty() {
        listing.info("Allowed Groups", 1);
        for group in model.valid_groups().values() {
            listing.info(describe_group(group), 2);
        }
    }

    if !model.valid_fields().is_empty() {
        listing.info("Defined Fields", 1);
        for field in model.valid_fields().values() {
            listing.info(format!("{}: {}", field.name, field_properties(field)), 2);
            for line in field_details(field) {
                listing.info(line, 3);
            }
        }
    }

    Ok(listing)
}

/// JSON form of the model of the base class `name`
pub fn dump_base_class(store: &SchemaStore, name: &str) -> Result<String> {
    let model = load_valid(store, name)?;
    Ok(serde_json::to_string_pretty(model.as_ref())?)
}

fn load_valid(store: &SchemaStore, name: &str) -> Result<Arc<ConstraintModel>> {
    let model = store.load(name)?;
    if !model.is_valid() {
        return Err(Error::Definition(format!("{} is not a valid base class", name)));
    }
    Ok(model)
}

fn describe_group(group: &GroupConstraint) -> String {
    let mut properties = occurs_properties(&group.occurs);
    if group.deprecated.is_some() {
        properties.push("deprecated".to_string());
    }
    let label = match &group.name {
        Some(name) => format!("{}[{}]", name, group.nxclass),
        None => group.nxclass.clone(),
    };
    format!("{}: {{{}}}", label, properties.join(", "))
}

fn field_properties(field: &FieldConstraint) -> String {
    let mut properties = Vec::new();
    if let Some(nx_type) = field.nx_type {
        properties.push(format!("type={}", nx_type));
    }
    if let Some(units) = &field.units {
        properties.push(format!("units={}", units));
    }
    properties.extend(occurs_properties(&field.occurs));
    if field.deprecated.is_some() {
        properties.push("deprecated".to_string());
    }
    format!("{{{}}}", properties.join(", "))
}

fn field_details(field: &FieldConstraint) -> Vec<String> {
    let mut details = Vec::new();
    if let Some(dimensions) = &field.dimensions {
        let dims: Vec<String> = dimensions
            .dims
            .iter()
            .map(|(index, value)| format!("{}={}", index, value))
            .collect();
        details.push(format!(
            "dimensions: rank={} [{}]",
            dimensions.rank.as_deref().unwrap_or("?"),
            dims.join(", ")
        ));
    }
    if let Some(values) = &field.enumeration {
        details.push(format!("enumeration: [{}]", values.join(", ")));
    }
    if !field.attributes.is_empty() {
        let names: Vec<&str> = field.attributes.keys().map(String::as_str).collect();
        details.push(format!("attributes: [{}]", names.join(", ")));
    }
    details
}

fn occurs_properties(occurs: &Occurs) -> Vec<String> {
    let mut properties = Vec::new();
    if let Some(min) = occurs.min {
        properties.push(format!("minOccurs={}", min));
    }
    if occurs.is_recommended() {
        properties.push("recommended".to_string());
    } else if occurs.min.is_none() && occurs.is_optional() {
        properties.push("optional".to_string());
    }
    properties
}
