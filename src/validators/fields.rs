//! Field validation
//!
//! Checks one instance field against the constraint its parent class (or an
//! application template) declares for it. The validator produces a single
//! diagnostics unit: a `Field:` header followed by the findings.

use crate::names::is_valid_name;
use crate::settings::FieldPolicy;
use crate::tree::FieldNode;
use crate::validators::builtins::{matches_type, type_label};
use crate::validators::diagnostics::Diagnostics;
use crate::validators::models::{ConstraintModel, FieldConstraint, Occurs};

/// Field attributes that have their own checks
const CHECKED_ATTRIBUTES: [&str; 3] = ["axis", "signal", "units"];

/// Validator for field nodes
#[derive(Debug, Clone, Copy)]
pub struct FieldValidator<'a> {
    policy: &'a FieldPolicy,
}

impl<'a> FieldValidator<'a> {
    /// Create a validator applying `policy` to undeclared fields
    pub fn new(policy: &'a FieldPolicy) -> Self {
        Self { policy }
    }

    /// Validate `field`
    ///
    /// `parent` is the base-class model of the group holding the field, and
    /// `depth` the display depth of the unit header. `occurs` is given when
    /// the field is checked on behalf of an application definition.
    pub fn validate(
        &self,
        constraint: Option<&FieldConstraint>,
        field: &FieldNode,
        parent: &ConstraintModel,
        depth: usize,
        occurs: Option<Occurs>,
    ) -> Diagnostics {
        let mut unit = Diagnostics::new();
        let level = depth + 1;
        let class = parent.name.as_str();

        unit.header(format!("Field: {}", field.path), depth);

        if !is_valid_name(&field.name) {
            unit.error(format!("\"{}\" is an invalid name", field.name), level);
        }

        match occurs {
            Some(occurs) if occurs.min_occurs() > 0 => {
                unit.info("This is a required field in the NeXus file", level)
            }
            Some(occurs) if occurs.is_recommended() => {
                unit.info("This is a recommended field in the NeXus file", level)
            }
            Some(_) => unit.info("This is an optional field in the NeXus file", level),
            None if constraint.is_some() => {
                unit.info(format!("This is a valid field in {}", class), level)
            }
            None => {}
        }

        let Some(constraint) = constraint else {
            if self.policy.is_open(class) || parent.flags.allow_extra_fields {
                unit.info(
                    format!(
                        "This field is not defined in {}. Additional fields are allowed.",
                        class
                    ),
                    level,
                );
            } else {
                unit.report(
                    self.policy.undeclared_severity(),
                    format!("This field is not defined in {}", class),
                    level,
                );
            }
            return unit;
        };

        if let Some(note) = &constraint.deprecated {
            unit.warning(format!("This field is now deprecated. {}", note), level);
        }

        if let Some(nx_type) = constraint.nx_type {
            let label = type_label(nx_type);
            if matches_type(nx_type, field) {
                unit.info(format!("This field is a valid {}", label), level);
            } else {
                unit.warning(format!("This field is not a valid {}", label), level);
            }
        }

        if let Some(rank) = constraint.dimensions.as_ref().and_then(|d| d.numeric_rank()) {
            if field.ndim() == rank {
                unit.info(format!("The field has the correct rank of {}", rank), level);
            } else {
                unit.error(
                    format!("The field has rank {}, should be {}", field.ndim(), rank),
                    level,
                );
            }
        }

        if let Some(allowed) = &constraint.enumeration {
            let scalars = field.value.scalars();
            let member = !scalars.is_empty()
                && scalars
                    .iter()
                    .all(|v| allowed.iter().any(|a| *a == v.to_string()));
            if member {
                unit.info("The field value is a member of the enumerated list", level);
            } else {
                unit.error(
                    "The field value is not a member of the enumerated list",
                    level,
                );
            }
        }

        self.check_attributes(constraint, field, &mut unit, level);
        unit
    }

    fn check_attributes(
        &self,
        constraint: &FieldConstraint,
        field: &FieldNode,
        unit: &mut Diagnostics,
        level: usize,
    ) {
        if field.attributes.contains_key("signal") {
            unit.error(
                "Using \"signal\" as a field attribute is no longer valid. Use the group attribute \"signal\"",
                level,
            );
        }
        if field.attributes.contains_key("axis") {
            unit.error(
                "Using \"axis\" as a field attribute is no longer valid. Use the group attribute \"axes\"",
                level,
            );
        }

        match (field.attributes.get("units"), &constraint.units) {
            (Some(units), Some(category)) => unit.info(
                format!("\"{}\" are specified as units of {}", units, category),
                level,
            ),
            (Some(units), None) => {
                unit.info(format!("\"{}\" are specified as units", units), level)
            }
            (None, Some(category)) => {
                unit.warning(format!("Units of {} not specified", category), level)
            }
            (None, None) => {}
        }

        for name in constraint.attributes.keys() {
            if field.attributes.contains_key(name) {
                unit.info(format!("The suggested attribute \"{}\" is defined", name), level);
            } else {
                unit.warning(
                    format!("The suggested attribute \"{}\" is not defined", name),
                    level,
                );
            }
        }

        for name in field.attributes.keys() {
            if CHECKED_ATTRIBUTES.contains(&name.as_str())
                || constraint.attributes.contains_key(name)
            {
                continue;
            }
            unit.info(format!("\"{}\" is defined as an attribute", name), level);
        }
    }
}
