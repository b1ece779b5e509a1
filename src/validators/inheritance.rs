//! Application definition inheritance
//!
//! An application definition names its ancestor in `extends`. Resolving it
//! loads the whole chain up to [`ROOT_CLASS`] and folds it into one model,
//! ancestor first, so that anything the descendant states wins.
//!
//! Merge rules, applied recursively:
//! - a key present on both sides is merged,
//! - a key present only in the ancestor is kept as is,
//! - a key present only in the descendant is appended,
//! - scalar properties take the descendant's value when it states one,
//! - enumerations are replaced, never united.

use crate::error::{Error, Result};
use crate::validators::models::{
    AttributeConstraint, ConstraintModel, Content, Dimensions, FieldConstraint, GroupConstraint,
    Occurs, Optionality, ROOT_CLASS,
};
use crate::validators::parsing::{load_document, parse_application};
use crate::validators::store::SchemaStore;
use indexmap::IndexMap;

/// Resolver for application definition chains
#[derive(Debug, Clone, Copy)]
pub struct InheritanceResolver<'a> {
    store: &'a SchemaStore,
}

impl<'a> InheritanceResolver<'a> {
    /// Create a resolver reading from the store's definitions directory
    pub fn new(store: &'a SchemaStore) -> Self {
        Self { store }
    }

    /// Effective model of the application `name`
    ///
    /// Fails if any definition in the chain is missing or malformed, or if the
    /// chain loops.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn resolve(&self, name: &str) -> Result<ConstraintModel> {
        self.resolve_chain(name, &mut Vec::new())
    }

    fn resolve_chain(&self, name: &str, chain: &mut Vec<String>) -> Result<ConstraintModel> {
        if chain.iter().any(|seen| seen == name) {
            return Err(Error::Definition(format!(
                "Circular extends chain: {} -> {}",
                chain.join(" -> "),
                name
            )));
        }
        self.store.loader().limits().check_extends_depth(chain.len())?;

        let path = self
            .store
            .definitions()
            .application_path(name)
            .ok_or_else(|| {
                Error::MissingApplication(format!(
                    "The application definition {} does not exist",
                    name
                ))
            })?;

        tracing::debug!(application = name, path = %path.display(), "loading application definition");
        let root = load_document(self.store.loader(), &path)?;
        let model = parse_application(name, &root)?;

        match model.extends.as_deref() {
            Some(ROOT_CLASS) | None => Ok(model),
            Some(parent) => {
                let parent = parent.to_string();
                chain.push(name.to_string());
                let base = self.resolve_chain(&parent, chain)?;
                chain.pop();
                Ok(merge_models(base, model))
            }
        }
    }
}

/// Overlay `child` on `base`
pub fn merge_models(base: ConstraintModel, child: ConstraintModel) -> ConstraintModel {
    ConstraintModel {
        name: child.name,
        status: child.status,
        category: child.category.or(base.category),
        extends: child.extends,
        entry_class: child.entry_class.or(base.entry_class),
        flags: child.flags,
        content: merge_content(base.content, child.content),
    }
}

/// Overlay `child` content on `base` content
pub fn merge_content(base: Content, child: Content) -> Content {
    Content {
        groups: merge_maps(base.groups, child.groups, merge_group),
        fields: merge_maps(base.fields, child.fields, merge_field),
        attributes: merge_maps(base.attributes, child.attributes, merge_attribute),
    }
}

fn merge_maps<V: Default>(
    mut base: IndexMap<String, V>,
    child: IndexMap<String, V>,
    merge: fn(V, V) -> V,
) -> IndexMap<String, V> {
    for (key, value) in child {
        match base.get_mut(&key) {
            Some(existing) => {
                let inherited = std::mem::take(existing);
                *existing = merge(inherited, value);
            }
            None => {
                base.insert(key, value);
            }
        }
    }
    base
}

fn merge_group(base: GroupConstraint, child: GroupConstraint) -> GroupConstraint {
    GroupConstraint {
        name: child.name.or(base.name),
        nxclass: if child.nxclass.is_empty() {
            base.nxclass
        } else {
            child.nxclass
        },
        deprecated: child.deprecated.or(base.deprecated),
        occurs: merge_occurs(base.occurs, child.occurs),
        content: merge_content(base.content, child.content),
    }
}

fn merge_field(base: FieldConstraint, child: FieldConstraint) -> FieldConstraint {
    let dimensions = match (base.dimensions, child.dimensions) {
        (Some(base), Some(child)) => Some(merge_dimensions(base, child)),
        (base, child) => child.or(base),
    };

    FieldConstraint {
        name: child.name,
        nx_type: child.nx_type.or(base.nx_type),
        dimensions,
        enumeration: child.enumeration.or(base.enumeration),
        units: child.units.or(base.units),
        deprecated: child.deprecated.or(base.deprecated),
        attributes: merge_maps(base.attributes, child.attributes, merge_attribute),
        occurs: merge_occurs(base.occurs, child.occurs),
    }
}

fn merge_attribute(base: AttributeConstraint, child: AttributeConstraint) -> AttributeConstraint {
    AttributeConstraint {
        name: child.name,
        nx_type: child.nx_type.or(base.nx_type),
        enumeration: child.enumeration.or(base.enumeration),
        deprecated: child.deprecated.or(base.deprecated),
        occurs: merge_occurs(base.occurs, child.occurs),
    }
}

fn merge_dimensions(base: Dimensions, child: Dimensions) -> Dimensions {
    let mut dims = base.dims;
    dims.extend(child.dims);
    Dimensions {
        rank: child.rank.or(base.rank),
        dims,
    }
}

fn merge_occurs(base: Occurs, child: Occurs) -> Occurs {
    Occurs {
        min: child.min.or(base.min),
        optionality: match child.optionality {
            Optionality::Stated => base.optionality,
            stated => stated,
        },
    }
}
