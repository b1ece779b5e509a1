//! Base class store
//!
//! [`SchemaStore`] loads base-class definitions on first use and keeps the
//! parsed models for its own lifetime. One store is built per run and passed
//! by reference to every validator.
//!
//! Entries are keyed by class name alone. A store therefore serves exactly
//! one definitions directory; pointing two stores at different directories is
//! fine, but a single store cannot tell two same-named classes apart.

use crate::error::Result;
use crate::limits::Limits;
use crate::loaders::Loader;
use crate::locations::Definitions;
use crate::validators::models::ConstraintModel;
use crate::validators::parsing::{load_document, parse_base_class};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Cache of base-class models
#[derive(Debug)]
pub struct SchemaStore {
    definitions: Definitions,
    loader: Loader,
    cache: Mutex<HashMap<String, Arc<ConstraintModel>>>,
}

impl SchemaStore {
    /// Create a store reading from `definitions`
    pub fn new(definitions: Definitions) -> Self {
        Self {
            definitions,
            loader: Loader::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Set the limits applied when reading documents
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.loader = self.loader.with_limits(limits);
        self
    }

    /// Definitions directory
    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    /// Loader used for definition documents
    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// Model of the base class `class_name`
    ///
    /// A class without a definition file yields the invalid-class sentinel.
    /// A file that exists but cannot be parsed is an error.
    pub fn load(&self, class_name: &str) -> Result<Arc<ConstraintModel>> {
        if let Some(model) = self.entries().get(class_name) {
            tracing::trace!(class = class_name, "base class cache hit");
            return Ok(Arc::clone(model));
        }

        let path = self.definitions.base_class_path(class_name);
        let model = if class_name.is_empty() || !path.is_file() {
            tracing::warn!(class = class_name, path = %path.display(), "no base class definition");
            ConstraintModel::invalid(class_name)
        } else {
            tracing::debug!(class = class_name, path = %path.display(), "loading base class");
            let root = load_document(&self.loader, &path)?;
            parse_base_class(class_name, &root)?
        };

        // Documents are read without holding the lock; a concurrent load of
        // the same class keeps whichever entry landed first.
        let mut entries = self.entries();
        let model = entries
            .entry(class_name.to_string())
            .or_insert_with(|| Arc::new(model));
        Ok(Arc::clone(model))
    }

    /// Whether `class_name` has been loaded
    pub fn is_cached(&self, class_name: &str) -> bool {
        self.entries().contains_key(class_name)
    }

    /// Number of cached classes
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether nothing has been loaded yet
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<ConstraintModel>>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
