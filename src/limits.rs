//! Limits and constraints for definition and instance processing
//!
//! These guard the engine against oversized inputs and against
//! application definitions whose `extends` chain never terminates.

use crate::error::{Error, Result};

/// Global limits configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum size of a single NXDL document in bytes
    pub max_schema_size: usize,

    /// Maximum size of an instance document in bytes
    pub max_instance_size: usize,

    /// Maximum number of `extends` hops when resolving an application
    pub max_extends_depth: usize,

    /// Maximum nesting depth of the instance tree
    pub max_tree_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_schema_size: 10 * 1024 * 1024,     // 10 MB
            max_instance_size: 512 * 1024 * 1024, // 512 MB
            max_extends_depth: 32,
            max_tree_depth: 256,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_schema_size: 1024 * 1024,         // 1 MB
            max_instance_size: 64 * 1024 * 1024, // 64 MB
            max_extends_depth: 8,
            max_tree_depth: 64,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_schema_size: 100 * 1024 * 1024,         // 100 MB
            max_instance_size: 2 * 1024 * 1024 * 1024, // 2 GB
            max_extends_depth: 256,
            max_tree_depth: 4096,
        }
    }

    /// Check if a schema document size is within limits
    pub fn check_schema_size(&self, size: usize) -> Result<()> {
        if size > self.max_schema_size {
            Err(Error::LimitExceeded(format!(
                "Schema size {} bytes exceeds maximum {} bytes",
                size, self.max_schema_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if an instance document size is within limits
    pub fn check_instance_size(&self, size: usize) -> Result<()> {
        if size > self.max_instance_size {
            Err(Error::LimitExceeded(format!(
                "Instance size {} bytes exceeds maximum {} bytes",
                size, self.max_instance_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if an `extends` chain depth is within limits
    pub fn check_extends_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_extends_depth {
            Err(Error::LimitExceeded(format!(
                "Extends chain depth {} exceeds maximum {}",
                depth, self.max_extends_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if an instance tree depth is within limits
    pub fn check_tree_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_tree_depth {
            Err(Error::LimitExceeded(format!(
                "Tree depth {} exceeds maximum {}",
                depth, self.max_tree_depth
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_extends_depth, 32);
        assert!(limits.check_extends_depth(10).is_ok());
        assert!(limits.check_extends_depth(33).is_err());
    }

    #[test]
    fn test_strict_limits() {
        let limits = Limits::strict();
        assert!(limits.max_tree_depth < Limits::default().max_tree_depth);
        assert!(limits.check_tree_depth(100).is_err());
    }

    #[test]
    fn test_permissive_limits() {
        let limits = Limits::permissive();
        assert!(limits.max_tree_depth > Limits::default().max_tree_depth);
        assert!(limits.check_tree_depth(1000).is_ok());
    }

    #[test]
    fn test_check_schema_size() {
        let limits = Limits::default();
        assert!(limits.check_schema_size(1024).is_ok());
        assert!(limits.check_schema_size(20 * 1024 * 1024).is_err());
    }
}
