//! Immutable registry of callable operations.

use std::collections::HashMap;

use thiserror::Error;

use crate::descriptor::OperationDescriptor;
use crate::error::InvocationError;

/// Errors raised while building a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("operation registered twice: {0}")]
    DuplicateOperation(String),
    #[error("operation name must not be empty")]
    EmptyName,
}

/// Name-indexed, insertion-ordered set of operation descriptors.
///
/// Built once at startup and shared read-only (typically behind an `Arc`).
#[derive(Debug, Clone)]
pub struct OperationRegistry {
    operations: Vec<OperationDescriptor>,
    index: HashMap<String, usize>,
}

impl OperationRegistry {
    /// Build a registry from a declaration list.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateOperation`] if two descriptors share
    /// a name, or [`RegistryError::EmptyName`] for an unnamed descriptor.
    pub fn new(operations: Vec<OperationDescriptor>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(operations.len());
        for (position, op) in operations.iter().enumerate() {
            if op.name.is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if index.insert(op.name.clone(), position).is_some() {
                return Err(RegistryError::DuplicateOperation(op.name.clone()));
            }
        }
        Ok(Self { operations, index })
    }

    /// All descriptors in registration order.
    #[must_use]
    pub fn list(&self) -> &[OperationDescriptor] {
        &self.operations
    }

    /// Look up one descriptor by name.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::OperationNotFound`] if no operation has
    /// that name.
    pub fn describe(&self, name: &str) -> Result<&OperationDescriptor, InvocationError> {
        self.index
            .get(name)
            .and_then(|&position| self.operations.get(position))
            .ok_or_else(|| InvocationError::OperationNotFound(name.to_string()))
    }

    /// Registered operation names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.operations.iter().map(|op| op.name.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
