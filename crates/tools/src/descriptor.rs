//! Operation descriptors advertised to calling agents.

use serde::Serialize;

use crate::schema::InputSchema;

/// Static declaration of one callable operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDescriptor {
    /// Unique operation name (e.g., "add_to_cart").
    pub name: String,
    /// What the operation does, written for the calling agent.
    pub description: String,
    /// Declared inputs, serialized as JSON Schema.
    pub input_schema: InputSchema,
    /// Whether a human must approve the call before it runs.
    pub requires_confirmation: bool,
    /// Whether the operation leaves cart and catalog state untouched.
    pub read_only: bool,
}

impl OperationDescriptor {
    /// A read-only operation with no inputs and no confirmation.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: InputSchema::empty(),
            requires_confirmation: false,
            read_only: true,
        }
    }

    /// Set the input schema.
    #[must_use]
    pub fn with_schema(mut self, input_schema: InputSchema) -> Self {
        self.input_schema = input_schema;
        self
    }

    /// Mark the operation as mutating state. Mutating operations always
    /// require confirmation.
    #[must_use]
    pub const fn mutating(mut self) -> Self {
        self.read_only = false;
        self.requires_confirmation = true;
        self
    }

    /// Require confirmation without marking the operation as mutating.
    #[must_use]
    pub const fn confirmed(mut self) -> Self {
        self.requires_confirmation = true;
        self
    }
}
