//! Tool-invocation protocol for commerce operations.
//!
//! An agent discovers operations through an [`OperationRegistry`], calls
//! them through a [`Dispatcher`], and receives one [`InvocationResult`] per
//! call. Operations that change the cart wait on a [`ConfirmationGate`]
//! before they run.
//!
//! # Modules
//!
//! - [`registry`], [`descriptor`], [`schema`] - declarative operation catalog
//! - [`dispatcher`], [`confirmation`], [`result`] - invocation pipeline
//! - [`operations`] - the eight commerce operations
//! - [`adapter`] - contract for the backing store
//! - [`memory`] - in-process store seeded from a catalog file
//! - [`client`], [`rest`] - adapter over the HTTP API and its wire types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod adapter;
pub mod client;
pub mod confirmation;
pub mod context;
pub mod descriptor;
pub mod dispatcher;
pub mod error;
pub mod memory;
pub mod operations;
pub mod registry;
pub mod rest;
pub mod result;
pub mod schema;

pub use adapter::CommerceAdapter;
pub use client::RestCommerceClient;
pub use confirmation::{ConfirmationDecision, ConfirmationGate, ConfirmationRequest, StaticGate};
pub use context::SessionContext;
pub use descriptor::OperationDescriptor;
pub use dispatcher::{Dispatcher, InvocationRequest, OperationHandler, Preparation};
pub use error::{CommerceError, InvocationError};
pub use memory::{CatalogError, CatalogSeed, MemoryCommerce};
pub use operations::{CommerceTools, commerce_operations, commerce_registry};
pub use registry::{OperationRegistry, RegistryError};
pub use result::{ContentBlock, ErrorKind, InvocationResult};
pub use schema::{Arguments, FieldType, InputSchema};
