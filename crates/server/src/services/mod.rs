//! Server-side services.

pub mod confirmations;

pub use confirmations::{ConfirmationQueue, PendingConfirmation};
