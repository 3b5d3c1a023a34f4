//! Newtype IDs and keys for type-safe entity references.
//!
//! Use the `define_id!` macro for numeric catalog identifiers and
//! `define_key!` for opaque string keys (cart lines, sessions). The
//! wrappers prevent accidentally passing a product id where a category id
//! is expected, or a session key where a cart line key is expected.

use thiserror::Error;

/// Error returned when parsing an opaque key fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("key must not be empty")]
    Empty,
    #[error("key exceeds {max} characters")]
    TooLong { max: usize },
}

/// Maximum accepted length for opaque keys.
pub const MAX_KEY_LENGTH: usize = 128;

/// Macro to define a type-safe numeric ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use webmcp_core::define_id;
/// define_id!(ProductId);
/// define_id!(CategoryId);
///
/// let product_id = ProductId::new(1);
/// let category_id = CategoryId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: ProductId = category_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Macro to define a type-safe opaque string key.
///
/// Keys are non-empty and at most [`MAX_KEY_LENGTH`] characters. They
/// serialize as plain strings.
#[macro_export]
macro_rules! define_key {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse a key, rejecting empty or oversized values.
            ///
            /// # Errors
            ///
            /// Returns [`KeyError`](crate::types::id::KeyError) if the value is
            /// empty or longer than the maximum key length.
            pub fn parse(value: impl Into<String>) -> Result<Self, $crate::types::id::KeyError> {
                let value = value.into();
                if value.is_empty() {
                    return Err($crate::types::id::KeyError::Empty);
                }
                if value.chars().count() > $crate::types::id::MAX_KEY_LENGTH {
                    return Err($crate::types::id::KeyError::TooLong {
                        max: $crate::types::id::MAX_KEY_LENGTH,
                    });
                }
                Ok(Self(value))
            }

            /// Get the key as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::types::id::KeyError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$name> for String {
            fn from(key: $name) -> Self {
                key.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Catalog entity IDs
define_id!(ProductId);
define_id!(CategoryId);

// Opaque keys
define_key!(LineKey);
define_key!(SessionId);
