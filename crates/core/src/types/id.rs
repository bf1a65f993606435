//! Newtype IDs for type-safe entity references.
//!
//! Products are keyed by integers assigned by the catalog, admins by opaque
//! strings derived from their creation time. Both serialize transparently so
//! the stored JSON keeps plain numbers and strings.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe integer ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `PartialOrd`, `Ord`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
/// - `FromStr` so IDs can be taken from path segments and CLI arguments
///
/// # Example
///
/// ```rust
/// # use showcase_core::define_id;
/// define_id!(OrderId);
/// define_id!(LineId);
///
/// let order_id = OrderId::new(1);
/// let line_id = LineId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: OrderId = line_id;
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
            PartialOrd,
            Ord,
            Hash,
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

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
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

define_id!(ProductId);

/// Admin account identifier.
///
/// New admins get the decimal epoch-millisecond timestamp of their creation;
/// the seed account uses `"1"`. Any string read back from storage is accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminUserId(String);

impl AdminUserId {
    /// Create an ID from any string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an ID from an epoch-millisecond timestamp.
    #[must_use]
    pub fn from_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdminUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AdminUserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
