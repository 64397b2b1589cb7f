//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. Contract records
//! are keyed by 1-based `uint256` indices, so the wrappers hold a `u64`.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `u64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Ord`, `Hash`
/// - Conversion methods: `new()`, `as_u64()`
/// - `From<u64>` and `Into<u64>` implementations
///
/// # Example
///
/// ```rust
/// # use ddm_core::define_id;
/// define_id!(ListingId);
/// define_id!(ChainId);
///
/// let listing_id = ListingId::new(1);
/// let chain_id = ChainId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: ListingId = chain_id;
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
        pub struct $name(u64);

        impl $name {
            /// Create a new ID from a u64 value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the underlying u64 value.
            #[must_use]
            pub const fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.parse::<u64>().map(Self)
            }
        }
    };
}

// Define standard entity IDs
define_id!(ListingId);
define_id!(ChainId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_id_roundtrip() {
        let id = ListingId::new(42);
        assert_eq!(id.as_u64(), 42);
        assert_eq!(u64::from(id), 42);
        assert_eq!(ListingId::from(42), id);
    }

    #[test]
    fn test_listing_id_display_and_parse() {
        let id: ListingId = "7".parse().expect("parses");
        assert_eq!(id, ListingId::new(7));
        assert_eq!(id.to_string(), "7");
    }

    #[test]
    fn test_listing_id_serde_transparent() {
        let id = ListingId::new(3);
        let json = serde_json::to_string(&id).expect("serializes");
        assert_eq!(json, "3");
        let back: ListingId = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, id);
    }
}
