//! Entity identifiers
//!
//! All identifiers are UUIDv7-backed:
//! - Chronologically sortable for temporal queries
//! - 128-bit uniqueness with no coordination between producers
//! - RFC 9562 string format for storage and wire round-trips

use std::fmt;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u128);

        impl $name {
            /// Generate a fresh UUIDv7-based identifier
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7().as_u128())
            }

            /// Reconstruct from a raw u128 (storage-layer deserialization)
            pub fn from_value(value: u128) -> Self {
                Self(value)
            }

            /// Parse from the canonical UUID string form
            pub fn from_string(s: &str) -> Result<Self, String> {
                uuid::Uuid::parse_str(s)
                    .map(|u| Self(u.as_u128()))
                    .map_err(|e| format!("Invalid UUID string: {}", e))
            }

            /// Raw u128 value
            pub fn value(&self) -> u128 {
                self.0
            }

            /// Millisecond Unix timestamp embedded in the UUIDv7
            pub fn timestamp(&self) -> u64 {
                // UUIDv7: top 48 bits are the Unix millisecond timestamp
                (self.0 >> 80) as u64
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", uuid::Uuid::from_u128(self.0))
            }
        }
    };
}

uuid_id! {
    /// Identifier of a case, the tenant-isolation unit.
    ///
    /// Every entity in the system is owned by exactly one case, and every
    /// store operation is authorized against a `CaseId`.
    CaseId
}

uuid_id! {
    /// Identifier of a production within a case
    ProductionId
}

uuid_id! {
    /// Identifier of a finalized segment (logical document)
    SegmentId
}

uuid_id! {
    /// Identifier of an extracted fact
    FactId
}
