//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every node in the world tree has a strongly-typed ID so a zone id can
//! never be passed where a device id is expected. Ids created at runtime use
//! UUID v7; fixtures and replays derive them from a seeded RNG stream via
//! [`from_random_bytes`](ZoneId::from_random_bytes) so that world hashes are
//! reproducible.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Build a v4-shaped identifier from caller-supplied random bytes.
            ///
            /// Used with a deterministic RNG stream so replays assign the
            /// same ids on every host.
            pub const fn from_random_bytes(bytes: [u8; 16]) -> Self {
                Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for the company that owns the world tree.
    CompanyId
}

define_id! {
    /// Unique identifier for a structure (building).
    StructureId
}

define_id! {
    /// Unique identifier for a room inside a structure.
    RoomId
}

define_id! {
    /// Unique identifier for a cultivation zone inside a growroom.
    ZoneId
}

define_id! {
    /// Unique identifier for an installed device.
    DeviceId
}

define_id! {
    /// Unique identifier for a plant.
    PlantId
}

define_id! {
    /// Unique identifier for a harvest lot.
    HarvestLotId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let zone = ZoneId::new();
        let device = DeviceId::new();
        assert_ne!(zone.into_inner(), Uuid::nil());
        assert_ne!(device.into_inner(), Uuid::nil());
    }

    #[test]
    fn random_bytes_are_stable() {
        let a = ZoneId::from_random_bytes([7; 16]);
        let b = ZoneId::from_random_bytes([7; 16]);
        assert_eq!(a, b);
        assert_eq!(a.into_inner().get_version_num(), 4);
    }

    #[test]
    fn id_display_matches_uuid() {
        let uuid = Uuid::now_v7();
        let id = PlantId::from(uuid);
        assert_eq!(format!("{id}"), format!("{uuid}"));
    }

    #[test]
    fn id_serialization_roundtrip() {
        let id = DeviceId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        let back: DeviceId = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(id, back);
    }
}
