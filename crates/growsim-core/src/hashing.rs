//! Canonical world hashing for golden masters.
//!
//! The canonical form is the compact `serde_json` encoding of the world.
//! Struct fields serialize in declaration order, every map in the tree is a
//! `BTreeMap`, and children are `Vec`s in insertion order, so equal worlds
//! always produce identical bytes.

use sha2::{Digest, Sha256};

use growsim_types::World;

/// Canonical bytes of a world.
///
/// # Errors
///
/// Returns the encoder's error if the world cannot be serialized.
pub fn canonical_bytes(world: &World) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(world)
}

/// SHA-256 of [`canonical_bytes`], lowercase hex.
///
/// # Errors
///
/// See [`canonical_bytes`].
pub fn world_hash(world: &World) -> Result<String, serde_json::Error> {
    Ok(to_hex(&Sha256::digest(canonical_bytes(world)?)))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len().saturating_mul(2)), |mut out, b| {
        out.push_str(&format!("{b:02x}"));
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::demo_world;

    #[test]
    fn hash_is_stable_and_hex() {
        let world = demo_world("hash");
        let first = world_hash(&world).unwrap_or_default();
        let second = world_hash(&demo_world("hash")).unwrap_or_default();
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(first, second);
    }

    #[test]
    fn hex_encoding_matches_known_digest() {
        assert_eq!(
            to_hex(&Sha256::digest(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(to_hex(&[0x00, 0x0f, 0xa0]), "000fa0");
    }

    #[test]
    fn hash_changes_with_state() {
        let world = demo_world("hash");
        let mut moved = world.clone();
        moved.sim_time_hours += 1.0;
        assert_ne!(world_hash(&world).ok(), world_hash(&moved).ok());
    }
}
