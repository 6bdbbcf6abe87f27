//! State-root key construction.
//!
//! State component keys are 31-byte arrays. Keys for components 1..15 carry the
//! component index in byte 0 with the rest zeroed. Service-related keys interleave a
//! 32-bit service id across bytes 0, 2, 4, 6; service *base* keys additionally pin
//! bytes 2, 4, 6 to `0xFF`. Storage/preimage subtree keys use the remaining bytes for a
//! truncated content hash.

use crate::trie::Key31;

/// Key for a simple, non-service state component (τ, η, γ, β, α, φ, ρ, ξ, ψ, χ, π...).
pub fn component_key(component_index: u8) -> Key31 {
    debug_assert!((1..=15).contains(&component_index));
    let mut key = [0u8; 31];
    key[0] = component_index;
    key
}

/// Interleave a service id's four bytes across the even positions of a key.
fn interleave_service_id(id: u32) -> [u8; 8] {
    let id_bytes = id.to_le_bytes();
    let mut out = [0u8; 8];
    for (i, b) in id_bytes.iter().enumerate() {
        out[i * 2] = *b;
    }
    out
}

/// The base key for a service's account record: service id interleaved across bytes
/// 0,2,4,6, with bytes 2,4,6 additionally pinned to `0xFF` to distinguish it from the
/// service's storage/preimage subtree keys.
pub fn service_base_key(service_id: u32) -> Key31 {
    let interleaved = interleave_service_id(service_id);
    let mut key = [0u8; 31];
    key[0] = interleaved[0];
    key[2] = 0xFF;
    key[4] = 0xFF;
    key[6] = 0xFF;
    key
}

/// A key into a service's storage subtree: service id interleaved across bytes
/// 0,2,4,6, remaining bytes carrying a truncated hash of the storage key.
pub fn service_storage_key(service_id: u32, content_hash: &[u8; 32]) -> Key31 {
    service_subtree_key(service_id, content_hash)
}

/// A key into a service's preimage subtree: same layout as storage keys, the content
/// hash being the preimage hash rather than a storage-key hash.
pub fn service_preimage_key(service_id: u32, preimage_hash: &[u8; 32]) -> Key31 {
    service_subtree_key(service_id, preimage_hash)
}

fn service_subtree_key(service_id: u32, content_hash: &[u8; 32]) -> Key31 {
    let interleaved = interleave_service_id(service_id);
    let mut key = [0u8; 31];
    key[0] = interleaved[0];
    key[2] = interleaved[2];
    key[4] = interleaved[4];
    key[6] = interleaved[6];
    // Remaining 24 bytes (7..31) carry a truncated content hash. Byte 1,3,5 stay zero
    // to keep the interleave pattern visible and distinct from the base key's 0xFF marker.
    key[7..31].copy_from_slice(&content_hash[0..24]);
    key
}
