//! Content hashes used as stable keys
//!
//! Names inside property trees (classes, fields, entry paths) are keyed by a
//! 32-bit FNV-1a digest; archive chunk paths by a 64-bit XXH64 digest. Both
//! fold ASCII letters to lower case first, so `"Path"` and `"path"` collide.

use xxhash_rust::xxh64::xxh64;

/// FNV-1a 32-bit offset basis.
pub const FNV1A_OFFSET: u32 = 0x811C_9DC5;

/// FNV-1a 32-bit prime.
pub const FNV1A_PRIME: u32 = 0x0100_0193;

/// Fold one byte into an FNV-1a state.
#[inline]
pub const fn fnv1a_byte(hash: u32, byte: u8) -> u32 {
    (hash ^ byte.to_ascii_lowercase() as u32).wrapping_mul(FNV1A_PRIME)
}

/// Case-insensitive FNV-1a hash of `name`.
pub const fn fnv1a(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut hash = FNV1A_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash = fnv1a_byte(hash, bytes[i]);
        i += 1;
    }
    hash
}

/// Case-insensitive XXH64 (seed 0) hash of an archive path.
pub fn xxh64_path(path: &str) -> u64 {
    let lowered = path.to_ascii_lowercase();
    xxh64(lowered.as_bytes(), 0)
}
