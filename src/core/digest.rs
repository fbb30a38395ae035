//! Content digests.
//!
//! Topology arrays are identified by an MD5 digest of their raw bytes so two
//! samples can be compared without keeping both arrays around.

use md5::{Digest, Md5};

/// 128-bit digest of sample content.
pub type SampleDigest = [u8; 16];

/// Compute one digest over several POD slices, in order.
///
/// Each part's length is hashed first so `[a, b] + [c]` and `[a] + [b, c]`
/// produce different digests.
pub fn compute_digest_parts(parts: &[&[i32]]) -> SampleDigest {
    let mut hasher = Md5::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(bytemuck::cast_slice::<i32, u8>(part));
    }
    hasher.finalize().into()
}
