use crate::params::OTS_N;
use sha2::{Digest, Sha256};

/// SHA2-256 backend for every hash computed by the signature stack.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeHasher;

impl TreeHasher {
    /// H(input)
    pub fn digest(input: &[u8]) -> [u8; OTS_N] {
        Sha256::digest(input).into()
    }

    /// H(part_0 || part_1 || ...), without materializing the concatenation.
    pub fn digest_parts<I, T>(parts: I) -> [u8; OTS_N]
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_ref());
        }
        hasher.finalize().into()
    }

    /// Applies H to `block` `times` times, in place.
    pub fn hash_times(block: &mut [u8; OTS_N], times: usize) {
        for _ in 0..times {
            let out = Sha256::digest(&block[..]);
            block.copy_from_slice(&out);
        }
    }
}
