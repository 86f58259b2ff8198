use crate::params::OTS_N;
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
};

/// SHAKE256 backend for every hash computed by the signature stack, squeezed to
/// `OTS_N` bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeHasher;

impl TreeHasher {
    /// H(input) = SHAKE256(input, 8n)
    pub fn digest(input: &[u8]) -> [u8; OTS_N] {
        Self::digest_parts([input])
    }

    /// H(part_0 || part_1 || ...), without materializing the concatenation.
    pub fn digest_parts<I, T>(parts: I) -> [u8; OTS_N]
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut hasher = Shake256::default();
        for part in parts {
            hasher.update(part.as_ref());
        }
        let mut reader = hasher.finalize_xof();
        let mut output = [0u8; OTS_N];
        reader.read(&mut output);
        output
    }

    /// Applies H to `block` `times` times, in place.
    pub fn hash_times(block: &mut [u8; OTS_N], times: usize) {
        for _ in 0..times {
            let mut hasher = Shake256::default();
            hasher.update(&block[..]);
            hasher.finalize_xof().read(&mut block[..]);
        }
    }
}
