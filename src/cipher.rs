//! Deterministic keystream used to expand per-path seeds into OTS key material.

use crate::params::PATH_KEY_BYTES;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use zeroize::Zeroize;

/// A ChaCha20 keystream keyed by a [`PATH_KEY_BYTES`]-byte path key: the first 32
/// bytes are the cipher key, the trailing 8 bytes select the stream.
pub(crate) struct SeedStream {
    rng: ChaCha20Rng,
}

impl SeedStream {
    pub(crate) fn new(path_key: &[u8; PATH_KEY_BYTES]) -> Self {
        let mut key = [0u8; 32];
        key.copy_from_slice(&path_key[..32]);
        let mut stream = [0u8; 8];
        stream.copy_from_slice(&path_key[32..]);

        let mut rng = ChaCha20Rng::from_seed(key);
        rng.set_stream(u64::from_le_bytes(stream));

        key.zeroize();
        stream.zeroize();
        Self { rng }
    }

    /// Fills `output` with the next bytes of the keystream.
    pub(crate) fn fill(&mut self, output: &mut [u8]) {
        self.rng.fill_bytes(output);
    }
}
