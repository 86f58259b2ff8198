//! # Winternitz One-Time Signature (W-OTS)
//!
//! This module implements the one-time signature at the leaves of every signature tree in
//! this crate. A key signs a single `OTS_N`-byte digest, read as `OTS_MSG_LEN` byte-valued
//! symbols `c[i]`.
//!
//! ## Construction
//!
//! The secret key is `OTS_LEN` independent `OTS_N`-byte blocks: one per symbol and a
//! trailing checksum block. Each block starts a hash chain. Symbol chains are
//! [`OTS_MSG_CHAIN_LEN`] hashes long and the checksum chain is [`OTS_CHECKSUM_CHAIN_LEN`]
//! hashes long; the public key is the hash of the concatenated chain ends.
//!
//! Signing reveals symbol block `i` hashed `c[i]` times and the checksum block hashed
//! `OTS_CHECKSUM_CHAIN_LEN - sum(c)` times. Verification completes every chain and compares
//! the resulting public key.
//!
//! Raising any symbol to forge a different digest lowers the checksum, which would require
//! walking the checksum chain backwards. This couples all blocks together.
//!
//! ## Important Note
//!
//! A secret key must never sign two different digests: the revealed chain positions let
//! anyone forge signatures over other digests. [`OtsSecretKey::sign`] consumes the key to
//! make single use explicit, and [`OneTimeKey`] tracks spent keys inside the trees.

use crate::hash::TreeHasher;
use crate::params::{
    OTS_BYTES, OTS_CHECKSUM_CHAIN_LEN, OTS_LEN, OTS_MSG_CHAIN_LEN, OTS_MSG_LEN, OTS_N,
    OTS_PK_BYTES, OTS_SK_BYTES,
};
use crate::utils::array_struct;
use crate::{Error, Result};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

mod one_time_key;

pub use one_time_key::OneTimeKey;

array_struct!(
    /// Compressed W-OTS public key: the hash of all chain ends.
    OtsPublicKey,
    OTS_PK_BYTES
);

array_struct!(
    /// W-OTS signature: one intermediate chain value per secret block.
    OtsSignature,
    OTS_BYTES
);

impl Copy for OtsPublicKey {}

impl std::hash::Hash for OtsPublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// W-OTS secret key. It is wiped from memory when dropped and cannot be cloned.
#[derive(Zeroize, ZeroizeOnDrop)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct OtsSecretKey(
    #[cfg_attr(feature = "serialization", serde(with = "serde_big_array::BigArray"))]
    [u8; OTS_SK_BYTES],
);

impl fmt::Debug for OtsSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtsSecretKey(..)")
    }
}

impl OtsSecretKey {
    /// Signs `digest`, consuming the key.
    pub fn sign(self, digest: &[u8; OTS_N]) -> OtsSignature {
        Wots::sign(digest, self)
    }

    /// Recomputes the public key matching this secret key.
    pub fn public_key(&self) -> OtsPublicKey {
        Wots::public_key(self)
    }

    fn block(&self, i: usize) -> &[u8] {
        &self.0[i * OTS_N..(i + 1) * OTS_N]
    }
}

/// A freshly generated W-OTS keypair.
#[derive(Debug)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct OtsKeyPair {
    pub public: OtsPublicKey,
    pub secret: OtsSecretKey,
}

/// Stateless entry point for W-OTS key generation, signing, and verification.
#[derive(Clone, Copy, Debug, Default)]
pub struct Wots;

impl Wots {
    /// Generates a keypair whose secret blocks are drawn from the operating system RNG.
    pub fn keygen() -> OtsKeyPair {
        Self::keygen_with_rng(&mut OsRng)
    }

    /// Generates a keypair whose secret blocks are drawn from `rng`.
    pub fn keygen_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> OtsKeyPair {
        let mut secret = OtsSecretKey([0u8; OTS_SK_BYTES]);
        rng.fill_bytes(&mut secret.0);
        let public = Self::public_key(&secret);
        OtsKeyPair { public, secret }
    }

    /// Generates a keypair deterministically, using the first [`OTS_SK_BYTES`] bytes of
    /// `seed` as the secret key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientSeed`] if `seed` is shorter than [`OTS_SK_BYTES`].
    pub fn keygen_from_seed(seed: &[u8]) -> Result<OtsKeyPair> {
        if seed.len() < OTS_SK_BYTES {
            return Err(Error::InsufficientSeed {
                expected: OTS_SK_BYTES,
                found: seed.len(),
            });
        }
        let mut secret = OtsSecretKey([0u8; OTS_SK_BYTES]);
        secret.0.copy_from_slice(&seed[..OTS_SK_BYTES]);
        let public = Self::public_key(&secret);
        Ok(OtsKeyPair { public, secret })
    }

    /// Computes the public key by walking every chain of `sk` to its end.
    pub fn public_key(sk: &OtsSecretKey) -> OtsPublicKey {
        let mut ends = [0u8; OTS_BYTES];
        for i in 0..OTS_LEN {
            let end = Self::gen_chain(sk.block(i), Self::chain_len(i));
            ends[i * OTS_N..(i + 1) * OTS_N].copy_from_slice(&end);
        }
        let pk = OtsPublicKey(TreeHasher::digest(&ends));
        ends.zeroize();
        pk
    }

    /// Signs a digest, consuming the secret key.
    pub fn sign(digest: &[u8; OTS_N], sk: OtsSecretKey) -> OtsSignature {
        let steps = Self::chain_lengths(digest);
        let mut sig = [0u8; OTS_BYTES];
        for (i, &step) in steps.iter().enumerate() {
            let revealed = Self::gen_chain(sk.block(i), step);
            sig[i * OTS_N..(i + 1) * OTS_N].copy_from_slice(&revealed);
        }
        OtsSignature(sig)
    }

    /// Verifies a signature over `digest` against `pk`.
    ///
    /// Returns `false` on any mismatch.
    pub fn verify(digest: &[u8; OTS_N], sig: &OtsSignature, pk: &OtsPublicKey) -> bool {
        Self::pk_from_sig(digest, sig) == *pk
    }

    /// Completes every chain of `sig` for `digest` and returns the public key it
    /// commits to.
    pub fn pk_from_sig(digest: &[u8; OTS_N], sig: &OtsSignature) -> OtsPublicKey {
        let steps = Self::chain_lengths(digest);
        let mut ends = [0u8; OTS_BYTES];
        for (i, &step) in steps.iter().enumerate() {
            let block = &sig.0[i * OTS_N..(i + 1) * OTS_N];
            let end = Self::gen_chain(block, Self::chain_len(i) - step);
            ends[i * OTS_N..(i + 1) * OTS_N].copy_from_slice(&end);
        }
        OtsPublicKey(TreeHasher::digest(&ends))
    }

    fn chain_len(block: usize) -> usize {
        if block < OTS_MSG_LEN {
            OTS_MSG_CHAIN_LEN
        } else {
            OTS_CHECKSUM_CHAIN_LEN
        }
    }

    /// Sum of all symbol values of `digest`.
    fn checksum(digest: &[u8; OTS_N]) -> usize {
        digest[..OTS_MSG_LEN].iter().map(|&c| c as usize).sum()
    }

    /// Number of hashes the signer applies to each secret block for `digest`.
    fn chain_lengths(digest: &[u8; OTS_N]) -> [usize; OTS_LEN] {
        let mut steps = [0usize; OTS_LEN];
        for (step, &c) in steps.iter_mut().zip(digest[..OTS_MSG_LEN].iter()) {
            *step = c as usize;
        }
        steps[OTS_MSG_LEN] = OTS_CHECKSUM_CHAIN_LEN - Self::checksum(digest);
        steps
    }

    fn gen_chain(input: &[u8], steps: usize) -> [u8; OTS_N] {
        let mut output = [0u8; OTS_N];
        output.copy_from_slice(&input[..OTS_N]);
        TreeHasher::hash_times(&mut output, steps);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn random_digest() -> [u8; OTS_N] {
        let mut digest = [0u8; OTS_N];
        OsRng.fill_bytes(&mut digest);
        digest
    }

    #[test]
    fn test_wots() {
        let OtsKeyPair { public, secret } = Wots::keygen();
        let digest = random_digest();

        let signature = secret.sign(&digest);
        assert!(Wots::verify(&digest, &signature, &public));
        assert_eq!(Wots::pk_from_sig(&digest, &signature), public);

        let mut fake_signature = signature.clone();
        fake_signature.0[0] ^= 1;
        assert!(!Wots::verify(&digest, &fake_signature, &public));

        let mut other_digest = digest;
        other_digest[OTS_N - 1] ^= 0x80;
        assert!(!Wots::verify(&other_digest, &signature, &public));
    }

    #[test]
    fn test_wots_rejects_random_messages() {
        let OtsKeyPair { public, secret } = Wots::keygen();
        let digest = random_digest();
        let signature = secret.sign(&digest);

        for _ in 0..8 {
            let other = random_digest();
            if other != digest {
                assert!(!Wots::verify(&other, &signature, &public));
            }
        }
    }

    #[test]
    fn test_wots_tamper_sensitivity() {
        let OtsKeyPair { public, secret } = Wots::keygen();
        let digest = random_digest();
        let signature = secret.sign(&digest);

        let mut rng = OsRng;
        for _ in 0..32 {
            let bit = rng.gen_range(0..OTS_BYTES * 8);
            let mut tampered = signature.clone();
            tampered.0[bit / 8] ^= 1 << (bit % 8);
            assert!(!Wots::verify(&digest, &tampered, &public));
        }
    }

    #[test]
    fn test_wots_keygen_from_seed() {
        let mut seed = vec![0u8; OTS_SK_BYTES + 5];
        OsRng.fill_bytes(&mut seed);

        let a = Wots::keygen_from_seed(&seed).unwrap();
        let b = Wots::keygen_from_seed(&seed[..OTS_SK_BYTES]).unwrap();
        assert_eq!(a.public, b.public);
        assert_eq!(a.secret.public_key(), a.public);

        assert_eq!(
            Wots::keygen_from_seed(&seed[..OTS_SK_BYTES - 1]).unwrap_err(),
            Error::InsufficientSeed {
                expected: OTS_SK_BYTES,
                found: OTS_SK_BYTES - 1
            }
        );
    }

    #[test]
    fn test_wots_checksum_bounds() {
        assert_eq!(Wots::checksum(&[0u8; OTS_N]), 0);
        assert_eq!(Wots::checksum(&[0xffu8; OTS_N]), OTS_MSG_LEN * 255);
        assert!(Wots::checksum(&[0xffu8; OTS_N]) < OTS_CHECKSUM_CHAIN_LEN);

        let steps = Wots::chain_lengths(&[0xffu8; OTS_N]);
        assert_eq!(steps[0], 255);
        assert_eq!(steps[OTS_MSG_LEN], OTS_CHECKSUM_CHAIN_LEN - OTS_MSG_LEN * 255);
    }

    #[cfg(feature = "hash_sha2_256")]
    #[test]
    fn test_wots_known_vector() {
        let keypair = Wots::keygen_from_seed(&[0u8; OTS_SK_BYTES]).unwrap();
        assert_eq!(
            hex::encode(keypair.public.as_bytes()),
            "12b57c15b43f96be934bf8e6206eb582c85395bdc160bf48623a817efd238d95"
        );

        // All-zero symbols leave every symbol block untouched and walk the checksum
        // block through its full chain.
        let digest = [0u8; OTS_N];
        let signature = keypair.secret.sign(&digest);
        assert_eq!(&signature.0[..OTS_MSG_LEN * OTS_N], &[0u8; OTS_MSG_LEN * OTS_N][..]);
        assert_eq!(
            hex::encode(&signature.0[OTS_MSG_LEN * OTS_N..]),
            "eff4e44544e09c8824ed288f2600917754fc5e6d674652dee942271f64516bb6"
        );
        assert_eq!(
            hex::encode(TreeHasher::digest(signature.as_ref())),
            "025740d81cf2869ba189d3f6cf902f06ca234a0956e4173cc91540f8b4e2986e"
        );
        assert!(Wots::verify(&digest, &signature, &keypair.public));

        let keypair = Wots::keygen_from_seed(&[0u8; OTS_SK_BYTES]).unwrap();
        let mut digest = [0u8; OTS_N];
        digest
            .iter_mut()
            .enumerate()
            .for_each(|(i, c)| *c = i as u8);
        let signature = keypair.secret.sign(&digest);
        assert_eq!(
            hex::encode(TreeHasher::digest(signature.as_ref())),
            "a5736d785698bb6a8372fae93a45b3d9aad36ffd774bf4c0cdb5ae33b1f9ff84"
        );
    }

    #[cfg(feature = "hash_shake_256")]
    #[test]
    fn test_wots_known_vector() {
        let keypair = Wots::keygen_from_seed(&[0u8; OTS_SK_BYTES]).unwrap();
        assert_eq!(
            hex::encode(keypair.public.as_bytes()),
            "0a10ecae85682b14764fef9824d404abdbc0c79fb709f886d56aa1c4a3597698"
        );
    }
}
