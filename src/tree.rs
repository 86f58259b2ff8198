//! # Many-time signature trees
//!
//! Every tree in this module certifies a large number of W-OTS keys under a single root
//! public key. A tree of depth `d` and width `w` has `d` levels of `w` one-time keys. The
//! root key signs the public keys of level 0, the selected key of level `i` signs the
//! public keys of level `i + 1`, and the selected key of the deepest level signs the
//! message digest.
//!
//! A signature carries, for every level, the level's public keys, the parent signature
//! over them, and the selected index, followed by the leaf signature. The verifier only
//! needs the 32-byte root public key.
//!
//! - [`FixedCapacityTree`] walks the leaves in order with a mixed-radix [`Odometer`] and
//!   regenerates the levels below a carry. Its width is known to the verifier out of band.
//! - [`CapacityOptimizedTree`] picks its shape from a signature-size budget and prefixes
//!   every signature with the width byte.
//! - [`StatelessTree`] re-derives every key from a master secret and signs along a random
//!   path, bounding its signature count by the probability of a path collision.
//!
//! Digests signed by parents over a level of keys are domain separated from digests
//! signed at the leaf, so a signature cut short after any level never verifies:
//!
//! - a level's keys `k_0 .. k_{w-1}` are signed as `H("treesig-level" || k_0 || .. || k_{w-1})`;
//! - a message digest `m` is signed at the leaf as `H("treesig-leaf" || m)`.
//!
//! `H` is the hash selected by the crate features.

use crate::hash::TreeHasher;
use crate::params::{LEAF_DOMAIN_PREFIX, LEVEL_DOMAIN_PREFIX, OTS_N};
use crate::wots::OtsPublicKey;
use crate::Result;

mod fixed;
mod odometer;
mod optimized;
mod shape;
mod stateless;
mod wire;

pub use fixed::FixedCapacityTree;
pub use odometer::{Advance, Odometer};
pub use optimized::CapacityOptimizedTree;
pub use shape::{signature_bytes, Capacity, TreeShape};
pub use stateless::{StatelessConfig, StatelessTree, MIN_DEFAULT_BOUND_BUDGET};
pub use wire::{LevelAuth, TreeSignature, WidthEncoding};

/// Common surface of the signature trees.
pub trait ManyTimeSigner {
    fn public_key(&self) -> &OtsPublicKey;

    fn shape(&self) -> TreeShape;

    /// How signatures produced by this tree carry their width.
    fn encoding(&self) -> WidthEncoding;

    /// Signatures that can still be issued, saturating at `u128::MAX`.
    fn signatures_left(&self) -> u128;

    /// Signs a 32-byte digest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyExhausted`](crate::Error::KeyExhausted) once the tree cannot
    /// issue further signatures.
    fn sign(&mut self, digest: &[u8; OTS_N]) -> Result<TreeSignature>;

    /// Signs a digest and encodes the signature.
    fn sign_to_bytes(&mut self, digest: &[u8; OTS_N]) -> Result<Vec<u8>> {
        let encoding = self.encoding();
        self.sign(digest)?.to_bytes(encoding)
    }

    /// Hashes an arbitrary message with [`message_digest`] and signs it.
    fn sign_message(&mut self, message: &[u8]) -> Result<Vec<u8>> {
        self.sign_to_bytes(&message_digest(message))
    }

    /// Verifies an encoded signature over `digest` against this tree's public key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSignature`](crate::Error::MalformedSignature) if the
    /// signature cannot be parsed.
    fn verify(&self, digest: &[u8; OTS_N], signature: &[u8]) -> Result<bool> {
        Ok(TreeSignature::from_bytes(signature, self.encoding())?.verify(digest, self.public_key()))
    }
}

/// Hash of an arbitrary-length message, the digest signed by
/// [`ManyTimeSigner::sign_message`].
pub fn message_digest(message: &[u8]) -> [u8; OTS_N] {
    TreeHasher::digest(message)
}

/// Verifies a width-prefixed signature, as produced by [`CapacityOptimizedTree`] and
/// [`StatelessTree`].
///
/// Returns `Ok(false)` for a well-formed signature that does not verify.
///
/// # Errors
///
/// Returns [`Error::MalformedSignature`](crate::Error::MalformedSignature) if the
/// signature cannot be parsed.
pub fn verify(digest: &[u8; OTS_N], signature: &[u8], public_key: &OtsPublicKey) -> Result<bool> {
    Ok(TreeSignature::from_bytes(signature, WidthEncoding::Prefixed)?.verify(digest, public_key))
}

/// Verifies a width-prefixed signature over an arbitrary message.
pub fn verify_message(
    message: &[u8],
    signature: &[u8],
    public_key: &OtsPublicKey,
) -> Result<bool> {
    verify(&message_digest(message), signature, public_key)
}

pub(crate) fn level_digest(keys: &[OtsPublicKey]) -> [u8; OTS_N] {
    TreeHasher::digest_parts(
        std::iter::once(LEVEL_DOMAIN_PREFIX).chain(keys.iter().map(|key| key.as_ref())),
    )
}

pub(crate) fn leaf_digest(digest: &[u8; OTS_N]) -> [u8; OTS_N] {
    TreeHasher::digest_parts([LEAF_DOMAIN_PREFIX, &digest[..]])
}
