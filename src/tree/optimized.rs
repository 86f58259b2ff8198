use crate::params::OTS_N;
use crate::tree::{FixedCapacityTree, ManyTimeSigner, TreeShape, TreeSignature, WidthEncoding};
use crate::wots::OtsPublicKey;
use crate::Result;

/// A [`FixedCapacityTree`] shaped for the most signatures that fit a signature-size
/// budget. Its signatures start with the width byte, so verifiers need nothing but the
/// root public key.
#[derive(Debug)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct CapacityOptimizedTree {
    inner: FixedCapacityTree,
}

impl CapacityOptimizedTree {
    /// # Errors
    ///
    /// Returns [`Error::BudgetTooSmall`](crate::Error::BudgetTooSmall) if no tree fits
    /// `max_signature_bytes`.
    pub fn from_budget(max_signature_bytes: usize) -> Result<Self> {
        let shape = TreeShape::from_budget(max_signature_bytes)?;
        tracing::debug!(
            max_signature_bytes,
            depth = shape.depth(),
            width = shape.width(),
            "selected tree shape for signature budget"
        );
        Ok(Self {
            inner: FixedCapacityTree::new(shape),
        })
    }

    pub fn public_key(&self) -> &OtsPublicKey {
        self.inner.public_key()
    }

    pub fn shape(&self) -> TreeShape {
        self.inner.shape()
    }

    pub fn signatures_left(&self) -> u128 {
        self.inner.signatures_left()
    }

    /// # Errors
    ///
    /// Returns [`Error::KeyExhausted`](crate::Error::KeyExhausted) once every leaf has been
    /// used.
    pub fn sign(&mut self, digest: &[u8; OTS_N]) -> Result<TreeSignature> {
        self.inner.sign(digest)
    }
}

impl ManyTimeSigner for CapacityOptimizedTree {
    fn public_key(&self) -> &OtsPublicKey {
        self.inner.public_key()
    }

    fn shape(&self) -> TreeShape {
        self.inner.shape()
    }

    fn encoding(&self) -> WidthEncoding {
        WidthEncoding::Prefixed
    }

    fn signatures_left(&self) -> u128 {
        self.inner.signatures_left()
    }

    fn sign(&mut self, digest: &[u8; OTS_N]) -> Result<TreeSignature> {
        self.inner.sign(digest)
    }
}
