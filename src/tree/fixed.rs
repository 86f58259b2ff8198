use crate::params::OTS_N;
use crate::tree::{
    leaf_digest, level_digest, Advance, LevelAuth, ManyTimeSigner, Odometer, TreeShape,
    TreeSignature, WidthEncoding,
};
use crate::wots::{OneTimeKey, OtsPublicKey, Wots};
use crate::{Error, Result};
use rayon::prelude::*;

/// A stateful tree that issues exactly `width^depth` signatures, in leaf order.
///
/// Levels are generated on first use. When the [`Odometer`] carries into level `k`, every
/// level below `k` is dropped, zeroizing its unused secret keys, and regenerated before the
/// next signature. The verifier learns the width out of band, so signatures carry no
/// width byte.
#[derive(Debug)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "StoredTree")
)]
pub struct FixedCapacityTree {
    shape: TreeShape,
    root: OneTimeKey,
    levels: Vec<Option<Vec<OneTimeKey>>>,
    odometer: Odometer,
}

/// Persisted form of a [`FixedCapacityTree`], checked against its shape before use.
#[cfg(feature = "serialization")]
#[derive(serde::Deserialize)]
struct StoredTree {
    shape: TreeShape,
    root: OneTimeKey,
    levels: Vec<Option<Vec<OneTimeKey>>>,
    odometer: Odometer,
}

#[cfg(feature = "serialization")]
impl TryFrom<StoredTree> for FixedCapacityTree {
    type Error = Error;

    fn try_from(stored: StoredTree) -> Result<Self> {
        let shape = TreeShape::new(stored.shape.depth(), stored.shape.width())?;
        if stored.levels.len() != shape.depth() {
            return Err(Error::InvalidShape(format!(
                "{} stored levels for depth {}",
                stored.levels.len(),
                shape.depth()
            )));
        }
        if let Some(level) = stored
            .levels
            .iter()
            .position(|keys| keys.as_ref().is_some_and(|keys| keys.len() != shape.width()))
        {
            return Err(Error::InvalidShape(format!(
                "stored level {level} does not hold {} keys",
                shape.width()
            )));
        }
        stored.odometer.check(shape.depth(), shape.width_byte())?;
        Ok(Self {
            shape,
            root: stored.root,
            levels: stored.levels,
            odometer: stored.odometer,
        })
    }
}

impl FixedCapacityTree {
    pub fn new(shape: TreeShape) -> Self {
        let root = OneTimeKey::from(Wots::keygen());
        tracing::debug!(
            depth = shape.depth(),
            width = shape.width(),
            "created fixed-capacity signature tree"
        );
        Self {
            shape,
            root,
            levels: (0..shape.depth()).map(|_| None).collect(),
            odometer: Odometer::new(shape.depth(), shape.width_byte()),
        }
    }

    pub fn public_key(&self) -> &OtsPublicKey {
        self.root.public_key()
    }

    pub fn shape(&self) -> TreeShape {
        self.shape
    }

    /// Path digits of the next leaf to be used.
    pub fn position(&self) -> &[u8] {
        self.odometer.digits()
    }

    pub fn signatures_left(&self) -> u128 {
        if self.odometer.is_exhausted() {
            return 0;
        }
        match (self.shape.capacity().to_u128(), self.odometer.position()) {
            (Some(capacity), Some(used)) => capacity - used,
            _ => u128::MAX,
        }
    }

    /// Signs `digest` with the next unused leaf and moves to the following one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyExhausted`] once all `width^depth` leaves have been used.
    pub fn sign(&mut self, digest: &[u8; OTS_N]) -> Result<TreeSignature> {
        if self.odometer.is_exhausted() {
            tracing::warn!("signature requested from an exhausted tree");
            return Err(Error::KeyExhausted);
        }
        self.populate_levels();

        let depth = self.shape.depth();
        let mut levels = Vec::with_capacity(depth);
        for level in 0..depth {
            let keys: Vec<OtsPublicKey> =
                self.level(level)?.iter().map(|key| *key.public_key()).collect();
            let signature = self.parent_mut(level)?.sign(&level_digest(&keys))?;
            levels.push(LevelAuth {
                keys,
                signature,
                index: self.odometer.digit(level),
            });
        }
        let leaf = self.parent_mut(depth)?.sign(&leaf_digest(digest))?;

        match self.odometer.advance() {
            Advance::Moved { level } => self.regenerate_below(level),
            Advance::Exhausted => {
                tracing::warn!(depth, width = self.shape.width(), "signature tree exhausted")
            }
        }
        Ok(TreeSignature { levels, leaf })
    }

    /// Verifies an unprefixed signature from a tree of the given `width`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSignature`] if the signature cannot be parsed.
    pub fn verify(
        digest: &[u8; OTS_N],
        signature: &[u8],
        public_key: &OtsPublicKey,
        width: u8,
    ) -> Result<bool> {
        Ok(
            TreeSignature::from_bytes(signature, WidthEncoding::OutOfBand(width))?
                .verify(digest, public_key),
        )
    }

    /// Drops every level below `level`; they no longer lie on the current path.
    fn regenerate_below(&mut self, level: usize) {
        tracing::debug!(level, position = ?self.odometer.digits(), "odometer carry");
        for stale in self.levels.iter_mut().skip(level + 1) {
            *stale = None;
        }
    }

    fn populate_levels(&mut self) {
        let width = self.shape.width();
        for (level, slot) in self.levels.iter_mut().enumerate() {
            if slot.is_none() {
                tracing::trace!(level, width, "generating one-time keys");
                *slot = Some(generate_level(width));
            }
        }
    }

    fn level(&self, level: usize) -> Result<&[OneTimeKey]> {
        self.levels
            .get(level)
            .and_then(Option::as_deref)
            .ok_or_else(|| Error::InvalidShape(format!("level {level} not generated")))
    }

    /// The key that signs level `level`: the root for level 0, otherwise the selected key
    /// of the level above. `level == depth` yields the leaf key.
    fn parent_mut(&mut self, level: usize) -> Result<&mut OneTimeKey> {
        if level == 0 {
            return Ok(&mut self.root);
        }
        let index = self.odometer.digit(level - 1) as usize;
        self.levels
            .get_mut(level - 1)
            .and_then(Option::as_mut)
            .and_then(|keys| keys.get_mut(index))
            .ok_or_else(|| Error::InvalidShape(format!("level {} not generated", level - 1)))
    }
}

pub(crate) fn generate_level(width: usize) -> Vec<OneTimeKey> {
    (0..width)
        .into_par_iter()
        .map(|_| OneTimeKey::from(Wots::keygen()))
        .collect()
}

impl ManyTimeSigner for FixedCapacityTree {
    fn public_key(&self) -> &OtsPublicKey {
        FixedCapacityTree::public_key(self)
    }

    fn shape(&self) -> TreeShape {
        self.shape
    }

    fn encoding(&self) -> WidthEncoding {
        WidthEncoding::OutOfBand(self.shape.width_byte())
    }

    fn signatures_left(&self) -> u128 {
        FixedCapacityTree::signatures_left(self)
    }

    fn sign(&mut self, digest: &[u8; OTS_N]) -> Result<TreeSignature> {
        FixedCapacityTree::sign(self, digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::OTS_BYTES;
    use rand::rngs::OsRng;
    use rand::{Rng, RngCore};

    fn tree(depth: usize, width: usize) -> FixedCapacityTree {
        FixedCapacityTree::new(TreeShape::new(depth, width).unwrap())
    }

    #[test]
    fn test_exact_capacity() {
        let mut tree = tree(2, 4);
        let public_key = *tree.public_key();
        assert_eq!(tree.signatures_left(), 16);

        let mut seen = std::collections::HashSet::new();
        for i in 0..16u8 {
            let digest = [i; OTS_N];
            assert_eq!(tree.position(), &[i / 4, i % 4]);
            let signature = tree.sign(&digest).unwrap();
            assert_eq!(signature.levels[0].index, i / 4);
            assert_eq!(signature.levels[1].index, i % 4);
            seen.insert(signature.levels[1].keys[(i % 4) as usize]);

            let bytes = signature.to_bytes(tree.encoding()).unwrap();
            assert_eq!(bytes.len(), tree.shape().signature_bytes());
            assert_eq!(FixedCapacityTree::verify(&digest, &bytes, &public_key, 4), Ok(true));
            assert_eq!(tree.signatures_left(), 15 - i as u128);
        }
        // Every leaf key is distinct.
        assert_eq!(seen.len(), 16);
        assert_eq!(tree.sign(&[0u8; OTS_N]), Err(Error::KeyExhausted));
        assert_eq!(tree.signatures_left(), 0);
    }

    #[test]
    fn test_carry_regenerates_lower_levels() {
        let mut tree = tree(3, 2);
        let first = tree.sign(&[1u8; OTS_N]).unwrap();
        let second = tree.sign(&[2u8; OTS_N]).unwrap();
        assert_eq!(first.levels[2].keys, second.levels[2].keys);

        // [0, 1, 0]: level 2 is regenerated, levels 0 and 1 stay.
        let third = tree.sign(&[3u8; OTS_N]).unwrap();
        assert_eq!(first.levels[0].keys, third.levels[0].keys);
        assert_eq!(first.levels[1].keys, third.levels[1].keys);
        assert_ne!(first.levels[2].keys, third.levels[2].keys);
        assert_eq!(first.levels[1].signature, third.levels[1].signature);

        tree.sign(&[4u8; OTS_N]).unwrap();
        // [1, 0, 0]: levels 1 and 2 are regenerated.
        let fifth = tree.sign(&[5u8; OTS_N]).unwrap();
        assert_eq!(first.levels[0].keys, fifth.levels[0].keys);
        assert_ne!(first.levels[1].keys, fifth.levels[1].keys);
        assert_ne!(third.levels[2].keys, fifth.levels[2].keys);
    }

    #[test]
    fn test_width_one() {
        let mut tree = tree(3, 1);
        assert_eq!(tree.signatures_left(), 1);
        let digest = [5u8; OTS_N];
        let signature = tree.sign(&digest).unwrap();
        assert!(signature.verify(&digest, tree.public_key()));
        assert_eq!(tree.sign(&digest), Err(Error::KeyExhausted));
    }

    #[test]
    fn test_rejects_tampering() {
        let mut tree = tree(2, 3);
        let digest = [7u8; OTS_N];
        let bytes = tree.sign_to_bytes(&digest).unwrap();
        let public_key = *tree.public_key();

        assert_eq!(FixedCapacityTree::verify(&[8u8; OTS_N], &bytes, &public_key, 3), Ok(false));
        let other_key = *FixedCapacityTree::new(tree.shape()).public_key();
        assert_eq!(FixedCapacityTree::verify(&digest, &bytes, &other_key, 3), Ok(false));

        for _ in 0..32 {
            let mut tampered = bytes.clone();
            let at = OsRng.gen_range(0..tampered.len());
            tampered[at] ^= 1 << OsRng.gen_range(0..8);
            // A flipped index byte may also fall outside the level.
            assert_ne!(
                FixedCapacityTree::verify(&digest, &tampered, &public_key, 3),
                Ok(true),
                "flip at byte {at} went unnoticed"
            );
        }

        let mut random = vec![0u8; bytes.len()];
        OsRng.fill_bytes(&mut random);
        assert_ne!(FixedCapacityTree::verify(&digest, &random, &public_key, 3), Ok(true));
        assert!(FixedCapacityTree::verify(&digest, &bytes[..OTS_BYTES], &public_key, 3).is_err());
        assert!(FixedCapacityTree::verify(&digest, &bytes, &public_key, 0).is_err());
    }

    #[cfg(feature = "serialization")]
    #[test]
    fn test_state_survives_serialization() {
        let mut tree = tree(2, 2);
        tree.sign(&[1u8; OTS_N]).unwrap();

        let json = serde_json::to_string(&tree).unwrap();
        let mut restored: FixedCapacityTree = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.public_key(), tree.public_key());
        assert_eq!(restored.position(), &[0, 1]);
        assert_eq!(restored.signatures_left(), 3);

        let digest = [2u8; OTS_N];
        let signature = restored.sign(&digest).unwrap();
        assert!(signature.verify(&digest, tree.public_key()));
    }

    #[cfg(feature = "serialization")]
    #[test]
    fn test_inconsistent_state_is_refused() {
        let mut tree = tree(2, 3);
        tree.sign(&[1u8; OTS_N]).unwrap();
        let stored = serde_json::to_value(&tree).unwrap();

        let restore = |edit: fn(&mut serde_json::Value)| {
            let mut value = stored.clone();
            edit(&mut value);
            serde_json::from_value::<FixedCapacityTree>(value)
        };
        assert!(restore(|_| {}).is_ok());
        // Too few digits for the depth.
        assert!(restore(|v| v["odometer"]["digits"] = serde_json::json!([0])).is_err());
        // A digit outside the level.
        assert!(restore(|v| v["odometer"]["digits"] = serde_json::json!([0, 3])).is_err());
        // Odometer base disagrees with the shape.
        assert!(restore(|v| v["odometer"]["width"] = serde_json::json!(4)).is_err());
        // Shape outside the valid range.
        assert!(restore(|v| v["shape"]["width"] = serde_json::json!(0)).is_err());
        // Missing level slot.
        assert!(restore(|v| {
            v["levels"].as_array_mut().unwrap().pop();
        })
        .is_err());
        // A generated level with a key missing.
        assert!(restore(|v| {
            v["levels"][1].as_array_mut().unwrap().pop();
        })
        .is_err());
    }
}
