use crate::cipher::SeedStream;
use crate::hash::TreeHasher;
use crate::params::{
    DEFAULT_COLLISION_BOUND_BITS, DEFAULT_MAX_SIGNATURE_BYTES, MASTER_SECRET_BYTES, OTS_N,
    OTS_SK_BYTES, PATH_DOMAIN_PREFIX, PATH_KEY_BYTES,
};
use crate::tree::{
    leaf_digest, level_digest, LevelAuth, ManyTimeSigner, TreeShape, TreeSignature,
    WidthEncoding,
};
use crate::utils::xor_in_place;
use crate::wots::{OtsKeyPair, OtsPublicKey, OtsSecretKey, Wots};
use crate::{Error, Result};
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use rayon::prelude::*;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Smallest signature budget whose tree can sign under the default collision bound.
pub const MIN_DEFAULT_BOUND_BUDGET: usize = 26_031;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct StatelessConfig {
    /// Budget the tree shape is chosen from, as for
    /// [`CapacityOptimizedTree`](crate::tree::CapacityOptimizedTree).
    pub max_signature_bytes: usize,
    /// Signing stops once two random paths would collide with probability above
    /// `2^-collision_bound_bits`.
    pub collision_bound_bits: u32,
}

impl Default for StatelessConfig {
    fn default() -> Self {
        Self {
            max_signature_bytes: DEFAULT_MAX_SIGNATURE_BYTES,
            collision_bound_bits: DEFAULT_COLLISION_BOUND_BITS,
        }
    }
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct MasterSecret(Vec<u8>);

/// A tree that keeps no per-signature key state.
///
/// Every OTS key is re-derived from the master secret and its position in the tree, and
/// each signature follows a uniformly random path. Two signatures reuse a leaf only if
/// their paths collide, so the tree refuses to sign once `q` signatures would push the
/// birthday bound `q^2 / 2N` above `2^-b`, where `N` is the leaf count and `b` the
/// configured bound.
///
/// The signature counter lives in memory only. Recreating the tree from the same master
/// secret starts a new count.
pub struct StatelessTree {
    shape: TreeShape,
    master: MasterSecret,
    public: OtsPublicKey,
    max_signatures: u64,
    issued: AtomicU64,
}

impl fmt::Debug for StatelessTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatelessTree")
            .field("shape", &self.shape)
            .field("public", &self.public)
            .field("max_signatures", &self.max_signatures)
            .field("issued", &self.issued)
            .finish_non_exhaustive()
    }
}

impl StatelessTree {
    /// Creates a tree with a fresh random master secret.
    pub fn generate(config: StatelessConfig) -> Result<Self> {
        let mut master = Zeroizing::new(vec![0u8; MASTER_SECRET_BYTES]);
        OsRng.fill_bytes(&mut master);
        Self::with_config(&master, config)
    }

    /// Creates a tree from `master_secret` with the default collision bound.
    ///
    /// A 2^-64 bound needs at least 2^63 leaves before a single signature is allowed. The
    /// smallest budget that reaches it is [`MIN_DEFAULT_BOUND_BUDGET`] bytes (a 15 x 19
    /// tree); smaller budgets need [`with_config`](Self::with_config) and a looser bound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientSeed`] for a short master secret and
    /// [`Error::InvalidShape`] when `max_signature_bytes` is below
    /// [`MIN_DEFAULT_BOUND_BUDGET`]. See [`with_config`](Self::with_config).
    pub fn new(master_secret: &[u8], max_signature_bytes: usize) -> Result<Self> {
        Self::with_config(
            master_secret,
            StatelessConfig {
                max_signature_bytes,
                ..StatelessConfig::default()
            },
        )
    }

    /// Creates a tree from `master_secret`. The first [`PATH_KEY_BYTES`] bytes key the
    /// per-path derivation, the rest seeds the root OTS key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientSeed`] if `master_secret` is shorter than
    /// [`MASTER_SECRET_BYTES`], [`Error::BudgetTooSmall`] if no tree fits the budget, and
    /// [`Error::InvalidShape`] if the chosen tree is too small to issue a single
    /// signature under the collision bound.
    pub fn with_config(master_secret: &[u8], config: StatelessConfig) -> Result<Self> {
        if master_secret.len() < MASTER_SECRET_BYTES {
            return Err(Error::InsufficientSeed {
                expected: MASTER_SECRET_BYTES,
                found: master_secret.len(),
            });
        }
        let shape = TreeShape::from_budget(config.max_signature_bytes)?;
        let max_signatures = signature_ceiling(shape, config.collision_bound_bits);
        if max_signatures == 0 {
            return Err(Error::InvalidShape(format!(
                "{} x {} tree cannot sign within a 2^-{} collision bound",
                shape.depth(),
                shape.width(),
                config.collision_bound_bits
            )));
        }

        let master = MasterSecret(master_secret.to_vec());
        let public = Wots::keygen_from_seed(&master.0[PATH_KEY_BYTES..])?.public;
        tracing::debug!(
            depth = shape.depth(),
            width = shape.width(),
            max_signatures,
            "created stateless signature tree"
        );
        Ok(Self {
            shape,
            master,
            public,
            max_signatures,
            issued: AtomicU64::new(0),
        })
    }

    pub fn public_key(&self) -> &OtsPublicKey {
        &self.public
    }

    pub fn shape(&self) -> TreeShape {
        self.shape
    }

    /// Signatures this instance may issue in total.
    pub fn max_signatures(&self) -> u64 {
        self.max_signatures
    }

    pub fn signatures_left(&self) -> u64 {
        self.max_signatures
            .saturating_sub(self.issued.load(Ordering::SeqCst))
    }

    /// Signs `digest` along a fresh random path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyExhausted`] once the collision bound is reached.
    pub fn sign(&self, digest: &[u8; OTS_N]) -> Result<TreeSignature> {
        self.reserve_signature()?;
        let width = self.shape.width_byte();
        let path: Vec<u8> = (0..self.shape.depth())
            .map(|_| OsRng.gen_range(0..width))
            .collect();
        self.sign_along(digest, &path)
    }

    /// Derives the OTS keypair at digit `digit` of level `level`, below the path
    /// `ancestors` of digits chosen at the levels above.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShape`] if the coordinates lie outside the tree.
    pub fn derive_keypair(&self, level: usize, digit: u8, ancestors: &[u8]) -> Result<OtsKeyPair> {
        let seed = self.derive_path_seed(level, digit, ancestors)?;
        Wots::keygen_from_seed(&seed[..])
    }

    /// Expands the OTS key seed of one tree position.
    ///
    /// The position is hashed under [`PATH_DOMAIN_PREFIX`] and folded into the path key
    /// taken from the master secret, which then drives a ChaCha20 keystream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShape`] if the coordinates lie outside the tree.
    pub fn derive_path_seed(
        &self,
        level: usize,
        digit: u8,
        ancestors: &[u8],
    ) -> Result<Zeroizing<[u8; OTS_SK_BYTES]>> {
        let width = self.shape.width_byte();
        if level >= self.shape.depth()
            || ancestors.len() != level
            || digit >= width
            || ancestors.iter().any(|&ancestor| ancestor >= width)
        {
            return Err(Error::InvalidShape(format!(
                "no key at level {level}, digit {digit} below {ancestors:?}"
            )));
        }

        let tag = TreeHasher::digest_parts([
            PATH_DOMAIN_PREFIX,
            &[level as u8][..],
            &[digit][..],
            ancestors,
        ]);
        let mut path_key = Zeroizing::new([0u8; PATH_KEY_BYTES]);
        path_key.copy_from_slice(&self.master.0[..PATH_KEY_BYTES]);
        xor_in_place(&mut path_key[..OTS_N], &tag);

        let mut seed = Zeroizing::new([0u8; OTS_SK_BYTES]);
        SeedStream::new(&path_key).fill(&mut seed[..]);
        Ok(seed)
    }

    fn root_secret(&self) -> Result<OtsSecretKey> {
        Ok(Wots::keygen_from_seed(&self.master.0[PATH_KEY_BYTES..])?.secret)
    }

    fn reserve_signature(&self) -> Result<()> {
        self.issued
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |issued| {
                (issued < self.max_signatures).then(|| issued + 1)
            })
            .map(|_| ())
            .map_err(|_| {
                tracing::warn!(
                    max_signatures = self.max_signatures,
                    "stateless tree reached its collision bound"
                );
                Error::KeyExhausted
            })
    }

    pub(crate) fn sign_along(&self, digest: &[u8; OTS_N], path: &[u8]) -> Result<TreeSignature> {
        let width = self.shape.width_byte();
        let mut parent = self.root_secret()?;
        let mut levels = Vec::with_capacity(path.len());

        for (level, &index) in path.iter().enumerate() {
            let ancestors = &path[..level];
            let mut keypairs = (0..width)
                .into_par_iter()
                .map(|digit| self.derive_keypair(level, digit, ancestors))
                .collect::<Result<Vec<_>>>()?;
            let keys: Vec<OtsPublicKey> = keypairs.iter().map(|keypair| keypair.public).collect();

            let signature = parent.sign(&level_digest(&keys));
            parent = keypairs.swap_remove(index as usize).secret;
            levels.push(LevelAuth {
                keys,
                signature,
                index,
            });
        }

        let leaf = parent.sign(&leaf_digest(digest));
        Ok(TreeSignature { levels, leaf })
    }
}

/// Largest signature count `q` with `q^2 / 2N <= 2^-bits`, i.e.
/// `floor(2^((log2 N + 1 - bits) / 2))`.
fn signature_ceiling(shape: TreeShape, collision_bound_bits: u32) -> u64 {
    let exponent = (shape.capacity().log2() + 1.0 - collision_bound_bits as f64) / 2.0;
    if exponent < 0.0 {
        0
    } else if exponent >= 64.0 {
        u64::MAX
    } else {
        exponent.exp2().floor() as u64
    }
}

impl ManyTimeSigner for StatelessTree {
    fn public_key(&self) -> &OtsPublicKey {
        &self.public
    }

    fn shape(&self) -> TreeShape {
        self.shape
    }

    fn encoding(&self) -> WidthEncoding {
        WidthEncoding::Prefixed
    }

    fn signatures_left(&self) -> u128 {
        StatelessTree::signatures_left(self) as u128
    }

    fn sign(&mut self, digest: &[u8; OTS_N]) -> Result<TreeSignature> {
        StatelessTree::sign(self, digest)
    }
}
