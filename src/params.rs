//! Fixed parameters of the one-time signature and the signature trees built on it.

/// Byte size of every hash output, public key, and secret block.
pub const OTS_N: usize = 32;

/// Number of byte-valued message symbols signed by one OTS key.
pub const OTS_MSG_LEN: usize = OTS_N;

/// Number of secret blocks per OTS key: one per message symbol plus the checksum block.
pub const OTS_LEN: usize = OTS_MSG_LEN + 1;

/// Number of distinct values a message symbol can take.
pub const OTS_W: usize = 256;

/// Length of the hash chain behind each message block.
pub const OTS_MSG_CHAIN_LEN: usize = OTS_W;

/// Length of the hash chain behind the checksum block. The checksum of a message
/// never exceeds `OTS_MSG_LEN * (OTS_W - 1)`, so it always fits in this chain.
pub const OTS_CHECKSUM_CHAIN_LEN: usize = OTS_MSG_LEN * OTS_W;

/// OTS signature byte size.
pub const OTS_BYTES: usize = OTS_LEN * OTS_N;

/// OTS secret-key byte size. A seed used for deterministic key generation must be
/// at least this long.
pub const OTS_SK_BYTES: usize = OTS_LEN * OTS_N;

/// OTS public-key byte size.
pub const OTS_PK_BYTES: usize = OTS_N;

/// Largest width or depth a tree can have. The width and the selected index are each
/// carried in a single byte on the wire.
pub const TREE_MAX_ARITY: usize = u8::MAX as usize;

/// Byte size of the key that seeds per-path stream expansion in the stateless tree:
/// a 32-byte ChaCha20 key followed by an 8-byte stream selector.
pub const PATH_KEY_BYTES: usize = 40;

/// Minimum byte size of a stateless-tree master secret: the path key followed by
/// the seed of the root OTS key.
pub const MASTER_SECRET_BYTES: usize = PATH_KEY_BYTES + OTS_SK_BYTES;

/// Domain prefix hashed in front of every path coordinate during stateless derivation.
pub const PATH_DOMAIN_PREFIX: &[u8] = b"treesig-path";

/// Default signature-size budget of the stateless tree.
pub const DEFAULT_MAX_SIGNATURE_BYTES: usize = 64 * 1024;

/// Default collision bound of the stateless tree: signing stops once the probability
/// of two signatures sharing a leaf path would exceed `2^-bits`.
pub const DEFAULT_COLLISION_BOUND_BITS: u32 = 64;

/// Domain prefix of the digest a parent key signs over one level of child public keys.
pub const LEVEL_DOMAIN_PREFIX: &[u8] = b"treesig-level";

/// Domain prefix of the digest a leaf key signs over the caller's message digest.
pub const LEAF_DOMAIN_PREFIX: &[u8] = b"treesig-leaf";
