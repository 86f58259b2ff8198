//! Hash-based many-time signatures built from Winternitz one-time keys.
//!
//! ```
//! use treesig::tree::{verify_message, CapacityOptimizedTree, ManyTimeSigner};
//!
//! let mut tree = CapacityOptimizedTree::from_budget(4000)?;
//! let signature = tree.sign_message(b"hello")?;
//! assert!(verify_message(b"hello", &signature, tree.public_key())?);
//! # Ok::<(), treesig::Error>(())
//! ```

mod cipher;
mod error;
mod hash;
mod utils;

pub mod params;
pub mod tree;
pub mod wots;

pub use crate::error::{Error, Result};
pub use crate::hash::TreeHasher;
pub use crate::tree::{
    CapacityOptimizedTree, FixedCapacityTree, ManyTimeSigner, StatelessConfig, StatelessTree,
    TreeShape, TreeSignature,
};
pub use crate::wots::{OtsPublicKey, OtsSignature, Wots};
