#[cfg(all(feature = "hash_sha2_256", feature = "hash_shake_256"))]
compile_error!("features `hash_sha2_256` and `hash_shake_256` are mutually exclusive");

#[cfg(not(any(feature = "hash_sha2_256", feature = "hash_shake_256")))]
compile_error!("one of the features `hash_sha2_256` or `hash_shake_256` must be enabled");

#[cfg(feature = "hash_sha2_256")]
mod sha2;
#[cfg(feature = "hash_shake_256")]
mod shake;

#[cfg(feature = "hash_sha2_256")]
pub use crate::hash::sha2::TreeHasher;
#[cfg(feature = "hash_shake_256")]
pub use crate::hash::shake::TreeHasher;
