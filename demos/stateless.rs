use rand::rngs::OsRng;
use rand::RngCore;
use treesig::params::{DEFAULT_MAX_SIGNATURE_BYTES, MASTER_SECRET_BYTES};
use treesig::tree::{verify, ManyTimeSigner};
use treesig::StatelessTree;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut master_secret = vec![0u8; MASTER_SECRET_BYTES];
    OsRng.fill_bytes(&mut master_secret);

    // The default budget gives a tree large enough for a 2^-64 path-collision bound.
    let tree = StatelessTree::new(&master_secret, DEFAULT_MAX_SIGNATURE_BYTES)?;
    println!(
        "depth {}, width {}: up to {} signatures",
        tree.shape().depth(),
        tree.shape().width(),
        tree.max_signatures()
    );

    // The same master secret always yields the same public key.
    let restored = StatelessTree::new(&master_secret, DEFAULT_MAX_SIGNATURE_BYTES)?;
    assert_eq!(tree.public_key(), restored.public_key());

    let digest = [7u8; 32];
    let signature = tree.sign(&digest)?;
    let bytes = signature.to_bytes(tree.encoding())?;
    assert!(verify(&digest, &bytes, restored.public_key())?);
    println!("signature of {} bytes verified", bytes.len());

    Ok(())
}
