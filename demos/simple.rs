use treesig::tree::{verify_message, FixedCapacityTree, ManyTimeSigner, TreeShape};
use treesig::{CapacityOptimizedTree, Error};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug shows key generation and odometer carries.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // A tree sized for signatures of at most 8 KiB.
    let mut tree = CapacityOptimizedTree::from_budget(8 * 1024)?;
    let shape = tree.shape();
    println!(
        "depth {}, width {}: {} signatures of {} bytes",
        shape.depth(),
        shape.width(),
        tree.signatures_left(),
        shape.signature_bytes() + 1
    );

    // Anyone holding the 32-byte public key can verify.
    let public_key = *tree.public_key();
    let message = b"Hi! This is my first tree-signed message.";
    let signature = tree.sign_message(message)?;
    assert!(verify_message(message, &signature, &public_key)?);
    assert!(!verify_message(b"a different message", &signature, &public_key)?);

    // Truncated signatures are malformed rather than merely invalid.
    assert!(matches!(
        verify_message(message, &signature[..100], &public_key),
        Err(Error::MalformedSignature(_))
    ));

    // A fixed-capacity tree leaves the width to the verifier.
    let mut small = FixedCapacityTree::new(TreeShape::new(2, 2)?);
    for i in 0..4u8 {
        let digest = [i; 32];
        let signature = small.sign_to_bytes(&digest)?;
        assert!(FixedCapacityTree::verify(&digest, &signature, small.public_key(), 2)?);
    }
    assert_eq!(small.sign(&[4u8; 32]).err(), Some(Error::KeyExhausted));
    println!("fixed 2 x 2 tree issued 4 signatures and then refused a fifth");

    Ok(())
}
