// Example demonstrating the gated subtle surface as a library
//
// Run with: cargo run --example basic_signing

use std::sync::Arc;

use portable_subtle::model::{Algorithm, KeyUsage};
use portable_subtle::{Crypto, ShimConfig, SoftwareEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("Portable Subtle Basic Signing Example");
    println!("=====================================\n");

    // Usable at once; operations wait for seeding in the background
    let crypto = Crypto::launch_on_host(Arc::new(SoftwareEngine::new()), &ShimConfig::default());
    let mut events = crypto.subscribe();

    let ed25519 = Algorithm::new("Ed25519");
    println!("Generating Ed25519 key pair...");
    let pair = crypto
        .subtle()
        .generate_key(&ed25519, false, &[KeyUsage::Sign, KeyUsage::Verify])
        .await?
        .into_pair()
        .ok_or_else(|| anyhow::anyhow!("expected a key pair"))?;
    println!("✓ Key pair generated");
    println!("  Readiness event: {:?}", events.try_recv().ok().map(|e| e.name()));
    println!("  Algorithm: {}", pair.public_key.algorithm.name);
    println!("  Public usages: {:?}\n", pair.public_key.usages);

    let message = "Hello, portable subtle!";
    println!("Signing message: {:?}", message);
    let signature = crypto.subtle().sign(&ed25519, &pair.private_key, message).await?;
    println!("✓ Message signed");
    println!("  Signature: {}\n", hex::encode(&signature));

    println!("Verifying signature...");
    if crypto
        .subtle()
        .verify(&ed25519, &pair.public_key, &signature, message.as_bytes())
        .await?
    {
        println!("✓ Signature verified successfully!");
    } else {
        println!("✗ Signature verification failed");
    }

    Ok(())
}
