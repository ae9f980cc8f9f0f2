use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use tracing::debug;

use portable_subtle::model::{Algorithm, GeneratedKey, JsonWebKey, KeyData, KeyFormat, KeyUsage};
use portable_subtle::{Crypto, ShimConfig, SoftwareEngine};

#[derive(Parser, Debug)]
#[command(name = "psubtle")]
#[command(about = "Subtle-crypto operations over a software engine", version)]
pub struct Cli {
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Seed bytes drawn from the random source at startup
    #[arg(long, global = true, default_value_t = portable_subtle::config::DEFAULT_SEED_LENGTH)]
    pub seed_length: usize,

    /// Fail instead of seeding from an insecure generator when no secure source exists
    #[arg(long, global = true)]
    pub no_insecure_fallback: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hash data provided via stdin, print hex
    Digest {
        #[arg(long, default_value = "SHA-256")]
        algorithm: String,
    },

    /// Generate a key and print it as JWK
    Generate {
        #[arg(long, default_value = "ed25519")]
        algorithm: GenerateArg,
    },

    /// Print random bytes as hex
    Random {
        #[arg(long, default_value_t = 32)]
        length: usize,
    },

    /// Sign data provided via stdin with a JWK private or secret key, print hex
    Sign {
        #[arg(long)]
        jwk: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GenerateArg {
    Hmac,
    Ed25519,
    AesGcm,
}

impl GenerateArg {
    fn algorithm(self) -> Algorithm {
        match self {
            GenerateArg::Hmac => Algorithm::new("HMAC").with_hash("SHA-256"),
            GenerateArg::Ed25519 => Algorithm::new("Ed25519"),
            GenerateArg::AesGcm => Algorithm::new("AES-GCM").with_length(256),
        }
    }

    fn usages(self) -> Vec<KeyUsage> {
        match self {
            GenerateArg::Hmac | GenerateArg::Ed25519 => vec![KeyUsage::Sign, KeyUsage::Verify],
            GenerateArg::AesGcm => vec![KeyUsage::Encrypt, KeyUsage::Decrypt],
        }
    }
}

/// Signing algorithm matching a JWK's key type
fn signing_algorithm(jwk: &JsonWebKey) -> anyhow::Result<Algorithm> {
    match jwk.kty.as_str() {
        "oct" => {
            let hash = match jwk.alg.as_deref() {
                None | Some("HS256") => "SHA-256",
                Some("HS384") => "SHA-384",
                Some("HS512") => "SHA-512",
                Some(other) => bail!("Unsupported HMAC JWK alg: {other}"),
            };
            Ok(Algorithm::new("HMAC").with_hash(hash))
        }
        "OKP" => Ok(Algorithm::new("Ed25519")),
        other => bail!("Unsupported JWK key type for signing: {other}"),
    }
}

fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let mut data = Vec::new();
    io::stdin()
        .read_to_end(&mut data)
        .context("failed to read stdin")?;
    Ok(data)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(io::stderr)
        .init();

    let config = ShimConfig {
        seed_length: cli.seed_length,
        allow_insecure_fallback: !cli.no_insecure_fallback,
    };
    debug!(?config, "starting");
    let crypto = Crypto::launch_on_host(Arc::new(SoftwareEngine::new()), &config);

    match cli.command {
        Commands::Digest { algorithm } => {
            let data = read_stdin()?;
            let digest = crypto
                .subtle()
                .digest(&Algorithm::new(algorithm), data)
                .await
                .context("digest failed")?;
            println!("{}", hex::encode(digest));
        }

        Commands::Generate { algorithm } => {
            let generated = crypto
                .subtle()
                .generate_key(&algorithm.algorithm(), true, &algorithm.usages())
                .await
                .context("failed to generate key")?;
            let key = match generated {
                GeneratedKey::Pair(pair) => pair.private_key,
                GeneratedKey::Secret(key) => key,
            };
            let exported = crypto
                .subtle()
                .export_key(KeyFormat::Jwk, &key)
                .await
                .context("failed to export key")?;
            let jwk = exported.as_jwk().context("engine did not return a JWK")?;
            println!("{}", serde_json::to_string_pretty(jwk)?);
        }

        Commands::Random { length } => {
            crypto
                .ensure_secure()
                .await
                .context("secure random source unavailable")?;
            let mut buffer = vec![0u8; length];
            crypto.get_random_values(&mut buffer)?;
            println!("{}", hex::encode(buffer));
        }

        Commands::Sign { jwk } => {
            let text = fs::read_to_string(&jwk)
                .with_context(|| format!("failed to read {}", jwk.display()))?;
            let jwk: JsonWebKey = serde_json::from_str(&text).context("invalid JWK")?;
            let algorithm = signing_algorithm(&jwk)?;
            let key = crypto
                .subtle()
                .import_key(
                    KeyFormat::Jwk,
                    &KeyData::Jwk(jwk),
                    &algorithm,
                    false,
                    &[KeyUsage::Sign],
                )
                .await
                .context("failed to import signing key")?;
            let data = read_stdin()?;
            let signature = crypto
                .subtle()
                .sign(&algorithm, &key, data)
                .await
                .context("failed to sign data")?;
            println!("{}", hex::encode(signature));
        }
    }

    Ok(())
}
