use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// The static bundle a candidate passphrase is tested against.
///
/// Binary fields travel as hex strings, both in the descriptor file and in
/// lease responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletDescriptor {
    #[serde(with = "hex::serde")]
    pub salt: Vec<u8>,
    pub derivation_iterations: u32,
    #[serde(with = "hex::serde")]
    pub encrypted_master_key: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub encrypted_private_key: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub uncompressed_public_key: Vec<u8>,
}

impl WalletDescriptor {
    /// Loads and validates the descriptor from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("wallet descriptor not found at {}", path.display()))?;
        let descriptor: Self = serde_json::from_str(&text)
            .with_context(|| format!("invalid wallet descriptor in {}", path.display()))?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    pub fn validate(&self) -> Result<()> {
        if self.derivation_iterations == 0 {
            bail!("derivation_iterations must be positive");
        }
        if self.encrypted_master_key.is_empty() || self.encrypted_master_key.len() % 16 != 0 {
            bail!("encrypted_master_key must be a non-empty multiple of 16 bytes");
        }
        if self.encrypted_private_key.is_empty() || self.encrypted_private_key.len() % 16 != 0 {
            bail!("encrypted_private_key must be a non-empty multiple of 16 bytes");
        }
        if self.uncompressed_public_key.len() != 65 || self.uncompressed_public_key[0] != 0x04 {
            bail!("uncompressed_public_key must be 65 bytes with a 0x04 prefix");
        }
        Ok(())
    }
}
