//! Wallet Module
//!
//! The read-only encrypted wallet bundle and the cryptographic chain that
//! tests a single candidate passphrase against it. The descriptor is loaded
//! once at coordinator startup and shipped verbatim inside every lease
//! response; workers run the verification chain over their batch.
//!
//! ## Submodules
//! - **`descriptor`**: The wallet bundle (salt, key derivation rounds,
//!   encrypted keys, target public key) and its JSON loading/validation.
//! - **`verify`**: The fixed passphrase trial: SHA-512 key stretching,
//!   two AES-256-CBC decryptions, secp256k1 public key comparison.

pub mod descriptor;
pub mod verify;

pub use descriptor::WalletDescriptor;
pub use verify::verify_candidate;

#[cfg(test)]
mod tests;
