//! The passphrase trial.
//!
//! passphrase -> stretched key material -> master key -> private key ->
//! public key comparison. Every cipher or arithmetic failure along the way is
//! a plain non-match; nothing in here returns an error or panics on hostile
//! input, because the inner loop runs millions of times over garbage.

use aes::cipher::block_padding::NoPadding;
use aes::cipher::{BlockDecryptMut, KeyIvInit};
use secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256, Sha512};

use super::descriptor::WalletDescriptor;

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Tests one candidate against the wallet. `true` means the passphrase
/// reproduces the wallet's public key byte for byte.
pub fn verify_candidate(secp: &Secp256k1<All>, passphrase: &str, wallet: &WalletDescriptor) -> bool {
    let Some(private_key) = recover_private_key(passphrase, wallet) else {
        return false;
    };
    // Rejects scalars outside (0, n); such candidates are non-matches.
    let Ok(secret) = SecretKey::from_slice(&private_key) else {
        return false;
    };
    let public = PublicKey::from_secret_key(secp, &secret);
    public.serialize_uncompressed()[..] == wallet.uncompressed_public_key[..]
}

fn recover_private_key(passphrase: &str, wallet: &WalletDescriptor) -> Option<[u8; 32]> {
    let (key, iv) = derive_key_material(passphrase, &wallet.salt, wallet.derivation_iterations)?;
    let master_key = decrypt_first_32(&key, &iv, &wallet.encrypted_master_key)?;
    let inner_iv = inner_iv(&wallet.uncompressed_public_key);
    decrypt_first_32(&master_key, &inner_iv, &wallet.encrypted_private_key)
}

/// Iterated SHA-512 over `utf8(passphrase) || salt`. The stretched key is the
/// first 32 bytes of the final digest, the IV the following 16.
fn derive_key_material(passphrase: &str, salt: &[u8], iterations: u32) -> Option<([u8; 32], [u8; 16])> {
    if iterations == 0 {
        return None;
    }
    let mut seed = Vec::with_capacity(passphrase.len() + salt.len());
    seed.extend_from_slice(passphrase.as_bytes());
    seed.extend_from_slice(salt);

    let mut digest = Sha512::digest(&seed);
    for _ in 1..iterations {
        digest = Sha512::digest(digest);
    }

    let mut key = [0u8; 32];
    let mut iv = [0u8; 16];
    key.copy_from_slice(&digest[..32]);
    iv.copy_from_slice(&digest[32..48]);
    Some((key, iv))
}

/// SHA-256d of the target public key, truncated to one AES block.
fn inner_iv(uncompressed_public_key: &[u8]) -> [u8; 16] {
    let digest = Sha256::digest(Sha256::digest(uncompressed_public_key));
    let mut iv = [0u8; 16];
    iv.copy_from_slice(&digest[..16]);
    iv
}

/// AES-256-CBC with padding disabled; the first 32 plaintext bytes are the
/// recovered key. Unaligned or short ciphertexts yield `None`, never an error.
fn decrypt_first_32(key: &[u8; 32], iv: &[u8; 16], ciphertext: &[u8]) -> Option<[u8; 32]> {
    let cipher = Aes256CbcDec::new_from_slices(key, iv).ok()?;
    let mut buf = ciphertext.to_vec();
    let plaintext = cipher.decrypt_padded_mut::<NoPadding>(&mut buf).ok()?;
    if plaintext.len() < 32 {
        return None;
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&plaintext[..32]);
    Some(out)
}
