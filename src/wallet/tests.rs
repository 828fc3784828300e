//! Wallet Module Tests
//!
//! The pipeline tests build a real descriptor by running the derivation
//! forward with a known passphrase and encrypting fixture keys, then check
//! that only that passphrase verifies.

#[cfg(test)]
mod tests {
    use crate::wallet::descriptor::WalletDescriptor;
    use crate::wallet::verify::verify_candidate;

    use aes::cipher::block_padding::NoPadding;
    use aes::cipher::{BlockEncryptMut, KeyIvInit};
    use secp256k1::{PublicKey, Secp256k1, SecretKey};
    use sha2::{Digest, Sha256, Sha512};

    type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

    const PASSPHRASE: &str = "correct horse battery staple";
    const ITERATIONS: u32 = 25;

    fn encrypt(key: &[u8; 32], iv: &[u8; 16], plaintext: &[u8]) -> Vec<u8> {
        Aes256CbcEnc::new_from_slices(key, iv)
            .unwrap()
            .encrypt_padded_vec_mut::<NoPadding>(plaintext)
    }

    fn stretch(passphrase: &str, salt: &[u8], iterations: u32) -> ([u8; 32], [u8; 16]) {
        let mut seed = passphrase.as_bytes().to_vec();
        seed.extend_from_slice(salt);
        let mut digest = Sha512::digest(&seed);
        for _ in 1..iterations {
            digest = Sha512::digest(digest);
        }
        let mut key = [0u8; 32];
        let mut iv = [0u8; 16];
        key.copy_from_slice(&digest[..32]);
        iv.copy_from_slice(&digest[32..48]);
        (key, iv)
    }

    /// Builds a descriptor whose correct passphrase is [`PASSPHRASE`].
    fn fixture_descriptor() -> WalletDescriptor {
        let secp = Secp256k1::new();
        let salt = b"fixture-salt".to_vec();

        let secret_bytes = [0x42u8; 32];
        let secret = SecretKey::from_slice(&secret_bytes).unwrap();
        let public = PublicKey::from_secret_key(&secp, &secret)
            .serialize_uncompressed()
            .to_vec();

        let (derived_key, derived_iv) = stretch(PASSPHRASE, &salt, ITERATIONS);
        let master_key = [0x77u8; 32];
        let encrypted_master_key = encrypt(&derived_key, &derived_iv, &master_key);

        let inner_digest = Sha256::digest(Sha256::digest(&public));
        let mut inner_iv = [0u8; 16];
        inner_iv.copy_from_slice(&inner_digest[..16]);
        let encrypted_private_key = encrypt(&master_key, &inner_iv, &secret_bytes);

        WalletDescriptor {
            salt,
            derivation_iterations: ITERATIONS,
            encrypted_master_key,
            encrypted_private_key,
            uncompressed_public_key: public,
        }
    }

    // ============================================================
    // PIPELINE
    // ============================================================

    #[test]
    fn test_correct_passphrase_matches() {
        let secp = Secp256k1::new();
        let wallet = fixture_descriptor();
        assert!(wallet.validate().is_ok());
        assert!(verify_candidate(&secp, PASSPHRASE, &wallet));
    }

    #[test]
    fn test_wrong_passphrases_do_not_match() {
        let secp = Secp256k1::new();
        let wallet = fixture_descriptor();
        for candidate in ["", "wrong", "correct horse battery stapl", "硬い馬"] {
            assert!(!verify_candidate(&secp, candidate, &wallet));
        }
    }

    #[test]
    fn test_unaligned_ciphertext_is_a_non_match() {
        let secp = Secp256k1::new();
        let mut wallet = fixture_descriptor();
        wallet.encrypted_master_key.push(0xAB);
        // Must not crash on a 16-byte-unaligned ciphertext.
        assert!(!verify_candidate(&secp, PASSPHRASE, &wallet));
    }

    #[test]
    fn test_short_ciphertext_is_a_non_match() {
        let secp = Secp256k1::new();
        let mut wallet = fixture_descriptor();
        wallet.encrypted_private_key.truncate(16);
        assert!(!verify_candidate(&secp, PASSPHRASE, &wallet));
    }

    #[test]
    fn test_invalid_scalar_is_a_non_match() {
        let secp = Secp256k1::new();
        let mut wallet = fixture_descriptor();

        // Re-encrypt an all-zero "private key": decrypts fine, fails the
        // secp256k1 range check.
        let salt = wallet.salt.clone();
        let (derived_key, derived_iv) = stretch(PASSPHRASE, &salt, ITERATIONS);
        let master_key = [0x77u8; 32];
        wallet.encrypted_master_key = encrypt(&derived_key, &derived_iv, &master_key);

        let inner_digest = Sha256::digest(Sha256::digest(&wallet.uncompressed_public_key));
        let mut inner_iv = [0u8; 16];
        inner_iv.copy_from_slice(&inner_digest[..16]);
        wallet.encrypted_private_key = encrypt(&master_key, &inner_iv, &[0u8; 32]);

        assert!(!verify_candidate(&secp, PASSPHRASE, &wallet));
    }

    // ============================================================
    // DESCRIPTOR VALIDATION + SERIALIZATION
    // ============================================================

    #[test]
    fn test_validate_rejects_bad_descriptors() {
        let good = fixture_descriptor();

        let mut zero_iterations = good.clone();
        zero_iterations.derivation_iterations = 0;
        assert!(zero_iterations.validate().is_err());

        let mut unaligned = good.clone();
        unaligned.encrypted_master_key.push(0);
        assert!(unaligned.validate().is_err());

        let mut bad_prefix = good.clone();
        bad_prefix.uncompressed_public_key[0] = 0x02;
        assert!(bad_prefix.validate().is_err());

        let mut short_key = good;
        short_key.uncompressed_public_key.truncate(33);
        assert!(short_key.validate().is_err());
    }

    #[test]
    fn test_descriptor_binary_fields_travel_as_hex() {
        let wallet = fixture_descriptor();
        let json = serde_json::to_value(&wallet).unwrap();

        assert_eq!(
            json["salt"].as_str().unwrap(),
            hex::encode(&wallet.salt)
        );
        assert_eq!(
            json["uncompressed_public_key"].as_str().unwrap(),
            hex::encode(&wallet.uncompressed_public_key)
        );

        let restored: WalletDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(restored, wallet);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        let wallet = fixture_descriptor();
        std::fs::write(&path, serde_json::to_string(&wallet).unwrap()).unwrap();

        let loaded = WalletDescriptor::load(&path).unwrap();
        assert_eq!(loaded, wallet);

        assert!(WalletDescriptor::load(dir.path().join("missing.json")).is_err());
    }
}
