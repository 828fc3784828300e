//! Worker Tests
//!
//! The runtime tests plant a real match by building a descriptor with the
//! same encryption the coordinator's wallet fixture uses, then check the
//! fan-out finds it (and scans everything when there is nothing to find).

#[cfg(test)]
mod tests {
    use crate::client::normalize_base_url;
    use crate::execution_units;
    use crate::runtime::run_batch;

    use aes::cipher::block_padding::NoPadding;
    use aes::cipher::{BlockEncryptMut, KeyIvInit};
    use distributed_cracker::api::protocol::WorkRequest;
    use distributed_cracker::wallet::WalletDescriptor;
    use secp256k1::{PublicKey, Secp256k1, SecretKey};
    use sha2::{Digest, Sha256, Sha512};

    type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

    /// Builds a descriptor whose correct passphrase is `passphrase`.
    fn descriptor_for(passphrase: &str) -> WalletDescriptor {
        let secp = Secp256k1::new();
        let salt = b"unit-salt".to_vec();
        let iterations = 5u32;

        let secret_bytes = [0x2Au8; 32];
        let secret = SecretKey::from_slice(&secret_bytes).unwrap();
        let public = PublicKey::from_secret_key(&secp, &secret)
            .serialize_uncompressed()
            .to_vec();

        let mut seed = passphrase.as_bytes().to_vec();
        seed.extend_from_slice(&salt);
        let mut digest = Sha512::digest(&seed);
        for _ in 1..iterations {
            digest = Sha512::digest(digest);
        }
        let mut derived_key = [0u8; 32];
        let mut derived_iv = [0u8; 16];
        derived_key.copy_from_slice(&digest[..32]);
        derived_iv.copy_from_slice(&digest[32..48]);

        let master_key = [0x55u8; 32];
        let encrypted_master_key = Aes256CbcEnc::new_from_slices(&derived_key, &derived_iv)
            .unwrap()
            .encrypt_padded_vec_mut::<NoPadding>(&master_key);

        let inner_digest = Sha256::digest(Sha256::digest(&public));
        let mut inner_iv = [0u8; 16];
        inner_iv.copy_from_slice(&inner_digest[..16]);
        let encrypted_private_key = Aes256CbcEnc::new_from_slices(&master_key, &inner_iv)
            .unwrap()
            .encrypt_padded_vec_mut::<NoPadding>(&secret_bytes);

        WalletDescriptor {
            salt,
            derivation_iterations: iterations,
            encrypted_master_key,
            encrypted_private_key,
            uncompressed_public_key: public,
        }
    }

    // ============================================================
    // BATCH EXECUTION
    // ============================================================

    #[test]
    fn test_run_batch_finds_the_planted_match() {
        let wallet = descriptor_for("target");
        let passwords: Vec<String> = (0..50)
            .map(|i| format!("wrong-{}", i))
            .chain(std::iter::once("target".to_string()))
            .chain((50..80).map(|i| format!("wrong-{}", i)))
            .collect();

        for units in [1, 3, 8] {
            assert_eq!(
                run_batch(&passwords, &wallet, units),
                Some("target".to_string())
            );
        }
    }

    #[test]
    fn test_run_batch_without_match_scans_everything() {
        let wallet = descriptor_for("not-in-the-batch");
        let passwords: Vec<String> = (0..40).map(|i| format!("wrong-{}", i)).collect();

        assert_eq!(run_batch(&passwords, &wallet, 4), None);
    }

    #[test]
    fn test_run_batch_handles_degenerate_inputs() {
        let wallet = descriptor_for("target");

        assert_eq!(run_batch(&[], &wallet, 4), None);

        // More units than candidates collapses to one unit per candidate.
        let single = vec!["target".to_string()];
        assert_eq!(run_batch(&single, &wallet, 16), Some("target".to_string()));
    }

    // ============================================================
    // PARALLELISM + CONFIG
    // ============================================================

    #[test]
    fn test_execution_units_scaling() {
        assert_eq!(execution_units(8, 1.0, 16), 8);
        assert_eq!(execution_units(8, 0.5, 16), 4);
        assert_eq!(execution_units(8, 1.0, 4), 4);
        // Degenerate ratios fall back to everything.
        assert_eq!(execution_units(8, 0.0, 16), 8);
        assert_eq!(execution_units(8, f64::NAN, 16), 8);
        // Never below one unit.
        assert_eq!(execution_units(1, 0.1, 16), 1);
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://10.0.0.5:3000/"),
            "http://10.0.0.5:3000"
        );
        assert_eq!(normalize_base_url("10.0.0.5:3000"), "http://10.0.0.5:3000");
        assert_eq!(
            normalize_base_url("https://crack.example.com"),
            "https://crack.example.com"
        );
    }

    // ============================================================
    // WIRE FORMAT
    // ============================================================

    #[test]
    fn test_work_request_uses_camel_case_fields() {
        let request = WorkRequest {
            cpu_count: 8,
            client_id: "worker-1".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["cpuCount"], 8);
        assert_eq!(json["clientId"], "worker-1");
    }
}
