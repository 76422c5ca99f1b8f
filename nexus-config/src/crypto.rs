//! Cryptographic operations for authorization encryption and decryption
//!
//! A stored authorization is `base64(nonce || ciphertext)`: the 12-byte
//! AES-256-GCM nonce followed by the ciphertext and its tag. The key comes
//! from the passphrase and the record's `salt` through PBKDF2-HMAC-SHA256.

use aes_gcm::{
    aead::{rand_core::RngCore, Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use nexus_core::{NexusError, Result};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

/// Number of PBKDF2 iterations for key derivation
const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes
pub const SALT_LENGTH: usize = 32;

/// AES-GCM nonce length in bytes
const NONCE_LENGTH: usize = 12;

/// Encryption key derived from the user's passphrase and the record's salt
#[derive(Clone)]
pub struct EncryptionKey {
    cipher: Aes256Gcm,
}

impl EncryptionKey {
    /// Derive encryption key from passphrase and salt
    pub fn derive_from_password(password: &str, salt: &[u8]) -> Result<Self> {
        if salt.len() != SALT_LENGTH {
            return Err(NexusError::Config(format!(
                "Salt must be {} bytes long",
                SALT_LENGTH
            )));
        }

        let mut key = [0u8; 32]; // 256 bits for AES-256
        pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| NexusError::Config(format!("Failed to create cipher: {}", e)))?;

        Ok(Self { cipher })
    }

    /// Encrypt `plaintext` with a fresh nonce into the stored blob format
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| NexusError::Config(format!("Encryption failed: {}", e)))?;

        // nonce || ciphertext
        let mut combined = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        combined.extend_from_slice(&nonce);
        combined.extend_from_slice(&ciphertext);

        Ok(STANDARD.encode(combined))
    }

    /// Decrypt a ciphertext value
    ///
    /// A wrong passphrase and a damaged value both yield
    /// [`NexusError::Decryption`].
    pub fn decrypt(&self, encrypted: &str) -> Result<String> {
        let combined = STANDARD
            .decode(encrypted)
            .map_err(|e| NexusError::Decryption(format!("invalid base64: {}", e)))?;

        if combined.len() < NONCE_LENGTH {
            return Err(NexusError::Decryption("encrypted data too short".into()));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LENGTH);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| NexusError::Decryption("wrong passphrase or corrupt data".into()))?;

        String::from_utf8(plaintext)
            .map_err(|_| NexusError::Decryption("decrypted data is not valid UTF-8".into()))
    }
}

/// Generate a cryptographically secure random salt
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encryption_roundtrip() {
        let salt = generate_salt();
        let key = EncryptionKey::derive_from_password("behappy", &salt).unwrap();

        let plaintext = "Basic YWxpY2U6czNjcmV0";
        let encrypted = key.encrypt(plaintext).unwrap();
        assert_ne!(encrypted, plaintext);
        assert_eq!(key.decrypt(&encrypted).unwrap(), plaintext);
    }

    #[test]
    fn test_stored_blob_is_nonce_then_ciphertext() {
        let key = EncryptionKey::derive_from_password("behappy", &generate_salt()).unwrap();
        let plaintext = "Basic YWxpY2U6czNjcmV0";

        let first = STANDARD.decode(key.encrypt(plaintext).unwrap()).unwrap();
        let second = STANDARD.decode(key.encrypt(plaintext).unwrap()).unwrap();

        // 16-byte GCM tag after the ciphertext
        assert_eq!(first.len(), NONCE_LENGTH + plaintext.len() + 16);
        assert_ne!(first[..NONCE_LENGTH], second[..NONCE_LENGTH]);
    }

    #[test]
    fn test_different_keys_fail_decryption() {
        let salt = generate_salt();
        let key1 = EncryptionKey::derive_from_password("password1", &salt).unwrap();
        let key2 = EncryptionKey::derive_from_password("password2", &salt).unwrap();

        let encrypted = key1.encrypt("secret").unwrap();

        assert!(matches!(
            key2.decrypt(&encrypted),
            Err(NexusError::Decryption(_))
        ));
    }

    #[test]
    fn test_corrupt_ciphertext_is_a_decryption_error() {
        let key = EncryptionKey::derive_from_password("pw", &generate_salt()).unwrap();
        assert!(matches!(
            key.decrypt("not base64!"),
            Err(NexusError::Decryption(_))
        ));
        assert!(matches!(
            key.decrypt(&STANDARD.encode([1u8, 2, 3])),
            Err(NexusError::Decryption(_))
        ));
    }

    #[test]
    fn test_rejects_short_salt() {
        assert!(EncryptionKey::derive_from_password("pw", &[0u8; 8]).is_err());
    }

    #[test]
    fn test_salt_generation() {
        let salt1 = generate_salt();
        let salt2 = generate_salt();

        assert_ne!(salt1, salt2);
        assert_eq!(salt1.len(), SALT_LENGTH);
    }
}
