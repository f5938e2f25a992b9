//! Field-level encryption for journal text and chat messages
//!
//! Sensitive columns are stored as `enc:v1:` followed by base64 of
//! `[12-byte nonce][ciphertext + tag]`, sealed with AES-256-GCM. The key is
//! derived from `ENCRYPTION_KEY` with Argon2id and a fixed application salt,
//! so the same passphrase always opens the same rows.
//!
//! Rows written before encryption was enabled are plain text; `decrypt`
//! passes them through unchanged.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};

/// Marker that identifies an encrypted field
pub const ENCRYPTED_PREFIX: &str = "enc:v1:";

const KEY_LENGTH: usize = 32;
const NONCE_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;

/// Changing this invalidates every encrypted field
const FIELD_SALT: &[u8; 16] = b"haven-field-v1-s";

/// AES-256-GCM cipher for individual text fields
#[derive(Clone)]
pub struct FieldCipher {
    key: [u8; KEY_LENGTH],
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCipher").finish_non_exhaustive()
    }
}

impl FieldCipher {
    /// Derive the field key from a passphrase
    pub fn from_passphrase(passphrase: &str) -> Result<Self> {
        let mut key = [0u8; KEY_LENGTH];
        argon2::Argon2::default()
            .hash_password_into(passphrase.as_bytes(), FIELD_SALT, &mut key)
            .map_err(|e| Error::Encryption(format!("Failed to derive field key: {}", e)))?;
        Ok(Self { key })
    }

    /// Encrypt a field. Empty and already-encrypted values are returned as-is.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        if plaintext.is_empty() || is_encrypted(plaintext) {
            return Ok(plaintext.to_string());
        }

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| Error::Encryption("Field encryption failed".to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        Ok(format!("{}{}", ENCRYPTED_PREFIX, BASE64.encode(sealed)))
    }

    /// Decrypt a field.
    ///
    /// Values without the prefix are returned unchanged. Values that fail to
    /// decrypt (wrong key, corruption) are also returned unchanged so a bad row
    /// never takes down a listing.
    pub fn decrypt(&self, stored: &str) -> String {
        if !is_encrypted(stored) {
            return stored.to_string();
        }
        match self.try_decrypt(stored) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                debug!(error = %e, "Field decryption failed, returning stored value");
                stored.to_string()
            }
        }
    }

    /// Decrypt a field, reporting failures
    pub fn try_decrypt(&self, stored: &str) -> Result<String> {
        let encoded = stored
            .strip_prefix(ENCRYPTED_PREFIX)
            .ok_or_else(|| Error::Encryption("Value is not encrypted".to_string()))?;

        let sealed = BASE64
            .decode(encoded)
            .map_err(|e| Error::Encryption(format!("Invalid encoding: {}", e)))?;

        if sealed.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(Error::Encryption("Ciphertext too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LENGTH);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| Error::Encryption("Field decryption failed".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|e| Error::Encryption(format!("Decrypted value is not UTF-8: {}", e)))
    }

    pub fn encrypt_opt(&self, value: Option<&str>) -> Result<Option<String>> {
        value.map(|v| self.encrypt(v)).transpose()
    }

    pub fn decrypt_opt(&self, value: Option<String>) -> Option<String> {
        value.map(|v| self.decrypt(&v))
    }
}

/// Whether a stored value carries the encryption prefix
pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(ENCRYPTED_PREFIX)
}

/// SHA-256 hex digest, used to fingerprint text in the audit log without storing it
pub fn hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}
