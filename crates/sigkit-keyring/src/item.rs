//! Keyring items and their sealed persisted form.
//!
//! An item is sealed into a self-describing byte string:
//!
//! ```text
//! magic (4 bytes) || nonce (24 bytes) || AEAD ciphertext + tag
//! ```
//!
//! The magic prefix lets a store distinguish items from foreign bytes
//! without a decryption key; the ciphertext is XChaCha20-Poly1305 over the
//! CBOR-encoded fields under the keyring's unlock key, with a fresh random
//! nonce per seal.

use std::fmt;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::auth::SecretKey;
use crate::error::{Error, Result};

/// Fixed prefix identifying sealed keyring items.
pub const ITEM_MAGIC: [u8; 4] = [0x01, b'k', b'r', 0x01];

const NONCE_LEN: usize = 24;

/// Check whether bytes look like a sealed keyring item.
pub fn is_item(b: &[u8]) -> bool {
    b.starts_with(&ITEM_MAGIC)
}

/// A typed secret held by the keyring.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Non-empty identifier.
    pub id: String,
    /// Short tag describing the secret (e.g. "ed25519", "passphrase").
    #[serde(rename = "type")]
    pub typ: String,
    /// The secret bytes.
    pub data: Vec<u8>,
    /// Creation time in Unix ms, when known.
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Last modification time in Unix ms, when known.
    #[serde(default)]
    pub updated_at: Option<i64>,
}

impl Item {
    /// Create an item without timestamps.
    pub fn new(id: impl Into<String>, typ: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            typ: typ.into(),
            data: data.into(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Create an item stamped with a creation time.
    pub fn with_created_at(
        id: impl Into<String>,
        typ: impl Into<String>,
        data: impl Into<Vec<u8>>,
        now: i64,
    ) -> Self {
        Self {
            created_at: Some(now),
            updated_at: Some(now),
            ..Self::new(id, typ, data)
        }
    }

    /// Seal the item under `key` into its persisted form.
    pub fn marshal(&self, key: &SecretKey) -> Result<Vec<u8>> {
        let mut plain = Vec::new();
        ciborium::into_writer(self, &mut plain).map_err(|e| Error::Encoding(e.to_string()))?;

        let cipher = XChaCha20Poly1305::new_from_slice(key.as_bytes())
            .map_err(|_| Error::EncryptFailed)?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), plain.as_slice())
            .map_err(|_| Error::EncryptFailed)?;

        let mut out = Vec::with_capacity(ITEM_MAGIC.len() + NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&ITEM_MAGIC);
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Open a sealed item.
    ///
    /// Fails with `"not an encoded keyring item"` when the magic prefix is
    /// absent, and with a decryption error under the wrong key.
    pub fn decode(b: &[u8], key: &SecretKey) -> Result<Self> {
        if !is_item(b) {
            return Err(Error::NotAnItem);
        }
        let rest = &b[ITEM_MAGIC.len()..];
        if rest.len() < NONCE_LEN {
            return Err(Error::DecryptFailed);
        }
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        let cipher = XChaCha20Poly1305::new_from_slice(key.as_bytes())
            .map_err(|_| Error::DecryptFailed)?;
        let plain = cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| Error::DecryptFailed)?;

        ciborium::from_reader(plain.as_slice()).map_err(|e| Error::Encoding(e.to_string()))
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.id)
            .field("type", &self.typ)
            .field("data_len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open_roundtrip() {
        let key = SecretKey::generate();
        let item = Item::with_created_at("key1", "ed25519", vec![0xab; 32], 1234567890001);

        let sealed = item.marshal(&key).unwrap();
        assert!(is_item(&sealed));

        let opened = Item::decode(&sealed, &key).unwrap();
        assert_eq!(opened, item);
    }

    #[test]
    fn test_nonce_is_fresh_per_seal() {
        let key = SecretKey::generate();
        let item = Item::new("key1", "", b"secret");

        let a = item.marshal(&key).unwrap();
        let b = item.marshal(&key).unwrap();
        assert_ne!(a, b);

        assert_eq!(Item::decode(&a, &key).unwrap(), Item::decode(&b, &key).unwrap());
    }

    #[test]
    fn test_wrong_key_fails() {
        let item = Item::new("key1", "", b"secret");
        let sealed = item.marshal(&SecretKey::generate()).unwrap();

        let err = Item::decode(&sealed, &SecretKey::generate()).unwrap_err();
        assert!(matches!(err, Error::DecryptFailed));
    }

    #[test]
    fn test_foreign_bytes_rejected() {
        let key = SecretKey::generate();
        assert!(!is_item(b"plain bytes"));

        let err = Item::decode(b"plain bytes", &key).unwrap_err();
        assert_eq!(err.to_string(), "not an encoded keyring item");
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = SecretKey::generate();
        let mut sealed = Item::new("key1", "", b"secret").marshal(&key).unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;

        assert!(matches!(Item::decode(&sealed, &key), Err(Error::DecryptFailed)));
    }
}
