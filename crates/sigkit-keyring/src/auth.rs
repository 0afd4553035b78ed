//! Unlock credentials: the 32-byte secret key and the auth capability.
//!
//! The keyring never derives keys itself; the caller runs its KDF (fed by
//! [`Keyring::salt`](crate::Keyring::salt)) and hands the result over
//! through an [`Auth`].

use std::fmt;

use rand::RngCore;
use zeroize::Zeroize;

/// Length of a keyring secret key in bytes.
pub const SECRET_KEY_LEN: usize = 32;

/// A 32-byte symmetric key protecting keyring items.
///
/// Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; SECRET_KEY_LEN]);

impl SecretKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; SECRET_KEY_LEN];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.0
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(redacted)")
    }
}

/// Capability producing the unlock key.
///
/// Implementations wrap whatever the caller has: a raw key, a
/// passphrase-KDF output, hardware-held material.
pub trait Auth {
    /// The 32-byte unlock key.
    fn key(&self) -> SecretKey;
}

/// The trivial auth: a key the caller already holds.
pub struct KeyAuth {
    key: SecretKey,
}

impl KeyAuth {
    /// Wrap an existing key.
    pub fn new(key: SecretKey) -> Self {
        Self { key }
    }
}

impl Auth for KeyAuth {
    fn key(&self) -> SecretKey {
        self.key.clone()
    }
}
