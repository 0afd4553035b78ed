//! Cryptographic primitives for the sigchain.
//!
//! Wraps Ed25519 signing and SHA-256 hashing with strong types, and defines
//! the KID: the bech32 textual identifier of a signing public key.

use std::fmt;
use std::str::FromStr;

use bech32::{FromBase32, ToBase32, Variant};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Human-readable bech32 prefix for Ed25519 signing keys.
pub const KID_HRP: &str = "kse";

/// A 32-byte SHA-256 hash of a statement's canonical bytes.
///
/// Used as the `prev` link between consecutive statements.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SigchainHash(pub [u8; 32]);

impl SigchainHash {
    /// Compute the SHA-256 hash of the given data.
    pub fn hash(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        Self(digest.into())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for SigchainHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigchainHash({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for SigchainHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 32-byte Ed25519 public key: the owner identity of a sigchain.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The KID for this key.
    pub fn kid(&self) -> Kid {
        Kid::from_public_key(self)
    }

    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<()> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| Error::InvalidPublicKey)?;

        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);

        verifying_key
            .verify(message, &sig)
            .map_err(|_| Error::InvalidSignature)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &hex::encode(self.0)[..16])
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &hex::encode(self.0)[..16])
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Canonical textual identifier for a signing public key.
///
/// Bech32 (classic variant) over the 32-byte public key with HRP `kse`, e.g.
/// `kse132yw8ht5p8cetl2jmvknewjawt9xwzdlrk2pyxlnwjyqrdq0dawquwc7vw`.
/// The encoding is canonical: decode then encode is the identity, and equal
/// KIDs imply equal public keys.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Kid(String);

impl Kid {
    /// Encode a public key as a KID.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let encoded = bech32::encode(KID_HRP, public_key.0.to_base32(), Variant::Bech32)
            .expect("bech32 encode with fixed hrp");
        Self(encoded)
    }

    /// Recover the public key this KID encodes.
    pub fn public_key(&self) -> Result<PublicKey> {
        let (hrp, data, variant) =
            bech32::decode(&self.0).map_err(|e| Error::InvalidKid(e.to_string()))?;
        if hrp != KID_HRP {
            return Err(Error::InvalidKid(format!("unexpected prefix {}", hrp)));
        }
        if variant != Variant::Bech32 {
            return Err(Error::InvalidKid("unexpected bech32 variant".into()));
        }
        let bytes =
            Vec::<u8>::from_base32(&data).map_err(|e| Error::InvalidKid(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::InvalidKid("invalid key length".into()))?;
        Ok(PublicKey(arr))
    }

    /// The textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Kid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Kid({})", self.0)
    }
}

impl fmt::Display for Kid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Kid {
    type Err = Error;

    /// Parse and canonicalize a KID string.
    fn from_str(s: &str) -> Result<Self> {
        let kid = Kid(s.to_string());
        // Decoding validates; re-encoding canonicalizes case and charset.
        let public_key = kid.public_key()?;
        Ok(Kid::from_public_key(&public_key))
    }
}

/// A signing key pair for sigchain statements.
///
/// This wraps ed25519-dalek's SigningKey.
#[derive(Clone)]
pub struct SignKey {
    signing_key: SigningKey,
}

impl SignKey {
    /// Generate a new random signing key.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// The KID of the public key.
    pub fn kid(&self) -> Kid {
        self.public_key().kid()
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sig = self.signing_key.sign(message);
        Signature(sig.to_bytes())
    }

    /// Get the raw seed bytes (secret key material).
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for SignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignKey({:?})", self.public_key())
    }
}
