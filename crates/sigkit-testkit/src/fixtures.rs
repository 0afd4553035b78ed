//! Test fixtures and helpers.
//!
//! Common setup code for sigchain and keyring tests.

use sigkit_core::{Result, Sigchain, SignKey, Statement};
use sigkit_keyring::{KeyAuth, Keyring, MemoryStore, SecretKey};

/// Deterministic millisecond clock.
///
/// Starts so that the first tick returns 1234567890001 and each subsequent
/// tick adds one, matching the golden vectors.
pub struct MonotonicClock {
    now: i64,
}

impl MonotonicClock {
    /// Create a clock positioned before the first golden tick.
    pub fn new() -> Self {
        Self { now: 1234567890000 }
    }

    /// Advance and return the current time.
    pub fn now(&mut self) -> i64 {
        self.now += 1;
        self.now
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

/// A signer, its sigchain, and a deterministic clock.
pub struct ChainFixture {
    pub signer: SignKey,
    pub chain: Sigchain,
    pub clock: MonotonicClock,
}

impl ChainFixture {
    /// Create a fixture with a random signer.
    pub fn new() -> Self {
        Self::with_signer(SignKey::generate())
    }

    /// Create a fixture with a deterministic signer from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::with_signer(SignKey::from_seed(&seed))
    }

    fn with_signer(signer: SignKey) -> Self {
        Self {
            chain: Sigchain::new(signer.public_key()),
            signer,
            clock: MonotonicClock::new(),
        }
    }

    /// Generate and append one statement at the next clock tick.
    pub fn append(&mut self, data: &[u8], typ: &str) -> Result<Statement> {
        let st = Statement::generate(&self.chain, data, &self.signer, typ, self.clock.now())?;
        self.chain.add(st.clone())?;
        Ok(st)
    }

    /// Revoke the statement at `seq`.
    pub fn revoke(&mut self, seq: u64) -> Result<Statement> {
        self.chain.revoke(seq, &self.signer)
    }
}

impl Default for ChainFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A fresh in-memory keyring plus the auth that unlocks it.
pub struct KeyringFixture {
    pub keyring: Keyring,
    pub auth: KeyAuth,
}

impl KeyringFixture {
    /// Create a locked keyring over a fresh in-memory store.
    pub fn new(service: &str) -> Self {
        Self {
            keyring: Keyring::new(MemoryStore::new(), service),
            auth: KeyAuth::new(SecretKey::generate()),
        }
    }

    /// Create with a deterministic unlock key.
    pub fn with_key(service: &str, key: [u8; 32]) -> Self {
        Self {
            keyring: Keyring::new(MemoryStore::new(), service),
            auth: KeyAuth::new(SecretKey::from_bytes(key)),
        }
    }

    /// Unlock with the fixture's own auth.
    pub fn unlock(&mut self) -> sigkit_keyring::Result<()> {
        self.keyring.unlock(&self.auth)
    }
}
