//! # sigkit-core
//!
//! Append-only, signer-linked sigchain.
//!
//! A sigchain is an ordered sequence of signed statements owned by a single
//! Ed25519 key. Each statement carries the SHA-256 of its predecessor's
//! canonical bytes, so the chain is tamper-evident: replayed, reordered, or
//! mutated entries fail verification on [`Sigchain::add`].
//!
//! ## Core Types
//!
//! - [`Statement`] - one slot in a sigchain: data or a revocation pointer,
//!   plus a detached signature
//! - [`Sigchain`] - the ordered chain for one signing key, with typed queries
//! - [`SignKey`] / [`PublicKey`] / [`Kid`] - the signing identity and its
//!   bech32 `kse…` identifier
//! - [`User`] - a statement payload binding the chain to a third-party
//!   profile
//!
//! ## Core Invariants
//!
//! 1. **Link integrity**: `st.prev == sha256(canonical_bytes(predecessor))`
//! 2. **Signature integrity**: every statement verifies under the chain key
//! 3. **Append-only**: no operation removes or mutates an accepted statement
//! 4. **Revocation is a statement**: replaying the chain reproduces the
//!    revoked set
//!
//! ## Example
//!
//! ```
//! use sigkit_core::{Sigchain, SignKey, Statement};
//!
//! let alice = SignKey::generate();
//! let mut sc = Sigchain::new(alice.public_key());
//!
//! let st = Statement::generate(&sc, b"hello", &alice, "note", 1234567890001).unwrap();
//! sc.add(st).unwrap();
//!
//! assert_eq!(sc.last_seq(), 1);
//! assert_eq!(sc.find_last("note").unwrap().data, b"hello");
//! ```

mod canonical;
mod crypto;
mod error;
mod sigchain;
mod statement;
mod user;

pub use canonical::ObjectWriter;
pub use crypto::{Kid, PublicKey, SigchainHash, Signature, SignKey, KID_HRP};
pub use error::{Error, Result};
pub use sigchain::Sigchain;
pub use statement::{Statement, REVOKE_STATEMENT_TYPE};
pub use user::{generate_user_statement, User, USER_STATEMENT_TYPE};
