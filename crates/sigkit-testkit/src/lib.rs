//! # sigkit-testkit
//!
//! Testing utilities for the sigkit crates.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a deterministic millisecond clock and preassembled
//!   signer/chain/keyring setups
//! - **Golden vectors**: known statements with expected canonical bytes for
//!   cross-implementation verification
//! - **Generators**: proptest strategies for property-based testing
//!
//! ## Fixtures
//!
//! ```
//! use sigkit_testkit::fixtures::ChainFixture;
//!
//! let mut fx = ChainFixture::with_seed([0x01; 32]);
//! fx.append(b"hello", "note").unwrap();
//! assert_eq!(fx.chain.last_seq(), 1);
//! ```
//!
//! ## Golden Vectors
//!
//! ```
//! use sigkit_testkit::vectors::{golden_statements, GOLDEN_KID};
//!
//! for vector in golden_statements() {
//!     assert!(vector.bytes.contains(GOLDEN_KID));
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{ChainFixture, KeyringFixture, MonotonicClock};
pub use vectors::{golden_statements, GoldenStatement, GOLDEN_KID, GOLDEN_SEED};
