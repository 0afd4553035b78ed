//! # sigkit-keyring
//!
//! An authenticated, encrypted-at-rest container for secret material.
//!
//! A [`Keyring`] wraps an untrusted byte-level [`Store`] with a service
//! namespace and an AEAD seal keyed by a passphrase-derived [`SecretKey`].
//! Items are opaque to the store; the unlock key lives only in memory
//! between [`Keyring::unlock`] and [`Keyring::lock`].
//!
//! ## Namespaces
//!
//! Two id prefixes carry meaning:
//! - `#` (reserved): internal items (`#auth`, `#salt`); rejected by public
//!   `get`/`set` and excluded from listings
//! - `.` (hidden): excluded from default listings
//!
//! ## Example
//!
//! ```
//! use sigkit_keyring::{Item, KeyAuth, Keyring, MemoryStore, SecretKey};
//!
//! let mut kr = Keyring::new(MemoryStore::new(), "app");
//! let auth = KeyAuth::new(SecretKey::generate());
//!
//! kr.unlock(&auth).unwrap();
//! kr.set(&Item::new("key1", "secret", b"s3cret")).unwrap();
//! assert_eq!(kr.get("key1").unwrap().unwrap().data, b"s3cret");
//! kr.lock();
//! ```

mod auth;
mod error;
mod item;
mod keyring;
mod memory;
mod store;

pub use auth::{Auth, KeyAuth, SecretKey, SECRET_KEY_LEN};
pub use error::{Error, Result};
pub use item::{is_item, Item, ITEM_MAGIC};
pub use keyring::{Keyring, ListOpts, HIDDEN_PREFIX, RESERVED_PREFIX};
pub use memory::MemoryStore;
pub use store::Store;
