//! Keyring: an authenticated encrypted container over a byte store.
//!
//! The unlock key is held in memory between `unlock` and `lock`. The store
//! itself is untrusted: items are sealed before they reach it, and the
//! `#auth` item doubles as the passphrase verifier (the AEAD is the
//! integrity check, so no hash of the key is ever stored).

use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::auth::{Auth, SecretKey};
use crate::error::{Error, Result};
use crate::item::Item;
use crate::store::Store;

/// Prefix of internal ids (`#auth`, `#salt`); rejected by public get/set.
pub const RESERVED_PREFIX: &str = "#";

/// Prefix of ids excluded from default listings.
pub const HIDDEN_PREFIX: &str = ".";

const AUTH_ID: &str = "#auth";
const SALT_ID: &str = "#salt";

const SALT_LEN: usize = 32;

/// Options for [`Keyring::list`].
#[derive(Default)]
pub struct ListOpts {
    /// When non-empty, only items with one of these types are returned.
    pub types: Vec<String>,
}

/// A store-backed, authenticated encrypted keyring for one service.
pub struct Keyring {
    store: Box<dyn Store>,
    service: String,
    key: Option<SecretKey>,
}

impl Keyring {
    /// Create a keyring over `store`, namespaced by `service`.
    ///
    /// The keyring starts locked.
    pub fn new(store: impl Store + 'static, service: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            service: service.into(),
            key: None,
        }
    }

    /// The service namespace.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Get an item. Requires unlock; rejects reserved ids.
    pub fn get(&self, id: &str) -> Result<Option<Item>> {
        if id.starts_with(RESERVED_PREFIX) {
            return Err(Error::ReservedId(id.to_string()));
        }
        let key = self.key.as_ref().ok_or(Error::Locked)?;
        self.get_item(id, key)
    }

    /// Set an item. Requires unlock; rejects empty and reserved ids.
    pub fn set(&self, item: &Item) -> Result<()> {
        if item.id.is_empty() {
            return Err(Error::NoId);
        }
        if item.id.starts_with(RESERVED_PREFIX) {
            return Err(Error::ReservedId(item.id.clone()));
        }
        let key = self.key.as_ref().ok_or(Error::Locked)?;
        self.set_item(item, key)
    }

    /// Delete an item by id. Allowed on any id; no unlock required.
    pub fn delete(&self, id: &str) -> Result<bool> {
        self.store.remove(&self.service, id)
    }

    /// List items, sorted by id ascending. Requires unlock.
    ///
    /// Hidden and reserved ids are excluded. When `opts` carries types, only
    /// items of those types are returned.
    pub fn list(&self, opts: Option<&ListOpts>) -> Result<Vec<Item>> {
        let key = self.key.as_ref().ok_or(Error::Locked)?;
        let types = opts.map(|o| o.types.as_slice()).unwrap_or_default();

        let ids = self.store.ids(&self.service, "", false, false)?;
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(b) = self.store.get(&self.service, &id)? else {
                continue;
            };
            let item = Item::decode(&b, key)?;
            if !types.is_empty() && !types.contains(&item.typ) {
                continue;
            }
            items.push(item);
        }
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }

    /// List item ids with the given prefix. No unlock required.
    ///
    /// Hidden and reserved ids are excluded.
    pub fn ids(&self, prefix: &str) -> Result<Vec<String>> {
        self.store.ids(&self.service, prefix, false, false)
    }

    /// Whether an item with `id` exists. No unlock required.
    pub fn exists(&self, id: &str) -> Result<bool> {
        self.store.exists(&self.service, id)
    }

    /// Unlock with `auth`.
    ///
    /// On first unlock the key is accepted and a self-sealed `#auth`
    /// verifier is persisted; afterwards the sealed verifier must open under
    /// the presented key and match it in constant time, or the unlock fails
    /// with `"invalid auth"`. A failed unlock leaves the previous unlock
    /// state untouched.
    pub fn unlock(&mut self, auth: &dyn Auth) -> Result<()> {
        let key = auth.key();

        match self.get_item(AUTH_ID, &key) {
            Ok(Some(item)) => {
                let matches: bool = item.data.ct_eq(key.as_bytes().as_slice()).into();
                if !matches {
                    return Err(Error::InvalidAuth);
                }
            }
            Ok(None) => {
                let verifier = Item::new(AUTH_ID, "", key.as_bytes().to_vec());
                self.set_item(&verifier, &key)?;
            }
            // The verifier exists but does not open under this key.
            Err(Error::DecryptFailed) => return Err(Error::InvalidAuth),
            Err(e) => return Err(e),
        }

        self.key = Some(key);
        Ok(())
    }

    /// Lock: clear the in-memory key.
    pub fn lock(&mut self) {
        self.key = None;
    }

    /// Whether the keyring is currently unlocked.
    pub fn unlocked(&self) -> bool {
        self.key.is_some()
    }

    /// The persisted KDF salt, generated on first access.
    ///
    /// Stored in `#salt` as plaintext (the salt is non-secret); intended for
    /// passphrase KDFs driven by the caller. No unlock required.
    pub fn salt(&self) -> Result<Vec<u8>> {
        if let Some(salt) = self.store.get(&self.service, SALT_ID)? {
            return Ok(salt);
        }
        let mut salt = vec![0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        self.store.set(&self.service, SALT_ID, &salt, "")?;
        Ok(salt)
    }

    /// Whether the keyring has ever been unlocked. No unlock required.
    pub fn authed(&self) -> Result<bool> {
        self.store.exists(&self.service, AUTH_ID)
    }

    /// Remove every item, reserved and hidden included, then lock.
    pub fn reset(&mut self) -> Result<()> {
        let ids = self.store.ids(&self.service, "", true, true)?;
        for id in ids {
            self.store.remove(&self.service, &id)?;
        }
        self.lock();
        Ok(())
    }

    fn get_item(&self, id: &str, key: &SecretKey) -> Result<Option<Item>> {
        match self.store.get(&self.service, id)? {
            None => Ok(None),
            Some(b) => Item::decode(&b, key).map(Some),
        }
    }

    fn set_item(&self, item: &Item, key: &SecretKey) -> Result<()> {
        let sealed = item.marshal(key)?;
        self.store.set(&self.service, &item.id, &sealed, &item.typ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::KeyAuth;
    use crate::memory::MemoryStore;

    fn test_keyring() -> Keyring {
        Keyring::new(MemoryStore::new(), "sigkit-test")
    }

    #[test]
    fn test_unlock_roundtrip() {
        let mut kr = test_keyring();
        assert!(!kr.authed().unwrap());
        assert!(!kr.unlocked());

        let auth = KeyAuth::new(SecretKey::from_bytes([0x01; 32]));
        kr.unlock(&auth).unwrap();
        assert!(kr.unlocked());
        assert!(kr.authed().unwrap());

        // Same key unlocks again.
        kr.lock();
        kr.unlock(&auth).unwrap();

        // A different key is rejected and the unlock state is preserved.
        let wrong = KeyAuth::new(SecretKey::from_bytes([0x02; 32]));
        let err = kr.unlock(&wrong).unwrap_err();
        assert_eq!(err.to_string(), "invalid auth");
        assert!(kr.unlocked());

        kr.lock();
        let err = kr.unlock(&wrong).unwrap_err();
        assert_eq!(err.to_string(), "invalid auth");
        assert!(!kr.unlocked());
    }

    #[test]
    fn test_get_set_requires_unlock() {
        let mut kr = test_keyring();
        let item = Item::new("x", "secret", b"s");

        assert!(matches!(kr.get("x"), Err(Error::Locked)));
        assert!(matches!(kr.set(&item), Err(Error::Locked)));
        assert!(matches!(kr.list(None), Err(Error::Locked)));

        kr.unlock(&KeyAuth::new(SecretKey::generate())).unwrap();
        kr.set(&item).unwrap();
        assert_eq!(kr.get("x").unwrap().unwrap().data, b"s");
        assert_eq!(kr.get("missing").unwrap(), None);
    }

    #[test]
    fn test_set_get_roundtrip() {
        let mut kr = test_keyring();
        kr.unlock(&KeyAuth::new(SecretKey::generate())).unwrap();

        let secret = vec![0xfe; 64];
        kr.set(&Item::new("x", "secret", secret.clone())).unwrap();
        let got = kr.get("x").unwrap().unwrap();
        assert_eq!(got.data, secret);
        assert_eq!(got.typ, "secret");

        // Overwrite.
        kr.set(&Item::new("x", "secret", b"new")).unwrap();
        assert_eq!(kr.get("x").unwrap().unwrap().data, b"new");
    }

    #[test]
    fn test_reserved_ids_rejected() {
        let mut kr = test_keyring();
        kr.unlock(&KeyAuth::new(SecretKey::generate())).unwrap();

        let err = kr.set(&Item::new("#foo", "", b"x")).unwrap_err();
        assert_eq!(err.to_string(), "keyring id prefix reserved #foo");

        let err = kr.get("#auth").unwrap_err();
        assert_eq!(err.to_string(), "keyring id prefix reserved #auth");

        let err = kr.set(&Item::new("", "", b"x")).unwrap_err();
        assert_eq!(err.to_string(), "no id");
    }

    #[test]
    fn test_list_excludes_reserved_and_hidden() {
        let mut kr = test_keyring();
        kr.unlock(&KeyAuth::new(SecretKey::generate())).unwrap();

        kr.set(&Item::new("b", "secret", b"1")).unwrap();
        kr.set(&Item::new("a", "other", b"2")).unwrap();
        kr.set(&Item::new(".hidden", "secret", b"3")).unwrap();

        let items = kr.list(None).unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let opts = ListOpts { types: vec!["secret".to_string()] };
        let items = kr.list(Some(&opts)).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "b");

        let ids = kr.ids("").unwrap();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(ids.iter().all(|id| !id.starts_with('#') && !id.starts_with('.')));
    }

    #[test]
    fn test_delete_without_unlock() {
        let mut kr = test_keyring();
        kr.unlock(&KeyAuth::new(SecretKey::generate())).unwrap();
        kr.set(&Item::new("x", "", b"s")).unwrap();
        kr.lock();

        assert!(kr.delete("x").unwrap());
        assert!(!kr.delete("x").unwrap());
        assert!(!kr.exists("x").unwrap());
    }

    #[test]
    fn test_salt_persists() {
        let kr = test_keyring();
        let salt = kr.salt().unwrap();
        assert_eq!(salt.len(), 32);
        assert_eq!(kr.salt().unwrap(), salt);
        // The salt is reserved, so it never shows up in listings.
        assert!(kr.ids("").unwrap().is_empty());
    }

    #[test]
    fn test_reset_removes_everything_and_locks() {
        let mut kr = test_keyring();
        kr.unlock(&KeyAuth::new(SecretKey::from_bytes([0x01; 32]))).unwrap();
        kr.set(&Item::new("x", "", b"s")).unwrap();
        kr.salt().unwrap();

        kr.reset().unwrap();
        assert!(!kr.unlocked());
        assert!(!kr.authed().unwrap());
        assert!(!kr.exists("x").unwrap());
        assert!(!kr.exists("#salt").unwrap());

        // A fresh unlock with a brand-new key bootstraps a new verifier.
        kr.unlock(&KeyAuth::new(SecretKey::from_bytes([0x09; 32]))).unwrap();
        assert!(kr.authed().unwrap());
    }
}
