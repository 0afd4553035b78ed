//! Store trait: the byte-level interface the keyring drives.
//!
//! Implementations can be OS keychains, filesystem vaults, or in-memory
//! mocks. The keyring doesn't care: values are opaque (sealed) bytes
//! namespaced by `(service, id)`.

use crate::error::Result;

/// Byte-level storage operations, namespaced by service.
///
/// Semantics: `get` on a missing key returns `None` (not an error); `set`
/// overwrites; `remove` reports whether something was removed; `ids` is
/// sorted ascending and filters the `#` and `.` prefixes unless asked
/// otherwise.
pub trait Store {
    /// Get the bytes at `(service, id)`.
    fn get(&self, service: &str, id: &str) -> Result<Option<Vec<u8>>>;

    /// Set the bytes at `(service, id)`, overwriting any previous value.
    ///
    /// `typ` is advisory metadata a backend may surface (e.g. in an OS
    /// keychain UI); it is not part of the sealed value.
    fn set(&self, service: &str, id: &str, data: &[u8], typ: &str) -> Result<()>;

    /// Remove `(service, id)`. Returns whether something was removed.
    fn remove(&self, service: &str, id: &str) -> Result<bool>;

    /// List ids under `service` with the given prefix, sorted ascending.
    ///
    /// Hidden (`.`) and reserved (`#`) ids are excluded unless the
    /// corresponding flag is set.
    fn ids(
        &self,
        service: &str,
        prefix: &str,
        show_hidden: bool,
        show_reserved: bool,
    ) -> Result<Vec<String>>;

    /// Whether `(service, id)` exists.
    fn exists(&self, service: &str, id: &str) -> Result<bool>;
}
