//! User binding: ties a sigchain identity to a third-party profile.
//!
//! A binding names a service, a normalized handle, and a proof URL, and is
//! carried as the data of a `type == "user"` statement. The binding commits
//! to the chain position it will occupy: `user.seq` must equal the seq of
//! the statement that carries it, so a binding copied into a different slot
//! is detectably wrong.

use url::Url;

use crate::canonical::{self, ObjectWriter};
use crate::crypto::{Kid, SignKey};
use crate::error::{Error, Result};
use crate::sigchain::Sigchain;
use crate::statement::Statement;

/// Statement type tag for user bindings.
pub const USER_STATEMENT_TYPE: &str = "user";

/// The accepted services.
const SERVICES: [&str; 2] = ["github", "twitter"];

/// A binding between a sigchain identity and an external profile.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct User {
    /// The chain owner's KID.
    pub kid: Kid,
    /// Normalized (lowercase) handle on the service.
    pub name: String,
    /// The sigchain seq at which this binding will live.
    pub seq: u64,
    /// One of the accepted services.
    pub service: String,
    /// Proof URL on the service, under the claimed handle.
    pub url: String,
}

impl User {
    /// Construct and validate a candidate binding.
    ///
    /// The handle is normalized to lowercase, checked against the service's
    /// name syntax, and the proof URL must match the service's URL schema.
    pub fn new(kid: Kid, service: &str, name: &str, url: &str, seq: u64) -> Result<Self> {
        if !SERVICES.contains(&service) {
            return Err(Error::InvalidUserService(service.to_string()));
        }
        if seq == 0 {
            return Err(Error::InvalidUserSeq);
        }

        let name = name.to_lowercase();
        validate_name(service, &name)?;
        validate_url(service, &name, url)?;

        Ok(Self {
            kid,
            name,
            seq,
            service: service.to_string(),
            url: url.to_string(),
        })
    }

    /// The canonical encoding carried as statement data.
    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ObjectWriter::new();
        w.string("kid", self.kid.as_str());
        w.string("name", &self.name);
        w.uint("seq", self.seq);
        w.string("service", &self.service);
        w.string("url", &self.url);
        w.finish()
    }

    /// Decode a binding from statement data.
    pub fn from_bytes(b: &[u8]) -> Result<Self> {
        let map = canonical::parse_object(b)?;

        let kid_str = canonical::str_field(&map, "kid")?
            .ok_or_else(|| Error::Encoding("missing kid".into()))?;
        let name = canonical::str_field(&map, "name")?
            .ok_or_else(|| Error::Encoding("missing name".into()))?;
        let seq = canonical::uint_field(&map, "seq")?
            .ok_or_else(|| Error::Encoding("missing seq".into()))?;
        let service = canonical::str_field(&map, "service")?
            .ok_or_else(|| Error::Encoding("missing service".into()))?;
        let url = canonical::str_field(&map, "url")?
            .ok_or_else(|| Error::Encoding("missing url".into()))?;

        Ok(Self {
            kid: kid_str.parse()?,
            name,
            seq,
            service,
            url,
        })
    }
}

/// Emit a signed `type == "user"` statement carrying `user`.
///
/// Fails with `"user seq mismatch"` when the binding does not commit to the
/// position it would occupy (`chain.last_seq() + 1`).
pub fn generate_user_statement(
    chain: &Sigchain,
    user: &User,
    signer: &SignKey,
    ts: i64,
) -> Result<Statement> {
    if user.seq != chain.last_seq() + 1 {
        return Err(Error::UserSeqMismatch);
    }
    Statement::generate(chain, &user.bytes(), signer, USER_STATEMENT_TYPE, ts)
}

/// Per-service handle syntax. Handles arrive already lowercased.
fn validate_name(service: &str, name: &str) -> Result<()> {
    let ok = match service {
        "github" => {
            (1..=39).contains(&name.len())
                && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
                && !name.starts_with('-')
                && !name.ends_with('-')
        }
        "twitter" => {
            (1..=15).contains(&name.len())
                && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidUserName(name.to_string()))
    }
}

/// Per-service proof URL schema, under the claimed handle.
fn validate_url(service: &str, name: &str, url: &str) -> Result<()> {
    let invalid = || Error::InvalidUserUrl(url.to_string());

    let parsed = Url::parse(url).map_err(|_| invalid())?;
    if parsed.scheme() != "https" {
        return Err(invalid());
    }
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.collect())
        .unwrap_or_default();

    let ok = match service {
        // https://gist.github.com/<name>/<gist id>
        "github" => {
            parsed.host_str() == Some("gist.github.com")
                && segments.len() == 2
                && segments[0].to_lowercase() == name
                && !segments[1].is_empty()
        }
        // https://twitter.com/<name>/status/<tweet id>
        "twitter" => {
            parsed.host_str() == Some("twitter.com")
                && segments.len() == 3
                && segments[0].to_lowercase() == name
                && segments[1] == "status"
                && !segments[2].is_empty()
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(invalid())
    }
}
