//! Statement: the atomic unit added to a sigchain.
//!
//! A statement carries opaque data or a revocation pointer, a sequence
//! number, the hash link to its predecessor, and a detached Ed25519
//! signature over its canonical bytes with the `.sig` field omitted.

use std::fmt;

use crate::canonical::{self, ObjectWriter};
use crate::crypto::{Kid, SigchainHash, Signature, SignKey};
use crate::error::{Error, Result};
use crate::sigchain::Sigchain;

/// Reserved statement type marking a revocation.
pub const REVOKE_STATEMENT_TYPE: &str = "revoke";

/// One slot in a sigchain.
///
/// Fields mirror the wire format: absent fields are the empty value
/// (`data`, `typ`) or `None` (`prev`, `revoke`, `ts`).
#[derive(Clone, PartialEq, Eq)]
pub struct Statement {
    /// Opaque payload; empty iff this is a revocation.
    pub data: Vec<u8>,
    /// The signer's KID; identical for every statement in a chain.
    pub kid: Kid,
    /// SHA-256 of the previous statement's canonical bytes; absent at seq 1.
    pub prev: Option<SigchainHash>,
    /// Seq of the statement this one revokes; present iff `typ == "revoke"`.
    pub revoke: Option<u64>,
    /// 1-based position in the chain.
    pub seq: u64,
    /// Ed25519 signature over the canonical bytes without `.sig`.
    pub sig: Signature,
    /// Millisecond timestamp; absent for revocations.
    pub ts: Option<i64>,
    /// Short ASCII tag; empty means untyped.
    pub typ: String,
}

impl Statement {
    /// Create and sign a statement extending `chain`.
    ///
    /// Fails with `"no data"` when both `data` and `typ` are empty, and with
    /// `"invalid sigchain sign public key"` when the signer does not own the
    /// chain.
    pub fn generate(
        chain: &Sigchain,
        data: &[u8],
        signer: &SignKey,
        typ: &str,
        ts: i64,
    ) -> Result<Self> {
        if signer.kid() != *chain.kid() {
            return Err(Error::InvalidSignPublicKey);
        }
        if data.is_empty() && typ.is_empty() {
            return Err(Error::NoData);
        }

        let mut st = Self {
            data: data.to_vec(),
            kid: chain.kid().clone(),
            prev: chain.last().map(|last| SigchainHash::hash(&last.bytes())),
            revoke: None,
            seq: chain.last_seq() + 1,
            sig: Signature::from_bytes([0u8; 64]),
            ts: Some(ts),
            typ: typ.to_string(),
        };
        st.sig = signer.sign(&st.sign_bytes());
        Ok(st)
    }

    /// Create and sign a revocation of `revoke_seq` extending `chain`.
    ///
    /// The target is validated against the chain: it must exist, must not be
    /// a revocation itself, and must not already be revoked.
    pub fn generate_revoke(chain: &Sigchain, revoke_seq: u64, signer: &SignKey) -> Result<Self> {
        if signer.kid() != *chain.kid() {
            return Err(Error::InvalidSignPublicKey);
        }
        chain.check_revoke(revoke_seq)?;

        let mut st = Self {
            data: Vec::new(),
            kid: chain.kid().clone(),
            prev: chain.last().map(|last| SigchainHash::hash(&last.bytes())),
            revoke: Some(revoke_seq),
            seq: chain.last_seq() + 1,
            sig: Signature::from_bytes([0u8; 64]),
            ts: None,
            typ: REVOKE_STATEMENT_TYPE.to_string(),
        };
        st.sig = signer.sign(&st.sign_bytes());
        Ok(st)
    }

    /// Whether this statement is a revocation.
    pub fn is_revocation(&self) -> bool {
        self.typ == REVOKE_STATEMENT_TYPE
    }

    /// The canonical persisted form, `.sig` included.
    pub fn bytes(&self) -> Vec<u8> {
        self.to_writer(true).finish()
    }

    /// The signed payload: the canonical form with `.sig` omitted.
    pub fn sign_bytes(&self) -> Vec<u8> {
        self.to_writer(false).finish()
    }

    /// The human-readable pretty form used by sigchain dumps.
    pub fn pretty(&self) -> String {
        self.to_writer(true).finish_pretty()
    }

    /// Verify the signature against the statement's own KID.
    pub fn verify(&self) -> Result<()> {
        let public_key = self.kid.public_key()?;
        public_key.verify(&self.sign_bytes(), &self.sig)
    }

    /// Decode a single statement from its persisted form.
    ///
    /// Lenient on unknown fields; strict on field types and required fields.
    /// The signature is checked by [`Sigchain::add`], not here.
    pub fn from_bytes(b: &[u8]) -> Result<Self> {
        let map = canonical::parse_object(b)?;

        let sig_bytes = canonical::bytes_field(&map, ".sig")?
            .ok_or_else(|| Error::Encoding("missing .sig".into()))?;
        let sig_arr: [u8; 64] = sig_bytes
            .try_into()
            .map_err(|_| Error::Encoding("invalid .sig length".into()))?;

        let kid_str = canonical::str_field(&map, "kid")?
            .ok_or_else(|| Error::Encoding("missing kid".into()))?;
        let kid: Kid = kid_str.parse()?;

        let seq = canonical::uint_field(&map, "seq")?
            .ok_or_else(|| Error::Encoding("missing seq".into()))?;
        if seq == 0 {
            return Err(Error::Encoding("seq must be positive".into()));
        }

        let prev = match canonical::bytes_field(&map, "prev")? {
            None => None,
            Some(bytes) => {
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| Error::Encoding("invalid prev length".into()))?;
                Some(SigchainHash::from_bytes(arr))
            }
        };

        Ok(Self {
            data: canonical::bytes_field(&map, "data")?.unwrap_or_default(),
            kid,
            prev,
            revoke: canonical::uint_field(&map, "revoke")?,
            seq,
            sig: Signature::from_bytes(sig_arr),
            ts: canonical::int_field(&map, "ts")?,
            typ: canonical::str_field(&map, "type")?.unwrap_or_default(),
        })
    }

    /// Structural checks independent of any particular chain.
    ///
    /// Revocations carry a target in `1..seq` and nothing else; all other
    /// statements carry a timestamp and data or a type tag.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.seq == 0 {
            return Err(Error::InvalidSeq { expected: 1, got: 0 });
        }
        if self.prev.is_some() != (self.seq > 1) {
            return Err(Error::InvalidPrev);
        }
        if self.is_revocation() {
            let target = self.revoke.ok_or(Error::InvalidRevokeSeq(0))?;
            if target == 0 || target >= self.seq {
                return Err(Error::InvalidRevokeSeq(target));
            }
            if !self.data.is_empty() || self.ts.is_some() {
                return Err(Error::Encoding("revocation with data or ts".into()));
            }
        } else {
            if self.revoke.is_some() {
                return Err(Error::Encoding("revoke without revoke type".into()));
            }
            if self.data.is_empty() && self.typ.is_empty() {
                return Err(Error::NoData);
            }
            if self.ts.is_none() {
                return Err(Error::InvalidTimestamp);
            }
        }
        Ok(())
    }

    fn to_writer(&self, include_sig: bool) -> ObjectWriter {
        let mut w = ObjectWriter::new();
        if include_sig {
            w.bytes(".sig", &self.sig.0);
        }
        if !self.data.is_empty() {
            w.bytes("data", &self.data);
        }
        w.string("kid", self.kid.as_str());
        if let Some(prev) = &self.prev {
            w.bytes("prev", prev.as_bytes());
        }
        if let Some(revoke) = self.revoke {
            w.uint("revoke", revoke);
        }
        w.uint("seq", self.seq);
        if let Some(ts) = self.ts {
            w.int("ts", ts);
        }
        if !self.typ.is_empty() {
            w.string("type", &self.typ);
        }
        w
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("seq", &self.seq)
            .field("kid", &self.kid)
            .field("type", &self.typ)
            .field("data_len", &self.data.len())
            .field("revoke", &self.revoke)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sigchain::Sigchain;

    fn signer() -> SignKey {
        SignKey::from_seed(&[0x01; 32])
    }

    #[test]
    fn test_generate_requires_data_or_type() {
        let key = signer();
        let sc = Sigchain::new(key.public_key());

        let err = Statement::generate(&sc, &[], &key, "", 1).unwrap_err();
        assert_eq!(err.to_string(), "no data");

        // A bare type tag is enough.
        assert!(Statement::generate(&sc, &[], &key, "marker", 1).is_ok());
        // So is bare data.
        assert!(Statement::generate(&sc, b"x", &key, "", 1).is_ok());
    }

    #[test]
    fn test_generate_rejects_foreign_signer() {
        let key = signer();
        let sc = Sigchain::new(key.public_key());

        let err = Statement::generate(&sc, b"x", &SignKey::generate(), "", 1).unwrap_err();
        assert_eq!(err.to_string(), "invalid sigchain sign public key");
    }

    #[test]
    fn test_roundtrip() {
        let key = signer();
        let mut sc = Sigchain::new(key.public_key());
        let st = Statement::generate(&sc, b"hello", &key, "test", 1234567890001).unwrap();
        sc.add(st.clone()).unwrap();

        let b = st.bytes();
        let decoded = Statement::from_bytes(&b).unwrap();
        assert_eq!(decoded, st);
        assert_eq!(decoded.bytes(), b);
    }

    #[test]
    fn test_from_bytes_ignores_unknown_fields() {
        let key = signer();
        let sc = Sigchain::new(key.public_key());
        let st = Statement::generate(&sc, b"hello", &key, "", 1).unwrap();

        let b = st.bytes();
        let with_extra = String::from_utf8(b).unwrap().replace(
            "\"seq\":1",
            "\"nonce\":\"xyz\",\"seq\":1",
        );
        let decoded = Statement::from_bytes(with_extra.as_bytes()).unwrap();
        // Unknown fields are dropped, so the re-encoding is canonical again.
        assert_eq!(decoded.bytes(), st.bytes());
    }

    #[test]
    fn test_from_bytes_rejects_missing_fields() {
        assert!(Statement::from_bytes(b"{}").is_err());
        assert!(Statement::from_bytes(b"{\"seq\":1}").is_err());
        assert!(Statement::from_bytes(b"[]").is_err());
    }

    #[test]
    fn test_verify() {
        let key = signer();
        let sc = Sigchain::new(key.public_key());
        let st = Statement::generate(&sc, b"hello", &key, "", 1).unwrap();
        st.verify().unwrap();

        let mut bad = st.clone();
        bad.data = b"hellO".to_vec();
        assert!(bad.verify().is_err());
    }
}
