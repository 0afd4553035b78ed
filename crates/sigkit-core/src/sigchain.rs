//! Sigchain: an ordered, append-only log of signed statements.
//!
//! A sigchain is owned by a single signing key. Every statement is linked to
//! its predecessor by the SHA-256 of the predecessor's canonical bytes, and
//! every append re-verifies the link, the sequence, and the signature, so a
//! chain accepted statement-by-statement is tamper-evident end to end.
//!
//! Revocation is itself a statement: replaying the chain reproduces the same
//! revoked set on every verifier.

use std::collections::BTreeSet;
use std::fmt;

use crate::crypto::{Kid, PublicKey, SigchainHash, SignKey};
use crate::error::{Error, Result};
use crate::statement::Statement;
use crate::user::{User, USER_STATEMENT_TYPE};

/// An append-only sigchain for one signing key.
pub struct Sigchain {
    public_key: PublicKey,
    kid: Kid,
    statements: Vec<Statement>,
    revoked: BTreeSet<u64>,
    /// Latest non-revoked user binding, kept current across appends.
    user: Option<User>,
}

impl Sigchain {
    /// Create an empty chain owned by `public_key`.
    pub fn new(public_key: PublicKey) -> Self {
        Self {
            kid: public_key.kid(),
            public_key,
            statements: Vec::new(),
            revoked: BTreeSet::new(),
            user: None,
        }
    }

    /// The owner's public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The owner's KID.
    pub fn kid(&self) -> &Kid {
        &self.kid
    }

    /// Number of statements in the chain, revocations included.
    pub fn length(&self) -> usize {
        self.statements.len()
    }

    /// Seq of the last statement, or 0 when empty.
    pub fn last_seq(&self) -> u64 {
        self.statements.last().map(|st| st.seq).unwrap_or(0)
    }

    /// The last statement, if any.
    pub fn last(&self) -> Option<&Statement> {
        self.statements.last()
    }

    /// The statement at `seq`, if present.
    pub fn statement(&self, seq: u64) -> Option<&Statement> {
        if seq == 0 {
            return None;
        }
        self.statements.get((seq - 1) as usize)
    }

    /// The full ordered list, including revocations and revoked statements.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Whether the statement at `seq` has been revoked.
    pub fn is_revoked(&self, seq: u64) -> bool {
        self.revoked.contains(&seq)
    }

    /// Append a statement, validating it against the chain tail.
    ///
    /// All-or-nothing: on any rejection the chain is unchanged. Acceptance
    /// requires the owner's KID, the next seq, the correct prev hash, a
    /// verifying signature, and a well-formed body (a valid revocation
    /// target, or data/type plus a non-decreasing timestamp).
    pub fn add(&mut self, st: Statement) -> Result<()> {
        if st.kid != self.kid {
            return Err(Error::KidMismatch);
        }

        let expected = self.last_seq() + 1;
        if st.seq != expected {
            return Err(Error::InvalidSeq { expected, got: st.seq });
        }

        match (self.last(), &st.prev) {
            (None, None) => {}
            (Some(last), Some(prev)) => {
                if *prev != SigchainHash::hash(&last.bytes()) {
                    return Err(Error::InvalidPrev);
                }
            }
            _ => return Err(Error::InvalidPrev),
        }

        st.validate()?;

        self.public_key.verify(&st.sign_bytes(), &st.sig)?;

        let user = if st.is_revocation() {
            // validate() guarantees the target is in 1..seq.
            let target = st.revoke.unwrap_or_default();
            self.check_revoke(target)?;
            None
        } else {
            if let Some(ts) = st.ts {
                let last_ts = self.statements.iter().rev().find_map(|s| s.ts);
                if last_ts.map_or(false, |last| ts < last) {
                    return Err(Error::InvalidTimestamp);
                }
            }
            if st.typ == USER_STATEMENT_TYPE {
                let user = User::from_bytes(&st.data)?;
                if user.seq != st.seq {
                    return Err(Error::UserSeqMismatch);
                }
                if user.kid != self.kid {
                    return Err(Error::KidMismatch);
                }
                Some(user)
            } else {
                None
            }
        };

        // Accepted: apply.
        let revoke_target = if st.is_revocation() { st.revoke } else { None };
        self.statements.push(st);
        if let Some(target) = revoke_target {
            self.revoked.insert(target);
        }
        match user {
            Some(user) => self.user = Some(user),
            None => {
                if revoke_target.is_some() {
                    self.user = self.compute_user();
                }
            }
        }
        Ok(())
    }

    /// Generate and append a revocation of `seq` in one step.
    ///
    /// Returns the appended revocation statement.
    pub fn revoke(&mut self, seq: u64, signer: &SignKey) -> Result<Statement> {
        let st = Statement::generate_revoke(self, seq, signer)?;
        self.add(st.clone())?;
        Ok(st)
    }

    /// Validate a prospective revocation target.
    ///
    /// One coarse error covers nonexistent targets, self-revocation, and
    /// revocation-of-a-revocation; `already revoked` stays distinct.
    pub(crate) fn check_revoke(&self, seq: u64) -> Result<()> {
        if seq == 0 || seq > self.last_seq() {
            return Err(Error::InvalidRevokeSeq(seq));
        }
        let target = &self.statements[(seq - 1) as usize];
        if target.is_revocation() {
            return Err(Error::InvalidRevokeSeq(seq));
        }
        if self.revoked.contains(&seq) {
            return Err(Error::AlreadyRevoked);
        }
        Ok(())
    }

    /// The highest-seq non-revoked statement of the given type.
    ///
    /// Revocation statements are never returned. `typ == ""` selects untyped
    /// statements only.
    pub fn find_last(&self, typ: &str) -> Option<&Statement> {
        self.statements
            .iter()
            .rev()
            .find(|st| !st.is_revocation() && !self.revoked.contains(&st.seq) && st.typ == typ)
    }

    /// All non-revoked statements of the given type, seq ascending.
    ///
    /// `typ == ""` selects untyped statements only.
    pub fn find_all(&self, typ: &str) -> Vec<&Statement> {
        self.statements
            .iter()
            .filter(|st| !st.is_revocation() && !self.revoked.contains(&st.seq) && st.typ == typ)
            .collect()
    }

    /// The latest non-revoked user binding, if any.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// A stable, human-readable dump of the full chain.
    ///
    /// One block per statement: a `/sigchain/<kid>/<seq>` header line, the
    /// pretty-printed canonical object, then a blank line. Golden-tested
    /// byte-for-byte.
    pub fn spew(&self) -> String {
        let mut out = String::new();
        for st in &self.statements {
            out.push_str(&format!("/sigchain/{}/{}\n", st.kid, st.seq));
            out.push_str(&st.pretty());
            out.push_str("\n\n");
        }
        out
    }

    fn compute_user(&self) -> Option<User> {
        let st = self.find_last(USER_STATEMENT_TYPE)?;
        // User statements are validated on add, so this decode succeeds.
        User::from_bytes(&st.data).ok()
    }
}

impl fmt::Debug for Sigchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sigchain")
            .field("kid", &self.kid)
            .field("length", &self.statements.len())
            .field("revoked", &self.revoked)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SignKey;

    struct TestClock(i64);

    impl TestClock {
        fn new() -> Self {
            Self(1234567890000)
        }

        fn now(&mut self) -> i64 {
            self.0 += 1;
            self.0
        }
    }

    fn alice() -> SignKey {
        SignKey::from_seed(&[0x01; 32])
    }

    #[test]
    fn test_append_revoke_query() {
        let mut clock = TestClock::new();
        let alice = alice();
        let mut sc = Sigchain::new(alice.public_key());
        assert_eq!(sc.length(), 0);
        assert_eq!(sc.last_seq(), 0);

        let st = Statement::generate(&sc, &[0x01; 16], &alice, "test", clock.now()).unwrap();
        sc.add(st).unwrap();
        assert_eq!(sc.last_seq(), 1);
        assert_eq!(sc.length(), 1);

        let res = sc.find_last("test").unwrap();
        assert_eq!(res.data, vec![0x01; 16]);

        sc.revoke(1, &alice).unwrap();
        assert!(sc.is_revoked(1));
        assert_eq!(sc.length(), 2);
        assert_eq!(sc.last_seq(), 2);
        assert!(sc.find_last("test").is_none());

        let st2 = Statement::generate(&sc, &[0x02; 16], &alice, "test", clock.now()).unwrap();
        sc.add(st2).unwrap();
        let res = sc.find_last("test").unwrap();
        assert_eq!(res.data, vec![0x02; 16]);

        let st3 = Statement::generate(&sc, &[0x03; 16], &alice, "test", clock.now()).unwrap();
        sc.add(st3).unwrap();

        // Untyped filter matches untyped statements only.
        assert!(sc.find_last("").is_none());
        assert_eq!(sc.find_last("test").unwrap().data, vec![0x03; 16]);
        assert_eq!(sc.find_all("test").len(), 2);
        assert_eq!(sc.statements().len(), 4);

        let err = Statement::generate(&sc, &[], &alice, "", clock.now()).unwrap_err();
        assert_eq!(err.to_string(), "no data");

        let err =
            Statement::generate(&sc, &[], &SignKey::generate(), "", clock.now()).unwrap_err();
        assert_eq!(err.to_string(), "invalid sigchain sign public key");

        let err = sc.revoke(0, &alice).unwrap_err();
        assert_eq!(err.to_string(), "invalid revoke seq 0");

        let err = sc.revoke(10000, &alice).unwrap_err();
        assert_eq!(err.to_string(), "invalid revoke seq 10000");

        let err = sc.revoke(1, &alice).unwrap_err();
        assert_eq!(err.to_string(), "already revoked");

        // Cannot revoke the slot the revocation itself would occupy.
        let err = sc.revoke(5, &alice).unwrap_err();
        assert_eq!(err.to_string(), "invalid revoke seq 5");
    }

    #[test]
    fn test_revoking_a_revocation_rejected() {
        let mut clock = TestClock::new();
        let alice = alice();
        let mut sc = Sigchain::new(alice.public_key());

        let st = Statement::generate(&sc, b"x", &alice, "test", clock.now()).unwrap();
        sc.add(st).unwrap();
        sc.revoke(1, &alice).unwrap();

        let err = sc.revoke(2, &alice).unwrap_err();
        assert_eq!(err.to_string(), "invalid revoke seq 2");
    }

    #[test]
    fn test_add_rejects_wrong_seq_and_prev() {
        let mut clock = TestClock::new();
        let alice = alice();
        let mut sc = Sigchain::new(alice.public_key());

        let st1 = Statement::generate(&sc, b"one", &alice, "", clock.now()).unwrap();
        sc.add(st1.clone()).unwrap();

        // Replaying the same statement is a seq error.
        assert!(matches!(
            sc.add(st1.clone()),
            Err(Error::InvalidSeq { expected: 2, got: 1 })
        ));

        // A statement generated before the append has a stale prev.
        let st2 = Statement::generate(&sc, b"two", &alice, "", clock.now()).unwrap();
        let mut stale = st2.clone();
        stale.prev = Some(SigchainHash::hash(b"wrong"));
        assert!(matches!(sc.add(stale), Err(Error::InvalidPrev)));

        sc.add(st2).unwrap();
        assert_eq!(sc.length(), 2);
    }

    #[test]
    fn test_add_rejects_decreasing_timestamp() {
        let alice = alice();
        let mut sc = Sigchain::new(alice.public_key());

        let st1 = Statement::generate(&sc, b"one", &alice, "", 1000).unwrap();
        sc.add(st1).unwrap();

        let st2 = Statement::generate(&sc, b"two", &alice, "", 999).unwrap();
        assert!(matches!(sc.add(st2), Err(Error::InvalidTimestamp)));

        // Equal timestamps are fine.
        let st2 = Statement::generate(&sc, b"two", &alice, "", 1000).unwrap();
        sc.add(st2).unwrap();
    }

    #[test]
    fn test_add_is_all_or_nothing() {
        let mut clock = TestClock::new();
        let alice = alice();
        let mut sc = Sigchain::new(alice.public_key());

        let st = Statement::generate(&sc, b"x", &alice, "test", clock.now()).unwrap();
        sc.add(st).unwrap();

        let mut bad = Statement::generate(&sc, b"y", &alice, "test", clock.now()).unwrap();
        bad.data = b"tampered".to_vec();
        assert!(sc.add(bad).is_err());

        assert_eq!(sc.length(), 1);
        assert_eq!(sc.find_last("test").unwrap().data, b"x");
    }

    #[test]
    fn test_revocation_is_permanent() {
        let mut clock = TestClock::new();
        let alice = alice();
        let mut sc = Sigchain::new(alice.public_key());

        for i in 1..=3u8 {
            let st = Statement::generate(&sc, &[i; 8], &alice, "test", clock.now()).unwrap();
            sc.add(st).unwrap();
        }
        sc.revoke(2, &alice).unwrap();
        assert!(sc.is_revoked(2));

        // More appends never clear the bit.
        let st = Statement::generate(&sc, &[9; 8], &alice, "test", clock.now()).unwrap();
        sc.add(st).unwrap();
        assert!(sc.is_revoked(2));
        assert!(!sc.is_revoked(1));
        assert!(!sc.is_revoked(3));
    }

    #[test]
    fn test_link_integrity() {
        let mut clock = TestClock::new();
        let alice = alice();
        let mut sc = Sigchain::new(alice.public_key());

        for i in 1..=4u8 {
            let st = Statement::generate(&sc, &[i; 4], &alice, "test", clock.now()).unwrap();
            sc.add(st).unwrap();
        }

        let sts = sc.statements();
        assert!(sts[0].prev.is_none());
        for i in 1..sts.len() {
            let expected = SigchainHash::hash(&sts[i - 1].bytes());
            assert_eq!(sts[i].prev, Some(expected));
        }
    }
}
