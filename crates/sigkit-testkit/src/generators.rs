//! Proptest generators for property-based testing.

use proptest::prelude::*;

use sigkit_core::{Sigchain, SignKey, Statement};

/// Generate a random signing key from an arbitrary seed.
pub fn sign_key() -> impl Strategy<Value = SignKey> {
    any::<[u8; 32]>().prop_map(|seed| SignKey::from_seed(&seed))
}

/// Generate statement payload bytes of up to `max_len` bytes.
pub fn data(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a short ASCII type tag ("revoke" excluded).
pub fn type_tag() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}".prop_filter("reserved tag", |t| t != "revoke")
}

/// Generate a reasonable millisecond timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    1_000_000_000_000i64..=2_000_000_000_000i64
}

/// Generate a keyring item id without reserved or hidden prefixes.
pub fn item_id() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9._-]{0,31}".prop_map(String::from)
}

/// Parameters for one generated chain: a seed plus (data, type) pairs that
/// each produce a valid statement.
#[derive(Debug, Clone)]
pub struct ChainParams {
    pub seed: [u8; 32],
    pub entries: Vec<(Vec<u8>, String)>,
    pub start_ts: i64,
}

impl Arbitrary for ChainParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(),
            prop::collection::vec((data(64), type_tag()), 1..8),
            timestamp(),
        )
            .prop_map(|(seed, entries, start_ts)| ChainParams { seed, entries, start_ts })
            .boxed()
    }
}

/// Build a chain from parameters.
pub fn chain_from_params(params: &ChainParams) -> Sigchain {
    let signer = SignKey::from_seed(&params.seed);
    let mut chain = Sigchain::new(signer.public_key());

    for (i, (data, typ)) in params.entries.iter().enumerate() {
        let ts = params.start_ts + i as i64;
        let st = Statement::generate(&chain, data, &signer, typ, ts)
            .expect("generated entries are valid");
        chain.add(st).expect("generated statements append");
    }
    chain
}
