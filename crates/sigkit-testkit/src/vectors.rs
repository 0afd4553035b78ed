//! Golden statement vectors.
//!
//! Known inputs with their exact canonical bytes. Every implementation of
//! the statement encoding must reproduce these byte-for-byte: the signature
//! and the prev link are both defined over them.

use sigkit_core::{Sigchain, SignKey, Statement};

/// Seed of the golden signer: 32 bytes of 0x01.
pub const GOLDEN_SEED: [u8; 32] = [0x01; 32];

/// KID of the golden signer.
pub const GOLDEN_KID: &str = "kse132yw8ht5p8cetl2jmvknewjawt9xwzdlrk2pyxlnwjyqrdq0dawquwc7vw";

/// A single golden statement vector.
#[derive(Debug, Clone)]
pub struct GoldenStatement {
    pub name: &'static str,
    /// Position in the golden chain.
    pub seq: u64,
    /// The exact persisted canonical form.
    pub bytes: &'static str,
}

/// The golden chain: two untyped data statements, then a revocation of
/// seq 2, all from the golden signer at clock ticks 1234567890001…
pub fn golden_statements() -> Vec<GoldenStatement> {
    vec![
        GoldenStatement {
            name: "root",
            seq: 1,
            bytes: r#"{".sig":"SPKxMlhPU7wiPGsszrQN3ljWdkTbKFWxqbTqtoFp/ZrV0jd1WsMxMltiyHc4/N0mUWga1zshztXQFkEcamvECg==","data":"AQEBAQEBAQEBAQEBAQEBAQ==","kid":"kse132yw8ht5p8cetl2jmvknewjawt9xwzdlrk2pyxlnwjyqrdq0dawquwc7vw","seq":1,"ts":1234567890001}"#,
        },
        GoldenStatement {
            name: "second",
            seq: 2,
            bytes: r#"{".sig":"97dCpuu8cXBnMDsbsdljBAdSVV6FaWyx+Nwvw7tsk1Riksy0k5rg8OJiN0RNXPcXlHHagPku9SIlAvgQtjLpCw==","data":"AgICAgICAgICAgICAgICAg==","kid":"kse132yw8ht5p8cetl2jmvknewjawt9xwzdlrk2pyxlnwjyqrdq0dawquwc7vw","prev":"xsF9vVfMVzvoYUmrcMvWRNYpXaTrbINMgVQRHUBRQOQ=","seq":2,"ts":1234567890002}"#,
        },
        GoldenStatement {
            name: "revoke_second",
            seq: 3,
            bytes: r#"{".sig":"odu1EYdLq8LvKAaW80Kfoil+tdPIsvug2psWmk8Xk/UTAyczw/g5PyyKypPQaJg1/sls/qGunoTY7qcKjEgZAw==","kid":"kse132yw8ht5p8cetl2jmvknewjawt9xwzdlrk2pyxlnwjyqrdq0dawquwc7vw","prev":"txNhm/TGe8QKScMetXrv2UzDYBZ7ZI6u0TJDdoB9Cb0=","revoke":2,"seq":3,"type":"revoke"}"#,
        },
    ]
}

/// Rebuild the golden chain from scratch.
pub fn golden_chain() -> Sigchain {
    let signer = SignKey::from_seed(&GOLDEN_SEED);
    let mut chain = Sigchain::new(signer.public_key());

    let st = Statement::generate(&chain, &[0x01; 16], &signer, "", 1234567890001)
        .expect("golden statement 1");
    chain.add(st).expect("golden add 1");

    let st = Statement::generate(&chain, &[0x02; 16], &signer, "", 1234567890002)
        .expect("golden statement 2");
    chain.add(st).expect("golden add 2");

    chain.revoke(2, &signer).expect("golden revoke");
    chain
}
