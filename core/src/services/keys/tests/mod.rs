
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rsa::RsaPrivateKey;

/// One generated key shared by store tests that only need valid material
pub(super) static SAMPLE_PRIVATE_KEY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut OsRng, 2048).unwrap());
