//! Benchmark payload generation.

use bytes::Bytes;
use rand::Rng;
use serde::{Deserialize, Serialize};

const URL_SAFE_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Which payload flavor a benchmark run uploads.
///
/// `Repeated` is a single ASCII character repeated to length, which
/// makes failures easy to eyeball. `Random` draws from the URL-safe
/// base64 alphabet, defeating any dedup or compression on the target
/// side. Both stay single-byte UTF-8, so chunk boundaries land exactly
/// on the configured size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Repeated,
    Random,
}

/// Generate `len` bytes of the requested flavor.
pub fn generate(kind: PayloadKind, len: usize) -> Bytes {
    match kind {
        PayloadKind::Repeated => repeated(len),
        PayloadKind::Random => random_text(len),
    }
}

fn repeated(len: usize) -> Bytes {
    Bytes::from(vec![b'a'; len])
}

fn random_text(len: usize) -> Bytes {
    let mut rng = rand::thread_rng();
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(URL_SAFE_ALPHABET[rng.gen_range(0..URL_SAFE_ALPHABET.len())]);
    }
    Bytes::from(out)
}
