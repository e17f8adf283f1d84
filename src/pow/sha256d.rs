use {super::Kernel, sha2::{Digest, Sha256}};

/// SHA-256d(m) = SHA-256(SHA-256(m)). Used by Bitcoin-family chains.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256d;

impl Kernel for Sha256d {
    fn hash(&self, header: &[u8; 80]) -> [u8; 32] {
        let first = Sha256::digest(header);
        Sha256::digest(first).into()
    }
}
