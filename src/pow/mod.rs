//! Proof-of-work kernels.
//!
//! Every kernel implements the same contract: given an 80-byte block header, produce its
//! 32-byte digest. The mining loop reverses that digest and compares it as a big-endian
//! 256-bit integer against the job's target; kernels themselves know nothing about targets.

mod scrypt;
mod sha256d;

pub use scrypt::Scrypt;
pub use sha256d::Sha256d;

/// A proof-of-work kernel over an 80-byte block header.
pub trait Kernel: Send + Sync + 'static {
    fn hash(&self, header: &[u8; 80]) -> [u8; 32];
}

/// The two mining algorithms this miner supports, selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Algorithm {
    Scrypt,
    Sha256d,
}

impl Algorithm {
    pub fn kernel(self) -> Box<dyn Kernel> {
        match self {
            Algorithm::Scrypt => Box::new(Scrypt::default()),
            Algorithm::Sha256d => Box::new(Sha256d),
        }
    }

    /// Scrypt pools conventionally report targets 2^16 easier than SHA-256d pools would for
    /// the same stated difficulty; this is applied once, when a new target is derived.
    pub fn target_shift(self) -> u32 {
        match self {
            Algorithm::Scrypt => 16,
            Algorithm::Sha256d => 0,
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Scrypt => write!(f, "scrypt"),
            Algorithm::Sha256d => write!(f, "sha256d"),
        }
    }
}
