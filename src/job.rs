use {
    super::*,
    primitive_types::U256,
    std::time::Instant,
    stratum::{Extranonce, MerkleNode, Nbits, Nonce, Notify, Ntime, PrevHash, Version},
};

/// A share a [`Job`]'s mining loop has found: a header whose PoW digest, read as a
/// big-endian integer after reversal, meets the job's target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Share {
    pub(crate) job_id: String,
    pub(crate) extranonce2: Extranonce,
    pub(crate) ntime: Ntime,
    pub(crate) nonce: Nonce,
}

/// One `mining.notify` template bound to a subscription's current extranonce/target. Created
/// by [`crate::subscription::Subscription::create_job`]; immutable for its whole lifetime.
/// Preemption ("stop") is expressed by the caller dropping its `CancellationToken`, which
/// every mining worker polls between nonce attempts.
#[derive(Clone)]
pub(crate) struct Job {
    pub(crate) job_id: String,
    prevhash: PrevHash,
    coinb1: String,
    coinb2: String,
    merkle_branches: Vec<MerkleNode>,
    version: Version,
    nbits: Nbits,
    ntime: Ntime,
    extranonce1: Extranonce,
    extranonce2_size: usize,
    target: U256,
}

impl Job {
    pub(crate) fn new(
        notify: Notify,
        extranonce1: Extranonce,
        extranonce2_size: usize,
        target: U256,
    ) -> Self {
        Self {
            job_id: notify.job_id,
            prevhash: notify.prevhash,
            coinb1: notify.coinb1,
            coinb2: notify.coinb2,
            merkle_branches: notify.merkle_branches,
            version: notify.version,
            nbits: notify.nbits,
            ntime: notify.ntime,
            extranonce1,
            extranonce2_size,
            target,
        }
    }

    fn extranonce2_bytes(&self, counter: u32) -> Vec<u8> {
        let mut le = counter.to_le_bytes().to_vec();
        le.resize(self.extranonce2_size.max(le.len()), 0);
        le.truncate(self.extranonce2_size);
        le
    }

    /// Assembles the 80-byte header for a candidate `(extranonce2, nonce)` pair.
    fn header(&self, extranonce2: &Extranonce, nonce: u32) -> anyhow::Result<[u8; 80]> {
        let merkle_root = stratum::merkle_root(
            &self.coinb1,
            &self.coinb2,
            &self.extranonce1,
            extranonce2,
            &self.merkle_branches,
        )?;

        let mut header = [0u8; 80];
        header[0..4].copy_from_slice(&endian::swap_endian_word(&self.version.to_string())?);
        header[4..36].copy_from_slice(&endian::swap_endian_words(&self.prevhash.to_hex())?);
        header[36..68].copy_from_slice(merkle_root.as_byte_array());
        header[68..72].copy_from_slice(&endian::swap_endian_word(&self.ntime.to_string())?);
        header[72..76].copy_from_slice(&endian::swap_endian_word(&self.nbits.to_string())?);
        header[76..80].copy_from_slice(&nonce.to_le_bytes());

        Ok(header)
    }

    /// Runs the nonce/extranonce2 search until cancelled, invoking `on_share` for every
    /// candidate whose digest meets the target. `nonce_start`/`nonce_stride` shard the nonce
    /// space symmetrically across parallel workers (worker k of N: start=k, stride=N).
    ///
    /// Returns the number of hash attempts performed and the wall-clock time spent, for the
    /// caller's hashrate accounting.
    pub(crate) fn mine(
        &self,
        kernel: &dyn pow::Kernel,
        nonce_start: u32,
        nonce_stride: u32,
        cancel: &CancellationToken,
        mut on_share: impl FnMut(Share),
    ) -> anyhow::Result<(u64, std::time::Duration)> {
        let started = Instant::now();
        let mut hash_count = 0u64;

        let mut extranonce2_counter = 0u32;

        'outer: loop {
            let extranonce2 = Extranonce::from_hex(&hex::encode(self.extranonce2_bytes(extranonce2_counter)))?;

            let mut nonce = nonce_start;
            loop {
                if cancel.is_cancelled() {
                    break 'outer;
                }

                let header = self.header(&extranonce2, nonce)?;
                let digest = kernel.hash(&header);
                hash_count += 1;

                let mut reversed = digest;
                reversed.reverse();
                let candidate = U256::from_big_endian(&reversed);

                if candidate <= self.target {
                    on_share(Share {
                        job_id: self.job_id.clone(),
                        extranonce2: extranonce2.clone(),
                        ntime: self.ntime,
                        nonce: Nonce::from(nonce),
                    });
                }

                match nonce.checked_add(nonce_stride) {
                    Some(next) if next <= i32::MAX as u32 => nonce = next,
                    _ => break,
                }
            }

            extranonce2_counter = extranonce2_counter.wrapping_add(1);
        }

        Ok((hash_count, started.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum::{Difficulty, Nbits as NbitsT};
    use std::str::FromStr;

    fn s5_notify() -> Notify {
        Notify {
            job_id: "1db7".to_string(),
            prevhash: PrevHash::from_str(
                "0b29bfff96c5dc08ee65e63d7b7bab431745b089ff0cf95b49a1631e1d2f9f31",
            )
            .unwrap(),
            coinb1: "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff2503777d07062f503253482f0405b8c75208".to_string(),
            coinb2: "0b2f436f696e48756e74722f0000000001603f352a010000001976a914c633315d376c20a973a758f7422d67f7bfed9c5888ac00000000".to_string(),
            merkle_branches: [
                "f0dbca1ee1a9f6388d07d97c1ab0de0e41acdf2edac4b95780ba0a1ec14103b3",
                "8e43fd2988ac40c5d97702b7e5ccdf5b06d58f0e0d323f74dd5082232c1aedf7",
                "1177601320ac928b8c145d771dae78a3901a089fa4aca8def01cbff747355818",
                "9f64f3b0d9edddb14be6f71c3ac2e80455916e207ffc003316c6a515452aa7b4",
                "2d0b54af60fad4ae59ec02031f661d026f2bb95e2eeb1e6657a35036c017c595",
            ]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect(),
            version: Version::from_str("00000002").unwrap(),
            nbits: NbitsT::from_str("1b148272").unwrap(),
            ntime: Ntime::from_str("52c7b81a").unwrap(),
            clean_jobs: true,
        }
    }

    #[test]
    fn header_is_80_bytes_and_deterministic() {
        let extranonce1 = Extranonce::from_hex("f800880e").unwrap();
        let target = target::target_for_difficulty(32.0, 16);
        let job = Job::new(s5_notify(), extranonce1, 4, target);

        let extranonce2 = Extranonce::from_hex("00000000").unwrap();
        let a = job.header(&extranonce2, 0).unwrap();
        let b = job.header(&extranonce2, 0).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 80);
    }

    #[test]
    fn extranonce2_bytes_are_little_endian() {
        let extranonce1 = Extranonce::from_hex("f800880e").unwrap();
        let target = target::target_for_difficulty(1.0, 0);
        let job = Job::new(s5_notify(), extranonce1, 4, target);

        assert_eq!(job.extranonce2_bytes(1), vec![1, 0, 0, 0]);
        assert_eq!(job.extranonce2_bytes(256), vec![0, 1, 0, 0]);
    }

    #[test]
    fn s5_known_scrypt_share() {
        let extranonce1 = Extranonce::from_hex("f800880e").unwrap();
        let target = target::target_for_difficulty(32.0, pow::Algorithm::Scrypt.target_shift());
        let job = Job::new(s5_notify(), extranonce1, 4, target);

        let cancel = CancellationToken::new();
        let kernel = pow::Scrypt::default();

        let mut found = None;
        let (_, _) = job
            .mine(&kernel, 1_210_450_365, 1, &cancel, |share| {
                if found.is_none() {
                    found = Some(share);
                    cancel.cancel();
                }
            })
            .unwrap();

        let share = found.expect("expected S5 to find a share");
        assert_eq!(share.job_id, "1db7");
        assert_eq!(share.extranonce2.to_hex(), "00000000");
        assert_eq!(share.ntime.to_string(), "52c7b81a");
        assert_eq!(share.nonce.to_string(), "482601c0");
    }

    #[test]
    fn stop_halts_within_one_iteration() {
        let extranonce1 = Extranonce::from_hex("f800880e").unwrap();
        // An unreachable target so the loop only terminates via cancellation.
        let target = U256::zero();
        let job = Job::new(s5_notify(), extranonce1, 4, target);

        let cancel = CancellationToken::new();
        let kernel = pow::Sha256d;
        cancel.cancel();

        let (hashes, _) = job.mine(&kernel, 0, 1, &cancel, |_| {}).unwrap();
        assert_eq!(hashes, 0, "a pre-cancelled job should perform no hash attempts");
    }

    #[test]
    fn difficulty_one_is_consistent_with_subscription_defaults() {
        assert_eq!(Difficulty::from(1).as_f64(), 1.0);
    }
}
