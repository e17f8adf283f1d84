use {
    super::*,
    primitive_types::U256,
    stratum::{Extranonce, InternalError, Notify},
};

/// Per-connection mining state: the algorithm's kernel, the extranonce/subscription id handed
/// out by `mining.subscribe`, the worker name from `mining.authorize`, and the current target
/// derived from the pool's last `mining.set_difficulty`. Each field is set at most once except
/// `difficulty`/`target`, which the pool may update at any time and which apply only to jobs
/// created after the update — in-flight jobs keep the target they were created with.
pub(crate) struct Subscription {
    algorithm: pow::Algorithm,
    subscription_id: Option<String>,
    extranonce1: Option<Extranonce>,
    extranonce2_size: Option<usize>,
    worker_name: Option<String>,
    difficulty: f64,
    target: U256,
}

impl Subscription {
    pub(crate) fn new(algorithm: pow::Algorithm) -> Self {
        Self {
            algorithm,
            subscription_id: None,
            extranonce1: None,
            extranonce2_size: None,
            worker_name: None,
            difficulty: 1.0,
            target: target::target_for_difficulty(1.0, algorithm.target_shift()),
        }
    }

    pub(crate) fn set_subscription(
        &mut self,
        subscription_id: String,
        extranonce1: Extranonce,
        extranonce2_size: usize,
    ) -> Result<(), InternalError> {
        if self.subscription_id.is_some() {
            return Err(InternalError::AlreadySubscribed);
        }

        self.subscription_id = Some(subscription_id);
        self.extranonce1 = Some(extranonce1);
        self.extranonce2_size = Some(extranonce2_size);

        Ok(())
    }

    pub(crate) fn set_worker_name(&mut self, worker_name: String) -> Result<(), InternalError> {
        if self.worker_name.is_some() {
            return Err(InternalError::WorkerNameAlreadySet);
        }

        self.worker_name = Some(worker_name);

        Ok(())
    }

    pub(crate) fn set_difficulty(&mut self, difficulty: f64) -> Result<(), InternalError> {
        if difficulty < 0.0 {
            return Err(InternalError::NegativeDifficulty { difficulty });
        }

        self.difficulty = difficulty;
        self.target = target::target_for_difficulty(difficulty, self.algorithm.target_shift());

        Ok(())
    }

    pub(crate) fn create_job(&self, notify: Notify) -> Result<job::Job, InternalError> {
        let (Some(extranonce1), Some(extranonce2_size)) =
            (self.extranonce1.clone(), self.extranonce2_size)
        else {
            return Err(InternalError::NotSubscribed);
        };

        Ok(job::Job::new(notify, extranonce1, extranonce2_size, self.target))
    }

    pub(crate) fn kernel(&self) -> Box<dyn pow::Kernel> {
        self.algorithm.kernel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use stratum::{Nbits, PrevHash, Version, Ntime};

    fn notify() -> Notify {
        Notify {
            job_id: "1".to_string(),
            prevhash: PrevHash::from_str(&"00".repeat(32)).unwrap(),
            coinb1: "00".to_string(),
            coinb2: "00".to_string(),
            merkle_branches: vec![],
            version: Version::from_str("00000002").unwrap(),
            nbits: Nbits::from_str("1d00ffff").unwrap(),
            ntime: Ntime::from_str("00000000").unwrap(),
            clean_jobs: true,
        }
    }

    #[test]
    fn create_job_before_subscribe_fails() {
        let sub = Subscription::new(pow::Algorithm::Sha256d);
        assert!(matches!(
            sub.create_job(notify()),
            Err(InternalError::NotSubscribed)
        ));
    }

    #[test]
    fn double_subscribe_fails() {
        let mut sub = Subscription::new(pow::Algorithm::Sha256d);
        sub.set_subscription("a".into(), Extranonce::from_hex("00000000").unwrap(), 4)
            .unwrap();
        assert!(matches!(
            sub.set_subscription("b".into(), Extranonce::from_hex("00000000").unwrap(), 4),
            Err(InternalError::AlreadySubscribed)
        ));
    }

    #[test]
    fn double_worker_name_fails() {
        let mut sub = Subscription::new(pow::Algorithm::Sha256d);
        sub.set_worker_name("alice.worker1".into()).unwrap();
        assert!(matches!(
            sub.set_worker_name("bob".into()),
            Err(InternalError::WorkerNameAlreadySet)
        ));
    }

    #[test]
    fn negative_difficulty_rejected() {
        let mut sub = Subscription::new(pow::Algorithm::Sha256d);
        assert!(matches!(
            sub.set_difficulty(-1.0),
            Err(InternalError::NegativeDifficulty { difficulty }) if difficulty == -1.0
        ));
    }

    #[test]
    fn zero_difficulty_yields_max_target() {
        let mut sub = Subscription::new(pow::Algorithm::Sha256d);
        sub.set_difficulty(0.0).unwrap();
        assert_eq!(sub.target, U256::MAX);
    }

    #[test]
    fn create_job_after_subscribe_succeeds() {
        let mut sub = Subscription::new(pow::Algorithm::Scrypt);
        sub.set_subscription("a".into(), Extranonce::from_hex("f800880e").unwrap(), 4)
            .unwrap();
        let job = sub.create_job(notify()).unwrap();
        assert_eq!(job.job_id, "1");
    }
}
