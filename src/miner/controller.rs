use {
    super::*,
    metrics::Metrics,
    stratum::{Client, Difficulty, Event, EventReceiver, JobId, Notify},
    tokio::sync::broadcast::error::RecvError,
};

/// Owns one pool connection end to end: handshake, job distribution to the mining workers,
/// and share submission. `job_tx`/`job_rx` is how a freshly assembled [`job::Job`] reaches every
/// worker at once; `job_cancel` is the token that preempts whichever job is currently running,
/// since a `mining.notify` always supersedes the job before it regardless of `clean_jobs`.
pub(crate) struct Controller {
    client: Client,
    settings: Settings,
    subscription: subscription::Subscription,
    kernel: Arc<dyn pow::Kernel>,
    metrics: Metrics,
    cancel: CancellationToken,
    job_tx: watch::Sender<Option<(Arc<job::Job>, CancellationToken)>>,
    job_rx: watch::Receiver<Option<(Arc<job::Job>, CancellationToken)>>,
    job_cancel: Option<CancellationToken>,
    share_tx: mpsc::Sender<job::Share>,
    share_rx: mpsc::Receiver<job::Share>,
    workers: JoinSet<()>,
    accepted_shares: u64,
}

impl Controller {
    pub(crate) async fn run(mut client: Client, settings: &Settings, cancel: CancellationToken) -> Result {
        let mut events = client.subscribe_events();

        client.connect().await.context("failed to connect to pool")?;

        let (subscribe_result, duration, _) = client
            .subscribe(USER_AGENT.to_string())
            .await
            .context("mining.subscribe failed")?;
        debug!(?duration, "subscribed");

        let subscription_id = subscribe_result
            .subscriptions
            .iter()
            .find(|(method, _)| method == "mining.notify")
            .or_else(|| subscribe_result.subscriptions.first())
            .map(|(_, id)| id.clone())
            .unwrap_or_default();

        let mut subscription = subscription::Subscription::new(settings.algo);
        subscription
            .set_subscription(
                subscription_id,
                subscribe_result.extranonce1,
                subscribe_result.extranonce2_size,
            )
            .context("pool sent a malformed subscription")?;

        let (duration, _) = client.authorize().await.context("mining.authorize failed")?;
        debug!(?duration, "authorized");

        subscription
            .set_worker_name(settings.username.clone())
            .context("worker name already set")?;

        let kernel: Arc<dyn pow::Kernel> = Arc::from(subscription.kernel());
        let metrics = Metrics::new();
        let (job_tx, job_rx) = watch::channel(None);
        let (share_tx, share_rx) = mpsc::channel(256);

        let mut controller = Self {
            client,
            settings: settings.clone(),
            subscription,
            kernel,
            metrics,
            cancel,
            job_tx,
            job_rx,
            job_cancel: None,
            share_tx,
            share_rx,
            workers: JoinSet::new(),
            accepted_shares: 0,
        };

        controller.spawn_workers();

        let status_handle = if controller.settings.quiet {
            None
        } else {
            let metrics = controller.metrics.clone();
            let cancel = controller.cancel.clone();
            Some(tokio::spawn(async move {
                tokio::select! {
                    _ = metrics::spawn_status_line(metrics, Duration::from_millis(200)) => {}
                    _ = cancel.cancelled() => {}
                }
            }))
        };

        controller.event_loop(&mut events).await;

        controller.cancel_current_job();
        controller.workers.shutdown().await;

        if let Some(handle) = status_handle {
            handle.abort();
        }

        let _ = controller.client.disconnect().await;

        info!(
            hashes = controller.metrics.total(),
            shares = controller.accepted_shares,
            uptime_secs = controller.metrics.uptime().as_secs_f64(),
            "shutting down"
        );

        Ok(())
    }

    fn spawn_workers(&mut self) {
        let threads = self.settings.threads as u32;

        for core_id in 0..self.settings.threads {
            let mut job_rx = self.job_rx.clone();
            let share_tx = self.share_tx.clone();
            let kernel = self.kernel.clone();
            let metrics = self.metrics.clone();
            let cancel = self.cancel.clone();
            let nonce_start = core_id as u32;

            self.workers.spawn(async move {
                loop {
                    if cancel.is_cancelled() {
                        return;
                    }

                    let current = job_rx.borrow_and_update().clone();

                    let Some((job, job_cancel)) = current else {
                        tokio::select! {
                            changed = job_rx.changed() => {
                                if changed.is_err() {
                                    return;
                                }
                                continue;
                            }
                            _ = cancel.cancelled() => return,
                        }
                    };

                    if job_cancel.is_cancelled() {
                        tokio::select! {
                            changed = job_rx.changed() => {
                                if changed.is_err() {
                                    return;
                                }
                                continue;
                            }
                            _ = cancel.cancelled() => return,
                        }
                    }

                    let kernel = kernel.clone();
                    let share_tx = share_tx.clone();

                    let result = task::spawn_blocking(move || {
                        job.mine(kernel.as_ref(), nonce_start, threads, &job_cancel, |share| {
                            let _ = share_tx.blocking_send(share);
                        })
                    })
                    .await;

                    match result {
                        Ok(Ok((hashes, _elapsed))) => metrics.add(hashes),
                        Ok(Err(err)) => {
                            warn!("mining worker {core_id} stopped: {err}");
                            return;
                        }
                        Err(err) => {
                            warn!("mining worker {core_id} panicked: {err}");
                            return;
                        }
                    }
                }
            });
        }
    }

    async fn event_loop(&mut self, events: &mut EventReceiver) {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return,

                share = self.share_rx.recv() => {
                    match share {
                        Some(share) => self.handle_share(share).await,
                        None => return,
                    }
                }

                event = events.recv() => {
                    match event {
                        Ok(Event::Notify(notify)) => self.handle_notify(notify),
                        Ok(Event::SetDifficulty(difficulty)) => self.handle_set_difficulty(difficulty),
                        Ok(Event::Disconnected) => {
                            warn!("disconnected from pool");
                            return;
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!("event receiver lagged, skipped {skipped} notifications");
                        }
                        Err(RecvError::Closed) => {
                            warn!("event channel closed");
                            return;
                        }
                    }
                }
            }
        }
    }

    fn handle_notify(&mut self, notify: Notify) {
        let job = match self.subscription.create_job(notify) {
            Ok(job) => job,
            Err(err) => {
                warn!("failed to create job: {err}");
                return;
            }
        };

        self.cancel_current_job();

        let job_cancel = self.cancel.child_token();
        self.job_cancel = Some(job_cancel.clone());

        let _ = self.job_tx.send(Some((Arc::new(job), job_cancel)));
    }

    fn handle_set_difficulty(&mut self, difficulty: Difficulty) {
        if let Err(err) = self.subscription.set_difficulty(difficulty.as_f64()) {
            warn!("rejected mining.set_difficulty: {err}");
        }
    }

    fn cancel_current_job(&mut self) {
        if let Some(job_cancel) = self.job_cancel.take() {
            job_cancel.cancel();
        }
    }

    async fn handle_share(&mut self, share: job::Share) {
        let job_id = match JobId::from_str(&share.job_id) {
            Ok(job_id) => job_id,
            Err(err) => {
                warn!("found share for unparseable job id {}: {err}", share.job_id);
                return;
            }
        };

        match self
            .client
            .submit(job_id, share.extranonce2.clone(), share.ntime, share.nonce)
            .await
        {
            Ok(()) => {
                self.accepted_shares += 1;
                info!(total = self.accepted_shares, "share accepted");
            }
            Err(err) => warn!("share rejected: {err}"),
        }
    }
}
