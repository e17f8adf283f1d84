use {
    super::*,
    controller::Controller,
    stratum::{Client, ClientConfig},
};

mod controller;
mod metrics;

/// Drives one run of the miner: connect, handshake, mine, submit, until the session is
/// cancelled or the pool drops the connection.
pub(crate) struct Miner {
    settings: Settings,
}

impl Miner {
    pub(crate) fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub(crate) async fn run(self, cancel_token: CancellationToken) -> Result {
        info!(
            "connecting to {} as {} ({} threads, {})",
            self.settings.address, self.settings.username, self.settings.threads, self.settings.algo
        );

        let config = ClientConfig {
            address: self.settings.address.clone(),
            username: self.settings.username.clone(),
            password: self.settings.password.clone(),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(10),
        };

        let client = Client::new(config);

        Controller::run(client, &self.settings, cancel_token).await
    }
}
