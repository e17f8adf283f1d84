#![allow(clippy::too_many_arguments)]
use {
    anyhow::{Context, Error},
    arguments::Arguments,
    clap::Parser,
    pow::Algorithm,
    settings::Settings,
    std::{
        env,
        str::FromStr,
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
        time::{Duration, Instant},
    },
    tokio::{
        sync::{mpsc, watch},
        task::{self, JoinSet},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

mod arguments;
mod daemon;
mod endian;
mod hash_rate;
mod job;
mod logging;
mod miner;
mod pow;
mod settings;
mod signal;
mod subscription;
mod target;

pub const USER_AGENT: &str = "NightMiner/0.1";

type Result<T = (), E = Error> = std::result::Result<T, E>;

pub fn main() {
    let args = Arguments::parse();
    let cancel_token = signal::setup_signal_handler();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("error: failed to start async runtime: {err}");
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(args.run(cancel_token));

    match result {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            error!("error: {err}");
            if env::var_os("RUST_BACKTRACE").map(|v| v == "1").unwrap_or_default() {
                error!("{}", err.backtrace());
            }
            std::process::exit(1);
        }
    }
}
