use {super::*, clap::builder::styling::{AnsiColor, Effects, Styles}};

/// Command-line surface for the miner. Parsing never rejects the `-u/-p` vs `-O` conflict
/// itself; [`Settings::load`] performs that check so CLI misuse reports exit code 1 rather
/// than clap's own exit code 2.
#[derive(Debug, Parser)]
#[command(
  name = "para",
  version = "NightMiner/0.1",
  styles = Styles::styled()
    .error(AnsiColor::Red.on_default() | Effects::BOLD)
    .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
    .invalid(AnsiColor::Red.on_default())
    .literal(AnsiColor::Blue.on_default())
    .placeholder(AnsiColor::Cyan.on_default())
    .usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
    .valid(AnsiColor::Green.on_default()),
)]
pub(crate) struct Arguments {
    /// Pool URL, e.g. `stratum+tcp://pool.example.com:3333`. Port defaults to 9333.
    #[arg(short = 'o', long = "url", env = "STRATUM_URL")]
    pub(crate) url: Option<String>,

    #[arg(short = 'u', long = "user", env = "STRATUM_USER")]
    pub(crate) user: Option<String>,

    #[arg(short = 'p', long = "pass", env = "STRATUM_PASS")]
    pub(crate) pass: Option<String>,

    /// `user:pass` in one argument; mutually exclusive with `-u`/`-p`.
    #[arg(short = 'O', long = "userpass")]
    pub(crate) userpass: Option<String>,

    #[arg(short = 'a', long = "algo", value_enum, default_value_t = Algorithm::Scrypt)]
    pub(crate) algo: Algorithm,

    /// Number of mining worker threads; defaults to the available CPU core count.
    #[arg(short = 't', long = "threads")]
    pub(crate) threads: Option<usize>,

    /// Daemonize via a double fork after a successful subscribe/authorize handshake.
    #[arg(short = 'B', long = "background")]
    pub(crate) background: bool,

    #[arg(short = 'q', long = "quiet")]
    pub(crate) quiet: bool,

    /// Log every Stratum frame sent and received.
    #[arg(short = 'P', long = "dump-protocol")]
    pub(crate) dump_protocol: bool,

    #[arg(short = 'd', long = "debug")]
    pub(crate) debug: bool,

    /// Append logs to this file instead of (or in addition to, under -B) stderr.
    #[arg(long = "log-file", env = "STRATUM_LOG_FILE")]
    pub(crate) log_file: Option<std::path::PathBuf>,
}

impl Arguments {
    pub(crate) async fn run(self, cancel_token: CancellationToken) -> Result {
        let settings = Settings::load(self)?;
        logging::init(&settings)?;

        if settings.background {
            daemon::daemonize()?;
        }

        miner::Miner::new(settings).run(cancel_token).await
    }
}
