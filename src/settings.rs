use super::*;

pub(crate) const DEFAULT_PORT: u16 = 9333;

/// Resolved, validated configuration for one mining run: CLI flags merged with their `env`
/// fallbacks (handled by clap itself), plus the `-u/-p` vs `-O` precedence clap can't express
/// without losing control of the exit code on conflict.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) address: String,
    pub(crate) username: String,
    pub(crate) password: Option<String>,
    pub(crate) algo: Algorithm,
    pub(crate) threads: usize,
    pub(crate) background: bool,
    pub(crate) quiet: bool,
    pub(crate) dump_protocol: bool,
    pub(crate) debug: bool,
    pub(crate) log_file: Option<std::path::PathBuf>,
}

impl Settings {
    pub(crate) fn load(args: Arguments) -> Result<Settings> {
        if args.userpass.is_some() && (args.user.is_some() || args.pass.is_some()) {
            eprintln!("-O/--userpass is mutually exclusive with -u/--user and -p/--pass");
            std::process::exit(1);
        }

        let (username, password) = if let Some(userpass) = args.userpass {
            match userpass.split_once(':') {
                Some((user, pass)) => (user.to_string(), Some(pass.to_string())),
                None => (userpass, None),
            }
        } else {
            match args.user {
                Some(user) => (user, args.pass),
                None => {
                    eprintln!("one of -u/--user, -O/--userpass is required");
                    std::process::exit(1);
                }
            }
        };

        let address = match args.url {
            Some(url) => parse_address(&url)?,
            None => {
                eprintln!("-o/--url is required");
                std::process::exit(1);
            }
        };

        let threads = args
            .threads
            .unwrap_or_else(|| sysinfo::System::new_all().cpus().len().max(1));

        Ok(Self {
            address,
            username,
            password,
            algo: args.algo,
            threads,
            background: args.background,
            quiet: args.quiet,
            dump_protocol: args.dump_protocol,
            debug: args.debug,
            log_file: args.log_file,
        })
    }
}

/// Strips an optional `stratum+tcp://` scheme and fills in [`DEFAULT_PORT`] when the URL
/// carries no port of its own.
fn parse_address(url: &str) -> anyhow::Result<String> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);

    if rest.is_empty() {
        anyhow::bail!("empty pool URL");
    }

    Ok(if rest.contains(':') {
        rest.to_string()
    } else {
        format!("{rest}:{DEFAULT_PORT}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scheme_and_keeps_port() {
        assert_eq!(
            parse_address("stratum+tcp://pool.example.com:3333").unwrap(),
            "pool.example.com:3333"
        );
    }

    #[test]
    fn applies_default_port_when_absent() {
        assert_eq!(
            parse_address("stratum+tcp://pool.example.com").unwrap(),
            format!("pool.example.com:{DEFAULT_PORT}")
        );
    }

    #[test]
    fn accepts_bare_host_port() {
        assert_eq!(parse_address("pool.example.com:4444").unwrap(), "pool.example.com:4444");
    }

    #[test]
    fn rejects_empty_url() {
        assert!(parse_address("stratum+tcp://").is_err());
    }
}
