use super::*;

/// Builds the global tracing subscriber. Level is driven by `-q`/`-d`; `-P` additionally
/// raises the Stratum client's own target to `trace` so every wire frame is logged.
pub(crate) fn init(settings: &Settings) -> Result {
    let default_level = if settings.quiet {
        "warn"
    } else if settings.debug {
        "debug"
    } else {
        "info"
    };

    let mut filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    if settings.dump_protocol {
        filter = filter.add_directive("stratum=trace".parse()?);
        filter = filter.add_directive("para::client=trace".parse()?);
    }

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if let Some(path) = &settings.log_file {
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("log file path has no file name: {}", path.display()))?;

        let appender = tracing_appender::rolling::never(
            parent.unwrap_or_else(|| std::path::Path::new(".")),
            file_name,
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        // leaked intentionally: the guard must outlive the process, which main() never tears
        // down explicitly.
        std::mem::forget(guard);
        builder.with_writer(non_blocking).with_ansi(false).init();
    } else {
        builder.init();
    }

    Ok(())
}
