//! Unix double-fork daemonization, run once the subscribe/authorize handshake has already
//! succeeded so the parent can report success before detaching.

#[cfg(unix)]
pub(crate) fn daemonize() -> anyhow::Result<()> {
    use {
        nix::unistd::{ForkResult, dup2, fork, setsid},
        std::os::fd::AsRawFd,
    };

    match unsafe { fork() }? {
        ForkResult::Parent { .. } => std::process::exit(0),
        ForkResult::Child => {}
    }

    setsid()?;

    match unsafe { fork() }? {
        ForkResult::Parent { .. } => std::process::exit(0),
        ForkResult::Child => {}
    }

    let dev_null = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/null")?;
    let fd = dev_null.as_raw_fd();

    dup2(fd, 0)?;
    dup2(fd, 1)?;
    dup2(fd, 2)?;
    drop(dev_null);

    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn daemonize() -> anyhow::Result<()> {
    anyhow::bail!("-B/--background is only supported on unix")
}
