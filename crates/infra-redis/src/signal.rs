// Stopping Resque worker processes on this host
// Resque finishes its current job on QUIT and then exits.

use director_core::domain::WorkerId;

/// Result of asking a worker process to quit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuitOutcome {
    /// QUIT delivered to the local pid
    Signalled(u32),
    /// The pid no longer exists
    AlreadyGone(u32),
    /// The worker runs on another host
    Remote,
    /// The id carries no usable host or pid
    Unaddressable,
    /// Delivery failed
    Failed(String),
}

/// Hostname as Resque records it in worker ids
pub fn local_hostname() -> Option<String> {
    #[cfg(unix)]
    {
        nix::unistd::gethostname()
            .ok()
            .and_then(|host| host.into_string().ok())
    }

    #[cfg(not(unix))]
    {
        None
    }
}

/// Send `QUIT` to the worker when its id names `local_host`
pub fn quit_worker(id: &WorkerId, local_host: Option<&str>) -> QuitOutcome {
    let (Some(host), Some(pid)) = (id.host(), id.pid()) else {
        return QuitOutcome::Unaddressable;
    };

    // pid 0 would address our own process group
    if pid == 0 {
        return QuitOutcome::Unaddressable;
    }

    if local_host != Some(host) {
        return QuitOutcome::Remote;
    }

    send_quit(pid)
}

#[cfg(unix)]
fn send_quit(pid: u32) -> QuitOutcome {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return QuitOutcome::Unaddressable;
    };

    match kill(Pid::from_raw(raw), Signal::SIGQUIT) {
        Ok(()) => QuitOutcome::Signalled(pid),
        Err(Errno::ESRCH) => QuitOutcome::AlreadyGone(pid),
        Err(e) => QuitOutcome::Failed(e.to_string()),
    }
}

#[cfg(not(unix))]
fn send_quit(_pid: u32) -> QuitOutcome {
    QuitOutcome::Failed("process signals are unsupported on this platform".to_string())
}
