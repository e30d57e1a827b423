use crate::config::Config;
use crate::daemon::identity::SessionAddress;
use crate::daemon::server::{shutdown_signal, DaemonServer, ExitReason};
use crate::daemon::spawn::{DAEMON_ENV, SHELL_PID_ENV};
use crate::error::{PipeLlmError, Result};
use tracing::warn;

/// 데몬 모드로 실행해야 하는지 (`LLM_DAEMON=1`)
pub fn daemon_mode_requested() -> bool {
    std::env::var(DAEMON_ENV).as_deref() == Ok("1")
}

fn parse_shell_pid(raw: Option<&str>) -> Result<u32> {
    let raw = raw.ok_or_else(|| {
        PipeLlmError::InvalidDaemonEnv(format!("{} is not set", SHELL_PID_ENV))
    })?;

    match raw.trim().parse::<u32>() {
        Ok(pid) if pid > 0 => Ok(pid),
        _ => Err(PipeLlmError::InvalidDaemonEnv(format!(
            "{} must be a positive process id, got {:?}",
            SHELL_PID_ENV, raw
        ))),
    }
}

/// 데몬 서버 실행 (blocking)
///
/// 소유 shell이 사라지거나 종료 시그널을 받을 때까지 반환하지 않습니다.
pub async fn run_daemon() -> Result<ExitReason> {
    let shell_pid = parse_shell_pid(std::env::var(SHELL_PID_ENV).ok().as_deref())?;

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config; using defaults");
        Config::default()
    });

    let shutdown = shutdown_signal()?;
    let address = SessionAddress::for_shell(shell_pid, &config);
    let daemon = DaemonServer::new(address, config.liveness_poll_interval()).bind()?;

    Ok(daemon.serve(shutdown).await)
}
