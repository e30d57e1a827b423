use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::time::Duration;
use tracing::debug;

/// pid에 해당하는 프로세스가 존재하는지 확인
///
/// signal 0을 보내 존재 여부만 검사합니다. 권한이 없어(EPERM) 실패해도 프로세스는 살아 있는 것입니다.
pub fn process_exists(pid: u32) -> bool {
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    if raw <= 0 {
        return false;
    }

    match kill(Pid::from_raw(raw), None) {
        Ok(()) => true,
        Err(Errno::ESRCH) => false,
        Err(_) => true,
    }
}

/// 소유 shell이 사라질 때까지 주기적으로 확인하고, 사라지면 반환
pub async fn wait_for_exit(pid: u32, poll_interval: Duration) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if !process_exists(pid) {
            debug!(pid, "Owner process is gone");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn test_current_process_exists() {
        assert!(process_exists(std::process::id()));
    }

    #[test]
    fn test_invalid_pids_do_not_exist() {
        assert!(!process_exists(0));
        assert!(!process_exists(u32::MAX));
    }

    #[test]
    fn test_reaped_child_does_not_exist() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();
        assert!(process_exists(pid));

        child.kill().unwrap();
        child.wait().unwrap();
        assert!(!process_exists(pid));
    }

    #[tokio::test]
    async fn test_wait_for_exit_returns_after_child_dies() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();
        child.kill().unwrap();
        child.wait().unwrap();

        tokio::time::timeout(
            Duration::from_secs(2),
            wait_for_exit(pid, Duration::from_millis(50)),
        )
        .await
        .expect("watcher should notice the dead pid");
    }
}
