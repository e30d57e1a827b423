// 데몬 자동 실행
//
// 같은 실행 파일을 데몬 모드 환경 변수와 함께 다시 실행합니다.
// 자식은 별도 프로세스 그룹에서 돌고 표준 입출력은 모두 /dev/null 입니다.

use crate::config::SOCKET_DIR_ENV;
use crate::error::{PipeLlmError, Result};
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// 데몬 모드를 켜는 환경 변수 (`1`이면 데몬으로 실행)
pub const DAEMON_ENV: &str = "LLM_DAEMON";
/// 데몬이 감시할 shell pid를 전달하는 환경 변수
pub const SHELL_PID_ENV: &str = "LLM_SHELL_PID";

/// 데몬 프로세스를 띄우는 방법
pub trait DaemonSpawner: Send + Sync {
    /// `shell_pid`를 소유자로 하는 데몬을 띄움. 데몬이 준비될 때까지 기다리지 않습니다.
    fn spawn(&self, shell_pid: u32) -> Result<()>;
}

/// 현재 실행 파일을 데몬 모드로 다시 실행하는 spawner
pub struct ExecutableSpawner {
    executable: PathBuf,
    socket_dir: PathBuf,
}

impl ExecutableSpawner {
    pub fn new(executable: PathBuf, socket_dir: PathBuf) -> Self {
        Self {
            executable,
            socket_dir,
        }
    }

    /// 현재 실행 중인 바이너리 사용
    pub fn current_exe(socket_dir: PathBuf) -> Result<Self> {
        let executable = std::env::current_exe().map_err(|e| {
            PipeLlmError::SpawnError(format!("Failed to determine current executable: {}", e))
        })?;
        Ok(Self::new(executable, socket_dir))
    }
}

impl DaemonSpawner for ExecutableSpawner {
    fn spawn(&self, shell_pid: u32) -> Result<()> {
        let child = Command::new(&self.executable)
            .env(DAEMON_ENV, "1")
            .env(SHELL_PID_ENV, shell_pid.to_string())
            .env(SOCKET_DIR_ENV, &self.socket_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0)
            .spawn()
            .map_err(|e| {
                PipeLlmError::SpawnError(format!("{}: {}", self.executable.display(), e))
            })?;

        // Child를 drop해도 프로세스는 계속 실행됨 (wait하지 않음)
        debug!(
            pid = child.id(),
            shell_pid,
            exe = %self.executable.display(),
            "Daemon process spawned"
        );
        Ok(())
    }
}
