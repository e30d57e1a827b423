use crate::config::Config;
use std::fmt;
use std::path::{Path, PathBuf};

/// socket 파일 이름 prefix (`llm-daemon-<pid>.sock`)
pub const SOCKET_PREFIX: &str = "llm-daemon-";

/// 한 shell 세션의 데몬 주소
///
/// shell pid만으로 결정되므로 데몬과 클라이언트가 별도 합의 없이 같은 socket을 찾습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionAddress {
    shell_pid: u32,
    path: PathBuf,
}

impl SessionAddress {
    /// 주어진 디렉토리 안의 주소 (순수 함수)
    pub fn in_dir(dir: &Path, shell_pid: u32) -> Self {
        Self {
            shell_pid,
            path: dir.join(format!("{}{}.sock", SOCKET_PREFIX, shell_pid)),
        }
    }

    /// 설정의 socket 디렉토리 안의 주소
    pub fn for_shell(shell_pid: u32, config: &Config) -> Self {
        Self::in_dir(&config.socket_dir(), shell_pid)
    }

    pub fn shell_pid(&self) -> u32 {
        self.shell_pid
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> Option<&Path> {
        self.path.parent()
    }
}

impl fmt::Display for SessionAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// 현재 프로세스를 실행한 shell의 pid
pub fn parent_shell_pid() -> u32 {
    std::os::unix::process::parent_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_is_reproducible() {
        let dir = Path::new("/run/user/1000");
        assert_eq!(
            SessionAddress::in_dir(dir, 4242),
            SessionAddress::in_dir(dir, 4242)
        );
    }

    #[test]
    fn test_distinct_pids_never_collide() {
        let dir = Path::new("/tmp");
        let pids = [1u32, 2, 11, 12, 111, 4242, 42420, u32::MAX];
        for (i, a) in pids.iter().enumerate() {
            for b in pids.iter().skip(i + 1) {
                assert_ne!(
                    SessionAddress::in_dir(dir, *a).path(),
                    SessionAddress::in_dir(dir, *b).path()
                );
            }
        }
    }

    #[test]
    fn test_address_format() {
        let address = SessionAddress::in_dir(Path::new("/tmp/sockets"), 1234);
        assert_eq!(address.path(), Path::new("/tmp/sockets/llm-daemon-1234.sock"));
        assert_eq!(address.shell_pid(), 1234);
        assert_eq!(address.dir(), Some(Path::new("/tmp/sockets")));
    }

    #[test]
    fn test_parent_shell_pid_is_stable() {
        assert_eq!(parent_shell_pid(), parent_shell_pid());
        assert_ne!(parent_shell_pid(), std::process::id());
    }
}
