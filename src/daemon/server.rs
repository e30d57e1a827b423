use crate::daemon::identity::SessionAddress;
use crate::daemon::liveness;
use crate::daemon::protocol::{self, DaemonRequest};
use crate::daemon::session::SessionStore;
use crate::error::{PipeLlmError, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, info, warn};

/// 데몬이 serve 루프를 끝낸 이유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// 소유 shell이 사라짐
    OwnerExited,
    /// 종료 시그널 등 외부 요청
    Shutdown,
}

/// 데몬 서버 (bind 전)
pub struct DaemonServer {
    address: SessionAddress,
    session: Arc<SessionStore>,
    poll_interval: Duration,
}

impl DaemonServer {
    /// 새 데몬 서버 생성. 소유자는 주소의 shell pid입니다.
    pub fn new(address: SessionAddress, poll_interval: Duration) -> Self {
        let session = SessionStore::new(address.shell_pid());
        Self {
            address,
            session: Arc::new(session),
            poll_interval,
        }
    }

    /// socket을 bind
    ///
    /// 이전 데몬이 남긴 socket 파일은 지웁니다. 응답하는 데몬이 이미 있으면 에러입니다.
    pub fn bind(self) -> Result<BoundDaemon> {
        let path = self.address.path();

        if let Some(dir) = self.address.dir() {
            std::fs::create_dir_all(dir).map_err(|e| {
                PipeLlmError::ConfigError(format!(
                    "Failed to create socket directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        remove_stale_socket(path)?;

        let listener = UnixListener::bind(path).map_err(|e| {
            PipeLlmError::ConfigError(format!("Failed to bind socket {}: {}", path.display(), e))
        })?;
        let socket = SocketGuard {
            path: path.to_path_buf(),
        };

        info!(
            socket = %self.address,
            owner_pid = self.session.owner_pid(),
            "Daemon listening"
        );

        Ok(BoundDaemon {
            address: self.address,
            listener,
            socket,
            session: self.session,
            poll_interval: self.poll_interval,
        })
    }
}

/// bind가 끝나 연결을 받을 수 있는 데몬
pub struct BoundDaemon {
    address: SessionAddress,
    listener: UnixListener,
    socket: SocketGuard,
    session: Arc<SessionStore>,
    poll_interval: Duration,
}

impl BoundDaemon {
    pub fn address(&self) -> &SessionAddress {
        &self.address
    }

    /// 소유 shell이 사라지거나 `shutdown`이 완료될 때까지 연결을 처리
    ///
    /// 반환 시점에 listener는 닫히고 socket 파일은 삭제되어 있습니다.
    pub async fn serve<F>(self, shutdown: F) -> ExitReason
    where
        F: Future<Output = ()>,
    {
        let BoundDaemon {
            address,
            listener,
            socket,
            session,
            poll_interval,
        } = self;

        let owner_gone = liveness::wait_for_exit(session.owner_pid(), poll_interval);
        tokio::pin!(owner_gone);
        tokio::pin!(shutdown);

        let reason = loop {
            tokio::select! {
                _ = &mut owner_gone => break ExitReason::OwnerExited,
                _ = &mut shutdown => break ExitReason::Shutdown,
                accepted = listener.accept() => match accepted {
                    Ok((stream, _addr)) => {
                        let session = Arc::clone(&session);

                        // 각 연결을 별도 태스크로 처리
                        tokio::spawn(async move {
                            if let Err(e) = handle_client(stream, session).await {
                                debug!(error = %e, "Connection dropped");
                            }
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "Error accepting connection");
                    }
                },
            }
        };

        drop(listener);
        drop(socket);

        info!(socket = %address, ?reason, "Daemon stopped");
        reason
    }
}

/// 클라이언트 연결 처리
///
/// 연결이 닫힐 때까지 요청 하나를 읽고 응답 하나를 씁니다. 읽기/쓰기/파싱 실패는 이 연결만 끝냅니다.
async fn handle_client(stream: UnixStream, session: Arc<SessionStore>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    while let Some(request) = protocol::read_message::<DaemonRequest, _>(&mut reader).await? {
        debug!(action = request_action(&request), "Request received");
        let response = session.apply(request).await;
        protocol::write_message(&mut writer, &response).await?;
    }

    Ok(())
}

fn request_action(request: &DaemonRequest) -> &'static str {
    match request {
        DaemonRequest::Get => "get",
        DaemonRequest::Set { .. } => "set",
        DaemonRequest::Clear => "clear",
    }
}

/// SIGTERM, SIGINT, SIGHUP 핸들러를 지금 등록하고, 그중 하나를 받으면 완료되는 future 반환
///
/// socket이 보이기 전에 등록해야 그 사이에 온 시그널로 정리 없이 죽지 않습니다.
pub fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    let mut term = signal(SignalKind::terminate())?;
    let mut int = signal(SignalKind::interrupt())?;
    let mut hup = signal(SignalKind::hangup())?;

    Ok(async move {
        let name = tokio::select! {
            _ = term.recv() => "SIGTERM",
            _ = int.recv() => "SIGINT",
            _ = hup.recv() => "SIGHUP",
        };
        info!(signal = name, "Shutdown signal received");
    })
}

fn remove_stale_socket(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    if std::os::unix::net::UnixStream::connect(path).is_ok() {
        return Err(PipeLlmError::ConfigError(format!(
            "Another daemon is already serving {}",
            path.display()
        )));
    }

    debug!(path = %path.display(), "Removing stale socket");
    std::fs::remove_file(path).map_err(|e| {
        PipeLlmError::ConfigError(format!("Failed to remove existing socket: {}", e))
    })
}

/// drop 시 socket 파일 삭제 (정상 종료, 시그널, 패닉 unwind 모두)
struct SocketGuard {
    path: PathBuf,
}

impl Drop for SocketGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Socket removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove socket"),
        }
    }
}
