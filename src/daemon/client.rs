use crate::daemon::identity::SessionAddress;
use crate::daemon::protocol::{self, DaemonRequest, DaemonResponse};
use crate::daemon::spawn::DaemonSpawner;
use crate::error::{PipeLlmError, Result};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tracing::{debug, info};

/// 데몬 클라이언트 (현재 shell의 데몬을 찾거나 띄움)
pub struct DaemonClient {
    address: SessionAddress,
    spawner: Box<dyn DaemonSpawner>,
    connect_attempts: u32,
    retry_delay: Duration,
}

impl DaemonClient {
    /// 새 클라이언트 생성
    pub fn new(
        address: SessionAddress,
        spawner: Box<dyn DaemonSpawner>,
        connect_attempts: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            address,
            spawner,
            connect_attempts,
            retry_delay,
        }
    }

    pub fn address(&self) -> &SessionAddress {
        &self.address
    }

    /// 데몬이 실행 중인지 확인 (연결 후 바로 닫음, 데몬을 띄우지 않음)
    pub async fn probe(&self) -> bool {
        match UnixStream::connect(self.address.path()).await {
            Ok(mut stream) => {
                let _ = stream.shutdown().await;
                true
            }
            Err(_) => false,
        }
    }

    /// 기존 데몬에 연결하고, 없으면 띄운 뒤 재시도
    pub async fn connect_or_spawn(&self) -> Result<DaemonConnection> {
        if let Ok(stream) = UnixStream::connect(self.address.path()).await {
            return Ok(DaemonConnection::new(stream));
        }

        info!(socket = %self.address, "Daemon not running, spawning");
        self.spawner.spawn(self.address.shell_pid())?;

        for attempt in 1..=self.connect_attempts {
            tokio::time::sleep(self.retry_delay).await;
            match UnixStream::connect(self.address.path()).await {
                Ok(stream) => {
                    debug!(attempt, "Connected to freshly spawned daemon");
                    return Ok(DaemonConnection::new(stream));
                }
                Err(e) => debug!(attempt, error = %e, "Daemon not reachable yet"),
            }
        }

        Err(PipeLlmError::DaemonUnavailable {
            attempts: self.connect_attempts,
        })
    }
}

/// 데몬과의 연결 하나
///
/// 요청을 보내고 응답을 받은 뒤에야 다음 요청을 보냅니다 (pipelining 없음).
/// 전송/프로토콜 실패는 "응답 없음"으로 처리됩니다.
pub struct DaemonConnection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl DaemonConnection {
    fn new(stream: UnixStream) -> Self {
        let (reader, writer) = stream.into_split();
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    /// 요청 전송 후 응답 한 줄 수신
    pub async fn send_request(&mut self, request: &DaemonRequest) -> Result<Option<DaemonResponse>> {
        protocol::write_message(&mut self.writer, request).await?;
        protocol::read_message(&mut self.reader).await
    }

    /// 현재 context. 응답이 없거나 잘못되면 `None`
    pub async fn get_context(&mut self) -> Option<String> {
        match self.recover(&DaemonRequest::Get).await? {
            DaemonResponse::Context { data } => Some(data),
            DaemonResponse::Status { .. } => None,
        }
    }

    /// context 교체. 데몬이 확인했으면 `true`
    pub async fn set_context(&mut self, data: &str) -> bool {
        let request = DaemonRequest::Set {
            data: data.to_string(),
        };
        matches!(
            self.recover(&request).await,
            Some(DaemonResponse::Status { .. })
        )
    }

    /// context 비우기. 데몬이 확인했으면 `true`
    pub async fn clear(&mut self) -> bool {
        matches!(
            self.recover(&DaemonRequest::Clear).await,
            Some(DaemonResponse::Status { .. })
        )
    }

    /// 연결 종료
    pub async fn close(mut self) {
        let _ = self.writer.shutdown().await;
    }

    async fn recover(&mut self, request: &DaemonRequest) -> Option<DaemonResponse> {
        match self.send_request(request).await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "Daemon exchange failed");
                None
            }
        }
    }
}
