use crate::daemon::protocol::{DaemonRequest, DaemonResponse};
use tokio::sync::RwLock;

/// 한 shell의 대화 context
///
/// 데몬 프로세스마다 정확히 하나가 존재하며 디스크에 저장되지 않습니다.
/// 모든 읽기/쓰기는 하나의 lock을 거치므로 반쯤 쓰인 context는 관찰되지 않습니다.
#[derive(Debug)]
pub struct SessionStore {
    /// 이 세션을 소유한 shell pid
    owner_pid: u32,
    /// 누적된 prompt/response transcript
    context: RwLock<String>,
}

impl SessionStore {
    pub fn new(owner_pid: u32) -> Self {
        Self {
            owner_pid,
            context: RwLock::new(String::new()),
        }
    }

    pub fn owner_pid(&self) -> u32 {
        self.owner_pid
    }

    pub async fn get(&self) -> String {
        self.context.read().await.clone()
    }

    /// context 전체 교체 (last write wins)
    pub async fn set(&self, data: String) {
        *self.context.write().await = data;
    }

    pub async fn clear(&self) {
        self.context.write().await.clear();
    }

    /// 요청 하나를 처리하고 응답 생성
    pub async fn apply(&self, request: DaemonRequest) -> DaemonResponse {
        match request {
            DaemonRequest::Get => DaemonResponse::context(self.get().await),
            DaemonRequest::Set { data } => {
                self.set(data).await;
                DaemonResponse::ok()
            }
            DaemonRequest::Clear => {
                self.clear().await;
                DaemonResponse::ok()
            }
        }
    }
}
