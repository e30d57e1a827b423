use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// 데몬으로 보내는 요청 (한 줄에 JSON 객체 하나)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum DaemonRequest {
    /// 현재 context 읽기
    Get,
    /// context 전체 교체
    Set {
        #[serde(default)]
        data: String,
    },
    /// context 비우기
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
}

/// 데몬의 응답: `get`은 `{"data": ...}`, `set`/`clear`는 `{"status": "ok"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DaemonResponse {
    Context { data: String },
    Status { status: Status },
}

impl DaemonResponse {
    pub fn ok() -> Self {
        DaemonResponse::Status { status: Status::Ok }
    }

    pub fn context(data: impl Into<String>) -> Self {
        DaemonResponse::Context { data: data.into() }
    }
}

impl DaemonRequest {
    /// JSON으로 직렬화
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// JSON에서 역직렬화
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl DaemonResponse {
    /// JSON으로 직렬화
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// JSON에서 역직렬화
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// 한 줄을 읽어 메시지로 파싱
///
/// 상대가 연결을 닫았으면 `Ok(None)`. 잘린 줄, 깨진 UTF-8, 잘못된 JSON은 에러입니다.
pub async fn read_message<T, R>(reader: &mut R) -> Result<Option<T>>
where
    T: DeserializeOwned,
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Ok(None);
    }
    if !line.ends_with('\n') {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "message truncated before newline",
        )
        .into());
    }
    Ok(Some(serde_json::from_str(line.trim_end())?))
}

/// 메시지를 JSON 한 줄로 쓰고 flush
pub async fn write_message<T, W>(writer: &mut W, message: &T) -> Result<()>
where
    T: Serialize,
    W: AsyncWrite + Unpin,
{
    let mut json = serde_json::to_string(message)?;
    json.push('\n');
    writer.write_all(json.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
