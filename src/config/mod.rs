use crate::error::{PipeLlmError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// socket 디렉토리를 덮어쓰는 환경 변수 (데몬 spawn 시에도 전달됨)
pub const SOCKET_DIR_ENV: &str = "PIPELLM_SOCKET_DIR";

/// pipellm 사용자 설정
///
/// 설정 파일은 ~/.pipellm/config.toml에 저장됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gemini 모델 이름
    #[serde(default = "default_model")]
    pub model: String,

    /// Gemini REST API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// --thinking 사용 시 thinking 토큰 예산
    #[serde(default = "default_thinking_budget")]
    pub thinking_budget: u32,

    /// 생성 요청 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// 데몬이 부모 shell 생존 여부를 확인하는 주기 (초)
    #[serde(default = "default_liveness_poll")]
    pub liveness_poll_secs: u64,

    /// 데몬 spawn 후 연결 재시도 횟수
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,

    /// 연결 재시도 간격 (밀리초)
    #[serde(default = "default_connect_retry_ms")]
    pub connect_retry_ms: u64,

    /// socket 파일을 둘 디렉토리 (미지정 시 런타임 디렉토리)
    #[serde(default)]
    pub socket_dir: Option<String>,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_thinking_budget() -> u32 {
    4096
}

fn default_request_timeout() -> u64 {
    60
}

fn default_liveness_poll() -> u64 {
    5
}

fn default_connect_attempts() -> u32 {
    20
}

fn default_connect_retry_ms() -> u64 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            thinking_budget: default_thinking_budget(),
            request_timeout_secs: default_request_timeout(),
            liveness_poll_secs: default_liveness_poll(),
            connect_attempts: default_connect_attempts(),
            connect_retry_ms: default_connect_retry_ms(),
            socket_dir: None,
        }
    }
}

impl Config {
    /// 설정 파일 경로 가져오기
    fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| {
            PipeLlmError::ConfigError("Could not find home directory".to_string())
        })?;
        Ok(home.join(".pipellm").join("config.toml"))
    }

    /// 설정 파일에서 로드 (없으면 기본값 사용)
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            PipeLlmError::ConfigError(format!("Invalid config file: {}", e))
        })
    }

    /// socket 디렉토리 결정
    ///
    /// 우선순위: `PIPELLM_SOCKET_DIR` > 설정 파일 > `$XDG_RUNTIME_DIR` > 시스템 임시 디렉토리
    pub fn socket_dir(&self) -> PathBuf {
        if let Some(dir) = std::env::var_os(SOCKET_DIR_ENV).filter(|d| !d.is_empty()) {
            return PathBuf::from(dir);
        }
        if let Some(dir) = self.socket_dir.as_deref().filter(|d| !d.is_empty()) {
            return PathBuf::from(dir);
        }
        dirs::runtime_dir().unwrap_or_else(std::env::temp_dir)
    }

    pub fn liveness_poll_interval(&self) -> Duration {
        Duration::from_secs(self.liveness_poll_secs.max(1))
    }

    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_millis(self.connect_retry_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
