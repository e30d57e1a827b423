use tracing_subscriber::EnvFilter;

/// 로그 필터를 지정하는 환경 변수 (`EnvFilter` 문법)
pub const LOG_ENV: &str = "PIPELLM_LOG";

/// 실행 모드별 기본 로그 레벨
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Client { debug: bool },
    Daemon,
}

fn default_directive(mode: LogMode) -> &'static str {
    match mode {
        LogMode::Client { debug: true } => "debug",
        LogMode::Client { debug: false } => "warn",
        LogMode::Daemon => "info",
    }
}

/// stderr로 로그 출력 초기화 (프로세스당 한 번)
pub fn init(mode: LogMode) {
    let filter = match mode {
        LogMode::Client { debug: true } => EnvFilter::new(default_directive(mode)),
        _ => EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(mode))),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directive(LogMode::Daemon), "info");
        assert_eq!(default_directive(LogMode::Client { debug: false }), "warn");
        assert_eq!(default_directive(LogMode::Client { debug: true }), "debug");
    }
}
