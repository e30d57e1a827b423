pub mod daemon;
pub mod isolated;
pub mod session;

use crate::ai::Generator;
use crate::cli::Cli;
use crate::config::Config;
use crate::error::Result;
use crate::ui::create_spinner;
use std::io::{IsTerminal, Write};
use tokio::io::AsyncReadExt;

/// 클라이언트 모드 진입점
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let piped = read_piped_stdin().await?;

    if cli.isolated {
        isolated::run(&cli, piped, &config).await
    } else {
        session::run(&cli, piped, &config).await
    }
}

/// 표준 입력이 파이프일 때만 전부 읽음. 비어 있으면 `None`
async fn read_piped_stdin() -> Result<Option<String>> {
    if std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let mut buf = Vec::new();
    tokio::io::stdin().read_to_end(&mut buf).await?;
    let text = String::from_utf8_lossy(&buf).into_owned();

    Ok(Some(text).filter(|t| !t.trim().is_empty()))
}

/// 스피너를 띄운 채 생성 요청
async fn generate_with_spinner(
    generator: &dyn Generator,
    full_prompt: &str,
    thinking_budget: u32,
) -> String {
    let spinner = create_spinner("Thinking...");
    let response = generator.generate(full_prompt, thinking_budget).await;
    spinner.finish_and_clear();
    response
}

/// 응답 출력 (끝에 개행 보장)
fn print_response(response: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(response.as_bytes());
    if !response.ends_with('\n') {
        let _ = stdout.write_all(b"\n");
    }
    let _ = stdout.flush();
}

fn thinking_budget(cli: &Cli, config: &Config) -> u32 {
    if cli.thinking {
        config.thinking_budget
    } else {
        0
    }
}
