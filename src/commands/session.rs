use super::{generate_with_spinner, print_response, thinking_budget};
use crate::ai::context;
use crate::ai::gemini::GeminiGenerator;
use crate::ai::prompt_template::{PromptTemplate, ResponseLength};
use crate::ai::Generator;
use crate::cli::{Cli, INFO};
use crate::config::Config;
use crate::daemon::client::{DaemonClient, DaemonConnection};
use crate::daemon::identity::{parent_shell_pid, SessionAddress};
use crate::daemon::spawn::ExecutableSpawner;
use crate::error::Result;
use colored::*;

/// 한 번의 대화 요청
#[derive(Debug, Clone, Default)]
pub struct Turn {
    pub prompt: String,
    pub piped: Option<String>,
    pub length: Option<ResponseLength>,
    pub thinking_budget: u32,
}

/// 대화 요청 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// 파이프 입력만 context에 추가함 (생성 호출 없음)
    ContextAdded,
    /// 생성 응답
    Answered(String),
    /// 할 일이 없었음
    Nothing,
}

/// 데몬 연결 모드
pub async fn run(cli: &Cli, piped: Option<String>, config: &Config) -> Result<()> {
    let address = SessionAddress::for_shell(parent_shell_pid(), config);
    let spawner = ExecutableSpawner::current_exe(config.socket_dir())?;
    let client = DaemonClient::new(
        address,
        Box::new(spawner),
        config.connect_attempts,
        config.connect_retry_delay(),
    );

    let prompt = cli.prompt_text();
    if piped.is_none() && prompt.is_empty() && !cli.print && !cli.clear {
        report_status(&client).await;
        return Ok(());
    }

    let mut conn = client.connect_or_spawn().await?;

    let result = if cli.clear {
        conn.clear().await;
        Ok(())
    } else if cli.print {
        print_context(&mut conn).await;
        Ok(())
    } else {
        let turn = Turn {
            prompt,
            piped,
            length: cli.response_length(),
            thinking_budget: thinking_budget(cli, config),
        };
        let outcome = converse(&mut conn, &turn, || {
            Ok(Box::new(GeminiGenerator::from_env(config)?) as Box<dyn Generator>)
        })
        .await;
        if let Ok(TurnOutcome::ContextAdded) = outcome {
            println!("{}", "[Context Added]".green());
        }
        outcome.map(|_| ())
    };

    conn.close().await;
    result
}

/// 데몬 실행 여부만 확인 (데몬을 띄우지 않음)
pub async fn report_status(client: &DaemonClient) -> bool {
    println!("{} {}", "[Info]".cyan(), INFO);
    let running = client.probe().await;
    if running {
        println!("{} Daemon running", "[Info]".cyan());
    } else {
        println!("{} Daemon not running", "[Info]".cyan());
    }
    running
}

/// 저장된 context 출력
pub async fn print_context(conn: &mut DaemonConnection) {
    if let Some(data) = conn.get_context().await {
        let data = data.trim();
        if data.is_empty() {
            println!("(empty)");
        } else {
            println!("{}", data);
        }
    }
}

/// context를 읽고, 파이프 입력을 붙이고, 필요하면 생성 후 턴을 저장
///
/// 생성기는 실제로 호출이 필요할 때만 만듭니다 (파이프 입력만 있는 경우 API 키가 필요 없음).
/// `get`과 `set` 사이는 원자적이지 않아서, 동시에 실행된 두 호출 중 한쪽 턴이 사라질 수 있습니다.
pub async fn converse<F>(
    conn: &mut DaemonConnection,
    turn: &Turn,
    make_generator: F,
) -> Result<TurnOutcome>
where
    F: FnOnce() -> Result<Box<dyn Generator>>,
{
    let mut current = conn.get_context().await.unwrap_or_default();

    if let Some(piped) = &turn.piped {
        current = context::append_piped(&current, piped);
    }

    if turn.prompt.is_empty() {
        if turn.piped.is_none() {
            return Ok(TurnOutcome::Nothing);
        }
        conn.set_context(&current).await;
        return Ok(TurnOutcome::ContextAdded);
    }

    let generator = make_generator()?;

    let full_prompt = PromptTemplate::build(
        &PromptTemplate::system(turn.length),
        &current,
        &turn.prompt,
    );
    let response =
        generate_with_spinner(generator.as_ref(), &full_prompt, turn.thinking_budget).await;
    print_response(&response);

    let updated = context::append_turn(&current, &turn.prompt, &response);
    conn.set_context(&updated).await;

    Ok(TurnOutcome::Answered(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::server::DaemonServer;
    use crate::daemon::spawn::DaemonSpawner;
    use crate::error::PipeLlmError;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;

    struct NoSpawn;

    impl DaemonSpawner for NoSpawn {
        fn spawn(&self, _shell_pid: u32) -> Result<()> {
            Ok(())
        }
    }

    /// 받은 프롬프트를 기록하고 고정 응답을 돌려주는 생성기
    struct EchoGenerator {
        reply: String,
        seen: Arc<Mutex<Vec<(String, u32)>>>,
    }

    #[async_trait]
    impl Generator for EchoGenerator {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, full_prompt: &str, thinking_budget: u32) -> String {
            self.seen
                .lock()
                .unwrap()
                .push((full_prompt.to_string(), thinking_budget));
            self.reply.clone()
        }
    }

    fn start_daemon(dir: &TempDir) -> DaemonClient {
        let address = SessionAddress::in_dir(dir.path(), std::process::id());
        let daemon = DaemonServer::new(address.clone(), Duration::from_secs(5))
            .bind()
            .unwrap();
        tokio::spawn(daemon.serve(std::future::pending()));
        DaemonClient::new(address, Box::new(NoSpawn), 3, Duration::from_millis(10))
    }

    fn echo(reply: &str) -> (Arc<Mutex<Vec<(String, u32)>>>, impl FnOnce() -> Result<Box<dyn Generator>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let generator = EchoGenerator {
            reply: reply.to_string(),
            seen: Arc::clone(&seen),
        };
        (seen, move || Ok(Box::new(generator) as Box<dyn Generator>))
    }

    fn no_generator() -> Result<Box<dyn Generator>> {
        Err(PipeLlmError::MissingApiKey)
    }

    #[tokio::test]
    async fn test_piped_input_only_adds_context() {
        let dir = TempDir::new().unwrap();
        let client = start_daemon(&dir);
        let mut conn = client.connect_or_spawn().await.unwrap();

        let turn = Turn {
            piped: Some("error: disk full\n".to_string()),
            ..Turn::default()
        };
        let outcome = converse(&mut conn, &turn, no_generator).await.unwrap();

        assert_eq!(outcome, TurnOutcome::ContextAdded);
        assert_eq!(
            conn.get_context().await.as_deref(),
            Some("[Context]\nerror: disk full")
        );
    }

    #[tokio::test]
    async fn test_prompt_builds_request_and_saves_turn() {
        let dir = TempDir::new().unwrap();
        let client = start_daemon(&dir);
        let mut conn = client.connect_or_spawn().await.unwrap();
        conn.set_context("[Context]\nnotes").await;

        let (seen, generator) = echo("Forty-two.\n");
        let turn = Turn {
            prompt: "what is the answer?".to_string(),
            length: Some(ResponseLength::Short),
            thinking_budget: 4096,
            ..Turn::default()
        };
        let outcome = converse(&mut conn, &turn, generator).await.unwrap();

        assert_eq!(outcome, TurnOutcome::Answered("Forty-two.\n".to_string()));

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        let (full_prompt, budget) = &seen[0];
        assert_eq!(*budget, 4096);
        assert!(full_prompt.contains("Respond in 1-2 sentences."));
        assert!(full_prompt.ends_with(
            "[Context]\n[Context]\nnotes\n\n[Prompt]\nwhat is the answer?\n\n[Response]"
        ));

        assert_eq!(
            conn.get_context().await.as_deref(),
            Some("[Context]\nnotes\n\n[Prompt]\nwhat is the answer?\n\n[Response]\nForty-two.")
        );
    }

    #[tokio::test]
    async fn test_missing_generator_leaves_context_untouched() {
        let dir = TempDir::new().unwrap();
        let client = start_daemon(&dir);
        let mut conn = client.connect_or_spawn().await.unwrap();
        conn.set_context("before").await;

        let turn = Turn {
            prompt: "question".to_string(),
            piped: Some("extra".to_string()),
            ..Turn::default()
        };
        let result = converse(&mut conn, &turn, no_generator).await;

        assert!(matches!(result, Err(PipeLlmError::MissingApiKey)));
        assert_eq!(conn.get_context().await.as_deref(), Some("before"));
    }

    #[tokio::test]
    async fn test_turns_accumulate_across_invocations() {
        let dir = TempDir::new().unwrap();
        let client = start_daemon(&dir);

        for (prompt, reply) in [("first", "one"), ("second", "two")] {
            let mut conn = client.connect_or_spawn().await.unwrap();
            let (_, generator) = echo(reply);
            let turn = Turn {
                prompt: prompt.to_string(),
                ..Turn::default()
            };
            converse(&mut conn, &turn, generator).await.unwrap();
            conn.close().await;
        }

        let mut conn = client.connect_or_spawn().await.unwrap();
        assert_eq!(
            conn.get_context().await.as_deref(),
            Some("[Prompt]\nfirst\n\n[Response]\none\n\n[Prompt]\nsecond\n\n[Response]\ntwo")
        );
    }

    #[tokio::test]
    async fn test_status_reports_without_spawning() {
        let dir = TempDir::new().unwrap();
        let address = SessionAddress::in_dir(dir.path(), std::process::id());
        let client = DaemonClient::new(address.clone(), Box::new(NoSpawn), 1, Duration::from_millis(10));

        assert!(!report_status(&client).await);
        assert!(!address.path().exists());

        let running = start_daemon(&dir);
        assert!(report_status(&running).await);
    }
}
