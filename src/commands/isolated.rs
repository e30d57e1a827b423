use super::{generate_with_spinner, print_response, thinking_budget};
use crate::ai::gemini::GeminiGenerator;
use crate::ai::prompt_template::PromptTemplate;
use crate::cli::Cli;
use crate::config::Config;
use crate::error::{PipeLlmError, Result};

/// 격리 모드: 데몬을 쓰지 않고, 파이프 입력만 일회성 context로 사용
pub async fn run(cli: &Cli, piped: Option<String>, config: &Config) -> Result<()> {
    let prompt = cli.prompt_text();
    if piped.is_none() && prompt.is_empty() {
        return Err(PipeLlmError::MissingInput);
    }

    let generator = GeminiGenerator::from_env(config)?;

    let context = piped.as_deref().map(str::trim).unwrap_or_default();
    let full_prompt = PromptTemplate::build(
        &PromptTemplate::system(cli.response_length()),
        context,
        &prompt,
    );

    let response =
        generate_with_spinner(&generator, &full_prompt, thinking_budget(cli, config)).await;
    print_response(&response);

    Ok(())
}
