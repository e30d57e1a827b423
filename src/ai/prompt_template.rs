/// 모든 요청에 붙는 기본 시스템 지시문
pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant.\n\
Be concise and direct in your responses. NEVER use markdown formatting - use plain text only.";

/// 응답 길이 힌트 (-s / -m / -l)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseLength {
    Short,
    Medium,
    Long,
}

impl ResponseLength {
    pub fn instruction(self) -> &'static str {
        match self {
            ResponseLength::Short => "Respond in 1-2 sentences.",
            ResponseLength::Medium => "Respond in 3-5 sentences.",
            ResponseLength::Long => "Respond in 2-3 paragraphs.",
        }
    }
}

/// 생성 요청용 프롬프트 조립기
pub struct PromptTemplate;

impl PromptTemplate {
    /// 시스템 지시문 (+ 길이 힌트)
    pub fn system(length: Option<ResponseLength>) -> String {
        match length {
            Some(length) => format!("{}\n{}", SYSTEM_PROMPT, length.instruction()),
            None => SYSTEM_PROMPT.to_string(),
        }
    }

    /// 시스템 지시문, context, 사용자 프롬프트를 하나의 요청 문자열로 조립
    ///
    /// context가 비어 있으면 `[Context]` 블록을 생략합니다.
    ///
    /// # Examples
    /// ```
    /// use pipellm::ai::prompt_template::PromptTemplate;
    ///
    /// let prompt = PromptTemplate::build("SYSTEM", "", "hi");
    /// assert_eq!(prompt, "SYSTEM\n\n[Prompt]\nhi\n\n[Response]");
    /// ```
    pub fn build(system: &str, context: &str, prompt: &str) -> String {
        if context.is_empty() {
            format!("{}\n\n[Prompt]\n{}\n\n[Response]", system, prompt)
        } else {
            format!(
                "{}\n\n[Context]\n{}\n\n[Prompt]\n{}\n\n[Response]",
                system, context, prompt
            )
        }
    }
}
