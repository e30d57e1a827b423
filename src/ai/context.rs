//! 대화 context(transcript) 누적 규칙
//!
//! 데몬은 context를 단순 문자열로만 다루고, 형식은 여기서 정합니다.

/// 파이프로 받은 입력을 `[Context]` 블록으로 덧붙임
pub fn append_piped(context: &str, piped: &str) -> String {
    let block = format!("[Context]\n{}", piped.trim());
    join_blocks(context, &block)
}

/// 질문/응답 한 턴을 덧붙임
pub fn append_turn(context: &str, prompt: &str, response: &str) -> String {
    let block = format!("[Prompt]\n{}\n\n[Response]\n{}", prompt, response.trim());
    join_blocks(context, &block)
}

fn join_blocks(context: &str, block: &str) -> String {
    if context.is_empty() {
        block.to_string()
    } else {
        format!("{}\n\n{}", context, block)
    }
}
