//! PipeLLM: 같은 shell에서 실행한 `llm` 호출들이 하나의 대화를 이어가도록
//! shell마다 백그라운드 데몬을 띄워 context를 메모리에 보관합니다.

pub mod ai;
pub mod cli;
pub mod commands;
pub mod config;
pub mod daemon;
pub mod error;
pub mod logging;
pub mod ui;
