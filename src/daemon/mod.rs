//! shell 하나당 하나씩 뜨는 세션 데몬
//!
//! - `identity`: shell pid → socket 주소
//! - `protocol`: 줄 단위 JSON 요청/응답
//! - `session`: 메모리에만 있는 대화 context
//! - `server`: socket bind, 연결 처리, 소유 shell 감시
//! - `client`: 데몬 탐색/자동 실행과 요청 전송

pub mod client;
pub mod identity;
pub mod liveness;
pub mod protocol;
pub mod server;
pub mod session;
pub mod spawn;
