use clap::Parser;
use colored::*;

use pipellm::cli::Cli;
use pipellm::commands;
use pipellm::logging::{self, LogMode};

#[tokio::main]
async fn main() {
    // 데몬 모드: 클라이언트가 환경 변수와 함께 다시 실행한 경우
    if commands::daemon::daemon_mode_requested() {
        logging::init(LogMode::Daemon);
        if let Err(e) = commands::daemon::run_daemon().await {
            tracing::error!(error = %e, "Daemon failed");
            std::process::exit(1);
        }
        return;
    }

    let cli = Cli::parse();
    logging::init(LogMode::Client { debug: cli.debug });

    let result = tokio::select! {
        result = commands::run(cli) => result,
        Ok(()) = tokio::signal::ctrl_c() => {
            println!("\nInterrupted.");
            std::process::exit(130);
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "[Error]".red(), e);
        std::process::exit(1);
    }
}
