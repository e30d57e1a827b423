use crate::ai::prompt_template::ResponseLength;
use clap::Parser;

pub const INFO: &str = "PipeLLM - per-shell conversation memory for LLM prompts";

#[derive(Parser, Debug, Default)]
#[command(name = "llm")]
#[command(version)]
#[command(about = INFO, long_about = None)]
#[command(after_help = "Context information can be inputted via the standard input.")]
pub struct Cli {
    /// Prompt text
    pub prompt: Vec<String>,

    /// 1-2 sentence response
    #[arg(short = 's', long, conflicts_with_all = ["medium", "long"])]
    pub short: bool,

    /// 3-5 sentence response
    #[arg(short = 'm', long, conflicts_with = "long")]
    pub medium: bool,

    /// 2-3 paragraphs
    #[arg(short = 'l', long)]
    pub long: bool,

    /// Enable extended thinking
    #[arg(short = 't', long)]
    pub thinking: bool,

    /// Clear context and history
    #[arg(short = 'c', long)]
    pub clear: bool,

    /// Print current context and history
    #[arg(short = 'p', long = "print")]
    pub print: bool,

    /// Isolated mode: ignore and don't save context
    #[arg(short = 'i', long)]
    pub isolated: bool,

    /// Debug logging on stderr
    #[arg(short = 'd', long)]
    pub debug: bool,
}

impl Cli {
    pub fn prompt_text(&self) -> String {
        self.prompt.join(" ").trim().to_string()
    }

    pub fn response_length(&self) -> Option<ResponseLength> {
        if self.short {
            Some(ResponseLength::Short)
        } else if self.medium {
            Some(ResponseLength::Medium)
        } else if self.long {
            Some(ResponseLength::Long)
        } else {
            None
        }
    }
}
