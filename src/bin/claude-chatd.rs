use std::path::PathBuf;

use clap::Parser;

use claude_chat::config::{RelayConfig, RunMode};
use claude_chat::error::Result;
use claude_chat::{logging, relay};

#[derive(Parser, Debug)]
#[command(name = "claude-chatd")]
#[command(about = "Credential-guarding relay between the chat client and the Anthropic API")]
struct Cli {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, env = "PORT", default_value_t = 3001)]
    port: u16,

    #[arg(long, env = "CLAUDE_CHAT_ENV", default_value_t = RunMode::Development)]
    mode: RunMode,

    #[arg(long, env = "CLAUDE_CHAT_STATIC_DIR", default_value = "dist")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing("claude_chatd");
    let cli = Cli::parse();

    // Refuses to start without the credential, before any port is bound.
    let config = RelayConfig::from_env(cli.mode, cli.static_dir)?;

    relay::run(&cli.host, cli.port, config).await
}
