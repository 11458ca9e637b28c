use clap::Parser;

use claude_chat::chat::{ChatClient, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use claude_chat::error::Result;
use claude_chat::{logging, ui};

#[derive(Parser, Debug)]
#[command(name = "claude-chat")]
#[command(about = "Terminal chat client backed by the claude-chatd relay")]
struct Cli {
    #[arg(long, env = "CLAUDE_CHAT_RELAY_URL", default_value = "http://127.0.0.1:3001")]
    relay: String,

    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing("claude_chat");
    let cli = Cli::parse();

    let client = ChatClient::new(cli.relay, cli.model, cli.max_tokens);
    ui::run(client).await
}
