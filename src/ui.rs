use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::chat::{ChatClient, ChatMessage, Role};
use crate::error::{ClaudeChatError, Result};

const GREETING: &str = "Hi! Ask me anything to get started.";
const THINKING: &str = "(claude is thinking...)";

/// Line-oriented chat loop. Everything printed here is a projection of the
/// client's [`ChatState`](crate::chat::ChatState); the loop itself never
/// touches the conversation directly.
pub async fn run(mut client: ChatClient) -> Result<()> {
    if client.state().messages().is_empty() {
        println!("{GREETING}");
    }
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| ClaudeChatError::Runtime(e.to_string()))?
    {
        let input = line.trim();
        if input.is_empty() {
            prompt()?;
            continue;
        }

        println!("{THINKING}");
        client.send_message(input).await;
        render_turn(client.state().error(), client.state().messages().last());
        prompt()?;
    }

    Ok(())
}

fn render_turn(error: Option<&str>, latest: Option<&ChatMessage>) {
    if let Some(message) = error {
        println!("error: {message}");
        return;
    }
    if let Some(message) = latest {
        if message.role == Role::Assistant {
            println!("{}", render_message(message));
        }
    }
}

fn render_message(message: &ChatMessage) -> String {
    format!("{}> {}", role_label(message.role), message.content)
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Assistant => "claude",
    }
}

fn prompt() -> Result<()> {
    print!("you> ");
    std::io::stdout()
        .flush()
        .map_err(|e| ClaudeChatError::Runtime(e.to_string()))
}
