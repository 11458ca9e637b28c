use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_MODEL: &str = "claude-3-opus-20240229";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

const NO_RESPONSE_PLACEHOLDER: &str = "No response received";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Conversation state for one session. All mutation goes through
/// [`ChatState::begin_send`] and [`ChatState::complete_send`], which keep the
/// loading flag true exactly while a relay call is in flight and clear any
/// previous error when a new attempt starts.
#[derive(Debug, Default)]
pub struct ChatState {
    messages: Vec<ChatMessage>,
    is_loading: bool,
    error: Option<String>,
}

impl ChatState {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Appends the user message and marks the conversation busy. Refuses
    /// empty input and overlapping sends, leaving the state untouched.
    pub fn begin_send(&mut self, content: &str) -> bool {
        let content = content.trim();
        if self.is_loading || content.is_empty() {
            return false;
        }

        self.messages.push(ChatMessage {
            role: Role::User,
            content: content.to_string(),
        });
        self.is_loading = true;
        self.error = None;
        true
    }

    /// Resolves the in-flight send: a reply appends one assistant message, a
    /// failure records the error and leaves the conversation as it was.
    pub fn complete_send(&mut self, outcome: std::result::Result<String, String>) {
        self.is_loading = false;
        match outcome {
            Ok(reply) => self.messages.push(ChatMessage {
                role: Role::Assistant,
                content: reply,
            }),
            Err(message) => self.error = Some(message),
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [ChatMessage],
}

/// Chat client backed by the relay. Holds the session state and replays the
/// entire conversation to the relay on every turn; the relay has no session
/// memory of its own.
pub struct ChatClient {
    http: reqwest::Client,
    relay_url: String,
    model: String,
    max_tokens: u32,
    state: ChatState,
}

impl ChatClient {
    pub fn new(relay_url: impl Into<String>, model: impl Into<String>, max_tokens: u32) -> Self {
        let relay_url = relay_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            relay_url,
            model: model.into(),
            max_tokens,
            state: ChatState::default(),
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// Runs one full send: append the user message, call the relay, resolve
    /// the state with the reply or the failure. Returns false when the input
    /// was refused (empty, or a send already in flight).
    pub async fn send_message(&mut self, content: &str) -> bool {
        if !self.state.begin_send(content) {
            return false;
        }

        let outcome = self.request_completion().await;
        if let Err(message) = &outcome {
            tracing::warn!(error = %message, "chat turn failed");
        }
        self.state.complete_send(outcome);
        true
    }

    async fn request_completion(&self) -> std::result::Result<String, String> {
        let url = format!("{}/api/claude", self.relay_url);
        let payload = CompletionRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: self.state.messages(),
        };

        let response = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| format!("could not reach relay: {e}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("could not read relay response: {e}"))?;
        if !status.is_success() {
            return Err(format!("HTTP {status}: {body}"));
        }

        let value: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        Ok(extract_reply_text(&value))
    }
}

/// Pulls the assistant text out of an upstream reply without assuming its
/// shape: the structured content block first, then a top-level string
/// `content` or `message`, then a fixed placeholder. A malformed reply never
/// fails the turn.
fn extract_reply_text(value: &Value) -> String {
    if let Some(text) = value
        .get("content")
        .and_then(|content| content.get(0))
        .and_then(|block| block.get("text"))
        .and_then(|text| text.as_str())
    {
        return text.to_string();
    }

    if let Some(text) = value.get("content").and_then(|content| content.as_str()) {
        return text.to_string();
    }

    if let Some(text) = value.get("message").and_then(|message| message.as_str()) {
        return text.to_string();
    }

    NO_RESPONSE_PLACEHOLDER.to_string()
}
