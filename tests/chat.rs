use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::json;

use claude_chat::chat::{ChatClient, Role, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};

fn turns(client: &ChatClient) -> Vec<(Role, String)> {
    client
        .state()
        .messages()
        .iter()
        .map(|m| (m.role, m.content.clone()))
        .collect()
}

#[tokio::test]
async fn send_appends_user_then_assistant_with_fixed_parameters() {
    let server = MockServer::start_async().await;
    let relay = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/claude").json_body(json!({
                "model": "claude-3-opus-20240229",
                "max_tokens": 1024,
                "messages": [{"role": "user", "content": "Hello"}]
            }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"content": [{"type": "text", "text": "Hi there"}]}));
        })
        .await;

    let mut client = ChatClient::new(server.base_url(), DEFAULT_MODEL, DEFAULT_MAX_TOKENS);
    assert!(client.send_message("Hello").await);

    assert!(!client.state().is_loading());
    assert!(client.state().error().is_none());
    assert_eq!(
        turns(&client),
        vec![
            (Role::User, "Hello".to_string()),
            (Role::Assistant, "Hi there".to_string()),
        ]
    );
    relay.assert_async().await;
}

#[tokio::test]
async fn replays_the_full_history_on_every_turn() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/claude").json_body(json!({
                "model": "claude-3-opus-20240229",
                "max_tokens": 1024,
                "messages": [{"role": "user", "content": "Hello"}]
            }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"content": [{"type": "text", "text": "Hi there"}]}));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/claude").json_body(json!({
                "model": "claude-3-opus-20240229",
                "max_tokens": 1024,
                "messages": [
                    {"role": "user", "content": "Hello"},
                    {"role": "assistant", "content": "Hi there"},
                    {"role": "user", "content": "How are you?"}
                ]
            }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"content": [{"type": "text", "text": "Doing well"}]}));
        })
        .await;

    let mut client = ChatClient::new(server.base_url(), DEFAULT_MODEL, DEFAULT_MAX_TOKENS);
    assert!(client.send_message("Hello").await);
    assert!(client.send_message("How are you?").await);

    assert_eq!(client.state().messages().len(), 4);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn relay_error_is_recorded_and_conversation_kept() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/claude");
            then.status(429)
                .header("content-type", "application/json")
                .json_body(json!({"error": {"message": "rate limited"}}));
        })
        .await;

    let mut client = ChatClient::new(server.base_url(), DEFAULT_MODEL, DEFAULT_MAX_TOKENS);
    assert!(client.send_message("Hello").await);

    assert!(!client.state().is_loading());
    assert_eq!(turns(&client), vec![(Role::User, "Hello".to_string())]);
    let error = client.state().error().unwrap();
    assert!(error.contains("429"));
    assert!(error.contains("rate limited"));
}

#[tokio::test]
async fn unreachable_relay_is_a_plain_error_turn() {
    let mut client = ChatClient::new("http://127.0.0.1:1", DEFAULT_MODEL, DEFAULT_MAX_TOKENS);
    assert!(client.send_message("Hello").await);

    assert!(!client.state().is_loading());
    assert_eq!(client.state().messages().len(), 1);
    assert!(client
        .state()
        .error()
        .unwrap()
        .contains("could not reach relay"));
}

#[tokio::test]
async fn malformed_replies_degrade_to_the_placeholder() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/claude");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"unexpected": "shape"}));
        })
        .await;

    let mut client = ChatClient::new(server.base_url(), DEFAULT_MODEL, DEFAULT_MAX_TOKENS);
    assert!(client.send_message("Hello").await);

    assert!(client.state().error().is_none());
    let last = client.state().messages().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.content, "No response received");
}

#[tokio::test]
async fn non_json_success_body_degrades_to_the_placeholder() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/claude");
            then.status(200).body("not json at all");
        })
        .await;

    let mut client = ChatClient::new(server.base_url(), DEFAULT_MODEL, DEFAULT_MAX_TOKENS);
    assert!(client.send_message("Hello").await);

    assert!(client.state().error().is_none());
    assert_eq!(
        client.state().messages().last().unwrap().content,
        "No response received"
    );
}

#[tokio::test]
async fn blank_input_is_refused_without_a_relay_call() {
    let mut client = ChatClient::new("http://127.0.0.1:1", DEFAULT_MODEL, DEFAULT_MAX_TOKENS);
    assert!(!client.send_message("   ").await);

    assert!(client.state().messages().is_empty());
    assert!(!client.state().is_loading());
    assert!(client.state().error().is_none());
}
