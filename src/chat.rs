use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ChatRequest {
    message: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

/// HTTP client for the chat backend. One `POST {base_url}/chat` per user
/// message; no retry, no timeout, no cancellation.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Send one user message and return the reply text from the backend's
    /// `response` field. The credential from sign-in is deliberately not
    /// attached; the backend does not expect it.
    pub async fn send(&self, message: &str) -> Result<String> {
        let url = format!("{}/chat", self.base_url);

        let request = ChatRequest {
            message: message.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "chat request failed with status: {}",
                response.status()
            ));
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_returns_reply_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "message": "hello"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response":"hi there"}"#)
            .create_async()
            .await;

        let client = ChatClient::new(&server.url());
        let reply = client.send("hello").await.unwrap();

        assert_eq!(reply, "hi there");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn send_errors_on_server_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat")
            .with_status(500)
            .create_async()
            .await;

        let client = ChatClient::new(&server.url());
        let result = client.send("ping").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn send_errors_on_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"unexpected":"shape"}"#)
            .create_async()
            .await;

        let client = ChatClient::new(&server.url());
        let result = client.send("ping").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn send_passes_text_through_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "message": "  spaced out  "
            })))
            .with_status(200)
            .with_body(r#"{"response":"ok"}"#)
            .create_async()
            .await;

        let client = ChatClient::new(&server.url());
        client.send("  spaced out  ").await.unwrap();

        mock.assert_async().await;
    }
}
