use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{BotClientError, Result};
use crate::interface::{ChatTarget, FileKind, MessageHandle, ProgressSink, Transport};
use crate::upload_progress_stream::{progress_file_stream, UPLOAD_STREAM_BLOCK_SIZE};

const DEFAULT_API_ENDPOINT: &str = "https://api.telegram.org";

/// Status texts carry light HTML markup.
const PARSE_MODE: &str = "HTML";

/// Upper bound on flood-wait retries of a whole send call. Progress-edit
/// flood waits are handled by the caller's sink, not here.
const MAX_SEND_ATTEMPTS: usize = 3;

/// API identifier/secret pair, passed in explicitly by the caller. The
/// client never reads process environment state.
#[derive(Clone)]
pub struct BotCredentials {
    pub api_id: u64,
    pub api_hash: String,
}

impl BotCredentials {
    /// The bearer token the HTTP API expects: `<api_id>:<api_hash>`.
    pub fn token(&self) -> String {
        format!("{}:{}", self.api_id, self.api_hash)
    }
}

impl fmt::Debug for BotCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotCredentials")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .finish()
    }
}

/// builds the client to talk to the Bot API over HTTPS.
pub struct BotApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl BotApiClient {
    pub fn new(credentials: &BotCredentials) -> Result<Self> {
        Self::with_endpoint(DEFAULT_API_ENDPOINT, credentials)
    }

    /// Endpoint override, used to point at a local test server.
    pub fn with_endpoint(endpoint: &str, credentials: &BotCredentials) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: format!("{}/bot{}", endpoint.trim_end_matches('/'), credentials.token()),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }
}

/// Standard Bot API response envelope. Failures carry a human-readable
/// description; flood control additionally carries `parameters.retry_after`.
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiEnvelope<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Deserialize, Default)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct ApiMessage {
    message_id: i64,
}

impl<T> ApiEnvelope<T> {
    fn into_result(self) -> Result<T> {
        if self.ok {
            return self
                .result
                .ok_or_else(|| BotClientError::MalformedResponse("ok response without result".to_owned()));
        }

        if let Some(retry_after) = self.parameters.and_then(|p| p.retry_after) {
            return Err(BotClientError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        Err(BotClientError::Api(
            self.description.unwrap_or_else(|| "unknown error".to_owned()),
        ))
    }
}

async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let envelope: ApiEnvelope<T> = response.json().await?;
    envelope.into_result()
}

/// The `chat_id` form field: numeric id as digits, username with a leading @.
fn chat_id_field(chat: &ChatTarget) -> String {
    match chat {
        ChatTarget::Id(id) => id.to_string(),
        ChatTarget::Username(name) => format!("@{name}"),
    }
}

#[async_trait::async_trait]
impl Transport for BotApiClient {
    async fn send_message(&self, chat: &ChatTarget, text: &str, topic: Option<i64>) -> Result<MessageHandle> {
        let mut payload = serde_json::json!({
            "chat_id": chat.to_json_value(),
            "text": text,
            "parse_mode": PARSE_MODE,
        });
        if let Some(topic) = topic {
            payload["message_thread_id"] = topic.into();
        }

        let response = self.http.post(self.method_url("sendMessage")).json(&payload).send().await?;
        let message: ApiMessage = read_response(response).await?;

        Ok(MessageHandle {
            chat: chat.clone(),
            message_id: message.message_id,
        })
    }

    async fn edit_message(&self, handle: &MessageHandle, text: &str) -> Result<()> {
        let payload = serde_json::json!({
            "chat_id": handle.chat.to_json_value(),
            "message_id": handle.message_id,
            "text": text,
            "parse_mode": PARSE_MODE,
        });

        let response = self
            .http
            .post(self.method_url("editMessageText"))
            .json(&payload)
            .send()
            .await?;

        // The edit result payload itself is of no interest.
        read_response::<serde_json::Value>(response).await.map(|_| ())
    }

    async fn send_file(
        &self,
        kind: FileKind,
        path: &Path,
        caption: &str,
        chat: &ChatTarget,
        topic: Option<i64>,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<()> {
        let (method, part_name) = match kind {
            FileKind::Video => ("sendVideo", "video"),
            FileKind::Audio => ("sendAudio", "audio"),
            FileKind::Document => ("sendDocument", "document"),
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_owned());

        for attempt in 1usize.. {
            // A fresh handle per attempt; it is owned by the request body and
            // dropped on every exit path, so retries never leak it.
            let file = tokio::fs::File::open(path).await?;
            let total_bytes = file.metadata().await?.len();

            let stream = progress_file_stream(file, total_bytes, progress.clone(), UPLOAD_STREAM_BLOCK_SIZE);
            let file_part = Part::stream_with_length(Body::wrap_stream(stream), total_bytes).file_name(file_name.clone());

            let mut form = Form::new()
                .text("chat_id", chat_id_field(chat))
                .text("caption", caption.to_owned())
                .text("parse_mode", PARSE_MODE)
                .part(part_name, file_part);
            if let Some(topic) = topic {
                form = form.text("message_thread_id", topic.to_string());
            }

            let response = self.http.post(self.method_url(method)).multipart(form).send().await?;

            match read_response::<serde_json::Value>(response).await {
                Ok(_) => {
                    debug!(file = %path.display(), method, "file sent");
                    return Ok(());
                },
                Err(BotClientError::RateLimited { retry_after }) if attempt < MAX_SEND_ATTEMPTS => {
                    warn!(
                        file = %path.display(),
                        wait_secs = retry_after.as_secs(),
                        attempt,
                        "send flood-controlled, waiting before retry"
                    );
                    tokio::time::sleep(retry_after).await;
                },
                Err(e) => return Err(e),
            }
        }

        unreachable!("send loop exits via return on success or final failure");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> ApiEnvelope<ApiMessage> {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn ok_envelope_yields_result() {
        let envelope = parse(r#"{"ok": true, "result": {"message_id": 7}}"#);
        assert_eq!(envelope.into_result().unwrap().message_id, 7);
    }

    #[test]
    fn flood_control_maps_to_rate_limited() {
        let envelope = parse(
            r#"{"ok": false, "error_code": 429, "description": "Too Many Requests: retry after 14",
                "parameters": {"retry_after": 14}}"#,
        );
        match envelope.into_result() {
            Err(BotClientError::RateLimited { retry_after }) => {
                assert_eq!(retry_after, Duration::from_secs(14));
            },
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[test]
    fn other_failures_map_to_api_error() {
        let envelope = parse(r#"{"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}"#);
        match envelope.into_result() {
            Err(BotClientError::Api(description)) => {
                assert!(description.contains("chat not found"));
            },
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn ok_without_result_is_malformed() {
        let envelope = parse(r#"{"ok": true}"#);
        assert!(matches!(envelope.into_result(), Err(BotClientError::MalformedResponse(_))));
    }

    #[test]
    fn chat_id_field_forms() {
        assert_eq!(chat_id_field(&ChatTarget::Id(-100123)), "-100123");
        assert_eq!(chat_id_field(&ChatTarget::Username("mychannel".into())), "@mychannel");
    }
}
