use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::traits::ChatBackend;
use super::types::{ChatReply, ChatRequest, InitResponse};
use crate::app::BackendConfig;
use crate::constants::{CHAT_PATH, HEALTH_PATH, INIT_PATH};
use crate::utils::AssistantError;

/// reqwest-backed client for the scheduling backend
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a new client from backend configuration
    pub fn new(config: &BackendConfig) -> Result<Self, AssistantError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder
                .build()
                .map_err(|e| AssistantError::Config(e.to_string()))?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check that the backend answers at all
    pub async fn ping(&self) -> Result<bool, AssistantError> {
        let response = self.client.get(self.endpoint(HEALTH_PATH)).send().await?;
        Ok(response.status().is_success())
    }
}

/// Turn a raw response into a typed body, treating non-success as failure
async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, AssistantError> {
    let status = response.status();
    if !status.is_success() {
        return Err(AssistantError::Status(status.as_u16()));
    }

    let body = response.text().await?;
    decode_body(&body)
}

fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, AssistantError> {
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn init_session(&self) -> Result<InitResponse, AssistantError> {
        let url = self.endpoint(INIT_PATH);
        debug!(%url, "initializing session");

        let response = self.client.get(&url).send().await?;
        let init: InitResponse = decode_response(response).await?;

        if init.session_id.trim().is_empty() || init.user_id.trim().is_empty() {
            return Err(AssistantError::MalformedPayload(
                "session identity is empty".to_string(),
            ));
        }

        Ok(init)
    }

    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply, AssistantError> {
        let url = self.endpoint(CHAT_PATH);
        debug!(%url, session_id = %request.session_id, "sending message");

        let response = self.client.post(&url).json(request).send().await?;
        decode_response(response).await
    }
}
