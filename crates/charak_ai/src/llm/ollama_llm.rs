use std::time::Duration;

use charak_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::{Llm, Prompt};
use crate::ollama::{self, OllamaClient};

#[derive(Debug, Clone)]
pub struct OllamaLlm {
    client: OllamaClient,
    model: String,
    timeout: Duration,
}

impl OllamaLlm {
    pub fn new(client: OllamaClient, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            model: model.into(),
            timeout,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

impl Llm for OllamaLlm {
    fn name(&self) -> &str {
        "ollama"
    }

    fn generate(&self, prompt: &Prompt) -> Result<String, AppError> {
        let url = format!("{}/api/chat", self.client.base_url());
        let req = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            stream: false,
        };

        let resp = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(serde_json::to_value(req).map_err(|e| {
                AppError::new("LLM_REQUEST_FAILED", "Failed to encode chat request")
                    .with_details(e.to_string())
            })?);

        match resp {
            Ok(r) if r.status() == 200 => {
                let v: ChatResponse = r.into_json().map_err(|e| {
                    AppError::new("LLM_REQUEST_FAILED", "Failed to decode chat response")
                        .with_details(e.to_string())
                })?;
                if v.message.content.trim().is_empty() {
                    return Err(AppError::new("LLM_EMPTY_RESPONSE", "Model response was empty"));
                }
                Ok(v.message.content)
            }
            Ok(r) => Err(AppError::new("LLM_REQUEST_FAILED", "Chat request failed")
                .with_details(format!("status={}", r.status()))),
            Err(ureq::Error::Status(code, _)) => Err(AppError::new(
                "LLM_REQUEST_FAILED",
                "Chat request failed",
            )
            .with_details(format!("status={code}; model={}", self.model))),
            Err(e) => Err(ollama::unreachable("LLM_OLLAMA_UNREACHABLE", e)),
        }
    }
}
