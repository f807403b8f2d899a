use std::time::Duration;

use charak_core::error::AppError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Llm, Prompt};

const API_VERSION: &str = "2023-06-01";

/// Hosted Messages API backend. The key is read from the environment on
/// every call so a rotated key takes effect without a restart.
#[derive(Debug, Clone)]
pub struct AnthropicLlm {
    api_url: String,
    api_key_env: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl AnthropicLlm {
    pub fn new(
        api_url: impl Into<String>,
        api_key_env: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key_env: api_key_env.into(),
            model: model.into(),
            max_tokens,
            timeout,
        }
    }

    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    fn api_key(&self) -> Result<String, AppError> {
        match std::env::var(&self.api_key_env) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(AppError::new(
                "CONFIG_MISSING_CREDENTIAL",
                format!("API key not found. Please set {} in the environment.", self.api_key_env),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

impl Llm for AnthropicLlm {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn check_ready(&self) -> Result<(), AppError> {
        self.api_key().map(|_| ())
    }

    fn generate(&self, prompt: &Prompt) -> Result<String, AppError> {
        let key = self.api_key()?;
        let req = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: &prompt.system,
            messages: vec![Message {
                role: "user",
                content: &prompt.user,
            }],
        };
        debug!(model = %self.model, "messages request");

        let body = serde_json::to_value(req).map_err(|e| {
            AppError::new("LLM_REQUEST_FAILED", "Failed to encode messages request")
                .with_details(e.to_string())
        })?;
        let resp = ureq::post(&self.api_url)
            .timeout(self.timeout)
            .set("x-api-key", &key)
            .set("anthropic-version", API_VERSION)
            .send_json(body);

        match resp {
            Ok(r) => {
                let v: MessagesResponse = r.into_json().map_err(|e| {
                    AppError::new("LLM_REQUEST_FAILED", "Failed to decode messages response")
                        .with_details(e.to_string())
                })?;
                let text: String = v
                    .content
                    .into_iter()
                    .filter_map(|b| b.text)
                    .collect::<Vec<_>>()
                    .join("");
                if text.trim().is_empty() {
                    return Err(AppError::new("LLM_EMPTY_RESPONSE", "Model response was empty"));
                }
                Ok(text)
            }
            Err(ureq::Error::Status(code, r)) if code == 401 || code == 403 => {
                let body = r.into_string().unwrap_or_default();
                Err(AppError::new("LLM_AUTH_FAILED", "Hosted model rejected the API key")
                    .with_details(format!("status={code}; env={}; body={body}", self.api_key_env)))
            }
            Err(ureq::Error::Status(code, r)) => {
                let body = r.into_string().unwrap_or_default();
                Err(AppError::new("LLM_REQUEST_FAILED", "Hosted model request failed")
                    .with_details(format!("status={code}; body={body}"))
                    .with_retryable(code == 429 || code >= 500))
            }
            Err(e) => Err(AppError::new("LLM_UNREACHABLE", "Failed to reach hosted model API")
                .with_details(e.to_string())
                .with_retryable(true)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_names_the_variable() {
        let llm = AnthropicLlm::new(
            "http://127.0.0.1:9/v1/messages",
            "CHARAK_TEST_UNSET_KEY_7F3A",
            "m",
            16,
            Duration::from_secs(1),
        );
        let err = llm.check_ready().expect_err("unset");
        assert_eq!(err.code, "CONFIG_MISSING_CREDENTIAL");
        assert!(err.message.contains("CHARAK_TEST_UNSET_KEY_7F3A"));

        let prompt = Prompt {
            system: "s".to_string(),
            user: "u".to_string(),
        };
        let err = llm.generate(&prompt).expect_err("unset");
        assert_eq!(err.code, "CONFIG_MISSING_CREDENTIAL");
    }
}
