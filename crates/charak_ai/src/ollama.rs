use std::time::Duration;

use charak_core::error::AppError;

#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
}

impl OllamaClient {
    /// Create a client for the local Ollama daemon. This is strictly limited to `127.0.0.1`.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let rest = match base_url.strip_prefix("http://127.0.0.1") {
            Some(rest) => rest,
            None => return Err(remote_not_allowed(&base_url)),
        };
        if !rest.is_empty() {
            // Only an explicit, valid, non-zero port may follow the host.
            let port = rest
                .strip_prefix(':')
                .and_then(|p| p.parse::<u16>().ok())
                .filter(|p| *p != 0);
            if port.is_none() {
                return Err(remote_not_allowed(&base_url));
            }
        }

        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health_check(&self) -> Result<(), AppError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = ureq::get(&url).timeout(Duration::from_millis(800)).call();

        match resp {
            Ok(r) if r.status() == 200 => Ok(()),
            Ok(r) => Err(
                AppError::new("LLM_OLLAMA_UNHEALTHY", "Ollama health check failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(e) => Err(unreachable("LLM_OLLAMA_UNREACHABLE", e)),
        }
    }
}

pub(crate) fn unreachable(code: &str, e: ureq::Error) -> AppError {
    AppError::new(
        code,
        "Failed to reach Ollama on 127.0.0.1; make sure it is running (`ollama serve`)",
    )
    .with_details(e.to_string())
    .with_retryable(true)
}

fn remote_not_allowed(base_url: &str) -> AppError {
    AppError::new(
        "CONFIG_REMOTE_NOT_ALLOWED",
        "Ollama base URL must be localhost (127.0.0.1)",
    )
    .with_details(format!("base_url={base_url}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enforces_localhost_only_base_url() {
        assert!(OllamaClient::new("http://127.0.0.1:11434").is_ok());
        assert!(OllamaClient::new("http://127.0.0.1").is_ok());
        assert!(OllamaClient::new("http://127.0.0.1:11434/").is_ok());

        assert!(OllamaClient::new("http://localhost:11434").is_err());
        assert!(OllamaClient::new("http://0.0.0.0:11434").is_err());
        assert!(OllamaClient::new("https://example.com").is_err());
        assert!(OllamaClient::new("http://127.0.0.1.evil.com:11434").is_err());
        assert!(OllamaClient::new("http://127.0.0.1@evil.com:11434").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:0").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:99999").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:11434/api").is_err());
    }

    #[test]
    fn rejection_is_a_configuration_error() {
        let err = OllamaClient::new("http://10.0.0.5:11434").expect_err("remote");
        assert_eq!(err.category(), charak_core::error::ErrorCategory::Configuration);
        assert_eq!(err.details.as_deref(), Some("base_url=http://10.0.0.5:11434"));
    }
}
