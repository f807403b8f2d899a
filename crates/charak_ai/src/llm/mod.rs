use std::time::Duration;

use charak_core::config::{GenerationBackend, GenerationConfig};
use charak_core::error::AppError;

use crate::ollama::OllamaClient;

pub mod anthropic_llm;
pub mod ollama_llm;

pub use anthropic_llm::AnthropicLlm;
pub use ollama_llm::OllamaLlm;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

pub trait Llm: Send + Sync {
    fn name(&self) -> &str;

    /// Cheap local check run before any retrieval work, e.g. that a
    /// credential is present. Backends without preconditions keep the default.
    fn check_ready(&self) -> Result<(), AppError> {
        Ok(())
    }

    fn generate(&self, prompt: &Prompt) -> Result<String, AppError>;
}

pub fn backend_from_config(cfg: &GenerationConfig) -> Result<Box<dyn Llm>, AppError> {
    let timeout = Duration::from_secs(cfg.timeout_secs);
    Ok(match cfg.backend {
        GenerationBackend::Ollama => {
            let client = OllamaClient::new(&cfg.base_url)?;
            Box::new(OllamaLlm::new(client, cfg.model.clone(), timeout))
        }
        GenerationBackend::Anthropic => Box::new(AnthropicLlm::new(
            cfg.api_url.clone(),
            cfg.api_key_env.clone(),
            cfg.model.clone(),
            cfg.max_tokens,
            timeout,
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_backend_from_config() {
        let mut cfg = GenerationConfig::default();
        assert_eq!(backend_from_config(&cfg).expect("ollama").name(), "ollama");

        cfg.backend = GenerationBackend::Anthropic;
        assert_eq!(backend_from_config(&cfg).expect("anthropic").name(), "anthropic");
    }

    #[test]
    fn local_backend_rejects_remote_daemon() {
        let cfg = GenerationConfig {
            base_url: "http://192.168.1.20:11434".to_string(),
            ..GenerationConfig::default()
        };
        let err = backend_from_config(&cfg).err().expect("remote");
        assert_eq!(err.code, "CONFIG_REMOTE_NOT_ALLOWED");
    }
}
