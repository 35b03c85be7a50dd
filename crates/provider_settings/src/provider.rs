use std::{fmt, str::FromStr};

use gpui::SharedString;
use serde::{Deserialize, Serialize};

/// The LLM providers that can be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    OpenAI,
    Azure,
    Ollama,
    Anthropic,
    Bedrock,
    Google,
    Groq,
    Mistral,
    Moonshot,
    OpenRouter,
    Perplexity,
    TogetherAI,
    ZeroOne,
    ZhiPu,
    DeepSeek,
    Minimax,
    Qwen,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model provider: {0:?}")]
pub struct UnknownProvider(pub String);

impl ModelProvider {
    /// The key used for this provider in the settings map and translations.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Azure => "azure",
            Self::Ollama => "ollama",
            Self::Anthropic => "anthropic",
            Self::Bedrock => "bedrock",
            Self::Google => "google",
            Self::Groq => "groq",
            Self::Mistral => "mistral",
            Self::Moonshot => "moonshot",
            Self::OpenRouter => "openrouter",
            Self::Perplexity => "perplexity",
            Self::TogetherAI => "togetherai",
            Self::ZeroOne => "zeroone",
            Self::ZhiPu => "zhipu",
            Self::DeepSeek => "deepseek",
            Self::Minimax => "minimax",
            Self::Qwen => "qwen",
        }
    }

    /// Human readable name, used as the default group title.
    pub fn label(&self) -> &'static str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Azure => "Azure OpenAI",
            Self::Ollama => "Ollama",
            Self::Anthropic => "Anthropic",
            Self::Bedrock => "Amazon Bedrock",
            Self::Google => "Google",
            Self::Groq => "Groq",
            Self::Mistral => "Mistral",
            Self::Moonshot => "Moonshot",
            Self::OpenRouter => "OpenRouter",
            Self::Perplexity => "Perplexity",
            Self::TogetherAI => "Together AI",
            Self::ZeroOne => "01.AI",
            Self::ZhiPu => "ZhiPu",
            Self::DeepSeek => "DeepSeek",
            Self::Minimax => "Minimax",
            Self::Qwen => "Qwen",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Self::OpenAI,
            Self::Azure,
            Self::Ollama,
            Self::Anthropic,
            Self::Bedrock,
            Self::Google,
            Self::Groq,
            Self::Mistral,
            Self::Moonshot,
            Self::OpenRouter,
            Self::Perplexity,
            Self::TogetherAI,
            Self::ZeroOne,
            Self::ZhiPu,
            Self::DeepSeek,
            Self::Minimax,
            Self::Qwen,
        ]
    }

    /// Whether the provider is active before the user has touched its switch.
    pub fn enabled_by_default(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Ollama)
    }

    /// Build a translation key in this provider's namespace, e.g. `modelProvider.openai.token.title`.
    pub(crate) fn i18n_key(&self, suffix: &str) -> String {
        format!("modelProvider.{}.{}", self.as_str(), suffix)
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|provider| provider.as_str() == s)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

impl From<ModelProvider> for SharedString {
    fn from(provider: ModelProvider) -> Self {
        SharedString::new_static(provider.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ModelProvider;

    #[test]
    fn test_provider_keys_round_trip() {
        for provider in ModelProvider::all() {
            assert_eq!(provider.as_str().parse::<ModelProvider>(), Ok(provider));
            assert_eq!(
                serde_json::to_value(provider).unwrap(),
                serde_json::Value::String(provider.as_str().into())
            );
        }

        assert!("open-ai".parse::<ModelProvider>().is_err());
        assert_eq!(
            "nope".parse::<ModelProvider>().unwrap_err().to_string(),
            "unknown model provider: \"nope\""
        );
    }

    #[test]
    fn test_enabled_by_default() {
        let enabled = ModelProvider::all()
            .into_iter()
            .filter(|p| p.enabled_by_default())
            .collect::<Vec<_>>();
        assert_eq!(enabled, vec![ModelProvider::OpenAI, ModelProvider::Ollama]);
    }

    #[test]
    fn test_i18n_key() {
        assert_eq!(
            ModelProvider::Azure.i18n_key("endpoint.placeholder"),
            "modelProvider.azure.endpoint.placeholder"
        );
    }
}
