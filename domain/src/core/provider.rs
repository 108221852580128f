//! Provider value object identifying the vendor behind an analysis agent

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Capability vendors that can back an analysis agent (Value Object)
///
/// Known vendors have dedicated variants; anything else read from a plan
/// file is preserved as [`Provider::Custom`] so that registries can still
/// route it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provider {
    Claude,
    OpenAi,
    DeepSeek,
    Gemini,
    OpenRouter,
    Custom(String),
}

impl Provider {
    /// Fixed preference order used when deriving fallback candidates.
    ///
    /// Earlier entries are tried first.
    pub const FALLBACK_PREFERENCE: [Provider; 5] = [
        Provider::OpenAi,
        Provider::Claude,
        Provider::DeepSeek,
        Provider::Gemini,
        Provider::OpenRouter,
    ];

    /// Get the string identifier for this provider
    pub fn as_str(&self) -> &str {
        match self {
            Provider::Claude => "claude",
            Provider::OpenAi => "openai",
            Provider::DeepSeek => "deepseek",
            Provider::Gemini => "gemini",
            Provider::OpenRouter => "openrouter",
            Provider::Custom(s) => s,
        }
    }

    /// A custom provider with an empty identifier counts as "not set".
    pub fn is_blank(&self) -> bool {
        matches!(self, Provider::Custom(s) if s.trim().is_empty())
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "claude" | "anthropic" => Provider::Claude,
            "openai" => Provider::OpenAi,
            "deepseek" | "deepseek-coder" => Provider::DeepSeek,
            "gemini" | "google" => Provider::Gemini,
            "openrouter" => Provider::OpenRouter,
            _ => Provider::Custom(s.trim().to_string()),
        })
    }
}

impl From<&str> for Provider {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(p) => p,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Provider {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Provider {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Provider::from(s.as_str()))
    }
}
