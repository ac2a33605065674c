//! Provider identifier value object

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Extraction provider identifier (Value Object)
///
/// Identifies one independent extraction backend ("agent"). The derived
/// ordering is the canonical provider order used everywhere a deterministic
/// order is needed, most importantly for consensus tie-breaks:
///
/// `Gemini < Claude < OpenAi < Custom(..)`, with custom providers ordered
/// by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderId {
    Gemini,
    Claude,
    OpenAi,
    Custom(String),
}

impl ProviderId {
    /// Get the string identifier for this provider
    pub fn as_str(&self) -> &str {
        match self {
            ProviderId::Gemini => "gemini",
            ProviderId::Claude => "claude",
            ProviderId::OpenAi => "openai",
            ProviderId::Custom(s) => s,
        }
    }

    /// Built-in providers in canonical order
    pub fn builtin() -> Vec<ProviderId> {
        vec![ProviderId::Gemini, ProviderId::Claude, ProviderId::OpenAi]
    }

    /// Sort a provider list into canonical order, removing duplicates
    pub fn canonical(mut providers: Vec<ProviderId>) -> Vec<ProviderId> {
        providers.sort();
        providers.dedup();
        providers
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => ProviderId::Gemini,
            "claude" | "anthropic" => ProviderId::Claude,
            "openai" | "gpt" => ProviderId::OpenAi,
            other => ProviderId::Custom(other.to_string()),
        })
    }
}

impl From<&str> for ProviderId {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(id) => id,
            Err(never) => match never {},
        }
    }
}

impl Serialize for ProviderId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProviderId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(ProviderId::from(s.as_str()))
    }
}
