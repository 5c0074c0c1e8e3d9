// Model allow-list (model id → provider family + input tier)
// Author: kelexine (https://github.com/kelexine)

use crate::error::{ProxyError, Result};
use phf::phf_map;
use serde::{Deserialize, Serialize};

/// Upstream provider family a model id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderFamily {
    OpenAi,
    DeepSeek,
}

impl ProviderFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderFamily::OpenAi => "openai",
            ProviderFamily::DeepSeek => "deepseek",
        }
    }
}

/// Input size class; the cheapest tier accepts shorter sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Basic,
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    pub family: ProviderFamily,
    pub tier: ModelTier,
}

const fn openai(tier: ModelTier) -> ModelSpec {
    ModelSpec {
        family: ProviderFamily::OpenAi,
        tier,
    }
}

const fn deepseek(tier: ModelTier) -> ModelSpec {
    ModelSpec {
        family: ProviderFamily::DeepSeek,
        tier,
    }
}

static MODELS: phf::Map<&'static str, ModelSpec> = phf_map! {
    "gpt-3.5-turbo" => openai(ModelTier::Basic),
    "gpt-3.5-turbo-1106" => openai(ModelTier::Standard),
    "gpt-3.5-turbo-0613" => openai(ModelTier::Standard),
    "gpt-3.5-turbo-16k-0613" => openai(ModelTier::Standard),
    "gpt-4-turbo" => openai(ModelTier::Standard),
    "gpt-4-1106-preview" => openai(ModelTier::Standard),
    "gpt-4-0613" => openai(ModelTier::Standard),
    "gpt-4-32k-0613" => openai(ModelTier::Standard),
    "babbage-002" => openai(ModelTier::Standard),
    "davinci-002" => openai(ModelTier::Standard),

    "deepseek-chat" => deepseek(ModelTier::Standard),
    "deepseek-coder" => deepseek(ModelTier::Standard),
    "deepseek-reasoner" => deepseek(ModelTier::Standard),
};

/// Look up a model id. Matching is exact and case-sensitive; unknown ids are
/// never forwarded upstream.
pub fn lookup(model: &str) -> Result<ModelSpec> {
    MODELS
        .get(model)
        .copied()
        .ok_or_else(|| ProxyError::UnsupportedModel {
            model: model.to_string(),
            supported: supported_models().join(", "),
        })
}

/// The catalog's own `'static` copy of a known id, for metric labels.
pub fn canonical_id(model: &str) -> Option<&'static str> {
    MODELS.get_key(model).copied()
}

/// All known model ids, sorted.
pub fn supported_models() -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = MODELS.keys().copied().collect();
    ids.sort_unstable();
    ids
}

/// Model ids served by one provider family, sorted.
pub fn models_for(family: ProviderFamily) -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = MODELS
        .entries()
        .filter(|(_, spec)| spec.family == family)
        .map(|(id, _)| *id)
        .collect();
    ids.sort_unstable();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("gpt-3.5-turbo").unwrap(), openai(ModelTier::Basic));
        assert_eq!(lookup("gpt-4-turbo").unwrap(), openai(ModelTier::Standard));
        assert_eq!(
            lookup("deepseek-coder").unwrap().family,
            ProviderFamily::DeepSeek
        );
    }

    #[test]
    fn test_unknown_model_lists_supported() {
        let err = lookup("gpt-5-ultra").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("gpt-5-ultra"));
        assert!(message.contains("deepseek-chat"));
    }

    #[test]
    fn test_family_sizes() {
        assert_eq!(models_for(ProviderFamily::OpenAi).len(), 10);
        assert_eq!(models_for(ProviderFamily::DeepSeek).len(), 3);
    }
}
