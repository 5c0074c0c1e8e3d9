//! Data models for the inbound translate API and the upstream provider.
//!
//! This module contains:
//! - The model allow-list and provider families (`catalog`)
//! - Browser-facing request/response bodies (`translate`)
//! - Chat-completion wire types (`upstream`)

// Author: kelexine (https://github.com/kelexine)

pub mod catalog;
pub mod translate;
pub mod upstream;

pub use catalog::{lookup as lookup_model, ModelSpec, ModelTier, ProviderFamily};
pub use translate::{ErrorBody, TranslateRequest, TranslateResponse};
pub use upstream::{ChatCompletionRequest, ChatMessage, UpstreamRequest};
