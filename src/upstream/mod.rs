// Upstream chat-completion client module
// Author: kelexine (https://github.com/kelexine)

mod client;
pub mod streaming;

pub use client::{completions_url, UpstreamClient};
pub use streaming::RelayStream;

use bytes::Bytes;
use futures::stream::BoxStream;
use zeroize::Zeroizing;

/// Raw upstream body stream as handed out by reqwest.
pub type ByteStream = BoxStream<'static, reqwest::Result<Bytes>>;

/// Upstream stream wrapped for relaying to the caller.
pub type UpstreamByteStream = RelayStream<ByteStream>;

/// What one upstream call produced.
pub enum UpstreamResponse {
    /// Open byte stream, passed through untouched.
    Stream(UpstreamByteStream),
    /// `choices[0].message.content` of a buffered completion.
    Buffered(String),
}

impl std::fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamResponse::Stream(_) => f.write_str("UpstreamResponse::Stream(..)"),
            UpstreamResponse::Buffered(content) => f
                .debug_tuple("UpstreamResponse::Buffered")
                .field(&content.len())
                .finish(),
        }
    }
}

/// Bearer credential for one upstream call. The secret is wiped on drop and
/// never printed.
#[derive(Clone)]
pub struct Credential(Zeroizing<String>);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}
