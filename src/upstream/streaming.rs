// Pass-through relay for upstream byte streams
// Author: kelexine (https://github.com/kelexine)

use crate::error::ProxyError;
use crate::metrics;
use bytes::Bytes;
use futures::stream::Stream;
use pin_project::{pin_project, pinned_drop};
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Instant, Sleep};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Open,
    Completed,
    Failed,
}

/// Upstream body stream relayed chunk-for-chunk to the caller.
///
/// Chunks are yielded in arrival order and never copied, merged or
/// re-framed. The stream is only polled when the downstream body asks for
/// more data, so a slow reader slows the upstream read instead of filling a
/// buffer.
///
/// Owning the upstream stream is what makes cancellation work: when the
/// caller disconnects, hyper drops the response body, this value is dropped
/// with it and the upstream connection is closed. That drop is logged as a
/// stream abort.
#[pin_project(PinnedDrop)]
pub struct RelayStream<S> {
    #[pin]
    inner: S,
    #[pin]
    idle: Sleep,
    idle_timeout: Duration,
    provider: &'static str,
    bytes_relayed: usize,
    chunks: usize,
    state: StreamState,
}

impl<S> RelayStream<S> {
    pub fn new(inner: S, provider: &'static str, idle_timeout: Duration) -> Self {
        Self {
            inner,
            idle: tokio::time::sleep(idle_timeout),
            idle_timeout,
            provider,
            bytes_relayed: 0,
            chunks: 0,
            state: StreamState::Open,
        }
    }

    /// Bytes handed downstream so far.
    pub fn bytes_relayed(&self) -> usize {
        self.bytes_relayed
    }
}

impl<S, E> Stream for RelayStream<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    type Item = Result<Bytes, ProxyError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.state != StreamState::Open {
            return Poll::Ready(None);
        }

        match this.inner.poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                *this.chunks += 1;
                *this.bytes_relayed += chunk.len();
                metrics::record_stream_bytes(*this.provider, chunk.len());
                this.idle
                    .as_mut()
                    .reset(Instant::now() + *this.idle_timeout);
                debug!("Relaying chunk #{} ({} bytes)", this.chunks, chunk.len());
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                *this.state = StreamState::Failed;
                metrics::record_stream_outcome("error");
                warn!(
                    "Upstream stream failed after {} bytes: {}",
                    this.bytes_relayed, e
                );
                Poll::Ready(Some(Err(ProxyError::StreamAbort(e.to_string()))))
            }
            Poll::Ready(None) => {
                *this.state = StreamState::Completed;
                metrics::record_stream_outcome("completed");
                info!(
                    "Upstream stream completed: {} chunks, {} bytes",
                    this.chunks, this.bytes_relayed
                );
                Poll::Ready(None)
            }
            Poll::Pending => match this.idle.as_mut().poll(cx) {
                Poll::Ready(()) => {
                    *this.state = StreamState::Failed;
                    metrics::record_stream_outcome("timeout");
                    warn!(
                        "Upstream stream idle for {:?} after {} bytes, closing",
                        this.idle_timeout, this.bytes_relayed
                    );
                    Poll::Ready(Some(Err(ProxyError::Timeout(this.idle_timeout.as_secs()))))
                }
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

#[pinned_drop]
impl<S> PinnedDrop for RelayStream<S> {
    fn drop(self: Pin<&mut Self>) {
        let this = self.project();
        if *this.state == StreamState::Open {
            metrics::record_stream_outcome("aborted");
            warn!(
                "Downstream disconnected after {} bytes, aborting upstream {} stream",
                this.bytes_relayed, this.provider
            );
        }
    }
}
