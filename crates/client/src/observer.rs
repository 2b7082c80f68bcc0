//! Injected observation hook for outbound requests and raw responses.
//!
//! Debug visibility is opt-in per gateway instance: callers that want to see
//! every exchange supply an observer at construction. There is no process
//! global and no environment toggle; ambient `tracing` events are emitted
//! independently of this hook.

use std::sync::Arc;

/// Receives every outbound request description and raw response body of the
/// gateway it was installed on. Implementations must be cheap; they run
/// inline on the calling task.
pub trait RequestObserver: Send + Sync {
    /// Called just before a request is transmitted. `detail` is the full
    /// request URL for HTTP transports or the framed payload for the socket
    /// transport.
    fn on_request(&self, transport: &str, detail: &str);

    /// Called with the raw response body before it is decoded.
    fn on_response(&self, transport: &str, body: &str);
}

/// Optional shared observer as the gateways store it.
pub(crate) type Observer = Option<Arc<dyn RequestObserver>>;

pub(crate) fn notify_request(observer: &Observer, transport: &str, detail: &str) {
    if let Some(obs) = observer {
        obs.on_request(transport, detail);
    }
}

pub(crate) fn notify_response(observer: &Observer, transport: &str, body: &str) {
    if let Some(obs) = observer {
        obs.on_response(transport, body);
    }
}
