use fos_types::{RequestId, Status};
use tracing::{debug, warn};

use crate::error::ReplyFailure;

/// Receives decode events from the reply handler.
///
/// Every method has an empty default, so an observer only implements what
/// it cares about. Observers see events in stream order.
pub trait ReplyObserver: Send + Sync {
    fn frame_status(&self, _status: Status) {}

    fn reply_count(&self, _count: usize) {}

    fn reply(&self, _request: RequestId, _status: Status, _message_pos: i32, _length: u64) {}

    /// A reply whose request is no longer registered; its payload was skipped.
    fn unmatched(&self, _request: RequestId, _length: u64) {}

    /// A reply was handed to its request, which left `unread` bytes behind.
    fn dispatched(&self, _request: RequestId, _status: Status, _unread: u64) {}

    fn failure(&self, _failure: &ReplyFailure) {}

    fn finished(&self, _failures: usize) {}
}

/// Forwards decode events to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl ReplyObserver for TracingObserver {
    fn frame_status(&self, status: Status) {
        debug!(%status, "reply frame status");
    }

    fn reply_count(&self, count: usize) {
        debug!(count, "reply frame count");
    }

    fn reply(&self, request: RequestId, status: Status, message_pos: i32, length: u64) {
        debug!(%request, %status, message_pos, length, "reply header");
    }

    fn unmatched(&self, request: RequestId, length: u64) {
        debug!(%request, length, "no pending request for reply; skipped");
    }

    fn dispatched(&self, request: RequestId, status: Status, unread: u64) {
        if unread > 0 {
            warn!(%request, %status, unread, "request left payload bytes unread; drained");
        } else {
            debug!(%request, %status, "reply dispatched");
        }
    }

    fn failure(&self, failure: &ReplyFailure) {
        debug!(request = %failure.request(), optimistic = failure.is_optimistic(), "{failure}");
    }

    fn finished(&self, failures: usize) {
        debug!(failures, "reply frame finished");
    }
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ReplyObserver for NoopObserver {}
