use std::sync::atomic::{AtomicUsize, Ordering};

/// Transport-side hook used to doom the current transaction.
///
/// The reply handler calls [`Connector::set_rollback_only`] once before it
/// reports a fatal reply frame.
pub trait Connector: Send + Sync {
    fn set_rollback_only(&self);

    fn is_rollback_only(&self) -> bool;
}

/// Connector that only records rollback signals.
#[derive(Debug, Default)]
pub struct LocalConnector {
    signals: AtomicUsize,
}

impl LocalConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times rollback-only was signalled.
    pub fn signal_count(&self) -> usize {
        self.signals.load(Ordering::SeqCst)
    }
}

impl Connector for LocalConnector {
    fn set_rollback_only(&self) {
        self.signals.fetch_add(1, Ordering::SeqCst);
    }

    fn is_rollback_only(&self) -> bool {
        self.signal_count() > 0
    }
}
