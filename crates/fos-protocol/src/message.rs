use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use fos_types::RequestId;

use crate::batch;
use crate::config::ProtocolConfig;
use crate::connector::Connector;
use crate::error::{ProtocolError, ProtocolResult};
use crate::request::{Request, RequestKind};
use crate::state::StateResolver;

/// One batch of requests sent and answered as a single exchange.
///
/// A message owns the correlation table for its requests. Requests are
/// pending until their reply is handled, then retired; a retired request
/// never receives another reply.
pub struct Message {
    version: i32,
    max_requests: usize,
    next_id: Option<RequestId>,
    pending: BTreeMap<RequestId, Request>,
    retired: BTreeMap<RequestId, Request>,
    connector: Option<Arc<dyn Connector>>,
    resolver: Option<Arc<dyn StateResolver>>,
}

impl Default for Message {
    fn default() -> Self {
        Self::new(&ProtocolConfig::default())
    }
}

impl Message {
    pub fn new(config: &ProtocolConfig) -> Self {
        Self {
            version: config.version,
            max_requests: config.max_requests,
            next_id: Some(RequestId::FIRST),
            pending: BTreeMap::new(),
            retired: BTreeMap::new(),
            connector: None,
            resolver: None,
        }
    }

    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn StateResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    /// Register a request under a freshly allocated id.
    pub fn add_request(&mut self, kind: impl Into<RequestKind>) -> ProtocolResult<RequestId> {
        let id = self.allocate_id()?;
        self.add_request_with_id(id, kind)?;
        Ok(id)
    }

    /// Register a request under a caller-chosen id.
    pub fn add_request_with_id(
        &mut self,
        id: RequestId,
        kind: impl Into<RequestKind>,
    ) -> ProtocolResult<()> {
        if self.is_registered(id) {
            return Err(ProtocolError::DuplicateRequest(id));
        }
        if self.len() >= self.max_requests {
            return Err(ProtocolError::TooManyRequests {
                max: self.max_requests,
            });
        }
        self.pending.insert(id, Request::new(id, kind.into()));
        Ok(())
    }

    fn allocate_id(&mut self) -> ProtocolResult<RequestId> {
        let mut candidate = self.next_id;
        while let Some(id) = candidate {
            if !self.is_registered(id) {
                self.next_id = id.next();
                return Ok(id);
            }
            candidate = id.next();
        }
        Err(ProtocolError::TooManyRequests {
            max: self.max_requests,
        })
    }

    fn is_registered(&self, id: RequestId) -> bool {
        self.pending.contains_key(&id) || self.retired.contains_key(&id)
    }

    /// The pending request for `id`. `None` is normal: the request may
    /// already have been retired by an earlier exchange.
    pub fn get_request(&mut self, id: RequestId) -> Option<&mut Request> {
        self.pending.get_mut(&id)
    }

    /// Look up a request whether pending or retired.
    pub fn request(&self, id: RequestId) -> Option<&Request> {
        self.pending.get(&id).or_else(|| self.retired.get(&id))
    }

    /// Stop routing replies to `id`. Returns `false` if it was not pending.
    pub fn retire(&mut self, id: RequestId) -> bool {
        match self.pending.remove(&id) {
            Some(request) => {
                self.retired.insert(id, request);
                true
            }
            None => false,
        }
    }

    pub fn connector(&self) -> Option<&Arc<dyn Connector>> {
        self.connector.as_ref()
    }

    pub fn resolver(&self) -> Option<&Arc<dyn StateResolver>> {
        self.resolver.as_ref()
    }

    /// Pending requests in id order.
    pub fn pending(&self) -> impl Iterator<Item = &Request> {
        self.pending.values()
    }

    /// Retired requests in id order.
    pub fn retired(&self) -> impl Iterator<Item = &Request> {
        self.retired.values()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Total registered requests, pending and retired.
    pub fn len(&self) -> usize {
        self.pending.len() + self.retired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encode every pending request as one batch.
    pub fn encode(&self) -> ProtocolResult<Bytes> {
        batch::encode_batch(self.version, self.pending.values())
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("version", &self.version)
            .field("pending", &self.pending.keys().collect::<Vec<_>>())
            .field("retired", &self.retired.keys().collect::<Vec<_>>())
            .field("has_connector", &self.connector.is_some())
            .finish()
    }
}
