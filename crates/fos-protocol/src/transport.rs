use std::io::{BufReader, Read, Write};
use std::sync::Arc;

use fos_codec::DataOutput;
use tracing::debug;

use crate::batch::to_wire_len;
use crate::connector::{Connector, LocalConnector};
use crate::error::ProtocolResult;
use crate::handler::ReplyHandler;
use crate::message::Message;

/// Carries an encoded batch to the store and hands back the reply stream.
pub trait Transport {
    /// Send `batch` and return a reader positioned at the start of the
    /// reply frame.
    fn exchange(&mut self, batch: &[u8]) -> ProtocolResult<&mut dyn Read>;

    /// Rollback hook for messages sent over this transport.
    fn connector(&self) -> Option<Arc<dyn Connector>> {
        None
    }
}

/// Transport over one blocking byte stream, such as a `TcpStream`.
///
/// Each batch is written with an `i32` length prefix; the reply is read
/// back from the same stream.
pub struct StreamTransport<S: Read + Write> {
    stream: BufReader<S>,
    connector: Arc<LocalConnector>,
}

impl<S: Read + Write> StreamTransport<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
            connector: Arc::new(LocalConnector::new()),
        }
    }

    pub fn get_ref(&self) -> &S {
        self.stream.get_ref()
    }

    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }

    pub fn local_connector(&self) -> &Arc<LocalConnector> {
        &self.connector
    }
}

impl<S: Read + Write> Transport for StreamTransport<S> {
    fn exchange(&mut self, batch: &[u8]) -> ProtocolResult<&mut dyn Read> {
        let out = self.stream.get_mut();
        out.write_i32(to_wire_len(batch.len())?)?;
        out.write_all(batch)?;
        out.flush()?;
        Ok(&mut self.stream)
    }

    fn connector(&self) -> Option<Arc<dyn Connector>> {
        Some(self.connector.clone())
    }
}

/// Encode, send and decode messages over one transport.
pub struct Session<T: Transport> {
    transport: T,
    handler: ReplyHandler,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, handler: ReplyHandler) -> Self {
        Self { transport, handler }
    }

    /// An empty message wired to this session's rollback hook.
    pub fn message(&self) -> Message {
        let message = Message::new(self.handler.config());
        match self.transport.connector() {
            Some(connector) => message.with_connector(connector),
            None => message,
        }
    }

    /// Run one exchange for `message`: every pending request is sent and
    /// the reply frame is decoded into it.
    pub fn execute(&mut self, message: &mut Message) -> ProtocolResult<()> {
        let batch = message.encode()?;
        debug!(requests = message.pending_len(), bytes = batch.len(), "sending batch");
        let input = self.transport.exchange(&batch)?;
        self.handler.process(input, message)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}
