//! Client side of the fostore wire protocol.
//!
//! A [`Message`] batches requests, is encoded as one frame and sent over a
//! [`Transport`]. The store answers with one reply frame, which the
//! [`ReplyHandler`] decodes in a single pass, routing each reply to the
//! request it correlates with and collecting per-reply failures into one
//! result.

pub mod batch;
pub mod config;
pub mod connector;
pub mod error;
pub mod frame;
pub mod handler;
pub mod inspect;
pub mod message;
pub mod observer;
pub mod request;
pub mod state;
pub mod transport;

pub use batch::{encode_batch, read_batch, Batch};
pub use config::{ProtocolConfig, MAX_PAYLOAD_LEN, PROTOCOL_VERSION};
pub use connector::{Connector, LocalConnector};
pub use error::{ConfigError, ProtocolError, ProtocolResult, ReplyFailure};
pub use frame::ReplyBuilder;
pub use handler::ReplyHandler;
pub use inspect::{inspect_frame, FrameSummary, ReplySummary};
pub use message::Message;
pub use observer::{NoopObserver, ReplyObserver, TracingObserver};
pub use request::{
    BeginRequest, CommitRequest, DeleteRequest, FetchRequest, InsertRequest, Request, RequestKind,
    RollbackRequest, UpdateRequest,
};
pub use state::{ObjectRef, StateResolver, StateTable};
pub use transport::{Session, StreamTransport, Transport};
