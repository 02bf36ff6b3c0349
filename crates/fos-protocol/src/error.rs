use fos_codec::CodecError;
use fos_types::{Oid, RequestId, Status};
use thiserror::Error;

use crate::state::ObjectRef;

/// A per-reply failure collected while the rest of the frame is decoded.
#[derive(Clone, Debug, Error)]
pub enum ReplyFailure {
    #[error("{request} failed with {status}: {message}")]
    DataStore {
        request: RequestId,
        status: Status,
        message: String,
    },

    #[error("{request} failed optimistic verification of {oid}: {message}")]
    OptimisticConflict {
        request: RequestId,
        oid: Oid,
        message: String,
        /// The in-memory object for `oid`, when the resolver knew it.
        failed: Option<ObjectRef>,
    },
}

impl ReplyFailure {
    pub fn request(&self) -> RequestId {
        match self {
            Self::DataStore { request, .. } | Self::OptimisticConflict { request, .. } => *request,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::DataStore { message, .. } | Self::OptimisticConflict { message, .. } => message,
        }
    }

    pub fn is_optimistic(&self) -> bool {
        matches!(self, Self::OptimisticConflict { .. })
    }

    pub fn failed_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::OptimisticConflict { failed, .. } => failed.as_ref(),
            Self::DataStore { .. } => None,
        }
    }
}

fn summarize(failures: &[ReplyFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.request(), f.message()))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: i32, actual: i32 },

    #[error("unknown status tag: {0}")]
    UnknownStatus(u8),

    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("fatal reply from store: {message}")]
    Fatal { message: String },

    #[error("login failed: {message}")]
    Login { message: String },

    #[error("fatal reply for {request}: {message}")]
    ReplyFatal { request: RequestId, message: String },

    #[error("internal error: {request} reported {status} without a message")]
    Internal { request: RequestId, status: Status },

    #[error("{} data-store failure(s): {}", .failures.len(), summarize(.failures))]
    DataStore { failures: Vec<ReplyFailure> },

    #[error(
        "optimistic verification failed; {} failure(s): {}",
        .failures.len(),
        summarize(.failures)
    )]
    OptimisticVerification { failures: Vec<ReplyFailure> },

    #[error("request id already registered: {0}")]
    DuplicateRequest(RequestId),

    #[error("message is full: at most {max} requests")]
    TooManyRequests { max: usize },
}

impl ProtocolError {
    /// Fatal errors abandon the stream; the batch-level composites do not.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::DataStore { .. } | Self::OptimisticVerification { .. })
    }

    /// Whether the caller may retry the transaction that produced this.
    pub fn is_retryable(&self) -> bool {
        !self.is_fatal()
    }

    /// Per-reply failures wrapped by a composite, empty otherwise.
    pub fn failures(&self) -> &[ReplyFailure] {
        match self {
            Self::DataStore { failures } | Self::OptimisticVerification { failures } => failures,
            _ => &[],
        }
    }
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
