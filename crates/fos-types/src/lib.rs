//! Foundation types for the fostore wire protocol.
//!
//! Every other fostore crate depends on `fos-types`. The types here are the
//! values that travel verbatim on the wire and carry no protocol behavior of
//! their own.
//!
//! # Key Types
//!
//! - [`Oid`]: Object identity reported by optimistic-verification failures
//! - [`RequestId`]: Correlation key between a request and its reply
//! - [`Status`]: Outcome code that drives reply decoding

pub mod error;
pub mod oid;
pub mod request_id;
pub mod status;

pub use error::TypeError;
pub use oid::Oid;
pub use request_id::RequestId;
pub use status::Status;
