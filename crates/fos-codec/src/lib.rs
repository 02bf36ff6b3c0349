//! Primitive transcribers for the fostore wire protocol.
//!
//! Every request and reply payload field is written with a [`Transcriber`]:
//! a stateless codec that can store a value, fetch it back, and skip over it
//! without decoding. Skipping consumes exactly the bytes storing produced,
//! which is what lets the reply handler step over payloads it does not care
//! about without losing its place in the stream.
//!
//! All integers are big-endian. Strings are a 2-byte length followed by
//! UTF-8 bytes.

pub mod data;
pub mod error;
pub mod registry;
pub mod transcriber;
pub mod value;

pub use data::{DataInput, DataOutput};
pub use error::{CodecError, CodecResult};
pub use registry::{DynTranscriber, TranscriberRegistry};
pub use transcriber::{
    BooleanTranscriber, ByteTranscriber, CharTranscriber, DoubleTranscriber, FloatTranscriber,
    IntTranscriber, LongTranscriber, OidTranscriber, ShortTranscriber, StringTranscriber,
    Transcriber,
};
pub use value::{TypeTag, Value};
