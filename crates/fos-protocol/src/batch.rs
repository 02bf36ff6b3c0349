use std::io::{Read, Write};

use bytes::{BufMut, Bytes, BytesMut};
use fos_codec::{DataInput, DataOutput};
use fos_types::RequestId;

use crate::config::ProtocolConfig;
use crate::error::{ProtocolError, ProtocolResult};
use crate::request::{Request, RequestKind};

/// A request batch as the server sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    pub version: i32,
    pub requests: Vec<(RequestId, RequestKind)>,
}

/// Encode requests as one batch:
/// `[version:i32][count:i32]` then per request
/// `[id:u32][kind:u8][length:i32][body]`.
pub fn encode_batch<'a>(
    version: i32,
    requests: impl ExactSizeIterator<Item = &'a Request>,
) -> ProtocolResult<Bytes> {
    let mut out = BytesMut::new().writer();
    out.write_i32(version)?;
    out.write_i32(to_wire_len(requests.len())?)?;
    for request in requests {
        let mut body: Vec<u8> = Vec::new();
        request.encode_body(&mut body)?;
        out.write_u32(request.id().as_u32())?;
        out.write_u8(request.kind().tag())?;
        out.write_i32(to_wire_len(body.len())?)?;
        out.write_all(&body)?;
    }
    Ok(out.into_inner().freeze())
}

/// Decode a batch produced by [`encode_batch`].
pub fn read_batch(input: &mut dyn Read, config: &ProtocolConfig) -> ProtocolResult<Batch> {
    let version = input.read_i32()?;
    if version != config.version {
        return Err(ProtocolError::VersionMismatch {
            expected: config.version,
            actual: version,
        });
    }
    let count = read_bounded(input, config.max_requests, "request count")?;
    let mut requests = Vec::with_capacity(count);
    for _ in 0..count {
        let id = RequestId::new(input.read_u32()?);
        let tag = input.read_u8()?;
        let length = read_bounded(input, config.max_payload_len, "request length")?;
        let mut body = Read::take(&mut *input, length as u64);
        let kind = RequestKind::decode_body(tag, &mut body)?;
        if body.limit() > 0 {
            return Err(ProtocolError::MalformedFrame(format!(
                "{id}: {} body bytes left after {}",
                body.limit(),
                kind.name()
            )));
        }
        requests.push((id, kind));
    }
    Ok(Batch { version, requests })
}

pub(crate) fn to_wire_len(len: usize) -> ProtocolResult<i32> {
    i32::try_from(len).map_err(|_| ProtocolError::MalformedFrame(format!("length {len} too large")))
}

/// Read a non-negative `i32` no larger than `max`.
pub(crate) fn read_bounded(input: &mut dyn Read, max: usize, what: &str) -> ProtocolResult<usize> {
    let raw = input.read_i32()?;
    let value = usize::try_from(raw)
        .map_err(|_| ProtocolError::MalformedFrame(format!("negative {what}: {raw}")))?;
    if value > max {
        return Err(ProtocolError::MalformedFrame(format!(
            "{what} {value} exceeds limit {max}"
        )));
    }
    Ok(value)
}
