use std::io::{self, Read};

use fos_codec::{DataInput, OidTranscriber, Transcriber};
use fos_types::{Oid, RequestId, Status};
use serde::Serialize;

use crate::batch::read_bounded;
use crate::config::ProtocolConfig;
use crate::error::{ProtocolError, ProtocolResult};

/// What a reply frame contains, decoded without a [`Message`](crate::Message).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameSummary {
    pub version: i32,
    pub status: Status,
    /// Diagnostic of a FATAL or LOGIN frame.
    pub message: Option<String>,
    /// Skip region length of a ROLLBACK frame.
    pub skipped: Option<u64>,
    pub replies: Vec<ReplySummary>,
    /// Bytes consumed by the frame.
    pub size: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReplySummary {
    pub request: RequestId,
    pub status: Status,
    pub message_pos: i32,
    pub length: u64,
    pub message: Option<String>,
    /// Object named by an OPTIMISTIC reply.
    pub oid: Option<Oid>,
}

impl FrameSummary {
    /// Replies whose status is neither OK nor WARN.
    pub fn failures(&self) -> impl Iterator<Item = &ReplySummary> {
        self.replies.iter().filter(|r| !r.status.is_success())
    }
}

struct Tracked<'a> {
    inner: &'a mut dyn Read,
    pos: u64,
}

impl Read for Tracked<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

/// Walk one reply frame, skipping every payload.
///
/// The version is reported rather than checked; the limits in `config`
/// still apply.
pub fn inspect_frame(
    input: &mut dyn Read,
    config: &ProtocolConfig,
) -> ProtocolResult<FrameSummary> {
    let mut input = Tracked { inner: input, pos: 0 };
    let version = input.read_i32()?;
    let tag = input.read_u8()?;
    let status = Status::from_tag(tag).map_err(|_| ProtocolError::UnknownStatus(tag))?;

    let mut summary = FrameSummary {
        version,
        status,
        message: None,
        skipped: None,
        replies: Vec::new(),
        size: 0,
    };
    match status {
        Status::Fatal | Status::Login => summary.message = Some(input.read_utf()?),
        Status::Rollback => {
            let skip = read_bounded(&mut input, config.max_payload_len, "rollback length")? as u64;
            input.skip_bytes(skip)?;
            summary.skipped = Some(skip);
        }
        _ => {
            let count = read_bounded(&mut input, config.max_replies, "reply count")?;
            for _ in 0..count {
                summary.replies.push(inspect_reply(&mut input, config)?);
            }
        }
    }
    summary.size = input.pos;
    Ok(summary)
}

fn inspect_reply(input: &mut Tracked<'_>, config: &ProtocolConfig) -> ProtocolResult<ReplySummary> {
    let request = RequestId::new(input.read_u32()?);
    let tag = input.read_u8()?;
    let status = Status::from_tag(tag).map_err(|_| ProtocolError::UnknownStatus(tag))?;
    let message_pos = input.read_i32()?;
    let length = read_bounded(input, config.max_payload_len, "reply length")? as u64;

    let mut reply = ReplySummary {
        request,
        status,
        message_pos,
        length,
        message: None,
        oid: None,
    };
    if message_pos == 0 {
        input.skip_bytes(length)?;
        return Ok(reply);
    }

    match status {
        Status::Ok | Status::Warn => reply.message = embedded_message(input, message_pos, length)?,
        Status::Optimistic => {
            if length < Oid::WIDTH as u64 {
                return Err(ProtocolError::MalformedFrame(format!(
                    "{request}: optimistic payload of {length} bytes cannot hold an oid"
                )));
            }
            let mut payload = Read::take(&mut *input, length);
            reply.oid = Some(OidTranscriber.fetch(&mut payload)?);
            let rest = payload.limit();
            payload.skip_bytes(rest)?;
            reply.message = Some(input.read_utf()?);
        }
        _ => {
            input.skip_bytes(length)?;
            reply.message = Some(input.read_utf()?);
        }
    }
    Ok(reply)
}

/// Read the diagnostic an OK or WARN reply carries inside its payload, if
/// `message_pos` points into it.
fn embedded_message(
    input: &mut Tracked<'_>,
    message_pos: i32,
    length: u64,
) -> ProtocolResult<Option<String>> {
    let start = input.pos;
    let offset = match u64::try_from(message_pos) {
        Ok(pos) if pos >= start && pos < start + length => pos - start,
        _ => {
            input.skip_bytes(length)?;
            return Ok(None);
        }
    };
    let mut payload = Read::take(&mut *input, length);
    payload.skip_bytes(offset)?;
    let message = payload.read_utf()?;
    let rest = payload.limit();
    payload.skip_bytes(rest)?;
    Ok(Some(message))
}
