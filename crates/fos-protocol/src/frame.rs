use std::io::Write;

use fos_codec::DataOutput;
use fos_types::{Oid, RequestId, Status};

use crate::batch::to_wire_len;
use crate::error::{ProtocolError, ProtocolResult};

/// id, status, messagePos and length.
pub const REPLY_HEADER_LEN: usize = RequestId::WIDTH + Status::WIDTH + 4 + 4;

#[derive(Clone, Debug)]
struct ReplyEntry {
    request: RequestId,
    status: Status,
    payload: Vec<u8>,
    message: Option<String>,
}

/// Server-side writer for reply frames.
///
/// Normal frames are assembled reply by reply and written by
/// [`ReplyBuilder::finish`]. FATAL, LOGIN and ROLLBACK frames carry no
/// replies and have their own constructors.
///
/// A reply's message position is the absolute offset of its diagnostic
/// string within the frame. For OK and WARN the string sits at the end of
/// the payload and counts toward its length; for every other status it
/// follows the payload.
#[derive(Clone, Debug)]
pub struct ReplyBuilder {
    version: i32,
    status: Status,
    entries: Vec<ReplyEntry>,
}

impl ReplyBuilder {
    pub fn new(version: i32) -> Self {
        Self {
            version,
            status: Status::Ok,
            entries: Vec::new(),
        }
    }

    /// Overall status of a normal frame. Defaults to OK.
    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// A reply without a diagnostic message.
    pub fn reply(
        mut self,
        request: RequestId,
        status: Status,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        self.entries.push(ReplyEntry {
            request,
            status,
            payload: payload.into(),
            message: None,
        });
        self
    }

    /// A reply carrying a diagnostic message.
    pub fn reply_with_message(
        mut self,
        request: RequestId,
        status: Status,
        payload: impl Into<Vec<u8>>,
        message: impl Into<String>,
    ) -> Self {
        self.entries.push(ReplyEntry {
            request,
            status,
            payload: payload.into(),
            message: Some(message.into()),
        });
        self
    }

    /// An OPTIMISTIC reply naming the object that failed verification.
    pub fn optimistic(self, request: RequestId, oid: Oid, message: impl Into<String>) -> Self {
        self.reply_with_message(request, Status::Optimistic, oid.to_bytes(), message)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn finish(&self) -> ProtocolResult<Vec<u8>> {
        if matches!(self.status, Status::Fatal | Status::Login | Status::Rollback) {
            return Err(ProtocolError::MalformedFrame(format!(
                "{} frames carry no replies",
                self.status
            )));
        }
        let mut out: Vec<u8> = Vec::new();
        write_header(&mut out, self.version, self.status)?;
        out.write_i32(to_wire_len(self.entries.len())?)?;
        for entry in &self.entries {
            write_entry(&mut out, entry)?;
        }
        Ok(out)
    }

    /// A frame reporting a store failure that dooms the transaction.
    pub fn fatal(version: i32, message: &str) -> ProtocolResult<Vec<u8>> {
        let mut out: Vec<u8> = Vec::new();
        write_header(&mut out, version, Status::Fatal)?;
        out.write_utf(message)?;
        Ok(out)
    }

    /// A frame rejecting the client's credentials.
    pub fn login(version: i32, message: &str) -> ProtocolResult<Vec<u8>> {
        let mut out: Vec<u8> = Vec::new();
        write_header(&mut out, version, Status::Login)?;
        out.write_utf(message)?;
        Ok(out)
    }

    /// A frame acknowledging a requested rollback. `skipped` is opaque to
    /// the client.
    pub fn rollback(version: i32, skipped: &[u8]) -> ProtocolResult<Vec<u8>> {
        let mut out: Vec<u8> = Vec::new();
        write_header(&mut out, version, Status::Rollback)?;
        out.write_i32(to_wire_len(skipped.len())?)?;
        out.write_all(skipped)?;
        Ok(out)
    }
}

fn write_header(out: &mut Vec<u8>, version: i32, status: Status) -> ProtocolResult<()> {
    out.write_i32(version)?;
    out.write_u8(status.tag())?;
    Ok(())
}

fn encoded_utf(message: &str) -> ProtocolResult<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();
    buf.write_utf(message)?;
    Ok(buf)
}

fn write_entry(out: &mut Vec<u8>, entry: &ReplyEntry) -> ProtocolResult<()> {
    let payload_start = out.len() + REPLY_HEADER_LEN;
    out.write_u32(entry.request.as_u32())?;
    out.write_u8(entry.status.tag())?;
    match &entry.message {
        None => {
            out.write_i32(0)?;
            out.write_i32(to_wire_len(entry.payload.len())?)?;
            out.write_all(&entry.payload)?;
        }
        Some(message) if entry.status.is_success() => {
            let text = encoded_utf(message)?;
            let pos = payload_start + entry.payload.len();
            out.write_i32(to_wire_len(pos)?)?;
            out.write_i32(to_wire_len(entry.payload.len() + text.len())?)?;
            out.write_all(&entry.payload)?;
            out.write_all(&text)?;
        }
        Some(message) => {
            let pos = payload_start + entry.payload.len();
            out.write_i32(to_wire_len(pos)?)?;
            out.write_i32(to_wire_len(entry.payload.len())?)?;
            out.write_all(&entry.payload)?;
            out.write_utf(message)?;
        }
    }
    Ok(())
}
