use std::io::{Read, Write};

use fos_codec::{
    DataInput, DataOutput, OidTranscriber, Transcriber, TranscriberRegistry, TypeTag, Value,
};
use fos_types::{Oid, RequestId, Status};

use crate::error::{ProtocolError, ProtocolResult};

/// Open a transaction. Empty reply.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BeginRequest {
    pub optimistic: bool,
}

/// Commit the current transaction. The reply carries the number of objects
/// the store wrote.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommitRequest {
    pub written: Option<i32>,
}

/// Roll back the current transaction. The body is empty: being in the
/// batch is the whole request. A rollback answers with a ROLLBACK frame,
/// so its reply callback normally never runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RollbackRequest;

/// Read selected fields of one object.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchRequest {
    pub oid: Oid,
    pub fields: Vec<TypeTag>,
    /// Field values in `fields` order once the reply arrived.
    pub values: Option<Vec<Value>>,
}

/// Store a new object. The reply carries the assigned identity.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertRequest {
    pub class_id: u32,
    pub values: Vec<Value>,
    pub assigned: Option<Oid>,
}

/// Overwrite the fields of an existing object. Empty reply; subject to
/// optimistic verification.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateRequest {
    pub oid: Oid,
    pub values: Vec<Value>,
}

/// Remove an object. Empty reply; subject to optimistic verification.
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteRequest {
    pub oid: Oid,
}

impl FetchRequest {
    pub fn new(oid: Oid, fields: Vec<TypeTag>) -> Self {
        Self {
            oid,
            fields,
            values: None,
        }
    }

    /// Server side: the reply payload answering a fetch with `values`.
    pub fn reply_payload(values: &[Value]) -> ProtocolResult<Vec<u8>> {
        let registry = TranscriberRegistry::global();
        let mut out: Vec<u8> = Vec::new();
        for value in values {
            registry.store(value, &mut out)?;
        }
        Ok(out)
    }
}

impl InsertRequest {
    pub fn new(class_id: u32, values: Vec<Value>) -> Self {
        Self {
            class_id,
            values,
            assigned: None,
        }
    }
}

/// The closed set of request kinds a message can carry.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestKind {
    Begin(BeginRequest),
    Commit(CommitRequest),
    Rollback(RollbackRequest),
    Fetch(FetchRequest),
    Insert(InsertRequest),
    Update(UpdateRequest),
    Delete(DeleteRequest),
}

macro_rules! impl_from_request {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for RequestKind {
                fn from(request: $ty) -> Self {
                    Self::$variant(request)
                }
            }
        )*
    };
}

impl_from_request!(
    Begin => BeginRequest,
    Commit => CommitRequest,
    Rollback => RollbackRequest,
    Fetch => FetchRequest,
    Insert => InsertRequest,
    Update => UpdateRequest,
    Delete => DeleteRequest,
);

fn write_values(values: &[Value], out: &mut dyn Write) -> ProtocolResult<()> {
    let registry = TranscriberRegistry::global();
    out.write_i32(wire_count(values.len())?)?;
    for value in values {
        out.write_u8(value.tag().to_byte())?;
        registry.store(value, out)?;
    }
    Ok(())
}

fn read_values(input: &mut dyn Read) -> ProtocolResult<Vec<Value>> {
    let registry = TranscriberRegistry::global();
    let count = read_count(input)?;
    let mut values = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let transcriber = registry.for_byte(input.read_u8()?)?;
        values.push(transcriber.fetch_value(input)?);
    }
    Ok(values)
}

fn wire_count(len: usize) -> ProtocolResult<i32> {
    i32::try_from(len).map_err(|_| ProtocolError::MalformedFrame(format!("count {len} too large")))
}

fn read_count(input: &mut dyn Read) -> ProtocolResult<usize> {
    let count = input.read_i32()?;
    usize::try_from(count)
        .map_err(|_| ProtocolError::MalformedFrame(format!("negative count {count}")))
}

impl RequestKind {
    pub fn tag(&self) -> u8 {
        match self {
            Self::Begin(_) => 1,
            Self::Commit(_) => 2,
            Self::Rollback(_) => 3,
            Self::Fetch(_) => 4,
            Self::Insert(_) => 5,
            Self::Update(_) => 6,
            Self::Delete(_) => 7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Begin(_) => "Begin",
            Self::Commit(_) => "Commit",
            Self::Rollback(_) => "Rollback",
            Self::Fetch(_) => "Fetch",
            Self::Insert(_) => "Insert",
            Self::Update(_) => "Update",
            Self::Delete(_) => "Delete",
        }
    }

    /// Write the request-specific body. Framing is the message's job.
    pub fn encode_body(&self, out: &mut dyn Write) -> ProtocolResult<()> {
        match self {
            Self::Begin(r) => out.write_bool(r.optimistic)?,
            Self::Commit(_) | Self::Rollback(_) => {}
            Self::Fetch(r) => {
                OidTranscriber.store(&r.oid, out)?;
                out.write_i32(wire_count(r.fields.len())?)?;
                for field in &r.fields {
                    out.write_u8(field.to_byte())?;
                }
            }
            Self::Insert(r) => {
                out.write_u32(r.class_id)?;
                write_values(&r.values, out)?;
            }
            Self::Update(r) => {
                OidTranscriber.store(&r.oid, out)?;
                write_values(&r.values, out)?;
            }
            Self::Delete(r) => OidTranscriber.store(&r.oid, out)?,
        }
        Ok(())
    }

    /// Server side: rebuild a request from its kind tag and body.
    pub fn decode_body(tag: u8, input: &mut dyn Read) -> ProtocolResult<Self> {
        let kind = match tag {
            1 => Self::Begin(BeginRequest {
                optimistic: input.read_bool()?,
            }),
            2 => Self::Commit(CommitRequest::default()),
            3 => Self::Rollback(RollbackRequest),
            4 => {
                let oid = OidTranscriber.fetch(input)?;
                let count = read_count(input)?;
                let mut fields = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    fields.push(TypeTag::from_byte(input.read_u8()?)?);
                }
                Self::Fetch(FetchRequest::new(oid, fields))
            }
            5 => {
                let class_id = input.read_u32()?;
                Self::Insert(InsertRequest::new(class_id, read_values(input)?))
            }
            6 => Self::Update(UpdateRequest {
                oid: OidTranscriber.fetch(input)?,
                values: read_values(input)?,
            }),
            7 => Self::Delete(DeleteRequest {
                oid: OidTranscriber.fetch(input)?,
            }),
            other => {
                return Err(ProtocolError::MalformedFrame(format!(
                    "unknown request kind {other}"
                )))
            }
        };
        Ok(kind)
    }

    /// Decode the kind-specific part of a successful reply.
    fn read_reply(&mut self, input: &mut dyn Read) -> ProtocolResult<()> {
        match self {
            Self::Begin(_) | Self::Rollback(_) | Self::Update(_) | Self::Delete(_) => {}
            Self::Commit(r) => r.written = Some(input.read_i32()?),
            Self::Fetch(r) => {
                let registry = TranscriberRegistry::global();
                let values = r
                    .fields
                    .iter()
                    .map(|tag| registry.get(*tag)?.fetch_value(input))
                    .collect::<Result<Vec<_>, _>>()?;
                r.values = Some(values);
            }
            Self::Insert(r) => r.assigned = Some(OidTranscriber.fetch(input)?),
        }
        Ok(())
    }
}

/// One unit of client work inside a [`Message`](crate::Message).
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    id: RequestId,
    kind: RequestKind,
    status: Option<Status>,
    message: Option<String>,
}

impl Request {
    pub(crate) fn new(id: RequestId, kind: RequestKind) -> Self {
        Self {
            id,
            kind,
            status: None,
            message: None,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn kind(&self) -> &RequestKind {
        &self.kind
    }

    /// Status of the reply this request handled, if any.
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    /// Diagnostic the store attached to the reply.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn encode_body(&self, out: &mut dyn Write) -> ProtocolResult<()> {
        self.kind.encode_body(out)
    }

    /// Note a reply the handler consumed on this request's behalf.
    pub(crate) fn record(&mut self, status: Status, message: Option<String>) {
        self.status = Some(status);
        self.message = message;
    }

    /// Consume a `length`-byte reply payload.
    ///
    /// For OK and WARN the kind decodes its data, followed by the diagnostic
    /// string when `has_message` is set. Anything left unread is drained so
    /// the stream stays aligned; the drained byte count is returned.
    pub fn handle_reply(
        &mut self,
        status: Status,
        input: &mut dyn Read,
        length: u64,
        has_message: bool,
    ) -> ProtocolResult<u64> {
        let mut payload = Read::take(&mut *input, length);
        if status.is_success() {
            self.kind.read_reply(&mut payload)?;
            if has_message {
                self.message = Some(payload.read_utf()?);
            }
        }
        self.status = Some(status);

        let unread = payload.limit();
        if unread > 0 {
            payload.skip_bytes(unread)?;
        }
        Ok(unread)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn body(kind: &RequestKind) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::new();
        kind.encode_body(&mut out).unwrap();
        out
    }

    #[test]
    fn rollback_and_commit_bodies_are_empty() {
        assert!(body(&RollbackRequest.into()).is_empty());
        assert!(body(&CommitRequest::default().into()).is_empty());
    }

    #[test]
    fn kind_tags_unique() {
        let kinds: Vec<RequestKind> = vec![
            BeginRequest::default().into(),
            CommitRequest::default().into(),
            RollbackRequest.into(),
            FetchRequest::new(Oid::null(), vec![]).into(),
            InsertRequest::new(0, vec![]).into(),
            UpdateRequest { oid: Oid::null(), values: vec![] }.into(),
            DeleteRequest { oid: Oid::null() }.into(),
        ];
        let mut tags: Vec<u8> = kinds.iter().map(|k| k.tag()).collect();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), kinds.len());
    }

    #[test]
    fn bodies_decode_back() {
        let kinds: Vec<RequestKind> = vec![
            BeginRequest { optimistic: true }.into(),
            FetchRequest::new(Oid::new(2, 9), vec![TypeTag::Int, TypeTag::String]).into(),
            InsertRequest::new(4, vec![Value::Long(-1), Value::String("ann".into())]).into(),
            UpdateRequest { oid: Oid::new(4, 1), values: vec![Value::Boolean(false)] }.into(),
            DeleteRequest { oid: Oid::new(4, 2) }.into(),
        ];
        for kind in kinds {
            let bytes = body(&kind);
            let mut cur = Cursor::new(bytes.clone());
            let decoded = RequestKind::decode_body(kind.tag(), &mut cur).unwrap();
            assert_eq!(decoded, kind);
            assert_eq!(cur.position() as usize, bytes.len());
        }
    }

    #[test]
    fn decode_unknown_kind() {
        let err = RequestKind::decode_body(42, &mut Cursor::new(Vec::<u8>::new())).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedFrame(_)));
    }

    #[test]
    fn commit_reads_written_count() {
        let mut req = Request::new(RequestId::FIRST, CommitRequest::default().into());
        let mut cur = Cursor::new(vec![0u8, 0, 0, 3]);
        let unread = req.handle_reply(Status::Ok, &mut cur, 4, false).unwrap();
        assert_eq!(unread, 0);
        assert_eq!(req.status(), Some(Status::Ok));
        assert_eq!(req.kind(), &RequestKind::Commit(CommitRequest { written: Some(3) }));
    }

    #[test]
    fn fetch_reads_fields_in_order() {
        let values = vec![Value::Int(30), Value::String("bob".into()), Value::Double(1.5)];
        let payload = FetchRequest::reply_payload(&values).unwrap();
        let fields = values.iter().map(Value::tag).collect();
        let fetch = FetchRequest::new(Oid::new(1, 1), fields);
        let mut req = Request::new(RequestId::FIRST, fetch.into());
        let len = payload.len() as u64;
        req.handle_reply(Status::Ok, &mut Cursor::new(payload), len, false).unwrap();
        match req.kind() {
            RequestKind::Fetch(f) => assert_eq!(f.values.as_ref(), Some(&values)),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn warn_reads_trailing_message() {
        let mut payload: Vec<u8> = Vec::new();
        OidTranscriber.store(&Oid::new(5, 5), &mut payload).unwrap();
        payload.write_utf("index rebuilt").unwrap();
        let len = payload.len() as u64;
        let mut req = Request::new(RequestId::FIRST, InsertRequest::new(5, vec![]).into());
        req.handle_reply(Status::Warn, &mut Cursor::new(payload), len, true).unwrap();
        assert_eq!(req.message(), Some("index rebuilt"));
        assert_eq!(req.status(), Some(Status::Warn));
    }

    #[test]
    fn leftover_bytes_are_drained() {
        let mut stream: Vec<u8> = vec![0, 0, 0, 1, 0xAA, 0xBB];
        stream.write_i32(99).unwrap();
        let mut cur = Cursor::new(stream);
        let mut req = Request::new(RequestId::FIRST, CommitRequest::default().into());
        let unread = req.handle_reply(Status::Ok, &mut cur, 6, false).unwrap();
        assert_eq!(unread, 2);
        assert_eq!(cur.read_i32().unwrap(), 99);
    }

    #[test]
    fn non_success_status_skips_kind_decoding() {
        let mut cur = Cursor::new(vec![1u8, 2, 3]);
        let mut req = Request::new(RequestId::FIRST, CommitRequest::default().into());
        let unread = req.handle_reply(Status::Optimistic, &mut cur, 3, false).unwrap();
        assert_eq!(unread, 3);
        assert_eq!(req.kind(), &RequestKind::Commit(CommitRequest { written: None }));
        assert_eq!(req.status(), Some(Status::Optimistic));
    }

    #[test]
    fn short_payload_is_an_error() {
        let mut cur = Cursor::new(vec![0u8, 0, 0, 3]);
        let mut req = Request::new(RequestId::FIRST, CommitRequest::default().into());
        let err = req.handle_reply(Status::Ok, &mut cur, 2, false).unwrap_err();
        assert!(matches!(err, ProtocolError::Codec(ref e) if e.is_eof()));
    }
}
