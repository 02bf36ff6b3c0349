use std::io::Read;
use std::sync::Arc;

use fos_codec::{DataInput, OidTranscriber, Transcriber};
use fos_types::{Oid, RequestId, Status};

use crate::batch::read_bounded;
use crate::config::ProtocolConfig;
use crate::error::{ProtocolError, ProtocolResult, ReplyFailure};
use crate::message::Message;
use crate::observer::{ReplyObserver, TracingObserver};
use crate::request::Request;
use crate::state::StateResolver;

/// Failures collected during one decode pass.
#[derive(Default)]
struct FailureSet {
    failures: Vec<ReplyFailure>,
    optimistic: bool,
}

impl FailureSet {
    fn push(&mut self, failure: ReplyFailure) {
        self.optimistic |= failure.is_optimistic();
        self.failures.push(failure);
    }

    fn into_result(self) -> ProtocolResult<()> {
        if self.failures.is_empty() {
            Ok(())
        } else if self.optimistic {
            Err(ProtocolError::OptimisticVerification {
                failures: self.failures,
            })
        } else {
            Err(ProtocolError::DataStore {
                failures: self.failures,
            })
        }
    }
}

/// Header of one reply inside a normal frame.
#[derive(Clone, Copy, Debug)]
struct ReplyHeader {
    request: RequestId,
    status: Status,
    message_pos: i32,
    length: u64,
}

impl ReplyHeader {
    fn has_message(&self) -> bool {
        self.message_pos != 0
    }
}

/// Decodes reply frames and routes each reply to its request.
///
/// The frame is consumed in one strictly ordered pass. Stream-level
/// problems abort immediately; per-reply ERROR and OPTIMISTIC results are
/// collected and reported together once the frame is drained.
pub struct ReplyHandler {
    config: ProtocolConfig,
    observer: Arc<dyn ReplyObserver>,
}

impl Default for ReplyHandler {
    fn default() -> Self {
        Self::new(ProtocolConfig::default())
    }
}

impl ReplyHandler {
    pub fn new(config: ProtocolConfig) -> Self {
        Self {
            config,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ReplyObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Decode one reply frame for `message`.
    pub fn process(&self, input: &mut dyn Read, message: &mut Message) -> ProtocolResult<()> {
        let version = input.read_i32()?;
        if version != self.config.version {
            return Err(ProtocolError::VersionMismatch {
                expected: self.config.version,
                actual: version,
            });
        }

        let status = read_status(input)?;
        self.observer.frame_status(status);
        match status {
            Status::Fatal => {
                if let Some(connector) = message.connector() {
                    connector.set_rollback_only();
                }
                let text = input.read_utf()?;
                Err(ProtocolError::Fatal { message: text })
            }
            Status::Login => {
                let text = input.read_utf()?;
                Err(ProtocolError::Login { message: text })
            }
            Status::Rollback => {
                let skip = read_bounded(input, self.config.max_payload_len, "rollback length")?;
                input.skip_bytes(skip as u64)?;
                Ok(())
            }
            _ => self.process_replies(input, message),
        }
    }

    fn process_replies(&self, input: &mut dyn Read, message: &mut Message) -> ProtocolResult<()> {
        let count = read_bounded(input, self.config.max_replies, "reply count")?;
        self.observer.reply_count(count);

        let resolver = message.resolver().cloned();
        let mut failures = FailureSet::default();
        let mut outcome = Ok(());
        for _ in 0..count {
            let header = self.read_header(input)?;
            self.observer.reply(
                header.request,
                header.status,
                header.message_pos,
                header.length,
            );

            let Some(request) = message.get_request(header.request) else {
                input.skip_bytes(header.length)?;
                self.observer.unmatched(header.request, header.length);
                continue;
            };
            let dispatched =
                self.dispatch(input, request, header, resolver.as_deref(), &mut failures);
            message.retire(header.request);
            if let Err(err) = dispatched {
                outcome = Err(err);
                break;
            }
        }

        self.observer.finished(failures.failures.len());
        // a fatal abort wins over whatever was collected before it
        outcome?;
        failures.into_result()
    }

    fn read_header(&self, input: &mut dyn Read) -> ProtocolResult<ReplyHeader> {
        let request = RequestId::new(input.read_u32()?);
        let status = read_status(input)?;
        let message_pos = input.read_i32()?;
        let length = read_bounded(input, self.config.max_payload_len, "reply length")? as u64;
        Ok(ReplyHeader {
            request,
            status,
            message_pos,
            length,
        })
    }

    fn dispatch(
        &self,
        input: &mut dyn Read,
        request: &mut Request,
        header: ReplyHeader,
        resolver: Option<&dyn StateResolver>,
        failures: &mut FailureSet,
    ) -> ProtocolResult<()> {
        let ReplyHeader {
            request: id,
            status,
            length,
            ..
        } = header;

        if !header.has_message() {
            if matches!(status, Status::Error | Status::Fatal) {
                return Err(ProtocolError::Internal { request: id, status });
            }
            return self.handle(input, request, header);
        }

        match status {
            Status::Ok | Status::Warn => self.handle(input, request, header),
            Status::Fatal => {
                input.skip_bytes(length)?;
                let text = input.read_utf()?;
                request.record(status, Some(text.clone()));
                Err(ProtocolError::ReplyFatal {
                    request: id,
                    message: text,
                })
            }
            Status::Optimistic => {
                let oid = read_failed_oid(input, id, length)?;
                let failed = resolver.and_then(|r| r.resolve(oid));
                let text = input.read_utf()?;
                request.record(status, Some(text.clone()));
                let failure = ReplyFailure::OptimisticConflict {
                    request: id,
                    oid,
                    message: text,
                    failed,
                };
                self.observer.failure(&failure);
                failures.push(failure);
                Ok(())
            }
            _ => {
                input.skip_bytes(length)?;
                let text = input.read_utf()?;
                request.record(status, Some(text.clone()));
                let failure = ReplyFailure::DataStore {
                    request: id,
                    status,
                    message: text,
                };
                self.observer.failure(&failure);
                failures.push(failure);
                Ok(())
            }
        }
    }

    fn handle(
        &self,
        input: &mut dyn Read,
        request: &mut Request,
        header: ReplyHeader,
    ) -> ProtocolResult<()> {
        let unread =
            request.handle_reply(header.status, input, header.length, header.has_message())?;
        self.observer.dispatched(header.request, header.status, unread);
        if unread > 0 && self.config.strict_payloads {
            return Err(ProtocolError::MalformedFrame(format!(
                "{} left {unread} of {} payload bytes unread",
                header.request, header.length
            )));
        }
        Ok(())
    }
}

// Distinct messages are decoded on distinct threads through one shared handler.
const _: fn() = || {
    fn send<T: Send>() {}
    fn send_sync<T: Send + Sync>() {}
    send::<Message>();
    send_sync::<ReplyHandler>();
};

fn read_status(input: &mut dyn Read) -> ProtocolResult<Status> {
    let tag = input.read_u8()?;
    Status::from_tag(tag).map_err(|_| ProtocolError::UnknownStatus(tag))
}

/// The payload of an OPTIMISTIC reply is the identity of the object that
/// failed verification. Anything after it is drained.
fn read_failed_oid(input: &mut dyn Read, request: RequestId, length: u64) -> ProtocolResult<Oid> {
    if length < Oid::WIDTH as u64 {
        return Err(ProtocolError::MalformedFrame(format!(
            "{request}: optimistic payload of {length} bytes cannot hold an oid"
        )));
    }
    let mut payload = Read::take(&mut *input, length);
    let oid = OidTranscriber.fetch(&mut payload)?;
    let rest = payload.limit();
    payload.skip_bytes(rest)?;
    Ok(oid)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Mutex;
    use std::thread;

    use fos_codec::DataOutput;

    use super::*;
    use crate::connector::{Connector, LocalConnector};
    use crate::frame::ReplyBuilder;
    use crate::observer::NoopObserver;
    use crate::request::{CommitRequest, DeleteRequest, InsertRequest, RequestKind, UpdateRequest};
    use crate::state::StateTable;

    fn handler() -> ReplyHandler {
        ReplyHandler::default()
    }

    fn commit_payload(written: i32) -> Vec<u8> {
        written.to_be_bytes().to_vec()
    }

    /// Appends a marker after the frame so tests can check where decoding stopped.
    fn with_trailer(mut frame: Vec<u8>) -> Cursor<Vec<u8>> {
        frame.write_i32(0x5EED).unwrap();
        Cursor::new(frame)
    }

    #[test]
    fn fatal_frame_signals_rollback_once() {
        let connector = Arc::new(LocalConnector::new());
        let mut message = Message::default().with_connector(connector.clone());
        let frame = ReplyBuilder::fatal(1, "boom").unwrap();

        let err = handler().process(&mut Cursor::new(frame), &mut message).unwrap_err();
        assert!(matches!(&err, ProtocolError::Fatal { message } if message == "boom"));
        assert!(err.to_string().contains("boom"));
        assert_eq!(connector.signal_count(), 1);
        assert!(connector.is_rollback_only());
    }

    #[test]
    fn fatal_frame_without_connector() {
        let frame = ReplyBuilder::fatal(1, "boom").unwrap();
        let err = handler()
            .process(&mut Cursor::new(frame), &mut Message::default())
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn login_frame_is_fatal() {
        let connector = Arc::new(LocalConnector::new());
        let mut message = Message::default().with_connector(connector.clone());
        let frame = ReplyBuilder::login(1, "bad password").unwrap();
        let err = handler().process(&mut Cursor::new(frame), &mut message).unwrap_err();
        assert!(matches!(&err, ProtocolError::Login { message } if message == "bad password"));
        assert!(!err.is_retryable());
        assert_eq!(connector.signal_count(), 0);
    }

    #[test]
    fn rollback_frame_consumes_skip_region() {
        let frame = ReplyBuilder::rollback(1, &[0xAB; 10]).unwrap();
        let mut cur = with_trailer(frame);
        handler().process(&mut cur, &mut Message::default()).unwrap();
        assert_eq!(cur.read_i32().unwrap(), 0x5EED);
    }

    #[test]
    fn ok_then_optimistic_conflict() {
        let mut message = Message::default();
        let commit = message.add_request(CommitRequest::default()).unwrap();
        let delete = message.add_request(DeleteRequest { oid: Oid::new(2, 8) }).unwrap();

        let mut frame: Vec<u8> = Vec::new();
        frame.write_i32(1).unwrap();
        frame.write_u8(Status::Ok.tag()).unwrap();
        frame.write_i32(2).unwrap();
        frame.write_u32(commit.as_u32()).unwrap();
        frame.write_u8(Status::Ok.tag()).unwrap();
        frame.write_i32(0).unwrap();
        frame.write_i32(4).unwrap();
        frame.write_i32(6).unwrap();
        frame.write_u32(delete.as_u32()).unwrap();
        frame.write_u8(Status::Optimistic.tag()).unwrap();
        frame.write_i32(5).unwrap();
        frame.write_i32(Oid::WIDTH as i32).unwrap();
        frame.extend_from_slice(&Oid::new(2, 8).to_bytes());
        frame.write_utf("conflict").unwrap();
        let mut cur = with_trailer(frame);

        let err = handler().process(&mut cur, &mut message).unwrap_err();
        match &err {
            ProtocolError::OptimisticVerification { failures } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].message(), "conflict");
                assert_eq!(failures[0].request(), delete);
                assert!(failures[0].failed_object().is_none());
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(!err.is_fatal());

        let handled = message.request(commit).unwrap();
        assert_eq!(handled.status(), Some(Status::Ok));
        assert_eq!(
            handled.kind(),
            &RequestKind::Commit(CommitRequest { written: Some(6) })
        );
        assert_eq!(message.request(delete).unwrap().status(), Some(Status::Optimistic));
        assert_eq!(message.pending_len(), 0);
        assert_eq!(cur.read_i32().unwrap(), 0x5EED);
    }

    #[test]
    fn optimistic_conflict_resolves_failed_object() {
        let oid = Oid::new(3, 11);
        let mut table = StateTable::new();
        table.insert(oid, Arc::new("account#11"));
        let mut message = Message::default().with_resolver(Arc::new(table));
        let id = message.add_request(UpdateRequest { oid, values: vec![] }).unwrap();
        let frame = ReplyBuilder::new(1).optimistic(id, oid, "stale").finish().unwrap();

        let err = handler().process(&mut Cursor::new(frame), &mut message).unwrap_err();
        let failure = &err.failures()[0];
        let object = failure.failed_object().unwrap();
        assert_eq!(format!("{object:?}"), "\"account#11\"");
    }

    #[test]
    fn short_optimistic_payload_is_malformed() {
        let mut message = Message::default();
        let id = message.add_request(DeleteRequest { oid: Oid::new(1, 1) }).unwrap();
        let frame = ReplyBuilder::new(1)
            .reply_with_message(id, Status::Optimistic, vec![0u8; 4], "stale")
            .finish()
            .unwrap();
        let err = handler().process(&mut Cursor::new(frame), &mut message).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedFrame(_)));
    }

    #[test]
    fn unmatched_reply_is_skipped() {
        let mut message = Message::default();
        let id = message.add_request(CommitRequest::default()).unwrap();
        let frame = ReplyBuilder::new(1)
            .reply(RequestId::new(77), Status::Ok, vec![9u8; 13])
            .reply(id, Status::Ok, commit_payload(2))
            .finish()
            .unwrap();
        let mut cur = with_trailer(frame);

        handler().process(&mut cur, &mut message).unwrap();
        assert_eq!(
            message.request(id).unwrap().kind(),
            &RequestKind::Commit(CommitRequest { written: Some(2) })
        );
        assert_eq!(cur.read_i32().unwrap(), 0x5EED);
    }

    #[test]
    fn unmatched_reply_skips_only_its_payload() {
        // an unmatched reply skips `length` bytes; a diagnostic written after
        // the payload is then read as the next reply header
        let mut message = Message::default();
        let id = message.add_request(CommitRequest::default()).unwrap();
        let frame = ReplyBuilder::new(1)
            .reply_with_message(RequestId::new(40), Status::Error, Vec::<u8>::new(), "stale")
            .reply(id, Status::Ok, commit_payload(1))
            .finish()
            .unwrap();

        let err = handler().process(&mut Cursor::new(frame), &mut message).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownStatus(b'a')));
        assert_eq!(message.request(id).unwrap().status(), None);
    }

    #[test]
    fn retired_request_is_not_dispatched_twice() {
        let mut message = Message::default();
        let id = message.add_request(CommitRequest::default()).unwrap();
        let first = ReplyBuilder::new(1)
            .reply(id, Status::Ok, commit_payload(1))
            .finish()
            .unwrap();
        handler().process(&mut Cursor::new(first), &mut message).unwrap();

        let second = ReplyBuilder::new(1)
            .reply(id, Status::Ok, commit_payload(9))
            .finish()
            .unwrap();
        handler().process(&mut Cursor::new(second), &mut message).unwrap();
        assert_eq!(
            message.request(id).unwrap().kind(),
            &RequestKind::Commit(CommitRequest { written: Some(1) })
        );
    }

    #[test]
    fn errors_are_aggregated_in_stream_order() {
        let mut message = Message::default();
        let ids: Vec<RequestId> = (0..3)
            .map(|_| message.add_request(CommitRequest::default()).unwrap())
            .collect();
        let mut builder = ReplyBuilder::new(1);
        for (id, text) in ids.iter().zip(["a", "b", "c"]) {
            builder = builder.reply_with_message(*id, Status::Error, vec![1u8, 2, 3], text);
        }
        let mut cur = with_trailer(builder.finish().unwrap());

        let err = handler().process(&mut cur, &mut message).unwrap_err();
        let ProtocolError::DataStore { failures } = &err else {
            panic!("unexpected error {err:?}");
        };
        let texts: Vec<&str> = failures.iter().map(|f| f.message()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        assert!(failures.iter().all(|f| !f.is_optimistic()));
        assert_eq!(cur.read_i32().unwrap(), 0x5EED);
    }

    #[test]
    fn optimistic_flag_marks_mixed_composite() {
        let mut message = Message::default();
        let a = message.add_request(CommitRequest::default()).unwrap();
        let b = message.add_request(DeleteRequest { oid: Oid::new(1, 2) }).unwrap();
        let frame = ReplyBuilder::new(1)
            .reply_with_message(a, Status::Error, Vec::<u8>::new(), "a")
            .optimistic(b, Oid::new(1, 2), "b")
            .finish()
            .unwrap();
        let err = handler().process(&mut Cursor::new(frame), &mut message).unwrap_err();
        assert!(matches!(
            &err,
            ProtocolError::OptimisticVerification { failures } if failures.len() == 2
        ));
    }

    #[test]
    fn in_loop_fatal_aborts() {
        let mut message = Message::default();
        let a = message.add_request(CommitRequest::default()).unwrap();
        let b = message.add_request(CommitRequest::default()).unwrap();
        let c = message.add_request(CommitRequest::default()).unwrap();
        let frame = ReplyBuilder::new(1)
            .reply_with_message(a, Status::Error, Vec::<u8>::new(), "a")
            .reply_with_message(b, Status::Fatal, vec![0u8; 3], "disk gone")
            .reply(c, Status::Ok, commit_payload(1))
            .finish()
            .unwrap();
        let err = handler().process(&mut Cursor::new(frame), &mut message).unwrap_err();
        assert!(matches!(
            &err,
            ProtocolError::ReplyFatal { request, message }
                if *request == b && message == "disk gone"
        ));
        assert!(message.get_request(c).is_some());
    }

    #[test]
    fn error_without_message_is_internal() {
        for status in [Status::Error, Status::Fatal] {
            let mut message = Message::default();
            let id = message.add_request(CommitRequest::default()).unwrap();
            let frame = ReplyBuilder::new(1).reply(id, status, Vec::<u8>::new()).finish().unwrap();
            let err = handler().process(&mut Cursor::new(frame), &mut message).unwrap_err();
            assert!(matches!(err, ProtocolError::Internal { status: s, .. } if s == status));
        }
    }

    #[test]
    fn other_status_without_message_goes_to_request() {
        let mut message = Message::default();
        let id = message.add_request(CommitRequest::default()).unwrap();
        let frame = ReplyBuilder::new(1)
            .reply(id, Status::Rollback, vec![1u8, 2])
            .finish()
            .unwrap();
        handler().process(&mut Cursor::new(frame), &mut message).unwrap();
        let request = message.request(id).unwrap();
        assert_eq!(request.status(), Some(Status::Rollback));
        assert_eq!(request.kind(), &RequestKind::Commit(CommitRequest { written: None }));
    }

    #[test]
    fn warn_with_message_reaches_request() {
        let mut message = Message::default();
        let id = message.add_request(InsertRequest::new(4, vec![])).unwrap();
        let frame = ReplyBuilder::new(1)
            .reply_with_message(id, Status::Warn, Oid::new(4, 40).to_bytes(), "slow index")
            .finish()
            .unwrap();
        let mut cur = with_trailer(frame);
        handler().process(&mut cur, &mut message).unwrap();

        let request = message.request(id).unwrap();
        assert_eq!(request.message(), Some("slow index"));
        match request.kind() {
            RequestKind::Insert(r) => assert_eq!(r.assigned, Some(Oid::new(4, 40))),
            other => panic!("unexpected kind {other:?}"),
        }
        assert_eq!(cur.read_i32().unwrap(), 0x5EED);
    }

    #[test]
    fn version_mismatch_aborts() {
        let frame = ReplyBuilder::new(7).finish().unwrap();
        let err = handler()
            .process(&mut Cursor::new(frame), &mut Message::default())
            .unwrap_err();
        assert!(matches!(err, ProtocolError::VersionMismatch { expected: 1, actual: 7 }));
    }

    #[test]
    fn unknown_status_tag() {
        let frame = vec![0u8, 0, 0, 1, 0x42];
        let err = handler()
            .process(&mut Cursor::new(frame), &mut Message::default())
            .unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownStatus(0x42)));
    }

    #[test]
    fn truncated_frame_is_io_error() {
        let mut frame = ReplyBuilder::new(1)
            .reply(RequestId::new(1), Status::Ok, vec![0u8; 8])
            .finish()
            .unwrap();
        frame.truncate(frame.len() - 3);
        let err = handler()
            .process(&mut Cursor::new(frame), &mut Message::default())
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Codec(ref e) if e.is_eof()));
    }

    #[test]
    fn strict_payloads_reject_leftovers() {
        let config = ProtocolConfig {
            strict_payloads: true,
            ..Default::default()
        };
        let mut message = Message::default();
        let id = message.add_request(CommitRequest::default()).unwrap();
        let frame = ReplyBuilder::new(1).reply(id, Status::Ok, vec![0u8; 6]).finish().unwrap();

        let err = ReplyHandler::new(config)
            .process(&mut Cursor::new(frame.clone()), &mut message)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedFrame(_)));

        let mut lenient = Message::default();
        let id = lenient.add_request(CommitRequest::default()).unwrap();
        handler().process(&mut Cursor::new(frame), &mut lenient).unwrap();
        assert_eq!(lenient.request(id).unwrap().status(), Some(Status::Ok));
    }

    #[test]
    fn same_bytes_decode_identically() {
        let frame = ReplyBuilder::new(1)
            .reply(RequestId::new(1), Status::Ok, commit_payload(3))
            .reply_with_message(RequestId::new(2), Status::Error, Vec::<u8>::new(), "no")
            .finish()
            .unwrap();

        let run = || {
            let mut message = Message::default();
            message.add_request(CommitRequest::default()).unwrap();
            message.add_request(CommitRequest::default()).unwrap();
            let err = handler().process(&mut Cursor::new(frame.clone()), &mut message).unwrap_err();
            let requests: Vec<Request> = message.retired().cloned().collect();
            (err.to_string(), requests)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn distinct_messages_decode_on_separate_threads() {
        let handler = ReplyHandler::default().with_observer(Arc::new(NoopObserver));
        let frame = ReplyBuilder::new(1)
            .reply(RequestId::FIRST, Status::Ok, commit_payload(7))
            .finish()
            .unwrap();

        let kinds: Vec<RequestKind> = thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        let mut message = Message::default();
                        let id = message.add_request(CommitRequest::default()).unwrap();
                        handler.process(&mut Cursor::new(frame.clone()), &mut message).unwrap();
                        message.request(id).unwrap().kind().clone()
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(kinds.len(), 8);
        let expected = RequestKind::Commit(CommitRequest { written: Some(7) });
        assert!(kinds.iter().all(|k| *k == expected));
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ReplyObserver for Recorder {
        fn frame_status(&self, status: Status) {
            self.events.lock().unwrap().push(format!("frame {status}"));
        }

        fn unmatched(&self, request: RequestId, length: u64) {
            self.events.lock().unwrap().push(format!("skip {request} {length}"));
        }

        fn dispatched(&self, request: RequestId, status: Status, unread: u64) {
            self.events.lock().unwrap().push(format!("{request} {status} {unread}"));
        }

        fn failure(&self, failure: &ReplyFailure) {
            self.events.lock().unwrap().push(format!("fail {}", failure.request()));
        }

        fn finished(&self, failures: usize) {
            self.events.lock().unwrap().push(format!("done {failures}"));
        }
    }

    #[test]
    fn observer_sees_events_in_order() {
        let recorder = Arc::new(Recorder::default());
        let handler = ReplyHandler::default().with_observer(recorder.clone());
        let mut message = Message::default();
        let a = message.add_request(CommitRequest::default()).unwrap();
        let b = message.add_request(CommitRequest::default()).unwrap();
        let frame = ReplyBuilder::new(1)
            .reply(RequestId::new(50), Status::Ok, vec![0u8; 2])
            .reply(a, Status::Ok, vec![0u8, 0, 0, 1, 0xFF])
            .reply_with_message(b, Status::Error, Vec::<u8>::new(), "x")
            .finish()
            .unwrap();

        let _ = handler.process(&mut Cursor::new(frame), &mut message);
        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec!["frame OK", "skip req#50 2", "req#1 OK 1", "fail req#2", "done 1"]
        );
    }
}
