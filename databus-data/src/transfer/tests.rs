//! Unit tests for the transfer pipeline.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use camino::Utf8PathBuf;
use databus_core::test_support::RecordingSink;
use databus_core::{ChunkSize, DavPath, SharedProgress};
use rstest::{fixture, rstest};
use sha2::{Digest, Sha256};

use super::*;
use crate::test_support::{DavCall, StubSource, StubWebDav, block_on_for_tests};

const MIB: usize = 1_048_576;

struct Recorder {
    sink: Arc<Mutex<RecordingSink>>,
}

impl Recorder {
    fn progress(&self) -> SharedProgress {
        Arc::clone(&self.sink) as SharedProgress
    }

    fn labels(&self) -> Vec<String> {
        self.sink
            .lock()
            .expect("sink lock")
            .events()
            .iter()
            .map(|event| event.label.clone())
            .collect()
    }

    fn byte_counts(&self) -> Vec<u64> {
        self.sink.lock().expect("sink lock").byte_counts()
    }
}

#[fixture]
fn recorder() -> Recorder {
    Recorder {
        sink: Arc::new(Mutex::new(RecordingSink::default())),
    }
}

fn upload_path() -> DavPath {
    DavPath::parse("a/b/c/file.ttl").expect("valid path")
}

fn request(chunk_size: usize, mode: BufferMode) -> TransferRequest {
    TransferRequest {
        chunk_size: ChunkSize::new(chunk_size).expect("non-zero chunk size"),
        mode,
    }
}

#[rstest]
#[case(BufferMode::Streaming)]
#[case(BufferMode::InMemory)]
fn missing_source_fails_before_touching_the_store(recorder: Recorder, #[case] mode: BufferMode) {
    let source = StubSource::failing(404, "not found");
    let store = StubWebDav::default();
    let target = WebDavTarget::new(&store, upload_path());

    let outcome = block_on_for_tests(run_transfer(
        &source,
        &target,
        request(4, mode),
        recorder.progress(),
    ));

    assert_eq!(outcome.state(), TerminalState::DownloadFailed);
    let TransferOutcome::DownloadFailed { message } = outcome else {
        panic!("expected a download failure");
    };
    assert!(message.contains("404"));
    assert!(message.contains("not found"));
    assert!(store.calls().is_empty());
    assert_eq!(store.put_count(), 0);
    assert!(recorder.labels().is_empty());
}

#[rstest]
fn buffered_transfer_reports_every_download_chunk_first(recorder: Recorder) {
    let data = vec![7_u8; 10 * MIB];
    let source = StubSource::with_reads(&data, 64 * 1024);
    let store = StubWebDav::default();
    let target = WebDavTarget::new(&store, upload_path());

    let report = block_on_for_tests(transfer(
        &source,
        &target,
        request(MIB, BufferMode::InMemory),
        recorder.progress(),
    ))
    .expect("transfer succeeds");

    let labels = recorder.labels();
    assert_eq!(labels.len(), 20);
    let (download, upload) = labels.split_at(10);
    assert!(download.iter().all(|label| label == DOWNLOAD_LABEL));
    assert!(upload.iter().all(|label| label == UPLOAD_LABEL));
    assert_eq!(report.bytes, 10 * 1_048_576);
    assert_eq!(report.chunks, 10);
    assert_eq!(store.file("a/b/c/file.ttl").map(|f| f.len()), Some(10 * MIB));
}

#[rstest]
fn buffered_upload_reports_offsets_before_each_chunk(recorder: Recorder) {
    let source = StubSource::with_bytes(Bytes::from_static(b"0123456789"));
    let store = StubWebDav::default();
    let target = WebDavTarget::new(&store, upload_path());

    block_on_for_tests(transfer(
        &source,
        &target,
        request(4, BufferMode::InMemory),
        recorder.progress(),
    ))
    .expect("transfer succeeds");

    assert_eq!(recorder.byte_counts(), vec![4, 8, 10, 0, 4, 8]);
}

#[rstest]
fn only_missing_collections_are_created(recorder: Recorder) {
    let source = StubSource::with_bytes(Bytes::from_static(b"<s> <p> <o> ."));
    let store = StubWebDav::with_collections(["a"]);
    let target = WebDavTarget::new(&store, upload_path());

    block_on_for_tests(transfer(
        &source,
        &target,
        TransferRequest::default(),
        recorder.progress(),
    ))
    .expect("transfer succeeds");

    assert_eq!(store.created(), vec!["a/b", "a/b/c"]);
    assert_eq!(store.put_count(), 1);
}

#[rstest]
fn existing_collections_are_left_alone(recorder: Recorder) {
    let source = StubSource::with_bytes(Bytes::from_static(b"data"));
    let store = StubWebDav::with_collections(["a", "a/b", "a/b/c"]);
    let target = WebDavTarget::new(&store, upload_path());

    block_on_for_tests(transfer(
        &source,
        &target,
        TransferRequest::default(),
        recorder.progress(),
    ))
    .expect("transfer succeeds");

    assert!(store.created().is_empty());
    assert_eq!(
        store.calls(),
        vec![
            DavCall::Probe("a".to_owned()),
            DavCall::Probe("a/b".to_owned()),
            DavCall::Probe("a/b/c".to_owned()),
            DavCall::Put("a/b/c/file.ttl".to_owned()),
        ]
    );
}

#[rstest]
fn forbidden_collection_stops_the_transfer(recorder: Recorder) {
    let source = StubSource::with_bytes(Bytes::from_static(b"data"));
    let store = StubWebDav::with_collections(["a"]).failing_mkcol("a/b", 403);
    let target = WebDavTarget::new(&store, upload_path());

    let outcome = block_on_for_tests(run_transfer(
        &source,
        &target,
        TransferRequest::default(),
        recorder.progress(),
    ));

    assert_eq!(outcome.state(), TerminalState::UploadFailed);
    assert_eq!(
        store.calls().last(),
        Some(&DavCall::MakeCollection("a/b".to_owned()))
    );
    assert_eq!(store.put_count(), 0);
}

#[rstest]
fn streaming_transfer_hashes_and_stores_the_payload(recorder: Recorder) {
    let data = b"0123456789abcdef".repeat(100);
    let source = StubSource::with_reads(&data, 7);
    let store = StubWebDav::default();
    let target = WebDavTarget::new(&store, upload_path());

    let report = block_on_for_tests(transfer(
        &source,
        &target,
        request(256, BufferMode::Streaming),
        recorder.progress(),
    ))
    .expect("transfer succeeds");

    assert_eq!(report.bytes, 1600);
    assert_eq!(report.chunks, 7);
    assert_eq!(report.sha256, hex::encode(Sha256::digest(&data)));
    assert_eq!(store.file("a/b/c/file.ttl"), Some(data));
    assert!(recorder.labels().iter().all(|label| label == STREAM_LABEL));
    assert_eq!(recorder.byte_counts().last(), Some(&1600));
}

#[rstest]
fn broken_source_stream_is_a_download_failure(recorder: Recorder) {
    let source = StubSource::breaking_after(Bytes::from_static(b"partial"));
    let store = StubWebDav::default();
    let target = WebDavTarget::new(&store, upload_path());

    let err = block_on_for_tests(transfer(
        &source,
        &target,
        TransferRequest::default(),
        recorder.progress(),
    ))
    .expect_err("source breaks off");

    assert!(matches!(err, TransferError::Fetch { .. }));
    assert_eq!(err.terminal_state(), TerminalState::DownloadFailed);
    assert!(store.file("a/b/c/file.ttl").is_none());
}

#[rstest]
#[case(BufferMode::Streaming)]
#[case(BufferMode::InMemory)]
fn rejected_put_is_an_upload_failure(recorder: Recorder, #[case] mode: BufferMode) {
    let source = StubSource::with_bytes(Bytes::from_static(b"data"));
    let store = StubWebDav::default().with_put_status(500);
    let target = WebDavTarget::new(&store, upload_path());

    let err = block_on_for_tests(transfer(&source, &target, request(2, mode), recorder.progress()))
        .expect_err("put rejected");

    let TransferError::Upload { url, status, body } = err else {
        panic!("expected an upload error, got {err:?}");
    };
    assert_eq!(url, "https://databus.example.org/dav/alice/a/b/c/file.ttl");
    assert_eq!(status, 500);
    assert_eq!(body, "rejected");
}

#[rstest]
fn unreachable_probes_fall_back_to_creating(recorder: Recorder) {
    let source = StubSource::with_bytes(Bytes::from_static(b"data"));
    let store = StubWebDav::default().with_unreachable_probes();
    let target = WebDavTarget::new(&store, upload_path());

    let outcome = block_on_for_tests(run_transfer(
        &source,
        &target,
        TransferRequest::default(),
        recorder.progress(),
    ));

    assert_eq!(outcome.state(), TerminalState::Success);
    assert_eq!(store.created(), vec!["a", "a/b", "a/b/c"]);
}

#[rstest]
fn file_target_writes_the_payload(recorder: Recorder) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = Utf8PathBuf::from_path_buf(dir.path().join("nested/out.ttl")).expect("utf-8 path");
    let source = StubSource::with_reads(b"hello graph", 3);
    let target = FileTarget::new(path.clone(), false);

    let report = block_on_for_tests(transfer(
        &source,
        &target,
        request(4, BufferMode::Streaming),
        recorder.progress(),
    ))
    .expect("transfer succeeds");

    assert_eq!(report.bytes, 11);
    assert_eq!(
        std::fs::read(path.as_std_path()).expect("output written"),
        b"hello graph"
    );
}

#[rstest]
fn interrupted_file_download_can_be_retried(recorder: Recorder) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = Utf8PathBuf::from_path_buf(dir.path().join("nested/out.ttl")).expect("utf-8 path");
    let target = FileTarget::new(path.clone(), false);

    let broken = StubSource::breaking_after(Bytes::from_static(b"partial-bytes"));
    let err = block_on_for_tests(transfer(
        &broken,
        &target,
        request(4, BufferMode::Streaming),
        recorder.progress(),
    ))
    .expect_err("source breaks off");
    assert!(matches!(err, TransferError::Fetch { .. }));
    assert_eq!(err.terminal_state(), TerminalState::DownloadFailed);
    assert!(!path.as_std_path().exists());
    let leftovers = std::fs::read_dir(dir.path().join("nested"))
        .expect("list output directory")
        .count();
    assert_eq!(leftovers, 0);

    let clean = StubSource::with_bytes(Bytes::from_static(b"complete graph"));
    let outcome = block_on_for_tests(run_transfer(
        &clean,
        &target,
        request(4, BufferMode::Streaming),
        recorder.progress(),
    ));
    assert_eq!(outcome.state(), TerminalState::Success);
    assert_eq!(
        std::fs::read(path.as_std_path()).expect("output written"),
        b"complete graph"
    );
}

#[rstest]
#[case(false, TerminalState::UploadFailed)]
#[case(true, TerminalState::Success)]
fn existing_file_needs_overwrite(
    recorder: Recorder,
    #[case] overwrite: bool,
    #[case] expected: TerminalState,
) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = Utf8PathBuf::from_path_buf(dir.path().join("out.ttl")).expect("utf-8 path");
    std::fs::write(path.as_std_path(), b"old").expect("seed file");
    let source = StubSource::with_bytes(Bytes::from_static(b"new"));
    let target = FileTarget::new(path.clone(), overwrite);

    let outcome = block_on_for_tests(run_transfer(
        &source,
        &target,
        TransferRequest::default(),
        recorder.progress(),
    ));

    assert_eq!(outcome.state(), expected);
    let expected_contents: &[u8] = if overwrite { b"new" } else { b"old" };
    assert_eq!(
        std::fs::read(path.as_std_path()).expect("file present"),
        expected_contents
    );
}

#[rstest]
fn terminal_states_follow_the_failing_side() {
    let download = TransferOutcome::from_result(Err(TransferError::Download {
        url: "u".to_owned(),
        status: 500,
        body: String::new(),
    }));
    let upload = TransferOutcome::from_result(Err(TransferError::TargetExists {
        path: Utf8PathBuf::from("out.ttl"),
    }));
    assert_eq!(download.state(), TerminalState::DownloadFailed);
    assert_eq!(upload.state(), TerminalState::UploadFailed);
}
