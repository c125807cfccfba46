//! Behavioural tests for `ChunkIter` using rstest-bdd.

use std::cell::RefCell;

use bytes::Bytes;
use databus_core::test_support::RecordingSink;
use databus_core::{ChunkIter, ChunkSize, ChunkSizeError};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// World state for chunking scenarios.
#[derive(Debug, Default)]
struct ChunkWorld {
    source: RefCell<Vec<u8>>,
    chunks: RefCell<Vec<Bytes>>,
    sink: RefCell<RecordingSink>,
    error: RefCell<Option<ChunkSizeError>>,
}

#[fixture]
fn world() -> ChunkWorld {
    ChunkWorld::default()
}

#[given("a buffer of {len} bytes")]
fn given_buffer(world: &ChunkWorld, len: usize) {
    let source: Vec<u8> = (0..=u8::MAX).cycle().take(len).collect();
    world.source.replace(source);
}

#[when("I split it into chunks of {size} bytes")]
fn when_split(world: &ChunkWorld, size: usize) {
    match ChunkSize::new(size) {
        Ok(chunk_size) => {
            let buffer = Bytes::from(world.source.borrow().clone());
            let mut sink = world.sink.borrow_mut();
            let chunks: Vec<Bytes> =
                ChunkIter::new(buffer, chunk_size, "Uploading File", &mut *sink).collect();
            world.chunks.replace(chunks);
        }
        Err(err) => {
            world.error.replace(Some(err));
        }
    }
}

#[then("{count} chunks are produced")]
fn then_count(world: &ChunkWorld, count: usize) {
    assert_eq!(world.chunks.borrow().len(), count);
}

#[then("the chunks rebuild the buffer")]
fn then_rebuild(world: &ChunkWorld) {
    let rebuilt: Vec<u8> = world
        .chunks
        .borrow()
        .iter()
        .flat_map(|chunk| chunk.iter().copied())
        .collect();
    assert_eq!(rebuilt, *world.source.borrow());
}

#[then("progress was reported before each chunk")]
fn then_progress(world: &ChunkWorld) {
    let sink = world.sink.borrow();
    assert_eq!(sink.byte_counts(), vec![0, 4, 8]);
    assert!(
        sink.events()
            .iter()
            .all(|event| event.label == "Uploading File")
    );
}

#[then("the chunk size is rejected")]
fn then_rejected(world: &ChunkWorld) {
    assert_eq!(*world.error.borrow(), Some(ChunkSizeError::Zero));
    assert!(world.chunks.borrow().is_empty());
}

#[scenario(path = "tests/features/chunking.feature", index = 0)]
fn buffer_split_into_chunks(world: ChunkWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/chunking.feature", index = 1)]
fn zero_chunk_size_refused(world: ChunkWorld) {
    let _ = world;
}
