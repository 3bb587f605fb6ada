//! End-to-end properties of the producer/consumer pipeline.
//!
//! Every test drives the public API with an in-memory source so that record
//! counts, thread counts and timing can be controlled precisely.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rstest::rstest;

use fqpipe_lib::errors::PipelineError;
use fqpipe_lib::pipeline::{
    PipelineConfig, PipelineState, SpinStrategy, run_consumer, run_pipeline, run_producer,
};
use fqpipe_lib::processor::RecordProcessor;
use fqpipe_lib::record::{RecordSlot, SourceRecord};
use fqpipe_lib::source::MemorySource;

use crate::helpers::assert_each_index_once;

fn on_consumer_thread() -> bool {
    thread::current().name().is_some_and(|name| name.starts_with("fqpipe-consumer"))
}

#[rstest]
#[case::single_thread(1, 32)]
#[case::one_consumer(2, 32)]
#[case::many_consumers(64, 32)]
#[case::tiny_batches(8, 1)]
#[case::large_batches(4, 500)]
fn test_every_record_processed_exactly_once(#[case] threads: usize, #[case] batch_capacity: usize) {
    let records = 10_000_u64;
    let seen = Mutex::new(Vec::with_capacity(records as usize));
    let processor = |slot: &RecordSlot| -> anyhow::Result<()> {
        assert_eq!(slot.name(), format!("r{}", slot.index()).as_bytes());
        seen.lock().push(slot.index());
        Ok(())
    };
    let config = PipelineConfig::new(threads).with_batch_capacity(batch_capacity).with_progress_interval(0);

    let summary = run_pipeline(&config, MemorySource::numbered(records as usize), &processor).unwrap();

    assert_each_index_once(seen.into_inner(), records);
    assert_eq!(summary.records, records);
    assert_eq!(summary.stats.records_decoded, records);
    assert_eq!(summary.free_slots, summary.total_slots);
}

#[rstest]
#[case(SpinStrategy::Spin)]
#[case(SpinStrategy::Backoff)]
fn test_spin_strategies_complete(#[case] spin: SpinStrategy) {
    let count = AtomicU64::new(0);
    let processor = |_: &RecordSlot| -> anyhow::Result<()> {
        count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    };
    let config = PipelineConfig::new(4).with_batch_capacity(16).with_spin(spin).with_progress_interval(0);
    run_pipeline(&config, MemorySource::numbered(5_000), &processor).unwrap();
    assert_eq!(count.load(Ordering::Relaxed), 5_000);
}

#[test]
fn test_slots_are_conserved_during_and_after_run() {
    let config = PipelineConfig::new(4).with_batch_capacity(8).with_replication(3).with_progress_interval(0);
    let state = PipelineState::new(&config).unwrap();
    let total = state.pool.total_slots();
    let violations = AtomicUsize::new(0);
    let processed = AtomicU64::new(0);

    let processor = |_: &RecordSlot| -> anyhow::Result<()> {
        // The processing thread holds at least this slot, so the pool can never be full.
        if state.pool.available() >= total {
            violations.fetch_add(1, Ordering::Relaxed);
        }
        processed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    };

    thread::scope(|s| {
        let consumers: Vec<_> = (0..config.consumer_threads())
            .map(|_| s.spawn(|| run_consumer(&state, &processor, config.spin)))
            .collect();
        run_producer(&state, &config, MemorySource::numbered(20_000), &processor).unwrap();
        for consumer in consumers {
            consumer.join().unwrap().unwrap();
        }
    });

    assert_eq!(violations.load(Ordering::Relaxed), 0);
    assert_eq!(processed.load(Ordering::Relaxed), 20_000);
    assert_eq!(state.pool.available(), total);
    assert_eq!(state.pool.in_flight(), 0);
    assert!(state.queue.is_empty());
    assert!(state.done.is_set());
}

#[test]
fn test_minimal_pool_with_slow_consumer_does_not_deadlock() {
    let (tx, rx) = mpsc::channel();
    let worker = thread::spawn(move || {
        let count = AtomicU64::new(0);
        let processor = |_: &RecordSlot| -> anyhow::Result<()> {
            if on_consumer_thread() {
                thread::sleep(Duration::from_millis(5));
            }
            count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        };
        let config = PipelineConfig::new(2).with_batch_capacity(4).with_replication(2).with_progress_interval(0);
        let result = run_pipeline(&config, MemorySource::numbered(10), &processor).map(|s| s.records);
        tx.send((result, count.load(Ordering::Relaxed))).unwrap();
    });

    let (result, count) = rx.recv_timeout(Duration::from_secs(60)).expect("pipeline deadlocked");
    worker.join().unwrap();
    assert_eq!(result.unwrap(), 10);
    assert_eq!(count, 10);
}

#[test]
fn test_producer_helps_when_consumers_fall_behind() {
    let seen = Mutex::new(Vec::new());
    let processor = |slot: &RecordSlot| -> anyhow::Result<()> {
        if on_consumer_thread() {
            thread::sleep(Duration::from_micros(200));
        }
        seen.lock().push(slot.index());
        Ok(())
    };
    let config = PipelineConfig::new(2).with_batch_capacity(4).with_replication(4).with_progress_interval(0);

    let summary = run_pipeline(&config, MemorySource::numbered(2_000), &processor).unwrap();

    assert!(summary.stats.producer_helped > 0, "producer never helped: {:?}", summary.stats);
    assert!(summary.stats.submit_failures > 0);
    assert_each_index_once(seen.into_inner(), 2_000);
    assert_eq!(summary.stats.records_processed(), 2_000);
}

#[test]
fn test_single_thread_matches_direct_processing() {
    let checksum = |slot: &RecordSlot| -> u64 {
        slot.seq().iter().chain(slot.name()).fold(slot.index(), |acc, &b| acc.wrapping_mul(31).wrapping_add(u64::from(b)))
    };

    let mut baseline = 0_u64;
    let mut source = MemorySource::numbered(3_000);
    let mut slot = RecordSlot::new();
    let mut index = 0;
    while let Some(record) = fqpipe_lib::source::RecordSource::decode_next(&mut source).unwrap() {
        slot.copy_from(index, &record);
        baseline = baseline.wrapping_add(checksum(&slot));
        index += 1;
    }

    let total = AtomicU64::new(0);
    let processor = |slot: &RecordSlot| -> anyhow::Result<()> {
        assert!(!on_consumer_thread());
        total.fetch_add(checksum(slot), Ordering::Relaxed);
        Ok(())
    };
    let summary =
        run_pipeline(&PipelineConfig::new(1).with_progress_interval(0), MemorySource::numbered(3_000), &processor)
            .unwrap();

    assert_eq!(total.load(Ordering::Relaxed), baseline);
    assert_eq!(summary.total_slots, 0);
    assert_eq!(summary.stats.batches_submitted, 0);
    assert_eq!(summary.stats.pool_waits, 0);
    assert_eq!(summary.stats.producer_direct, 3_000);
}

/// Checks every batch it is handed is a run of consecutive records.
struct ContiguousBatches {
    batches: AtomicU64,
    broken: AtomicU64,
}

impl RecordProcessor for ContiguousBatches {
    fn process(&self, _record: &RecordSlot) -> anyhow::Result<()> {
        Ok(())
    }

    fn process_batch(&self, batch: &[RecordSlot]) -> Result<(), (u64, anyhow::Error)> {
        self.batches.fetch_add(1, Ordering::Relaxed);
        if batch.windows(2).any(|w| w[1].index() != w[0].index() + 1) {
            self.broken.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }
}

#[test]
fn test_order_is_preserved_within_each_batch() {
    let processor = ContiguousBatches { batches: AtomicU64::new(0), broken: AtomicU64::new(0) };
    let config = PipelineConfig::new(6).with_batch_capacity(16).with_progress_interval(0);
    run_pipeline(&config, MemorySource::numbered(10_003), &processor).unwrap();
    assert!(processor.batches.load(Ordering::Relaxed) > 0);
    assert_eq!(processor.broken.load(Ordering::Relaxed), 0);
}

#[test]
fn test_batch_submitted_before_completion_is_not_stranded() {
    let config = PipelineConfig::new(2).with_batch_capacity(3).with_progress_interval(0);
    let state = PipelineState::new(&config).unwrap();

    let mut batch = Vec::new();
    state.pool.borrow(3, &mut batch);
    for (i, slot) in batch.iter_mut().enumerate() {
        slot.copy_from(i as u64, &SourceRecord::new(b"late", b"ACGT", None));
    }
    assert!(state.queue.try_submit(&mut batch));
    // The flag is already set when the consumer first looks at the queue.
    state.done.set();

    let seen = Mutex::new(Vec::new());
    let processor = |slot: &RecordSlot| -> anyhow::Result<()> {
        seen.lock().push(slot.index());
        Ok(())
    };
    run_consumer(&state, &processor, SpinStrategy::Spin).unwrap();

    assert_eq!(seen.into_inner(), vec![0, 1, 2]);
    assert_eq!(state.pool.available(), state.pool.total_slots());
}

#[rstest]
#[case(1)]
#[case(4)]
fn test_work_error_aborts_and_is_reported(#[case] threads: usize) {
    let processed = AtomicU64::new(0);
    let processor = |slot: &RecordSlot| -> anyhow::Result<()> {
        processed.fetch_add(1, Ordering::Relaxed);
        anyhow::ensure!(slot.index() != 1_234, "record rejected");
        Ok(())
    };
    let config = PipelineConfig::new(threads).with_batch_capacity(8).with_progress_interval(0);
    let err = run_pipeline(&config, MemorySource::numbered(100_000), &processor).unwrap_err();

    match err {
        PipelineError::Work { record, source } => {
            assert_eq!(record, 1_234);
            assert_eq!(source.to_string(), "record rejected");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(processed.load(Ordering::Relaxed) < 100_000);
}

#[rstest]
#[case(1)]
#[case(3)]
fn test_panicking_work_function_becomes_error(#[case] threads: usize) {
    let processor = |slot: &RecordSlot| -> anyhow::Result<()> {
        assert!(slot.index() != 77, "cannot handle record 77");
        Ok(())
    };
    let config = PipelineConfig::new(threads).with_batch_capacity(4).with_progress_interval(0);
    let err = run_pipeline(&config, MemorySource::numbered(1_000), &processor).unwrap_err();
    match err {
        PipelineError::WorkerPanicked { message, .. } => assert!(message.contains("cannot handle record 77")),
        other => panic!("unexpected error: {other}"),
    }
}
