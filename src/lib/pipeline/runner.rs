//! Entry point that wires the pipeline together and runs it to completion.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::errors::{PipelineError, Result, extract_panic_message};
use crate::processor::RecordProcessor;
use crate::progress::ProgressTracker;
use crate::source::RecordSource;

use super::config::PipelineConfig;
use super::consumer::run_consumer;
use super::producer::{run_producer, run_single_threaded};
use super::state::PipelineState;
use super::stats::{PipelineStats, StatsSnapshot};

const PRODUCER_THREAD: &str = "producer";

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Records processed, on any thread
    pub records: u64,
    /// Final counter values
    pub stats: StatsSnapshot,
    /// Slots in the recycle pool after the run
    pub free_slots: usize,
    /// Slots the recycle pool created (0 for a single-threaded run)
    pub total_slots: usize,
    /// Wall-clock time of the run
    pub elapsed: Duration,
}

/// Decode every record from `source` and run `processor` over it on
/// `config.num_threads` threads.
///
/// The calling thread is the producer; `num_threads - 1` consumer threads are
/// spawned for the duration of the call. With one thread no pool or queue is
/// created and every record is processed inline.
///
/// # Errors
/// Returns the first fatal error: an invalid configuration, a decode error the
/// policy does not skip, a work function error, or a panic on any pipeline thread.
pub fn run_pipeline<S, P>(config: &PipelineConfig, source: S, processor: &P) -> Result<PipelineSummary>
where
    S: RecordSource,
    P: RecordProcessor + ?Sized,
{
    config.validate()?;
    let started = Instant::now();

    let consumers = config.consumer_threads();
    if consumers == 0 {
        return run_inline(config, source, processor, started);
    }

    let state = PipelineState::new(config)?;
    debug!(
        "Starting pipeline: 1 producer, {consumers} consumers, batch capacity {}, {} slots",
        config.batch_capacity,
        state.pool.total_slots()
    );

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(consumers);
        for i in 0..consumers {
            let name = format!("fqpipe-consumer-{i}");
            let state = &state;
            let thread_name = name.clone();
            let spawned = thread::Builder::new().name(name.clone()).spawn_scoped(scope, move || {
                match catch_unwind(AssertUnwindSafe(|| run_consumer(state, processor, config.spin))) {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => state.set_error(e),
                    Err(panic) => state.set_error(PipelineError::WorkerPanicked {
                        thread: thread_name,
                        message: extract_panic_message(panic),
                    }),
                }
            });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    state.set_error(PipelineError::Spawn { thread: name, source });
                    break;
                }
            }
        }

        if !state.has_error() {
            match catch_unwind(AssertUnwindSafe(|| run_producer(&state, config, source, processor))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => state.set_error(e),
                Err(panic) => state.set_error(PipelineError::WorkerPanicked {
                    thread: PRODUCER_THREAD.to_string(),
                    message: extract_panic_message(panic),
                }),
            }
        }

        for handle in handles {
            let name = handle.thread().name().unwrap_or("consumer").to_string();
            if let Err(panic) = handle.join() {
                state.set_error(PipelineError::WorkerPanicked { thread: name, message: extract_panic_message(panic) });
            }
        }
    });

    if let Some(error) = state.take_error() {
        return Err(error);
    }

    state.progress.log_final();
    state.stats.log_summary();
    let stats = state.stats.snapshot();
    Ok(PipelineSummary {
        records: stats.records_processed(),
        stats,
        free_slots: state.pool.available(),
        total_slots: state.pool.total_slots(),
        elapsed: started.elapsed(),
    })
}

fn run_inline<S, P>(config: &PipelineConfig, source: S, processor: &P, started: Instant) -> Result<PipelineSummary>
where
    S: RecordSource,
    P: RecordProcessor + ?Sized,
{
    info!("Running single-threaded; records are processed on the decoding thread");
    let stats = PipelineStats::new();
    let progress = ProgressTracker::new("Processed").with_interval(config.progress_interval);

    match catch_unwind(AssertUnwindSafe(|| run_single_threaded(config, source, processor, &stats, &progress))) {
        Ok(result) => result?,
        Err(panic) => {
            return Err(PipelineError::WorkerPanicked {
                thread: PRODUCER_THREAD.to_string(),
                message: extract_panic_message(panic),
            });
        }
    }

    progress.log_final();
    stats.log_summary();
    let stats = stats.snapshot();
    Ok(PipelineSummary {
        records: stats.records_processed(),
        stats,
        free_slots: 0,
        total_slots: 0,
        elapsed: started.elapsed(),
    })
}
