use super::update::StatisticsUpdater;
use crate::sequence::AlignmentRecord;
use crossbeam::channel;
use hssp_core::{Diagnostics, HsspError, HsspResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Update every row against the updater's reference on `threads` workers.
///
/// Rows are queued on a channel whose closure tells idle workers to stop.
/// Once a row fails, queued rows after it are drained without being
/// processed; the error of the lowest-numbered failing row is returned once
/// every worker has joined. On success the rows come back in input order.
pub fn update_all(
    updater: &StatisticsUpdater<'_>,
    mut records: Vec<AlignmentRecord>,
    threads: usize,
    diag: &Diagnostics,
) -> HsspResult<Vec<AlignmentRecord>> {
    let total = records.len();
    let workers = threads.max(1).min(total.max(1));
    let pb = diag.progress_bar(total as u64, "Updating alignment rows");

    debug!("Updating {} rows on {} workers", total, workers);

    if workers == 1 {
        for record in records.iter_mut() {
            updater.update(record)?;
            pb.inc(1);
        }
        pb.finish_and_clear();
        return Ok(records);
    }

    let (job_tx, job_rx) = channel::unbounded::<(usize, AlignmentRecord)>();
    for job in records.into_iter().enumerate() {
        job_tx.send(job).map_err(|_| HsspError::Cancelled)?;
    }
    drop(job_tx);

    let first_failure = AtomicUsize::new(usize::MAX);
    let mut slots: Vec<Option<AlignmentRecord>> = (0..total).map(|_| None).collect();
    let mut first_error: Option<(usize, HsspError)> = None;

    crossbeam::scope(|scope| {
        let (done_tx, done_rx) = channel::unbounded::<(usize, HsspResult<AlignmentRecord>)>();

        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let done_tx = done_tx.clone();
            let first_failure = &first_failure;

            scope.spawn(move |_| {
                for (index, mut record) in job_rx.iter() {
                    if index > first_failure.load(Ordering::Relaxed) {
                        continue;
                    }

                    let result = updater.update(&mut record).map(|_| record);
                    if result.is_err() {
                        first_failure.fetch_min(index, Ordering::Relaxed);
                    }
                    if done_tx.send((index, result)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(done_tx);

        for (index, result) in done_rx.iter() {
            pb.inc(1);
            match result {
                Ok(record) => slots[index] = Some(record),
                Err(err) => {
                    if first_error.as_ref().map_or(true, |(first, _)| index < *first) {
                        first_error = Some((index, err));
                    }
                }
            }
        }
    })
    .map_err(|_| HsspError::Other("row update worker panicked".to_string()))?;

    pb.finish_and_clear();

    if let Some((index, err)) = first_error {
        debug!("Row {} failed, update aborted", index);
        return Err(err);
    }

    slots
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or(HsspError::Cancelled)
}
