//! Dispatch workers over a static plan and merge their results.
//!
//! Workers hand back owned `WorkerResult`s; the coordinator alone aggregates
//! them. Completion order is discarded: results are merged by worker index.

use crate::error::{LbpError, Result};
use crate::grid::{HaloSlice, PixelGrid};
use crate::partition::{self, Assignment, RowRange, Strategy};
use crate::worker::{self, WorkerResult};
use log::{debug, info};
use std::any::Any;
use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::Duration;

/// How the coordinator waits for worker results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GatherMode {
    /// Block on each worker's join handle in index order.
    #[default]
    Join,
    /// Workers post results to a channel; the coordinator checks it without
    /// blocking and sleeps `interval` whenever nothing is ready.
    Poll { interval: Duration },
}

/// Descriptors for every interior pixel, splitting rows across `workers`
/// threads. `overlap` selects private halo slices over the shared grid.
pub fn execute(grid: &PixelGrid, workers: usize, overlap: bool) -> Result<Vec<u8>> {
    let strategy = if overlap { Strategy::HaloSliceSplit } else { Strategy::SharedGridSplit };
    execute_with(grid, strategy, workers, GatherMode::Join)
}

/// Run `strategy` with `workers` workers and gather with `gather`.
///
/// There is no timeout: a worker that never returns blocks the call. A worker
/// that panics is reported as `LbpError::WorkerFailure` once the others finish.
pub fn execute_with(
    grid: &PixelGrid,
    strategy: Strategy,
    workers: usize,
    gather: GatherMode,
) -> Result<Vec<u8>> {
    if workers == 0 {
        return Err(LbpError::InvalidPartition(workers));
    }
    let planned = if strategy == Strategy::NoSplit { 1 } else { workers };
    info!("LBP {}x{} strategy={} workers={}", grid.width(), grid.height(), strategy, planned);

    let results = match strategy {
        Strategy::NoSplit => {
            let rows = RowRange { start: 1, end: grid.height() - 1 };
            vec![worker::run(grid, rows, 0)]
        }
        Strategy::SharedGridSplit => {
            let jobs = partition::plan(grid.height(), workers, strategy.overlap())?
                .into_iter()
                .map(|a| (a.worker_index, a.rows))
                .collect();
            dispatch(jobs, gather, |idx, rows| {
                debug!("[{idx}] started rows {rows}");
                let r = worker::run(grid, rows, idx);
                debug!("[{idx}] done");
                r.patterns
            })?
        }
        Strategy::HaloSliceSplit => {
            let jobs = halo_jobs(grid, workers)?
                .into_iter()
                .map(|(a, slice)| (a.worker_index, (a.rows, slice)))
                .collect();
            dispatch(jobs, gather, |idx, (rows, slice)| {
                debug!("[{idx}] started rows {rows} from slice {}", slice.global_rows());
                let r = worker::run(&slice, rows, idx);
                debug!("[{idx}] done");
                r.patterns
            })?
        }
    };

    let sequence = merge(results, planned)?;
    debug_assert_eq!(sequence.len(), grid.interior_len());
    Ok(sequence)
}

/// Plan with halos and copy each worker's private slice from the planned bounds.
pub fn halo_jobs(grid: &PixelGrid, workers: usize) -> Result<Vec<(Assignment, HaloSlice)>> {
    let height = grid.height();
    let jobs = partition::plan(height, workers, Strategy::HaloSliceSplit.overlap())?
        .into_iter()
        .map(|a| {
            let halo = a.halo.unwrap_or_else(|| partition::halo_bounds(a.rows, height));
            (a, grid.halo_slice(halo))
        })
        .collect();
    Ok(jobs)
}

/// Order results by worker index and concatenate them.
///
/// Fails if any index in `0..workers` is missing or repeated.
pub fn merge(mut results: Vec<WorkerResult>, workers: usize) -> Result<Vec<u8>> {
    results.sort_by_key(|r| r.worker_index);
    for (expected, r) in results.iter().enumerate() {
        if r.worker_index != expected {
            return Err(missing(expected));
        }
    }
    if results.len() != workers {
        return Err(missing(results.len()));
    }
    let total = results.iter().map(|r| r.patterns.len()).sum();
    let mut out = Vec::with_capacity(total);
    for r in results {
        out.extend_from_slice(&r.patterns);
    }
    Ok(out)
}

fn missing(worker_index: usize) -> LbpError {
    LbpError::WorkerFailure {
        worker_index,
        reason: "no result delivered".to_string(),
    }
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Run one scoped thread per job and gather every result.
///
/// All threads are joined before returning, failed or not.
pub(crate) fn dispatch<J, F>(jobs: Vec<(usize, J)>, gather: GatherMode, work: F) -> Result<Vec<WorkerResult>>
where
    J: Send,
    F: Fn(usize, J) -> Vec<u8> + Sync,
{
    let expected = jobs.len();
    let work = &work;
    thread::scope(|s| -> Result<Vec<WorkerResult>> {
        let (tx, rx) = mpsc::channel::<WorkerResult>();
        let mut handles = Vec::with_capacity(expected);
        for (idx, job) in jobs {
            let tx = tx.clone();
            let handle = thread::Builder::new()
                .name(format!("lbp-worker-{idx}"))
                .spawn_scoped(s, move || {
                    let result = WorkerResult { worker_index: idx, patterns: work(idx, job) };
                    match gather {
                        GatherMode::Join => Some(result),
                        GatherMode::Poll { .. } => {
                            // The receiver outlives every worker.
                            let _ = tx.send(result);
                            None
                        }
                    }
                })?;
            handles.push((idx, handle));
        }
        drop(tx);

        let mut results = Vec::with_capacity(expected);
        if let GatherMode::Poll { interval } = gather {
            while results.len() < expected {
                match rx.try_recv() {
                    Ok(r) => {
                        debug!("result from worker {} ({} patterns)", r.worker_index, r.patterns.len());
                        results.push(r);
                    }
                    Err(TryRecvError::Empty) => thread::sleep(interval),
                    Err(TryRecvError::Disconnected) => break,
                }
            }
        }

        let mut failure = None;
        for (idx, handle) in handles {
            match handle.join() {
                Ok(Some(r)) => results.push(r),
                Ok(None) => {}
                Err(payload) => {
                    failure.get_or_insert(LbpError::WorkerFailure {
                        worker_index: idx,
                        reason: panic_reason(payload),
                    });
                }
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(results),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(worker_index: usize, patterns: &[u8]) -> WorkerResult {
        WorkerResult { worker_index, patterns: patterns.to_vec() }
    }

    #[test]
    fn merge_ignores_arrival_order() {
        let arrived = vec![result(2, &[5, 6]), result(0, &[1, 2]), result(1, &[]), result(3, &[7])];
        assert_eq!(merge(arrived, 4).unwrap(), vec![1, 2, 5, 6, 7]);
    }

    #[test]
    fn merge_reports_missing_worker() {
        let err = merge(vec![result(0, &[1]), result(2, &[3])], 3).unwrap_err();
        assert!(matches!(err, LbpError::WorkerFailure { worker_index: 1, .. }));
        let err = merge(vec![result(0, &[1])], 2).unwrap_err();
        assert!(matches!(err, LbpError::WorkerFailure { worker_index: 1, .. }));
    }

    #[test]
    fn dispatch_returns_one_result_per_job() {
        for gather in [GatherMode::Join, GatherMode::Poll { interval: Duration::from_millis(1) }] {
            let jobs: Vec<_> = (0..5).map(|i| (i, i as u8)).collect();
            let results = dispatch(jobs, gather, |_, v| vec![v; 2]).unwrap();
            assert_eq!(merge(results, 5).unwrap(), vec![0, 0, 1, 1, 2, 2, 3, 3, 4, 4]);
        }
    }

    #[test]
    fn poll_gather_keeps_arrival_order_until_merge() {
        let gather = GatherMode::Poll { interval: Duration::from_millis(1) };
        let jobs: Vec<_> = (0..4).map(|i| (i, ())).collect();
        let results = dispatch(jobs, gather, |idx, _| {
            thread::sleep(Duration::from_millis((4 - idx as u64) * 40));
            vec![idx as u8]
        })
        .unwrap();
        let arrived: Vec<_> = results.iter().map(|r| r.worker_index).collect();
        assert_eq!(arrived, vec![3, 2, 1, 0]);
        assert_eq!(merge(results, 4).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn halo_jobs_slice_from_planned_bounds() {
        let g = PixelGrid::new(6, 6, (0..36).collect()).unwrap();
        let jobs = halo_jobs(&g, 2).unwrap();
        assert_eq!(jobs.len(), 2);
        for (a, slice) in &jobs {
            assert_eq!(Some(slice.global_rows()), a.halo);
            assert_eq!(worker::run(slice, a.rows, a.worker_index), worker::run(&g, a.rows, a.worker_index));
        }
        assert_eq!(jobs[0].1.global_rows(), RowRange { start: 0, end: 4 });
        assert_eq!(jobs[1].1.global_rows(), RowRange { start: 2, end: 6 });
    }

    #[test]
    fn dispatch_surfaces_panicking_worker() {
        for gather in [GatherMode::Join, GatherMode::Poll { interval: Duration::from_millis(1) }] {
            let jobs: Vec<_> = (0..3).map(|i| (i, ())).collect();
            let err = dispatch(jobs, gather, |idx, _| {
                if idx == 1 {
                    panic!("simulated crash");
                }
                vec![idx as u8]
            })
            .unwrap_err();
            match err {
                LbpError::WorkerFailure { worker_index, reason } => {
                    assert_eq!(worker_index, 1);
                    assert!(reason.contains("simulated crash"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn zero_workers_rejected_before_dispatch() {
        let g = PixelGrid::new(4, 4, vec![0; 16]).unwrap();
        for s in Strategy::ALL {
            assert!(matches!(
                execute_with(&g, s, 0, GatherMode::Join),
                Err(LbpError::InvalidPartition(0))
            ));
        }
    }
}
