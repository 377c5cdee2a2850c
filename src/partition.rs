//! Static block partitioning and the scoped worker runner
//!
//! Both parallel stages split a relation into `N` contiguous chunks of
//! `len / N` rows, with the remainder going to the last chunk, and run one OS
//! thread per non-empty chunk. Joining the scope is the stage barrier.

use std::num::NonZeroUsize;
use std::ops::Range;
use std::thread::{self, ScopedJoinHandle};
use std::time::{Duration, Instant};

use crate::error::{QueryError, Result};

/// Row ranges for `workers` chunks over `len` rows.
///
/// Ranges are contiguous, disjoint and cover `0..len` exactly. When there are
/// more workers than rows every chunk but the last is empty.
pub fn chunk_ranges(len: usize, workers: NonZeroUsize) -> impl ExactSizeIterator<Item = Range<usize>> {
    let n = workers.get();
    let chunk = len / n;
    (0..n).map(move |i| {
        let start = i * chunk;
        let end = if i + 1 == n { len } else { start + chunk };
        start..end
    })
}

/// What a single worker did during a parallel stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerStats {
    pub worker: usize,
    pub rows: Range<usize>,
    /// Rows that passed the stage's predicate
    pub matched: usize,
    pub elapsed: Duration,
}

impl WorkerStats {
    pub fn scanned(&self) -> usize {
        self.rows.len()
    }

    fn idle(worker: usize, rows: Range<usize>) -> Self {
        Self {
            worker,
            rows,
            matched: 0,
            elapsed: Duration::ZERO,
        }
    }
}

enum Slot<'scope, T> {
    /// Empty chunk, no thread was started for it
    Idle(usize, Range<usize>),
    Running(ScopedJoinHandle<'scope, Result<(T, WorkerStats)>>),
    Failed(QueryError),
}

/// Run `task` once per non-empty chunk of `0..len`, each on its own scoped
/// thread. Empty chunks get `T::default()` and zeroed stats.
///
/// Results come back in worker order. Every started worker is joined before
/// any error is returned; the lowest-numbered failing worker's error wins.
/// If the OS refuses a thread no further workers are started and the stage
/// fails with `QueryError::Spawn`.
pub fn run_partitioned<T, F>(
    stage: &'static str,
    len: usize,
    workers: NonZeroUsize,
    task: F,
) -> Result<Vec<(T, WorkerStats)>>
where
    T: Send + Default,
    F: Fn(usize, Range<usize>) -> Result<(T, usize)> + Sync,
{
    let ranges = chunk_ranges(len, workers);
    let task = &task;

    let joined: Vec<Result<(T, WorkerStats)>> = thread::scope(|scope| {
        let mut slots = Vec::with_capacity(ranges.len());
        for (worker, rows) in ranges.enumerate() {
            if rows.is_empty() {
                slots.push(Slot::Idle(worker, rows));
                continue;
            }
            let spawned = thread::Builder::new().spawn_scoped(scope, move || {
                let started = Instant::now();
                let (output, matched) = task(worker, rows.clone())?;
                let stats = WorkerStats {
                    worker,
                    rows,
                    matched,
                    elapsed: started.elapsed(),
                };
                Ok((output, stats))
            });
            match spawned {
                Ok(handle) => slots.push(Slot::Running(handle)),
                Err(source) => {
                    slots.push(Slot::Failed(QueryError::Spawn { stage, source }));
                    break;
                }
            }
        }

        slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Idle(worker, rows) => Ok((T::default(), WorkerStats::idle(worker, rows))),
                Slot::Running(handle) => handle
                    .join()
                    .unwrap_or_else(|_| Err(QueryError::WorkerPanicked { stage })),
                Slot::Failed(err) => Err(err),
            })
            .collect()
    });

    joined.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn assert_exact_cover(len: usize, workers: usize) {
        let ranges = ranges(len, workers);
        assert_eq!(ranges.len(), workers);

        let mut next = 0;
        for range in &ranges {
            assert_eq!(range.start, next, "gap or overlap at {range:?}");
            assert!(range.start <= range.end);
            next = range.end;
        }
        assert_eq!(next, len);
    }

    fn ranges(len: usize, workers: usize) -> Vec<Range<usize>> {
        chunk_ranges(len, nz(workers)).collect()
    }

    #[test]
    fn test_boundaries_use_floor_division() {
        assert_eq!(ranges(10, 3), vec![0..3, 3..6, 6..10]);
        assert_eq!(ranges(9, 3), vec![0..3, 3..6, 6..9]);
        assert_eq!(ranges(10, 1), vec![0..10]);
    }

    #[test]
    fn test_more_workers_than_rows() {
        assert_eq!(ranges(2, 4), vec![0..0, 0..0, 0..0, 0..2]);
        assert_eq!(ranges(0, 3), vec![0..0, 0..0, 0..0]);
    }

    #[test]
    fn test_cover_small_grid() {
        for len in 0..40 {
            for workers in 1..=len + 5 {
                assert_exact_cover(len, workers);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_chunks_cover_every_row_once(len in 0usize..100_000, workers in 1usize..256) {
            let ranges = ranges(len, workers);
            let total: usize = ranges.iter().map(|r| r.len()).sum();
            prop_assert_eq!(total, len);
            prop_assert!(ranges.windows(2).all(|w| w[0].end == w[1].start));
            prop_assert_eq!(ranges.last().map(|r| r.end), Some(len));
        }
    }

    #[test]
    fn test_run_partitioned_visits_each_row_once() {
        let len = 1003;
        let results = run_partitioned("test", len, nz(7), |_, rows| {
            let seen: Vec<usize> = rows.clone().collect();
            Ok((seen, rows.len()))
        })
        .unwrap();

        assert_eq!(results.len(), 7);
        let all: Vec<usize> = results.iter().flat_map(|(seen, _)| seen.iter().copied()).collect();
        assert_eq!(all, (0..len).collect::<Vec<_>>());
        for (i, (_, stats)) in results.iter().enumerate() {
            assert_eq!(stats.worker, i);
            assert_eq!(stats.matched, stats.scanned());
        }
    }

    #[test]
    fn test_run_partitioned_surfaces_first_error() {
        let err = run_partitioned("test", 100, nz(4), |worker, _| {
            if worker >= 2 {
                Err(QueryError::MissingColumn(if worker == 2 { "two" } else { "three" }))
            } else {
                Ok(((), 0))
            }
        })
        .unwrap_err();
        assert!(matches!(err, QueryError::MissingColumn("two")));
    }

    #[test]
    fn test_run_partitioned_reports_panics() {
        let err = run_partitioned::<(), _>("panicky stage", 10, nz(2), |worker, _| {
            if worker == 1 {
                panic!("boom");
            }
            Ok(((), 0))
        })
        .unwrap_err();
        assert!(matches!(err, QueryError::WorkerPanicked { stage: "panicky stage" }));
    }

    #[test]
    fn test_empty_chunks_start_no_threads() {
        let calls = AtomicUsize::new(0);
        let results = run_partitioned("test", 3, nz(200_000), |_, rows| {
            calls.fetch_add(1, Ordering::Relaxed);
            Ok((rows.len(), rows.len()))
        })
        .unwrap();

        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(results.len(), 200_000);
        let (last, stats) = &results[199_999];
        assert_eq!(*last, 3);
        assert_eq!(stats.rows, 0..3);
        for (output, stats) in &results[..199_999] {
            assert_eq!(*output, 0);
            assert_eq!(stats.scanned(), 0);
            assert_eq!(stats.elapsed, Duration::ZERO);
        }
    }

    #[test]
    fn test_empty_relation_runs_nothing() {
        let results = run_partitioned::<Vec<usize>, _>("test", 0, nz(4), |_, _| panic!("no rows to process"))
            .unwrap();
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|(seen, _)| seen.is_empty()));
    }
}
