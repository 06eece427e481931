//! The built-in measurement loop and its allocation accounting.
//!
//! [`run_benchmark`] is the narrow seam between scenario logic and the
//! statistics engine: warmup invocations, then timed samples, each recording
//! wall-clock duration and allocated heap bytes. A failed iteration is
//! logged and counted, never propagated — one bad round-trip must not abort
//! the rest of the suite.

use crate::error::Result;
use crate::report::ScenarioResult;
use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Iteration counts for one scenario.
#[derive(Debug, Clone, Copy)]
pub struct BenchOptions {
    pub warmup: u32,
    pub samples: u32,
}

/// Run `f` under warmup + timed samples and collect per-sample statistics.
pub fn run_benchmark<F>(name: &str, opts: BenchOptions, mut f: F) -> ScenarioResult
where
    F: FnMut() -> Result<u64>,
{
    let mut result = ScenarioResult::new(name);

    for _ in 0..opts.warmup {
        if let Err(e) = f() {
            log::warn!("warmup iteration failed: {e}");
        }
    }

    for _ in 0..opts.samples {
        let bytes_before = allocated_bytes();
        let start = Instant::now();
        match f() {
            Ok(rows) => {
                let elapsed = start.elapsed();
                result.add_sample(elapsed, allocated_bytes() - bytes_before, rows);
            }
            Err(e) => {
                log::warn!("timed iteration failed: {e}");
                result.add_failure();
            }
        }
    }

    result
}

// ── Allocation accounting ───────────────────────────────────────────

static ALLOCATED_BYTES: AtomicU64 = AtomicU64::new(0);

/// Total heap bytes allocated process-wide since start.
///
/// Only advances when [`CountingAlloc`] is installed as the global
/// allocator (the runner binary does); otherwise every sample reports 0.
pub fn allocated_bytes() -> u64 {
    ALLOCATED_BYTES.load(Ordering::Relaxed)
}

/// System allocator wrapper that counts allocated bytes. Frees are not
/// subtracted: the counter tracks allocation volume, not live bytes.
pub struct CountingAlloc;

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        ALLOCATED_BYTES.fetch_add(layout.size() as u64, Ordering::Relaxed);
        System.alloc(layout)
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        ALLOCATED_BYTES.fetch_add(layout.size() as u64, Ordering::Relaxed);
        System.alloc_zeroed(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if new_size > layout.size() {
            ALLOCATED_BYTES.fetch_add((new_size - layout.size()) as u64, Ordering::Relaxed);
        }
        System.realloc(ptr, layout, new_size)
    }
}

#[cfg(test)]
mod tests {
    use super::{run_benchmark, BenchOptions};
    use crate::error::BenchError;

    #[test]
    fn collects_one_sample_per_successful_iteration() {
        let mut calls = 0u32;
        let result = run_benchmark(
            "test/ok",
            BenchOptions {
                warmup: 2,
                samples: 5,
            },
            || {
                calls += 1;
                Ok(42)
            },
        );
        assert_eq!(calls, 7);
        assert_eq!(result.sample_count(), 5);
        assert_eq!(result.failed_iterations, 0);
        assert_eq!(result.rows_decoded, 42);
    }

    #[test]
    fn failed_iterations_are_counted_not_propagated() {
        let mut calls = 0u32;
        let result = run_benchmark(
            "test/flaky",
            BenchOptions {
                warmup: 0,
                samples: 4,
            },
            || {
                calls += 1;
                if calls % 2 == 0 {
                    Err(BenchError::ScenarioExecution {
                        scenario: "test/flaky".into(),
                        source: fabricated_error(),
                    })
                } else {
                    Ok(1)
                }
            },
        );
        assert_eq!(result.sample_count(), 2);
        assert_eq!(result.failed_iterations, 2);
    }

    /// Produce a driver error without a server: parse an invalid config.
    fn fabricated_error() -> postgres::Error {
        "this is not a connection string"
            .parse::<postgres::Config>()
            .unwrap_err()
    }
}
