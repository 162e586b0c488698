//! Stress helpers for ShelfDB.
//!
//! These helpers hammer a collection from many Tokio tasks and count how
//! many operations went through.

use shelfdb_core::{json, Collection, Query, Value};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Map key used by [`stress_concurrent_increments`].
pub const COUNTER_KEY: &str = "counter";

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations to perform.
    pub operations: usize,
    /// Number of concurrent tasks.
    pub tasks: usize,
    /// Length of the payload string stored in each record.
    pub payload_size: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 1_000,
            tasks: 8,
            payload_size: 64,
        }
    }
}

impl StressConfig {
    /// A small configuration for unit tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            operations: 100,
            tasks: 4,
            payload_size: 16,
        }
    }

    fn per_task(&self) -> usize {
        self.operations / self.tasks.max(1)
    }
}

fn record(task: usize, i: usize, payload_size: usize) -> Value {
    json!({
        "task": task,
        "seq": i,
        "payload": "x".repeat(payload_size),
    })
}

/// Inserts `operations` records one after another.
pub async fn stress_sequential_inserts(
    collection: &Collection,
    config: &StressConfig,
) -> StressTestResult {
    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        match collection.insert(record(0, i, config.payload_size)).await {
            Ok(_) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Inserts records from `tasks` concurrent tasks.
///
/// Every successful insert must end up with its own id.
pub async fn stress_concurrent_inserts(
    collection: &Collection,
    config: &StressConfig,
) -> StressTestResult {
    let per_task = config.per_task();
    let start = Instant::now();
    let mut tasks = JoinSet::new();

    for task in 0..config.tasks {
        let collection = collection.clone();
        let payload_size = config.payload_size;
        tasks.spawn(async move {
            let mut ok = 0usize;
            for i in 0..per_task {
                if collection.insert(record(task, i, payload_size)).await.is_ok() {
                    ok += 1;
                }
            }
            (ok, per_task - ok)
        });
    }

    let (successful, failed) = collect(tasks).await;
    StressTestResult::new(successful, failed, start.elapsed())
}

/// Increments one counter in a map collection from `tasks` concurrent
/// tasks.
///
/// Writes to one collection apply in turn, so the counter ends at the
/// number of successful increments.
pub async fn stress_concurrent_increments(
    collection: &Collection,
    config: &StressConfig,
) -> StressTestResult {
    let per_task = config.per_task();
    let start = Instant::now();
    let mut tasks = JoinSet::new();

    for _ in 0..config.tasks {
        let collection = collection.clone();
        tasks.spawn(async move {
            let mut ok = 0usize;
            for _ in 0..per_task {
                let result = collection
                    .update_in(COUNTER_KEY, |current| {
                        let n = current.as_ref().and_then(Value::as_u64).unwrap_or(0);
                        json!(n + 1)
                    })
                    .await;
                if result.is_ok() {
                    ok += 1;
                }
            }
            (ok, per_task - ok)
        });
    }

    let (successful, failed) = collect(tasks).await;
    StressTestResult::new(successful, failed, start.elapsed())
}

/// Runs a mix of inserts, updates, removes and reads from concurrent
/// tasks. Updates and removes of ids that are already gone count as
/// successful no-ops.
pub async fn stress_mixed_operations(
    collection: &Collection,
    config: &StressConfig,
) -> StressTestResult {
    let per_task = config.per_task();
    let start = Instant::now();
    let mut tasks = JoinSet::new();

    for task in 0..config.tasks {
        let collection = collection.clone();
        let payload_size = config.payload_size;
        tasks.spawn(async move {
            let mut ok = 0usize;
            let mut last_id = None;
            for i in 0..per_task {
                let result = match (i % 4, last_id) {
                    (1, Some(id)) => collection
                        .update(id, json!({"touched": i}))
                        .await
                        .map(|_| ()),
                    (2, _) => collection.count(Query::all()).await.map(|_| ()),
                    (3, Some(id)) => collection.remove(id).await.map(|_| {
                        last_id = None;
                    }),
                    _ => collection
                        .insert(record(task, i, payload_size))
                        .await
                        .map(|r| last_id = r.id()),
                };
                if result.is_ok() {
                    ok += 1;
                }
            }
            (ok, per_task - ok)
        });
    }

    let (successful, failed) = collect(tasks).await;
    StressTestResult::new(successful, failed, start.elapsed())
}

/// Reads the whole collection from concurrent tasks.
pub async fn stress_concurrent_reads(
    collection: &Collection,
    config: &StressConfig,
) -> StressTestResult {
    let per_task = config.per_task();
    let start = Instant::now();
    let mut tasks = JoinSet::new();

    for _ in 0..config.tasks {
        let collection = collection.clone();
        tasks.spawn(async move {
            let mut ok = 0usize;
            for _ in 0..per_task {
                if collection.get(Query::all()).await.is_ok() {
                    ok += 1;
                }
            }
            (ok, per_task - ok)
        });
    }

    let (successful, failed) = collect(tasks).await;
    StressTestResult::new(successful, failed, start.elapsed())
}

async fn collect(mut tasks: JoinSet<(usize, usize)>) -> (usize, usize) {
    let mut successful = 0usize;
    let mut failed = 0usize;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((ok, err)) => {
                successful += ok;
                failed += err;
            }
            Err(_) => failed += 1,
        }
    }
    (successful, failed)
}
