//! Worker coordination: fan-out fetch, fan-in merge.
//!
//! The cycle's shards are partitioned statically and evenly across a
//! bounded pool. Each worker runs fetch → decode → filter/map → partial
//! aggregate sequentially over its slice; the coordinator joins all
//! workers and merges their partial aggregates. The merged result is
//! independent of worker completion order because the aggregate merge is
//! associative and commutative.
//!
//! The join is all-or-nothing: the first worker error aborts the
//! remaining in-flight tasks and fails the cycle, so a partial result can
//! never reach the materializer.

use metrics::counter;
use tokio::task::JoinSet;

use gitpulse_core::{commit_records, CommitAggregate, ShardId};

use crate::error::{Error, Result};
use crate::fetch::{ShardEvents, ShardFetcher};
use crate::metrics::names;

/// Default worker pool size: the host's available parallelism.
#[must_use]
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(4)
}

/// Fetches and reduces all `shards`, fanning out across at most
/// `workers` concurrent tasks.
///
/// # Errors
///
/// Propagates the first [`Error::Fetch`] or [`Error::Decode`] from any
/// worker, after aborting the rest; returns [`Error::Worker`] if a
/// worker task panics.
pub async fn collect_commits(
    fetcher: &ShardFetcher,
    shards: &[ShardId],
    workers: usize,
) -> Result<CommitAggregate> {
    if shards.is_empty() {
        return Ok(CommitAggregate::new());
    }

    let mut pool = JoinSet::new();
    for slice in partition(shards, workers.max(1)) {
        let fetcher = fetcher.clone();
        pool.spawn(async move { run_worker(fetcher, slice).await });
    }

    let mut merged = CommitAggregate::new();
    while let Some(joined) = pool.join_next().await {
        match joined {
            Ok(Ok(partial)) => merged = merged.merge(partial),
            Ok(Err(err)) => {
                pool.abort_all();
                return Err(err);
            }
            Err(join_err) => {
                pool.abort_all();
                return Err(Error::worker(join_err.to_string()));
            }
        }
    }
    Ok(merged)
}

/// Splits `shards` into at most `workers` contiguous slices whose sizes
/// differ by at most one.
fn partition(shards: &[ShardId], workers: usize) -> Vec<Vec<ShardId>> {
    let chunk = shards.len().div_ceil(workers).max(1);
    shards.chunks(chunk).map(<[ShardId]>::to_vec).collect()
}

async fn run_worker(fetcher: ShardFetcher, shards: Vec<ShardId>) -> Result<CommitAggregate> {
    let mut partial = CommitAggregate::new();
    for shard in shards {
        let events = fetcher.fetch(shard).await?;
        // Decompress/parse/reduce is pure CPU; keep it off the I/O
        // executor threads.
        let reduced = tokio::task::spawn_blocking(move || reduce_shard(events))
            .await
            .map_err(|join_err| Error::worker(join_err.to_string()))??;
        partial = partial.merge(reduced);
    }
    Ok(partial)
}

fn reduce_shard(events: ShardEvents) -> Result<CommitAggregate> {
    let shard = events.shard();
    let mut aggregate = CommitAggregate::new();
    let mut decoded = 0_u64;
    let mut mapped = 0_u64;
    for event in events {
        let event = event?;
        decoded += 1;
        for record in commit_records(&event) {
            mapped += 1;
            aggregate.absorb(record);
        }
    }
    counter!(names::EVENTS_DECODED_TOTAL).increment(decoded);
    counter!(names::COMMIT_RECORDS_TOTAL).increment(mapped);
    tracing::debug!(
        shard = %shard,
        events = decoded,
        records = mapped,
        keys = aggregate.len(),
        "reduced shard"
    );
    Ok(aggregate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn shards(count: usize) -> Vec<ShardId> {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 14, 0, 0).unwrap();
        ShardId::trailing(now, count)
    }

    #[test]
    fn partition_is_even_and_contiguous() {
        let input = shards(5);
        let slices = partition(&input, 3);
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].len(), 2);
        assert_eq!(slices[1].len(), 2);
        assert_eq!(slices[2].len(), 1);
        let rejoined: Vec<ShardId> = slices.into_iter().flatten().collect();
        assert_eq!(rejoined, input);
    }

    #[test]
    fn partition_never_exceeds_worker_count() {
        let input = shards(2);
        assert_eq!(partition(&input, 8).len(), 2);
    }

    #[test]
    fn partition_with_one_worker_is_one_slice() {
        let input = shards(4);
        let slices = partition(&input, 1);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0], input);
    }
}
