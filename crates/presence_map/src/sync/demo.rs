//! Demo-mode count generator used when no live channel is configured.
use std::time::Duration;

use futures::stream::{self, Stream};
use tokio::time::{interval, MissedTickBehavior};

/// Yields `0, 1, …, cycle - 1, 0, …`, one value per `period`; the first value is immediate.
pub fn demo_counts(period: Duration, cycle: u64) -> impl Stream<Item = u64> {
    let cycle = cycle.max(1);
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    stream::unfold((ticker, 0u64), move |(mut ticker, n)| async move {
        ticker.tick().await;
        Some((n, (ticker, (n + 1) % cycle)))
    })
}
