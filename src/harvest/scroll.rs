//! Incremental scroll harvester
//!
//! Drives a [`ListView`] until a target item count is materialized or the
//! view is exhausted, without losing previously observed items. This is a
//! bounded polling loop: completion is time-boxed and non-deterministic,
//! not event-driven.
//!
//! Loop shape:
//! 1. Probe the current item count (with a small in-iteration retry).
//! 2. Below target: trigger more content.
//! 3. Wait a randomized interval, longer when recent iterations were stale.
//! 4. No growth in count or marker increments the stale counter; growth
//!    resets it.
//! 5. Every `checkpoint_interval` materialized items, persist the current
//!    partial parse.
//! 6. Terminate on: target reached, stale cap, error streak, or the hard
//!    iteration ceiling.

use rand::Rng;
use std::time::Duration;

use crate::harvest::view::ListView;
use crate::models::HarvestedRecord;
use crate::storage::checkpoint::CheckpointManager;
use crate::utils::error::HarvestError;

/// Tuning knobs for one scroll harvest
#[derive(Debug, Clone)]
pub struct HarvestPolicy {
    /// Items wanted beyond the starting offset
    pub target: usize,

    /// Items to skip from the front of the view
    pub offset: usize,

    /// Consecutive no-growth iterations before giving up
    pub stale_cap: u32,

    /// Persist a partial parse every this many materialized items
    pub checkpoint_interval: usize,

    /// Absolute iteration ceiling
    pub max_iterations: u32,

    /// Randomized settle wait after each trigger (milliseconds)
    pub min_wait_ms: u64,
    pub max_wait_ms: u64,

    /// Wider wait range once iterations start going stale
    pub stale_min_wait_ms: u64,
    pub stale_max_wait_ms: u64,

    /// Retries for the item-count probe within one iteration
    pub probe_retries: u32,

    /// Wait after an iteration-level error (milliseconds)
    pub error_wait_ms: u64,

    /// Consecutive iteration-level errors before giving up
    pub error_streak_cap: u32,
}

impl Default for HarvestPolicy {
    fn default() -> Self {
        Self {
            target: 5000,
            offset: 0,
            stale_cap: 8,
            checkpoint_interval: 1000,
            max_iterations: 50,
            min_wait_ms: 2000,
            max_wait_ms: 4000,
            stale_min_wait_ms: 3000,
            stale_max_wait_ms: 6000,
            probe_retries: 3,
            error_wait_ms: 5000,
            error_streak_cap: 3,
        }
    }
}

impl HarvestPolicy {
    /// Policy with target and offset, defaults elsewhere
    pub fn new(target: usize, offset: usize) -> Self {
        Self {
            target,
            offset,
            ..Default::default()
        }
    }

    /// Zero waits, for tests driving scripted views
    #[doc(hidden)]
    pub fn without_waits(mut self) -> Self {
        self.min_wait_ms = 0;
        self.max_wait_ms = 0;
        self.stale_min_wait_ms = 0;
        self.stale_max_wait_ms = 0;
        self.error_wait_ms = 0;
        self
    }

    /// Absolute item count that satisfies this harvest
    fn target_total(&self) -> usize {
        self.offset.saturating_add(self.target)
    }
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Materialized count reached offset + target
    TargetReached,

    /// No growth for `stale_cap` consecutive iterations
    StaleExhausted,

    /// Hard iteration ceiling
    IterationCap,

    /// Too many consecutive iteration-level errors
    ErrorStreak,
}

/// Result of a completed scroll harvest
#[derive(Debug)]
pub struct ScrollOutcome {
    /// Records from the final parse of the materialized document
    pub records: Vec<HarvestedRecord>,

    /// Items materialized in the view when the loop stopped
    pub final_count: usize,

    /// Iterations consumed
    pub iterations: u32,

    /// Partial snapshots persisted during the run
    pub checkpoints_written: usize,

    pub reason: StopReason,
}

/// Drives a list view to materialize items up to a target count
pub struct ScrollHarvester<'a> {
    policy: HarvestPolicy,
    checkpoints: Option<(&'a CheckpointManager, String)>,
}

impl<'a> ScrollHarvester<'a> {
    #[must_use]
    pub fn new(policy: HarvestPolicy) -> Self {
        Self {
            policy,
            checkpoints: None,
        }
    }

    /// Enable periodic partial-parse checkpoints under the given session name
    #[must_use]
    pub fn with_checkpoints(mut self, manager: &'a CheckpointManager, session: &str) -> Self {
        self.checkpoints = Some((manager, session.to_string()));
        self
    }

    /// Run the harvest loop to completion
    ///
    /// `parse` converts the materialized document into records; it is used
    /// both for periodic checkpoints and for the final result.
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::OffsetUnreachable` if the view stopped growing
    /// before covering the starting offset. All other failures end the loop
    /// with a partial result, not an error.
    pub async fn run<V, P>(&self, view: &mut V, parse: P) -> Result<ScrollOutcome, HarvestError>
    where
        V: ListView + ?Sized,
        P: Fn(&str) -> Vec<HarvestedRecord>,
    {
        let target_total = self.policy.target_total();

        tracing::info!(
            target = self.policy.target,
            offset = self.policy.offset,
            target_total,
            max_iterations = self.policy.max_iterations,
            "Starting scroll harvest"
        );

        let mut iterations: u32 = 0;
        let mut stale: u32 = 0;
        let mut error_streak: u32 = 0;
        let mut last_count: usize = 0;
        let mut last_marker: u64 = view.growth_marker();
        let mut checkpoints_written: usize = 0;

        let reason = loop {
            if iterations >= self.policy.max_iterations {
                tracing::warn!(iterations, "Reached iteration ceiling, stopping");
                break StopReason::IterationCap;
            }
            iterations += 1;

            // Probe current item count with a small retry
            let count = match self.probe_count(view).await {
                Ok(count) => {
                    error_streak = 0;
                    count
                }
                Err(e) => {
                    error_streak += 1;
                    tracing::warn!(error = %e, error_streak, "Item count probe failed");
                    if error_streak >= self.policy.error_streak_cap {
                        break StopReason::ErrorStreak;
                    }
                    self.sleep_ms(self.policy.error_wait_ms).await;
                    continue;
                }
            };

            let grew = count > last_count;
            if grew {
                stale = 0;
                tracing::debug!(
                    count,
                    remaining = target_total.saturating_sub(count),
                    "View grew, continuing"
                );

                // One snapshot per full checkpoint interval crossed
                while self.policy.checkpoint_interval > 0
                    && (checkpoints_written + 1) * self.policy.checkpoint_interval <= count
                {
                    checkpoints_written += 1;
                    self.write_checkpoint(view, &parse, checkpoints_written);
                }

                last_count = count;
            }

            if count >= target_total {
                tracing::info!(count, target_total, "Reached target item count");
                break StopReason::TargetReached;
            }

            // Trigger more content
            if let Err(e) = view.load_more().await {
                error_streak += 1;
                tracing::warn!(error = %e, error_streak, "Load-more trigger failed");
                if error_streak >= self.policy.error_streak_cap {
                    break StopReason::ErrorStreak;
                }
                self.sleep_ms(self.policy.error_wait_ms).await;
                continue;
            }

            // Randomized settle wait, wider once the view looks stale
            self.settle_wait(stale).await;

            let marker = view.growth_marker();
            if !grew && marker == last_marker {
                stale += 1;
                tracing::debug!(stale, cap = self.policy.stale_cap, "Stale iteration");
                if stale >= self.policy.stale_cap {
                    tracing::info!(count, "No more content appearing, stopping");
                    break StopReason::StaleExhausted;
                }
            }
            last_marker = marker;
        };

        let final_count = self.probe_count(view).await.unwrap_or(last_count);

        // Cover intervals crossed between the last growth and the stop
        while self.policy.checkpoint_interval > 0
            && (checkpoints_written + 1) * self.policy.checkpoint_interval <= final_count
        {
            checkpoints_written += 1;
            self.write_checkpoint(view, &parse, checkpoints_written);
        }

        tracing::info!(
            final_count,
            iterations,
            checkpoints_written,
            reason = ?reason,
            "Scroll harvest finished"
        );

        if final_count < self.policy.offset {
            return Err(HarvestError::OffsetUnreachable {
                offset: self.policy.offset,
                available: final_count,
            });
        }

        let records = parse(view.page_source());

        Ok(ScrollOutcome {
            records,
            final_count,
            iterations,
            checkpoints_written,
            reason,
        })
    }

    /// Probe the item count, retrying within the iteration
    async fn probe_count<V>(&self, view: &mut V) -> Result<usize, HarvestError>
    where
        V: ListView + ?Sized,
    {
        let mut last_error = None;

        for attempt in 0..self.policy.probe_retries.max(1) {
            match view.item_count().await {
                Ok(count) => return Ok(count),
                Err(e) => {
                    tracing::warn!(attempt = attempt + 1, error = %e, "Count probe retry");
                    last_error = Some(e);
                    self.sleep_ms(self.policy.error_wait_ms / 2).await;
                }
            }
        }

        Err(last_error.unwrap_or(HarvestError::NoRecords))
    }

    /// Persist a partial parse; failures are logged and ignored
    fn write_checkpoint<V, P>(&self, view: &V, parse: &P, seq: usize)
    where
        V: ListView + ?Sized,
        P: Fn(&str) -> Vec<HarvestedRecord>,
    {
        let Some((manager, session)) = &self.checkpoints else {
            return;
        };

        let records = parse(view.page_source());
        match manager.save_partial(session, seq, &records) {
            Ok(path) => {
                tracing::info!(seq, records = records.len(), path = %path.display(), "Checkpoint saved");
            }
            Err(e) => {
                tracing::warn!(seq, error = %e, "Checkpoint save failed");
            }
        }
    }

    async fn settle_wait(&self, stale: u32) {
        let (min, max) = if stale > 2 {
            (self.policy.stale_min_wait_ms, self.policy.stale_max_wait_ms)
        } else {
            (self.policy.min_wait_ms, self.policy.max_wait_ms)
        };

        let wait = if max > min {
            rand::thread_rng().gen_range(min..=max)
        } else {
            min
        };
        self.sleep_ms(wait).await;
    }

    async fn sleep_ms(&self, ms: u64) {
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}
