//! The collection loop. Drives one source's strategies in order until the
//! target count is reached or every strategy runs dry, deduplicating on
//! native id and checkpointing progress as it goes.

use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use slangshift_common::{text, Classification, Record};
use tracing::{debug, info};
use uuid::Uuid;

use crate::checkpoint::{CheckpointStore, CollectionState};
use crate::sources::{PostSource, RawPost};

pub struct Collector<'a, S: PostSource> {
    source: &'a S,
    checkpoints: &'a CheckpointStore,
    target_count: usize,
    checkpoint_interval: usize,
}

impl<'a, S: PostSource> Collector<'a, S> {
    pub fn new(
        source: &'a S,
        checkpoints: &'a CheckpointStore,
        target_count: usize,
        checkpoint_interval: usize,
    ) -> Self {
        Self {
            source,
            checkpoints,
            target_count,
            checkpoint_interval,
        }
    }

    /// Collect up to `target_count` records for one keyword, resuming from
    /// any existing checkpoint. A checkpoint that already satisfies the
    /// target is returned as-is without a single fetch.
    pub async fn collect(&self, keyword: &str) -> Result<Vec<Record>> {
        let platform = self.source.platform();
        let mut state = self.checkpoints.load(keyword, platform)?;

        if state.results.len() >= self.target_count {
            info!(
                keyword,
                %platform,
                count = state.results.len(),
                "Checkpoint already satisfies the target"
            );
            state.results.truncate(self.target_count);
            return Ok(state.results);
        }

        info!(
            keyword,
            %platform,
            resumed = state.results.len(),
            target = self.target_count,
            "Starting collection"
        );

        let run = self.run_strategies(keyword, &mut state).await;

        // Target reached means the checkpoint has served its purpose;
        // anything short of it, including the error path, keeps the state
        // on disk for the next run.
        let finalize = if state.results.len() >= self.target_count {
            info!(keyword, %platform, "Target reached, clearing checkpoint");
            self.checkpoints.remove(keyword, platform)
        } else {
            info!(
                keyword,
                %platform,
                count = state.results.len(),
                "Stopping short of target, keeping checkpoint"
            );
            self.checkpoints.save(keyword, platform, &state)
        };
        run?;
        finalize?;

        state.results.truncate(self.target_count);
        Ok(state.results)
    }

    async fn run_strategies(&self, keyword: &str, state: &mut CollectionState) -> Result<()> {
        let platform = self.source.platform();

        for strategy in self.source.strategies(keyword) {
            debug!(keyword, %platform, %strategy, "Trying strategy");

            loop {
                let page = self
                    .source
                    .fetch(keyword, &strategy)
                    .await
                    .with_context(|| format!("Fetch failed for {strategy}"))?;

                let unseen = self.absorb_page(keyword, state, page)?;
                if state.results.len() >= self.target_count {
                    return Ok(());
                }
                if unseen == 0 {
                    debug!(keyword, %platform, %strategy, "Strategy exhausted");
                    break;
                }
                self.pause().await;
            }
            self.pause().await;
        }

        info!(
            keyword,
            %platform,
            collected = state.results.len(),
            "Every strategy exhausted"
        );
        Ok(())
    }

    /// Run one page of candidates through dedup and the filter pipeline.
    /// Returns how many of them had never been seen before.
    fn absorb_page(
        &self,
        keyword: &str,
        state: &mut CollectionState,
        page: Vec<RawPost>,
    ) -> Result<usize> {
        let platform = self.source.platform();
        let mut unseen = 0;

        for post in page {
            if state.seen_ids.contains(&post.native_id) {
                debug!(native_id = %post.native_id, "Skipping already-seen post");
                continue;
            }
            state.seen_ids.insert(post.native_id.clone());
            unseen += 1;

            if !keeps(&post.text) {
                debug!(native_id = %post.native_id, "Dropped by filter pipeline");
                continue;
            }

            state.results.push(Record {
                correlation_id: Uuid::new_v4(),
                native_id: post.native_id,
                text: post.text,
                url: post.url,
                created_at: post.created_at,
                username: post.username,
                subreddit: post.subreddit,
                platform,
                keyword: keyword.to_string(),
                classification: Classification::Unclassified,
            });
            info!(
                keyword,
                %platform,
                collected = state.results.len(),
                target = self.target_count,
                "Collected post"
            );

            if state.results.len() % self.checkpoint_interval == 0 {
                self.checkpoints.save(keyword, platform, state)?;
            }
            if state.results.len() >= self.target_count {
                break;
            }
        }
        Ok(unseen)
    }

    /// Randomized pause between fetches so the platform is not hammered.
    async fn pause(&self) {
        let range = self.source.fetch_delay_ms();
        if range.is_empty() {
            return;
        }
        let delay = rand::rng().random_range(range);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

/// A post survives when it is short enough to classify, has more than one
/// alphabetic word, and reads as English.
fn keeps(post_text: &str) -> bool {
    !text::is_too_long(post_text) && text::is_valid_text(post_text) && text::is_english(post_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_pipeline_applies_all_three_rules() {
        assert!(keeps("the party was absolutely amazing tonight"));
        // single word
        assert!(!keeps("lit"));
        // over the length cap
        assert!(!keeps(&"long words here ".repeat(40)));
        // not English
        assert!(!keeps("la fête était vraiment incroyable ce soir là-bas"));
    }
}
