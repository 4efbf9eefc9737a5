use crate::core::render;
use crate::core::sections::{extract_sections, SectionRules};
use crate::core::version;
use crate::domain::model::{Feed, Release, ReleaseSummary, SendMode};
use crate::domain::ports::{Notifier, ReleaseSource, StateStore, Summarizer};
use crate::utils::error::Result;
use serde_json::Value;

/// Everything the watcher needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub feeds: Vec<Feed>,
    pub send_mode: SendMode,
    pub include_prereleases: bool,
    pub rules: SectionRules,
    /// Plan and render, but neither post nor persist.
    pub dry_run: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            feeds: Feed::defaults(),
            send_mode: SendMode::default(),
            include_prereleases: false,
            rules: SectionRules::default(),
            dry_run: false,
        }
    }
}

/// A release that passed the newer-than check and is ready to post.
#[derive(Debug, Clone)]
pub struct PlannedRelease {
    pub feed: Feed,
    pub release: Release,
    pub previous: Option<String>,
    pub blocks: Vec<Value>,
}

/// Outcome of one run, as `(repo, tag)` pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub planned: Vec<(String, String)>,
    pub sent: Vec<(String, String)>,
    pub failed: Vec<(String, String)>,
    pub state_saved: bool,
}

pub struct ReleaseWatcher<R: ReleaseSource, N: Notifier, S: StateStore> {
    source: R,
    notifier: N,
    store: S,
    summarizer: Option<Box<dyn Summarizer>>,
    options: WatchOptions,
}

impl<R: ReleaseSource, N: Notifier, S: StateStore> ReleaseWatcher<R, N, S> {
    pub fn new(source: R, notifier: N, store: S, options: WatchOptions) -> Self {
        Self {
            source,
            notifier,
            store,
            summarizer: None,
            options,
        }
    }

    pub fn with_summarizer(mut self, summarizer: Box<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub async fn run(&self) -> Result<RunReport> {
        let mut state = self.store.load().await?;
        let mut report = RunReport::default();
        let mut plans = Vec::new();

        for feed in &self.options.feeds {
            if let Some(plan) = self.plan(feed, state.get(&feed.repo).cloned()).await {
                tracing::info!(
                    "[plan] {}: {} (was {})",
                    feed.product,
                    plan.release.tag_name,
                    plan.previous.as_deref().unwrap_or("nothing")
                );
                report
                    .planned
                    .push((feed.repo.clone(), plan.release.tag_name.clone()));
                plans.push(plan);
            }
        }

        if plans.is_empty() {
            tracing::info!("No new releases to notify");
            return Ok(report);
        }

        if self.options.dry_run {
            for plan in &plans {
                tracing::info!(
                    "[dry-run] would announce {} {} with {} blocks",
                    plan.feed.product,
                    plan.release.tag_name,
                    plan.blocks.len()
                );
            }
            return Ok(report);
        }

        match self.options.send_mode {
            SendMode::PerRepo => {
                for plan in plans {
                    let tag = plan.release.tag_name;
                    match self.notifier.send(&render::message(plan.blocks)).await {
                        Ok(()) => {
                            tracing::info!("[sent] {}: {}", plan.feed.repo, tag);
                            state.insert(plan.feed.repo.clone(), tag.clone());
                            report.sent.push((plan.feed.repo, tag));
                        }
                        Err(e) => {
                            tracing::error!("Post failed for {} {}: {}", plan.feed.repo, tag, e);
                            report.failed.push((plan.feed.repo, tag));
                        }
                    }
                }

                if report.sent.is_empty() {
                    tracing::warn!("No messages were sent");
                    return Ok(report);
                }
            }
            SendMode::Combined => {
                let blocks = plans.iter().flat_map(|p| p.blocks.clone()).collect();
                if let Err(e) = self.notifier.send(&render::message(blocks)).await {
                    tracing::error!("Combined post failed: {}", e);
                    return Err(e);
                }

                for plan in plans {
                    state.insert(plan.feed.repo.clone(), plan.release.tag_name.clone());
                    report.sent.push((plan.feed.repo, plan.release.tag_name));
                }
            }
        }

        self.store.save(&state).await?;
        report.state_saved = true;
        tracing::info!("State saved");

        Ok(report)
    }

    async fn plan(&self, feed: &Feed, previous: Option<String>) -> Option<PlannedRelease> {
        let release = match self
            .source
            .latest_release(&feed.repo, self.options.include_prereleases)
            .await
        {
            Ok(Some(release)) => release,
            Ok(None) => {
                tracing::debug!("{}: no release available", feed.repo);
                return None;
            }
            Err(e) => {
                tracing::warn!("Fetching {} failed, skipping: {}", feed.repo, e);
                return None;
            }
        };

        if let Some(last) = previous.as_deref() {
            if !version::is_newer(&release.tag_name, last) {
                tracing::info!(
                    "[skip] {}: latest={} (already sent)",
                    feed.product,
                    release.tag_name
                );
                return None;
            }
        }

        let sections = extract_sections(&release.body, &self.options.rules);
        let summary = self.summarize(feed, &release).await;
        let blocks = render::release_blocks(
            &feed.product,
            &release,
            &sections,
            summary.as_ref(),
            self.options.rules.max_bullets(),
        );

        Some(PlannedRelease {
            feed: feed.clone(),
            release,
            previous,
            blocks,
        })
    }

    async fn summarize(&self, feed: &Feed, release: &Release) -> Option<ReleaseSummary> {
        let summarizer = self.summarizer.as_ref()?;
        match summarizer.summarize(&feed.product, release).await {
            Ok(Some(text)) => Some(ReleaseSummary {
                provider: summarizer.provider_name().to_string(),
                text,
            }),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    "Summary failed for {} {}: {}",
                    feed.product,
                    release.tag_name,
                    e
                );
                None
            }
        }
    }
}
