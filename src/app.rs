use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::changes::{change_record, diff_lines, ChangeDetector, Detection, History};
use crate::config::Config;
use crate::error::Result;
use crate::feed::Registry;
use crate::services::{ContentFetcher, FixedDelay, PageFetcher, Throttle};
use crate::store::{load_document, save_document, SnapshotStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOutcome {
    FirstSeen,
    Unchanged,
    Changed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSource {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct CrawlReport {
    pub checked: usize,
    pub first_seen: usize,
    pub unchanged: usize,
    /// Ids of sources whose content changed in this pass.
    pub updated: Vec<String>,
    pub skipped: Vec<SkippedSource>,
}

impl CrawlReport {
    pub fn total(&self) -> usize {
        self.checked + self.skipped.len()
    }
}

struct Limits {
    history: usize,
    segment_chars: usize,
    segments: usize,
}

pub struct App {
    // Data
    pub registry: Registry,
    pub history: History,

    // Storage
    snapshots: SnapshotStore,
    registry_path: PathBuf,
    history_path: PathBuf,

    // Services
    fetcher: Box<dyn PageFetcher>,
    throttle: Box<dyn Throttle>,
    limits: Limits,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let fetcher = ContentFetcher::new(config.request_timeout(), &config.user_agent)?;
        let throttle = FixedDelay::new(config.request_delay());
        Self::with_services(config, Box::new(fetcher), Box::new(throttle))
    }

    pub fn with_services(
        config: &Config,
        fetcher: Box<dyn PageFetcher>,
        throttle: Box<dyn Throttle>,
    ) -> Result<Self> {
        let registry_path = config.registry_path();
        let history_path = config.history_path();

        let registry: Registry = load_document(&registry_path)?;
        registry.validate()?;
        let mut history: History = load_document(&history_path)?;
        history.enforce_limit(config.history_limit);

        Ok(Self {
            registry,
            history,
            snapshots: SnapshotStore::new(config.snapshot_dir()),
            registry_path,
            history_path,
            fetcher,
            throttle,
            limits: Limits {
                history: config.history_limit,
                segment_chars: config.max_segment_chars,
                segments: config.max_segments,
            },
        })
    }

    /// Check every registered source once, in order. Per-source failures are
    /// logged and reported, never propagated.
    pub async fn crawl(&mut self, now: DateTime<Utc>) -> CrawlReport {
        let mut report = CrawlReport::default();

        for index in 0..self.registry.feeds.len() {
            let id = self.registry.feeds[index].id.clone();

            match self.check_source(index, now).await {
                Ok(outcome) => {
                    report.checked += 1;
                    match outcome {
                        SourceOutcome::FirstSeen => report.first_seen += 1,
                        SourceOutcome::Unchanged => report.unchanged += 1,
                        SourceOutcome::Changed => report.updated.push(id),
                    }
                }
                Err(reason) => {
                    tracing::warn!(source = %id, "Skipping source: {}", reason);
                    report.skipped.push(SkippedSource { id, reason });
                }
            }

            self.throttle.pause().await;
        }

        report
    }

    async fn check_source(
        &mut self,
        index: usize,
        now: DateTime<Utc>,
    ) -> std::result::Result<SourceOutcome, String> {
        let (id, url, selector) = {
            let source = &self.registry.feeds[index];
            (
                source.id.clone(),
                source.url.clone(),
                source.effective_selector().map(str::to_string),
            )
        };

        let page = self
            .fetcher
            .fetch(&url, selector.as_deref())
            .await
            .map_err(|e| e.to_string())?;

        let detection = ChangeDetector::new(&self.snapshots).inspect(&id, &page.text);

        if !matches!(detection, Detection::Unchanged) {
            self.snapshots
                .write(&id, &page.text)
                .map_err(|e| format!("failed to write snapshot: {}", e))?;
        }

        let source = &mut self.registry.feeds[index];
        source.last_checked = Some(now);
        if source.adopt_title(page.title.as_deref()) {
            tracing::debug!(source = %id, "Title is now {:?}", source.title);
        }

        let outcome = match detection {
            Detection::FirstSeen => {
                tracing::info!(source = %id, "First snapshot taken");
                SourceOutcome::FirstSeen
            }
            Detection::Unchanged => {
                tracing::debug!(source = %id, "No change");
                SourceOutcome::Unchanged
            }
            Detection::Changed { previous } => {
                source.last_updated = Some(now);
                let diff = diff_lines(&previous, &page.text, self.limits.segment_chars);
                let record = change_record(source, diff, now, self.limits.segments);
                tracing::info!(source = %id, "Change detected: {}", record.summary);
                self.history.record(record, self.limits.history);
                SourceOutcome::Changed
            }
        };

        Ok(outcome)
    }

    pub fn save(&self) -> Result<()> {
        save_document(&self.registry_path, &self.registry)?;
        save_document(&self.history_path, &self.history)?;
        Ok(())
    }
}
