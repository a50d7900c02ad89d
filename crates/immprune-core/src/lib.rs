pub mod asset;
pub mod batch;
pub mod config;
pub mod error;
pub mod immich;
pub mod index;
pub mod key;
pub mod locale;
pub mod matcher;
pub mod photos;
pub mod report;

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Local, NaiveDate, Utc};

pub use asset::{LocalAsset, RemoteAsset};
pub use batch::{BatchGroup, BatchOptions, ReportPlan, YearBatch};
pub use config::Config;
pub use error::ImmpruneError;
pub use immich::{ImmichClient, SearchPages};
pub use index::RemoteIndex;
pub use locale::Locale;
pub use matcher::MatchFilter;
pub use photos::{InventorySource, LocalSource, PhotosLibrary};

/// Default report file name.
pub const DEFAULT_OUTPUT: &str = "safe_to_delete.txt";

/// Everything a compare run needs, built once by the front end.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub only_videos: bool,
    /// Keep only assets captured strictly after this day (midnight UTC)
    pub after: Option<NaiveDate>,
    /// Maximum entries in a single-pass report, 0 = unlimited
    pub limit: usize,
    pub output: PathBuf,
    /// Year batches; `None` for a single pass
    pub batch: Option<BatchOptions>,
    pub locale: Locale,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            only_videos: false,
            after: None,
            limit: 0,
            output: PathBuf::from(DEFAULT_OUTPUT),
            batch: None,
            locale: Locale::default(),
        }
    }
}

impl CompareOptions {
    pub fn validate(&self) -> Result<(), ImmpruneError> {
        if let Some(batch) = &self.batch {
            batch.validate()?;
        }
        if self.output.as_os_str().is_empty() {
            return Err(ImmpruneError::input("output path is empty"));
        }
        Ok(())
    }

    pub fn match_filter(&self) -> MatchFilter {
        MatchFilter {
            after: self.after.and_then(cutoff_instant),
            years: self.batch.as_ref().map(BatchOptions::years),
        }
    }
}

fn cutoff_instant(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

/// Parse a `YYYY-MM-DD` cutoff.
pub fn parse_after_date(raw: &str) -> Result<NaiveDate, ImmpruneError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ImmpruneError::input(format!("invalid --after date {:?} (expected YYYY-MM-DD)", raw)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Remote,
    Local,
    Match,
}

/// Console feedback hooks. Purely cosmetic; nothing here can influence the result.
pub trait CompareObserver: Sync {
    fn stage_started(&self, _stage: Stage) {}
    fn stage_finished(&self, _stage: Stage, _ok: bool) {}
    fn progress(&self, _stage: &str, _current: u64, _total: u64, _message: &str) {}
}

/// Observer that reports nothing.
pub struct Quiet;

impl CompareObserver for Quiet {}

/// Type alias for progress callback
pub type ProgressCallback<'a> = dyn Fn(&str, u64, u64, &str) + Send + Sync + 'a;

/// Progress callback that drops every update.
pub fn no_progress(_stage: &str, _current: u64, _total: u64, _message: &str) {}

/// Throttled progress reporter: emits at most every 200ms or on completion.
pub struct ThrottledProgress<'a> {
    inner: &'a ProgressCallback<'a>,
    last_emit: std::sync::Mutex<Instant>,
}

impl<'a> ThrottledProgress<'a> {
    pub fn new(inner: &'a ProgressCallback<'a>) -> Self {
        let start = Instant::now()
            .checked_sub(std::time::Duration::from_secs(1))
            .unwrap_or_else(Instant::now);
        Self {
            inner,
            last_emit: std::sync::Mutex::new(start),
        }
    }

    pub fn report(&self, stage: &str, current: u64, total: u64, message: &str) {
        let is_done = current + 1 >= total;
        if !is_done {
            let Ok(mut last) = self.last_emit.lock() else {
                return;
            };
            if last.elapsed().as_millis() < 200 {
                return;
            }
            *last = Instant::now();
        }
        (self.inner)(stage, current, total, message);
    }
}

#[derive(Debug, Clone)]
pub struct CompareResult {
    pub remote_assets: usize,
    pub local_assets: usize,
    /// Matches before ranking limits
    pub matched: usize,
    pub plan: ReportPlan,
    pub scanned_at: DateTime<Local>,
}

impl CompareResult {
    pub fn reported(&self) -> usize {
        self.plan.len()
    }
}

/// Pure part of a run: index the catalog, match the inventory, rank the matches.
pub fn reconcile(
    remote: &[RemoteAsset],
    local: &[LocalAsset],
    options: &CompareOptions,
    progress: &ThrottledProgress,
) -> (usize, ReportPlan) {
    let index = RemoteIndex::build(remote);
    let safe = matcher::find_safe(local, &index, &options.match_filter(), progress);
    let matched = safe.len();
    (matched, batch::plan(safe, options.limit, options.batch.as_ref()))
}

/// Full run: validate, fetch the catalog, read the library, match, rank and write the report.
pub fn compare(
    options: &CompareOptions,
    catalog: &dyn SearchPages,
    inventory: &dyn InventorySource,
    observer: &dyn CompareObserver,
) -> anyhow::Result<CompareResult> {
    options.validate()?;

    observer.stage_started(Stage::Remote);
    let remote = immich::fetch_all_assets(catalog, options.only_videos);
    observer.stage_finished(Stage::Remote, remote.is_ok());
    let remote = remote?;

    observer.stage_started(Stage::Local);
    let local = inventory.read_assets(options.only_videos);
    observer.stage_finished(Stage::Local, local.is_ok());
    let local = local?;

    observer.stage_started(Stage::Match);
    let callback = |stage: &str, current: u64, total: u64, message: &str| {
        observer.progress(stage, current, total, message)
    };
    let tp = ThrottledProgress::new(&callback);
    let (matched, plan) = reconcile(&remote, &local, options, &tp);
    observer.stage_finished(Stage::Match, true);

    let scanned_at = Local::now();
    report::write_report_file(&options.output, &plan, options.locale, scanned_at)?;

    Ok(CompareResult {
        remote_assets: remote.len(),
        local_assets: local.len(),
        matched,
        plan,
        scanned_at,
    })
}
