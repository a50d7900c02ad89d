use std::cmp::Ordering;
use std::fmt;
use std::ops::RangeInclusive;

use crate::asset::LocalAsset;
use crate::error::ImmpruneError;

/// Year-batch parameters, as collected by the compare wizard or the batch flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    pub start_year: i32,
    pub end_year: i32,
    /// Width of each batch in years (>= 1)
    pub batch_years: u32,
    /// Maximum entries per batch, 0 = unlimited
    pub limit_per_batch: usize,
}

impl BatchOptions {
    pub fn validate(&self) -> Result<(), ImmpruneError> {
        if self.end_year < self.start_year {
            return Err(ImmpruneError::input("end year must be >= start year"));
        }
        if self.batch_years == 0 {
            return Err(ImmpruneError::input("invalid years per batch"));
        }
        Ok(())
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.start_year..=self.end_year
    }
}

/// Inclusive year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearBatch {
    pub from: i32,
    pub to: i32,
}

impl YearBatch {
    pub fn contains(&self, year: i32) -> bool {
        year >= self.from && year <= self.to
    }
}

impl fmt::Display for YearBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// Batches from `end_year` down to `start_year`, each `size` years wide; the last one is
/// clipped at `start_year`.
pub fn build_year_batches(start_year: i32, end_year: i32, size: u32) -> Vec<YearBatch> {
    // i64 holds every i32 year minus every u32 width without overflow.
    let size = i64::from(size.max(1));
    let start = i64::from(start_year);
    let mut batches = Vec::new();
    let mut to = i64::from(end_year);
    while to >= start {
        let from = (to - size + 1).max(start);
        batches.push(YearBatch { from: from as i32, to: to as i32 });
        to -= size;
    }
    batches
}

/// Newest first. Equal timestamps fall back to filename, then identifier.
fn newest_first(a: &LocalAsset, b: &LocalAsset) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| a.filename.cmp(&b.filename))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_newest_first(assets: &mut [LocalAsset]) {
    assets.sort_by(newest_first);
}

fn truncate(assets: &mut Vec<LocalAsset>, limit: usize) {
    if limit > 0 && assets.len() > limit {
        assets.truncate(limit);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchGroup {
    pub batch: YearBatch,
    pub assets: Vec<LocalAsset>,
}

/// Ranked deletion candidates, ready for the report writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportPlan {
    Flat(Vec<LocalAsset>),
    Batched(Vec<BatchGroup>),
}

impl ReportPlan {
    /// Number of entries that will be listed.
    pub fn len(&self) -> usize {
        match self {
            ReportPlan::Flat(assets) => assets.len(),
            ReportPlan::Batched(groups) => groups.iter().map(|g| g.assets.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Order the matched assets and apply the global or per-batch limit.
pub fn plan(mut safe: Vec<LocalAsset>, limit: usize, batching: Option<&BatchOptions>) -> ReportPlan {
    sort_newest_first(&mut safe);

    let Some(opts) = batching else {
        truncate(&mut safe, limit);
        return ReportPlan::Flat(safe);
    };

    let groups = build_year_batches(opts.start_year, opts.end_year, opts.batch_years)
        .into_iter()
        .map(|batch| {
            let mut assets: Vec<LocalAsset> = safe
                .iter()
                .filter(|a| a.year().is_some_and(|y| batch.contains(y)))
                .cloned()
                .collect();
            sort_newest_first(&mut assets);
            truncate(&mut assets, opts.limit_per_batch);
            BatchGroup { batch, assets }
        })
        .collect();

    ReportPlan::Batched(groups)
}
