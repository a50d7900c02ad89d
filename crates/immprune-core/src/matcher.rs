use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};

use crate::asset::LocalAsset;
use crate::index::RemoteIndex;
use crate::key;
use crate::ThrottledProgress;

/// Pre-match filters applied to the local inventory.
#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    /// Keep only assets captured strictly after this instant
    pub after: Option<DateTime<Utc>>,
    /// Keep only assets whose capture year is in range (batch mode)
    pub years: Option<RangeInclusive<i32>>,
}

impl MatchFilter {
    pub fn accepts(&self, asset: &LocalAsset) -> bool {
        if let Some(cutoff) = self.after {
            match asset.date {
                Some(date) if date > cutoff => {}
                _ => return false,
            }
        }
        if let Some(years) = &self.years {
            match asset.year() {
                Some(year) if years.contains(&year) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Decide whether a local asset has a confident counterpart in the remote index.
///
/// A strict `name|size|date` hit is always safe. Without a size, a `name|date` hit
/// counts only when exactly one remote asset carries that pair. Undated assets are
/// never safe.
pub fn is_safe(asset: &LocalAsset, index: &RemoteIndex) -> bool {
    if asset.date.is_none() {
        return false;
    }
    let date = key::key_date(asset.date);

    if index.contains_strict(&key::strict_key(&asset.filename, asset.size, &date)) {
        return true;
    }
    asset.size == 0 && index.fallback_count(&key::fallback_key(&asset.filename, &date)) == 1
}

/// Single pass over the local inventory, keeping input order.
pub fn find_safe(
    local: &[LocalAsset],
    index: &RemoteIndex,
    filter: &MatchFilter,
    progress: &ThrottledProgress,
) -> Vec<LocalAsset> {
    let total = local.len() as u64;
    let mut safe = Vec::new();

    for (i, asset) in local.iter().enumerate() {
        if filter.accepts(asset) && is_safe(asset, index) {
            safe.push(asset.clone());
        }
        progress.report("match", i as u64, total, asset.display_name());
    }

    log::info!("matched {} of {} local assets", safe.len(), local.len());
    safe
}
