use std::collections::{HashMap, HashSet};

use crate::asset::RemoteAsset;
use crate::key;

/// Lookup structure over the whole remote catalog. Built once, read-only afterwards.
#[derive(Debug, Default)]
pub struct RemoteIndex {
    strict: HashSet<String>,
    checksums: HashSet<String>,
    fallback_counts: HashMap<String, usize>,
}

impl RemoteIndex {
    pub fn build(assets: &[RemoteAsset]) -> Self {
        let mut index = Self {
            strict: HashSet::with_capacity(assets.len()),
            checksums: HashSet::with_capacity(assets.len()),
            fallback_counts: HashMap::with_capacity(assets.len()),
        };

        for asset in assets {
            let name = key::normalize_name(&asset.original_file_name);
            let date = key::key_date(
                asset
                    .date_time_original
                    .as_deref()
                    .and_then(key::parse_timestamp),
            );

            index
                .strict
                .insert(key::strict_key(&name, asset.effective_size(), &date));
            *index
                .fallback_counts
                .entry(key::fallback_key(&name, &date))
                .or_insert(0) += 1;
            if let Some(checksum) = asset.checksum() {
                index.checksums.insert(checksum.to_string());
            }
        }

        log::debug!(
            "remote index: {} strict keys, {} fallback keys, {} checksums",
            index.strict.len(),
            index.fallback_counts.len(),
            index.checksums.len()
        );
        index
    }

    pub fn contains_strict(&self, strict_key: &str) -> bool {
        self.strict.contains(strict_key)
    }

    /// Number of remote assets sharing this `name|date` key.
    pub fn fallback_count(&self, fallback_key: &str) -> usize {
        self.fallback_counts.get(fallback_key).copied().unwrap_or(0)
    }

    /// Indexed for content matching, not consulted by the matcher yet: local assets carry no checksum.
    pub fn contains_checksum(&self, checksum: &str) -> bool {
        self.checksums.contains(checksum)
    }

    pub fn checksum_count(&self) -> usize {
        self.checksums.len()
    }

    pub fn len(&self) -> usize {
        self.strict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strict.is_empty()
    }
}
