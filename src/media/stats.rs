//! Media counts for documents and batches.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::model::{MediaKind, MediaReference};

/// Totals by kind and by resolution outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStats {
    pub total_images: usize,
    pub total_audio: usize,
    pub total_video: usize,
    pub total_found: usize,
    pub total_missing: usize,
}

impl MediaStats {
    pub fn from_refs(refs: &[MediaReference]) -> Self {
        let mut stats = Self::default();
        for r in refs {
            match r.kind {
                MediaKind::Image => stats.total_images += 1,
                MediaKind::Audio => stats.total_audio += 1,
                MediaKind::Video => stats.total_video += 1,
            }
            if r.found {
                stats.total_found += 1;
            } else {
                stats.total_missing += 1;
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.total_images + self.total_audio + self.total_video
    }
}

impl AddAssign for MediaStats {
    fn add_assign(&mut self, other: Self) {
        self.total_images += other.total_images;
        self.total_audio += other.total_audio;
        self.total_video += other.total_video;
        self.total_found += other.total_found;
        self.total_missing += other.total_missing;
    }
}

/// Per-document media summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSummary {
    pub total: usize,
    /// Count per media type name, only for types present.
    pub by_type: BTreeMap<String, usize>,
    pub found: usize,
    pub missing: usize,
}

impl MediaSummary {
    pub fn from_refs(refs: &[MediaReference]) -> Self {
        let mut summary = Self {
            total: refs.len(),
            ..Self::default()
        };
        for r in refs {
            *summary.by_type.entry(r.kind.as_str().to_string()).or_default() += 1;
            if r.found {
                summary.found += 1;
            } else {
                summary.missing += 1;
            }
        }
        summary
    }
}

/// URLs of references that did not resolve, in order.
pub fn missing_media_urls(refs: &[MediaReference]) -> Vec<&str> {
    refs.iter()
        .filter(|r| !r.found)
        .map(|r| r.url.as_str())
        .collect()
}
