//! Media handling: extraction, local resolution, statistics and tag analysis.
//!
//! Extraction walks the parsed document for media elements and yields
//! unresolved [`MediaReference`](crate::model::MediaReference)s. A
//! [`MediaResolver`] then pairs each URL with a file under the media root.

mod analyze;
mod extract;
mod resolve;
mod stats;

pub use analyze::{
    COVERED_TAGS, NON_MEDIA_TAGS, POTENTIAL_MEDIA_TAGS, TagAnalysis, TagAnalyzer, analyze_tags,
};
pub use extract::extract_media;
pub use resolve::{
    FsResolver, MediaIndex, MediaResolver, ResolveStrategy, filename_from_url, resolve_media,
};
pub use stats::{MediaStats, MediaSummary, missing_media_urls};
