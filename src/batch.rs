//! Multi-document batch driver.
//!
//! Converts many source records on a bounded rayon pool. Each document is
//! isolated: a panic while converting one becomes a fallback post plus a
//! recorded failure, and the rest of the batch carries on. Cancellation is
//! cooperative and checked between documents, never inside one.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::media::{MediaResolver, MediaStats};
use crate::model::MediaKind;
use crate::transform::{ContentKind, Document, SourceRecord, Transformer};

/// Documents between progress log lines.
const PROGRESS_EVERY: usize = 100;

/// A source record alongside what it converted into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub original: SourceRecord,
    pub transformed: Document,
}

/// A document whose conversion panicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFailure {
    pub id: u64,
    pub title: String,
    pub message: String,
}

/// A media reference with no local file, and where it was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingMedia {
    pub url: String,
    pub found_in: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub processed: usize,
    pub posts: usize,
    pub pages: usize,
    /// Records never started because the batch was cancelled.
    pub skipped: usize,
    pub cancelled: bool,
    pub media: MediaStats,
    pub missing_media: Vec<MissingMedia>,
    pub failures: Vec<DocumentFailure>,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Processed {} documents ({} posts, {} pages)",
            self.processed, self.posts, self.pages
        )?;
        if self.cancelled {
            writeln!(f, "Cancelled: {} documents skipped", self.skipped)?;
        }
        writeln!(f, "Media Processing Summary:")?;
        writeln!(f, "- Images: {}", self.media.total_images)?;
        writeln!(f, "- Audio: {}", self.media.total_audio)?;
        writeln!(f, "- Video: {}", self.media.total_video)?;
        writeln!(f, "- Found locally: {}", self.media.total_found)?;
        writeln!(f, "- Missing: {}", self.media.total_missing)?;
        for missing in &self.missing_media {
            writeln!(
                f,
                "  {} {} ({})",
                missing.kind.as_str(),
                missing.url,
                missing.found_in
            )?;
        }
        if !self.failures.is_empty() {
            writeln!(f, "Failures: {}", self.failures.len())?;
            for failure in &self.failures {
                writeln!(f, "- {} ({}): {}", failure.title, failure.id, failure.message)?;
            }
        }
        Ok(())
    }
}

/// Converted records and their summary.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub records: Vec<MigrationRecord>,
    pub summary: BatchSummary,
}

impl BatchOutput {
    /// Write the records as the pretty-printed JSON migration artifact.
    ///
    /// A cancelled batch is incomplete and is not written.
    pub fn write_artifact(&self, path: impl AsRef<Path>) -> Result<()> {
        if self.summary.cancelled {
            return Err(Error::Cancelled);
        }
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &self.records)?;
        log::info!("wrote {} records to {}", self.records.len(), path.display());
        Ok(())
    }
}

/// Read source records from a JSON array, as exported from `wp_posts`.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<SourceRecord>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    Ok(serde_json::from_reader(reader)?)
}

/// Runs a [`Transformer`] over many records.
pub struct BatchRunner<'t, R> {
    transformer: &'t Transformer<R>,
    workers: usize,
    cancel: Arc<AtomicBool>,
}

impl<'t, R: MediaResolver + Sync> BatchRunner<'t, R> {
    pub fn new(transformer: &'t Transformer<R>) -> Self {
        Self {
            transformer,
            workers: 0,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Worker thread count; 0 uses one per CPU.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Share a cancellation flag, e.g. with a signal handler.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    /// Handle that cancels the batch when set.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Convert every record, keeping input order in the output.
    pub fn run(&self, records: &[SourceRecord]) -> Result<BatchOutput> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| Error::Worker(e.to_string()))?;

        let total = records.len();
        let done = AtomicUsize::new(0);
        log::info!("converting {total} documents on {} workers", pool.current_num_threads());

        let outcomes: Vec<Option<(Document, Option<DocumentFailure>)>> = pool.install(|| {
            records
                .par_iter()
                .map(|record| {
                    if self.cancel.load(Ordering::Relaxed) {
                        return None;
                    }
                    let outcome = self.convert_isolated(record);
                    let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if n % PROGRESS_EVERY == 0 || n == total {
                        log::info!("{n}/{total} documents converted");
                    }
                    Some(outcome)
                })
                .collect()
        });

        let mut summary = BatchSummary::default();
        let mut converted = Vec::with_capacity(total);
        for (record, outcome) in records.iter().zip(outcomes) {
            let Some((document, failure)) = outcome else {
                summary.skipped += 1;
                continue;
            };
            summary.processed += 1;
            match document.kind() {
                ContentKind::Post => summary.posts += 1,
                ContentKind::Page => summary.pages += 1,
            }
            summary.media += MediaStats::from_refs(document.media());
            summary.missing_media.extend(
                document
                    .media()
                    .iter()
                    .filter(|m| !m.found)
                    .map(|m| MissingMedia {
                        url: m.url.clone(),
                        found_in: record.label(),
                        kind: m.kind,
                    }),
            );
            summary.failures.extend(failure);
            converted.push(MigrationRecord {
                original: record.clone(),
                transformed: document,
            });
        }
        summary.cancelled = summary.skipped > 0;
        if summary.cancelled {
            log::warn!("batch cancelled, {} documents skipped", summary.skipped);
        }

        Ok(BatchOutput {
            records: converted,
            summary,
        })
    }

    /// Convert one record, turning a panic into a fallback post.
    fn convert_isolated(&self, record: &SourceRecord) -> (Document, Option<DocumentFailure>) {
        match panic::catch_unwind(AssertUnwindSafe(|| self.transformer.convert(record))) {
            Ok(document) => (document, None),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::error!("failed to convert {} ({}): {message}", record.label(), record.id);
                let document = Document::Post(self.transformer.fallback_post(record));
                let failure = DocumentFailure {
                    id: record.id,
                    title: record.title.clone(),
                    message,
                };
                (document, Some(failure))
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
