//! Local media resolution.
//!
//! Maps a media URL to a file under a media root by file name. Resolution
//! never fails: a missing root, an unreadable entry or no match all come out
//! as "not found".

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;
use walkdir::WalkDir;

use crate::model::MediaReference;

/// How to choose among files sharing the URL's file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolveStrategy {
    /// First match in a name-sorted depth-first walk.
    #[default]
    Basename,
    /// The match whose relative path shares the most trailing components
    /// with the URL path, so `2020/01/photo.jpg` beats `2019/05/photo.jpg`.
    PathSuffix,
}

/// Resolves media URLs to local files.
pub trait MediaResolver {
    /// Local file for a URL, if one exists.
    fn resolve(&self, url: &str) -> Option<PathBuf>;

    /// Resolve each reference, returning new references in the same order.
    ///
    /// Each distinct URL is looked up once.
    fn resolve_all(&self, refs: &[MediaReference]) -> Vec<MediaReference> {
        let mut cache: HashMap<&str, Option<PathBuf>> = HashMap::new();
        refs.iter()
            .map(|r| {
                let path = cache
                    .entry(r.url.as_str())
                    .or_insert_with(|| {
                        let found = self.resolve(&r.url);
                        if found.is_none() {
                            log::debug!("no local file for {} {}", r.kind.as_str(), r.url);
                        }
                        found
                    })
                    .clone();
                r.resolved(path)
            })
            .collect()
    }
}

/// File name a URL points at, percent-decoded.
///
/// Uses the last path segment of a parsed URL; anything that does not parse
/// as an absolute URL falls back to the text after the last `/`.
pub fn filename_from_url(url: &str) -> Option<String> {
    url_segments(url).pop()
}

/// Decoded, non-empty path segments of a URL.
fn url_segments(url: &str) -> Vec<String> {
    let raw: Vec<String> = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .map(|segments| segments.map(str::to_string).collect())
            .unwrap_or_default(),
        Err(_) => {
            let path = url.split(['?', '#']).next().unwrap_or_default();
            path.split('/').map(str::to_string).collect()
        }
    };
    raw.iter()
        .filter(|s| !s.is_empty())
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        .collect()
}

/// Number of trailing path components `path` (relative to `root`) shares
/// with `segments`.
fn shared_suffix(root: &Path, path: &Path, segments: &[String]) -> usize {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .rev()
        .zip(segments.iter().rev())
        .take_while(|(component, segment)| component.as_os_str() == segment.as_str())
        .count()
}

/// Pick among candidates in walk order according to `strategy`.
fn choose<'p>(
    strategy: ResolveStrategy,
    root: &Path,
    url: &str,
    candidates: impl IntoIterator<Item = &'p PathBuf>,
) -> Option<PathBuf> {
    let mut candidates = candidates.into_iter();
    match strategy {
        ResolveStrategy::Basename => candidates.next().cloned(),
        ResolveStrategy::PathSuffix => {
            let segments = url_segments(url);
            let mut best: Option<(&PathBuf, usize)> = None;
            for path in candidates {
                let score = shared_suffix(root, path, &segments);
                if best.is_none_or(|(_, s)| score > s) {
                    best = Some((path, score));
                }
            }
            best.map(|(path, _)| path.clone())
        }
    }
}

fn absolute(root: &Path) -> PathBuf {
    std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf())
}

/// Walk files under `root` in deterministic order.
fn walk_files(root: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::debug!("skipping unreadable media entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
}

/// Searches the filesystem on every lookup.
#[derive(Debug, Clone)]
pub struct FsResolver {
    root: PathBuf,
    strategy: ResolveStrategy,
}

impl FsResolver {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_strategy(root, ResolveStrategy::default())
    }

    pub fn with_strategy(root: impl AsRef<Path>, strategy: ResolveStrategy) -> Self {
        Self {
            root: absolute(root.as_ref()),
            strategy,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl MediaResolver for FsResolver {
    fn resolve(&self, url: &str) -> Option<PathBuf> {
        let name = filename_from_url(url)?;
        let matches = walk_files(&self.root).filter(|e| e.file_name().to_string_lossy() == name);
        match self.strategy {
            ResolveStrategy::Basename => matches.map(walkdir::DirEntry::into_path).next(),
            ResolveStrategy::PathSuffix => {
                let paths: Vec<PathBuf> = matches.map(walkdir::DirEntry::into_path).collect();
                choose(self.strategy, &self.root, url, &paths)
            }
        }
    }
}

/// File-name index of a media root, built with one walk.
///
/// Serves many lookups without touching the filesystem again, which is what
/// a batch over thousands of documents wants.
#[derive(Debug, Clone, Default)]
pub struct MediaIndex {
    root: PathBuf,
    strategy: ResolveStrategy,
    by_name: HashMap<String, Vec<PathBuf>>,
}

impl MediaIndex {
    pub fn build(root: impl AsRef<Path>, strategy: ResolveStrategy) -> Self {
        let root = absolute(root.as_ref());
        let mut by_name: HashMap<String, Vec<PathBuf>> = HashMap::new();
        for entry in walk_files(&root) {
            let name = entry.file_name().to_string_lossy().into_owned();
            by_name.entry(name).or_default().push(entry.into_path());
        }
        log::debug!(
            "indexed {} file names under {}",
            by_name.len(),
            root.display()
        );
        Self {
            root,
            strategy,
            by_name,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of distinct file names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl MediaResolver for MediaIndex {
    fn resolve(&self, url: &str) -> Option<PathBuf> {
        let name = filename_from_url(url)?;
        let paths = self.by_name.get(&name)?;
        choose(self.strategy, &self.root, url, paths)
    }
}

/// Resolve references against a media root with a live search.
pub fn resolve_media(refs: &[MediaReference], media_root: impl AsRef<Path>) -> Vec<MediaReference> {
    FsResolver::new(media_root).resolve_all(refs)
}
