//! Media references extracted from HTML and resolved against a local store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Kind of media an element references, fixed by the element it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

/// A media URL paired with its local file, if one was found.
///
/// `found` is true exactly when `local_path` names an existing file. The JSON
/// field names are read by later migration steps and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaReference {
    pub url: String,
    #[serde(default)]
    pub local_path: PathBuf,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(default)]
    pub found: bool,
}

impl MediaReference {
    /// An unresolved reference, as produced by extraction.
    pub fn unresolved(url: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            url: url.into(),
            local_path: PathBuf::new(),
            kind,
            found: false,
        }
    }

    /// Copy of this reference with its resolution outcome applied.
    pub fn resolved(&self, local_path: Option<PathBuf>) -> Self {
        match local_path {
            Some(path) => Self {
                local_path: path,
                found: true,
                ..self.clone()
            },
            None => Self {
                local_path: PathBuf::new(),
                found: false,
                ..self.clone()
            },
        }
    }

    /// The local file, only when one was found.
    pub fn local_file(&self) -> Option<&Path> {
        self.found.then_some(self.local_path.as_path())
    }
}

/// Read-only URL lookup over resolved references.
#[derive(Debug, Clone, Default)]
pub struct MediaMap {
    by_url: HashMap<String, MediaReference>,
}

impl MediaMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<&MediaReference> {
        self.by_url.get(url)
    }

    /// Local path for a URL, if it resolved to a file.
    pub fn local_path(&self, url: &str) -> Option<PathBuf> {
        self.get(url)
            .and_then(MediaReference::local_file)
            .map(Path::to_path_buf)
    }

    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }
}

impl<'a> FromIterator<&'a MediaReference> for MediaMap {
    fn from_iter<I: IntoIterator<Item = &'a MediaReference>>(iter: I) -> Self {
        let mut by_url = HashMap::new();
        for reference in iter {
            // Duplicates resolve identically; keep the first.
            by_url
                .entry(reference.url.clone())
                .or_insert_with(|| reference.clone());
        }
        Self { by_url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_json_field_names() {
        let reference = MediaReference::unresolved("http://x/a.mp3", MediaKind::Audio);
        let json = serde_json::to_value(&reference).unwrap();

        assert_eq!(json["url"], "http://x/a.mp3");
        assert_eq!(json["localPath"], "");
        assert_eq!(json["type"], "audio");
        assert_eq!(json["found"], false);
    }

    #[test]
    fn test_resolved_sets_found() {
        let reference = MediaReference::unresolved("http://x/a.jpg", MediaKind::Image);

        let hit = reference.resolved(Some(PathBuf::from("/m/a.jpg")));
        assert!(hit.found);
        assert_eq!(hit.local_file(), Some(Path::new("/m/a.jpg")));

        let miss = reference.resolved(None);
        assert!(!miss.found);
        assert_eq!(miss.local_path, PathBuf::new());
        assert_eq!(miss.local_file(), None);
    }

    #[test]
    fn test_media_map_only_exposes_found_paths() {
        let refs = [
            MediaReference::unresolved("a", MediaKind::Image).resolved(Some("/m/a".into())),
            MediaReference::unresolved("b", MediaKind::Image),
        ];
        let map: MediaMap = refs.iter().collect();

        assert_eq!(map.len(), 2);
        assert_eq!(map.local_path("a"), Some(PathBuf::from("/m/a")));
        assert_eq!(map.local_path("b"), None);
        assert_eq!(map.local_path("c"), None);
    }
}
