//! Configuration file support.
//!
//! A `blockport.toml` may set any subset of the fields below; the rest take
//! their defaults. Command-line flags override file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::export::{DEFAULT_EXCERPT_LENGTH, DEFAULT_MEDIA_ROUTE, RenderOptions};
use crate::import::{DEFAULT_FALLBACK_LIMIT, ParseOptions};
use crate::media::ResolveStrategy;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "blockport.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory searched for local copies of media files.
    pub media_root: PathBuf,
    pub excerpt_length: usize,
    /// Characters of plain text kept in a fallback block.
    pub fallback_text_limit: usize,
    /// Endpoint the preview renderer routes local media through.
    pub media_route: String,
    /// Batch worker threads; 0 uses one per CPU.
    pub workers: usize,
    pub resolve_strategy: ResolveStrategy,
    /// Convert pages into full posts instead of extracting their media only.
    pub treat_pages_as_posts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("input/uploads"),
            excerpt_length: DEFAULT_EXCERPT_LENGTH,
            fallback_text_limit: DEFAULT_FALLBACK_LIMIT,
            media_route: DEFAULT_MEDIA_ROUTE.to_string(),
            workers: 0,
            resolve_strategy: ResolveStrategy::default(),
            treat_pages_as_posts: false,
        }
    }
}

impl Config {
    /// Load a config file. A missing file is `Ok(None)`.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| Error::ConfigRead {
            path: config_path.to_path_buf(),
            source,
        })?;

        let config = toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: config_path.to_path_buf(),
            source,
        })?;

        Ok(Some(config))
    }

    /// Load `blockport.toml` from the working directory, or the defaults.
    pub fn load_or_default() -> Result<Self> {
        Ok(Self::load_from_path(CONFIG_FILE_NAME)?.unwrap_or_default())
    }

    pub fn to_toml(&self) -> String {
        // Every field is a plain scalar, so serialization cannot fail.
        toml::to_string_pretty(self).unwrap_or_default()
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            fallback_text_limit: self.fallback_text_limit,
            ..ParseOptions::default()
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            media_route: self.media_route.clone(),
        }
    }
}
