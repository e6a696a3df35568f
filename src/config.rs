//! Job options from the command line and from a JSON config file
//!
//! Both sources produce a [`JobOptions`]; layers are merged with
//! [`JobOptions::or`] and resolved into a [`RenderJob`] at the end.

use crate::{Error, Preset, RenderJob, Result};
use serde::Deserialize;
use std::path::Path;

/// The recognized options: `basename`, `width`, `height` and `preset`
///
/// ```
/// use html2png::JobOptions;
///
/// let opts = JobOptions::from_json(r#"{ "basename": "page", "preset": "a4" }"#).unwrap();
/// let job = opts.into_job().unwrap();
/// assert_eq!(job.viewport().height, 1123);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobOptions {
    /// Stem shared by the input `.html` and output `.png`
    pub basename: Option<String>,
    /// Viewport width in pixels
    pub width: Option<u32>,
    /// Viewport height in pixels
    pub height: Option<u32>,
    /// Named viewport size; explicit width/height on the same layer win
    pub preset: Option<Preset>,
}

impl JobOptions {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::ConfigError(format!("invalid config: {}", e)))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("cannot read config {}: {}", path.display(), e)))?;
        Self::from_json(&text)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// Layer `self` over `fallback`.
    ///
    /// A preset on `self` discards the fallback's explicit dimensions, so a
    /// preset picked on the command line beats sizes from a config file.
    pub fn or(self, fallback: JobOptions) -> JobOptions {
        let (fallback_width, fallback_height) = if self.preset.is_some() {
            (None, None)
        } else {
            (fallback.width, fallback.height)
        };

        JobOptions {
            basename: self.basename.or(fallback.basename),
            width: self.width.or(fallback_width),
            height: self.height.or(fallback_height),
            preset: self.preset.or(fallback.preset),
        }
    }

    /// Resolve into a validated job, filling gaps from the preset (or the default preset)
    pub fn into_job(self) -> Result<RenderJob> {
        let basename = self
            .basename
            .ok_or_else(|| Error::ConfigError("no basename given".into()))?;
        let base = self.preset.unwrap_or_default().viewport();
        RenderJob::new(
            basename,
            self.width.unwrap_or(base.width),
            self.height.unwrap_or(base.height),
        )
    }
}
