//! Render job data model: basename, viewport size and the named presets

use crate::{Error, Result, Viewport};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Largest accepted width or height in pixels
///
/// This matches Chrome's capture limit. The offline backend additionally caps
/// the canvas area at `raster::MAX_RASTER_PIXELS` when the `raster`
/// feature is enabled.
pub const MAX_DIMENSION: u32 = 16_384;

const HTML_SUFFIX: &str = ".html";
const PNG_SUFFIX: &str = ".png";

/// Named viewport sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// 1500x900, the classic landscape report
    #[default]
    Report,
    /// 1900x900
    Wide,
    /// 794x1123, A4 portrait at 96 dpi
    A4,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Report, Preset::Wide, Preset::A4];

    pub fn viewport(self) -> Viewport {
        match self {
            Preset::Report => Viewport { width: 1500, height: 900 },
            Preset::Wide => Viewport { width: 1900, height: 900 },
            Preset::A4 => Viewport { width: 794, height: 1123 },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Report => "report",
            Preset::Wide => "wide",
            Preset::A4 => "a4",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
                Error::ConfigError(format!("unknown preset '{}' (expected one of: {})", s, names.join(", ")))
            })
    }
}

/// A single HTML to PNG conversion
///
/// Constructed once per invocation, consumed by the renderer, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    basename: String,
    viewport: Viewport,
}

impl RenderJob {
    /// Build a validated job. A trailing `.html` on the basename is dropped.
    pub fn new(basename: impl Into<String>, width: u32, height: u32) -> Result<Self> {
        let raw = basename.into();
        let basename = raw.strip_suffix(HTML_SUFFIX).unwrap_or(&raw).to_string();
        if basename.trim().is_empty() {
            return Err(Error::ConfigError("basename must not be empty".into()));
        }
        validate_dimension("width", width)?;
        validate_dimension("height", height)?;

        Ok(Self {
            basename,
            viewport: Viewport { width, height },
        })
    }

    pub fn from_preset(basename: impl Into<String>, preset: Preset) -> Result<Self> {
        let v = preset.viewport();
        Self::new(basename, v.width, v.height)
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// `<basename>.html`
    pub fn input_path(&self) -> PathBuf {
        PathBuf::from(format!("{}{}", self.basename, HTML_SUFFIX))
    }

    /// `<basename>.png`
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(format!("{}{}", self.basename, PNG_SUFFIX))
    }
}

fn validate_dimension(name: &str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(Error::ConfigError(format!("{} must be a positive number of pixels", name)));
    }
    if value > MAX_DIMENSION {
        return Err(Error::ConfigError(format!(
            "{} {} exceeds the maximum of {} pixels",
            name, value, MAX_DIMENSION
        )));
    }
    Ok(())
}
