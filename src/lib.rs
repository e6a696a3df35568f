//! html2png
//!
//! Render one HTML file into one PNG of a fixed viewport size. A job names a
//! basename; `<basename>.html` is loaded into an offscreen viewport, captured
//! once load completes, and written to `<basename>.png`.
//!
//! # Features
//!
//! - **Raster Backend** (default): an offline, browser-less rasterizer
//! - **CDP Backend** (`cdp`): headless Chrome via the Chrome DevTools Protocol
//! - **Presets**: the three classic report sizes as named viewports
//!
//! # Example
//!
//! ```no_run
//! use html2png::{Preset, RenderJob};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let job = RenderJob::from_preset("page", Preset::Report)?;
//! html2png::render(&job)?;
//! // page.png is now 1500x900
//! # Ok(())
//! # }
//! ```

use std::path::Path;

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub mod job;
pub mod renderer;

pub use config::JobOptions;
pub use job::{Preset, RenderJob, MAX_DIMENSION};
pub use renderer::{render, render_with};

#[cfg(feature = "cdp")]
pub mod cdp;

// Offline backend (no browser process, deterministic output)
#[cfg(feature = "raster")]
pub mod raster;

// Layout/paint/raster pipeline behind the offline backend
#[cfg(feature = "raster")]
pub mod rendering;

// Async-friendly facade (worker-thread owned engine)
pub mod async_api;
pub use async_api::{render_async, render_async_with};

/// Default page load timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Configuration handed to an engine when it is acquired
///
/// The viewport is fixed for the lifetime of the engine: backends size their
/// rendering surface once, at construction.
///
/// # Examples
///
/// ```
/// let cfg = html2png::EngineConfig::default();
/// assert_eq!(cfg.viewport.width, 1500);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Viewport dimensions
    pub viewport: Viewport,
    /// Timeout for page loads in milliseconds
    pub timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Viewport dimensions in CSS pixels at device scale factor 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Preset::default().viewport()
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Description of a document after load-complete
///
/// Passed to `on_load` callbacks and returned by `Engine::page_info`.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    /// Document title
    pub title: String,
    /// Extracted text content
    pub text: String,
    /// URL the engine ended up on
    pub url: String,
}

/// Core trait for rendering backends
pub trait Engine {
    /// Acquire an engine with the given configuration
    fn new(config: EngineConfig) -> Result<Self>
    where
        Self: Sized;

    /// Viewport the engine was acquired with
    fn viewport(&self) -> Viewport;

    /// Load a local HTML file. Returns only once the document is ready.
    fn load_file(&mut self, path: &Path) -> Result<()>;

    /// Describe the currently loaded document
    fn page_info(&self) -> Result<LoadedPage>;

    /// Capture the current viewport as PNG bytes
    fn render_png(&self) -> Result<Vec<u8>>;

    /// Register a callback to be invoked when a document finishes loading.
    fn on_load<F>(&mut self, cb: F)
    where
        F: Fn(&LoadedPage) + Send + Sync + 'static;

    /// Remove previously registered on_load callback if any
    fn clear_on_load(&mut self);

    /// Close the engine and release its resources
    fn close(self) -> Result<()>;
}

/// Backend used by [`render`] and [`render_async`].
///
/// Chrome is preferred when the `cdp` feature is compiled in; otherwise the
/// offline rasterizer is used.
#[cfg(feature = "cdp")]
pub type DefaultEngine = cdp::CdpEngine;

#[cfg(all(not(feature = "cdp"), feature = "raster"))]
pub type DefaultEngine = raster::RasterEngine;

#[cfg(not(any(feature = "cdp", feature = "raster")))]
compile_error!("html2png needs at least one backend: enable the `raster` or `cdp` feature");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.viewport, Viewport { width: 1500, height: 900 });
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_viewport_display() {
        let viewport = Viewport {
            width: 794,
            height: 1123,
        };
        assert_eq!(viewport.to_string(), "794x1123");
    }
}
