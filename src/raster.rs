//! Offline backend: renders local HTML without a browser process
//!
//! Output is deterministic for a given document and viewport, which makes
//! this backend suitable for tests and for hosts without Chrome. It does not
//! execute scripts or apply stylesheets beyond the page background.

use crate::rendering::{self, layout::collapse_whitespace};
use crate::{Engine, EngineConfig, Error, LoadedPage, Result, Viewport};
use log::{debug, warn};
use scraper::{ElementRef, Html};
use std::path::Path;
use std::sync::Arc;

type OnLoadHandler = Arc<dyn Fn(&LoadedPage) + Send + Sync>;

/// Largest canvas the offline backend allocates (8192x8192, 256 MiB of RGBA)
pub const MAX_RASTER_PIXELS: u64 = 8192 * 8192;

pub struct RasterEngine {
    config: EngineConfig,
    html: Option<String>,
    url: Option<String>,
    on_load: Option<OnLoadHandler>,
}

impl Engine for RasterEngine {
    fn new(config: EngineConfig) -> Result<Self>
    where
        Self: Sized,
    {
        if config.viewport.width == 0 || config.viewport.height == 0 {
            return Err(Error::ConfigError(format!("viewport {} has no area", config.viewport)));
        }
        let pixels = config.viewport.width as u64 * config.viewport.height as u64;
        if pixels > MAX_RASTER_PIXELS {
            return Err(Error::ConfigError(format!(
                "viewport {} exceeds the offline renderer's {} pixel canvas",
                config.viewport, MAX_RASTER_PIXELS
            )));
        }
        debug!("raster engine acquired at {}", config.viewport);
        Ok(Self {
            config,
            html: None,
            url: None,
            on_load: None,
        })
    }

    fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path).map_err(|e| Error::LoadError(format!("{}: {}", path.display(), e)))?;
        if bytes.contains(&0) {
            return Err(Error::LoadError(format!("{}: binary content, not HTML", path.display())));
        }
        let html = match String::from_utf8(bytes) {
            Ok(html) => html,
            Err(e) => {
                warn!("{}: not valid UTF-8, undecodable bytes are replaced", path.display());
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.html = Some(html);
        self.url = Some(format!("file://{}", absolute.display()));

        if let Some(cb) = &self.on_load {
            if let Ok(page) = self.page_info() {
                cb(&page);
            }
        }
        Ok(())
    }

    fn page_info(&self) -> Result<LoadedPage> {
        let html = self
            .html
            .as_ref()
            .ok_or_else(|| Error::LoadError("No document loaded".into()))?;
        let document = Html::parse_document(html);

        let find = |tag: &str| {
            document
                .root_element()
                .descendants()
                .filter_map(ElementRef::wrap)
                .find(|e| e.value().name() == tag)
                .map(|e| collapse_whitespace(e.text()))
                .unwrap_or_default()
        };

        Ok(LoadedPage {
            title: find("title"),
            text: find("body"),
            url: self.url.clone().unwrap_or_default(),
        })
    }

    fn render_png(&self) -> Result<Vec<u8>> {
        let html = self
            .html
            .as_ref()
            .ok_or_else(|| Error::EncodeError("No document loaded".into()))?;
        let shot = rendering::render_html(html, self.config.viewport)?;
        Ok(shot.png_data)
    }

    fn on_load<F>(&mut self, cb: F)
    where
        F: Fn(&LoadedPage) + Send + Sync + 'static,
    {
        self.on_load = Some(Arc::new(cb));
    }

    fn clear_on_load(&mut self) {
        self.on_load = None;
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}
