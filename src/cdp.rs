//! Chrome DevTools Protocol backend

use crate::{Engine, EngineConfig, Error, LoadedPage, Result, Viewport};
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::{Emulation, Page};
use headless_chrome::{Browser, LaunchOptions};
use log::debug;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

type OnLoadHandler = Arc<dyn Fn(&LoadedPage) + Send + Sync>;

/// Time given to late layout (web fonts, images) after the load event
const SETTLE_MS: u64 = 200;

/// CDP-based engine (uses the `headless_chrome` crate)
///
/// Launches a headless Chrome whose window matches the viewport, manages a
/// single tab, and captures screenshots clipped to the viewport at device
/// scale factor 1 so the PNG is exactly `width` x `height`.
pub struct CdpEngine {
    browser: Browser,
    tab: Arc<Tab>,
    config: EngineConfig,
    on_load: Option<OnLoadHandler>,
}

impl Engine for CdpEngine {
    fn new(config: EngineConfig) -> Result<Self>
    where
        Self: Sized,
    {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .idle_browser_timeout(Duration::from_millis(config.timeout_ms.saturating_mul(2)))
            .args(vec![
                OsStr::new("--force-device-scale-factor=1"),
                OsStr::new("--hide-scrollbars"),
            ])
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::InitializationError(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_millis(config.timeout_ms));

        // The window size alone does not fix the layout viewport in new headless mode
        tab.call_method(Emulation::SetDeviceMetricsOverride {
            width: config.viewport.width,
            height: config.viewport.height,
            device_scale_factor: 1.0,
            mobile: false,
            scale: None,
            screen_width: None,
            screen_height: None,
            position_x: None,
            position_y: None,
            dont_set_visible_size: None,
            screen_orientation: None,
            viewport: None,
            display_feature: None,
        })
        .map_err(|e| Error::InitializationError(format!("Failed to set device metrics: {}", e)))?;

        debug!("chrome launched with a {} window", config.viewport);

        Ok(Self {
            browser,
            tab,
            config,
            on_load: None,
        })
    }

    fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let absolute = std::fs::canonicalize(path).map_err(|e| Error::LoadError(format!("{}: {}", path.display(), e)))?;
        let file_url = url::Url::from_file_path(&absolute)
            .map_err(|_| Error::LoadError(format!("{}: cannot be expressed as a file URL", absolute.display())))?;

        self.tab
            .navigate_to(file_url.as_str())
            .map_err(|e| Error::LoadError(format!("Navigation failed: {}", e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::LoadError(format!("Wait for navigation failed: {}", e)))?;

        std::thread::sleep(Duration::from_millis(SETTLE_MS));

        let landed = self.tab.get_url();
        if landed.starts_with("chrome-error://") {
            return Err(Error::LoadError(format!("Chrome could not display {}", file_url)));
        }

        if let Some(cb) = &self.on_load {
            if let Ok(page) = self.page_info() {
                cb(&page);
            }
        }

        Ok(())
    }

    fn page_info(&self) -> Result<LoadedPage> {
        let title = self
            .tab
            .get_title()
            .map_err(|e| Error::LoadError(format!("Failed to get title: {}", e)))?;
        let url = self.tab.get_url();

        let eval = self
            .tab
            .evaluate("document.body ? document.body.innerText : ''", false)
            .map_err(|e| Error::LoadError(format!("Evaluation failed: {}", e)))?;
        let text = eval
            .value
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        Ok(LoadedPage { title, text, url })
    }

    fn render_png(&self) -> Result<Vec<u8>> {
        let clip = Page::Viewport {
            x: 0.0,
            y: 0.0,
            width: self.config.viewport.width as f64,
            height: self.config.viewport.height as f64,
            scale: 1.0,
        };

        self.tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, Some(clip), true)
            .map_err(|e| Error::EncodeError(format!("Screenshot failed: {}", e)))
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
        // Dropping the browser terminates the Chrome child process
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_cdp_engine_capture_matches_viewport() {
        let dir = std::env::temp_dir().join(format!("html2png-cdp-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let page = dir.join("page.html");
        std::fs::write(&page, "<html><body>Hello</body></html>").unwrap();

        let config = EngineConfig {
            viewport: Viewport { width: 640, height: 360 },
            ..Default::default()
        };
        let mut engine = match CdpEngine::new(config) {
            Ok(e) => e,
            Err(e) => {
                eprintln!("Skipping: Chrome is not available or failed to launch: {}", e);
                return;
            }
        };
        engine.load_file(&page).unwrap();
        assert!(engine.page_info().unwrap().text.contains("Hello"));

        let png = engine.render_png().unwrap();
        assert_eq!(crate::renderer::png_dimensions(&png).unwrap(), (640, 360));
        engine.close().unwrap();
    }

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_cdp_layout_viewport_matches_config() {
        let dir = std::env::temp_dir().join(format!("html2png-cdp-layout-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let page = dir.join("page.html");
        std::fs::write(&page, "<html><body>Hello</body></html>").unwrap();

        let config = EngineConfig {
            viewport: Viewport { width: 794, height: 1123 },
            ..Default::default()
        };
        let mut engine = match CdpEngine::new(config) {
            Ok(e) => e,
            Err(e) => {
                eprintln!("Skipping: Chrome is not available or failed to launch: {}", e);
                return;
            }
        };
        engine.load_file(&page).unwrap();

        let eval = engine
            .tab
            .evaluate("[window.innerWidth, window.innerHeight, window.devicePixelRatio].join('x')", false)
            .unwrap();
        assert_eq!(eval.value.and_then(|v| v.as_str().map(str::to_string)).as_deref(), Some("794x1123x1"));
        engine.close().unwrap();
    }
}
