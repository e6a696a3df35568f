//! Offline rendering pipeline: layout, paint, raster

pub mod layout;
pub mod paint;
pub mod raster;

use crate::{Result, Viewport};
use scraper::Html;

/// A rendered viewport and its PNG encoding
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

/// Lay out, paint and rasterize an HTML document into a viewport-sized PNG.
///
/// Content that does not fit the viewport is clipped; the image is always
/// exactly `viewport.width` x `viewport.height`.
pub fn render_html(html: &str, viewport: Viewport) -> Result<Screenshot> {
    let document = Html::parse_document(html);
    let nodes = layout::layout_document(&document, viewport);
    let background = paint::page_background(&document);
    let commands = paint::build_display_list(&nodes, viewport, background);
    raster::rasterize(viewport.width, viewport.height, &commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_html_is_deterministic() {
        let html = "<html><body><h1>Report</h1><p>Hello</p></body></html>";
        let v = Viewport { width: 120, height: 80 };
        let a = render_html(html, v).unwrap();
        let b = render_html(html, v).unwrap();
        assert_eq!(a.png_data, b.png_data);
        assert_eq!((a.width, a.height), (120, 80));
    }
}
