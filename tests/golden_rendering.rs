#![cfg(feature = "raster")]

use std::fs;
use std::path::PathBuf;

use html2png::rendering::render_html;
use html2png::Viewport;
use sha2::{Digest, Sha256};

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

/// Digest of the decoded RGBA pixels, so PNG encoder settings do not matter.
fn pixel_digest(png: &[u8]) -> String {
    let img = image::load_from_memory(png).expect("decode render").to_rgba8();
    hex::encode(Sha256::digest(img.as_raw()))
}

#[test]
fn golden_raster_matches_fixture() {
    let page = fs::read_to_string("tests/goldens/pages/page1.html").expect("read fixture");
    let viewport = Viewport { width: 256, height: 128 };

    let screenshot = render_html(&page, viewport).expect("render fixture");
    assert_eq!((screenshot.width, screenshot.height), (256, 128));
    let digest = pixel_digest(&screenshot.png_data);

    let expected_path = golden_path("page1.sha256");
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::create_dir_all("tests/goldens/expected").ok();
        fs::write(&expected_path, format!("{}\n", digest)).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    let expected = fs::read_to_string(&expected_path).unwrap_or_else(|e| {
        panic!(
            "missing golden {:?} ({}); run with UPDATE_GOLDENS=1 to create it",
            expected_path, e
        )
    });
    assert_eq!(digest, expected.trim());
}

#[test]
fn fixture_background_is_applied() {
    let page = fs::read_to_string("tests/goldens/pages/page1.html").expect("read fixture");
    let screenshot = render_html(&page, Viewport { width: 64, height: 64 }).unwrap();
    let img = image::load_from_memory(&screenshot.png_data).unwrap().to_rgba8();
    // top-left corner sits in the margin, so it shows the body background
    assert_eq!(img.get_pixel(0, 0).0, [0xf4, 0xf4, 0xf4, 255]);
}
