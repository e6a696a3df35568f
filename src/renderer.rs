//! The render operation: load `<basename>.html`, capture, write `<basename>.png`

use crate::{Engine, EngineConfig, Error, LoadedPage, RenderJob, Result, Viewport, DEFAULT_TIMEOUT_MS};
use image::{ImageFormat, ImageReader};
use log::{debug, info, warn};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Render a job with the default backend.
///
/// On success `<basename>.png` exists with exactly the job's viewport size.
/// On failure an existing `<basename>.png` is left untouched.
pub fn render(job: &RenderJob) -> Result<()> {
    render_with::<crate::DefaultEngine>(job)
}

/// Render a job with an explicit backend.
pub fn render_with<E: Engine>(job: &RenderJob) -> Result<()> {
    let input = preflight(job)?;

    let mut engine = E::new(engine_config(job))?;
    let basename = job.basename().to_string();
    engine.on_load(move |page: &LoadedPage| debug!("{}: loaded '{}' from {}", basename, page.title, page.url));

    // Teardown runs whether or not capture succeeded
    let captured = capture(&mut engine, &input);
    if let Err(e) = engine.close() {
        warn!("engine teardown failed: {}", e);
    }

    finish(job, &captured?)
}

fn capture<E: Engine>(engine: &mut E, input: &Path) -> Result<Vec<u8>> {
    debug!("loading {}", input.display());
    engine.load_file(input)?;
    debug!("capturing {} viewport", engine.viewport());
    engine.render_png()
}

/// Validate the job's input before any engine is acquired.
pub(crate) fn preflight(job: &RenderJob) -> Result<PathBuf> {
    let input = job.input_path();
    info!("rendering {} at {}", input.display(), job.viewport());
    if !input.is_file() {
        return Err(Error::LoadError(format!("{}: no such file", input.display())));
    }
    Ok(input)
}

pub(crate) fn engine_config(job: &RenderJob) -> EngineConfig {
    EngineConfig {
        viewport: job.viewport(),
        timeout_ms: DEFAULT_TIMEOUT_MS,
    }
}

/// Check the captured image and move it into place.
pub(crate) fn finish(job: &RenderJob, png: &[u8]) -> Result<()> {
    check_dimensions(png, job.viewport())?;
    let output = job.output_path();
    write_atomic(&output, png)?;
    info!("wrote {} ({} bytes)", output.display(), png.len());
    Ok(())
}

/// Pixel dimensions of PNG-encoded bytes
pub fn png_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Error::EncodeError(format!("cannot inspect captured image: {}", e)))?;
    if reader.format() != Some(ImageFormat::Png) {
        return Err(Error::EncodeError("captured data is not a PNG image".into()));
    }
    reader
        .into_dimensions()
        .map_err(|e| Error::EncodeError(format!("cannot read PNG header: {}", e)))
}

fn check_dimensions(png: &[u8], viewport: Viewport) -> Result<()> {
    let (width, height) = png_dimensions(png)?;
    if (width, height) != (viewport.width, viewport.height) {
        return Err(Error::EncodeError(format!(
            "captured image is {}x{}, expected {}",
            width, height, viewport
        )));
    }
    Ok(())
}

/// Write through `<path>.tmp` and rename, so readers never see a partial file.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    if let Err(e) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(Error::WriteError(format!("{}: {}", tmp.display(), e)));
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        Error::WriteError(format!("{}: {}", path.display(), e))
    })
}
