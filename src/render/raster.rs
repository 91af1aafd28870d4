use std::{path::Path, sync::Arc};

use crate::foundation::error::{RacebarError, RacebarResult};

/// A rasterized frame, premultiplied RGBA8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub data: Vec<u8>,
}

const MAX_DIM: u32 = 16_384;

/// Parse and rasterize an SVG document at its intrinsic size. Text uses the system fonts.
pub fn rasterize_svg(svg: &str) -> RacebarResult<RasterFrame> {
    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();
    let opts = usvg::Options {
        fontdb: Arc::new(fontdb),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|e| RacebarError::render(format!("parse svg: {e}")))?;

    let size = tree.size();
    let to_px = |v: f32| -> RacebarResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(RacebarError::render("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    };
    let (width, height) = (to_px(size.width())?, to_px(size.height())?);
    if width > MAX_DIM || height > MAX_DIM {
        return Err(RacebarError::render(format!(
            "frame too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| RacebarError::render("failed to allocate frame pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );
    Ok(RasterFrame {
        width,
        height,
        data: pixmap.data().to_vec(),
    })
}

/// Write `frame` as a PNG, creating parent directories as needed.
pub fn write_png(path: &Path, frame: &RasterFrame) -> RacebarResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            RacebarError::render(format!("create output dir '{}': {e}", parent.display()))
        })?;
    }
    image::save_buffer_with_format(
        path,
        &unpremultiply(&frame.data),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| RacebarError::render(format!("write png '{}': {e}", path.display())))
}

fn unpremultiply(premul: &[u8]) -> Vec<u8> {
    let mut out = premul.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u32 * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}
