//! PDF page rasterization
//!
//! Produces the PNG bitmap handed to the optical recognition engine.

use std::io::Cursor;

use image::DynamicImage;
use mupdf::{Colorspace, Matrix};

use crate::document::{DocumentError, DocumentResult, PageBitmap};
use crate::mupdf::SafeDocument;

/// Scale limits accepted by the rasterizer
const MIN_SCALE: f32 = 0.1;
const MAX_SCALE: f32 = 4.0;

/// Render one page to PNG. Blocking; call from `spawn_blocking`.
pub(super) fn render_png(
    doc: &SafeDocument,
    page_index: usize,
    scale: f32,
) -> DocumentResult<PageBitmap> {
    let scale = scale.clamp(MIN_SCALE, MAX_SCALE);

    doc.with_doc(|mupdf_doc| {
        let page = mupdf_doc.load_page(page_index as i32)?;

        let matrix = Matrix::new_scale(scale, scale);
        let colorspace = Colorspace::device_rgb();
        let pixmap = page
            .to_pixmap(&matrix, &colorspace, false, true)
            .map_err(|e| DocumentError::RenderError(e.to_string()))?;

        encode_pixmap(&pixmap)
    })
}

fn encode_pixmap(pixmap: &mupdf::Pixmap) -> DocumentResult<PageBitmap> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    let mut rgb_buffer = Vec::with_capacity((width * height * 3) as usize);

    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = (y * width as usize + x) * n;
            let r = samples.get(offset).copied().unwrap_or(255);
            let g = samples.get(offset + 1).copied().unwrap_or(255);
            let b = samples.get(offset + 2).copied().unwrap_or(255);
            rgb_buffer.extend_from_slice(&[r, g, b]);
        }
    }

    let img = image::RgbImage::from_raw(width, height, rgb_buffer)
        .ok_or_else(|| DocumentError::ImageError("Failed to create image buffer".to_string()))?;

    let mut data = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png)
        .map_err(|e| DocumentError::ImageError(e.to_string()))?;

    Ok(PageBitmap {
        data,
        width,
        height,
    })
}
