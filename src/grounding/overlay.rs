use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use rusttype::{Font, Scale};

use crate::error::{AgentError, Result};
use crate::grounding::ElementObservation;

const MARK_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const LABEL_TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BOX_STROKE: i32 = 2;
const LABEL_SCALE: f32 = 20.0;

/// Load the first usable label font from the candidate list.
pub fn load_label_font(paths: &[PathBuf]) -> Option<Font<'static>> {
    for path in paths {
        match std::fs::read(path) {
            Ok(data) => {
                if let Some(font) = Font::try_from_vec(data) {
                    log::debug!("Loaded overlay label font from {}", path.display());
                    return Some(font);
                }
                log::debug!("Not a usable font: {}", path.display());
            }
            Err(_) => continue,
        }
    }
    None
}

/// Burn numbered marks into a screenshot: a red box around every element
/// and, when a font is available, the element id on a red label above the
/// box. Without a font the boxes are drawn unlabeled.
pub fn render_overlay(
    screenshot: &[u8],
    elements: &[ElementObservation],
    font: Option<&Font<'static>>,
) -> Result<Vec<u8>> {
    let mut image = image::load_from_memory(screenshot)
        .map_err(|e| AgentError::Overlay(format!("screenshot decode failed: {}", e)))?
        .to_rgba8();

    for element in elements {
        draw_mark_box(&mut image, element);
        if let Some(font) = font {
            draw_mark_label(&mut image, font, element);
        }
    }

    let mut encoded = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut encoded), ImageOutputFormat::Png)
        .map_err(|e| AgentError::Overlay(format!("overlay encode failed: {}", e)))?;
    Ok(encoded)
}

fn draw_mark_box(image: &mut RgbaImage, element: &ElementObservation) {
    let x = element.x.round() as i32;
    let y = element.y.round() as i32;
    let width = element.width.round().max(1.0) as u32;
    let height = element.height.round().max(1.0) as u32;

    for inset in 0..BOX_STROKE {
        let w = width.saturating_sub(2 * inset as u32);
        let h = height.saturating_sub(2 * inset as u32);
        if w == 0 || h == 0 {
            break;
        }
        draw_hollow_rect_mut(image, Rect::at(x + inset, y + inset).of_size(w, h), MARK_COLOR);
    }
}

fn draw_mark_label(image: &mut RgbaImage, font: &Font<'static>, element: &ElementObservation) {
    let scale = Scale::uniform(LABEL_SCALE);
    let text = element.id.to_string();
    let label_width = text_width(font, scale, &text) + 8;
    let label_height = LABEL_SCALE as u32 + 4;

    // Label sits above the box, clamped to the canvas.
    let x = (element.x.round() as i32).max(0);
    let y = (element.y.round() as i32 - label_height as i32).max(0);

    draw_filled_rect_mut(
        image,
        Rect::at(x, y).of_size(label_width.max(1), label_height),
        MARK_COLOR,
    );
    draw_text_mut(image, LABEL_TEXT_COLOR, x + 4, y + 2, scale, font, &text);
}

fn text_width(font: &Font<'static>, scale: Scale, text: &str) -> u32 {
    font.layout(text, scale, rusttype::point(0.0, 0.0))
        .filter_map(|glyph| glyph.pixel_bounding_box().map(|b| b.max.x))
        .max()
        .unwrap_or(0)
        .max(0) as u32
}

/// Write the overlay PNG where a human can inspect it. Returns the path
/// written.
pub fn write_debug_artifact(dir: &Path, overlay: &[u8]) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join("som_debug.png");
    std::fs::write(&path, overlay)?;
    Ok(path)
}
