//! Drawing for annotated pages and the summary canvas.
//!
//! Overlay geometry and the summary layout are computed by
//! `deedscan_core`; this module only paints them.

use crate::prelude::*;
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use deedscan_core::overlay::{Overlay, PixelBox};
use deedscan_core::summary::SummaryLayout;
use deedscan_core::Rgb as FieldColor;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::Path;

/// Opacity of the highlight fill.
pub const HIGHLIGHT_ALPHA: f32 = 0.3;
/// Pixel height of the field label drawn above a highlight.
pub const LABEL_SCALE: f32 = 14.0;
/// Gap between the label baseline and the top of the highlight.
const LABEL_GAP: i32 = 5;

/// Fonts tried when no `--font` is given.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Load the label font: the explicit path if given, otherwise the first
/// readable candidate. Returns `None` when nothing loads; text is then
/// skipped but boxes are still drawn.
pub fn load_font(explicit: Option<&Path>) -> Option<FontVec> {
    if let Some(path) = explicit {
        match read_font(path) {
            Ok(font) => return Some(font),
            Err(e) => warn!("Could not load font {}: {}", path.display(), e),
        }
    }

    let font = FONT_CANDIDATES
        .iter()
        .map(Path::new)
        .find_map(|path| read_font(path).ok());

    if font.is_none() {
        warn!("No usable TTF font found; labels will not be drawn");
    }
    font
}

fn read_font(path: &Path) -> Result<FontVec> {
    let bytes = std::fs::read(path)?;
    FontVec::try_from_vec(bytes).map_err(|e| eyre!("invalid font data: {}", e))
}

fn pixel(color: FieldColor) -> Rgb<u8> {
    Rgb([color.0, color.1, color.2])
}

/// `alpha * color + (1 - alpha) * base`, rounded.
fn blend_channel(color: u8, base: u8, alpha: f32) -> u8 {
    (alpha * color as f32 + (1.0 - alpha) * base as f32)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Clamp an inclusive pixel box to the image. `None` if nothing is visible.
fn clamp_box(bbox: &PixelBox, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }
    let max_x = width as i32 - 1;
    let max_y = height as i32 - 1;

    if bbox.x1 < bbox.x0 || bbox.y1 < bbox.y0 {
        return None;
    }
    if bbox.x0 > max_x || bbox.y0 > max_y || bbox.x1 < 0 || bbox.y1 < 0 {
        return None;
    }

    Some((
        bbox.x0.clamp(0, max_x) as u32,
        bbox.y0.clamp(0, max_y) as u32,
        bbox.x1.clamp(0, max_x) as u32,
        bbox.y1.clamp(0, max_y) as u32,
    ))
}

/// Blend `color` into every pixel of the inclusive box.
fn fill_translucent(image: &mut RgbImage, bbox: (u32, u32, u32, u32), color: FieldColor) {
    let (x0, y0, x1, y1) = bbox;
    let channels = [color.0, color.1, color.2];

    for y in y0..=y1 {
        for x in x0..=x1 {
            let px = image.get_pixel_mut(x, y);
            for (c, base) in px.0.iter_mut().enumerate() {
                *base = blend_channel(channels[c], *base, HIGHLIGHT_ALPHA);
            }
        }
    }
}

/// Draw every overlay in order: translucent fill, 1 px border, then the
/// field label just above the box.
pub fn annotate_page(image: &mut RgbImage, overlays: &[Overlay], font: Option<&FontVec>) {
    let (width, height) = image.dimensions();

    for overlay in overlays {
        let Some(clamped) = clamp_box(&overlay.bbox, width, height) else {
            debug!("Skipping off-page box for '{}'", overlay.word);
            continue;
        };
        let (x0, y0, x1, y1) = clamped;

        fill_translucent(image, clamped, overlay.color);

        let rect = Rect::at(x0 as i32, y0 as i32).of_size(x1 - x0 + 1, y1 - y0 + 1);
        draw_hollow_rect_mut(image, rect, pixel(overlay.color));

        if let Some(font) = font {
            let scale = PxScale::from(LABEL_SCALE);
            let ascent = font.as_scaled(scale).ascent().ceil() as i32;
            let baseline = (overlay.bbox.y0 - LABEL_GAP).max(0);
            let top = (baseline - ascent).max(0);

            draw_text_mut(
                image,
                pixel(overlay.color),
                x0 as i32,
                top,
                scale,
                font,
                &overlay.label,
            );
        }
    }
}

/// Paint the summary layout onto a fresh white canvas.
pub fn render_summary(layout: &SummaryLayout, font: Option<&FontVec>) -> RgbImage {
    let mut image = RgbImage::from_pixel(layout.width, layout.height, Rgb([255, 255, 255]));

    for swatch in &layout.swatches {
        let rect = Rect::at(swatch.x, swatch.y).of_size(swatch.size, swatch.size);
        draw_filled_rect_mut(&mut image, rect, pixel(swatch.color));
    }

    if let Some(font) = font {
        let scale = PxScale::from(layout.font_size);
        for item in &layout.texts {
            draw_text_mut(
                &mut image,
                pixel(item.color),
                item.x,
                item.y,
                scale,
                font,
                &item.text,
            );
        }
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use deedscan_core::summary::layout_summary;
    use deedscan_core::DeedFields;

    fn overlay(x0: i32, y0: i32, x1: i32, y1: i32, color: FieldColor) -> Overlay {
        Overlay {
            bbox: PixelBox { x0, y0, x1, y1 },
            field: "owner_name".to_string(),
            label: "Owner Name".to_string(),
            color,
            word: "Jane".to_string(),
        }
    }

    #[test]
    fn test_blend_channel() {
        assert_eq!(blend_channel(200, 100, 0.3), 130);
        assert_eq!(blend_channel(255, 255, 0.3), 255);
        assert_eq!(blend_channel(0, 0, 0.3), 0);
    }

    #[test]
    fn test_clamp_box() {
        let inside = PixelBox { x0: 1, y0: 2, x1: 3, y1: 4 };
        assert_eq!(clamp_box(&inside, 10, 10), Some((1, 2, 3, 4)));

        let spill = PixelBox { x0: -5, y0: 8, x1: 20, y1: 12 };
        assert_eq!(clamp_box(&spill, 10, 10), Some((0, 8, 9, 9)));

        let outside = PixelBox { x0: 11, y0: 0, x1: 15, y1: 3 };
        assert_eq!(clamp_box(&outside, 10, 10), None);

        let inverted = PixelBox { x0: 5, y0: 5, x1: 4, y1: 6 };
        assert_eq!(clamp_box(&inverted, 10, 10), None);
    }

    #[test]
    fn test_annotate_fills_and_borders() {
        let mut image = RgbImage::from_pixel(20, 20, Rgb([100, 100, 100]));
        annotate_page(&mut image, &[overlay(5, 5, 10, 10, FieldColor(200, 0, 100))], None);

        // Border pixels are the opaque field color.
        assert_eq!(image.get_pixel(5, 5), &Rgb([200, 0, 100]));
        assert_eq!(image.get_pixel(10, 10), &Rgb([200, 0, 100]));
        // Interior is blended at 30%.
        assert_eq!(image.get_pixel(7, 7), &Rgb([130, 70, 100]));
        // Outside is untouched.
        assert_eq!(image.get_pixel(2, 2), &Rgb([100, 100, 100]));
        assert_eq!(image.get_pixel(11, 11), &Rgb([100, 100, 100]));
    }

    #[test]
    fn test_overlapping_overlays_stack_in_order() {
        let mut image = RgbImage::from_pixel(20, 20, Rgb([0, 0, 0]));
        annotate_page(
            &mut image,
            &[
                overlay(2, 2, 12, 12, FieldColor(100, 0, 0)),
                overlay(2, 2, 12, 12, FieldColor(0, 100, 0)),
            ],
            None,
        );

        // First pass: 30 red. Second pass: 0.7 * 30 = 21 red, 30 green.
        assert_eq!(image.get_pixel(6, 6), &Rgb([21, 30, 0]));
    }

    #[test]
    fn test_off_page_overlay_is_skipped() {
        let mut image = RgbImage::from_pixel(10, 10, Rgb([1, 2, 3]));
        annotate_page(&mut image, &[overlay(50, 50, 60, 60, FieldColor(255, 0, 0))], None);
        assert!(image.pixels().all(|p| *p == Rgb([1, 2, 3])));
    }

    #[test]
    fn test_summary_canvas() {
        let layout = layout_summary(&DeedFields::default());
        let image = render_summary(&layout, None);

        assert_eq!(image.dimensions(), (1200, 1000));
        assert_eq!(image.get_pixel(5, 5), &Rgb([255, 255, 255]));
        // First legend swatch (owner_name, green) at (20, 60).
        assert_eq!(image.get_pixel(25, 65), &Rgb([0, 255, 0]));
    }
}
