//! Local placeholder images for mock mode.
//!
//! The canvas is a solid square whose color is derived from the prompt, with
//! a contrasting horizontal band across the middle carrying the caption
//! `Mock Image: <prompt>`. No network access and no generation API involved.

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::codecs::png::PngEncoder;
use image::{DynamicImage, Rgb, RgbImage};

use crate::error::CoreError;
use crate::hashing::sha256;

/// Edge length of the mock canvas, matching the live generation size.
pub const CANVAS_SIZE: u32 = 1024;

/// Height of the contrasting band, in pixels.
const BAND_HEIGHT: u32 = 96;

/// Edge length of one glyph cell before scaling.
const GLYPH_SIZE: u32 = 8;

/// Largest glyph scale; short captions render at 32px.
const MAX_SCALE: u32 = 4;

/// Horizontal space kept clear on both sides of the caption.
const MARGIN: u32 = 32;

/// Background color for `prompt`: the first three bytes of its SHA-256.
pub fn canvas_color(prompt: &str) -> Rgb<u8> {
    let digest = sha256(prompt.as_bytes());
    Rgb([digest[0], digest[1], digest[2]])
}

/// Black or white, whichever reads better on `background`.
fn contrasting(background: Rgb<u8>) -> Rgb<u8> {
    let [r, g, b] = background.0;
    // Rec. 601 luma, integer form.
    let luma = (299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b)) / 1000;
    if luma > 140 {
        Rgb([0, 0, 0])
    } else {
        Rgb([255, 255, 255])
    }
}

/// Caption text for `prompt`, cut with `...` when wider than the canvas at
/// the smallest scale.
pub fn caption_for(prompt: &str) -> Vec<char> {
    let max_chars = ((CANVAS_SIZE - 2 * MARGIN) / GLYPH_SIZE) as usize;
    let mut chars: Vec<char> = format!("Mock Image: {prompt}").chars().collect();
    if chars.len() > max_chars {
        chars.truncate(max_chars - 3);
        chars.extend(['.', '.', '.']);
    }
    chars
}

/// Draw `caption` centred in the band starting at `band_top`.
fn draw_caption(img: &mut RgbImage, caption: &[char], band_top: u32, color: Rgb<u8>) {
    if caption.is_empty() {
        return;
    }
    let cells = caption.len() as u32;
    let scale = ((CANVAS_SIZE - 2 * MARGIN) / (cells * GLYPH_SIZE)).clamp(1, MAX_SCALE);
    let cell = GLYPH_SIZE * scale;
    let left = (CANVAS_SIZE - cells * cell) / 2;
    let top = band_top + (BAND_HEIGHT - cell) / 2;

    for (i, ch) in caption.iter().enumerate() {
        // Outside basic Latin there is no glyph; fall back to '?'.
        let Some(glyph) = BASIC_FONTS.get(*ch).or_else(|| BASIC_FONTS.get('?')) else {
            continue;
        };
        let origin_x = left + i as u32 * cell;
        for (row, bits) in glyph.iter().enumerate() {
            for bit in 0..GLYPH_SIZE {
                if *bits & (1u8 << bit) == 0 {
                    continue;
                }
                let x0 = origin_x + bit * scale;
                let y0 = top + row as u32 * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        img.put_pixel(x0 + dx, y0 + dy, color);
                    }
                }
            }
        }
    }
}

/// Render the mock canvas for `prompt` as PNG bytes.
pub fn render_canvas(prompt: &str) -> Result<Vec<u8>, CoreError> {
    let background = canvas_color(prompt);
    let band = contrasting(background);
    let band_top = (CANVAS_SIZE - BAND_HEIGHT) / 2;
    let band_bottom = band_top + BAND_HEIGHT;

    let mut img = RgbImage::from_fn(CANVAS_SIZE, CANVAS_SIZE, |_, y| {
        if (band_top..band_bottom).contains(&y) {
            band
        } else {
            background
        }
    });
    draw_caption(&mut img, &caption_for(prompt), band_top, background);

    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img).write_with_encoder(PngEncoder::new(&mut out))?;
    Ok(out)
}
