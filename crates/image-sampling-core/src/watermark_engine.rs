//! Watermark engine: stamps translucent text onto a raster and writes PNG

use crate::config::WatermarkStyle;
use crate::error::{ProcessingError, Result};
use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// DejaVu Sans Bold, used when no font file is configured
const EMBEDDED_FONT_DATA: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

/// Position calculator for watermark placement
#[derive(Debug)]
pub struct PositionCalculator;

impl PositionCalculator {
    /// Top-left anchor that puts the text's bottom-right corner `inset`
    /// pixels inside the image's bottom-right corner.
    ///
    /// The result is not clamped: text larger than the image yields a
    /// negative anchor and renders partly off-canvas.
    pub fn bottom_right(
        image_width: u32,
        image_height: u32,
        text_width: u32,
        text_height: u32,
        inset: u32,
    ) -> (i64, i64) {
        let x = image_width as i64 - (text_width as i64 + inset as i64);
        let y = image_height as i64 - (text_height as i64 + inset as i64);
        (x, y)
    }
}

/// Watermark processing engine
#[derive(Clone)]
pub struct WatermarkEngine {
    font: FontArc,
    style: WatermarkStyle,
}

impl std::fmt::Debug for WatermarkEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkEngine")
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

impl WatermarkEngine {
    /// Engine with the default style and embedded font
    pub fn new() -> Result<Self> {
        Self::with_style(WatermarkStyle::default())
    }

    /// Engine with a custom style; loads `style.font_path` when set
    pub fn with_style(style: WatermarkStyle) -> Result<Self> {
        if !(style.font_size > 0.0) {
            return Err(ProcessingError::InvalidInput {
                message: format!("font size must be positive, got {}", style.font_size),
            });
        }
        let font = load_font(style.font_path.as_deref())?;
        Ok(Self { font, style })
    }

    pub fn style(&self) -> &WatermarkStyle {
        &self.style
    }

    fn scale(&self) -> PxScale {
        PxScale::from(self.style.font_size)
    }

    /// Rendered (width, height) of the watermark text in pixels
    pub fn measure_text(&self) -> (u32, u32) {
        let scaled_font = self.font.as_scaled(self.scale());

        let mut width = 0.0f32;
        let mut prev_glyph: Option<GlyphId> = None;
        for c in self.style.text.chars() {
            let glyph_id = scaled_font.glyph_id(c);
            if let Some(prev) = prev_glyph {
                width += scaled_font.kern(prev, glyph_id);
            }
            width += scaled_font.h_advance(glyph_id);
            prev_glyph = Some(glyph_id);
        }

        (
            width.max(0.0).ceil() as u32,
            scaled_font.height().max(0.0).ceil() as u32,
        )
    }

    /// Composite the watermark text onto `image` in place
    pub fn apply(&self, image: &mut RgbaImage) {
        let (text_width, text_height) = self.measure_text();
        let (origin_x, origin_y) = PositionCalculator::bottom_right(
            image.width(),
            image.height(),
            text_width,
            text_height,
            self.style.inset,
        );
        debug!(
            text_width,
            text_height, origin_x, origin_y, "Placing watermark on {}x{} image",
            image.width(),
            image.height()
        );

        let scale = self.scale();
        let scaled_font = self.font.as_scaled(scale);
        let baseline_y = origin_y as f32 + scaled_font.ascent();
        let opacity = self.style.alpha as f32 / 255.0;
        let (width, height) = (image.width() as i64, image.height() as i64);

        // Glyph coverage is unioned into one mask and blended in a single
        // pass, so touching glyph edges never darken a pixel twice
        let margin = self.style.font_size.ceil() as i64;
        let mask_x = (origin_x - margin).clamp(0, width);
        let mask_y = (origin_y - margin).clamp(0, height);
        let mask_width = (width - mask_x) as usize;
        let mask_height = (height - mask_y) as usize;
        let mut coverage_mask = vec![0.0f32; mask_width * mask_height];

        let mut cursor_x = origin_x as f32;
        let mut prev_glyph: Option<GlyphId> = None;
        for c in self.style.text.chars() {
            let glyph_id = scaled_font.glyph_id(c);
            if let Some(prev) = prev_glyph {
                cursor_x += scaled_font.kern(prev, glyph_id);
            }

            let glyph = glyph_id.with_scale_and_position(scale, point(cursor_x, baseline_y));
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|px, py, coverage| {
                    let x = bounds.min.x as i64 + px as i64;
                    let y = bounds.min.y as i64 + py as i64;
                    if x < mask_x || y < mask_y || x >= width || y >= height {
                        return;
                    }
                    let index = (y - mask_y) as usize * mask_width + (x - mask_x) as usize;
                    let cell = &mut coverage_mask[index];
                    *cell = (*cell + coverage.clamp(0.0, 1.0)).min(1.0);
                });
            }

            cursor_x += scaled_font.h_advance(glyph_id);
            prev_glyph = Some(glyph_id);
        }

        for (index, coverage) in coverage_mask.iter().enumerate() {
            if *coverage <= 0.0 {
                continue;
            }
            let x = mask_x as u32 + (index % mask_width) as u32;
            let y = mask_y as u32 + (index / mask_width) as u32;
            let pixel = image.get_pixel_mut(x, y);
            *pixel = blend_pixel(*pixel, self.style.color, coverage * opacity);
        }
    }

    /// Decode `source`, stamp it, and write PNG bytes to
    /// `dest_dir/dest_name`. Returns the written path.
    ///
    /// The output is PNG whatever extension `dest_name` carries.
    #[instrument(skip(self), level = "debug")]
    pub fn watermark_file(&self, source: &Path, dest_dir: &Path, dest_name: &str) -> Result<PathBuf> {
        let decoded = image::io::Reader::open(source)?
            .with_guessed_format()?
            .decode()?;
        let mut raster = decoded.into_rgba8();

        self.apply(&mut raster);

        let destination = dest_dir.join(dest_name);
        raster
            .save_with_format(&destination, image::ImageFormat::Png)
            .map_err(|source| ProcessingError::Write {
                path: destination.clone(),
                source,
            })?;

        debug!("Wrote watermark artifact {}", destination.display());
        Ok(destination)
    }
}

/// Load a font file, or the embedded bold face when `path` is `None`
fn load_font(path: Option<&Path>) -> Result<FontArc> {
    match path {
        None => FontArc::try_from_slice(EMBEDDED_FONT_DATA).map_err(|e| ProcessingError::Font {
            message: format!("embedded font is unreadable: {}", e),
        }),
        Some(path) => {
            let data = std::fs::read(path).map_err(|e| ProcessingError::Font {
                message: format!("failed to read {}: {}", path.display(), e),
            })?;
            FontArc::try_from_vec(data).map_err(|e| ProcessingError::Font {
                message: format!("failed to parse {}: {}", path.display(), e),
            })
        }
    }
}

/// Source-over blend of a solid color at `alpha` onto `base`
fn blend_pixel(base: Rgba<u8>, color: [u8; 3], alpha: f32) -> Rgba<u8> {
    if alpha <= 0.0 {
        return base;
    }

    let base_alpha = base[3] as f32 / 255.0;
    let final_alpha = alpha + base_alpha * (1.0 - alpha);
    if final_alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |top: u8, bottom: u8| -> u8 {
        let value =
            (top as f32 * alpha + bottom as f32 * base_alpha * (1.0 - alpha)) / final_alpha;
        value.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(color[0], base[0]),
        channel(color[1], base[1]),
        channel(color[2], base[2]),
        (final_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod tests;
