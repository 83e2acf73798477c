//! Tests for the watermark engine

use super::*;
use crate::config::WATERMARK_TEXT;
use std::fs;
use tempfile::tempdir;

fn solid_image(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, color)
}

fn write_png(path: &Path, width: u32, height: u32) {
    solid_image(width, height, Rgba([255, 255, 255, 255]))
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])
}

#[test]
fn test_position_is_inset_from_bottom_right() {
    assert_eq!(PositionCalculator::bottom_right(800, 600, 200, 50, 10), (590, 540));
    assert_eq!(PositionCalculator::bottom_right(210, 60, 200, 50, 10), (0, 0));
}

#[test]
fn test_position_is_not_clamped() {
    let (x, y) = PositionCalculator::bottom_right(300, 100, 1500, 70, 10);
    assert_eq!(x, 300 - 1510);
    assert_eq!(y, 20);

    let (x, y) = PositionCalculator::bottom_right(5, 5, 100, 100, 10);
    assert!(x < 0 && y < 0);
}

#[test]
fn test_measure_default_text() {
    let engine = WatermarkEngine::new().unwrap();
    let (width, height) = engine.measure_text();

    assert_eq!(engine.style().text, WATERMARK_TEXT);
    // 43 glyphs at 60px cannot fit in a few hundred pixels
    assert!(width > 600, "width {}", width);
    assert!(height >= 60 && height < 120, "height {}", height);
}

#[test]
fn test_font_size_affects_dimensions() {
    let small = WatermarkEngine::with_style(WatermarkStyle {
        font_size: 20.0,
        ..Default::default()
    })
    .unwrap();
    let large = WatermarkEngine::new().unwrap();

    let (w1, h1) = small.measure_text();
    let (w2, h2) = large.measure_text();
    assert!(w2 > w1);
    assert!(h2 > h1);
}

#[test]
fn test_empty_text_measures_zero_width() {
    let engine = WatermarkEngine::with_style(WatermarkStyle {
        text: String::new(),
        ..Default::default()
    })
    .unwrap();
    let (width, height) = engine.measure_text();
    assert_eq!(width, 0);
    assert!(height > 0);

    let mut image = solid_image(50, 50, Rgba([10, 20, 30, 255]));
    engine.apply(&mut image);
    assert!(image.pixels().all(|p| *p == Rgba([10, 20, 30, 255])));
}

#[test]
fn test_apply_marks_bottom_right_translucently() {
    let engine = WatermarkEngine::new().unwrap();
    let (_, text_height) = engine.measure_text();
    let white = Rgba([255, 255, 255, 255]);
    let mut image = solid_image(1200, 200, white);

    engine.apply(&mut image);

    // The band above the text is untouched
    let text_top = 200 - (text_height + 10);
    for y in 0..text_top {
        for x in 0..1200 {
            assert_eq!(*image.get_pixel(x, y), white);
        }
    }

    let changed: Vec<_> = image.pixels().filter(|p| **p != white).collect();
    assert!(!changed.is_empty(), "watermark should change some pixels");

    // Full coverage of DimGray at 110/255 over white is 190, and no pixel
    // is ever blended twice
    assert!(changed.iter().any(|p| p[0] == 190));
    for pixel in &changed {
        assert_eq!(pixel[3], 255);
        assert!(pixel[0] >= 190, "pixel darker than one brush pass: {:?}", pixel);
        assert_eq!(pixel[0], pixel[1]);
        assert_eq!(pixel[1], pixel[2]);
    }

    // The last glyph ends inside the inset corner
    let corner_hit = (1000..1190).any(|x| (text_top..190).any(|y| *image.get_pixel(x, y) != white));
    assert!(corner_hit);
    for y in 0..200 {
        for x in 1190..1200 {
            assert_eq!(*image.get_pixel(x, y), white, "inset column touched at {},{}", x, y);
        }
    }
}

#[test]
fn test_apply_on_image_smaller_than_text() {
    let engine = WatermarkEngine::new().unwrap();
    let mut image = solid_image(4, 4, Rgba([0, 0, 0, 255]));
    engine.apply(&mut image);
    assert_eq!(image.dimensions(), (4, 4));
}

#[test]
fn test_zero_alpha_leaves_image_unchanged() {
    let engine = WatermarkEngine::with_style(WatermarkStyle {
        alpha: 0,
        ..Default::default()
    })
    .unwrap();
    let original = solid_image(1500, 150, Rgba([200, 100, 50, 255]));
    let mut image = original.clone();
    engine.apply(&mut image);
    assert_eq!(image, original);
}

#[test]
fn test_blend_pixel_over_transparent_base() {
    let blended = blend_pixel(Rgba([0, 0, 0, 0]), [105, 105, 105], 110.0 / 255.0);
    assert_eq!(blended, Rgba([105, 105, 105, 110]));

    let untouched = blend_pixel(Rgba([1, 2, 3, 4]), [105, 105, 105], 0.0);
    assert_eq!(untouched, Rgba([1, 2, 3, 4]));
}

#[test]
fn test_watermark_file_writes_png_and_keeps_source() {
    let temp_dir = tempdir().unwrap();
    let source = temp_dir.path().join("a.png");
    write_png(&source, 300, 100);
    let original_bytes = fs::read(&source).unwrap();

    let engine = WatermarkEngine::new().unwrap();
    let written = engine
        .watermark_file(&source, temp_dir.path(), "watermark-a.png")
        .unwrap();

    assert_eq!(written, temp_dir.path().join("watermark-a.png"));
    let bytes = fs::read(&written).unwrap();
    assert!(is_png(&bytes));
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (300, 100));
    assert_eq!(fs::read(&source).unwrap(), original_bytes);
}

#[test]
fn test_jpeg_source_is_written_as_png_under_jpg_name() {
    let temp_dir = tempdir().unwrap();
    let source = temp_dir.path().join("c.jpg");
    image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(64, 48, image::Rgb([20, 120, 220])))
        .save_with_format(&source, image::ImageFormat::Jpeg)
        .unwrap();

    let engine = WatermarkEngine::new().unwrap();
    let written = engine
        .watermark_file(&source, temp_dir.path(), "watermark-c.jpg")
        .unwrap();

    let bytes = fs::read(written).unwrap();
    assert!(is_png(&bytes));
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);
}

#[test]
fn test_corrupt_source_is_an_error() {
    let temp_dir = tempdir().unwrap();
    let source = temp_dir.path().join("broken.png");
    fs::write(&source, b"\x89PNG\r\n\x1a\nnot really").unwrap();

    let engine = WatermarkEngine::new().unwrap();
    let result = engine.watermark_file(&source, temp_dir.path(), "watermark-broken.png");

    assert!(matches!(result, Err(ProcessingError::Image(_))));
    assert!(!temp_dir.path().join("watermark-broken.png").exists());
}

#[test]
fn test_missing_source_is_an_io_error() {
    let temp_dir = tempdir().unwrap();
    let engine = WatermarkEngine::new().unwrap();
    let result = engine.watermark_file(
        &temp_dir.path().join("gone.png"),
        temp_dir.path(),
        "watermark-gone.png",
    );
    assert!(matches!(result, Err(ProcessingError::Io(_))));
}

#[test]
fn test_unwritable_destination_is_a_write_error() {
    let temp_dir = tempdir().unwrap();
    let source = temp_dir.path().join("a.png");
    write_png(&source, 20, 20);

    let engine = WatermarkEngine::new().unwrap();
    let result = engine.watermark_file(&source, &temp_dir.path().join("no-such-dir"), "watermark-a.png");

    match result {
        Err(error) => assert_eq!(error.error_type(), "write_error"),
        Ok(path) => panic!("unexpected output at {}", path.display()),
    }
}

#[test]
fn test_font_override_errors() {
    let temp_dir = tempdir().unwrap();
    let missing = WatermarkEngine::with_style(WatermarkStyle {
        font_path: Some(temp_dir.path().join("missing.ttf")),
        ..Default::default()
    });
    assert!(matches!(missing, Err(ProcessingError::Font { .. })));

    let bogus_path = temp_dir.path().join("bogus.ttf");
    fs::write(&bogus_path, b"definitely not a font").unwrap();
    let bogus = WatermarkEngine::with_style(WatermarkStyle {
        font_path: Some(bogus_path),
        ..Default::default()
    });
    assert!(matches!(bogus, Err(ProcessingError::Font { .. })));
}

#[test]
fn test_font_override_from_file() {
    let temp_dir = tempdir().unwrap();
    let font_path = temp_dir.path().join("face.ttf");
    fs::write(&font_path, EMBEDDED_FONT_DATA).unwrap();

    let engine = WatermarkEngine::with_style(WatermarkStyle {
        font_path: Some(font_path),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(engine.measure_text(), WatermarkEngine::new().unwrap().measure_text());
}

#[test]
fn test_non_positive_font_size_rejected() {
    let result = WatermarkEngine::with_style(WatermarkStyle {
        font_size: 0.0,
        ..Default::default()
    });
    assert!(matches!(result, Err(ProcessingError::InvalidInput { .. })));
}

#[test]
fn test_touching_glyphs_blend_once() {
    // Kerned pairs pull neighbouring glyph edges into shared pixels
    let engine = WatermarkEngine::with_style(WatermarkStyle {
        text: "WWWWAVAVAVffff".to_string(),
        font_size: 80.0,
        inset: 0,
        ..Default::default()
    })
    .unwrap();
    let white = Rgba([255, 255, 255, 255]);
    let mut image = solid_image(900, 120, white);
    engine.apply(&mut image);

    let darkest = image.pixels().map(|p| p[0]).min().unwrap();
    assert_eq!(darkest, 190);
}
