use std::path::PathBuf;

use super::*;
use crate::foundation::geometry::{Dimensions, Geometry, Position};
use crate::layout::canvas::resolve_canvas;
use crate::params::custom::CustomParams;
use crate::params::{CanvasConstraints, ImageRecord};

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_raster").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn solid(path: &Path, w: u32, h: u32, px: [u8; 4]) {
    RgbaImage::from_pixel(w, h, Rgba(px)).save(path).unwrap();
}

fn negotiated(out: &Path, values: &[(&str, &str)]) -> CollageResult<CustomParams> {
    let constraints = CanvasConstraints::default();
    let mut custom = CustomParams::default();
    let r = RasterRenderer;
    r.register_custom_parameters(&mut CustomScope::new(r.key(), &mut custom, &constraints, out))?;
    for (name, value) in values {
        custom.bind(name, value)?;
    }
    r.parse_custom_parameters(&mut CustomScope::new(r.key(), &mut custom, &constraints, out))?;
    Ok(custom)
}

#[test]
fn formats_follow_extension() {
    assert_eq!(raster_format(Path::new("a.JPEG")), Some(ImageFormat::Jpeg));
    assert_eq!(raster_format(Path::new("a.png")), Some(ImageFormat::Png));
    assert_eq!(raster_format(Path::new("a.tif")), Some(ImageFormat::Tiff));
    assert_eq!(raster_format(Path::new("a.svg")), None);
    assert_eq!(raster_format(Path::new("a")), None);
}

#[test]
fn composites_scaled_images_over_background() {
    let dir = scratch("composite");
    let red = dir.join("red.png");
    let blue = dir.join("blue.png");
    solid(&red, 4, 4, [255, 0, 0, 255]);
    solid(&blue, 2, 2, [0, 0, 255, 255]);

    let mut a = ImageRecord::new(&red, Dimensions::new(4, 4));
    a.placed_size = Dimensions::new(8, 8);
    let mut b = ImageRecord::new(&blue, Dimensions::new(2, 2));
    b.position = Position::new(12, 0);
    let constraints = CanvasConstraints {
        padding: Geometry::absolute(1, 1),
        ..CanvasConstraints::default()
    };
    let plan = resolve_canvas(&[a, b], &constraints).unwrap();
    assert_eq!(plan.canvas(), Dimensions::new(16, 10));

    let out = dir.join("out.png");
    let custom = negotiated(&out, &[(OPT_BACKGROUND, "#00ff00")]).unwrap();
    RasterRenderer
        .render(&plan, &out, custom.area(&RasterRenderer.key()).unwrap())
        .unwrap();

    let img = image::open(&out).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (16, 10));
    assert_eq!(img.get_pixel(0, 0).0, [0, 255, 0, 255]);
    assert_eq!(img.get_pixel(1, 1).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(8, 8).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(13, 1).0, [0, 0, 255, 255]);
    assert_eq!(img.get_pixel(13, 5).0, [0, 255, 0, 255]);
}

#[test]
fn writes_jpeg_with_requested_quality() {
    let dir = scratch("jpeg");
    let src = dir.join("src.png");
    solid(&src, 6, 6, [200, 200, 200, 255]);
    let plan = resolve_canvas(
        &[ImageRecord::new(&src, Dimensions::new(6, 6))],
        &CanvasConstraints::default(),
    )
    .unwrap();
    let out = dir.join("out.jpg");
    let custom = negotiated(&out, &[(OPT_QUALITY, "75")]).unwrap();
    RasterRenderer
        .render(&plan, &out, custom.area(&RasterRenderer.key()).unwrap())
        .unwrap();
    let reader = image::ImageReader::open(&out)
        .unwrap()
        .with_guessed_format()
        .unwrap();
    assert_eq!(reader.format(), Some(ImageFormat::Jpeg));
    assert_eq!(reader.into_dimensions().unwrap(), (6, 6));
}

#[test]
fn options_are_validated_while_parsing() {
    let err = negotiated(Path::new("c.png"), &[(OPT_QUALITY, "0")]).unwrap_err();
    assert!(matches!(err, CollageError::ParameterParse(_)), "{err}");
    let err = negotiated(Path::new("c.png"), &[(OPT_BACKGROUND, "red")]).unwrap_err();
    assert!(matches!(err, CollageError::ParameterParse(_)), "{err}");
    let err = negotiated(Path::new("c.webp"), &[]).unwrap_err();
    assert!(err.to_string().contains("c.webp"), "{err}");
}

#[test]
fn missing_source_fails_without_output() {
    let dir = scratch("missing");
    let plan = resolve_canvas(
        &[ImageRecord::new(dir.join("gone.png"), Dimensions::new(3, 3))],
        &CanvasConstraints::default(),
    )
    .unwrap();
    let out = dir.join("out.png");
    let _ = std::fs::remove_file(&out);
    let custom = negotiated(&out, &[]).unwrap();
    let err = RasterRenderer
        .render(&plan, &out, custom.area(&RasterRenderer.key()).unwrap())
        .unwrap_err();
    assert!(matches!(err, CollageError::Io(_)), "{err}");
    assert!(!out.exists());
}
