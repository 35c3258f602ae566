use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops};

use crate::components::render::{Rgba8, extension_of, write_atomically};
use crate::components::{CollageRenderer, Component};
use crate::foundation::error::{CollageError, CollageResult};
use crate::layout::canvas::CanvasPlan;
use crate::params::custom::{CustomArea, CustomScope};
use crate::registry::{ComponentKey, Role};

const OPT_BACKGROUND: &str = "raster-background";
const OPT_QUALITY: &str = "raster-quality";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RasterSettings {
    background: Rgba8,
    quality: u8,
}

/// Composites the collage into a raster file (JPEG, PNG or TIFF by extension).
#[derive(Clone, Copy, Debug, Default)]
pub struct RasterRenderer;

/// Raster format for an output extension, if supported.
pub fn raster_format(path: &Path) -> Option<ImageFormat> {
    match extension_of(path)?.as_str() {
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        "tif" | "tiff" => Some(ImageFormat::Tiff),
        _ => None,
    }
}

impl Component for RasterRenderer {
    fn key(&self) -> ComponentKey {
        ComponentKey::new(Role::Renderer, "Raster")
    }

    fn register_custom_parameters(&self, scope: &mut CustomScope<'_>) -> CollageResult<()> {
        scope.declare(
            OPT_BACKGROUND,
            Rgba8::BLACK.to_string(),
            "canvas colour (#RRGGBB or #RRGGBBAA)",
        )?;
        scope.declare(OPT_QUALITY, "90", "JPEG quality, 1-100")
    }

    fn parse_custom_parameters(&self, scope: &mut CustomScope<'_>) -> CollageResult<()> {
        let background = scope.parse_value::<Rgba8>(OPT_BACKGROUND)?;
        let quality = scope.parse_value::<u8>(OPT_QUALITY)?;
        if !(1..=100).contains(&quality) {
            return Err(CollageError::parameter(format!(
                "option '{OPT_QUALITY}' must be within 1-100, got {quality}"
            )));
        }
        if raster_format(scope.output()).is_none() {
            return Err(CollageError::parameter(format!(
                "'{}' is not a jpg, png or tiff path",
                scope.output().display()
            )));
        }
        scope.store(RasterSettings {
            background,
            quality,
        });
        Ok(())
    }
}

impl CollageRenderer for RasterRenderer {
    #[tracing::instrument(skip_all, fields(out = %output.display()))]
    fn render(&self, plan: &CanvasPlan, output: &Path, area: &CustomArea) -> CollageResult<()> {
        let settings = area.require_settings::<RasterSettings>(&self.key())?;
        let format = raster_format(output).ok_or_else(|| {
            CollageError::encode(format!("no raster format for '{}'", output.display()))
        })?;
        let size = plan.canvas();
        if size.width == 0 || size.height == 0 {
            return Err(CollageError::encode(format!(
                "cannot encode an empty {size} canvas"
            )));
        }

        let bg = settings.background;
        let mut canvas =
            RgbaImage::from_pixel(size.width, size.height, Rgba([bg.r, bg.g, bg.b, bg.a]));
        for rec in plan.images() {
            let src = image::open(&rec.source).map_err(|e| match e {
                image::ImageError::IoError(io) => {
                    CollageError::io(format!("read '{}': {io}", rec.source.display()))
                }
                other => CollageError::decode(format!("'{}': {other}", rec.source.display())),
            })?;
            let mut tile = src.to_rgba8();
            let want = rec.placed_size;
            if tile.dimensions() != (want.width, want.height) {
                tile = imageops::resize(
                    &tile,
                    want.width,
                    want.height,
                    imageops::FilterType::Lanczos3,
                );
            }
            imageops::overlay(&mut canvas, &tile, rec.position.x, rec.position.y);
        }

        write_atomically(output, |w| {
            let encoded = match format {
                ImageFormat::Jpeg => {
                    let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
                    image::codecs::jpeg::JpegEncoder::new_with_quality(w, settings.quality)
                        .encode_image(&rgb)
                }
                other => DynamicImage::ImageRgba8(canvas).write_to(w, other),
            };
            encoded.map_err(|e| CollageError::encode(format!("{format:?}: {e}")))
        })?;
        tracing::debug!(width = size.width, height = size.height, "wrote raster collage");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/components/render/raster.rs"]
mod tests;
