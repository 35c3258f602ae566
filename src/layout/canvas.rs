use crate::foundation::error::{CollageError, CollageResult};
use crate::foundation::geometry::{Dimensions, Position};
use crate::foundation::math::mul_div_ceil;
use crate::params::{CanvasConstraints, ImageRecord};

/// Resolved output: the concrete canvas and every image at its final position.
///
/// Produced once per run by [`resolve_canvas`] and read-only afterwards.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CanvasPlan {
    canvas: Dimensions,
    images: Vec<ImageRecord>,
}

impl CanvasPlan {
    /// Canvas size in pixels.
    pub fn canvas(&self) -> Dimensions {
        self.canvas
    }

    /// Images in input order with canvas-relative positions.
    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }
}

/// Derive the canvas from the placed images and the declared constraints.
///
/// 1. Normalize the images' bounding box to the origin.
/// 2. Pad it on all four sides (percentages are of the box itself).
/// 3. Grow the short side to meet the aspect ratio.
/// 4. Grow to the minimum size, re-applying the ratio, and check the maximum.
/// 5. Offset every image by the padding plus half of any growth, centering the content.
///
/// Padding is applied before the ratio so it is never absorbed by ratio growth.
#[tracing::instrument(skip_all, fields(images = records.len()))]
pub fn resolve_canvas(
    records: &[ImageRecord],
    constraints: &CanvasConstraints,
) -> CollageResult<CanvasPlan> {
    if records.is_empty() {
        return Err(CollageError::layout("no images to place on the canvas"));
    }
    let ratio = constraints.aspect_ratio.ratio()?;
    let (min, max) = (constraints.min_size, constraints.max_size);
    check_bounds_order(min, max)?;

    let mut min_x = i64::MAX;
    let mut min_y = i64::MAX;
    let mut max_x = i64::MIN;
    let mut max_y = i64::MIN;
    for r in records {
        min_x = min_x.min(r.position.x);
        min_y = min_y.min(r.position.y);
        max_x = max_x.max(coord_add(r.position.x, i64::from(r.placed_size.width))?);
        max_y = max_y.max(coord_add(r.position.y, i64::from(r.placed_size.height))?);
    }
    let bbox = Dimensions::new(
        extent(max_x.checked_sub(min_x))?,
        extent(max_y.checked_sub(min_y))?,
    );

    let pad = constraints.padding.resolve(bbox);
    let padded = Dimensions::new(
        padded_extent(bbox.width, pad.width)?,
        padded_extent(bbox.height, pad.height)?,
    );
    check_fits(padded, max, "images plus padding")?;

    let mut canvas = padded;
    if let Some(r) = ratio {
        canvas = grow_to_ratio(canvas, r);
        check_fits(canvas, max, "aspect-ratio corrected canvas")?;
    }

    canvas = Dimensions::new(canvas.width.max(min.width), canvas.height.max(min.height));
    if let Some(r) = ratio {
        canvas = grow_to_ratio(canvas, r);
    }
    check_fits(canvas, max, "canvas grown to the minimum size")?;

    let dx = i64::from(pad.width) + i64::from((canvas.width - padded.width) / 2);
    let dy = i64::from(pad.height) + i64::from((canvas.height - padded.height) / 2);
    let images = records
        .iter()
        .map(|r| {
            let position = Position::new(
                r.position.x.checked_sub(min_x).ok_or_else(out_of_range)?,
                r.position.y.checked_sub(min_y).ok_or_else(out_of_range)?,
            )
            .checked_translate(dx, dy)
            .ok_or_else(out_of_range)?;
            Ok(ImageRecord {
                position,
                ..r.clone()
            })
        })
        .collect::<CollageResult<Vec<_>>>()?;

    tracing::debug!(
        bbox = %bbox,
        padded = %padded,
        canvas = %canvas,
        "resolved canvas"
    );
    Ok(CanvasPlan { canvas, images })
}

fn check_bounds_order(min: Dimensions, max: Dimensions) -> CollageResult<()> {
    let bad_w = max.width != 0 && min.width > max.width;
    let bad_h = max.height != 0 && min.height > max.height;
    if bad_w || bad_h {
        return Err(CollageError::unsatisfiable(format!(
            "minimum size {min} exceeds maximum size {max}"
        )));
    }
    Ok(())
}

fn check_fits(size: Dimensions, max: Dimensions, what: &str) -> CollageResult<()> {
    let over_w = max.width != 0 && size.width > max.width;
    let over_h = max.height != 0 && size.height > max.height;
    if over_w || over_h {
        return Err(CollageError::unsatisfiable(format!(
            "{what} needs {size} but the maximum is {max}"
        )));
    }
    Ok(())
}

/// Grow the short side so `width:height == rw:rh`, rounding up.
fn grow_to_ratio(size: Dimensions, (rw, rh): (u32, u32)) -> Dimensions {
    let wide = u64::from(size.width) * u64::from(rh);
    let tall = u64::from(size.height) * u64::from(rw);
    if wide > tall {
        Dimensions::new(size.width, mul_div_ceil(size.width, rh, rw))
    } else if tall > wide {
        Dimensions::new(mul_div_ceil(size.height, rw, rh), size.height)
    } else {
        size
    }
}

fn out_of_range() -> CollageError {
    CollageError::layout("layout extent out of range")
}

fn coord_add(a: i64, b: i64) -> CollageResult<i64> {
    a.checked_add(b).ok_or_else(out_of_range)
}

fn extent(v: Option<i64>) -> CollageResult<u32> {
    v.and_then(|v| u32::try_from(v).ok()).ok_or_else(out_of_range)
}

fn padded_extent(inner: u32, pad: u32) -> CollageResult<u32> {
    pad.checked_mul(2)
        .and_then(|p| p.checked_add(inner))
        .ok_or_else(|| CollageError::layout("padded canvas overflows"))
}

#[cfg(test)]
#[path = "../../tests/unit/layout/canvas.rs"]
mod tests;
