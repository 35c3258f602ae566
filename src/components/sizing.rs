use crate::components::{Component, DimensionInitializer};
use crate::foundation::error::{CollageError, CollageResult};
use crate::foundation::geometry::{Dimensions, Geometry};
use crate::foundation::math::mul_div_round;
use crate::params::custom::{CustomArea, CustomScope};
use crate::params::{CanvasConstraints, ImageRecord};
use crate::registry::{ComponentKey, Role};

const OPT_SIZE: &str = "uniform-size";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct UniformSettings {
    size: Geometry,
}

/// Scales every image into the same bounding box, keeping its aspect ratio.
///
/// `uniform-size` forms:
/// - `WxH`: fit inside the box (up- or down-scaling)
/// - `0xH` / `Wx0`: fix one axis, derive the other
/// - `PxQ%`: scale the native size by a percentage (`Px%` scales both axes by `P`)
/// - `0x0`: keep native sizes
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformInitializer;

impl Component for UniformInitializer {
    fn key(&self) -> ComponentKey {
        ComponentKey::new(Role::Initializer, "Uniform")
    }

    fn register_custom_parameters(&self, scope: &mut CustomScope<'_>) -> CollageResult<()> {
        scope.declare(
            OPT_SIZE,
            "256x256",
            "box every image is scaled to fit (WxH, 0xH, Wx0 or PxQ%)",
        )
    }

    fn parse_custom_parameters(&self, scope: &mut CustomScope<'_>) -> CollageResult<()> {
        let size = scope.parse_value::<Geometry>(OPT_SIZE)?;
        if let Some(v) = size.value()
            && (v.x_offset != 0 || v.y_offset != 0)
        {
            return Err(CollageError::parameter(format!(
                "option '{OPT_SIZE}' does not accept offsets"
            )));
        }
        scope.store(UniformSettings { size });
        Ok(())
    }
}

impl DimensionInitializer for UniformInitializer {
    fn initialize(
        &self,
        records: &mut [ImageRecord],
        _constraints: &CanvasConstraints,
        area: &CustomArea,
    ) -> CollageResult<()> {
        let settings = area.require_settings::<UniformSettings>(&self.key())?;
        for r in records.iter_mut() {
            let n = r.native_size;
            if n.width == 0 || n.height == 0 {
                return Err(CollageError::layout(format!(
                    "'{}' has an empty native size {n}",
                    r.source.display()
                )));
            }
            r.placed_size = fit(n, settings.size);
        }
        Ok(())
    }
}

fn fit(native: Dimensions, size: Geometry) -> Dimensions {
    let out = match size {
        Geometry::Unspecified => native,
        Geometry::Percentage(v) => {
            let pw = if v.width == 0 { v.height } else { v.width };
            let ph = if v.height == 0 { v.width } else { v.height };
            Geometry::percentage(pw, ph).resolve(native)
        }
        Geometry::Absolute(v) => {
            let (nw, nh) = (native.width, native.height);
            let (bw, bh) = (v.width, v.height);
            let height_bound = bw == 0
                || (bh != 0 && u64::from(nw) * u64::from(bh) <= u64::from(nh) * u64::from(bw));
            if bw == 0 && bh == 0 {
                native
            } else if height_bound {
                Dimensions::new(mul_div_round(nw, bh, nh), bh)
            } else {
                Dimensions::new(bw, mul_div_round(nh, bw, nw))
            }
        }
    };
    Dimensions::new(out.width.max(1), out.height.max(1))
}

/// Places every image at its native size.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeInitializer;

impl Component for NativeInitializer {
    fn key(&self) -> ComponentKey {
        ComponentKey::new(Role::Initializer, "Native")
    }
}

impl DimensionInitializer for NativeInitializer {
    fn initialize(
        &self,
        records: &mut [ImageRecord],
        _constraints: &CanvasConstraints,
        _area: &CustomArea,
    ) -> CollageResult<()> {
        for r in records.iter_mut() {
            r.placed_size = r.native_size;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/components/sizing.rs"]
mod tests;
