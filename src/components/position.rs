use crate::components::{Component, PositionCalculator};
use crate::foundation::error::{CollageError, CollageResult};
use crate::foundation::geometry::{Dimensions, Geometry, Position};
use crate::foundation::math::{Rng64, isqrt_ceil};
use crate::params::custom::{CustomArea, CustomScope};
use crate::params::{CanvasConstraints, ImageRecord};
use crate::registry::{ComponentKey, Role};

const OPT_SEED: &str = "random-seed";
const OPT_SPREAD: &str = "random-spread";
const OPT_COLUMNS: &str = "tile-columns";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RandomSettings {
    seed: u64,
    spread_pct: u32,
}

/// Scatters images uniformly over a square-ish region.
///
/// The region's area is `random-spread` percent of the summed image area, and never narrower or
/// shorter than the largest image. The same seed always yields the same layout.
///
/// Images may overlap, so there is no gap between them: the padding constraint only applies at
/// the canvas edges, where the resolver adds it.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomCalculator;

impl Component for RandomCalculator {
    fn key(&self) -> ComponentKey {
        ComponentKey::new(Role::Calculator, "Random")
    }

    fn register_custom_parameters(&self, scope: &mut CustomScope<'_>) -> CollageResult<()> {
        scope.declare(OPT_SEED, "1", "seed for random placement")?;
        scope.declare(
            OPT_SPREAD,
            "150",
            "scatter area as a percentage of the total image area (>= 100)",
        )
    }

    fn parse_custom_parameters(&self, scope: &mut CustomScope<'_>) -> CollageResult<()> {
        let seed = scope.parse_value::<u64>(OPT_SEED)?;
        let spread_pct = scope.parse_value::<u32>(OPT_SPREAD)?;
        if spread_pct < 100 {
            return Err(CollageError::parameter(format!(
                "option '{OPT_SPREAD}' must be at least 100, got {spread_pct}"
            )));
        }
        scope.store(RandomSettings { seed, spread_pct });
        Ok(())
    }
}

impl PositionCalculator for RandomCalculator {
    fn position(
        &self,
        records: &mut [ImageRecord],
        _constraints: &CanvasConstraints,
        area: &CustomArea,
    ) -> CollageResult<()> {
        let settings = area.require_settings::<RandomSettings>(&self.key())?;
        let total: u64 = records.iter().map(|r| r.placed_size.area()).sum();
        let region = total.saturating_mul(u64::from(settings.spread_pct)) / 100;
        let side = isqrt_ceil(region);
        let widest = records.iter().map(|r| r.placed_size.width).max().unwrap_or(0);
        let tallest = records.iter().map(|r| r.placed_size.height).max().unwrap_or(0);
        let region_w = side.max(u64::from(widest));
        let region_h = side.max(u64::from(tallest));

        let mut rng = Rng64::new(settings.seed);
        for r in records.iter_mut() {
            let x = rng.next_inclusive(region_w - u64::from(r.placed_size.width));
            let y = rng.next_inclusive(region_h - u64::from(r.placed_size.height));
            r.position = Position::new(to_coord(x)?, to_coord(y)?);
        }
        tracing::debug!(region_w, region_h, seed = settings.seed, "random placement");
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TileSettings {
    columns: usize,
}

/// Tiles images row by row in input order.
///
/// Each row is as tall as its tallest image. Images are separated by the padding constraint:
/// absolute padding directly, percentage padding relative to the largest image.
#[derive(Clone, Copy, Debug, Default)]
pub struct TileInOrderCalculator;

impl Component for TileInOrderCalculator {
    fn key(&self) -> ComponentKey {
        ComponentKey::new(Role::Calculator, "TileInOrder")
    }

    fn register_custom_parameters(&self, scope: &mut CustomScope<'_>) -> CollageResult<()> {
        scope.declare(
            OPT_COLUMNS,
            "0",
            "images per row (0 = square-ish grid)",
        )
    }

    fn parse_custom_parameters(&self, scope: &mut CustomScope<'_>) -> CollageResult<()> {
        let columns = scope.parse_value::<usize>(OPT_COLUMNS)?;
        scope.store(TileSettings { columns });
        Ok(())
    }
}

impl PositionCalculator for TileInOrderCalculator {
    fn position(
        &self,
        records: &mut [ImageRecord],
        constraints: &CanvasConstraints,
        area: &CustomArea,
    ) -> CollageResult<()> {
        let settings = area.require_settings::<TileSettings>(&self.key())?;
        if records.is_empty() {
            return Ok(());
        }
        let columns = match settings.columns {
            0 => usize::try_from(isqrt_ceil(records.len() as u64)).unwrap_or(1),
            n => n,
        };
        let gap = gap_for(constraints.padding, records);

        let mut y = 0i64;
        for row in records.chunks_mut(columns) {
            let mut x = 0i64;
            let mut row_h = 0u32;
            for r in row.iter_mut() {
                r.position = Position::new(x, y);
                x += i64::from(r.placed_size.width) + i64::from(gap.width);
                row_h = row_h.max(r.placed_size.height);
            }
            y += i64::from(row_h) + i64::from(gap.height);
        }
        Ok(())
    }
}

fn gap_for(padding: Geometry, records: &[ImageRecord]) -> Dimensions {
    let largest = Dimensions::new(
        records.iter().map(|r| r.placed_size.width).max().unwrap_or(0),
        records.iter().map(|r| r.placed_size.height).max().unwrap_or(0),
    );
    padding.resolve(largest)
}

fn to_coord(v: u64) -> CollageResult<i64> {
    i64::try_from(v).map_err(|_| CollageError::layout("coordinate out of range"))
}

#[cfg(test)]
#[path = "../../tests/unit/components/position.rs"]
mod tests;
