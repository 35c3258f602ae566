//! Strategy contracts and the built-in implementations.
//!
//! Every strategy implements [`Component`] for negotiation plus exactly one role trait. The
//! pipeline only talks to these traits; swapping a strategy never touches the orchestrator.

/// Progress monitors.
pub mod monitor;
/// Position calculators.
pub mod position;
/// Input image readers.
pub mod reader;
pub mod render;
/// Dimension initializers.
pub mod sizing;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::error::CollageResult;
use crate::foundation::geometry::Dimensions;
use crate::layout::canvas::CanvasPlan;
use crate::params::custom::{CustomArea, CustomScope};
use crate::params::{CanvasConstraints, ImageRecord};
use crate::pipeline::Stage;
use crate::registry::{ComponentKey, RegistryBuilder, Strategy};

/// Negotiation capability shared by every strategy.
pub trait Component: Send + Sync {
    /// Stable registry key of this strategy.
    fn key(&self) -> ComponentKey;

    /// Declare custom options. Called for every registered component.
    fn register_custom_parameters(&self, _scope: &mut CustomScope<'_>) -> CollageResult<()> {
        Ok(())
    }

    /// Parse the values of previously declared options. Called only when selected.
    fn parse_custom_parameters(&self, _scope: &mut CustomScope<'_>) -> CollageResult<()> {
        Ok(())
    }
}

/// Reads the native size of input images.
pub trait InputImageReader: Component {
    /// Native size of one image.
    fn read(&self, path: &Path, area: &CustomArea) -> CollageResult<Dimensions>;

    /// Read every input, preserving input order.
    fn read_all(&self, paths: &[PathBuf], area: &CustomArea) -> CollageResult<Vec<ImageRecord>> {
        paths
            .iter()
            .map(|p| Ok(ImageRecord::new(p.clone(), self.read(p, area)?)))
            .collect()
    }
}

/// Chooses the placed size of every image.
pub trait DimensionInitializer: Component {
    /// Set `placed_size` on each record.
    fn initialize(
        &self,
        records: &mut [ImageRecord],
        constraints: &CanvasConstraints,
        area: &CustomArea,
    ) -> CollageResult<()>;
}

/// Chooses a tentative position for every image.
pub trait PositionCalculator: Component {
    /// Set `position` on each record. Coordinates may be negative or off-origin.
    fn position(
        &self,
        records: &mut [ImageRecord],
        constraints: &CanvasConstraints,
        area: &CustomArea,
    ) -> CollageResult<()>;
}

/// Produces the final artifact from a resolved plan.
pub trait CollageRenderer: Component {
    /// Write the collage to `output`.
    fn render(&self, plan: &CanvasPlan, output: &Path, area: &CustomArea) -> CollageResult<()>;
}

/// Observes stage transitions without influencing them.
pub trait ProgressMonitor: Component {
    /// Called when the pipeline enters `stage`.
    fn report(&self, stage: Stage, area: &CustomArea) -> CollageResult<()>;
}

/// Add every built-in strategy to `builder`.
pub fn register_builtins(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .with(Strategy::Monitor(Arc::new(monitor::LogMonitor::default())))
        .with(Strategy::Reader(Arc::new(reader::RasterReader)))
        .with(Strategy::Initializer(Arc::new(sizing::UniformInitializer)))
        .with(Strategy::Initializer(Arc::new(sizing::NativeInitializer)))
        .with(Strategy::Calculator(Arc::new(position::RandomCalculator)))
        .with(Strategy::Calculator(Arc::new(position::TileInOrderCalculator)))
        .with(Strategy::Renderer(Arc::new(render::raster::RasterRenderer)))
        .with(Strategy::Renderer(Arc::new(render::svg::SvgRenderer)))
        .with(Strategy::Renderer(Arc::new(render::script::ScriptRenderer)))
}
