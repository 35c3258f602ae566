//! Shared negotiation and execution context.
//!
//! A [`ParameterSet`] lives for one pipeline run. It carries the selected strategy per role, the
//! input list and the [`ImageRecord`]s derived from it, the declared canvas constraints, and the
//! per-component custom-parameter areas negotiated in [`negotiate`].

/// Per-component custom-parameter areas.
pub mod custom;
/// Two-phase registration and parsing.
pub mod negotiate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::components::{
    CollageRenderer, Component, DimensionInitializer, InputImageReader, PositionCalculator,
    ProgressMonitor,
};
use crate::foundation::error::{CollageError, CollageResult};
use crate::foundation::geometry::{Dimensions, Geometry, Position};
use crate::params::custom::{CustomArea, CustomParams, CustomScope};
use crate::registry::{ComponentKey, ComponentRegistry, Role};

/// One input image as it moves through reading, sizing and positioning.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ImageRecord {
    /// Where the image came from.
    pub source: PathBuf,
    /// Size reported by the reader.
    pub native_size: Dimensions,
    /// Size chosen by the dimension initializer.
    pub placed_size: Dimensions,
    /// Top-left corner chosen by the position calculator.
    pub position: Position,
}

impl ImageRecord {
    /// New record with `placed_size == native_size` at the origin.
    pub fn new(source: impl Into<PathBuf>, native_size: Dimensions) -> Self {
        Self {
            source: source.into(),
            native_size,
            placed_size: native_size,
            position: Position::default(),
        }
    }
}

/// Declared canvas constraints. Unspecified values leave the decision to the resolver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CanvasConstraints {
    /// Target `width:height` ratio of the canvas.
    pub aspect_ratio: Geometry,
    /// Padding around the images and between them (`WxH` per side, or a percentage).
    pub padding: Geometry,
    /// Lower canvas bound; `0` on an axis leaves it unconstrained.
    pub min_size: Dimensions,
    /// Upper canvas bound; `0` on an axis leaves it unconstrained.
    pub max_size: Dimensions,
}

/// Variant names chosen for each role, as they come from the command surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Progress monitor variant.
    pub monitor: String,
    /// Input image reader variant.
    pub reader: String,
    /// Dimension initializer variant.
    pub initializer: String,
    /// Position calculator variant.
    pub calculator: String,
    /// Collage renderer variant.
    pub renderer: String,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            monitor: "Log".to_string(),
            reader: "Raster".to_string(),
            initializer: "Uniform".to_string(),
            calculator: "Random".to_string(),
            renderer: "Raster".to_string(),
        }
    }
}

/// The five strategies selected for a run, validated to all be present.
#[derive(Clone)]
pub struct SelectedComponents {
    /// Side-channel observer.
    pub monitor: Arc<dyn ProgressMonitor>,
    /// Reads native sizes.
    pub reader: Arc<dyn InputImageReader>,
    /// Sets placed sizes.
    pub initializer: Arc<dyn DimensionInitializer>,
    /// Sets positions.
    pub calculator: Arc<dyn PositionCalculator>,
    /// Produces the output artifact.
    pub renderer: Arc<dyn CollageRenderer>,
}

impl SelectedComponents {
    /// Keys in the fixed parsing order.
    pub fn keys(&self) -> [ComponentKey; 5] {
        [
            self.monitor.key(),
            self.reader.key(),
            self.initializer.key(),
            self.calculator.key(),
            self.renderer.key(),
        ]
    }
}

/// Mutable view handed to the sizing and positioning stages.
pub(crate) struct StageView<'a> {
    pub(crate) images: &'a mut Vec<ImageRecord>,
    pub(crate) constraints: &'a CanvasConstraints,
    pub(crate) area: &'a CustomArea,
}

/// Shared configuration and negotiation context for one pipeline run.
#[derive(Default)]
pub struct ParameterSet {
    monitor: Option<Arc<dyn ProgressMonitor>>,
    reader: Option<Arc<dyn InputImageReader>>,
    initializer: Option<Arc<dyn DimensionInitializer>>,
    calculator: Option<Arc<dyn PositionCalculator>>,
    renderer: Option<Arc<dyn CollageRenderer>>,
    inputs: Vec<PathBuf>,
    images: Vec<ImageRecord>,
    constraints: CanvasConstraints,
    output: PathBuf,
    custom: CustomParams,
    registered: bool,
    pending: Vec<(String, String)>,
}

impl ParameterSet {
    /// Empty parameter set with no strategies selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every role of `selection` against `registry` and install the results.
    ///
    /// Fails with [`CollageError::UnknownComponent`] on the first missing variant; on failure
    /// no slot is changed.
    pub fn select(
        &mut self,
        registry: &ComponentRegistry,
        selection: &Selection,
    ) -> CollageResult<()> {
        let monitor = registry.monitor(&selection.monitor)?;
        let reader = registry.reader(&selection.reader)?;
        let initializer = registry.initializer(&selection.initializer)?;
        let calculator = registry.calculator(&selection.calculator)?;
        let renderer = registry.renderer(&selection.renderer)?;
        self.monitor = Some(monitor);
        self.reader = Some(reader);
        self.initializer = Some(initializer);
        self.calculator = Some(calculator);
        self.renderer = Some(renderer);
        Ok(())
    }

    /// Install the progress monitor.
    pub fn set_monitor(&mut self, c: Arc<dyn ProgressMonitor>) {
        self.monitor = Some(c);
    }

    /// Install the input image reader.
    pub fn set_reader(&mut self, c: Arc<dyn InputImageReader>) {
        self.reader = Some(c);
    }

    /// Install the dimension initializer.
    pub fn set_initializer(&mut self, c: Arc<dyn DimensionInitializer>) {
        self.initializer = Some(c);
    }

    /// Install the position calculator.
    pub fn set_calculator(&mut self, c: Arc<dyn PositionCalculator>) {
        self.calculator = Some(c);
    }

    /// Install the collage renderer.
    pub fn set_renderer(&mut self, c: Arc<dyn CollageRenderer>) {
        self.renderer = Some(c);
    }

    /// Return all five selected strategies, or a validation error naming the empty role.
    pub fn selected(&self) -> CollageResult<SelectedComponents> {
        fn need<T: ?Sized>(slot: &Option<Arc<T>>, role: Role) -> CollageResult<Arc<T>> {
            slot.clone()
                .ok_or_else(|| CollageError::validation(format!("no {role} selected")))
        }
        Ok(SelectedComponents {
            monitor: need(&self.monitor, Role::Monitor)?,
            reader: need(&self.reader, Role::Reader)?,
            initializer: need(&self.initializer, Role::Initializer)?,
            calculator: need(&self.calculator, Role::Calculator)?,
            renderer: need(&self.renderer, Role::Renderer)?,
        })
    }

    /// Set the ordered list of input images.
    pub fn set_inputs<I, P>(&mut self, inputs: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
    }

    /// Input images in command order.
    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    /// Set the output path.
    pub fn set_output(&mut self, path: impl Into<PathBuf>) {
        self.output = path.into();
    }

    /// Output path.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Declared canvas constraints.
    pub fn constraints(&self) -> &CanvasConstraints {
        &self.constraints
    }

    /// Replace all canvas constraints at once.
    pub fn set_constraints(&mut self, constraints: CanvasConstraints) {
        self.constraints = constraints;
    }

    /// Set the aspect ratio constraint.
    pub fn set_aspect_ratio(&mut self, g: Geometry) {
        self.constraints.aspect_ratio = g;
    }

    /// Set the padding constraint.
    pub fn set_padding(&mut self, g: Geometry) {
        self.constraints.padding = g;
    }

    /// Set the minimum canvas size.
    pub fn set_min_size(&mut self, d: Dimensions) {
        self.constraints.min_size = d;
    }

    /// Set the maximum canvas size.
    pub fn set_max_size(&mut self, d: Dimensions) {
        self.constraints.max_size = d;
    }

    /// Queue a raw `name=value` custom parameter; it is bound after registration.
    pub fn set_custom_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pending.push((name.into(), value.into()));
    }

    /// Image records of the current run.
    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    /// Custom-parameter areas and the shared option namespace.
    pub fn custom(&self) -> &CustomParams {
        &self.custom
    }

    /// Custom area of `key`, if it took part in negotiation.
    pub fn custom_area(&self, key: &ComponentKey) -> Option<&CustomArea> {
        self.custom.area(key)
    }

    /// Whether the registration phase completed for this set.
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub(crate) fn scope(&mut self, owner: ComponentKey) -> CustomScope<'_> {
        CustomScope::new(owner, &mut self.custom, &self.constraints, &self.output)
    }

    pub(crate) fn commit_registration(&mut self, staged: CustomParams) {
        self.custom = staged;
        self.registered = true;
    }

    /// Apply queued custom values to registered options.
    pub(crate) fn bind_pending(&mut self) -> CollageResult<()> {
        for (name, value) in &self.pending {
            self.custom.bind(name, value)?;
        }
        Ok(())
    }

    pub(crate) fn area(&self, key: &ComponentKey) -> CollageResult<&CustomArea> {
        self.custom.area(key).ok_or_else(|| {
            CollageError::validation(format!("{key} did not take part in negotiation"))
        })
    }

    pub(crate) fn set_images(&mut self, images: Vec<ImageRecord>) {
        self.images = images;
    }

    pub(crate) fn stage_view(&mut self, key: &ComponentKey) -> CollageResult<StageView<'_>> {
        let Self {
            images,
            constraints,
            custom,
            ..
        } = self;
        let area = custom.area(key).ok_or_else(|| {
            CollageError::validation(format!("{key} did not take part in negotiation"))
        })?;
        Ok(StageView {
            images,
            constraints,
            area,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/params/mod.rs"]
mod tests;
