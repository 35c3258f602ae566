//! Collage assembly from pluggable strategies.
//!
//! A run selects one strategy per role (progress monitor, input image reader, dimension
//! initializer, position calculator, collage renderer) from a [`ComponentRegistry`], negotiates
//! their custom parameters through a [`ParameterSet`], and drives them with a [`Pipeline`]:
//!
//! - read native image sizes
//! - choose placed sizes and tentative positions
//! - resolve the canvas against the declared [`CanvasConstraints`]
//! - render the resulting [`CanvasPlan`] once
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Strategy traits and the built-in strategies.
pub mod components;
/// Canvas resolution.
pub mod layout;
/// Parameter set and custom-parameter negotiation.
pub mod params;
/// Stage state machine driving one run.
pub mod pipeline;
/// Strategy catalogue keyed by role and variant.
pub mod registry;

pub use crate::foundation::error::{CollageError, CollageResult};
pub use crate::foundation::geometry::{Dimensions, Geometry, GeometryValue, Position};

pub use crate::components::{
    CollageRenderer, Component, DimensionInitializer, InputImageReader, PositionCalculator,
    ProgressMonitor,
};
pub use crate::layout::canvas::{CanvasPlan, resolve_canvas};
pub use crate::params::custom::{CustomArea, CustomParams, CustomScope, OptionSpec};
pub use crate::params::{
    CanvasConstraints, ImageRecord, ParameterSet, SelectedComponents, Selection,
};
pub use crate::pipeline::{Outcome, Pipeline, Stage};
pub use crate::registry::{ComponentKey, ComponentRegistry, RegistryBuilder, Role, Strategy};
