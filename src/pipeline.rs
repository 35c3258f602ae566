use std::fmt;
use std::path::PathBuf;

use crate::components::{Component, ProgressMonitor};
use crate::foundation::error::{CollageError, CollageResult};
use crate::layout::canvas::{CanvasPlan, resolve_canvas};
use crate::params::custom::CustomArea;
use crate::params::{ParameterSet, negotiate};
use crate::registry::ComponentRegistry;

/// Pipeline states, in the only order they can be entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Every known component declares its custom options.
    Registering,
    /// Selected components parse their option values.
    Parsing,
    /// The reader probes every input.
    Reading,
    /// The dimension initializer sets placed sizes.
    Initializing,
    /// The position calculator sets positions.
    Positioning,
    /// The canvas resolver produces the [`CanvasPlan`].
    Resolving,
    /// The renderer writes the output.
    Rendering,
    /// The run finished successfully.
    Done,
}

impl Stage {
    /// Lower-case stage name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Registering => "registering",
            Stage::Parsing => "parsing",
            Stage::Reading => "reading",
            Stage::Initializing => "initializing",
            Stage::Positioning => "positioning",
            Stage::Resolving => "resolving",
            Stage::Rendering => "rendering",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Terminal result of a pipeline run.
#[derive(Debug)]
pub enum Outcome {
    /// The renderer wrote this path.
    Success(PathBuf),
    /// The run stopped in `stage`; nothing after it was entered.
    Failed {
        /// Stage whose step failed.
        stage: Stage,
        /// Cause of the failure.
        error: CollageError,
    },
}

impl Outcome {
    /// Return `true` for [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Convert into a plain result, dropping the failing stage.
    pub fn into_result(self) -> CollageResult<PathBuf> {
        match self {
            Outcome::Success(p) => Ok(p),
            Outcome::Failed { error, .. } => Err(error),
        }
    }
}

/// Drives one collage run over a frozen [`ComponentRegistry`].
///
/// Stages run strictly in sequence; the first failure ends the run in [`Outcome::Failed`]. The
/// renderer runs at most once, after the plan is resolved.
pub struct Pipeline<'r> {
    registry: &'r ComponentRegistry,
    history: Vec<Stage>,
    plan: Option<CanvasPlan>,
}

impl<'r> Pipeline<'r> {
    /// New pipeline over `registry`.
    pub fn new(registry: &'r ComponentRegistry) -> Self {
        Self {
            registry,
            history: Vec::new(),
            plan: None,
        }
    }

    /// Stages entered by the last run, in order.
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    /// Plan resolved by the last run, if it got that far.
    pub fn plan(&self) -> Option<&CanvasPlan> {
        self.plan.as_ref()
    }

    /// Execute every stage against `params`.
    #[tracing::instrument(skip_all, fields(inputs = params.inputs().len()))]
    pub fn run(&mut self, params: &mut ParameterSet) -> Outcome {
        self.history.clear();
        self.plan = None;
        match self.drive(params) {
            Ok(out) => Outcome::Success(out),
            Err((stage, error)) => {
                tracing::error!(stage = %stage, error = %error, "collage run failed");
                Outcome::Failed { stage, error }
            }
        }
    }

    fn drive(&mut self, params: &mut ParameterSet) -> Result<PathBuf, (Stage, CollageError)> {
        self.enter(Stage::Registering, None);
        negotiate::register_all(self.registry, params).map_err(at(Stage::Registering))?;

        self.enter(Stage::Parsing, None);
        let selected = params.selected().map_err(at(Stage::Parsing))?;
        params.bind_pending().map_err(at(Stage::Parsing))?;
        if params.inputs().is_empty() {
            return Err((
                Stage::Parsing,
                CollageError::validation("at least one input image is required"),
            ));
        }
        negotiate::parse_selected(params, &selected).map_err(at(Stage::Parsing))?;

        let monitor: &dyn ProgressMonitor = &*selected.monitor;
        let monitor_key = monitor.key();
        let [_, reader_key, init_key, calc_key, render_key] = selected.keys();

        self.enter(Stage::Reading, Some((monitor, params.area(&monitor_key).ok())));
        let records = {
            let area = params.area(&reader_key).map_err(at(Stage::Reading))?;
            selected
                .reader
                .read_all(params.inputs(), area)
                .map_err(at(Stage::Reading))?
        };
        if records.len() != params.inputs().len() {
            return Err((
                Stage::Reading,
                CollageError::validation(format!(
                    "reader returned {} records for {} inputs",
                    records.len(),
                    params.inputs().len()
                )),
            ));
        }
        params.set_images(records);

        self.enter(Stage::Initializing, Some((monitor, params.area(&monitor_key).ok())));
        {
            let view = params.stage_view(&init_key).map_err(at(Stage::Initializing))?;
            selected
                .initializer
                .initialize(view.images, view.constraints, view.area)
                .map_err(at(Stage::Initializing))?;
        }

        self.enter(Stage::Positioning, Some((monitor, params.area(&monitor_key).ok())));
        {
            let view = params.stage_view(&calc_key).map_err(at(Stage::Positioning))?;
            selected
                .calculator
                .position(view.images, view.constraints, view.area)
                .map_err(at(Stage::Positioning))?;
        }

        self.enter(Stage::Resolving, Some((monitor, params.area(&monitor_key).ok())));
        let plan =
            resolve_canvas(params.images(), params.constraints()).map_err(at(Stage::Resolving))?;
        self.plan = Some(plan);

        self.enter(Stage::Rendering, Some((monitor, params.area(&monitor_key).ok())));
        {
            let area = params.area(&render_key).map_err(at(Stage::Rendering))?;
            let plan = self.plan.as_ref().ok_or_else(|| {
                (
                    Stage::Rendering,
                    CollageError::validation("no canvas plan to render"),
                )
            })?;
            selected
                .renderer
                .render(plan, params.output(), area)
                .map_err(at(Stage::Rendering))?;
        }

        self.enter(Stage::Done, Some((monitor, params.area(&monitor_key).ok())));
        Ok(params.output().to_path_buf())
    }

    fn enter(&mut self, stage: Stage, monitor: Option<Observer<'_>>) {
        self.history.push(stage);
        notify(stage, monitor);
    }
}

type Observer<'a> = (&'a dyn ProgressMonitor, Option<&'a CustomArea>);

fn notify(stage: Stage, monitor: Option<Observer<'_>>) {
    tracing::debug!(stage = %stage, "entering stage");
    let Some((monitor, Some(area))) = monitor else {
        return;
    };
    if let Err(e) = monitor.report(stage, area) {
        tracing::warn!(stage = %stage, error = %e, "progress monitor failed; continuing");
    }
}

fn at(stage: Stage) -> impl Fn(CollageError) -> (Stage, CollageError) {
    move |e| (stage, e)
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
