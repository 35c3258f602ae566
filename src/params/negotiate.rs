use crate::components::Component;
use crate::foundation::error::{CollageError, CollageResult};
use crate::params::custom::{CustomParams, CustomScope};
use crate::params::{ParameterSet, SelectedComponents};
use crate::registry::ComponentRegistry;

/// Registration phase: every known component declares its custom options.
///
/// Declarations are staged into a fresh namespace and committed only when every component
/// succeeds, so a failed run never exposes a partial registration.
#[tracing::instrument(skip_all, fields(components = registry.len()))]
pub fn register_all(registry: &ComponentRegistry, params: &mut ParameterSet) -> CollageResult<()> {
    let mut staged = CustomParams::default();
    for component in registry.components() {
        let key = component.key();
        let mut scope = CustomScope::new(
            key.clone(),
            &mut staged,
            params.constraints(),
            params.output(),
        );
        component
            .register_custom_parameters(&mut scope)
            .map_err(|e| match e {
                CollageError::Registration(_) => e,
                other => CollageError::registration(format!("{key}: {other}")),
            })?;
        tracing::debug!(component = %key, "registered custom parameters");
    }
    params.commit_registration(staged);
    Ok(())
}

/// Parsing phase: the selected components read back their values.
///
/// Runs in the fixed order monitor, reader, initializer, calculator, renderer and stops at the
/// first failure.
#[tracing::instrument(skip_all)]
pub fn parse_selected(
    params: &mut ParameterSet,
    selected: &SelectedComponents,
) -> CollageResult<()> {
    if !params.is_registered() {
        return Err(CollageError::validation(
            "custom parameters must be registered before they are parsed",
        ));
    }
    let steps: [&dyn Component; 5] = [
        &*selected.monitor,
        &*selected.reader,
        &*selected.initializer,
        &*selected.calculator,
        &*selected.renderer,
    ];
    for component in steps {
        let key = component.key();
        let mut scope = params.scope(key.clone());
        component
            .parse_custom_parameters(&mut scope)
            .map_err(|e| match e {
                CollageError::ParameterParse(_) => e,
                other => CollageError::parameter(format!("{key}: {other}")),
            })?;
        tracing::debug!(component = %key, "parsed custom parameters");
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/params/negotiate.rs"]
mod tests;
