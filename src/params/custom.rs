use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use crate::foundation::error::{CollageError, CollageResult};
use crate::params::CanvasConstraints;
use crate::registry::ComponentKey;

/// One custom option declared by a component during registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionSpec {
    /// Flat, globally unique option name.
    pub name: String,
    /// Textual default used when the boundary supplies no value.
    pub default: String,
    /// One-line description for `--list-options`.
    pub help: String,
}

/// Custom-parameter area owned by exactly one component.
#[derive(Default)]
pub struct CustomArea {
    options: BTreeMap<String, OptionSpec>,
    values: BTreeMap<String, String>,
    settings: Option<Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for CustomArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomArea")
            .field("options", &self.options)
            .field("values", &self.values)
            .field("has_settings", &self.settings.is_some())
            .finish()
    }
}

impl CustomArea {
    /// Options declared by the owner, in name order.
    pub fn options(&self) -> impl Iterator<Item = &OptionSpec> {
        self.options.values()
    }

    /// Bound value of `name`, falling back to its declared default.
    pub fn raw(&self, name: &str) -> Option<&str> {
        let spec = self.options.get(name)?;
        Some(
            self.values
                .get(name)
                .map(String::as_str)
                .unwrap_or(spec.default.as_str()),
        )
    }

    /// Typed settings stored by the owner during the parsing phase.
    pub fn settings<T: Any>(&self) -> Option<&T> {
        self.settings.as_deref()?.downcast_ref::<T>()
    }

    /// Like [`CustomArea::settings`], but a missing value is a validation error.
    pub fn require_settings<T: Any>(&self, owner: &ComponentKey) -> CollageResult<&T> {
        self.settings::<T>().ok_or_else(|| {
            CollageError::validation(format!("{owner} was used before parsing its parameters"))
        })
    }
}

/// All custom areas plus the flat option-name namespace they share.
#[derive(Debug, Default)]
pub struct CustomParams {
    owners: BTreeMap<String, ComponentKey>,
    areas: BTreeMap<ComponentKey, CustomArea>,
}

impl CustomParams {
    pub(crate) fn area(&self, key: &ComponentKey) -> Option<&CustomArea> {
        self.areas.get(key)
    }

    pub(crate) fn ensure_area(&mut self, key: &ComponentKey) {
        self.areas.entry(key.clone()).or_default();
    }

    /// Every declared option with its owner, in option-name order.
    pub fn options(&self) -> impl Iterator<Item = (&ComponentKey, &OptionSpec)> {
        self.owners.iter().filter_map(|(name, owner)| {
            let spec = self.areas.get(owner)?.options.get(name)?;
            Some((owner, spec))
        })
    }

    /// Bind a raw boundary value to a registered option.
    pub(crate) fn bind(&mut self, name: &str, value: &str) -> CollageResult<()> {
        let owner = self
            .owners
            .get(name)
            .ok_or_else(|| CollageError::parameter(format!("unknown option '{name}'")))?;
        let area = self
            .areas
            .get_mut(owner)
            .ok_or_else(|| CollageError::parameter(format!("option '{name}' has no owner area")))?;
        area.values.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

/// Negotiation handle scoped to one component's custom area.
///
/// Components never see another component's area; shared state is read-only here.
pub struct CustomScope<'a> {
    owner: ComponentKey,
    custom: &'a mut CustomParams,
    constraints: &'a CanvasConstraints,
    output: &'a Path,
}

impl<'a> CustomScope<'a> {
    pub(crate) fn new(
        owner: ComponentKey,
        custom: &'a mut CustomParams,
        constraints: &'a CanvasConstraints,
        output: &'a Path,
    ) -> Self {
        custom.ensure_area(&owner);
        Self {
            owner,
            custom,
            constraints,
            output,
        }
    }

    /// Key of the component owning this scope.
    pub fn owner(&self) -> &ComponentKey {
        &self.owner
    }

    /// Declared canvas constraints.
    pub fn constraints(&self) -> &CanvasConstraints {
        self.constraints
    }

    /// Requested output path.
    pub fn output(&self) -> &Path {
        self.output
    }

    /// Declare a custom option. Names are unique across all components.
    pub fn declare(
        &mut self,
        name: &str,
        default: impl Into<String>,
        help: impl Into<String>,
    ) -> CollageResult<()> {
        if name.is_empty() || name.contains(['=', ' ']) {
            return Err(CollageError::registration(format!(
                "{}: invalid option name '{name}'",
                self.owner
            )));
        }
        if let Some(existing) = self.custom.owners.get(name) {
            return Err(CollageError::registration(format!(
                "option '{name}' declared by {} is already owned by {existing}",
                self.owner
            )));
        }
        self.custom
            .owners
            .insert(name.to_string(), self.owner.clone());
        let spec = OptionSpec {
            name: name.to_string(),
            default: default.into(),
            help: help.into(),
        };
        self.area_mut().options.insert(name.to_string(), spec);
        Ok(())
    }

    /// Raw value of one of this component's own options.
    pub fn value(&self, name: &str) -> CollageResult<&str> {
        self.area().and_then(|a| a.raw(name)).ok_or_else(|| {
            CollageError::parameter(format!("{} never declared option '{name}'", self.owner))
        })
    }

    /// Parse one of this component's own options with `FromStr`.
    pub fn parse_value<T>(&self, name: &str) -> CollageResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.value(name)?;
        raw.trim()
            .parse()
            .map_err(|e| CollageError::parameter(format!("option '{name}'='{raw}': {e}")))
    }

    /// Store typed settings for use during the role operation.
    pub fn store<T: Any + Send + Sync>(&mut self, settings: T) {
        self.area_mut().settings = Some(Box::new(settings));
    }

    fn area(&self) -> Option<&CustomArea> {
        self.custom.areas.get(&self.owner)
    }

    fn area_mut(&mut self) -> &mut CustomArea {
        self.custom.areas.entry(self.owner.clone()).or_default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/params/custom.rs"]
mod tests;
