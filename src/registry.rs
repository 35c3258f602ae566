use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::components::{
    CollageRenderer, Component, DimensionInitializer, InputImageReader, PositionCalculator,
    ProgressMonitor,
};
use crate::foundation::error::{CollageError, CollageResult};

/// Pipeline role a strategy fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Side-channel progress observer.
    Monitor,
    /// Reads input image sizes.
    Reader,
    /// Chooses placed sizes.
    Initializer,
    /// Chooses positions.
    Calculator,
    /// Writes the output artifact.
    Renderer,
}

impl Role {
    /// All roles in negotiation order.
    pub const ALL: [Role; 5] = [
        Role::Monitor,
        Role::Reader,
        Role::Initializer,
        Role::Calculator,
        Role::Renderer,
    ];

    /// Key prefix, e.g. `"PositionCalculator"`.
    pub fn prefix(self) -> &'static str {
        match self {
            Role::Monitor => "ProgressMonitor",
            Role::Reader => "InputImageReader",
            Role::Initializer => "DimensionInitializer",
            Role::Calculator => "PositionCalculator",
            Role::Renderer => "CollageRenderer",
        }
    }

    fn from_prefix(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.prefix() == s)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Stable registry key: role plus variant name, displayed as `Role_Variant`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentKey {
    role: Role,
    variant: String,
}

impl ComponentKey {
    /// Build a key.
    pub fn new(role: Role, variant: impl Into<String>) -> Self {
        Self {
            role,
            variant: variant.into(),
        }
    }

    /// Role half of the key.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Variant half of the key.
    pub fn variant(&self) -> &str {
        &self.variant
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.role.prefix(), self.variant)
    }
}

impl FromStr for ComponentKey {
    type Err = CollageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, variant) = s
            .split_once('_')
            .ok_or_else(|| CollageError::parse(format!("component key '{s}' lacks '_'")))?;
        let role = Role::from_prefix(prefix)
            .ok_or_else(|| CollageError::unknown_component(format!("no role named '{prefix}'")))?;
        if variant.is_empty() {
            return Err(CollageError::parse(format!(
                "component key '{s}' has an empty variant"
            )));
        }
        Ok(Self::new(role, variant))
    }
}

/// A registered strategy instance, tagged by role.
#[derive(Clone)]
pub enum Strategy {
    /// Progress monitor.
    Monitor(Arc<dyn ProgressMonitor>),
    /// Input image reader.
    Reader(Arc<dyn InputImageReader>),
    /// Dimension initializer.
    Initializer(Arc<dyn DimensionInitializer>),
    /// Position calculator.
    Calculator(Arc<dyn PositionCalculator>),
    /// Collage renderer.
    Renderer(Arc<dyn CollageRenderer>),
}

impl Strategy {
    /// Role of the wrapped instance.
    pub fn role(&self) -> Role {
        match self {
            Strategy::Monitor(_) => Role::Monitor,
            Strategy::Reader(_) => Role::Reader,
            Strategy::Initializer(_) => Role::Initializer,
            Strategy::Calculator(_) => Role::Calculator,
            Strategy::Renderer(_) => Role::Renderer,
        }
    }

    /// Negotiation-facing view of the wrapped instance.
    pub fn component(&self) -> &dyn Component {
        match self {
            Strategy::Monitor(c) => &**c,
            Strategy::Reader(c) => &**c,
            Strategy::Initializer(c) => &**c,
            Strategy::Calculator(c) => &**c,
            Strategy::Renderer(c) => &**c,
        }
    }
}

/// Immutable catalogue of strategy singletons keyed by [`ComponentKey`].
///
/// The registry only answers lookups; whether the selected strategies can work together is
/// decided during negotiation.
pub struct ComponentRegistry {
    entries: BTreeMap<ComponentKey, Strategy>,
}

impl ComponentRegistry {
    /// Start an empty builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry holding every built-in strategy.
    pub fn standard() -> CollageResult<Self> {
        crate::components::register_builtins(Self::builder()).build()
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up any strategy by key.
    pub fn get(&self, key: &ComponentKey) -> CollageResult<&Strategy> {
        self.entries.get(key).ok_or_else(|| {
            CollageError::unknown_component(format!(
                "{key} (known {} variants: {})",
                key.role(),
                self.variants(key.role()).join(", ")
            ))
        })
    }

    /// All registered keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &ComponentKey> {
        self.entries.keys()
    }

    /// All registered components in key order.
    pub fn components(&self) -> impl Iterator<Item = &dyn Component> {
        self.entries.values().map(Strategy::component)
    }

    /// Variant names registered for `role`.
    pub fn variants(&self, role: Role) -> Vec<&str> {
        self.entries
            .keys()
            .filter(|k| k.role() == role)
            .map(ComponentKey::variant)
            .collect()
    }

    /// Look up a progress monitor variant.
    pub fn monitor(&self, variant: &str) -> CollageResult<Arc<dyn ProgressMonitor>> {
        match self.get(&ComponentKey::new(Role::Monitor, variant))? {
            Strategy::Monitor(c) => Ok(c.clone()),
            other => Err(role_mismatch(Role::Monitor, other)),
        }
    }

    /// Look up an input image reader variant.
    pub fn reader(&self, variant: &str) -> CollageResult<Arc<dyn InputImageReader>> {
        match self.get(&ComponentKey::new(Role::Reader, variant))? {
            Strategy::Reader(c) => Ok(c.clone()),
            other => Err(role_mismatch(Role::Reader, other)),
        }
    }

    /// Look up a dimension initializer variant.
    pub fn initializer(&self, variant: &str) -> CollageResult<Arc<dyn DimensionInitializer>> {
        match self.get(&ComponentKey::new(Role::Initializer, variant))? {
            Strategy::Initializer(c) => Ok(c.clone()),
            other => Err(role_mismatch(Role::Initializer, other)),
        }
    }

    /// Look up a position calculator variant.
    pub fn calculator(&self, variant: &str) -> CollageResult<Arc<dyn PositionCalculator>> {
        match self.get(&ComponentKey::new(Role::Calculator, variant))? {
            Strategy::Calculator(c) => Ok(c.clone()),
            other => Err(role_mismatch(Role::Calculator, other)),
        }
    }

    /// Look up a collage renderer variant.
    pub fn renderer(&self, variant: &str) -> CollageResult<Arc<dyn CollageRenderer>> {
        match self.get(&ComponentKey::new(Role::Renderer, variant))? {
            Strategy::Renderer(c) => Ok(c.clone()),
            other => Err(role_mismatch(Role::Renderer, other)),
        }
    }
}

fn role_mismatch(expected: Role, found: &Strategy) -> CollageError {
    CollageError::validation(format!(
        "registry entry {} is filed under {expected}",
        found.component().key()
    ))
}

/// Collects strategies before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: BTreeMap<ComponentKey, Strategy>,
    problems: Vec<String>,
}

impl RegistryBuilder {
    /// Add a strategy under the key it reports.
    pub fn with(mut self, strategy: Strategy) -> Self {
        let key = strategy.component().key();
        if key.role() != strategy.role() {
            self.problems.push(format!(
                "{key} was registered as a {}",
                strategy.role()
            ));
        } else if self.entries.contains_key(&key) {
            self.problems.push(format!("{key} is registered twice"));
        } else {
            self.entries.insert(key, strategy);
        }
        self
    }

    /// Freeze the registry, failing if any addition was rejected.
    pub fn build(self) -> CollageResult<ComponentRegistry> {
        if !self.problems.is_empty() {
            return Err(CollageError::registration(self.problems.join("; ")));
        }
        Ok(ComponentRegistry {
            entries: self.entries,
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/registry.rs"]
mod tests;
