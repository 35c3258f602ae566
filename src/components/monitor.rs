use std::sync::atomic::{AtomicU64, Ordering};

use crate::components::{Component, ProgressMonitor};
use crate::foundation::error::CollageResult;
use crate::params::custom::{CustomArea, CustomScope};
use crate::pipeline::Stage;
use crate::registry::{ComponentKey, Role};

const OPT_QUIET: &str = "monitor-quiet";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LogMonitorSettings {
    quiet: bool,
}

/// Reports each stage through `tracing`.
///
/// Stages go out at `info` level, or `debug` when `monitor-quiet` is set.
#[derive(Debug, Default)]
pub struct LogMonitor {
    reports: AtomicU64,
}

impl LogMonitor {
    /// Number of reports received since construction.
    pub fn reports(&self) -> u64 {
        self.reports.load(Ordering::Relaxed)
    }
}

impl Component for LogMonitor {
    fn key(&self) -> ComponentKey {
        ComponentKey::new(Role::Monitor, "Log")
    }

    fn register_custom_parameters(&self, scope: &mut CustomScope<'_>) -> CollageResult<()> {
        scope.declare(OPT_QUIET, "false", "log stage transitions at debug level only")
    }

    fn parse_custom_parameters(&self, scope: &mut CustomScope<'_>) -> CollageResult<()> {
        let quiet = scope.parse_value::<bool>(OPT_QUIET)?;
        scope.store(LogMonitorSettings { quiet });
        Ok(())
    }
}

impl ProgressMonitor for LogMonitor {
    fn report(&self, stage: Stage, area: &CustomArea) -> CollageResult<()> {
        let settings = area.require_settings::<LogMonitorSettings>(&self.key())?;
        let n = self.reports.fetch_add(1, Ordering::Relaxed) + 1;
        if settings.quiet {
            tracing::debug!(stage = %stage, step = n, "collage progress");
        } else {
            tracing::info!(stage = %stage, step = n, "collage progress");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/components/monitor.rs"]
mod tests;
