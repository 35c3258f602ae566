use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::components::{Component, InputImageReader};
use crate::foundation::error::{CollageError, CollageResult};
use crate::foundation::geometry::Dimensions;
use crate::params::ImageRecord;
use crate::params::custom::{CustomArea, CustomScope};
use crate::registry::{ComponentKey, Role};

const OPT_THREADS: &str = "reader-threads";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RasterReaderSettings {
    threads: usize,
}

/// Reads raster image headers with the `image` crate.
///
/// Only the header is decoded; pixels are loaded later by the renderer.
#[derive(Clone, Copy, Debug, Default)]
pub struct RasterReader;

impl Component for RasterReader {
    fn key(&self) -> ComponentKey {
        ComponentKey::new(Role::Reader, "Raster")
    }

    fn register_custom_parameters(&self, scope: &mut CustomScope<'_>) -> CollageResult<()> {
        scope.declare(
            OPT_THREADS,
            "0",
            "worker threads for header probing (0 = one per core)",
        )
    }

    fn parse_custom_parameters(&self, scope: &mut CustomScope<'_>) -> CollageResult<()> {
        let threads = scope.parse_value::<usize>(OPT_THREADS)?;
        scope.store(RasterReaderSettings { threads });
        Ok(())
    }
}

impl InputImageReader for RasterReader {
    fn read(&self, path: &Path, _area: &CustomArea) -> CollageResult<Dimensions> {
        probe_dimensions(path)
    }

    fn read_all(&self, paths: &[PathBuf], area: &CustomArea) -> CollageResult<Vec<ImageRecord>> {
        let settings = area.require_settings::<RasterReaderSettings>(&self.key())?;
        let probe = || -> CollageResult<Vec<ImageRecord>> {
            paths
                .par_iter()
                .map(|p| Ok(ImageRecord::new(p.clone(), probe_dimensions(p)?)))
                .collect()
        };
        if settings.threads == 0 {
            return probe();
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.threads)
            .build()
            .map_err(|e| CollageError::io(format!("failed to build reader thread pool: {e}")))?;
        pool.install(probe)
    }
}

fn probe_dimensions(path: &Path) -> CollageResult<Dimensions> {
    let reader = image::ImageReader::open(path)
        .map_err(|e| CollageError::io(format!("open '{}': {e}", path.display())))?
        .with_guessed_format()
        .map_err(|e| CollageError::io(format!("sniff '{}': {e}", path.display())))?;
    let (width, height) = reader.into_dimensions().map_err(|e| match e {
        image::ImageError::IoError(io) => {
            CollageError::io(format!("read '{}': {io}", path.display()))
        }
        other => CollageError::decode(format!("'{}': {other}", path.display())),
    })?;
    tracing::trace!(path = %path.display(), width, height, "probed image header");
    Ok(Dimensions::new(width, height))
}

#[cfg(test)]
#[path = "../../tests/unit/components/reader.rs"]
mod tests;
