//! Collage renderers and the output helpers they share.

/// Raster output (JPEG, PNG, TIFF) through the `image` crate.
pub mod raster;
/// ImageMagick shell-script output.
pub mod script;
/// SVG document output.
pub mod svg;

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context as _;

use crate::foundation::error::{CollageError, CollageResult};

/// Straight-alpha RGBA8 colour parsed from `#RRGGBB` or `#RRGGBBAA`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black.
    pub const BLACK: Rgba8 = Rgba8 {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    /// CSS `rgba(...)` form.
    pub fn css(self) -> String {
        format!(
            "rgba({},{},{},{:.3})",
            self.r,
            self.g,
            self.b,
            f64::from(self.a) / 255.0
        )
    }
}

impl FromStr for Rgba8 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> Result<u8, String> {
            u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
        }

        if !s.is_ascii() || !(s.len() == 6 || s.len() == 8) {
            return Err("hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned());
        }
        let a = if s.len() == 8 {
            hex_byte(&s[6..8])?
        } else {
            255
        };
        Ok(Self {
            r: hex_byte(&s[0..2])?,
            g: hex_byte(&s[2..4])?,
            b: hex_byte(&s[4..6])?,
            a,
        })
    }
}

impl fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// Lower-cased extension of `path`, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> CollageResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "collage".to_string());
    path.with_file_name(format!(".{name}.partial"))
}

/// Write `output` through a temporary sibling that is renamed into place on success.
///
/// On failure the temporary file is removed and `output` is left untouched.
pub(crate) fn write_atomically<F>(output: &Path, write: F) -> CollageResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> CollageResult<()>,
{
    ensure_parent_dir(output)?;
    let tmp = temp_sibling(output);
    let result = (|| -> CollageResult<()> {
        let file = File::create(&tmp)
            .map_err(|e| CollageError::io(format!("create '{}': {e}", tmp.display())))?;
        let mut w = BufWriter::new(file);
        write(&mut w)?;
        w.flush()
            .map_err(|e| CollageError::io(format!("flush '{}': {e}", tmp.display())))?;
        Ok(())
    })();
    match result {
        Ok(()) => std::fs::rename(&tmp, output).map_err(|e| {
            CollageError::io(format!(
                "move '{}' to '{}': {e}",
                tmp.display(),
                output.display()
            ))
        }),
        Err(e) => {
            let _ = std::fs::remove_file(&tmp);
            Err(e)
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/components/render/mod.rs"]
mod tests;
