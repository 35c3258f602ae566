use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::components::render::{Rgba8, write_atomically};
use crate::components::{CollageRenderer, Component};
use crate::foundation::error::{CollageError, CollageResult};
use crate::layout::canvas::CanvasPlan;
use crate::params::custom::{CustomArea, CustomScope};
use crate::registry::{ComponentKey, Role};

const OPT_MAGICK: &str = "script-magick";
const OPT_TARGET: &str = "script-target";
const OPT_BACKGROUND: &str = "script-background";

#[derive(Clone, Debug, PartialEq, Eq)]
struct ScriptSettings {
    magick: String,
    target: PathBuf,
    background: Rgba8,
}

/// Writes a POSIX shell script that builds the collage with ImageMagick.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptRenderer;

impl Component for ScriptRenderer {
    fn key(&self) -> ComponentKey {
        ComponentKey::new(Role::Renderer, "ImageMagickScript")
    }

    fn register_custom_parameters(&self, scope: &mut CustomScope<'_>) -> CollageResult<()> {
        scope.declare(OPT_MAGICK, "magick", "ImageMagick executable used by the script")?;
        scope.declare(
            OPT_TARGET,
            "",
            "image the script writes (default: script path with a .png extension, \
             or <stem>.collage.png when the script itself ends in .png)",
        )?;
        scope.declare(
            OPT_BACKGROUND,
            Rgba8::BLACK.to_string(),
            "canvas colour (#RRGGBB or #RRGGBBAA)",
        )
    }

    fn parse_custom_parameters(&self, scope: &mut CustomScope<'_>) -> CollageResult<()> {
        let magick = scope.value(OPT_MAGICK)?.trim().to_string();
        if magick.is_empty() {
            return Err(CollageError::parameter(format!(
                "option '{OPT_MAGICK}' must name a program"
            )));
        }
        let target = match scope.value(OPT_TARGET)?.trim() {
            "" => default_target(scope.output()),
            t => PathBuf::from(t),
        };
        if target == scope.output() {
            return Err(CollageError::parameter(format!(
                "option '{OPT_TARGET}' would overwrite the script '{}'",
                target.display()
            )));
        }
        let background = scope.parse_value::<Rgba8>(OPT_BACKGROUND)?;
        scope.store(ScriptSettings {
            magick,
            target,
            background,
        });
        Ok(())
    }
}

impl CollageRenderer for ScriptRenderer {
    #[tracing::instrument(skip_all, fields(out = %output.display()))]
    fn render(&self, plan: &CanvasPlan, output: &Path, area: &CustomArea) -> CollageResult<()> {
        let settings = area.require_settings::<ScriptSettings>(&self.key())?;
        let script = magick_script(plan, settings);
        write_atomically(output, |w| {
            w.write_all(script.as_bytes())
                .map_err(|e| CollageError::io(format!("write '{}': {e}", output.display())))
        })?;
        mark_executable(output)
    }
}

fn magick_script(plan: &CanvasPlan, settings: &ScriptSettings) -> String {
    let size = plan.canvas();
    let mut lines = vec![
        "#!/bin/sh".to_string(),
        format!(
            "# collage {size}, {} image(s), generated by collage-creator",
            plan.images().len()
        ),
        "set -e".to_string(),
        format!(
            "{} -size {size} {} \\",
            shell_quote(&settings.magick),
            shell_quote(&format!("xc:{}", settings.background))
        ),
    ];
    for rec in plan.images() {
        lines.push(format!(
            "  \\( {} -resize {}! \\) -geometry {:+}{:+} -composite \\",
            shell_quote(&rec.source.to_string_lossy()),
            rec.placed_size,
            rec.position.x,
            rec.position.y
        ));
    }
    lines.push(format!(
        "  {}",
        shell_quote(&settings.target.to_string_lossy())
    ));
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// `out.png` next to `out.sh`; `out.collage.png` if the script path already ends in `.png`.
fn default_target(output: &Path) -> PathBuf {
    let target = output.with_extension("png");
    if target != output {
        return target;
    }
    let stem = output.file_stem().unwrap_or_default().to_string_lossy();
    output.with_file_name(format!("{stem}.collage.png"))
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> CollageResult<()> {
    use std::os::unix::fs::PermissionsExt as _;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| CollageError::io(format!("chmod '{}': {e}", path.display())))
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> CollageResult<()> {
    Ok(())
}

#[cfg(test)]
#[path = "../../../tests/unit/components/render/script.rs"]
mod tests;
