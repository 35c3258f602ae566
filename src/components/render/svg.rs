use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use crate::components::render::{Rgba8, write_atomically};
use crate::components::{CollageRenderer, Component};
use crate::foundation::error::{CollageError, CollageResult};
use crate::layout::canvas::CanvasPlan;
use crate::params::custom::{CustomArea, CustomScope};
use crate::registry::{ComponentKey, Role};

const OPT_BACKGROUND: &str = "svg-background";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SvgSettings {
    background: Option<Rgba8>,
}

/// Writes an SVG document that references each source image by path.
#[derive(Clone, Copy, Debug, Default)]
pub struct SvgRenderer;

impl Component for SvgRenderer {
    fn key(&self) -> ComponentKey {
        ComponentKey::new(Role::Renderer, "SVG")
    }

    fn register_custom_parameters(&self, scope: &mut CustomScope<'_>) -> CollageResult<()> {
        scope.declare(
            OPT_BACKGROUND,
            "none",
            "canvas colour (#RRGGBB[AA]) or 'none' for transparent",
        )
    }

    fn parse_custom_parameters(&self, scope: &mut CustomScope<'_>) -> CollageResult<()> {
        let raw = scope.value(OPT_BACKGROUND)?.trim();
        let background = if raw.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(scope.parse_value::<Rgba8>(OPT_BACKGROUND)?)
        };
        scope.store(SvgSettings { background });
        Ok(())
    }
}

impl CollageRenderer for SvgRenderer {
    #[tracing::instrument(skip_all, fields(out = %output.display()))]
    fn render(&self, plan: &CanvasPlan, output: &Path, area: &CustomArea) -> CollageResult<()> {
        let settings = area.require_settings::<SvgSettings>(&self.key())?;
        let doc = svg_document(plan, settings.background)
            .map_err(|e| CollageError::encode(format!("format svg: {e}")))?;
        write_atomically(output, |w| {
            w.write_all(doc.as_bytes())
                .map_err(|e| CollageError::io(format!("write '{}': {e}", output.display())))
        })
    }
}

fn svg_document(plan: &CanvasPlan, background: Option<Rgba8>) -> Result<String, std::fmt::Error> {
    let size = plan.canvas();
    let mut out = String::new();
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = size.width,
        h = size.height
    )?;
    if let Some(bg) = background {
        writeln!(
            out,
            r#"  <rect width="100%" height="100%" fill="{}"/>"#,
            bg.css()
        )?;
    }
    for rec in plan.images() {
        let href = xml_escape(&rec.source.to_string_lossy());
        writeln!(
            out,
            r#"  <image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="none" xlink:href="{href}"/>"#,
            rec.position.x, rec.position.y, rec.placed_size.width, rec.placed_size.height
        )?;
    }
    writeln!(out, "</svg>")?;
    Ok(out)
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../../tests/unit/components/render/svg.rs"]
mod tests;
