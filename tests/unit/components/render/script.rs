use super::*;
use crate::foundation::geometry::{Dimensions, Position};
use crate::layout::canvas::resolve_canvas;
use crate::params::custom::CustomParams;
use crate::params::{CanvasConstraints, ImageRecord};

fn plan() -> CanvasPlan {
    let a = ImageRecord::new("in/it's.png", Dimensions::new(10, 10));
    let mut b = ImageRecord::new("in/b.png", Dimensions::new(5, 5));
    b.placed_size = Dimensions::new(4, 4);
    b.position = Position::new(10, 3);
    resolve_canvas(&[a, b], &CanvasConstraints::default()).unwrap()
}

fn negotiated(out: &Path, values: &[(&str, &str)]) -> CollageResult<CustomParams> {
    let constraints = CanvasConstraints::default();
    let mut custom = CustomParams::default();
    let r = ScriptRenderer;
    r.register_custom_parameters(&mut CustomScope::new(r.key(), &mut custom, &constraints, out))?;
    for (name, value) in values {
        custom.bind(name, value)?;
    }
    r.parse_custom_parameters(&mut CustomScope::new(r.key(), &mut custom, &constraints, out))?;
    Ok(custom)
}

#[test]
fn script_composites_every_image() {
    let out = Path::new("dir/collage.sh");
    let custom = negotiated(out, &[]).unwrap();
    let settings = custom
        .area(&ScriptRenderer.key())
        .unwrap()
        .settings::<ScriptSettings>()
        .unwrap();
    assert_eq!(settings.target, PathBuf::from("dir/collage.png"));

    let script = magick_script(&plan(), settings);
    let lines: Vec<&str> = script.lines().collect();
    assert_eq!(lines[0], "#!/bin/sh");
    assert_eq!(lines[2], "set -e");
    assert_eq!(lines[3], r"'magick' -size 14x10 'xc:#000000ff' \");
    assert_eq!(
        lines[4],
        r"  \( 'in/it'\''s.png' -resize 10x10! \) -geometry +0+0 -composite \"
    );
    assert_eq!(
        lines[5],
        r"  \( 'in/b.png' -resize 4x4! \) -geometry +10+3 -composite \"
    );
    assert_eq!(lines[6], "  'dir/collage.png'");
    assert_eq!(lines.len(), 7);
}

#[test]
fn options_override_program_target_and_background() {
    let custom = negotiated(
        Path::new("c.sh"),
        &[
            (OPT_MAGICK, "/usr/bin/convert"),
            (OPT_TARGET, "final.jpg"),
            (OPT_BACKGROUND, "#ffffff"),
        ],
    )
    .unwrap();
    let settings = custom
        .area(&ScriptRenderer.key())
        .unwrap()
        .settings::<ScriptSettings>()
        .unwrap();
    let script = magick_script(&plan(), settings);
    assert!(script.contains(r"'/usr/bin/convert' -size 14x10 'xc:#ffffffff' \"));
    assert!(script.ends_with("  'final.jpg'\n"));
}

#[test]
fn default_target_never_overwrites_the_script() {
    let custom = negotiated(Path::new("dir/out.png"), &[]).unwrap();
    let settings = custom
        .area(&ScriptRenderer.key())
        .unwrap()
        .settings::<ScriptSettings>()
        .unwrap();
    assert_eq!(settings.target, PathBuf::from("dir/out.collage.png"));
    assert_eq!(
        default_target(Path::new("build")),
        PathBuf::from("build.png")
    );
}

#[test]
fn target_equal_to_the_script_is_rejected() {
    let err = negotiated(Path::new("c.sh"), &[(OPT_TARGET, "c.sh")]).unwrap_err();
    assert!(matches!(err, CollageError::ParameterParse(_)), "{err}");
}

#[test]
fn empty_program_is_rejected() {
    let err = negotiated(Path::new("c.sh"), &[(OPT_MAGICK, "  ")]).unwrap_err();
    assert!(matches!(err, CollageError::ParameterParse(_)), "{err}");
}

#[cfg(unix)]
#[test]
fn rendered_script_is_executable() {
    use std::os::unix::fs::PermissionsExt as _;

    let out = PathBuf::from("target").join("unit_script").join("c.sh");
    let custom = negotiated(&out, &[]).unwrap();
    ScriptRenderer
        .render(&plan(), &out, custom.area(&ScriptRenderer.key()).unwrap())
        .unwrap();
    let mode = std::fs::metadata(&out).unwrap().permissions().mode();
    assert_eq!(mode & 0o111, 0o111);
    assert!(std::fs::read_to_string(&out).unwrap().starts_with("#!/bin/sh\n"));
}

#[test]
fn quoting_survives_single_quotes() {
    assert_eq!(shell_quote("a'b"), r"'a'\''b'");
    assert_eq!(shell_quote(""), "''");
}
