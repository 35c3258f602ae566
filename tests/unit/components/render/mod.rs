use super::*;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_render").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn hex_colors_parse_with_and_without_alpha() {
    assert_eq!(
        "#FF8000".parse::<Rgba8>().unwrap(),
        Rgba8 {
            r: 255,
            g: 128,
            b: 0,
            a: 255
        }
    );
    assert_eq!("00000080".parse::<Rgba8>().unwrap().a, 128);
    assert!("#12345".parse::<Rgba8>().is_err());
    assert!("#gg0000".parse::<Rgba8>().is_err());
    assert!("#ééé".parse::<Rgba8>().is_err());
}

#[test]
fn color_display_round_trips() {
    let c: Rgba8 = "#0a0B0c0D".parse().unwrap();
    assert_eq!(c.to_string(), "#0a0b0c0d");
    assert_eq!(c.to_string().parse::<Rgba8>().unwrap(), c);
    assert_eq!(Rgba8::BLACK.css(), "rgba(0,0,0,1.000)");
}

#[test]
fn extension_is_lower_cased() {
    assert_eq!(extension_of(Path::new("a/B.PNG")).as_deref(), Some("png"));
    assert_eq!(extension_of(Path::new("Collage")), None);
}

#[test]
fn atomic_write_creates_parents_and_replaces_target() {
    let dir = scratch("atomic_ok");
    let out = dir.join("nested").join("c.txt");
    write_atomically(&out, |w| {
        w.write_all(b"first")
            .map_err(|e| CollageError::io(e.to_string()))
    })
    .unwrap();
    write_atomically(&out, |w| {
        w.write_all(b"second")
            .map_err(|e| CollageError::io(e.to_string()))
    })
    .unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "second");
    assert!(!temp_sibling(&out).exists());
}

#[test]
fn failed_write_leaves_previous_output_alone() {
    let dir = scratch("atomic_fail");
    std::fs::create_dir_all(&dir).unwrap();
    let out = dir.join("c.txt");
    std::fs::write(&out, "keep").unwrap();
    let err = write_atomically(&out, |w| {
        w.write_all(b"partial")
            .map_err(|e| CollageError::io(e.to_string()))?;
        Err(CollageError::encode("boom"))
    })
    .unwrap_err();
    assert!(matches!(err, CollageError::Encode(_)));
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "keep");
    assert!(!temp_sibling(&out).exists());
}
