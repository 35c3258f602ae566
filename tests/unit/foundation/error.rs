use super::*;

#[test]
fn display_prefixes_are_stable() {
    let cases = [
        (CollageError::parse("x"), "parse error:"),
        (CollageError::unknown_component("x"), "unknown component:"),
        (CollageError::registration("x"), "registration error:"),
        (CollageError::parameter("x"), "parameter error:"),
        (CollageError::io("x"), "io error:"),
        (CollageError::decode("x"), "decode error:"),
        (CollageError::encode("x"), "encode error:"),
        (CollageError::layout("x"), "layout error:"),
        (CollageError::unsatisfiable("x"), "unsatisfiable constraints:"),
        (CollageError::monitor("x"), "monitor error:"),
        (CollageError::validation("x"), "validation error:"),
    ];
    for (err, prefix) in cases {
        assert!(err.to_string().starts_with(prefix), "{err}");
    }
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CollageError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
