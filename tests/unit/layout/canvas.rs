use super::*;
use crate::foundation::geometry::{Geometry, Position};

fn rec(w: u32, h: u32, x: i64, y: i64) -> ImageRecord {
    let mut r = ImageRecord::new(format!("{w}x{h}.png"), Dimensions::new(w, h));
    r.position = Position::new(x, y);
    r
}

fn positions(plan: &CanvasPlan) -> Vec<Position> {
    plan.images().iter().map(|r| r.position).collect()
}

#[test]
fn padding_surrounds_a_single_image() {
    let constraints = CanvasConstraints {
        padding: Geometry::absolute(10, 10),
        ..CanvasConstraints::default()
    };
    let plan = resolve_canvas(&[rec(100, 100, 0, 0)], &constraints).unwrap();
    assert_eq!(plan.canvas(), Dimensions::new(120, 120));
    assert_eq!(positions(&plan), [Position::new(10, 10)]);
}

#[test]
fn square_ratio_grows_height_and_centers_content() {
    let constraints = CanvasConstraints {
        aspect_ratio: Geometry::absolute(1, 1),
        ..CanvasConstraints::default()
    };
    let plan = resolve_canvas(&[rec(100, 100, 0, 0), rec(200, 50, 100, 0)], &constraints).unwrap();
    assert_eq!(plan.canvas(), Dimensions::new(300, 300));
    assert_eq!(
        positions(&plan),
        [Position::new(0, 100), Position::new(100, 100)]
    );
}

#[test]
fn min_above_max_is_unsatisfiable() {
    let constraints = CanvasConstraints {
        min_size: Dimensions::new(50, 50),
        max_size: Dimensions::new(40, 40),
        ..CanvasConstraints::default()
    };
    let err = resolve_canvas(&[rec(10, 10, 0, 0)], &constraints).unwrap_err();
    assert!(matches!(err, CollageError::UnsatisfiableConstraints(_)), "{err}");
}

#[test]
fn content_larger_than_max_is_unsatisfiable() {
    let constraints = CanvasConstraints {
        max_size: Dimensions::new(0, 90),
        ..CanvasConstraints::default()
    };
    let plan = resolve_canvas(&[rec(500, 80, 0, 0)], &constraints).unwrap();
    assert_eq!(plan.canvas(), Dimensions::new(500, 80));
    let err = resolve_canvas(&[rec(500, 100, 0, 0)], &constraints).unwrap_err();
    assert!(matches!(err, CollageError::UnsatisfiableConstraints(_)), "{err}");
}

#[test]
fn ratio_growth_past_max_is_unsatisfiable() {
    let constraints = CanvasConstraints {
        aspect_ratio: Geometry::absolute(1, 1),
        max_size: Dimensions::new(200, 150),
        ..CanvasConstraints::default()
    };
    let err = resolve_canvas(&[rec(200, 100, 0, 0)], &constraints).unwrap_err();
    assert!(matches!(err, CollageError::UnsatisfiableConstraints(_)), "{err}");
}

#[test]
fn min_size_grows_canvas_and_keeps_ratio() {
    let constraints = CanvasConstraints {
        aspect_ratio: Geometry::absolute(2, 1),
        min_size: Dimensions::new(300, 0),
        ..CanvasConstraints::default()
    };
    let plan = resolve_canvas(&[rec(100, 100, 0, 0)], &constraints).unwrap();
    assert_eq!(plan.canvas(), Dimensions::new(300, 150));
    assert_eq!(positions(&plan), [Position::new(100, 25)]);
}

#[test]
fn odd_growth_puts_extra_pixel_right_and_bottom() {
    let constraints = CanvasConstraints {
        min_size: Dimensions::new(13, 13),
        ..CanvasConstraints::default()
    };
    let plan = resolve_canvas(&[rec(10, 10, 0, 0)], &constraints).unwrap();
    assert_eq!(plan.canvas(), Dimensions::new(13, 13));
    assert_eq!(positions(&plan), [Position::new(1, 1)]);
}

#[test]
fn ratio_is_met_within_one_pixel() {
    let constraints = CanvasConstraints {
        aspect_ratio: Geometry::absolute(16, 9),
        ..CanvasConstraints::default()
    };
    for (w, h) in [(101, 37), (37, 101), (640, 361), (1, 1)] {
        let plan = resolve_canvas(&[rec(w, h, 0, 0)], &constraints).unwrap();
        let c = plan.canvas();
        assert!(c.width >= w && c.height >= h, "{c}");
        let lhs = i64::from(c.width) * 9;
        let rhs = i64::from(c.height) * 16;
        assert!((lhs - rhs).abs() < 16, "{c} from {w}x{h}");
    }
}

#[test]
fn negative_positions_are_normalized() {
    let plan = resolve_canvas(
        &[rec(10, 10, -20, -5), rec(10, 10, 5, 5)],
        &CanvasConstraints::default(),
    )
    .unwrap();
    assert_eq!(plan.canvas(), Dimensions::new(35, 20));
    assert_eq!(
        positions(&plan),
        [Position::new(0, 0), Position::new(25, 10)]
    );
}

#[test]
fn percentage_padding_is_relative_to_the_bounding_box() {
    let constraints = CanvasConstraints {
        padding: Geometry::percentage(10, 50),
        ..CanvasConstraints::default()
    };
    let plan = resolve_canvas(&[rec(200, 40, 0, 0)], &constraints).unwrap();
    assert_eq!(plan.canvas(), Dimensions::new(240, 80));
    assert_eq!(positions(&plan), [Position::new(20, 20)]);
}

#[test]
fn canvas_never_shrinks_below_the_images() {
    for min in [Dimensions::new(0, 0), Dimensions::new(5, 5), Dimensions::new(500, 20)] {
        let constraints = CanvasConstraints {
            min_size: min,
            ..CanvasConstraints::default()
        };
        let plan = resolve_canvas(&[rec(30, 40, 3, 4), rec(20, 20, 40, 0)], &constraints).unwrap();
        let c = plan.canvas();
        assert!(c.width >= 57 && c.height >= 44, "{c}");
        assert!(c.width >= min.width && c.height >= min.height, "{c}");
        for r in plan.images() {
            assert!(r.position.x >= 0 && r.position.y >= 0);
            assert!(r.position.x + i64::from(r.placed_size.width) <= i64::from(c.width));
            assert!(r.position.y + i64::from(r.placed_size.height) <= i64::from(c.height));
        }
    }
}

#[test]
fn sizes_and_order_survive_resolution() {
    let input = [rec(10, 20, 0, 0), rec(30, 5, 10, 0)];
    let plan = resolve_canvas(&input, &CanvasConstraints::default()).unwrap();
    for (a, b) in input.iter().zip(plan.images()) {
        assert_eq!(a.source, b.source);
        assert_eq!(a.placed_size, b.placed_size);
    }
}

#[test]
fn empty_input_and_half_ratio_are_errors() {
    let err = resolve_canvas(&[], &CanvasConstraints::default()).unwrap_err();
    assert!(matches!(err, CollageError::Layout(_)));
    let constraints = CanvasConstraints {
        aspect_ratio: Geometry::absolute(4, 0),
        ..CanvasConstraints::default()
    };
    let err = resolve_canvas(&[rec(1, 1, 0, 0)], &constraints).unwrap_err();
    assert!(matches!(err, CollageError::Parse(_)));
}

#[test]
fn resolution_is_deterministic() {
    let input = [rec(17, 9, -3, 2), rec(4, 40, 20, -8)];
    let constraints = CanvasConstraints {
        aspect_ratio: Geometry::absolute(3, 2),
        padding: Geometry::absolute(2, 1),
        min_size: Dimensions::new(64, 0),
        max_size: Dimensions::default(),
    };
    assert_eq!(
        resolve_canvas(&input, &constraints).unwrap(),
        resolve_canvas(&input, &constraints).unwrap()
    );
}

#[test]
fn growing_padding_never_shrinks_the_canvas() {
    let input = [rec(30, 40, 3, 4), rec(20, 20, 40, 0)];
    for ratio in [Geometry::Unspecified, Geometry::absolute(1, 1), Geometry::absolute(16, 9)] {
        for min in [Dimensions::new(0, 0), Dimensions::new(200, 50)] {
            let mut last = Dimensions::new(0, 0);
            for p in 0..60 {
                let constraints = CanvasConstraints {
                    aspect_ratio: ratio,
                    padding: Geometry::absolute(p, p / 2),
                    min_size: min,
                    max_size: Dimensions::default(),
                };
                let c = resolve_canvas(&input, &constraints).unwrap().canvas();
                assert!(
                    c.width >= last.width && c.height >= last.height,
                    "padding {p} ratio {ratio} min {min}: {c} < {last}"
                );
                last = c;
            }
        }
    }
}

#[test]
fn canvas_lands_between_min_and_max() {
    let input = [rec(30, 40, 0, 0), rec(25, 10, 30, 5)];
    for min_w in [0, 20, 55, 80] {
        for min_h in [0, 30, 40, 70] {
            for (max_w, max_h) in [(55, 40), (80, 70), (100, 100), (60, 45)] {
                if min_w > max_w || min_h > max_h {
                    continue;
                }
                let constraints = CanvasConstraints {
                    min_size: Dimensions::new(min_w, min_h),
                    max_size: Dimensions::new(max_w, max_h),
                    ..CanvasConstraints::default()
                };
                let Ok(plan) = resolve_canvas(&input, &constraints) else {
                    continue;
                };
                let c = plan.canvas();
                assert!((min_w..=max_w).contains(&c.width), "{c} vs {min_w}..={max_w}");
                assert!((min_h..=max_h).contains(&c.height), "{c} vs {min_h}..={max_h}");
            }
        }
    }
    let constraints = CanvasConstraints {
        min_size: Dimensions::new(20, 30),
        max_size: Dimensions::new(60, 45),
        ..CanvasConstraints::default()
    };
    let plan = resolve_canvas(&input, &constraints).unwrap();
    assert_eq!(plan.canvas(), Dimensions::new(55, 40));
}

#[test]
fn far_off_coordinates_are_a_layout_error() {
    let defaults = CanvasConstraints::default();
    let err = resolve_canvas(&[rec(10, 10, i64::MIN, 0), rec(10, 10, 5, 0)], &defaults)
        .unwrap_err();
    assert!(matches!(err, CollageError::Layout(_)), "{err}");
    let err = resolve_canvas(&[rec(10, 10, 0, i64::MAX - 3)], &defaults).unwrap_err();
    assert!(matches!(err, CollageError::Layout(_)), "{err}");
    let err = resolve_canvas(&[rec(10, 10, 0, 0), rec(1, 1, i64::MAX / 2 + 1, 0)], &defaults)
        .unwrap_err();
    assert!(matches!(err, CollageError::Layout(_)), "{err}");
}

#[test]
fn extreme_but_narrow_coordinates_still_resolve() {
    let plan = resolve_canvas(
        &[rec(10, 10, i64::MIN, 0), rec(10, 10, i64::MIN + 10, 0)],
        &CanvasConstraints::default(),
    )
    .unwrap();
    assert_eq!(plan.canvas(), Dimensions::new(20, 10));
    assert_eq!(positions(&plan), [Position::new(0, 0), Position::new(10, 0)]);
}
