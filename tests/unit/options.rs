use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;

#[test]
fn empty_options_resolve_to_defaults() {
    let c = BurstConfig::resolve(&BurstOptions::default());
    assert_eq!(c.particle_count, 50);
    assert!((c.angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    assert!((c.spread - 45f64.to_radians()).abs() < 1e-12);
    assert_eq!(c.start_velocity, 45.0);
    assert_eq!(c.decay, 0.9);
    assert_eq!(c.gravity, 1.0);
    assert_eq!(c.drift, 0.0);
    assert_eq!(c.ticks, 200);
    assert_eq!(c.origin, Origin::Fraction { x: 0.5, y: 0.5 });
    assert_eq!(c.colors.len(), 7);
    assert_eq!(c.colors[0], Rgb::new(0x26, 0xcc, 0xff));
    assert_eq!(c.shapes, vec![Shape::Square, Shape::Circle]);
    assert_eq!(c.scalar, 1.0);
    assert_eq!(c.z_index, 100);
    assert!(!c.disable_for_reduced_motion);
    assert!(c.stars.is_none());
    assert!(c.magnet.is_none());
}

#[test]
fn non_numeric_values_fall_back_to_defaults() {
    let o = BurstOptions::from_json_value(json!({
        "particleCount": "lots",
        "angle": null,
        "spread": {"nested": true},
        "startVelocity": "30",
        "ticks": [1, 2],
        "origin": 7,
        "shapes": "circle",
    }))
    .unwrap();
    let c = BurstConfig::resolve(&o);
    assert_eq!(c.particle_count, 50);
    assert!((c.angle - 90f64.to_radians()).abs() < 1e-12);
    assert!((c.spread - 45f64.to_radians()).abs() < 1e-12);
    assert_eq!(c.start_velocity, 30.0);
    assert_eq!(c.ticks, 200);
    assert_eq!(c.origin, Origin::Fraction { x: 0.5, y: 0.5 });
    assert_eq!(c.shapes, vec![Shape::Square, Shape::Circle]);
}

#[test]
fn particle_count_is_clamped_and_floored() {
    let c = BurstConfig::resolve(&BurstOptions::from_json_value(json!({"particleCount": -5})).unwrap());
    assert_eq!(c.particle_count, 0);
    let c = BurstConfig::resolve(&BurstOptions::from_json_value(json!({"particleCount": 12.9})).unwrap());
    assert_eq!(c.particle_count, 12);
}

#[test]
fn ticks_never_resolve_to_zero() {
    let c = BurstConfig::resolve(&BurstOptions::from_json_value(json!({"ticks": 0})).unwrap());
    assert_eq!(c.ticks, 1);
    let c = BurstConfig::resolve(&BurstOptions::from_json_value(json!({"ticks": 10.5})).unwrap());
    assert_eq!(c.ticks, 11);
}

#[test]
fn invalid_colors_are_skipped_and_empty_palette_defaults() {
    let o = BurstOptions::default().colors(["#zzz", "#00ff00", "nope"]);
    let c = BurstConfig::resolve(&o);
    assert_eq!(c.colors, vec![Rgb::new(0, 255, 0)]);

    let o = BurstOptions::default().colors(Vec::<String>::new());
    assert_eq!(BurstConfig::resolve(&o).colors.len(), DEFAULT_COLORS.len());
}

#[test]
fn unknown_shapes_are_skipped() {
    let o = BurstOptions::from_json_value(json!({"shapes": ["hexagon", "star", 3]})).unwrap();
    assert_eq!(BurstConfig::resolve(&o).shapes, vec![Shape::Star]);

    let o = BurstOptions::from_json_value(json!({"shapes": ["hexagon"]})).unwrap();
    assert_eq!(
        BurstConfig::resolve(&o).shapes,
        vec![Shape::Square, Shape::Circle]
    );
}

#[test]
fn star_and_magnet_defaults_fill_in() {
    let o = BurstOptions::from_json_value(json!({
        "stars": {"scale": 2},
        "magnet": {"targetPoint": {"x": 10, "y": 20}},
    }))
    .unwrap();
    let c = BurstConfig::resolve(&o);
    let s = c.stars.unwrap();
    assert_eq!(s.scale, 2.0);
    assert_eq!(s.velocity, 1.0);
    assert_eq!((s.hue, s.saturation, s.lightness), (49.0, 100.0, 61.0));

    let m = c.magnet.unwrap();
    assert_eq!(m.target, Point::new(10.0, 20.0));
    assert_eq!(m.strength, 1.0);
    assert_eq!(m.drag, 0.05);
}

#[test]
fn magnet_accepts_an_inline_target() {
    let o = BurstOptions::from_json_value(json!({
        "magnet": {"x": 40, "y": "60", "strength": 2, "drag": 0.1},
    }))
    .unwrap();
    let m = BurstConfig::resolve(&o).magnet.unwrap();
    assert_eq!(m.target, Point::new(40.0, 60.0));
    assert_eq!((m.strength, m.drag), (2.0, 0.1));

    // An explicit target point wins over inline coordinates.
    let o = BurstOptions::from_json_value(json!({
        "magnet": {"targetPoint": {"x": 1, "y": 2}, "x": 40, "y": 60},
    }))
    .unwrap();
    assert_eq!(
        BurstConfig::resolve(&o).magnet.unwrap().target,
        Point::new(1.0, 2.0)
    );
}

#[test]
fn magnet_without_target_is_ignored() {
    let o = BurstOptions::from_json_value(json!({"magnet": {"strength": 3}})).unwrap();
    assert!(BurstConfig::resolve(&o).magnet.is_none());
}

#[test]
fn reduced_motion_flag_accepts_truthy_values() {
    let o = BurstOptions::from_json_value(json!({"disableForReducedMotion": 1})).unwrap();
    assert!(BurstConfig::resolve(&o).disable_for_reduced_motion);
    let o = BurstOptions::from_json_value(json!({"disableForReducedMotion": ""})).unwrap();
    assert!(!BurstConfig::resolve(&o).disable_for_reduced_motion);
}

#[test]
fn fractional_origin_scales_with_surface() {
    let c = BurstConfig::resolve(&BurstOptions::default().origin(0.25, 1.0));
    let mut rng = StdRng::seed_from_u64(1);
    let p = c.launch_point(SurfaceSize::new(200, 100), &mut rng);
    assert_eq!(p, Point::new(50.0, 100.0));
}

#[test]
fn origin_rect_overrides_origin_and_jitters_inside() {
    let o = BurstOptions::default()
        .origin(0.9, 0.9)
        .origin_rect(Rect::new(10.0, 20.0, 14.0, 22.0));
    let c = BurstConfig::resolve(&o);
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let p = c.launch_point(SurfaceSize::new(1000, 1000), &mut rng);
        assert!((10.0..14.0).contains(&p.x));
        assert!((20.0..22.0).contains(&p.y));
        assert_eq!(p.x, p.x.floor());
        assert_eq!(p.y, p.y.floor());
    }
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = BurstOptions::from_json_str("{\"angle\": ").unwrap_err();
    assert!(err.to_string().contains("serialization error"));
}
