use super::*;

#[test]
fn unmeasured_only_when_both_dimensions_are_zero() {
    assert!(SurfaceSize::default().is_unmeasured());
    assert!(!SurfaceSize::new(0, 10).is_unmeasured());
    assert!(!SurfaceSize::new(10, 0).is_unmeasured());
}

#[test]
fn size_from_rect_truncates_and_rejects_negative() {
    let s = SurfaceSize::from_rect(Rect::new(5.0, 5.0, 105.9, 55.2));
    assert_eq!(s, SurfaceSize::new(100, 50));

    let s = SurfaceSize::from_rect(Rect::new(10.0, 10.0, 0.0, 0.0));
    assert_eq!(s, SurfaceSize::new(0, 0));

    let s = SurfaceSize::from_rect(Rect::new(0.0, 0.0, f64::NAN, 4.0));
    assert_eq!(s, SurfaceSize::new(0, 4));
}

#[test]
fn premul_roundtrip_is_close() {
    let p = Rgba8Premul::from_straight_rgba(200, 100, 50, 128);
    assert_eq!(p.a, 128);
    let [r, g, b, a] = p.to_straight_rgba();
    assert_eq!(a, 128);
    assert!((i32::from(r) - 200).abs() <= 2);
    assert!((i32::from(g) - 100).abs() <= 2);
    assert!((i32::from(b) - 50).abs() <= 2);
}

#[test]
fn transparent_unpremultiplies_to_zero() {
    assert_eq!(Rgba8Premul::transparent().to_straight_rgba(), [0, 0, 0, 0]);
}
