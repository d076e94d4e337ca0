use super::*;

#[test]
fn short_and_long_hex_agree() {
    assert_eq!(hex_to_rgb("f00"), Some(Rgb::new(255, 0, 0)));
    assert_eq!(hex_to_rgb("ff0000"), Some(Rgb::new(255, 0, 0)));
    assert_eq!(hex_to_rgb("#F00"), Some(Rgb::new(255, 0, 0)));
}

#[test]
fn palette_entries_parse() {
    assert_eq!(hex_to_rgb("#26ccff"), Some(Rgb::new(0x26, 0xcc, 0xff)));
    assert_eq!(hex_to_rgb("#A25AFD"), Some(Rgb::new(0xa2, 0x5a, 0xfd)));
}

#[test]
fn non_hex_characters_are_ignored() {
    assert_eq!(hex_to_rgb(" #ff-00-00 "), Some(Rgb::new(255, 0, 0)));
}

#[test]
fn too_short_hex_is_rejected() {
    assert_eq!(hex_to_rgb("#f0"), None);
    assert_eq!(hex_to_rgb("zzz"), None);
    assert_eq!(hex_to_rgb(""), None);
}

#[test]
fn hsl_primaries() {
    assert_eq!(hsl_to_rgb(0.0, 100.0, 50.0), Rgb::new(255, 0, 0));
    assert_eq!(hsl_to_rgb(120.0, 100.0, 50.0), Rgb::new(0, 255, 0));
    assert_eq!(hsl_to_rgb(240.0, 100.0, 50.0), Rgb::new(0, 0, 255));
    assert_eq!(hsl_to_rgb(0.0, 0.0, 100.0), Rgb::new(255, 255, 255));
    assert_eq!(hsl_to_rgb(120.0, 100.0, 25.0), Rgb::new(0, 128, 0));
}

#[test]
fn hsl_is_memoized_consistently() {
    let a = hsl_to_rgb(49.0, 100.0, 61.0);
    let b = hsl_to_rgb(49.0, 100.0, 61.0);
    assert_eq!(a, b);
    assert_eq!(a, hsl_to_rgb_uncached(49.0, 100.0, 61.0));
}

#[test]
fn hsl_wraps_hue_and_clamps_lightness() {
    assert_eq!(hsl_to_rgb(360.0, 100.0, 50.0), hsl_to_rgb(0.0, 100.0, 50.0));
    assert_eq!(hsl_to_rgb(-120.0, 100.0, 50.0), hsl_to_rgb(240.0, 100.0, 50.0));
    assert_eq!(hsl_to_rgb(0.0, 100.0, 250.0), Rgb::new(255, 255, 255));
}

#[test]
fn hsla_carries_alpha() {
    let c = hsla_to_rgba(0.0, 100.0, 50.0, 0.25);
    assert_eq!((c.r, c.g, c.b), (255, 0, 0));
    assert_eq!(c.alpha_u8(), 64);
}
