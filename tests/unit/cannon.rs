use super::*;
use crate::color::Rgb;
use crate::foundation::core::Rect;
use crate::physics::Shape;
use crate::surface::headless::HeadlessContainer;
use crate::surface::record::RecordingSurface;

#[test]
fn colors_cycle_from_the_end_of_the_palette() {
    let config = BurstConfig::resolve(
        &BurstOptions::default()
            .particle_count(5)
            .colors(["#ff0000", "#00ff00"]),
    );
    let mut rng = StdRng::seed_from_u64(9);
    let colors: Vec<Rgb> = build_particles(&config, SurfaceSize::new(10, 10), &mut rng)
        .iter()
        .map(Particle::color)
        .collect();
    let red = Rgb::new(255, 0, 0);
    let green = Rgb::new(0, 255, 0);
    // i = 4, 3, 2, 1, 0
    assert_eq!(colors, vec![red, green, red, green, red]);
}

#[test]
fn particles_launch_from_the_fractional_origin() {
    let config = BurstConfig::resolve(&BurstOptions::default().particle_count(3).origin(0.25, 1.0));
    let mut rng = StdRng::seed_from_u64(1);
    let particles = build_particles(&config, SurfaceSize::new(200, 100), &mut rng);
    assert_eq!(particles.len(), 3);
    // Position after zero ticks is the launch point.
    assert!(
        particles
            .iter()
            .all(|p| p.position() == crate::foundation::core::Point::new(50.0, 100.0))
    );
}

#[test]
fn shapes_are_drawn_from_the_configured_list() {
    let config = BurstConfig::resolve(
        &BurstOptions::default()
            .particle_count(40)
            .shapes([Shape::Circle]),
    );
    let mut rng = StdRng::seed_from_u64(2);
    assert!(
        build_particles(&config, SurfaceSize::new(10, 10), &mut rng)
            .iter()
            .all(|p| p.shape() == Shape::Circle)
    );
}

#[test]
fn window_resizer_uses_viewport_and_element_resizer_uses_bounds() {
    let mut s = RecordingSurface::new(SurfaceSize::new(1, 1));
    Resizer::Window.apply(&mut s, SurfaceSize::new(300, 150));
    assert_eq!(s.size(), SurfaceSize::new(300, 150));

    s.log().set_bounds(Rect::new(10.0, 10.0, 90.5, 50.0));
    Resizer::Element.apply(&mut s, SurfaceSize::new(300, 150));
    assert_eq!(s.size(), SurfaceSize::new(80, 40));
}

#[test]
fn cannon_opts_deserialize_camel_case_with_defaults() {
    let opts: CannonOpts = serde_json::from_str(r#"{"useWorker": true}"#).unwrap();
    assert!(opts.use_worker);
    assert!(!opts.resize);
    assert_eq!(opts.timing, FrameTiming::DisplayFrame);

    let global = CannonOpts::global();
    assert!(global.resize && global.use_worker && !global.disable_for_reduced_motion);
}

#[test]
fn stale_frames_for_an_old_loop_are_ignored() {
    let container = HeadlessContainer::new(SurfaceSize::new(20, 20));
    let mut cannon = Cannon::with_surface(
        container,
        SurfaceHandle::new(
            SurfaceId(1),
            Box::new(RecordingSurface::new(SurfaceSize::new(20, 20))),
        ),
        CannonOpts::default(),
    )
    .with_seed(3);
    cannon.fire(&BurstOptions::default().particle_count(2));
    // A token for a loop that no longer exists.
    cannon.scheduler.schedule(LoopId(999));
    cannon.advance(16);
    assert_eq!(cannon.live_particles(), 2);
}

#[test]
fn unmeasured_library_surface_is_sized_before_particles_launch() {
    let mut cannon = Cannon::new(
        HeadlessContainer::new(SurfaceSize::new(640, 480)),
        CannonOpts::default(),
    )
    .with_seed(4);
    cannon.fire(&BurstOptions::default().particle_count(3).origin(0.5, 0.5));

    let anim = cannon.animation.as_ref().unwrap();
    assert_eq!(anim.size(), Some(SurfaceSize::new(640, 480)));
    assert_eq!(anim.surface().size(), SurfaceSize::new(640, 480));
    assert!(
        anim.particles()
            .iter()
            .all(|p| p.position() == crate::foundation::core::Point::new(320.0, 240.0))
    );
}
