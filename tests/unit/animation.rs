use super::*;
use crate::color::Rgb;
use crate::foundation::core::{Point, Rect};
use crate::options::{BurstConfig, BurstOptions};
use crate::physics::Shape;
use crate::scheduler::FrameTiming;
use crate::surface::record::{RecordingSurface, SurfaceEvent};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn particles(n: usize, ticks: u32, rng: &mut StdRng) -> Vec<Particle> {
    let config = BurstConfig::resolve(&BurstOptions::default().ticks(ticks));
    (0..n)
        .map(|_| {
            Particle::initialize(&config, Point::new(50.0, 50.0), Rgb::new(1, 2, 3), Shape::Square, rng)
        })
        .collect()
}

fn no_resize(_: &mut dyn DrawingSurface) {}

#[test]
fn start_schedules_the_first_tick() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut sched = FrameScheduler::new(FrameTiming::DisplayFrame);
    let surface = RecordingSurface::new(SurfaceSize::new(100, 100));
    let anim = AnimationLoop::start(
        LoopId(3),
        Box::new(surface),
        particles(2, 5, &mut rng),
        SurfaceSize::new(100, 100),
        &mut sched,
    );
    assert!(anim.is_scheduled());
    assert_eq!(sched.advance(16), vec![LoopId(3)]);
}

#[test]
fn each_tick_clears_draws_and_presents() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut sched = FrameScheduler::new(FrameTiming::DisplayFrame);
    let surface = RecordingSurface::new(SurfaceSize::new(100, 80));
    let log = surface.log();
    let mut anim = AnimationLoop::start(
        LoopId(1),
        Box::new(surface),
        particles(3, 2, &mut rng),
        SurfaceSize::new(100, 80),
        &mut sched,
    );

    assert!(anim.tick(None, no_resize, &mut rng));
    assert!(!anim.is_scheduled());
    assert!(!anim.tick(None, no_resize, &mut rng));
    assert_eq!(log.draws_per_frame(), vec![3, 3]);
    assert_eq!(log.events()[0], SurfaceEvent::Clear(Rect::new(0.0, 0.0, 100.0, 80.0)));
    assert_eq!(anim.particle_count(), 0);

    let done = anim.finish();
    assert_eq!(log.clear_count(), 3);
    assert_eq!(log.present_count(), 3);
    assert!(!done.completion.is_settled());
}

#[test]
fn unknown_size_is_measured_through_resize() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut sched = FrameScheduler::new(FrameTiming::DisplayFrame);
    let surface = RecordingSurface::new(SurfaceSize::default());
    let log = surface.log();
    let mut anim = AnimationLoop::start(
        LoopId(1),
        Box::new(surface),
        particles(1, 10, &mut rng),
        SurfaceSize::default(),
        &mut sched,
    );
    assert_eq!(anim.size(), None);

    anim.tick(None, |s| s.set_size(SurfaceSize::new(40, 30)), &mut rng);
    assert_eq!(anim.size(), Some(SurfaceSize::new(40, 30)));

    let mut calls = 0;
    anim.tick(None, |_| calls += 1, &mut rng);
    assert_eq!(calls, 0);

    anim.invalidate_size();
    anim.tick(None, |s| s.set_size(SurfaceSize::new(60, 20)), &mut rng);
    assert_eq!(anim.size(), Some(SurfaceSize::new(60, 20)));
    assert_eq!(
        log.events()
            .iter()
            .filter(|e| matches!(e, SurfaceEvent::Resize(_)))
            .count(),
        2
    );
}

#[test]
fn fixed_size_overrides_tracked_size() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut sched = FrameScheduler::new(FrameTiming::Interval);
    let surface = RecordingSurface::new(SurfaceSize::new(10, 10));
    let log = surface.log();
    let mut anim = AnimationLoop::start(
        LoopId(1),
        Box::new(surface),
        particles(1, 10, &mut rng),
        SurfaceSize::new(10, 10),
        &mut sched,
    );
    anim.tick(Some(SurfaceSize::new(20, 5)), no_resize, &mut rng);
    anim.tick(Some(SurfaceSize::new(20, 5)), no_resize, &mut rng);
    assert_eq!(anim.surface().size(), SurfaceSize::new(20, 5));
    assert_eq!(log.events()[0], SurfaceEvent::Resize(SurfaceSize::new(20, 5)));
    assert_eq!(
        log.events()
            .iter()
            .filter(|e| matches!(e, SurfaceEvent::Resize(_)))
            .count(),
        1
    );
}

#[test]
fn merged_particles_share_the_completion_signal() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut sched = FrameScheduler::new(FrameTiming::DisplayFrame);
    let surface = RecordingSurface::new(SurfaceSize::new(10, 10));
    let mut anim = AnimationLoop::start(
        LoopId(1),
        Box::new(surface),
        particles(2, 10, &mut rng),
        SurfaceSize::new(10, 10),
        &mut sched,
    );
    let first = anim.completion();
    let second = anim.add_particles(particles(4, 10, &mut rng));
    assert!(first.same_as(&second));
    assert_eq!(anim.particle_count(), 6);
}

#[test]
fn cancel_unschedules_and_clears() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut sched = FrameScheduler::new(FrameTiming::DisplayFrame);
    let surface = RecordingSurface::new(SurfaceSize::new(10, 10));
    let log = surface.log();
    let anim = AnimationLoop::start(
        LoopId(1),
        Box::new(surface),
        particles(2, 10, &mut rng),
        SurfaceSize::new(10, 10),
        &mut sched,
    );
    let done = anim.cancel(&mut sched);
    assert!(sched.is_empty());
    assert_eq!(log.events(), vec![
        SurfaceEvent::Clear(Rect::new(0.0, 0.0, 10.0, 10.0)),
        SurfaceEvent::Present,
    ]);
    assert_eq!(done.surface.size(), SurfaceSize::new(10, 10));
}
