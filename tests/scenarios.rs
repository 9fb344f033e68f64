//! End-to-end scenarios through the public API.

use serde_json::json;

use wavesphere::animation::{AnimationLoop, LoopState, ManualScheduler};
use wavesphere::error::{ConfigError, SphereError};
use wavesphere::frame::{PresentOutcome, RecordingSink};
use wavesphere::orbit::OrbitModel;
use wavesphere::solar::SolarSystem;
use wavesphere::sphere::{SphereRegistry, WaveSphere};
use wavesphere::{Vec2, Vec3};

const STEP: f64 = 1.0 / 60.0;

fn scenario_sphere() -> WaveSphere {
    let (sphere, report) = WaveSphere::create(&json!({
        "radius": 1.5,
        "waveSpeed": 0.25,
        "waveThickness": 0.5,
        "waveAmplitude": 0.8,
        "waveMaxAmplitude": 2.2,
        "waveCycle": 4.0,
    }))
    .unwrap();
    assert!(report.is_clean(), "{report:?}");
    sphere
}

// ============================================================================
// Wave propagation
// ============================================================================

#[test]
fn test_rings_absent_at_time_zero() {
    let sphere = scenario_sphere();
    let sampler = sphere.scene().sampler();
    let field = sampler.field();
    let config = sampler.config();
    let (lo, hi) = field.clamp_range();

    for sample in sampler.samples() {
        let base = sample.base_position;
        let drift_only = field.drift(base, 0.0).clamp(lo, hi);
        assert_eq!(field.ring_displacement(base, 0.0), 0.0);
        assert_eq!(field.displacement(base, 0.0), drift_only);

        let expected =
            (config.radius - base.length() + drift_only).clamp(config.deform_min, config.deform_max);
        assert_eq!(sampler.shape_at(base, 0.0), expected);
    }
}

#[test]
fn test_rings_propagate_by_two_seconds() {
    let sphere = scenario_sphere();
    let sampler = sphere.scene().sampler();
    let field = sampler.field();
    let config = sampler.config();
    let (lo, hi) = field.clamp_range();

    let moved = sampler
        .samples()
        .iter()
        .filter(|sample| {
            let base = sample.base_position;
            let drift_only = (config.radius - base.length() + field.drift(base, 2.0).clamp(lo, hi))
                .clamp(config.deform_min, config.deform_max);
            (sampler.shape_at(base, 2.0) - drift_only).abs() > 1e-4
        })
        .count();
    assert!(moved > 0, "no point touched by the first ring");
}

#[test]
fn test_displacement_stays_in_range_over_a_cycle() {
    let sphere = scenario_sphere();
    let sampler = sphere.scene().sampler();
    let field = sampler.field();
    let (lo, hi) = field.clamp_range();

    for step in 0..40 {
        let t = step as f32 * 0.1;
        for sample in sampler.samples().iter().step_by(97) {
            let d = field.displacement(sample.base_position, t);
            assert!((lo..=hi).contains(&d), "t={t} d={d}");
        }
    }
}

// ============================================================================
// Options reaching the scene
// ============================================================================

/// Largest ring displacement seen on the sphere's own points over one cycle.
fn peak_ring(sphere: &WaveSphere) -> f32 {
    let sampler = sphere.scene().sampler();
    let field = sampler.field();
    let mut peak = 0.0f32;
    for step in 0..40 {
        let t = step as f32 * 0.1;
        for sample in sampler.samples().iter().step_by(37) {
            peak = peak.max(field.ring_displacement(sample.base_position, t).abs());
        }
    }
    peak
}

#[test]
fn test_radius_reaches_wave_and_sampler() {
    let reference = scenario_sphere();
    let reference_clash = reference.scene().sampler().field().clash_point();
    let reference_peak = peak_ring(&reference);
    assert!(reference_peak > 0.0);

    for radius in [1.0f32, 4.0] {
        let (sphere, report) = WaveSphere::create(&json!({ "radius": radius })).unwrap();
        assert!(report.is_clean(), "{report:?}");
        let sampler = sphere.scene().sampler();
        assert_eq!(sampler.config().radius, radius);
        for sample in sampler.samples().iter().step_by(101) {
            assert!((sample.base_position.length() - radius).abs() < 1e-4 * radius);
        }

        let scale = radius / 1.5;
        let field = sampler.field();
        assert!((field.clash_point() - reference_clash * scale).abs() < 1e-4);
        let (lo, hi) = field.clamp_range();
        assert!((lo + 0.05 * scale).abs() < 1e-6);
        assert!((hi - 0.10 * scale).abs() < 1e-6);

        let peak = peak_ring(&sphere);
        assert!(peak > 0.25 * reference_peak * scale, "radius {radius}: peak {peak}");
    }
}

#[test]
fn test_disabled_controls_and_rotation() {
    let (mut sphere, report) =
        WaveSphere::create(&json!({ "enableControls": false, "autoRotate": false, "damping": 0.3 }))
            .unwrap();
    assert!(report.is_clean(), "{report:?}");
    assert!(!sphere.interaction().enabled);
    assert!(!sphere.interaction().auto_rotate);
    assert_eq!(sphere.interaction().damping, 0.3);

    sphere.interaction_mut().begin_drag();
    sphere.interaction_mut().drag(200.0, 40.0);
    sphere.interaction_mut().scroll(500.0);
    assert!(!sphere.interaction().dragging);

    let mut sink = RecordingSink::new();
    sphere.start();
    for i in 0..30 {
        sphere.on_frame(i as f64 * STEP, &mut sink);
    }
    assert_eq!(sphere.interaction().target_rotation, Vec2::ZERO);
    assert_eq!(sphere.interaction().current_rotation, Vec2::ZERO);
    assert_eq!(sphere.camera_distance(), 3.5);
}

#[test]
fn test_auto_rotate_spins_when_enabled() {
    let (mut sphere, _) =
        WaveSphere::create(&json!({ "autoRotate": true, "autoRotateSpeed": 0.002 })).unwrap();
    let mut sink = RecordingSink::new();
    sphere.start();
    for i in 0..=30 {
        sphere.on_frame(i as f64 * STEP, &mut sink);
    }
    // thirty reference frames of spin after the zero-delta first tick
    let spin = sphere.interaction().target_rotation.y;
    assert!((spin - 30.0 * 0.002).abs() < 1e-4, "{spin}");
    assert!(sphere.interaction().current_rotation.y > 0.0);
}

// ============================================================================
// Zoom
// ============================================================================

#[test]
fn test_zoom_in_then_reset() {
    let mut sphere = scenario_sphere();
    assert_eq!(sphere.camera_distance(), 3.5);

    sphere.zoom_in(0.8, false);
    assert!((sphere.camera_distance() - 2.8).abs() < 1e-6);

    sphere.zoom_in(0.1, false);
    assert_eq!(sphere.camera_distance(), sphere.config().min_zoom);

    sphere.reset_zoom(false);
    assert_eq!(sphere.camera_distance(), 3.5);
}

#[test]
fn test_zoom_level_out_of_range() {
    let mut sphere = scenario_sphere();
    sphere.set_zoom_level(4.0, false);
    assert_eq!(sphere.camera_distance(), sphere.config().min_zoom);
    assert_eq!(sphere.zoom_level(), 1.0);

    sphere.set_zoom_level(-2.0, false);
    assert_eq!(sphere.camera_distance(), sphere.config().max_zoom);
    assert_eq!(sphere.zoom_level(), 0.0);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_frames_until_dispose() {
    let mut sphere = scenario_sphere();
    sphere.on_resize(800, 600);
    let mut sink = RecordingSink::new();

    assert_eq!(sphere.on_frame(0.0, &mut sink), LoopState::Stopped);
    assert!(sink.frames.is_empty());

    sphere.start();
    for i in 0..5 {
        assert!(sphere.scheduler_mut().take_request());
        sphere.on_frame(i as f64 * STEP, &mut sink);
    }
    assert_eq!(sink.frames.len(), 5);
    let last = sink.last().unwrap();
    assert_eq!(last.point_count, sphere.points().len());
    assert!(last.point_count > 1000);
    assert!((last.mean_radius - 1.0).abs() < 0.1, "{}", last.mean_radius);

    sphere.dispose();
    sphere.dispose();
    assert!(sphere.is_disposed());
    assert!(sphere.points().is_empty());
    assert_eq!(sphere.on_frame(1.0, &mut sink), LoopState::Disposed);
    assert_eq!(sink.frames.len(), 5);

    sphere.start();
    assert_eq!(sphere.state(), LoopState::Disposed);
}

#[test]
fn test_stop_and_resume() {
    let mut sphere = scenario_sphere();
    let mut sink = RecordingSink::new();
    sphere.start();
    sphere.on_frame(0.0, &mut sink);
    sphere.on_frame(0.05, &mut sink);
    sphere.stop();
    sphere.on_frame(1.0, &mut sink);
    assert_eq!(sink.frames.len(), 2);

    sphere.start();
    sphere.on_frame(100.0, &mut sink);
    let elapsed = sink.last().unwrap().state.time.elapsed;
    assert!((elapsed - 0.05).abs() < 1e-5, "paused time leaked: {elapsed}");
}

#[test]
fn test_sink_requested_dispose_releases_points() {
    let mut sphere = scenario_sphere();
    let mut sink = RecordingSink::new().finish_after(2, PresentOutcome::Dispose);
    sphere.start();
    sphere.on_frame(0.0, &mut sink);
    assert_eq!(sphere.on_frame(STEP, &mut sink), LoopState::Disposed);
    assert!(sphere.points().is_empty());
}

// ============================================================================
// Configuration errors
// ============================================================================

#[test]
fn test_invalid_options_fail_fast() {
    let err = WaveSphere::create(&json!({ "minZoom": 8.0, "maxZoom": 6.0 })).unwrap_err();
    assert!(matches!(
        err,
        SphereError::Config(ConfigError::InvertedRange { .. })
    ));

    let err = WaveSphere::create(&json!({ "preset": "loud" })).unwrap_err();
    assert!(matches!(err, SphereError::Config(ConfigError::UnknownPreset(_))));

    let err = WaveSphere::create(&json!([1, 2])).unwrap_err();
    assert!(matches!(err, SphereError::Config(ConfigError::NotAnObject(_))));
}

#[test]
fn test_unknown_and_clamped_options_are_reported() {
    let (sphere, report) =
        WaveSphere::create(&json!({ "radius": 12.0, "glow": true, "waveSpeed": "fast" })).unwrap();
    assert_eq!(sphere.config().radius, 5.0);
    assert_eq!(report.unknown_keys, vec!["glow".to_string()]);
    assert_eq!(report.type_mismatches, vec!["waveSpeed".to_string()]);
    assert_eq!(report.clamped.len(), 1);
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_owns_spheres() {
    let mut registry = SphereRegistry::new();
    registry.insert("hero", scenario_sphere());
    registry.insert("footer", scenario_sphere());
    assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["footer", "hero"]);

    registry.get_mut("hero").unwrap().start();
    assert!(registry.get("hero").unwrap().animation().is_running());

    let removed = registry.remove("hero").unwrap();
    assert!(removed.is_disposed());
    assert_eq!(registry.len(), 1);

    registry.clear();
    assert!(registry.is_empty());
}

// ============================================================================
// Solar system
// ============================================================================

#[test]
fn test_solar_system_through_loop() {
    let mut system = SolarSystem::new(9).unwrap();
    let mut animation = AnimationLoop::new(ManualScheduler::new());
    let mut sink = RecordingSink::new();

    animation.start();
    for i in 0..4 {
        animation.on_frame(i as f64 * STEP, &mut system, &mut sink);
    }
    let last = sink.last().unwrap();
    assert_eq!(last.body_count, system.planets().len());
    assert_eq!(last.point_count, system.sun().points().len());

    let orbits = OrbitModel::solar_default();
    for planet in system.planets() {
        let orbit = &orbits.orbits()[planet.spec().orbit_index];
        let r = planet.position().length();
        assert!(
            (r - orbit.radius).abs() < 1e-3 * orbit.radius,
            "{} off its circular orbit: {r}",
            planet.spec().id
        );
    }
}

#[test]
fn test_orbit_paths_close() {
    let orbits = OrbitModel::solar_default();
    for index in 0..orbits.len() {
        let path = orbits.path(index, 64).unwrap();
        assert_eq!(path.len(), 65);
        let gap: Vec3 = path[0] - path[64];
        assert!(gap.length() < 1e-4);
    }
    assert!(orbits.path(orbits.len(), 8).is_none());
}
