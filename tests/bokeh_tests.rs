//! Bokeh Parameter Tests
//!
//! Tests for:
//! - BokehSettings::blur_radius: focal plane, growth, clamp
//! - BokehSettings::validate
//! - BokehSettings::to_uniforms

use bokeh_terrain::BokehSettings;
use bokeh_terrain::errors::BokehError;

const EPSILON: f32 = 1e-6;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn settings() -> BokehSettings {
    BokehSettings {
        focus: 1.0,
        aperture: 0.015,
        maxblur: 0.01,
    }
}

#[test]
fn focal_plane_is_sharp() {
    assert_eq!(settings().blur_radius(1.0), 0.0);
}

#[test]
fn far_defocus_hits_maxblur() {
    // |3 - 1| * 0.015 = 0.03, clamped to 0.01
    assert!(approx(settings().blur_radius(3.0), 0.01));
}

#[test]
fn small_defocus_grows_with_aperture() {
    assert!(approx(settings().blur_radius(1.5), 0.0075));
    assert!(approx(settings().blur_radius(0.5), 0.0075));
}

#[test]
fn radius_is_monotonic_in_defocus() {
    let s = settings();
    let mut previous = 0.0;
    for step in 0..100 {
        let d = 1.0 + step as f32 * 0.05;
        let r = s.blur_radius(d);
        assert!(r >= previous, "d = {d}");
        assert!(r <= s.maxblur);
        previous = r;
    }
}

#[test]
fn zero_aperture_never_blurs() {
    let s = BokehSettings {
        aperture: 0.0,
        ..settings()
    };
    assert_eq!(s.blur_radius(50.0), 0.0);
}

#[test]
fn negative_or_non_finite_parameters_are_rejected() {
    for s in [
        BokehSettings { focus: -1.0, ..settings() },
        BokehSettings { aperture: f32::INFINITY, ..settings() },
        BokehSettings { maxblur: f32::NAN, ..settings() },
    ] {
        assert!(matches!(s.validate(), Err(BokehError::InvalidBokehParams(_))), "{s:?}");
    }
    assert!(settings().validate().is_ok());
}

#[test]
fn uniforms_carry_camera_and_aspect() {
    let u = settings().to_uniforms(16.0 / 9.0, 0.1, 100.0);
    assert!(approx(u.focus, 1.0));
    assert!(approx(u.aperture, 0.015));
    assert!(approx(u.max_blur, 0.01));
    assert!(approx(u.aspect, 16.0 / 9.0));
    assert!(approx(u.near, 0.1));
    assert!(approx(u.far, 100.0));
}
