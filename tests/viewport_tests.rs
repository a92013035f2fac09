//! Viewport and Target Planning Tests
//!
//! Tests for:
//! - Viewport: pixel ratio clamp, physical extent, aspect
//! - TargetPlan: every buffer at the physical extent, formats, validation

use bokeh_terrain::errors::BokehError;
use bokeh_terrain::renderer::graph::targets::{
    PACKED_DEPTH_FORMAT, SCENE_COLOR_FORMAT, TargetPlan, TargetSlot,
};
use bokeh_terrain::scene::{MAX_PIXEL_RATIO, Viewport};

const DEPTH: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

fn hd_retina() -> Viewport {
    Viewport::new(1920, 1080, 3.0).unwrap()
}

// ============================================================================
// Viewport
// ============================================================================

#[test]
fn high_density_display_is_clamped() {
    let vp = hd_retina();
    assert_eq!(vp.pixel_ratio(), MAX_PIXEL_RATIO);
    assert_eq!(vp.physical_extent(), (3840, 2160));
}

#[test]
fn low_density_display_keeps_its_ratio() {
    let vp = Viewport::new(800, 600, 1.25).unwrap();
    assert_eq!(vp.pixel_ratio(), 1.25);
    assert_eq!(vp.physical_extent(), (1000, 750));
}

#[test]
fn aspect_uses_logical_size() {
    let vp = hd_retina();
    assert!((vp.aspect() - 16.0 / 9.0).abs() < 1e-6);
}

// ============================================================================
// TargetPlan
// ============================================================================

#[test]
fn every_buffer_is_planned_at_physical_extent() {
    let plan = TargetPlan::new(&hd_retina(), DEPTH, None);
    assert_eq!((plan.width, plan.height), (3840, 2160));
    assert_eq!(plan.specs.len(), 4);
}

#[test]
fn plan_formats_match_slots() {
    let plan = TargetPlan::new(&hd_retina(), DEPTH, None);
    let format = |slot| plan.spec(slot).unwrap().format;

    assert_eq!(format(TargetSlot::SceneColor), SCENE_COLOR_FORMAT);
    assert_eq!(format(TargetSlot::SceneDepth), DEPTH);
    assert_eq!(format(TargetSlot::BokehDepth), PACKED_DEPTH_FORMAT);
    assert_eq!(format(TargetSlot::BokehDepthZ), DEPTH);
    assert!(plan.spec(TargetSlot::Output).is_none());
}

#[test]
fn headless_plan_adds_copyable_output() {
    let plan = TargetPlan::new(&hd_retina(), DEPTH, Some(SCENE_COLOR_FORMAT));
    let output = plan.spec(TargetSlot::Output).unwrap();
    assert!(output.usage.contains(wgpu::TextureUsages::COPY_SRC));
    assert!(output.usage.contains(wgpu::TextureUsages::RENDER_ATTACHMENT));
}

#[test]
fn sampled_buffers_can_be_bound() {
    let plan = TargetPlan::new(&hd_retina(), DEPTH, None);
    for slot in [TargetSlot::SceneColor, TargetSlot::BokehDepth] {
        let usage = plan.spec(slot).unwrap().usage;
        assert!(usage.contains(wgpu::TextureUsages::TEXTURE_BINDING), "{slot:?}");
    }
}

#[test]
fn plan_within_limits_validates() {
    let plan = TargetPlan::new(&hd_retina(), DEPTH, Some(SCENE_COLOR_FORMAT));
    assert!(plan.validate(8192, wgpu::Features::empty()).is_ok());
}

#[test]
fn plan_over_device_limit_is_rejected() {
    let plan = TargetPlan::new(&hd_retina(), DEPTH, None);
    assert!(matches!(
        plan.validate(2048, wgpu::Features::empty()),
        Err(BokehError::InvalidTargetExtent {
            width: 3840,
            height: 2160,
            max: 2048,
            ..
        })
    ));
}

#[test]
fn color_format_in_depth_slot_is_rejected() {
    let mut plan = TargetPlan::new(&hd_retina(), DEPTH, None);
    for spec in &mut plan.specs {
        if spec.slot == TargetSlot::SceneDepth {
            spec.format = wgpu::TextureFormat::Rgba8Unorm;
        }
    }
    assert!(matches!(
        plan.validate(8192, wgpu::Features::empty()),
        Err(BokehError::UnsupportedTargetFormat { .. })
    ));
}
