//! Headless GPU Tests
//!
//! Tests for:
//! - Engine: headless construction, frame rendering, output readback
//! - Engine::resize: every compositor buffer follows the viewport, failed
//!   resizes leave the previous state in place
//! - Compositor: pass order and depth program selection per variant
//! - Pipeline building: device-rejected programs come back as errors
//! - GPU sync: uniform set, stripe texture and geometry follow the scene
//! - Bokeh: no blur at zero radius, visible blur otherwise
//!
//! Every test returns early when no adapter is available.

use std::sync::Arc;

use bokeh_terrain::errors::BokehError;
use bokeh_terrain::renderer::context::WgpuContext;
use bokeh_terrain::renderer::graph::targets::{PACKED_DEPTH_FORMAT, TargetSlot};
use bokeh_terrain::renderer::shader_manager::{ShaderManager, ShaderProgram};
use bokeh_terrain::renderer::terrain_programs::{PipelineKey, TerrainPrograms};
use bokeh_terrain::resources::primitives::{PlaneOptions, create_plane};
use bokeh_terrain::resources::{BokehSettings, Side, StripeTextureSettings};
use bokeh_terrain::{
    Clock, Engine, FrameDriver, FrameOutcome, RendererSettings, TerrainConfig, TerrainVariant, Timer,
    Viewport,
};

/// Clock frozen at one instant, so consecutive frames render the same terrain.
struct FrozenClock(f32);

impl Clock for FrozenClock {
    fn elapsed_seconds(&mut self) -> f32 {
        self.0
    }
}

fn config(variant: TerrainVariant) -> TerrainConfig {
    let mut config = TerrainConfig::default();
    config.terrain.segments = 16;
    config.terrain.variant = variant;
    config
}

fn headless(config: TerrainConfig, viewport: Viewport) -> Option<Engine> {
    let _ = env_logger::builder().is_test(true).try_init();
    match pollster::block_on(Engine::new_headless(config, viewport)) {
        Ok(engine) => Some(engine),
        Err(BokehError::AdapterRequestFailed(e)) => {
            log::warn!("Skipping GPU test, no adapter: {e}");
            None
        }
        Err(e) => panic!("headless engine failed: {e}"),
    }
}

#[test]
fn headless_frame_renders_and_reads_back() {
    let viewport = Viewport::new(64, 48, 1.0).unwrap();
    let Some(mut engine) = headless(config(TerrainVariant::DepthSynchronized), viewport) else {
        return;
    };

    let mut driver = FrameDriver::new(Timer::new());
    for _ in 0..2 {
        assert_eq!(driver.tick(&mut engine, None).unwrap(), FrameOutcome::Presented);
    }
    assert_eq!(driver.frames(), 2);

    let image = engine.renderer().capture_output().unwrap();
    assert_eq!(image.dimensions(), (64, 48));
    assert!(image.pixels().all(|p| p.0[3] == 255));
}

#[test]
fn passes_run_scene_depth_bokeh() {
    let viewport = Viewport::new(32, 32, 1.0).unwrap();
    let Some(engine) = headless(config(TerrainVariant::DepthSynchronized), viewport) else {
        return;
    };
    assert_eq!(
        engine.renderer().compositor().pass_names(),
        ["Scene Pass", "Depth Pass", "Bokeh Pass"]
    );
}

#[test]
fn depth_pass_uses_displaced_program_for_synchronized_terrain() {
    let viewport = Viewport::new(32, 32, 1.0).unwrap();
    let Some(mut engine) = headless(config(TerrainVariant::DepthSynchronized), viewport) else {
        return;
    };
    let mut driver = FrameDriver::new(Timer::new());
    driver.tick(&mut engine, None).unwrap();

    let program = engine.renderer().compositor().depth_pass().program_for(engine.terrain());
    assert_eq!(program, Some(ShaderProgram::TerrainDepth));
}

#[test]
fn depth_pass_falls_back_for_additive_terrain() {
    let viewport = Viewport::new(32, 32, 1.0).unwrap();
    let Some(mut engine) = headless(config(TerrainVariant::Additive), viewport) else {
        return;
    };
    let mut driver = FrameDriver::new(Timer::new());
    driver.tick(&mut engine, None).unwrap();

    let program = engine.renderer().compositor().depth_pass().program_for(engine.terrain());
    assert_eq!(program, Some(ShaderProgram::SceneDepth));
}

#[test]
fn resize_reallocates_every_buffer() {
    let viewport = Viewport::new(40, 30, 1.0).unwrap();
    let Some(mut engine) = headless(config(TerrainVariant::DepthSynchronized), viewport) else {
        return;
    };
    let mut driver = FrameDriver::new(Timer::new());
    driver.tick(&mut engine, None).unwrap();
    let generation = engine.renderer().targets().generation();

    let resized = Viewport::new(50, 20, 3.0).unwrap();
    engine.resize(resized, resized.physical_extent()).unwrap();

    let sizes = engine.renderer().targets().allocated_sizes();
    assert_eq!(sizes.len(), 5);
    assert!(sizes.iter().all(|&(_, w, h)| (w, h) == (100, 40)), "{sizes:?}");
    assert_eq!(engine.renderer().targets().generation(), generation + 1);
    assert!((engine.scene().camera.aspect - 2.5).abs() < 1e-6);
    assert_eq!(engine.viewport(), resized);

    driver.tick(&mut engine, None).unwrap();
    let image = engine.renderer().capture_output().unwrap();
    assert_eq!(image.dimensions(), (100, 40));
}

#[test]
fn failed_resize_keeps_previous_state() {
    let viewport = Viewport::new(40, 30, 1.0).unwrap();
    let Some(mut engine) = headless(config(TerrainVariant::DepthSynchronized), viewport) else {
        return;
    };
    let before = engine.renderer().targets().allocated_sizes();
    let generation = engine.renderer().targets().generation();
    let aspect = engine.scene().camera.aspect;

    let too_big = Viewport::new(1_000_000, 30, 1.0).unwrap();
    let result = engine.resize(too_big, too_big.physical_extent());

    assert!(matches!(result, Err(BokehError::InvalidTargetExtent { .. })));
    assert_eq!(engine.renderer().targets().allocated_sizes(), before);
    assert_eq!(engine.renderer().targets().generation(), generation);
    assert_eq!(engine.scene().camera.aspect, aspect);
    assert_eq!(engine.viewport(), viewport);
    assert!(engine.renderer().targets().get(TargetSlot::Output).is_some());
}

#[test]
fn uniform_change_reaches_next_frame() {
    let viewport = Viewport::new(32, 32, 1.0).unwrap();
    let Some(mut engine) = headless(config(TerrainVariant::DepthSynchronized), viewport) else {
        return;
    };
    let mut driver = FrameDriver::new(Timer::new());
    driver.tick(&mut engine, None).unwrap();

    engine
        .set_terrain_uniform(bokeh_terrain::UniformValue::Elevation(0.0))
        .unwrap();
    assert_eq!(driver.tick(&mut engine, None).unwrap(), FrameOutcome::Presented);

    let terrain = engine.terrain();
    let cpu_version = engine.scene().mesh(terrain).unwrap().uniforms().version();
    let gpu = engine.renderer().resources().mesh(terrain).unwrap();
    assert_eq!(gpu.uploaded_version(), cpu_version);
}

#[test]
fn rejected_pipeline_is_returned_as_error() {
    let _ = env_logger::builder().is_test(true).try_init();
    let ctx = match pollster::block_on(WgpuContext::new_headless(&RendererSettings::default(), 16, 16)) {
        Ok(ctx) => ctx,
        Err(BokehError::AdapterRequestFailed(_)) => return,
        Err(e) => panic!("headless context failed: {e}"),
    };
    let mut shaders = ShaderManager::new().unwrap();
    let mut programs = TerrainPrograms::new(&ctx.device);

    // A color format in the depth-stencil slot.
    let invalid = PipelineKey::depth(
        ShaderProgram::TerrainDepth,
        PACKED_DEPTH_FORMAT,
        wgpu::TextureFormat::Rgba8Unorm,
        Side::Double,
    );
    let result = programs.get_or_create(&ctx.device, &mut shaders, invalid);
    assert!(
        matches!(result, Err(BokehError::ProgramBuildFailed { .. })),
        "{result:?}"
    );
    assert!(programs.pipeline(&invalid).is_none());

    let valid = PipelineKey::depth(
        ShaderProgram::TerrainDepth,
        PACKED_DEPTH_FORMAT,
        wgpu::TextureFormat::Depth32Float,
        Side::Double,
    );
    assert!(programs.get_or_create(&ctx.device, &mut shaders, valid).is_ok());
}

#[test]
fn regenerated_stripe_texture_is_reuploaded() {
    let viewport = Viewport::new(32, 32, 1.0).unwrap();
    let Some(mut engine) = headless(config(TerrainVariant::DepthSynchronized), viewport) else {
        return;
    };
    let mut driver = FrameDriver::new(Timer::new());
    driver.tick(&mut engine, None).unwrap();

    let terrain = engine.terrain();
    let handle = engine.scene().mesh(terrain).unwrap().uniforms().stripe_texture();
    let settings = StripeTextureSettings {
        lines_count: 9,
        height: 256,
        ..engine.scene().texture(handle).unwrap().settings().clone()
    };
    let texture = engine.scene_mut().texture_mut(handle).unwrap();
    texture.set_settings(settings).unwrap();
    let cpu_version = texture.version();

    driver.tick(&mut engine, None).unwrap();

    let gpu = engine.renderer().resources().texture(handle).unwrap();
    assert_eq!(gpu.version(), cpu_version);
    assert_eq!(gpu.generation(), 1);
    assert_eq!(gpu.texture.height(), 256);
}

#[test]
fn replaced_geometry_is_reuploaded() {
    let viewport = Viewport::new(32, 32, 1.0).unwrap();
    let Some(mut engine) = headless(config(TerrainVariant::DepthSynchronized), viewport) else {
        return;
    };
    let mut driver = FrameDriver::new(Timer::new());
    driver.tick(&mut engine, None).unwrap();

    let terrain = engine.terrain();
    let plane = create_plane(PlaneOptions {
        width_segments: 4,
        height_segments: 4,
        ..PlaneOptions::default()
    })
    .unwrap();
    engine.scene_mut().mesh_mut(terrain).unwrap().geometry = Arc::new(plane);

    driver.tick(&mut engine, None).unwrap();

    let gpu = engine.renderer().resources().mesh(terrain).unwrap();
    assert_eq!(gpu.index_count, 4 * 4 * 6);
}

#[test]
fn zero_radius_leaves_the_scene_sharp_and_blur_changes_it() {
    let viewport = Viewport::new(64, 48, 1.0).unwrap();
    let Some(mut engine) = headless(config(TerrainVariant::DepthSynchronized), viewport) else {
        return;
    };
    let mut driver = FrameDriver::new(FrozenClock(1.0));
    let mut capture = |engine: &mut Engine, bokeh: BokehSettings| {
        engine.renderer_mut().set_bokeh(bokeh).unwrap();
        driver.tick(&mut *engine, None).unwrap();
        engine.renderer().capture_output().unwrap()
    };

    let defaults = BokehSettings::default();
    let clamped = capture(&mut engine, BokehSettings { maxblur: 0.0, ..defaults });
    let no_aperture = capture(&mut engine, BokehSettings { aperture: 0.0, ..defaults });
    let blurred = capture(
        &mut engine,
        BokehSettings {
            aperture: 1.0,
            maxblur: 0.05,
            ..defaults
        },
    );

    // Both zero-radius settings return the scene color unchanged.
    assert_eq!(clamped.as_raw(), no_aperture.as_raw());

    let changed = clamped
        .pixels()
        .zip(blurred.pixels())
        .filter(|(a, b)| a != b)
        .count();
    assert!(changed > 0, "blur left every pixel unchanged");
}

#[test]
fn invalid_bokeh_settings_are_rejected() {
    let viewport = Viewport::new(32, 32, 1.0).unwrap();
    let Some(mut engine) = headless(config(TerrainVariant::DepthSynchronized), viewport) else {
        return;
    };
    let before = *engine.renderer().bokeh();
    let result = engine.renderer_mut().set_bokeh(BokehSettings {
        maxblur: -1.0,
        ..before
    });
    assert!(matches!(result, Err(BokehError::InvalidBokehParams(_))));
    assert_eq!(*engine.renderer().bokeh(), before);
}
