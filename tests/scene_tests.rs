//! Scene Tests
//!
//! Tests for:
//! - Scene::from_config: terrain mesh, variants, depth material association
//! - set_depth_material / remove_mesh: association bookkeeping
//! - Shared uniform set: one write observed by both programs' view
//! - Camera aspect and clear color from config

use bokeh_terrain::errors::BokehError;
use bokeh_terrain::resources::material::{Material, TerrainDepthMaterial, TerrainMaterial};
use bokeh_terrain::resources::uniforms::{UniformName, UniformValue};
use bokeh_terrain::scene::Scene;
use bokeh_terrain::{TerrainConfig, TerrainVariant};
use glam::Vec4;

fn small_config(variant: TerrainVariant) -> TerrainConfig {
    let mut config = TerrainConfig::default();
    config.terrain.segments = 4;
    config.terrain.variant = variant;
    config
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn terrain_mesh_uses_configured_grid() {
    let (scene, key) = Scene::from_config(&small_config(TerrainVariant::DepthSynchronized), 1.5).unwrap();
    let mesh = scene.mesh(key).unwrap();

    assert_eq!(mesh.geometry.vertices().len(), 5 * 5);
    assert_eq!(mesh.geometry.index_count(), 4 * 4 * 6);
    assert!((mesh.scale() - 10.0).abs() < 1e-6);
    assert!((scene.camera.aspect - 1.5).abs() < 1e-6);
}

#[test]
fn uniform_set_starts_from_terrain_settings() {
    let mut config = small_config(TerrainVariant::DepthSynchronized);
    config.terrain.elevation = 1.25;
    config.terrain.texture_frequency = 4.0;
    let (scene, key) = Scene::from_config(&config, 1.0).unwrap();
    let mesh = scene.mesh(key).unwrap();

    assert_eq!(mesh.uniform(UniformName::Elevation), UniformValue::Elevation(1.25));
    assert_eq!(
        mesh.uniform(UniformName::TextureFrequency),
        UniformValue::TextureFrequency(4.0)
    );
    assert_eq!(mesh.uniform(UniformName::Time), UniformValue::Time(0.0));

    let UniformValue::StripeTexture(handle) = mesh.uniform(UniformName::StripeTexture) else {
        panic!("stripe texture uniform has the wrong type");
    };
    assert!(scene.texture(handle).is_some());
}

#[test]
fn invalid_config_builds_no_scene() {
    let mut config = small_config(TerrainVariant::DepthSynchronized);
    config.texture.lines_count = 0;
    assert!(Scene::from_config(&config, 1.0).is_err());
}

// ============================================================================
// Depth material association
// ============================================================================

#[test]
fn depth_synchronized_terrain_has_depth_material() {
    let (scene, key) = Scene::from_config(&small_config(TerrainVariant::DepthSynchronized), 1.0).unwrap();
    let depth = scene.depth_material_for(key).unwrap();
    assert!(matches!(scene.material(depth), Some(Material::TerrainDepth(_))));
}

#[test]
fn additive_terrain_has_no_depth_material() {
    let (scene, key) = Scene::from_config(&small_config(TerrainVariant::Additive), 1.0).unwrap();
    assert!(scene.depth_material_for(key).is_none());

    let mesh = scene.mesh(key).unwrap();
    let material = scene.material(mesh.material).and_then(Material::as_terrain).unwrap();
    assert!(material.transparent);
    assert!(!material.depth_write());
}

#[test]
fn visual_material_cannot_be_a_depth_material() {
    let (mut scene, key) = Scene::from_config(&small_config(TerrainVariant::Additive), 1.0).unwrap();
    let visual = scene.add_material(
        TerrainMaterial::for_variant(TerrainVariant::DepthSynchronized, Vec4::ONE).into(),
    );
    assert!(matches!(
        scene.set_depth_material(key, visual),
        Err(BokehError::MaterialNotFound(_))
    ));
    assert!(scene.depth_material_for(key).is_none());
}

#[test]
fn removed_mesh_drops_its_association() {
    let (mut scene, key) = Scene::from_config(&small_config(TerrainVariant::DepthSynchronized), 1.0).unwrap();
    let depth = scene.depth_material_for(key).unwrap();

    assert!(scene.remove_mesh(key).is_some());
    assert!(scene.depth_material_for(key).is_none());
    assert!(scene.material(depth).is_some());
    assert!(matches!(
        scene.set_depth_material(key, depth),
        Err(BokehError::MeshNotFound(_))
    ));
}

#[test]
fn association_can_be_cleared_and_restored() {
    let (mut scene, key) = Scene::from_config(&small_config(TerrainVariant::DepthSynchronized), 1.0).unwrap();
    let depth = scene.clear_depth_material(key).unwrap();
    assert!(scene.depth_material_for(key).is_none());

    let other = scene.add_material(TerrainDepthMaterial::default().into());
    scene.set_depth_material(key, other).unwrap();
    assert_eq!(scene.depth_material_for(key), Some(other));
    assert_ne!(Some(depth), scene.depth_material_for(key));
}

// ============================================================================
// Shared uniforms
// ============================================================================

#[test]
fn set_time_reaches_every_mesh() {
    let (mut scene, key) = Scene::from_config(&small_config(TerrainVariant::DepthSynchronized), 1.0).unwrap();
    scene.set_time(2.5);
    assert_eq!(scene.mesh(key).unwrap().uniform(UniformName::Time), UniformValue::Time(2.5));
    assert!((scene.mesh(key).unwrap().uniforms().data().time - 2.5).abs() < 1e-6);
}

#[test]
fn uniform_write_bumps_version_once() {
    let (mut scene, key) = Scene::from_config(&small_config(TerrainVariant::DepthSynchronized), 1.0).unwrap();
    let mesh = scene.mesh_mut(key).unwrap();
    let before = mesh.uniforms().version();

    mesh.set_uniform(UniformValue::Elevation(3.0));
    let after = mesh.uniforms().version();
    assert!(after > before);

    mesh.set_uniform(UniformValue::Elevation(3.0));
    assert_eq!(mesh.uniforms().version(), after);
}

#[test]
fn clear_color_comes_from_config() {
    let mut config = small_config(TerrainVariant::DepthSynchronized);
    config.clear_color = [0, 0, 0];
    let (scene, _) = Scene::from_config(&config, 1.0).unwrap();
    assert_eq!(scene.clear_color, wgpu::Color::BLACK);

    let (scene, _) = Scene::from_config(&small_config(TerrainVariant::DepthSynchronized), 1.0).unwrap();
    assert!(scene.clear_color.r > 0.0 && scene.clear_color.r < 0.1);
    assert_eq!(scene.clear_color.a, 1.0);
}
