//! Shader Template Tests
//!
//! Tests for:
//! - Both terrain programs expand the same displacement and uniform chunks
//! - The generic depth program ignores the terrain group
//! - The blur program is generated with the configured tap count

use bokeh_terrain::renderer::shader_manager::{BOKEH_RING_TAPS, ShaderManager, ShaderProgram};

fn source(program: ShaderProgram) -> String {
    ShaderManager::new().unwrap().render_source(program).unwrap()
}

/// Extracts the item starting at `start` up to its closing brace.
fn snippet<'a>(source: &'a str, start: &str) -> &'a str {
    let begin = source.find(start).unwrap_or_else(|| panic!("`{start}` not found"));
    let rest = &source[begin..];
    let end = rest.find("\n}").map_or(rest.len(), |i| i + 2);
    &rest[..end]
}

#[test]
fn terrain_programs_share_displacement() {
    let visual = source(ShaderProgram::Terrain);
    let depth = source(ShaderProgram::TerrainDepth);

    for item in ["fn displace(", "fn terrain_intensity(", "fn stripe_coords("] {
        assert_eq!(snippet(&visual, item), snippet(&depth, item), "{item}");
    }
}

#[test]
fn terrain_programs_share_uniform_block() {
    let visual = source(ShaderProgram::Terrain);
    let depth = source(ShaderProgram::TerrainDepth);

    assert_eq!(
        snippet(&visual, "struct TerrainUniforms"),
        snippet(&depth, "struct TerrainUniforms")
    );
    for binding in [
        "@group(2) @binding(0) var<uniform> u_terrain: TerrainUniforms;",
        "@group(2) @binding(1) var t_stripe: texture_2d<f32>;",
    ] {
        assert!(visual.contains(binding));
        assert!(depth.contains(binding));
    }
}

#[test]
fn displacement_uses_every_shared_uniform() {
    let depth = source(ShaderProgram::TerrainDepth);
    for field in ["u_terrain.elevation", "u_terrain.texture_frequency", "u_terrain.time"] {
        assert!(depth.contains(field), "{field}");
    }
}

#[test]
fn generic_depth_program_has_no_terrain_group() {
    let generic = source(ShaderProgram::SceneDepth);
    assert!(!generic.contains("@group(2)"));
    assert!(!generic.contains("fn displace("));
    assert!(generic.contains("fn pack_distance("));
}

#[test]
fn depth_programs_pack_distance_the_same_way() {
    let generic = source(ShaderProgram::SceneDepth);
    let terrain = source(ShaderProgram::TerrainDepth);
    assert_eq!(
        snippet(&generic, "fn pack_distance("),
        snippet(&terrain, "fn pack_distance(")
    );
}

#[test]
fn bokeh_program_unpacks_depth() {
    let bokeh = source(ShaderProgram::Bokeh);
    assert!(bokeh.contains("fn unpack_depth("));
    assert!(bokeh.contains(&BOKEH_RING_TAPS.to_string()));
    assert!(!bokeh.contains("{{"));
}
