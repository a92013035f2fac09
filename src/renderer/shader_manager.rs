//! Shader Template Manager
//!
//! WGSL sources are minijinja templates embedded with `rust-embed`. Uniform
//! block declarations are not written in WGSL at all: they are generated from
//! the Rust structs in [`crate::resources::uniforms`] and injected into every
//! template through the render context. The visual and the depth terrain
//! programs both include the same `terrain_uniforms` and
//! `terrain_displacement` chunks.
//!
//! Template syntax:
//! - `{$ ... $}` blocks, `{{ ... }}` expressions, `$$` line statements
//! - `{$ include "name" $}` resolves to `chunks/name.wgsl`

use std::borrow::Cow;

use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, Error, ErrorKind};
use rust_embed::RustEmbed;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::errors::Result;
use crate::renderer::context::build_program;
use crate::resources::uniforms::{
    BokehUniforms, FrameUniforms, ObjectUniforms, TerrainMaterialUniforms, TerrainUniforms,
    WgslStruct,
};

#[derive(RustEmbed)]
#[folder = "src/renderer/shaders"]
struct ShaderAssets;

/// Top-level shader programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderProgram {
    /// Displaced terrain, colored.
    Terrain,
    /// Displaced terrain, packed camera distance.
    TerrainDepth,
    /// Undisplaced geometry, packed camera distance.
    SceneDepth,
    /// Fullscreen depth-of-field blur.
    Bokeh,
}

impl ShaderProgram {
    #[must_use]
    pub const fn template_name(self) -> &'static str {
        match self {
            Self::Terrain => "terrain",
            Self::TerrainDepth => "terrain_depth",
            Self::SceneDepth => "scene_depth",
            Self::Bokeh => "bokeh",
        }
    }
}

/// Scale from sampled stripe alpha to displacement intensity.
pub const DISPLACEMENT_SCALE: f32 = 0.01;

/// Taps per blur ring.
pub const BOKEH_RING_TAPS: u32 = 12;

#[derive(Serialize)]
struct BokehRing {
    scale: f32,
    phase: f32,
}

#[derive(Serialize)]
struct ShaderContext {
    frame_struct: String,
    object_struct: String,
    terrain_struct: String,
    material_struct: String,
    bokeh_struct: String,
    displacement_scale: f32,
    ring_taps: u32,
    rings: Vec<BokehRing>,
}

impl ShaderContext {
    fn new() -> Self {
        Self {
            frame_struct: FrameUniforms::wgsl_struct_def("FrameUniforms"),
            object_struct: ObjectUniforms::wgsl_struct_def("ObjectUniforms"),
            terrain_struct: TerrainUniforms::wgsl_struct_def("TerrainUniforms"),
            material_struct: TerrainMaterialUniforms::wgsl_struct_def("TerrainMaterialUniforms"),
            bokeh_struct: BokehUniforms::wgsl_struct_def("BokehUniforms"),
            displacement_scale: DISPLACEMENT_SCALE,
            ring_taps: BOKEH_RING_TAPS,
            rings: vec![
                BokehRing { scale: 0.4, phase: 0.0 },
                BokehRing { scale: 0.7, phase: 0.5 },
                BokehRing { scale: 1.0, phase: 0.0 },
            ],
        }
    }
}

pub struct ShaderManager {
    env: Environment<'static>,
    modules: FxHashMap<ShaderProgram, wgpu::ShaderModule>,
}

impl ShaderManager {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();

        let syntax = SyntaxConfig::builder()
            .block_delimiters("{$", "$}")
            .variable_delimiters("{{", "}}")
            .line_statement_prefix("$$")
            .build()?;

        env.set_syntax(syntax);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_undefined_behavior(minijinja::UndefinedBehavior::SemiStrict);
        env.set_loader(shader_loader);
        env.set_path_join_callback(|name, _parent| format!("chunks/{name}").into());

        Ok(Self {
            env,
            modules: FxHashMap::default(),
        })
    }

    /// Renders the final WGSL source of a program.
    pub fn render_source(&self, program: ShaderProgram) -> Result<String> {
        let template = self.env.get_template(program.template_name())?;
        let source = template.render(ShaderContext::new())?;
        Ok(format!("// === Generated: {} ===\n{source}", program.template_name()))
    }

    /// Returns the compiled module of a program, compiling it on first use.
    pub fn get_or_compile(
        &mut self,
        device: &wgpu::Device,
        program: ShaderProgram,
    ) -> Result<wgpu::ShaderModule> {
        if let Some(module) = self.modules.get(&program) {
            return Ok(module.clone());
        }

        let source = self.render_source(program)?;
        log::debug!("Compiling shader '{}'", program.template_name());

        let module = build_program(device, program.template_name(), || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(program.template_name()),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        })?;
        self.modules.insert(program, module.clone());
        Ok(module)
    }
}

fn shader_loader(name: &str) -> std::result::Result<Option<String>, Error> {
    let filename = if std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wgsl"))
    {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}.wgsl"))
    };

    #[cfg(all(debug_assertions, not(target_arch = "wasm32")))]
    {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("src/renderer/shaders")
            .join(filename.as_ref());
        if path.exists() {
            return match std::fs::read_to_string(&path) {
                Ok(source) => Ok(Some(source)),
                Err(e) => Err(Error::new(
                    ErrorKind::TemplateNotFound,
                    format!("Failed to read file: {e}"),
                )),
            };
        }
    }

    if let Some(file) = ShaderAssets::get(&filename)
        && let Ok(source) = std::str::from_utf8(file.data.as_ref())
    {
        return Ok(Some(source.to_string()));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_program_renders() {
        let manager = ShaderManager::new().unwrap();
        for program in [
            ShaderProgram::Terrain,
            ShaderProgram::TerrainDepth,
            ShaderProgram::SceneDepth,
            ShaderProgram::Bokeh,
        ] {
            let source = manager.render_source(program).unwrap();
            assert!(source.contains("fn vs_main"), "{program:?}");
            assert!(source.contains("fn fs_main"), "{program:?}");
            assert!(!source.contains("{{"), "{program:?}");
        }
    }
}
