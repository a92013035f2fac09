//! GPU Uniform Blocks
//!
//! Every uniform block is declared once, in Rust, through
//! [`define_uniform_struct!`]. The macro produces the `#[repr(C)]` Pod struct
//! that is uploaded to the GPU *and* the matching WGSL `struct` declaration
//! that is injected into the shader templates. The Rust side and every WGSL
//! program that reads a block therefore share one declaration.
//!
//! Fields whose name starts with `__` are layout padding: they exist in the
//! Rust struct but are left out of the WGSL declaration.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};
use std::borrow::Cow;
use std::collections::HashSet;

use crate::resources::TextureHandle;
use crate::resources::version_tracker::ChangeTracker;

// ============================================================================
// 1. Rust type -> WGSL type name
// ============================================================================
pub trait WgslType {
    fn wgsl_type_name() -> Cow<'static, str>;

    fn collect_wgsl_defs(_defs: &mut Vec<String>, _inserted: &mut HashSet<String>) {}
}

impl WgslType for f32 { fn wgsl_type_name() -> Cow<'static, str> { "f32".into() } }
impl WgslType for u32 { fn wgsl_type_name() -> Cow<'static, str> { "u32".into() } }
impl WgslType for Vec2 { fn wgsl_type_name() -> Cow<'static, str> { "vec2<f32>".into() } }
impl WgslType for Vec3 { fn wgsl_type_name() -> Cow<'static, str> { "vec3<f32>".into() } }
impl WgslType for Vec4 { fn wgsl_type_name() -> Cow<'static, str> { "vec4<f32>".into() } }
impl WgslType for Mat4 { fn wgsl_type_name() -> Cow<'static, str> { "mat4x4<f32>".into() } }

/// Fixed-size array usable inside a uniform block (mostly for padding).
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformArray<T: Pod, const N: usize>(pub [T; N]);

unsafe impl<T: Pod, const N: usize> Zeroable for UniformArray<T, N> {}
unsafe impl<T: Pod, const N: usize> Pod for UniformArray<T, N> {}

impl<T: WgslType + Pod, const N: usize> WgslType for UniformArray<T, N> {
    fn wgsl_type_name() -> Cow<'static, str> {
        format!("array<{}, {}>", T::wgsl_type_name(), N).into()
    }
}

impl<T: Default + Pod, const N: usize> Default for UniformArray<T, N> {
    fn default() -> Self {
        Self([T::default(); N])
    }
}

pub trait WgslStruct: Pod + Zeroable {
    fn wgsl_struct_def(struct_name: &str) -> String;
}

// ============================================================================
// 2. Declaration macro (single source of truth)
// ============================================================================

#[macro_export]
macro_rules! define_uniform_struct {
    (
        $(#[$meta:meta])* struct $name:ident {
            $(
                $vis:vis $field_name:ident : $field_type:ty $(= $default_val:expr)?
            ),* $(,)?
        }
    ) => {
        $crate::define_uniform_struct!(@def_struct
            $(#[$meta])* struct $name {
                $( $vis $field_name : $field_type ),* }
        );

        $crate::define_uniform_struct!(@impl_default
            $name {
                $( $field_name : $field_type $(= $default_val)? ),* }
        );

        $crate::define_uniform_struct!(@impl_wgsl
            $name {
                $( $field_name : $field_type ),* }
        );
    };

    (@def_struct $(#[$meta:meta])* struct $name:ident { $( $vis:vis $field_name:ident : $field_type:ty ),* }) => {
        #[repr(C)]
        #[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
        $(#[$meta])*
        pub struct $name {
            $( $vis $field_name : $field_type, )*
        }
    };

    (@impl_default $name:ident { $( $field_name:ident : $field_type:ty $(= $default_val:expr)? ),* }) => {
        impl Default for $name {
            fn default() -> Self {
                Self {
                    $( $field_name: $crate::define_uniform_struct!(@val_or_default $field_type $(, $default_val)?), )*
                }
            }
        }
    };
    (@val_or_default $type:ty, $val:expr) => { $val };
    (@val_or_default $type:ty) => { <$type as Default>::default() };

    (@gen_body $name_str:expr, { $( $field_name:ident : $field_type:ty ),* }) => {{
        let mut code = format!("struct {} {{\n", $name_str);
        $(
            if !stringify!($field_name).starts_with("__") {
                code.push_str(&format!(
                    "    {}: {},\n",
                    stringify!($field_name),
                    <$field_type as $crate::resources::uniforms::WgslType>::wgsl_type_name()
                ));
            }
        )*
        code.push_str("};\n");
        code
    }};

    (@impl_wgsl $name:ident { $( $field_name:ident : $field_type:ty ),* }) => {
        impl $crate::resources::uniforms::WgslType for $name {
            fn wgsl_type_name() -> std::borrow::Cow<'static, str> {
                stringify!($name).into()
            }

            fn collect_wgsl_defs(defs: &mut Vec<String>, inserted: &mut std::collections::HashSet<String>) {
                $(
                    <$field_type as $crate::resources::uniforms::WgslType>::collect_wgsl_defs(defs, inserted);
                )*

                let my_name = stringify!($name);
                if !inserted.contains(my_name) {
                    let my_def = $crate::define_uniform_struct!(@gen_body my_name, { $( $field_name : $field_type ),* });
                    defs.push(my_def);
                    inserted.insert(my_name.to_string());
                }
            }
        }

        impl $crate::resources::uniforms::WgslStruct for $name {
            fn wgsl_struct_def(struct_name: &str) -> String {
                let mut defs = Vec::new();
                let mut inserted = std::collections::HashSet::new();
                $(
                    <$field_type as $crate::resources::uniforms::WgslType>::collect_wgsl_defs(&mut defs, &mut inserted);
                )*
                defs.push($crate::define_uniform_struct!(@gen_body struct_name, { $( $field_name : $field_type ),* }));
                defs.join("\n")
            }
        }
    };
}

// ============================================================================
// 3. Uniform blocks
// ============================================================================

define_uniform_struct!(
    /// Per-frame camera data (group 0).
    struct FrameUniforms {
        pub view_projection: Mat4 = Mat4::IDENTITY,
        pub view: Mat4 = Mat4::IDENTITY,
        pub camera_position: Vec3 = Vec3::ZERO,
        pub near: f32 = 0.1,
        pub far: f32 = 100.0,
        pub(crate) __pad: UniformArray<f32, 3>,
    }
);

define_uniform_struct!(
    /// Per-object transform (group 1).
    struct ObjectUniforms {
        pub model: Mat4 = Mat4::IDENTITY,
    }
);

define_uniform_struct!(
    /// Scalar part of the terrain uniform set (group 2), read by both the
    /// visual and the depth program.
    struct TerrainUniforms {
        pub elevation: f32 = 2.0,
        pub texture_frequency: f32 = 10.0,
        pub time: f32 = 0.0,
        pub(crate) __pad: f32,
    }
);

define_uniform_struct!(
    /// Visual-only material constants (group 3 of the visual program).
    struct TerrainMaterialUniforms {
        pub base_color: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0),
    }
);

define_uniform_struct!(
    /// Bokeh blur parameters.
    struct BokehUniforms {
        pub focus: f32 = 1.0,
        pub aperture: f32 = 0.015,
        pub max_blur: f32 = 0.008,
        pub aspect: f32 = 1.0,
        pub near: f32 = 0.1,
        pub far: f32 = 100.0,
        pub(crate) __pad: UniformArray<f32, 2>,
    }
);

// ============================================================================
// 4. The shared terrain uniform set
// ============================================================================

/// Names of the terrain uniforms, matching the WGSL field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformName {
    StripeTexture,
    Elevation,
    TextureFrequency,
    Time,
}

impl UniformName {
    pub const ALL: [UniformName; 4] = [
        Self::StripeTexture,
        Self::Elevation,
        Self::TextureFrequency,
        Self::Time,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StripeTexture => "stripe_texture",
            Self::Elevation => "elevation",
            Self::TextureFrequency => "texture_frequency",
            Self::Time => "time",
        }
    }
}

/// A value for one entry of the terrain uniform set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    StripeTexture(TextureHandle),
    Elevation(f32),
    TextureFrequency(f32),
    Time(f32),
}

impl UniformValue {
    #[must_use]
    pub const fn name(&self) -> UniformName {
        match self {
            Self::StripeTexture(_) => UniformName::StripeTexture,
            Self::Elevation(_) => UniformName::Elevation,
            Self::TextureFrequency(_) => UniformName::TextureFrequency,
            Self::Time(_) => UniformName::Time,
        }
    }
}

/// The terrain uniform set: `{ stripe_texture, elevation, texture_frequency, time }`.
///
/// One instance exists per terrain mesh. The visual and the depth program
/// both borrow this instance (and, on the GPU, bind the single buffer it is
/// uploaded to), so a write is observed identically by both on the next
/// render call.
#[derive(Debug, Clone)]
pub struct TerrainUniformSet {
    data: TerrainUniforms,
    stripe_texture: TextureHandle,
    tracker: ChangeTracker,
}

impl TerrainUniformSet {
    #[must_use]
    pub fn new(stripe_texture: TextureHandle, elevation: f32, texture_frequency: f32) -> Self {
        Self {
            data: TerrainUniforms {
                elevation,
                texture_frequency,
                ..Default::default()
            },
            stripe_texture,
            tracker: ChangeTracker::new(),
        }
    }

    /// Writes one uniform. The version only moves when the value changed.
    pub fn set(&mut self, value: UniformValue) {
        let changed = match value {
            UniformValue::StripeTexture(handle) => {
                std::mem::replace(&mut self.stripe_texture, handle) != handle
            }
            UniformValue::Elevation(v) => replace_f32(&mut self.data.elevation, v),
            UniformValue::TextureFrequency(v) => replace_f32(&mut self.data.texture_frequency, v),
            UniformValue::Time(v) => replace_f32(&mut self.data.time, v),
        };
        if changed {
            self.tracker.changed();
        }
    }

    #[must_use]
    pub fn get(&self, name: UniformName) -> UniformValue {
        match name {
            UniformName::StripeTexture => UniformValue::StripeTexture(self.stripe_texture),
            UniformName::Elevation => UniformValue::Elevation(self.data.elevation),
            UniformName::TextureFrequency => UniformValue::TextureFrequency(self.data.texture_frequency),
            UniformName::Time => UniformValue::Time(self.data.time),
        }
    }

    /// The scalar block as uploaded to the GPU.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &TerrainUniforms {
        &self.data
    }

    #[inline]
    #[must_use]
    pub fn stripe_texture(&self) -> TextureHandle {
        self.stripe_texture
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.tracker.version()
    }
}

fn replace_f32(slot: &mut f32, value: f32) -> bool {
    let changed = slot.to_bits() != value.to_bits();
    *slot = value;
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn blocks_are_16_byte_aligned() {
        assert_eq!(mem::size_of::<FrameUniforms>() % 16, 0);
        assert_eq!(mem::size_of::<ObjectUniforms>() % 16, 0);
        assert_eq!(mem::size_of::<TerrainUniforms>() % 16, 0);
        assert_eq!(mem::size_of::<BokehUniforms>() % 16, 0);
        assert_eq!(mem::size_of::<TerrainMaterialUniforms>() % 16, 0);
    }

    #[test]
    fn padding_is_left_out_of_wgsl() {
        let wgsl = TerrainUniforms::wgsl_struct_def("TerrainUniforms");
        assert!(wgsl.contains("elevation: f32"));
        assert!(wgsl.contains("texture_frequency: f32"));
        assert!(wgsl.contains("time: f32"));
        assert!(!wgsl.contains("__pad"));
    }

    #[test]
    fn setting_the_same_value_keeps_version() {
        let mut set = TerrainUniformSet::new(TextureHandle::default(), 2.0, 10.0);
        set.set(UniformValue::Elevation(2.0));
        assert_eq!(set.version(), 0);
        set.set(UniformValue::Time(0.5));
        assert_eq!(set.version(), 1);
    }
}
