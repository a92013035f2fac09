//! Error Types
//!
//! This module defines the error type used throughout the crate.
//!
//! # Overview
//!
//! [`BokehError`] covers every fatal condition of the pipeline:
//! - GPU initialization failures (adapter, device, surface)
//! - Resource-allocation failures (render targets, textures, programs)
//! - Parameter-domain violations (stripe texture, terrain, bokeh, viewport)
//! - Configuration and export I/O
//!
//! All fatal conditions surface to the caller constructing or resizing the
//! pipeline. Nothing degrades silently.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bokeh_terrain::errors::Result;
//!
//! fn build() -> Result<()> {
//!     let texture = StripeTexture::new(StripeTextureSettings::default())?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type.
#[derive(Error, Debug)]
pub enum BokehError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create or configure the presentation surface.
    #[error("Surface error: {0}")]
    SurfaceError(String),

    /// The next surface texture could not be acquired.
    #[error("Failed to acquire surface texture: {0}")]
    SurfaceAcquire(String),

    /// Window system error.
    #[error("Window system error: {0}")]
    WindowError(#[from] raw_window_handle::HandleError),

    /// Event loop error (winit).
    #[cfg(feature = "winit")]
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    // ========================================================================
    // Resource Allocation Errors
    // ========================================================================
    /// A render target was requested with a size the device cannot allocate.
    #[error("Render target '{label}' has invalid extent {width}x{height} (max {max})")]
    InvalidTargetExtent {
        /// Debug label of the target
        label: &'static str,
        width: u32,
        height: u32,
        /// Device limit for 2D texture dimensions
        max: u32,
    },

    /// A render target format cannot be used as a render attachment.
    #[error("Render target '{label}' uses unsupported format {format:?}")]
    UnsupportedTargetFormat {
        label: &'static str,
        format: wgpu::TextureFormat,
    },

    /// The device could not allocate a render target.
    #[error("Render target allocation failed: {0}")]
    TargetAllocationFailed(String),

    /// Reading the offscreen output back to the CPU failed.
    #[error("Output readback failed: {0}")]
    ReadbackFailed(String),

    /// A render target was missing when a pass tried to use it.
    #[error("Render target '{0}' is not allocated")]
    MissingTarget(&'static str),

    /// A mesh key does not refer to a live mesh.
    #[error("Mesh not found: {0}")]
    MeshNotFound(String),

    /// A material referenced by a mesh is not registered.
    #[error("Material not found: {0}")]
    MaterialNotFound(String),

    /// A texture referenced by a uniform set is not registered.
    #[error("Texture not found: {0}")]
    TextureNotFound(String),

    // ========================================================================
    // Parameter Domain Errors
    // ========================================================================
    /// Stripe texture parameters outside their valid domain.
    #[error("Invalid stripe texture parameters: {0}")]
    InvalidTextureParams(String),

    /// Terrain parameters outside their valid domain.
    #[error("Invalid terrain parameters: {0}")]
    InvalidTerrainParams(String),

    /// Bokeh parameters outside their valid domain.
    #[error("Invalid bokeh parameters: {0}")]
    InvalidBokehParams(String),

    /// Camera parameters outside their valid domain.
    #[error("Invalid camera parameters: {0}")]
    InvalidCameraParams(String),

    /// Viewport state that cannot size any resource.
    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    // ========================================================================
    // Shader Errors
    // ========================================================================
    /// Shader template could not be loaded or rendered.
    #[error("Shader template error: {0}")]
    ShaderTemplate(#[from] minijinja::Error),

    /// The device rejected a shader module or render pipeline.
    #[error("Failed to build program '{label}': {message}")]
    ProgramBuildFailed { label: String, message: String },

    // ========================================================================
    // I/O & Format Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Image encoding error.
    #[error("Image encode error: {0}")]
    ImageError(String),
}

impl From<image::ImageError> for BokehError {
    fn from(err: image::ImageError) -> Self {
        BokehError::ImageError(err.to_string())
    }
}

/// Alias for `Result<T, BokehError>`.
pub type Result<T> = std::result::Result<T, BokehError>;
