use crate::resources::stripe_texture::{BYTES_PER_PIXEL, StripeTexture};

/// Texture format of the stripe raster on the GPU. Color channels are sRGB
/// encoded, alpha is linear.
pub const STRIPE_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// GPU copy of a [`StripeTexture`].
///
/// Re-uploaded when the CPU version moves. Recreated when the raster size
/// changes, which bumps `generation` so dependent bind groups get rebuilt.
#[derive(Debug)]
pub struct GpuStripeTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
    version: u64,
    generation: u64,
}

impl GpuStripeTexture {
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, source: &StripeTexture) -> Self {
        let (texture, view) = create_texture(device, source);
        let gpu = Self {
            texture,
            view,
            width: source.raster().width(),
            height: source.raster().height(),
            version: source.version(),
            generation: 0,
        };
        gpu.upload(queue, source);
        gpu
    }

    /// Brings the GPU copy up to date. Returns `true` when the texture
    /// object was recreated.
    pub fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, source: &StripeTexture) -> bool {
        if self.version == source.version() {
            return false;
        }

        let raster = source.raster();
        let recreated = raster.width() != self.width || raster.height() != self.height;
        if recreated {
            let (texture, view) = create_texture(device, source);
            self.texture = texture;
            self.view = view;
            self.width = raster.width();
            self.height = raster.height();
            self.generation += 1;
        }

        self.upload(queue, source);
        self.version = source.version();
        recreated
    }

    fn upload(&self, queue: &wgpu::Queue, source: &StripeTexture) {
        let raster = source.raster();
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            raster.data(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(raster.width() * BYTES_PER_PIXEL as u32),
                rows_per_image: Some(raster.height()),
            },
            wgpu::Extent3d {
                width: raster.width(),
                height: raster.height(),
                depth_or_array_layers: 1,
            },
        );
        log::debug!(
            "Uploaded stripe texture {}x{} (version {})",
            raster.width(),
            raster.height(),
            source.version()
        );
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

fn create_texture(device: &wgpu::Device, source: &StripeTexture) -> (wgpu::Texture, wgpu::TextureView) {
    let raster = source.raster();
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Stripe Texture"),
        size: wgpu::Extent3d {
            width: raster.width(),
            height: raster.height(),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: STRIPE_TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
