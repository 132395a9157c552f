/// A surface texture acquired for one frame, plus the encoder recording into it.
///
/// Holding the surface texture blocks the next acquire; hand the frame back to
/// [`Gpu::present`](super::Gpu::present) promptly.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
