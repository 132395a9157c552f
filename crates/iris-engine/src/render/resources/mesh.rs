use wgpu::util::DeviceExt;

use crate::render::layout::VertexLayout;

/// GPU buffers for one vertex layout.
pub(super) struct Mesh {
    pub vbo: wgpu::Buffer,
    /// Present for fan layouts, which are drawn as indexed triangle lists.
    pub ibo: Option<(wgpu::Buffer, u32)>,
    pub vertex_count: u32,
}

impl Mesh {
    pub fn new(device: &wgpu::Device, layout: &VertexLayout) -> Self {
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("iris {} vbo", layout.id())),
            contents: layout.data(),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let ibo = layout.indices().map(|indices| {
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("iris {} ibo", layout.id())),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            (buffer, indices.len() as u32)
        });

        Self {
            vbo,
            ibo,
            vertex_count: layout.vertex_count(),
        }
    }

    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_vertex_buffer(0, self.vbo.slice(..));
        match &self.ibo {
            Some((ibo, count)) => {
                rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..*count, 0, 0..1);
            }
            None => rpass.draw(0..self.vertex_count, 0..1),
        }
    }
}
