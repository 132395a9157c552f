//! GPU mirror of a `Canvas`.
//!
//! Holds the wgpu objects behind the canvas' programs, layouts and textures,
//! uploads what changed and replays the recorded draw list into one render pass.

mod mesh;
mod pipeline;
mod textures;
mod uniforms;

use std::collections::HashMap;

use crate::device::Gpu;
use crate::render::canvas::Canvas;
use crate::render::layout::LayoutId;
use crate::render::shader::ProgramId;
use crate::render::canvas::DrawCall;
use crate::render::texture::{TextureId, TextureImage, TextureRef};

use mesh::Mesh;
use pipeline::ProgramGpu;
use textures::{linear_sampler, texture_bind_group_layout, GpuTexture};
use uniforms::UniformArena;

pub(crate) struct GpuResources {
    surface_format: wgpu::TextureFormat,
    texture_format: wgpu::TextureFormat,

    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    placeholder: GpuTexture,

    programs: HashMap<ProgramId, ProgramGpu>,
    meshes: HashMap<LayoutId, Mesh>,
    textures: HashMap<TextureId, GpuTexture>,
    /// Earlier uploads still sampled by draws of this frame. Rebuilt every frame.
    superseded: Vec<(TextureRef, GpuTexture)>,

    uniforms: UniformArena,
    /// Dynamic uniform offset of each recorded draw, in draw order.
    offsets: Vec<u32>,
}

impl GpuResources {
    pub fn new(gpu: &Gpu<'_>, canvas: &Canvas) -> Self {
        let device = gpu.device();
        let surface_format = gpu.surface_format();

        // Match the surface's encoding so camera pixels reach the screen unchanged.
        let texture_format = if surface_format.is_srgb() {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let texture_layout = texture_bind_group_layout(device);
        let sampler = linear_sampler(device);
        let placeholder =
            GpuTexture::placeholder(device, gpu.queue(), &texture_layout, &sampler, texture_format);

        let programs = canvas
            .programs()
            .iter()
            .map(|p| (p.id(), ProgramGpu::new(device, p, &texture_layout)))
            .collect();

        let meshes = canvas
            .layouts()
            .iter()
            .map(|l| (l.id(), Mesh::new(device, l)))
            .collect();

        Self {
            surface_format,
            texture_format,
            texture_layout,
            sampler,
            placeholder,
            programs,
            meshes,
            textures: HashMap::new(),
            superseded: Vec::new(),
            uniforms: UniformArena::new(device, gpu.uniform_offset_alignment()),
            offsets: Vec::new(),
        }
    }

    /// Uploads dirty textures and this frame's uniforms, and builds missing pipelines.
    pub fn prepare(&mut self, gpu: &Gpu<'_>, canvas: &Canvas) {
        let (device, queue) = (gpu.device(), gpu.queue());

        self.sync_textures(device, queue, canvas);

        self.uniforms.clear();
        self.offsets.clear();
        for draw in canvas.draws() {
            let offset = self
                .programs
                .get(&draw.program)
                .and_then(ProgramGpu::uniform_size)
                .map_or(0, |size| self.uniforms.push(&draw.uniforms, size.get()));
            self.offsets.push(offset);
        }
        self.uniforms.flush(device, queue);

        let (buffer, generation) = (self.uniforms.buffer(), self.uniforms.generation());
        for program in self.programs.values_mut() {
            program.ensure_uniform_bind_group(device, buffer, generation);
        }

        for draw in canvas.draws() {
            let (Some(program), Some(layout)) =
                (self.programs.get_mut(&draw.program), canvas.layout(draw.layout))
            else {
                continue;
            };
            program.ensure_pipeline(device, layout, self.surface_format);
        }
    }

    fn sync_textures(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, canvas: &Canvas) {
        self.textures.retain(|id, _| canvas.texture(*id).is_some());

        for (id, image) in canvas.textures() {
            if image.is_empty() {
                continue;
            }

            let stale = self.textures.get(&id).is_none_or(|t| !t.fits(image));
            if stale {
                log::debug!("allocating {id} at {}x{}", image.width(), image.height());
                let tex = GpuTexture::new(
                    device,
                    &self.texture_layout,
                    &self.sampler,
                    self.texture_format,
                    image.width(),
                    image.height(),
                );
                self.textures.insert(id, tex);
            }

            if let Some(tex) = self.textures.get_mut(&id)
                && !tex.is_current(image)
            {
                tex.upload(queue, image);
            }
        }

        self.superseded.clear();
        for (tex, image) in canvas.superseded() {
            if image.is_empty() {
                continue;
            }
            log::trace!("uploading superseded {tex}");
            let gpu_tex = self.upload_once(device, queue, image);
            self.superseded.push((tex, gpu_tex));
        }
    }

    fn upload_once(&self, device: &wgpu::Device, queue: &wgpu::Queue, image: &TextureImage) -> GpuTexture {
        let mut tex = GpuTexture::new(
            device,
            &self.texture_layout,
            &self.sampler,
            self.texture_format,
            image.width(),
            image.height(),
        );
        tex.upload(queue, image);
        tex
    }

    /// The GPU texture holding the upload `draw` recorded, or the placeholder.
    fn bound_texture(&self, draw: &DrawCall) -> &GpuTexture {
        let Some(tex) = draw.texture else {
            return &self.placeholder;
        };
        self.superseded
            .iter()
            .find(|(r, _)| *r == tex)
            .map(|(_, t)| t)
            .or_else(|| self.textures.get(&tex.id).filter(|t| t.uploaded() == tex.generation))
            .unwrap_or(&self.placeholder)
    }

    /// Clears `view` and replays the canvas' draw list into a single render pass.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, canvas: &Canvas) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("iris frame pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(canvas.clear_color().to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for (draw, offset) in canvas.draws().iter().zip(&self.offsets) {
            let Some(program) = self.programs.get(&draw.program) else { continue };
            let Some(pipeline) = program.pipeline(draw.layout) else { continue };
            let Some(mesh) = self.meshes.get(&draw.layout) else { continue };
            let Some(uniforms) = program.uniform_bind_group() else { continue };

            rpass.set_pipeline(pipeline);

            let dynamic: &[u32] = if program.uniform_size().is_some() {
                std::slice::from_ref(offset)
            } else {
                &[]
            };
            rpass.set_bind_group(0, uniforms, dynamic);

            if program.samples_texture {
                rpass.set_bind_group(1, &self.bound_texture(draw).bind_group, &[]);
            }

            mesh.draw(&mut rpass);
        }
    }

    /// Drops every GPU object. The resources must not be used afterwards.
    pub fn release(&mut self) {
        self.textures.clear();
        self.superseded.clear();
        self.programs.clear();
        self.meshes.clear();
        self.offsets.clear();
    }
}
