use std::borrow::Cow;
use std::collections::HashMap;
use std::num::NonZeroU64;

use crate::render::layout::{LayoutId, VertexLayout};
use crate::render::shader::{ShaderProgram, StageKind};

/// GPU objects of one linked program: shader modules, bind group layouts and
/// one pipeline per vertex layout it has been drawn with.
pub(super) struct ProgramGpu {
    label: String,
    vs: wgpu::ShaderModule,
    fs: wgpu::ShaderModule,
    vs_entry: String,
    fs_entry: String,
    vertex_inputs: Vec<u32>,

    uniform_layout: wgpu::BindGroupLayout,
    uniform_size: Option<NonZeroU64>,
    uniform_bind_group: Option<(u64, wgpu::BindGroup)>,

    pub samples_texture: bool,
    pipeline_layout: wgpu::PipelineLayout,

    /// `None` records a layout that cannot feed this program's vertex stage.
    pipelines: HashMap<LayoutId, Option<wgpu::RenderPipeline>>,
}

impl ProgramGpu {
    pub fn new(
        device: &wgpu::Device,
        program: &ShaderProgram,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let module = |kind: StageKind| {
            let stage = program.stage(kind);
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(stage.origin.as_str()),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(&stage.text)),
            })
        };
        let vs = module(StageKind::Vertex);
        let fs = module(StageKind::Fragment);

        let uniform_size = program
            .uniform_block()
            .and_then(|b| NonZeroU64::new(u64::from(b.size)));

        let entries: Vec<wgpu::BindGroupLayoutEntry> = uniform_size
            .map(|size| wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: Some(size),
                },
                count: None,
            })
            .into_iter()
            .collect();
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("iris uniform bgl"),
            entries: &entries,
        });

        let samples_texture = program.samples_texture();
        let pipeline_layout = {
            let mut groups = vec![&uniform_layout];
            if samples_texture {
                groups.push(texture_layout);
            }
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("iris pipeline layout"),
                bind_group_layouts: &groups,
                immediate_size: 0,
            })
        };

        Self {
            label: program.label().to_string(),
            vs,
            fs,
            vs_entry: program.stage(StageKind::Vertex).entry_point.clone(),
            fs_entry: program.stage(StageKind::Fragment).entry_point.clone(),
            vertex_inputs: program.vertex_inputs().iter().copied().collect(),
            uniform_layout,
            uniform_size,
            uniform_bind_group: None,
            samples_texture,
            pipeline_layout,
            pipelines: HashMap::new(),
        }
    }

    #[inline]
    pub fn uniform_size(&self) -> Option<NonZeroU64> {
        self.uniform_size
    }

    /// (Re)builds the group-0 bind group against the current uniform buffer.
    pub fn ensure_uniform_bind_group(&mut self, device: &wgpu::Device, buffer: &wgpu::Buffer, generation: u64) {
        if matches!(&self.uniform_bind_group, Some((g, _)) if *g == generation) {
            return;
        }

        let entries: Vec<wgpu::BindGroupEntry<'_>> = self
            .uniform_size
            .map(|size| wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: Some(size),
                }),
            })
            .into_iter()
            .collect();

        let bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("iris uniform bind group"),
            layout: &self.uniform_layout,
            entries: &entries,
        });
        self.uniform_bind_group = Some((generation, bg));
    }

    pub fn uniform_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.uniform_bind_group.as_ref().map(|(_, bg)| bg)
    }

    /// Builds the pipeline for `layout` on first use.
    pub fn ensure_pipeline(
        &mut self,
        device: &wgpu::Device,
        layout: &VertexLayout,
        format: wgpu::TextureFormat,
    ) {
        if self.pipelines.contains_key(&layout.id()) {
            return;
        }

        let provided: Vec<u32> = layout.attributes().iter().map(|a| a.location).collect();
        if let Some(missing) = self.vertex_inputs.iter().find(|l| !provided.contains(l)) {
            log::warn!(
                "{}: vertex input @location({missing}) is not provided by the {} layout; draws skipped",
                self.label,
                layout.id()
            );
            self.pipelines.insert(layout.id(), None);
            return;
        }

        // Attributes the shader does not read are left out of the pipeline.
        let attributes: Vec<wgpu::VertexAttribute> = layout
            .wgpu_attributes()
            .into_iter()
            .filter(|a| self.vertex_inputs.contains(&a.shader_location))
            .collect();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("iris pipeline ({}, {})", self.label, layout.id())),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.vs,
                entry_point: Some(self.vs_entry.as_str()),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: layout.stride(),
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.fs,
                entry_point: Some(self.fs_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            // Fans are expanded to indexed lists, so every layout draws as a list.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("built pipeline for {} with the {} layout", self.label, layout.id());
        self.pipelines.insert(layout.id(), Some(pipeline));
    }

    pub fn pipeline(&self, layout: LayoutId) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&layout).and_then(Option::as_ref)
    }
}
