use std::fmt;

use super::geometry::{
    circle_vertices, fan_indices, CIRCLE_SEGMENTS, CIRCLE_VERTEX_COUNT, QUAD_VERTEX_COUNT,
    QUAD_VERTICES,
};

/// Identifies one of the built-in vertex layouts.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct LayoutId(u32);

impl LayoutId {
    pub const CIRCLE: Self = Self(1);
    pub const QUAD: Self = Self(2);
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::CIRCLE => f.write_str("circle"),
            Self::QUAD => f.write_str("quad"),
            Self(n) => write!(f, "layout#{n}"),
        }
    }
}

/// How consecutive vertices form triangles.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    /// `(0, i, i + 1)`; expanded to an index list on upload.
    TriangleFan,
    TriangleList,
}

/// One float vector attribute of a vertex.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    /// Shader `@location`.
    pub location: u32,
    /// Number of `f32` components (1..=4).
    pub components: u32,
    /// Byte offset inside the vertex.
    pub offset: u64,
}

impl VertexAttribute {
    pub(crate) fn format(&self) -> wgpu::VertexFormat {
        match self.components {
            1 => wgpu::VertexFormat::Float32,
            2 => wgpu::VertexFormat::Float32x2,
            3 => wgpu::VertexFormat::Float32x3,
            _ => wgpu::VertexFormat::Float32x4,
        }
    }
}

/// Static vertex data plus its attribute description. Immutable after creation.
#[derive(Debug, Clone)]
pub struct VertexLayout {
    id: LayoutId,
    data: Vec<u8>,
    stride: u64,
    attributes: Vec<VertexAttribute>,
    vertex_count: u32,
    topology: Topology,
}

impl VertexLayout {
    /// Unit circle fan at the origin; draws place it with a model matrix.
    pub fn circle() -> Self {
        let vertices = circle_vertices(0.0, 0.0, 1.0, CIRCLE_SEGMENTS);
        Self {
            id: LayoutId::CIRCLE,
            data: bytemuck::cast_slice(&vertices).to_vec(),
            stride: 2 * 4,
            attributes: vec![VertexAttribute { location: 0, components: 2, offset: 0 }],
            vertex_count: CIRCLE_VERTEX_COUNT,
            topology: Topology::TriangleFan,
        }
    }

    /// Full-screen quad with position at location 0 and texcoord at location 1.
    pub fn quad() -> Self {
        Self {
            id: LayoutId::QUAD,
            data: bytemuck::cast_slice(&QUAD_VERTICES).to_vec(),
            stride: 4 * 4,
            attributes: vec![
                VertexAttribute { location: 0, components: 2, offset: 0 },
                VertexAttribute { location: 1, components: 2, offset: 2 * 4 },
            ],
            vertex_count: QUAD_VERTEX_COUNT,
            topology: Topology::TriangleList,
        }
    }

    #[inline]
    pub fn id(&self) -> LayoutId {
        self.id
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn stride(&self) -> u64 {
        self.stride
    }

    #[inline]
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Index list needed to draw this layout as a triangle list, if any.
    pub fn indices(&self) -> Option<Vec<u16>> {
        match self.topology {
            Topology::TriangleFan => Some(fan_indices(self.vertex_count)),
            Topology::TriangleList => None,
        }
    }

    pub(crate) fn wgpu_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        self.attributes
            .iter()
            .map(|a| wgpu::VertexAttribute {
                format: a.format(),
                offset: a.offset,
                shader_location: a.location,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_layout_is_a_102_vertex_fan() {
        let l = VertexLayout::circle();
        assert_eq!(l.vertex_count(), 102);
        assert_eq!(l.topology(), Topology::TriangleFan);
        assert_eq!(l.stride(), 8);
        assert_eq!(l.data().len() as u64, l.stride() * l.vertex_count() as u64);
        assert_eq!(l.indices().map(|i| i.len()), Some(300));
    }

    #[test]
    fn quad_layout_interleaves_position_and_texcoord() {
        let l = VertexLayout::quad();
        assert_eq!(l.vertex_count(), 6);
        assert_eq!(l.stride(), 16);
        assert_eq!(l.attributes()[1], VertexAttribute { location: 1, components: 2, offset: 8 });
        assert_eq!(l.data().len(), 6 * 16);
        assert!(l.indices().is_none());
    }
}
