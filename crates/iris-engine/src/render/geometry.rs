//! CPU-side geometry for the two built-in vertex layouts.

use bytemuck::{Pod, Zeroable};

/// Ring subdivisions of the built-in circle.
pub const CIRCLE_SEGMENTS: u32 = 100;

/// Vertices in the built-in circle fan: center + `CIRCLE_SEGMENTS + 1` ring points.
pub const CIRCLE_VERTEX_COUNT: u32 = CIRCLE_SEGMENTS + 2;

/// Vertices in the built-in quad (two triangles, no index buffer).
pub const QUAD_VERTEX_COUNT: u32 = 6;

/// Generates a triangle-fan circle as interleaved `x, y` components.
///
/// The center comes first, followed by `segments + 1` ring points at angle
/// `2π·i/segments` for `i = 0..=segments`. The last ring point repeats the
/// first one so the fan closes without a gap. The result always holds
/// `2 * (segments + 2)` floats.
pub fn circle_vertices(cx: f32, cy: f32, radius: f32, segments: u32) -> Vec<f32> {
    let mut out = Vec::with_capacity(2 * (segments as usize + 2));
    out.push(cx);
    out.push(cy);

    // A zero-segment ring would divide by zero; emit the degenerate ring at angle 0.
    let step = if segments == 0 { 0.0 } else { std::f32::consts::TAU / segments as f32 };

    for i in 0..=segments {
        let angle = step * i as f32;
        out.push(cx + radius * angle.cos());
        out.push(cy + radius * angle.sin());
    }

    out
}

/// Expands a triangle fan of `vertex_count` vertices into triangle-list indices.
///
/// The GPU API has no fan topology; fan triangle `i` is `(0, i, i + 1)`.
/// Fewer than three vertices produce no triangles.
pub fn fan_indices(vertex_count: u32) -> Vec<u16> {
    if vertex_count < 3 {
        return Vec::new();
    }
    (1..vertex_count - 1)
        .flat_map(|i| [0, i as u16, (i + 1) as u16])
        .collect()
}

/// Quad vertex: position + texture coordinate, interleaved.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
}

/// Full-screen quad covering `[-1, 1]²`. Texture origin is bottom-left (`v = 0` at `y = -1`).
pub const QUAD_VERTICES: [TexturedVertex; QUAD_VERTEX_COUNT as usize] = [
    TexturedVertex { pos: [-1.0, 1.0], uv: [0.0, 1.0] },
    TexturedVertex { pos: [-1.0, -1.0], uv: [0.0, 0.0] },
    TexturedVertex { pos: [1.0, -1.0], uv: [1.0, 0.0] },
    TexturedVertex { pos: [-1.0, 1.0], uv: [0.0, 1.0] },
    TexturedVertex { pos: [1.0, -1.0], uv: [1.0, 0.0] },
    TexturedVertex { pos: [1.0, 1.0], uv: [1.0, 1.0] },
];

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn ring_point(v: &[f32], i: usize) -> (f32, f32) {
        (v[2 + 2 * i], v[3 + 2 * i])
    }

    #[test]
    fn circle_length_matches_segment_count() {
        for segments in [3, 4, 17, 100, 360] {
            let v = circle_vertices(0.0, 0.0, 1.0, segments);
            assert_eq!(v.len(), 2 * (segments as usize + 2), "segments = {segments}");
        }
    }

    #[test]
    fn circle_starts_at_center() {
        let v = circle_vertices(0.25, -0.5, 2.0, 8);
        assert_eq!((v[0], v[1]), (0.25, -0.5));
    }

    #[test]
    fn ring_points_sit_on_radius() {
        let (cx, cy, r) = (0.3, 0.4, 0.75);
        let v = circle_vertices(cx, cy, r, 100);
        for i in 0..=100 {
            let (x, y) = ring_point(&v, i);
            let d = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
            assert!((d - r).abs() < EPS, "point {i} at distance {d}");
        }
    }

    #[test]
    fn ring_closes_on_first_point() {
        for segments in [3, 7, 100] {
            let v = circle_vertices(0.0, 0.0, 1.0, segments);
            let first = ring_point(&v, 0);
            let last = ring_point(&v, segments as usize);
            assert!((first.0 - last.0).abs() < EPS && (first.1 - last.1).abs() < EPS);
        }
    }

    #[test]
    fn default_circle_has_102_vertices() {
        let v = circle_vertices(0.0, 0.0, 1.0, CIRCLE_SEGMENTS);
        assert_eq!(v.len() / 2, CIRCLE_VERTEX_COUNT as usize);
    }

    #[test]
    fn fan_indices_share_the_center() {
        let idx = fan_indices(5);
        assert_eq!(idx, vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
        assert!(fan_indices(2).is_empty());
        assert_eq!(fan_indices(CIRCLE_VERTEX_COUNT).len(), 3 * CIRCLE_SEGMENTS as usize);
    }

    #[test]
    fn quad_texture_origin_is_bottom_left() {
        for v in QUAD_VERTICES {
            assert_eq!(v.uv[0], (v.pos[0] + 1.0) / 2.0);
            assert_eq!(v.uv[1], (v.pos[1] + 1.0) / 2.0);
        }
    }
}
