use core::ops::Mul;

use bytemuck::{Pod, Zeroable};

/// Column-major 4x4 matrix, laid out exactly like WGSL `mat4x4<f32>`.
///
/// `translate` and `scale` post-multiply, so
/// `Mat4::IDENTITY.translate(x, y, 0.0).scale(sx, sy, 1.0)` scales first and
/// then translates when applied to a point.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Self = Self::from_cols([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    #[inline]
    pub const fn from_cols(cols: [[f32; 4]; 4]) -> Self {
        Self { cols }
    }

    #[inline]
    pub const fn from_translation(x: f32, y: f32, z: f32) -> Self {
        Self::from_cols([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [x, y, z, 1.0],
        ])
    }

    #[inline]
    pub const fn from_scale(x: f32, y: f32, z: f32) -> Self {
        Self::from_cols([
            [x, 0.0, 0.0, 0.0],
            [0.0, y, 0.0, 0.0],
            [0.0, 0.0, z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    #[inline]
    pub fn translate(self, x: f32, y: f32, z: f32) -> Self {
        self * Self::from_translation(x, y, z)
    }

    #[inline]
    pub fn scale(self, x: f32, y: f32, z: f32) -> Self {
        self * Self::from_scale(x, y, z)
    }

    /// Transforms a point (`w = 1`).
    pub fn transform_point(&self, p: [f32; 3]) -> [f32; 3] {
        let c = &self.cols;
        let mut out = [0.0f32; 3];
        for (row, o) in out.iter_mut().enumerate() {
            *o = c[0][row] * p[0] + c[1][row] * p[1] + c[2][row] * p[2] + c[3][row];
        }
        out
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut cols = [[0.0f32; 4]; 4];
        for (c, col) in cols.iter_mut().enumerate() {
            for (r, cell) in col.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.cols[k][r] * rhs.cols[c][k]).sum();
            }
        }
        Mat4 { cols }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-6)
    }

    #[test]
    fn identity_is_neutral() {
        let m = Mat4::from_translation(1.0, 2.0, 3.0);
        assert_eq!(m * Mat4::IDENTITY, m);
        assert_eq!(Mat4::IDENTITY * m, m);
    }

    #[test]
    fn translation_lives_in_last_column() {
        let m = Mat4::from_translation(0.5, -0.25, 0.0);
        assert_eq!(m.cols[3], [0.5, -0.25, 0.0, 1.0]);
    }

    #[test]
    fn translate_then_scale_scales_first() {
        let m = Mat4::IDENTITY.translate(0.5, 0.5, 0.0).scale(0.1, 0.2, 1.0);
        assert!(approx(m.transform_point([1.0, 1.0, 0.0]), [0.6, 0.7, 0.0]));
        assert!(approx(m.transform_point([0.0, 0.0, 0.0]), [0.5, 0.5, 0.0]));
    }

    #[test]
    fn byte_layout_is_column_major() {
        let m = Mat4::from_translation(7.0, 8.0, 9.0);
        let floats: &[f32] = bytemuck::cast_slice(core::slice::from_ref(&m));
        assert_eq!(&floats[12..16], &[7.0, 8.0, 9.0, 1.0]);
    }
}
