use crate::coords::Mat4;

use super::UniformKind;

/// A host value that can be written into a uniform block member.
///
/// `bool` is stored as a 32-bit signed integer; WGSL has no host-shareable bool.
pub trait UniformValue: Copy {
    const KIND: UniformKind;

    /// Writes the value into `dst`, which is exactly `KIND.size()` bytes long.
    fn write(&self, dst: &mut [u8]);

    /// Reads a value back from `src`, which is exactly `KIND.size()` bytes long.
    fn read(src: &[u8]) -> Self;
}

macro_rules! pod_uniform {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl UniformValue for $ty {
                const KIND: UniformKind = UniformKind::$kind;

                #[inline]
                fn write(&self, dst: &mut [u8]) {
                    dst.copy_from_slice(bytemuck::bytes_of(self));
                }

                #[inline]
                fn read(src: &[u8]) -> Self {
                    bytemuck::pod_read_unaligned(src)
                }
            }
        )*
    };
}

pod_uniform! {
    i32 => Int,
    u32 => Uint,
    f32 => Float,
    [f32; 2] => Vec2,
    [f32; 3] => Vec3,
    [f32; 4] => Vec4,
    Mat4 => Mat4,
}

impl UniformValue for bool {
    const KIND: UniformKind = UniformKind::Int;

    #[inline]
    fn write(&self, dst: &mut [u8]) {
        (*self as i32).write(dst);
    }

    #[inline]
    fn read(src: &[u8]) -> Self {
        i32::read(src) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: UniformValue + PartialEq + std::fmt::Debug>(v: T) {
        let mut buf = vec![0u8; T::KIND.size() as usize];
        v.write(&mut buf);
        assert_eq!(T::read(&buf), v);
    }

    #[test]
    fn sizes_match_kinds() {
        roundtrip(-3i32);
        roundtrip([1.0f32, 2.0, 3.0]);
        roundtrip(Mat4::from_scale(2.0, 3.0, 1.0));
    }

    #[test]
    fn bool_is_stored_as_int() {
        let mut buf = [0u8; 4];
        true.write(&mut buf);
        assert_eq!(i32::read(&buf), 1);
        false.write(&mut buf);
        assert_eq!(i32::read(&buf), 0);
    }
}
