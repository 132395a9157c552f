/// A point in normalized drawing coordinates.
///
/// `(0, 0)` is the window center, `(-1, 1)` the top-left corner and `(1, -1)`
/// the bottom-right corner. Values outside `[-1, 1]` are valid (pointer outside
/// the client area, shapes partially off-screen).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct NormPoint {
    pub x: f32,
    pub y: f32,
}

impl NormPoint {
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<NormPoint> for (f32, f32) {
    #[inline]
    fn from(p: NormPoint) -> Self {
        (p.x, p.y)
    }
}
