use std::collections::BTreeMap;
use std::num::NonZeroU32;

use crate::coords::{ColorRgba, Mat4, Viewport};

use super::layout::{LayoutId, Topology, VertexLayout};
use super::shader::{ProgramId, ShaderProgram, UniformBlock, UniformValue};
use super::texture::{TextureError, TextureId, TextureImage, TextureRef};

/// Where the canvas is in its frame lifecycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameState {
    /// Between frames; draws are ignored.
    Ready,
    /// Between `begin_frame` and `end_frame`.
    Drawing,
    /// After `destroy`; everything is a no-op.
    Destroyed,
}

/// One recorded draw, with the program's uniform block as it was at draw time.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub program: ProgramId,
    pub layout: LayoutId,
    pub topology: Topology,
    pub vertex_count: u32,
    pub uniforms: Vec<u8>,
    /// Texture bound to unit 0 at the upload it had when drawn, if the
    /// program samples one.
    pub texture: Option<TextureRef>,
}

impl DrawCall {
    /// Decodes the member `name` of `block` from the uniform snapshot.
    pub fn uniform<T: UniformValue>(&self, block: &UniformBlock, name: &str) -> Option<T> {
        let m = block.member(name).filter(|m| m.kind == T::KIND)?;
        let start = m.offset as usize;
        self.uniforms
            .get(start..start + T::KIND.size() as usize)
            .map(T::read)
    }
}

/// GPU-free half of the renderer.
///
/// Owns the two programs, the vertex layouts, the texture images and the
/// draw list of the current frame. Everything the renderer later sends to the
/// GPU is decided here, so tests can inspect draws without a device.
#[derive(Debug)]
pub struct Canvas {
    viewport: Viewport,
    state: FrameState,
    clear_color: ColorRgba,

    programs: Vec<ShaderProgram>,
    flat: ProgramId,
    textured: ProgramId,
    current: Option<ProgramId>,

    layouts: Vec<VertexLayout>,

    textures: BTreeMap<TextureId, TextureImage>,
    next_texture: NonZeroU32,

    draws: Vec<DrawCall>,
    /// Images replaced after a draw of this frame referenced them.
    superseded: Vec<(TextureRef, TextureImage)>,
    warned_destroyed: bool,
    warned_unknown: bool,
}

impl Canvas {
    /// `flat` draws circles (uniforms `model`, `color`); `textured` draws quads
    /// (uniform `model`, texture unit 0).
    pub fn new(width: u32, height: u32, flat: ShaderProgram, textured: ShaderProgram) -> Self {
        Self {
            viewport: Viewport::new(width as f32, height as f32),
            state: FrameState::Ready,
            clear_color: ColorRgba::black(),
            flat: flat.id(),
            textured: textured.id(),
            programs: vec![flat, textured],
            current: None,
            layouts: vec![VertexLayout::circle(), VertexLayout::quad()],
            textures: BTreeMap::new(),
            next_texture: NonZeroU32::MIN,
            draws: Vec::new(),
            superseded: Vec::new(),
            warned_destroyed: false,
            warned_unknown: false,
        }
    }

    #[inline]
    pub fn state(&self) -> FrameState {
        self.state
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn clear_color(&self) -> ColorRgba {
        self.clear_color
    }

    #[inline]
    pub fn flat_program(&self) -> ProgramId {
        self.flat
    }

    #[inline]
    pub fn textured_program(&self) -> ProgramId {
        self.textured
    }

    pub fn program(&self, id: ProgramId) -> Option<&ShaderProgram> {
        self.programs.iter().find(|p| p.id() == id)
    }

    pub fn programs(&self) -> &[ShaderProgram] {
        &self.programs
    }

    pub fn layout(&self, id: LayoutId) -> Option<&VertexLayout> {
        self.layouts.iter().find(|l| l.id() == id)
    }

    pub fn layouts(&self) -> &[VertexLayout] {
        &self.layouts
    }

    /// Draws recorded since the last `begin_frame`.
    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn texture(&self, id: TextureId) -> Option<&TextureImage> {
        self.textures.get(&id)
    }

    pub fn textures(&self) -> impl Iterator<Item = (TextureId, &TextureImage)> {
        self.textures.iter().map(|(id, img)| (*id, img))
    }

    /// Images that were re-uploaded after a draw of the open frame used them.
    pub fn superseded(&self) -> impl Iterator<Item = (TextureRef, &TextureImage)> {
        self.superseded.iter().map(|(r, img)| (*r, img))
    }

    /// The image `draw` samples: the upload that was current when it was recorded.
    pub fn draw_texture(&self, draw: &DrawCall) -> Option<&TextureImage> {
        let tex = draw.texture?;
        match self.textures.get(&tex.id) {
            Some(img) if img.generation() == tex.generation => Some(img),
            _ => self
                .superseded
                .iter()
                .find(|(r, _)| *r == tex)
                .map(|(_, img)| img),
        }
    }

    /// Selects the program that subsequent uniform writes and draws use.
    pub fn use_program(&mut self, id: ProgramId) {
        if self.program(id).is_some() {
            self.current = Some(id);
        } else {
            log::debug!("use_program: {id} is not owned by this canvas");
        }
    }

    /// Writes a uniform of the current program. No-op without a current program.
    pub fn set_uniform<T: UniformValue>(&mut self, name: &str, value: T) {
        if let Some(p) = self.current_program_mut() {
            p.set_uniform(name, value);
        }
    }

    fn current_program_mut(&mut self) -> Option<&mut ShaderProgram> {
        let id = self.current?;
        self.programs.iter_mut().find(|p| p.id() == id)
    }

    /// Returns `false` (and warns once) after `destroy`.
    fn alive(&mut self, op: &str) -> bool {
        if self.state != FrameState::Destroyed {
            return true;
        }
        if !self.warned_destroyed {
            log::warn!("{op} called after the renderer was destroyed; ignoring");
            self.warned_destroyed = true;
        }
        false
    }

    /// Opens a frame: clears the draw list and resets the clear color to opaque black.
    pub fn begin_frame(&mut self) {
        if !self.alive("begin_frame") {
            return;
        }
        if self.state == FrameState::Drawing {
            log::debug!("begin_frame while a frame is open; discarding {} draw(s)", self.draws.len());
        }
        self.draws.clear();
        self.superseded.clear();
        self.clear_color = ColorRgba::black();
        self.state = FrameState::Drawing;
    }

    /// Closes the frame. Returns whether a frame was open.
    ///
    /// The draw list stays readable until the next `begin_frame`.
    pub fn end_frame(&mut self) -> bool {
        match self.state {
            FrameState::Drawing => {
                self.state = FrameState::Ready;
                true
            }
            FrameState::Ready => {
                log::debug!("end_frame without begin_frame");
                false
            }
            FrameState::Destroyed => false,
        }
    }

    /// Records a filled circle centered at `(x, y)` in normalized coordinates.
    ///
    /// The horizontal radius is divided by the window aspect ratio so the
    /// circle stays round on a non-square window.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_circle(&mut self, x: f32, y: f32, radius: f32, r: f32, g: f32, b: f32, a: f32) {
        if !self.frame_open("draw_circle") {
            return;
        }

        let aspect = self.viewport.aspect_ratio();
        let model = Mat4::IDENTITY
            .translate(x, y, 0.0)
            .scale(radius / aspect, radius, 1.0);

        self.use_program(self.flat);
        self.set_uniform("color", [r, g, b, a]);
        self.set_uniform("model", model);
        self.record(LayoutId::CIRCLE, None);
    }

    /// Records `texture` stretched over a `w x h` quad centered at `(x, y)`.
    ///
    /// `(0, 0, 1, 1)` covers the whole window.
    pub fn draw_quad(&mut self, x: f32, y: f32, w: f32, h: f32, texture: TextureId) {
        if !self.frame_open("draw_quad") {
            return;
        }
        let Some(generation) = self.textures.get(&texture).map(TextureImage::generation) else {
            if !self.warned_unknown {
                log::warn!("draw_quad: {texture} does not exist; skipping");
                self.warned_unknown = true;
            } else {
                log::debug!("draw_quad: {texture} does not exist; skipping");
            }
            return;
        };

        let model = Mat4::IDENTITY.translate(x, y, 0.0).scale(w, h, 1.0);

        self.use_program(self.textured);
        self.set_uniform("model", model);
        self.record(LayoutId::QUAD, Some(TextureRef { id: texture, generation }));
    }

    fn frame_open(&mut self, op: &str) -> bool {
        if !self.alive(op) {
            return false;
        }
        if self.state != FrameState::Drawing {
            log::debug!("{op} outside begin_frame/end_frame; ignoring");
            return false;
        }
        true
    }

    fn record(&mut self, layout: LayoutId, texture: Option<TextureRef>) {
        let Some(program) = self.current.and_then(|id| self.program(id)) else {
            return;
        };
        let Some(l) = self.layout(layout) else {
            return;
        };

        let call = DrawCall {
            program: program.id(),
            layout,
            topology: l.topology(),
            vertex_count: l.vertex_count(),
            uniforms: program.uniform_bytes().to_vec(),
            texture: texture.filter(|_| program.samples_texture()),
        };
        self.draws.push(call);
    }

    /// Allocates a new, empty texture.
    pub fn create_texture(&mut self) -> TextureId {
        let id = TextureId::from_index(self.next_texture);
        self.next_texture = self.next_texture.saturating_add(1);
        if self.state != FrameState::Destroyed {
            self.textures.insert(id, TextureImage::empty());
        }
        log::debug!("created {id}");
        id
    }

    /// Replaces the contents of `id` with packed RGB pixels. Full re-upload every call.
    ///
    /// Draws already recorded in the open frame keep sampling the previous
    /// upload.
    pub fn update_texture(
        &mut self,
        id: TextureId,
        rgb: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(), TextureError> {
        if !self.alive("update_texture") {
            return Ok(());
        }
        let image = self.textures.get_mut(&id).ok_or(TextureError::Unknown(id))?;

        let current = TextureRef {
            id,
            generation: image.generation(),
        };
        let drawn = self.state == FrameState::Drawing
            && self.draws.iter().any(|d| d.texture == Some(current));
        let previous = drawn.then(|| image.clone());

        image.upload_rgb(rgb, width, height)?;

        if let Some(previous) = previous {
            log::trace!("keeping {current} for draws recorded before the re-upload");
            self.superseded.push((current, previous));
        }
        Ok(())
    }

    /// Releases programs, textures and draws. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.state == FrameState::Destroyed {
            return;
        }
        self.draws.clear();
        self.superseded.clear();
        self.textures.clear();
        self.programs.clear();
        self.layouts.clear();
        self.current = None;
        self.state = FrameState::Destroyed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT_VS: &str = r#"
struct Globals { model: mat4x4<f32>, color: vec4<f32> };
@group(0) @binding(0) var<uniform> globals: Globals;

@vertex
fn vs_main(@location(0) pos: vec2<f32>) -> @builtin(position) vec4<f32> {
    return globals.model * vec4<f32>(pos, 0.0, 1.0);
}
"#;

    const FLAT_FS: &str = r#"
struct Globals { model: mat4x4<f32>, color: vec4<f32> };
@group(0) @binding(0) var<uniform> globals: Globals;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return globals.color;
}
"#;

    const TEX_VS: &str = r#"
struct Globals { model: mat4x4<f32> };
@group(0) @binding(0) var<uniform> globals: Globals;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@location(0) pos: vec2<f32>, @location(1) uv: vec2<f32>) -> VsOut {
    var out: VsOut;
    out.pos = globals.model * vec4<f32>(pos, 0.0, 1.0);
    out.uv = uv;
    return out;
}
"#;

    const TEX_FS: &str = r#"
@group(1) @binding(0) var frame_tex: texture_2d<f32>;
@group(1) @binding(1) var frame_sampler: sampler;

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return textureSample(frame_tex, frame_sampler, uv);
}
"#;

    fn canvas() -> Canvas {
        let flat = ShaderProgram::from_sources("flat.vs", FLAT_VS, "flat.fs", FLAT_FS).unwrap();
        let textured = ShaderProgram::from_sources("tex.vs", TEX_VS, "tex.fs", TEX_FS).unwrap();
        Canvas::new(800, 600, flat, textured)
    }

    fn block(c: &Canvas, id: ProgramId) -> UniformBlock {
        c.program(id).and_then(|p| p.uniform_block()).cloned().unwrap()
    }

    #[test]
    fn circle_records_a_fan_with_color_and_aspect_corrected_model() {
        let mut c = canvas();
        c.begin_frame();
        c.draw_circle(0.5, -0.25, 0.1, 1.0, 1.0, 0.0, 1.0);
        assert!(c.end_frame());

        let [call] = c.draws() else { panic!("expected one draw") };
        assert_eq!(call.program, c.flat_program());
        assert_eq!(call.layout, LayoutId::CIRCLE);
        assert_eq!(call.topology, Topology::TriangleFan);
        assert_eq!(call.vertex_count, 102);
        assert_eq!(call.texture, None);

        let b = block(&c, c.flat_program());
        assert_eq!(call.uniform::<[f32; 4]>(&b, "color"), Some([1.0, 1.0, 0.0, 1.0]));

        let model: Mat4 = call.uniform(&b, "model").unwrap();
        let aspect = 800.0 / 600.0;
        let expected = Mat4::IDENTITY.translate(0.5, -0.25, 0.0).scale(0.1 / aspect, 0.1, 1.0);
        assert_eq!(model, expected);
    }

    #[test]
    fn quad_samples_the_latest_upload() {
        let mut c = canvas();
        let tex = c.create_texture();
        let red: Vec<u8> = [255u8, 0, 0].repeat(4);
        c.update_texture(tex, &red, 2, 2).unwrap();

        c.begin_frame();
        c.draw_quad(0.0, 0.0, 1.0, 1.0, tex);
        c.end_frame();

        let [call] = c.draws() else { panic!("expected one draw") };
        assert_eq!(call.program, c.textured_program());
        assert_eq!(call.layout, LayoutId::QUAD);
        assert_eq!(call.topology, Topology::TriangleList);
        assert_eq!(call.vertex_count, 6);
        assert_eq!(call.texture.map(|t| t.id), Some(tex));

        let b = block(&c, c.textured_program());
        assert_eq!(call.uniform::<Mat4>(&b, "model"), Some(Mat4::IDENTITY));

        let img = c.texture(tex).unwrap();
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(img.pixel(x, y), Some([255, 0, 0, 255]));
        }
    }

    #[test]
    fn reupload_mid_frame_keeps_earlier_draws_on_the_old_image() {
        let mut c = canvas();
        let tex = c.create_texture();

        c.begin_frame();
        c.update_texture(tex, &[255, 0, 0], 1, 1).unwrap();
        c.draw_quad(0.0, 0.0, 1.0, 1.0, tex);
        c.update_texture(tex, &[0, 0, 255], 1, 1).unwrap();
        c.draw_quad(0.0, 0.0, 1.0, 1.0, tex);
        c.end_frame();

        let [first, second] = c.draws() else { panic!("expected two draws") };
        assert_ne!(first.texture, second.texture);

        let sampled = |d: &DrawCall| c.draw_texture(d).and_then(|img| img.pixel(0, 0));
        assert_eq!(sampled(first), Some([255, 0, 0, 255]));
        assert_eq!(sampled(second), Some([0, 0, 255, 255]));
        assert_eq!(c.superseded().count(), 1);

        c.begin_frame();
        assert_eq!(c.superseded().count(), 0);
    }

    #[test]
    fn reupload_of_an_undrawn_texture_keeps_no_copy() {
        let mut c = canvas();
        let tex = c.create_texture();

        c.begin_frame();
        c.update_texture(tex, &[255, 0, 0], 1, 1).unwrap();
        c.update_texture(tex, &[0, 255, 0], 1, 1).unwrap();
        c.draw_quad(0.0, 0.0, 1.0, 1.0, tex);
        assert!(c.update_texture(tex, &[0; 2], 1, 1).is_err());
        c.end_frame();

        assert_eq!(c.superseded().count(), 0);
        let [call] = c.draws() else { panic!("expected one draw") };
        assert_eq!(c.draw_texture(call).and_then(|img| img.pixel(0, 0)), Some([0, 255, 0, 255]));
    }

    #[test]
    fn each_draw_keeps_its_own_uniform_snapshot() {
        let mut c = canvas();
        c.begin_frame();
        c.draw_circle(0.0, 0.0, 0.1, 1.0, 0.0, 0.0, 1.0);
        c.draw_circle(0.0, 0.0, 0.1, 0.0, 0.0, 1.0, 1.0);
        c.end_frame();

        let b = block(&c, c.flat_program());
        let colors: Vec<[f32; 4]> = c.draws().iter().filter_map(|d| d.uniform(&b, "color")).collect();
        assert_eq!(colors, vec![[1.0, 0.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0]]);
    }

    #[test]
    fn draws_outside_a_frame_are_ignored() {
        let mut c = canvas();
        c.draw_circle(0.0, 0.0, 0.1, 1.0, 1.0, 1.0, 1.0);
        assert!(c.draws().is_empty());

        c.begin_frame();
        c.end_frame();
        c.draw_circle(0.0, 0.0, 0.1, 1.0, 1.0, 1.0, 1.0);
        assert!(c.draws().is_empty());
    }

    #[test]
    fn begin_frame_resets_draws_and_clear_color() {
        let mut c = canvas();
        c.begin_frame();
        c.draw_circle(0.0, 0.0, 0.1, 1.0, 1.0, 1.0, 1.0);
        c.end_frame();
        assert_eq!(c.draws().len(), 1);

        c.begin_frame();
        assert!(c.draws().is_empty());
        assert_eq!(c.clear_color(), ColorRgba::black());
        assert_eq!(c.state(), FrameState::Drawing);
    }

    #[test]
    fn texture_updates_are_validated() {
        let mut c = canvas();
        let tex = c.create_texture();
        assert_eq!(
            c.update_texture(tex, &[0; 7], 2, 1),
            Err(TextureError::LengthMismatch { expected: 6, actual: 7 })
        );

        let mut other = canvas();
        let foreign = other.create_texture();
        let unknown = other.create_texture();
        assert_ne!(foreign, unknown);
        assert_eq!(
            c.update_texture(unknown, &[0; 3], 1, 1),
            Err(TextureError::Unknown(unknown))
        );
    }

    #[test]
    fn draw_quad_with_unknown_texture_is_skipped() {
        let mut c = canvas();
        let mut other = canvas();
        other.create_texture();
        let unknown = other.create_texture();

        c.begin_frame();
        c.draw_quad(0.0, 0.0, 1.0, 1.0, unknown);
        assert!(c.warned_unknown);
        c.draw_quad(0.0, 0.0, 1.0, 1.0, unknown);
        assert!(c.draws().is_empty());
    }

    #[test]
    fn destroy_is_idempotent_and_disables_everything() {
        let mut c = canvas();
        let tex = c.create_texture();
        c.destroy();
        c.destroy();

        assert_eq!(c.state(), FrameState::Destroyed);
        assert!(c.programs().is_empty());
        assert!(c.texture(tex).is_none());

        c.begin_frame();
        c.draw_circle(0.0, 0.0, 0.1, 1.0, 1.0, 1.0, 1.0);
        assert_eq!(c.update_texture(tex, &[0; 3], 1, 1), Ok(()));
        assert!(!c.end_frame());
        assert!(c.draws().is_empty());
        assert_eq!(c.state(), FrameState::Destroyed);
    }
}
