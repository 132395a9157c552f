use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::coords::Mat4;

use super::reflect::{reflect_stage, StageReflection};
use super::stage::{compile_stage, read_stage};
use super::{ShaderError, StageKind, StageSource, UniformBlock, UniformValue};

static NEXT_PROGRAM_ID: AtomicU32 = AtomicU32::new(1);

/// Handle of a linked shader program. Never zero; an unlinked program has no id.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ProgramId(NonZeroU32);

impl ProgramId {
    fn next() -> Self {
        let raw = NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed);
        // The counter starts at 1; wrapping past u32::MAX would need four billion programs.
        Self(NonZeroU32::new(raw).unwrap_or(NonZeroU32::MIN))
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "program#{}", self.0)
    }
}

/// A linked vertex + fragment program with a CPU-side uniform staging block.
///
/// Uniform setters never fail: a name that is not an active member of the
/// uniform block, or a value of the wrong type, is ignored (trace-logged),
/// mirroring how graphics APIs treat unknown uniform locations.
#[derive(Debug)]
pub struct ShaderProgram {
    id: ProgramId,
    label: String,
    vertex: StageSource,
    fragment: StageSource,
    uniforms: Option<UniformBlock>,
    staging: Vec<u8>,
    samples_texture: bool,
    vertex_inputs: BTreeSet<u32>,
}

impl ShaderProgram {
    /// Reads, compiles and links a program from two WGSL files.
    ///
    /// Failures are logged with the failing stage and diagnostic, then returned.
    pub fn from_files(
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let (vp, fp) = (vertex_path.as_ref(), fragment_path.as_ref());

        let result = read_stage(StageKind::Vertex, vp).and_then(|vs| {
            let fs = read_stage(StageKind::Fragment, fp)?;
            Self::link(
                (&vp.display().to_string(), vs),
                (&fp.display().to_string(), fs),
            )
        });

        result.inspect_err(|e| log::error!("{e}"))
    }

    /// Compiles and links a program from in-memory WGSL sources.
    ///
    /// `*_origin` names each source in diagnostics.
    pub fn from_sources(
        vertex_origin: &str,
        vertex_text: &str,
        fragment_origin: &str,
        fragment_text: &str,
    ) -> Result<Self, ShaderError> {
        Self::link(
            (vertex_origin, vertex_text.to_string()),
            (fragment_origin, fragment_text.to_string()),
        )
        .inspect_err(|e| log::error!("{e}"))
    }

    fn link(vs: (&str, String), fs: (&str, String)) -> Result<Self, ShaderError> {
        let (vs_origin, vs_text) = vs;
        let (fs_origin, fs_text) = fs;
        let label = format!("{vs_origin} + {fs_origin}");

        let vs_module = compile_stage(StageKind::Vertex, vs_origin, &vs_text)?;
        let fs_module = compile_stage(StageKind::Fragment, fs_origin, &fs_text)?;

        let link_err = |message: String| ShaderError::Link {
            label: label.clone(),
            message,
        };

        let vr = reflect_stage(&vs_module, StageKind::Vertex).map_err(link_err)?;
        let fr = reflect_stage(&fs_module, StageKind::Fragment).map_err(link_err)?;

        let missing: Vec<String> = fr
            .inputs
            .difference(&vr.outputs)
            .map(|l| format!("@location({l})"))
            .collect();
        if !missing.is_empty() {
            return Err(link_err(format!(
                "fragment input {} not written by the vertex stage",
                missing.join(", ")
            )));
        }

        let StageReflection {
            entry_point: vs_entry,
            uniform_block: vs_block,
            samples_texture: vs_tex,
            inputs: vertex_inputs,
            ..
        } = vr;
        let StageReflection {
            entry_point: fs_entry,
            uniform_block: fs_block,
            samples_texture: fs_tex,
            ..
        } = fr;

        let uniforms = match (vs_block, fs_block) {
            (None, None) => None,
            (Some(b), None) | (None, Some(b)) => Some(b),
            (Some(a), Some(b)) if a == b => Some(a),
            (Some(_), Some(_)) => {
                return Err(link_err(
                    "uniform block is declared differently by the vertex and fragment stages".into(),
                ));
            }
        };

        let staging = vec![0u8; uniforms.as_ref().map_or(0, |b| b.size as usize)];
        let id = ProgramId::next();

        log::debug!(
            "linked {id} ({label}): {} uniform member(s), texture: {}",
            uniforms.as_ref().map_or(0, |b| b.members.len()),
            vs_tex || fs_tex,
        );

        Ok(Self {
            id,
            label,
            vertex: StageSource {
                kind: StageKind::Vertex,
                origin: vs_origin.to_string(),
                entry_point: vs_entry,
                text: vs_text,
            },
            fragment: StageSource {
                kind: StageKind::Fragment,
                origin: fs_origin.to_string(),
                entry_point: fs_entry,
                text: fs_text,
            },
            uniforms,
            staging,
            samples_texture: vs_tex || fs_tex,
            vertex_inputs,
        })
    }

    #[inline]
    pub fn id(&self) -> ProgramId {
        self.id
    }

    /// Human-readable `"<vertex origin> + <fragment origin>"`.
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn stage(&self, kind: StageKind) -> &StageSource {
        match kind {
            StageKind::Vertex => &self.vertex,
            StageKind::Fragment => &self.fragment,
        }
    }

    #[inline]
    pub fn uniform_block(&self) -> Option<&UniformBlock> {
        self.uniforms.as_ref()
    }

    /// Current contents of the uniform staging block.
    #[inline]
    pub fn uniform_bytes(&self) -> &[u8] {
        &self.staging
    }

    /// Whether the program samples a texture at `@group(1)`.
    #[inline]
    pub fn samples_texture(&self) -> bool {
        self.samples_texture
    }

    /// Vertex attribute `@location`s the vertex stage reads.
    pub fn vertex_inputs(&self) -> &BTreeSet<u32> {
        &self.vertex_inputs
    }

    /// Writes `value` into the uniform member called `name`.
    pub fn set_uniform<T: UniformValue>(&mut self, name: &str, value: T) {
        let Some(member) = self.uniforms.as_ref().and_then(|b| b.member(name)) else {
            log::trace!("{}: uniform `{name}` is not active; ignored", self.id);
            return;
        };
        if member.kind != T::KIND {
            log::trace!(
                "{}: uniform `{name}` is {:?}, got {:?}; ignored",
                self.id,
                member.kind,
                T::KIND
            );
            return;
        }

        let start = member.offset as usize;
        let end = start + T::KIND.size() as usize;
        value.write(&mut self.staging[start..end]);
    }

    /// Reads back the staged value of `name`, if it exists with type `T`.
    pub fn uniform<T: UniformValue>(&self, name: &str) -> Option<T> {
        let member = self.uniforms.as_ref()?.member(name)?;
        if member.kind != T::KIND {
            return None;
        }
        let start = member.offset as usize;
        Some(T::read(&self.staging[start..start + T::KIND.size() as usize]))
    }

    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.set_uniform(name, value);
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        self.set_uniform(name, value);
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.set_uniform(name, value);
    }

    pub fn set_vec2(&mut self, name: &str, x: f32, y: f32) {
        self.set_uniform(name, [x, y]);
    }

    pub fn set_vec3(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.set_uniform(name, [x, y, z]);
    }

    pub fn set_vec4(&mut self, name: &str, x: f32, y: f32, z: f32, w: f32) {
        self.set_uniform(name, [x, y, z, w]);
    }

    pub fn set_mat4(&mut self, name: &str, value: &Mat4) {
        self.set_uniform(name, *value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = r#"
struct Globals {
    model: mat4x4<f32>,
    color: vec4<f32>,
    flags: i32,
};
@group(0) @binding(0) var<uniform> globals: Globals;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) tint: vec4<f32>,
};

@vertex
fn vs_main(@location(0) pos: vec2<f32>) -> VsOut {
    var out: VsOut;
    out.pos = globals.model * vec4<f32>(pos, 0.0, 1.0);
    out.tint = globals.color;
    return out;
}
"#;

    const FS: &str = r#"
@fragment
fn fs_main(@location(0) tint: vec4<f32>) -> @location(0) vec4<f32> {
    return tint;
}
"#;

    fn program() -> ShaderProgram {
        ShaderProgram::from_sources("vs", VS, "fs", FS).expect("program links")
    }

    #[test]
    fn reflects_uniform_members() {
        let p = program();
        let block = p.uniform_block().expect("uniform block");
        assert_eq!(block.member("model").map(|m| m.offset), Some(0));
        assert_eq!(block.member("color").map(|m| m.offset), Some(64));
        assert_eq!(block.member("flags").map(|m| m.offset), Some(80));
        assert_eq!(p.uniform_bytes().len(), block.size as usize);
        assert_eq!(p.stage(StageKind::Vertex).entry_point, "vs_main");
        assert_eq!(p.stage(StageKind::Fragment).entry_point, "fs_main");
        assert!(!p.samples_texture());
    }

    #[test]
    fn set_uniform_writes_staging_bytes() {
        let mut p = program();
        p.set_vec4("color", 1.0, 1.0, 0.0, 1.0);
        p.set_bool("flags", true);
        let m = Mat4::from_translation(0.5, 0.25, 0.0);
        p.set_mat4("model", &m);

        assert_eq!(p.uniform::<[f32; 4]>("color"), Some([1.0, 1.0, 0.0, 1.0]));
        assert_eq!(p.uniform::<i32>("flags"), Some(1));
        assert_eq!(p.uniform::<Mat4>("model"), Some(m));
    }

    #[test]
    fn unknown_or_mistyped_uniform_is_a_no_op() {
        let mut p = program();
        let before = p.uniform_bytes().to_vec();
        p.set_float("does_not_exist", 3.0);
        p.set_float("color", 3.0);
        assert_eq!(p.uniform_bytes(), &before[..]);
    }

    #[test]
    fn program_ids_are_distinct_and_non_zero() {
        let a = program();
        let b = program();
        assert_ne!(a.id(), b.id());
        assert!(a.id().get() > 0);
    }

    #[test]
    fn compile_error_names_the_stage() {
        let err = ShaderProgram::from_sources("vs", "fn broken(", "fs", FS).unwrap_err();
        assert!(matches!(err, ShaderError::Compile { stage: StageKind::Vertex, .. }));
        let err = ShaderProgram::from_sources("vs", VS, "fs", "@fragment fn fs_main( {").unwrap_err();
        assert_eq!(err.stage(), Some(StageKind::Fragment));
    }

    #[test]
    fn unmatched_fragment_input_fails_to_link() {
        let fs = r#"
@fragment
fn fs_main(@location(3) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(uv, 0.0, 1.0);
}
"#;
        let err = ShaderProgram::from_sources("vs", VS, "fs", fs).unwrap_err();
        match err {
            ShaderError::Link { message, .. } => assert!(message.contains("@location(3)")),
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[test]
    fn missing_entry_point_fails_to_link() {
        let err = ShaderProgram::from_sources("vs", FS, "fs", FS).unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
    }

    #[test]
    fn conflicting_uniform_blocks_fail_to_link() {
        let fs = r#"
struct Other { tint: vec4<f32> };
@group(0) @binding(0) var<uniform> other: Other;

@fragment
fn fs_main(@location(0) tint: vec4<f32>) -> @location(0) vec4<f32> {
    return tint * other.tint;
}
"#;
        let err = ShaderProgram::from_sources("vs", VS, "fs", fs).unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = ShaderProgram::from_files("/nonexistent/vertex.wgsl", "/nonexistent/fragment.wgsl")
            .unwrap_err();
        assert!(matches!(err, ShaderError::Read { stage: StageKind::Vertex, .. }));
    }
}
