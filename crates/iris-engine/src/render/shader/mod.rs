//! Shader programs.
//!
//! A program is a vertex + fragment WGSL source pair. Each stage is parsed and
//! validated on its own, then the pair is linked: the fragment inputs must be
//! produced by the vertex stage and both stages must agree on the uniform block.
//! Reflection of that block gives named uniform setters on top of a CPU staging
//! buffer; the renderer snapshots the staging bytes for every draw.
//!
//! Binding model shared by all programs:
//! - `@group(0) @binding(0)`: the program's uniform block (optional)
//! - `@group(1) @binding(0)`: sampled 2D texture (texture unit 0, optional)
//! - `@group(1) @binding(1)`: filtering sampler for that texture

mod error;
mod program;
mod reflect;
mod stage;
mod uniform;

pub use error::ShaderError;
pub use program::{ProgramId, ShaderProgram};
pub use reflect::{UniformBlock, UniformKind, UniformMember};
pub use stage::{StageKind, StageSource};
pub use uniform::UniformValue;

/// Bind group index of the uniform block.
pub const UNIFORM_GROUP: u32 = 0;
/// Bind group index of the texture + sampler pair.
pub const TEXTURE_GROUP: u32 = 1;
