use std::fmt;
use std::path::Path;

use super::ShaderError;

/// Pipeline stage of a shader source.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    /// Upper-case label used in diagnostics.
    pub const fn label(self) -> &'static str {
        match self {
            StageKind::Vertex => "VERTEX",
            StageKind::Fragment => "FRAGMENT",
        }
    }

    pub(super) const fn naga_stage(self) -> naga::ShaderStage {
        match self {
            StageKind::Vertex => naga::ShaderStage::Vertex,
            StageKind::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated WGSL stage, kept as text for GPU module creation.
#[derive(Debug, Clone)]
pub struct StageSource {
    pub kind: StageKind,
    /// Where the text came from (file path or caller-supplied name).
    pub origin: String,
    /// Name of the stage's entry point function.
    pub entry_point: String,
    pub text: String,
}

pub(super) fn read_stage(kind: StageKind, path: &Path) -> Result<String, ShaderError> {
    let text = std::fs::read_to_string(path).map_err(|source| ShaderError::Read {
        stage: kind,
        path: path.to_path_buf(),
        source,
    })?;

    if text.trim().is_empty() {
        return Err(ShaderError::Empty {
            stage: kind,
            path: path.to_path_buf(),
        });
    }

    Ok(text)
}

/// Parses and validates one stage in isolation.
pub(super) fn compile_stage(
    kind: StageKind,
    origin: &str,
    text: &str,
) -> Result<naga::Module, ShaderError> {
    let compile_err = |message: String| ShaderError::Compile {
        stage: kind,
        origin: origin.to_string(),
        message,
    };

    let module = naga::front::wgsl::parse_str(text).map_err(|e| compile_err(e.emit_to_string(text)))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| compile_err(e.emit_to_string(text)))?;

    Ok(module)
}
