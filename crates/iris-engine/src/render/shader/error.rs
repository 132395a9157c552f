use std::path::PathBuf;

use super::StageKind;

/// Failure to build a [`ShaderProgram`](super::ShaderProgram).
///
/// Every variant names the failing step; compile and link variants carry the
/// compiler/linker diagnostic verbatim.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("could not open {stage} shader file `{}`", path.display())]
    Read {
        stage: StageKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} shader file `{}` is empty", path.display())]
    Empty { stage: StageKind, path: PathBuf },

    #[error("{stage} shader compilation failed ({origin}):\n{message}")]
    Compile {
        stage: StageKind,
        origin: String,
        message: String,
    },

    #[error("shader program linking failed ({label}): {message}")]
    Link { label: String, message: String },
}

impl ShaderError {
    /// Stage the error is attributed to. Link errors span both stages.
    pub fn stage(&self) -> Option<StageKind> {
        match self {
            ShaderError::Read { stage, .. }
            | ShaderError::Empty { stage, .. }
            | ShaderError::Compile { stage, .. } => Some(*stage),
            ShaderError::Link { .. } => None,
        }
    }
}
