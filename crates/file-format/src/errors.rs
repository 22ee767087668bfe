use std::path::PathBuf;

use chamber_kernel::KernelError;

/// Errors while writing the output artefacts of one model run.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("STL error: {reason}")]
    Stl { reason: String },

    #[error("part '{part}' meshed to no triangles")]
    EmptyMesh { part: String },
}

impl OutputError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| OutputError::Io { path, source }
    }
}
