use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while decompiling a model, per the fatal
/// half of the taxonomy. Warnings (invalid hitbox count, custom activity
/// ids, unsupported foot pivots, nonzero `$flags`) are not modeled as
/// errors; they are logged via `log::warn!` and decoding continues.
#[derive(Debug, Error)]
pub enum DecompileError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} does not have a .mdl extension")]
    BadExtension { path: PathBuf },

    #[error("{path} is not a main HL model file")]
    NotMainFile { path: PathBuf },

    #[error("{path} is not a valid HL model file")]
    BadMagic { path: PathBuf },

    #[error("{path} has unknown Studio MDL format version")]
    BadVersion { path: PathBuf },

    #[error("{path} is not a valid sequence file")]
    NotSequenceFile { path: PathBuf },

    #[error("could not find external file {path} referenced by the model")]
    ExternalMissing { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, DecompileError>;

pub(crate) trait IoContext<T> {
    fn with_path(self, path: &std::path::Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn with_path(self, path: &std::path::Path) -> Result<T> {
        self.map_err(|source| DecompileError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
