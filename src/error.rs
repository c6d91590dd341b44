/// Errors raised while building long-lived rendering resources.
/// The per-frame pipeline itself never fails: degenerate input is skipped.
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("invalid camera: {0}")]
    InvalidCamera(String),

    #[error("texture atlas has no tiles")]
    EmptyAtlas,

    #[error("tile `{name}` has {actual} pixels, expected {expected}")]
    TileSizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("image of {width}x{height} needs {expected} pixels, got {actual}")]
    ImageSizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("framebuffer dimensions must be non-zero (got {width}x{height})")]
    EmptyFramebuffer { width: usize, height: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
