//! Errors reported outside the per-step assembly path.

use thiserror::Error;

/// Invalid world-level contact defaults or step timing.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("error reduction parameter must lie in [0, 1], got {0}")]
    InvalidErp(f32),
    #[error("constraint force mixing must be finite and non-negative, got {0}")]
    InvalidCfm(f32),
    #[error("minimum contact depth must be finite and non-negative, got {0}")]
    InvalidMinDepth(f32),
    #[error("maximum correcting velocity must be non-negative, got {0}")]
    InvalidMaxCorrectingVelocity(f32),
    #[error("step frequency must be finite and positive, got {0}")]
    InvalidStepFrequency(f32),
}

/// Failure to export assembled rows into caller-provided flat buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RowBufferError {
    #[error("row stride {rowskip} cannot hold a 3-component block")]
    StrideTooSmall { rowskip: usize },
    #[error("{buffer} buffer holds {len} values but {required} are needed")]
    BufferTooShort {
        buffer: &'static str,
        len: usize,
        required: usize,
    },
    #[error("rows reference a second body but no body B buffers were supplied")]
    MissingBodyB,
}
