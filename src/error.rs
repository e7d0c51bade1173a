//! Errors raised while building the rendering pipeline.
//!
//! Per-frame rendering itself is infallible: degenerate or out-of-range
//! geometry is filtered, not reported.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid output resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("failed to spawn render worker {index}")]
    WorkerSpawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },
}
