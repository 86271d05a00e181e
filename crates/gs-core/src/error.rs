use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Invalid width/height dimensions.
    #[error("Invalid dimensions: {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Two buffers that must share dimensions do not.
    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// (width, height) the operation expected.
        expected: (u32, u32),
        /// (width, height) it received.
        actual: (u32, u32),
    },

    /// Raw sample buffer length disagrees with `width × height × channels`.
    #[error("Buffer length {actual} does not match {width}×{height}×{channels} = {expected}")]
    BufferLength {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
        /// Channel count.
        channels: usize,
        /// Expected length.
        expected: usize,
        /// Provided length.
        actual: usize,
    },

    /// Malformed `RRGGBBAA` color.
    #[error("Invalid color '{input}': expected 8 hex digits RRGGBBAA")]
    InvalidColor {
        /// The rejected input.
        input: String,
    },

    /// A working buffer could not be allocated. Fatal for the run.
    #[error("Could not allocate memory ({bytes} bytes)")]
    OutOfMemory {
        /// Requested allocation size.
        bytes: usize,
    },
}
