//! Error types for the galaxy generator.
//!
//! Numerical trouble inside the samplers and the raymarcher is never an
//! error: denominators are clamped and non-finite values are sanitized in
//! place. The types here cover configuration, the background field build,
//! GPU initialization and image output.

use thiserror::Error;

/// Errors produced while loading or validating [`GalaxyParams`](crate::params::GalaxyParams).
#[derive(Debug, Error)]
pub enum ParamError {
    /// A field holds a value outside its accepted range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Human readable explanation.
        reason: String,
    },
    /// A colour string is not of the form `#rrggbb`.
    #[error("invalid colour `{0}`, expected #rrggbb")]
    Color(String),
    /// The JSON preset could not be parsed.
    #[error("failed to parse galaxy parameters: {0}")]
    Json(#[from] serde_json::Error),
    /// The preset file could not be read.
    #[error("failed to read galaxy parameters: {0}")]
    Io(#[from] std::io::Error),
}

impl ParamError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ParamError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors from the background density-field build.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The build thread could not be started.
    #[error("failed to spawn density field build thread: {0}")]
    Spawn(#[source] std::io::Error),
    /// The build was superseded by a newer request.
    #[error("density field build was cancelled")]
    Cancelled,
    /// The build thread went away without sending a result.
    #[error("density field build thread exited without a result")]
    Disconnected,
    /// A finished build holds the wrong number of values for its grid.
    #[error("density field holds {actual} values, grid needs {expected}")]
    FieldSize {
        /// `grid_size³ * 2`.
        expected: usize,
        /// Length of the returned data.
        actual: usize,
    },
}

/// Errors from creating or updating a [`Galaxy`](crate::galaxy::Galaxy).
#[derive(Debug, Error)]
pub enum GalaxyError {
    /// The parameters were rejected; nothing was changed.
    #[error(transparent)]
    Params(#[from] ParamError),
    /// Clusters and stars were regenerated but the density field build could
    /// not start. The previously published field stays in use.
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found; a Vulkan, Metal, DX12 or WebGPU capable device is required")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
}

/// Errors that can occur while producing an image on the CPU.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Colour and depth buffers do not match the requested frame size.
    #[error("buffer holds {actual} pixels, frame needs {expected}")]
    BufferSize {
        /// `width * height`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },
    /// Image encoding failed.
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors that can occur when running the interactive viewer.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Failed to create event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// The galaxy could not be generated.
    #[error(transparent)]
    Galaxy(#[from] GalaxyError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_param_message() {
        let err = ParamError::invalid("spiral_arms", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid value for `spiral_arms`: must be at least 1"
        );
    }

    #[test]
    fn test_galaxy_error_keeps_source_message() {
        let err = GalaxyError::from(BuildError::Spawn(std::io::Error::other("out of threads")));
        assert!(err.to_string().contains("out of threads"));
        let err = GalaxyError::from(ParamError::Color("red".into()));
        assert!(matches!(err, GalaxyError::Params(_)));
    }

    #[test]
    fn test_buffer_size_message() {
        let err = RenderError::BufferSize {
            expected: 4,
            actual: 3,
        };
        assert!(err.to_string().contains("needs 4"));
    }
}
