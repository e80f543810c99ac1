//! Error types.
//!
//! Everything here is fatal at startup: the window, the GPU and the shader
//! text either come up or the program stops. Per-frame surface errors are
//! handled in the event loop and never surface as these types.

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support.")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The adapter reports no usable format for the window surface.
    #[error("The GPU adapter cannot present to this window")]
    UnsupportedSurface,
    /// The compositing pipeline was rejected by the device.
    #[error("Failed to create compositing pipeline: {0}")]
    CompositePipeline(String),
}

/// Errors that stop the application before or while it starts.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to create event loop.
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// A block of compositor shader text is empty.
    #[error("Compositor {0} shader text is missing")]
    MissingShader(&'static str),
    /// The compositor shader text is not a usable WGSL module.
    #[error("Compositor shader is invalid: {0}")]
    InvalidShader(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_missing_shader_message() {
        let err = AppError::MissingShader("fragment");
        assert_eq!(err.to_string(), "Compositor fragment shader text is missing");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_invalid_shader_message() {
        let err = AppError::InvalidShader("no Fragment entry point named `fs_main`".into());
        assert_eq!(
            err.to_string(),
            "Compositor shader is invalid: no Fragment entry point named `fs_main`"
        );
    }

    #[test]
    fn test_gpu_error_wraps() {
        let err: AppError = GpuError::NoAdapter.into();
        assert!(err.to_string().starts_with("GPU error: No compatible GPU adapter"));
        assert!(err.source().is_some());
    }
}
