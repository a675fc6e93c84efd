use thiserror::Error;

/// Failures reported by a [`RenderBackend`](super::RenderBackend).
///
/// These only occur during setup or resource creation; per-frame operations
/// never fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// No usable GPU context could be obtained from the surface.
    #[error("no suitable GPU context: {0}")]
    Context(String),

    /// The sprite program failed to compile or link.
    #[error("sprite program failed to compile: {0}")]
    ShaderCompile(String),

    #[error("buffer allocation failed: {0}")]
    Allocation(String),

    /// Vertex streams were missing or malformed when the program was built.
    #[error("invalid vertex stream binding: {0}")]
    Binding(String),

    #[error("texture upload failed: {0}")]
    Texture(String),
}

/// Errors surfaced by [`SpriteBatchRenderer`](super::SpriteBatchRenderer).
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("sprite renderer is not initialized")]
    NotInitialized,

    #[error("invalid texture image: {0}")]
    InvalidImage(String),
}
