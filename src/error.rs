/// Result alias that carries the crate's [`FaceError`] type.
pub type Result<T> = std::result::Result<T, FaceError>;

/// Errors raised while setting up or presenting the face. The paint path
/// itself is infallible; everything here comes from the host surfaces.
#[derive(Debug, thiserror::Error)]
pub enum FaceError {
    #[error("font data could not be parsed")]
    Font,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Surface(#[from] pixels::Error),
    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error(transparent)]
    Window(#[from] winit::error::OsError),
}
