#[derive(Debug, thiserror::Error)]
pub enum GifawayError {
    #[error("A capture run is already active")]
    RunActive,

    #[error("Frame unavailable: {0}")]
    FrameUnavailable(String),

    #[error("Invalid still image: {0}")]
    InvalidStill(String),

    #[error("GIF encoding failed: {0}")]
    EncodeFailed(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}
