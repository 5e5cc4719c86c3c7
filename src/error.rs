//! Error types shared by the demos.

/// Errors that can occur while loading config, opening windows or writing images.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// Failed to read the world config file from disk.
    #[error("failed to read config: {0}")]
    ConfigRead(#[source] std::io::Error),

    /// Failed to parse the world config JSON.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),

    /// Config parsed but holds values the generators cannot use.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Window creation or presentation failed.
    #[error("window error: {0}")]
    Window(#[from] minifb::Error),

    /// Failed to encode or write an image.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, DemoError>;
