use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetouchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Invalid geometry: {0}")]
    Geometry(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Request failed: {0}")]
    Network(String),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("No image loaded")]
    NoImage,
}

pub type Result<T> = std::result::Result<T, RetouchError>;
