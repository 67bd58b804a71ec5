use std::path::PathBuf;

pub type LayerResult<T> = Result<T, LayerError>;

#[derive(thiserror::Error, Debug)]
pub enum LayerError {
    #[error("asset not found: '{}'", .0.display())]
    AssetNotFound(PathBuf),

    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unreadable media: {0}")]
    UnreadableMedia(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayerError {
    pub fn asset_not_found(path: impl Into<PathBuf>) -> Self {
        Self::AssetNotFound(path.into())
    }

    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn unreadable_media(msg: impl Into<String>) -> Self {
        Self::UnreadableMedia(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
