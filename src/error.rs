use std::io;
use thiserror::Error;

/// Failures while loading locations, landmass rings or settings.
///
/// Nothing inside the frame loop returns this; rendering problems degrade
/// the picture instead of surfacing an error.
#[derive(Debug, Error)]
pub enum GlobeError {
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("location {country:?}: {reason}")]
    InvalidLocation { country: String, reason: String },
    #[error("landmass has no ring with at least three points")]
    EmptyLandmass,
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
    #[error("http {url}: {reason}")]
    Http { url: String, reason: String },
    #[error("texture {source_name} exceeds {limit} bytes")]
    TextureTooLarge { source_name: String, limit: u64 },
    #[error("texture has no pixels")]
    EmptyTexture,
    #[error("texture load cancelled")]
    Cancelled,
}

impl From<GlobeError> for io::Error {
    fn from(err: GlobeError) -> Self {
        match err {
            GlobeError::Io(inner) => inner,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
