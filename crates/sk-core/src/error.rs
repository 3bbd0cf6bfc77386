use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error(
        "non-positive dimensions: image {natural_w}x{natural_h}, container {container_w}x{container_h}"
    )]
    NonPositive {
        natural_w: f32,
        natural_h: f32,
        container_w: f32,
        container_h: f32,
    },

    #[error("non-finite value in fit computation")]
    NonFinite,

    #[error("no image loaded")]
    NoImage,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    #[error("landmark detector is not ready")]
    NotReady,

    #[error("no image loaded")]
    NoImage,

    #[error("landmark detection failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssetError {
    #[error("failed to fetch `{url}`: {reason}")]
    Fetch { url: String, reason: String },

    #[error("asset cache error: {0}")]
    Store(String),

    #[error("model asset `{0}` unavailable")]
    Unavailable(String),
}
