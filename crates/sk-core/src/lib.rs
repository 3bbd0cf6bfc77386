pub mod assets;
pub mod config;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod model;
pub mod notice;
pub mod topology;

pub use assets::{AssetFetcher, AssetStore, MemoryAssetStore, load_model_asset};
pub use config::{EngineConfig, ModelAsset};
pub use detection::{DetectionTicket, DetectorKind, DetectorStatus, LandmarkDetector};
pub use error::{AssetError, DetectionError, GeometryError};
pub use geometry::{CanvasSize, Fit, fit_image_to_container, rescale_factor};
pub use model::*;
pub use notice::{Notice, NoticeLevel, NoticeLog};

// Re-export so downstream crates share one image type
pub use image::RgbaImage;
