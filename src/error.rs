// error.rs: errors raised while loading assets and config

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("mask is {mask_w}x{mask_h} but image is {image_w}x{image_h}")]
    DimensionMismatch {
        image_w: u32,
        image_h: u32,
        mask_w: u32,
        mask_h: u32,
    },

    #[error("loader thread exited without a result")]
    LoaderGone,
}

pub type Result<T> = std::result::Result<T, ViewerError>;
