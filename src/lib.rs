//! Chunked and direct file upload client.
//!
//! [`Uploader::upload_chunked`] sends a file as sequential 1 MiB chunks with
//! per-chunk retry and backoff; [`Uploader::upload_direct`] sends it in one
//! request. Both report integer progress percentages and return the server's
//! [`UploadResult`].

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::UploaderConfig;
pub use error::{AppError, Result};
pub use models::file::FileEntry;
pub use models::upload::{MetaData, Resolution, UploadOptions, UploadResult};
pub use services::upload_engine::Uploader;
