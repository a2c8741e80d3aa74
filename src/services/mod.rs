//! Upload logic.
//!
//! Chunk planning, progress accounting, retry with backoff and the upload
//! engine that drives them. HTTP interaction is delegated to the `api` layer.

pub mod chunk_manager;
pub mod progress;
pub mod retry_engine;
pub mod upload_engine;
