//! Data models shared across the crate: the source file, upload options,
//! the in-memory upload session and the server's response shapes.

pub mod file;
pub mod upload;
