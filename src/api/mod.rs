//! Upload endpoint abstraction.
//!
//! `UploadApi` is the only interface through which the crate talks to the
//! upload backend. `services` call through this trait and never build HTTP
//! requests themselves, which also lets tests substitute a scripted backend.

use bytes::Bytes;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::AppError;
use crate::models::file::FileEntry;
use crate::models::upload::{UploadOptions, UploadResponse};

pub mod http;

/// One chunk request of a chunked upload.
#[derive(Debug, Clone)]
pub struct ChunkUploadParams {
    pub data: Bytes,
    pub identifier: String,
    pub chunk_index: u32,
    pub total_chunks: u32,
    pub access_token: String,
    pub options: UploadOptions,
}

/// The single request of a direct upload.
#[derive(Debug, Clone)]
pub struct SingleUploadParams {
    pub file: FileEntry,
    pub access_token: String,
    pub options: UploadOptions,
}

pub trait UploadApi: Send + Sync {
    /// Upload one chunk to the chunked upload endpoint.
    ///
    /// Intermediate chunks normally get an empty response; the response to the
    /// last chunk carries the stored path and extracted metadata.
    fn upload_chunk(
        &self,
        params: ChunkUploadParams,
    ) -> impl std::future::Future<Output = std::result::Result<UploadResponse, AppError>> + Send;

    /// Upload a whole file in one request.
    ///
    /// The cumulative number of body bytes handed to the transport is sent on
    /// `progress` as the upload proceeds.
    fn upload_single(
        &self,
        params: SingleUploadParams,
        progress: UnboundedSender<u64>,
    ) -> impl std::future::Future<Output = std::result::Result<UploadResponse, AppError>> + Send;
}
