//! Upload engine: sequential chunked uploads and single-request direct
//! uploads, plus the `Uploader` entry point that ties them to a config.

use tokio::sync::mpsc;

use crate::api::http::HttpUploadApi;
use crate::api::{ChunkUploadParams, SingleUploadParams, UploadApi};
use crate::config::UploaderConfig;
use crate::models::file::FileEntry;
use crate::models::upload::{UploadOptions, UploadResponse, UploadResult};
use crate::services::chunk_manager;
use crate::services::progress::{self, ProgressReporter};
use crate::services::retry_engine::{self, RetryPolicy};

/// Caller-supplied progress callback receiving integer percentages.
pub type ProgressCallback<'a> = &'a mut (dyn FnMut(u8) + Send);

/// Upload a file in fixed-size chunks, one at a time.
///
/// Each chunk is retried per `policy`; any terminal chunk failure aborts the
/// whole upload. Only the response to the last chunk is kept, and it must
/// carry a path.
pub async fn upload_chunked<A: UploadApi>(
    api: &A,
    policy: &RetryPolicy,
    chunk_size: u64,
    file: &FileEntry,
    access_token: &str,
    on_progress: Option<ProgressCallback<'_>>,
    options: &UploadOptions,
) -> crate::error::Result<UploadResult> {
    let session = chunk_manager::start_session(file, chunk_size)?;
    log::info!(
        "Starting chunked upload: file='{}', size={}, chunks={}, identifier={}",
        file.file_name,
        session.file_size,
        session.total_chunks,
        session.identifier
    );

    let mut reporter = ProgressReporter::new(on_progress);
    let mut last_response: Option<UploadResponse> = None;

    for range in chunk_manager::plan_chunks(session.file_size, session.chunk_size)? {
        let data = chunk_manager::read_chunk_data(&file.file_path, range).await?;

        let resp = retry_engine::retry_upload_chunk(policy, range.chunk_index, || {
            api.upload_chunk(ChunkUploadParams {
                data: data.clone(),
                identifier: session.identifier.clone(),
                chunk_index: range.chunk_index,
                total_chunks: session.total_chunks,
                access_token: access_token.to_string(),
                options: options.clone(),
            })
        })
        .await
        .inspect_err(|e| log::error!("Upload failed for file '{}': {}", file.file_name, e))?;

        log::debug!(
            "Chunk uploaded: chunk_index={}/{}, bytes={}",
            range.chunk_index,
            session.total_chunks,
            range.len()
        );
        reporter.report(progress::chunk_percent(
            range.chunk_index + 1,
            session.total_chunks,
        ));
        last_response = Some(resp);
    }

    let result = UploadResult::try_from(last_response.unwrap_or_default())
        .inspect_err(|e| log::error!("Upload failed for file '{}': {}", file.file_name, e))?;
    log::info!(
        "Chunked upload completed: file='{}', path={}",
        file.file_name,
        result.path
    );
    Ok(result)
}

/// Upload a whole file in a single request, without retry.
///
/// Progress follows the bytes streamed to the transport.
pub async fn upload_direct<A: UploadApi>(
    api: &A,
    file: &FileEntry,
    access_token: &str,
    on_progress: Option<ProgressCallback<'_>>,
    options: &UploadOptions,
) -> crate::error::Result<UploadResult> {
    log::info!(
        "Starting direct upload: file='{}', size={}",
        file.file_name,
        file.file_size
    );

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<u64>();
    let mut reporter = ProgressReporter::new(on_progress);
    let total = file.file_size;

    let request = api.upload_single(
        SingleUploadParams {
            file: file.clone(),
            access_token: access_token.to_string(),
            options: options.clone(),
        },
        progress_tx,
    );
    tokio::pin!(request);

    let response = loop {
        tokio::select! {
            result = &mut request => break result,
            Some(loaded) = progress_rx.recv() => {
                reporter.report(progress::byte_percent(loaded, total));
            }
        }
    };
    while let Ok(loaded) = progress_rx.try_recv() {
        reporter.report(progress::byte_percent(loaded, total));
    }

    let result = response
        .and_then(UploadResult::try_from)
        .inspect_err(|e| log::error!("Direct upload failed for file '{}': {}", file.file_name, e))?;
    log::info!(
        "Direct upload completed: file='{}', path={}",
        file.file_name,
        result.path
    );
    Ok(result)
}

/// Upload client bound to one configuration and backend.
pub struct Uploader<A = HttpUploadApi> {
    config: UploaderConfig,
    api: A,
}

impl Uploader<HttpUploadApi> {
    pub fn new(config: UploaderConfig) -> crate::error::Result<Self> {
        let api = HttpUploadApi::new(&config)?;
        Ok(Self { config, api })
    }

    /// Build an uploader from `API_URL` and friends, see [`UploaderConfig::from_env`].
    pub fn from_env() -> crate::error::Result<Self> {
        Self::new(UploaderConfig::from_env())
    }
}

impl<A: UploadApi> Uploader<A> {
    pub fn with_api(config: UploaderConfig, api: A) -> Self {
        Self { config, api }
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    pub async fn upload_chunked(
        &self,
        file: &FileEntry,
        access_token: &str,
        on_progress: Option<ProgressCallback<'_>>,
        options: &UploadOptions,
    ) -> crate::error::Result<UploadResult> {
        upload_chunked(
            &self.api,
            &self.config.retry,
            self.config.chunk_size,
            file,
            access_token,
            on_progress,
            options,
        )
        .await
    }

    pub async fn upload_direct(
        &self,
        file: &FileEntry,
        access_token: &str,
        on_progress: Option<ProgressCallback<'_>>,
        options: &UploadOptions,
    ) -> crate::error::Result<UploadResult> {
        upload_direct(&self.api, file, access_token, on_progress, options).await
    }
}
