//! HttpUploadApi: reqwest implementation of the `UploadApi` trait.
//!
//! Sends multipart POST requests with bearer authorization to the chunked
//! and single-request upload endpoints.

use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::io::ReaderStream;

use super::{ChunkUploadParams, SingleUploadParams, UploadApi};
use crate::config::UploaderConfig;
use crate::error::AppError;
use crate::models::upload::{MetaData, UploadOptions, UploadResponse};

const USER_AGENT: &str = concat!("chunk-uploader/", env!("CARGO_PKG_VERSION"));
const OCTET_STREAM: &str = "application/octet-stream";

pub struct HttpUploadApi {
    client: reqwest::Client,
    chunk_url: String,
    single_url: String,
}

impl HttpUploadApi {
    pub fn new(config: &UploaderConfig) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            chunk_url: config.chunk_upload_url(),
            single_url: config.single_upload_url(),
        })
    }

    /// Build the error for a non-success response from its status and body.
    pub(crate) fn status_error(status: u16, body: &str) -> AppError {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                ["message", "error"]
                    .iter()
                    .find_map(|key| v[*key].as_str().map(str::to_string))
            })
            .filter(|m| !m.is_empty());
        AppError::Status { status, message }
    }

    /// Parse a success body.
    ///
    /// Every 2xx is a success whatever its body says. Known fields are picked
    /// out of a JSON object; a body that is not JSON, or a field of an
    /// unexpected type, leaves that part of the response empty.
    pub(crate) fn parse_success_body(body: &str) -> UploadResponse {
        let value = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => value,
            Err(e) => {
                if !body.trim().is_empty() {
                    log::debug!("Upload response body is not JSON: {}", e);
                }
                return UploadResponse::default();
            }
        };

        let text = |key: &str| value[key].as_str().map(str::to_string);
        let status = match &value["status"] {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        };
        UploadResponse {
            path: text("path"),
            status,
            message: text("message"),
            meta_data: serde_json::from_value::<MetaData>(value["metaData"].clone()).ok(),
        }
    }

    async fn read_response(resp: reqwest::Response) -> crate::error::Result<UploadResponse> {
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Self::status_error(status.as_u16(), &body));
        }
        Ok(Self::parse_success_body(&body))
    }
}

fn with_options(mut form: Form, options: &UploadOptions) -> Form {
    for (name, value) in options.form_fields() {
        form = form.text(name, value);
    }
    form
}

impl UploadApi for HttpUploadApi {
    async fn upload_chunk(&self, params: ChunkUploadParams) -> crate::error::Result<UploadResponse> {
        let len = params.data.len() as u64;
        let form = Form::new()
            .part(
                "chunk",
                Part::stream_with_length(params.data, len)
                    .file_name("blob")
                    .mime_str(OCTET_STREAM)
                    .map_err(|e| AppError::Internal(format!("MIME parse error: {}", e)))?,
            )
            .text("identifier", params.identifier)
            .text("totalChunks", params.total_chunks.to_string())
            .text("currentChunk", params.chunk_index.to_string());
        let form = with_options(form, &params.options);

        let resp = self
            .client
            .post(&self.chunk_url)
            .bearer_auth(&params.access_token)
            .multipart(form)
            .send()
            .await?;
        Self::read_response(resp).await
    }

    async fn upload_single(
        &self,
        params: SingleUploadParams,
        progress: UnboundedSender<u64>,
    ) -> crate::error::Result<UploadResponse> {
        let file = tokio::fs::File::open(&params.file.file_path).await?;
        let mut loaded: u64 = 0;
        let stream = ReaderStream::new(file).map(move |piece| {
            if let Ok(bytes) = &piece {
                loaded += bytes.len() as u64;
                let _ = progress.send(loaded);
            }
            piece
        });

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), params.file.file_size)
            .file_name(params.file.file_name.clone())
            .mime_str(OCTET_STREAM)
            .map_err(|e| AppError::Internal(format!("MIME parse error: {}", e)))?;
        let form = with_options(Form::new().part("file", part), &params.options);

        let resp = self
            .client
            .post(&self.single_url)
            .bearer_auth(&params.access_token)
            .multipart(form)
            .send()
            .await?;
        Self::read_response(resp).await
    }
}
