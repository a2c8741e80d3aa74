use serde::{Deserialize, Serialize};

/// Optional descriptive fields sent alongside the file.
///
/// Present fields go out with every chunk request, not only the first,
/// and with the direct upload request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub upload_type: Option<String>,
    pub artist_name: Option<String>,
    pub track_title: Option<String>,
    pub consent: bool,
}

impl UploadOptions {
    /// Multipart `(name, value)` pairs for the fields that are set.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(t) = &self.upload_type {
            fields.push(("type", t.clone()));
        }
        if let Some(a) = &self.artist_name {
            fields.push(("artistName", a.clone()));
        }
        if let Some(t) = &self.track_title {
            fields.push(("trackTitle", t.clone()));
        }
        if self.consent {
            fields.push(("consent", "true".to_string()));
        }
        fields
    }
}

/// One logical chunked transfer. Lives only for the duration of one upload call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    /// `<timestamp>-<sanitized file name>`; correlates chunks server-side.
    pub identifier: String,
    pub file_size: u64,
    pub chunk_size: u64,
    pub total_chunks: u32,
}

/// Half-open byte range `[start, end)` of the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub chunk_index: u32,
    pub start: u64,
    pub end: u64,
}

impl ChunkRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Properties the server extracts from the completed upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

/// JSON body returned by both upload endpoints.
///
/// Intermediate chunk responses usually carry none of these fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub meta_data: Option<MetaData>,
}

/// Terminal description of a completed upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub meta_data: Option<MetaData>,
}

impl TryFrom<UploadResponse> for UploadResult {
    type Error = crate::error::AppError;

    fn try_from(resp: UploadResponse) -> Result<Self, Self::Error> {
        let path = resp
            .path
            .filter(|p| !p.is_empty())
            .ok_or(crate::error::AppError::MissingPath)?;
        Ok(Self {
            path,
            status: resp.status,
            message: resp.message,
            meta_data: resp.meta_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_form_fields_empty_by_default() {
        assert!(UploadOptions::default().form_fields().is_empty());
    }

    #[test]
    fn test_form_fields_all_set() {
        let options = UploadOptions {
            upload_type: Some("audio".into()),
            artist_name: Some("Nina".into()),
            track_title: Some("Intro".into()),
            consent: true,
        };
        assert_eq!(
            options.form_fields(),
            vec![
                ("type", "audio".to_string()),
                ("artistName", "Nina".to_string()),
                ("trackTitle", "Intro".to_string()),
                ("consent", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_form_fields_consent_false_is_omitted() {
        let options = UploadOptions {
            upload_type: Some("cover".into()),
            ..Default::default()
        };
        assert_eq!(options.form_fields(), vec![("type", "cover".to_string())]);
    }

    #[test]
    fn test_response_final_chunk_parses_metadata() {
        let body = r#"{
            "path": "uploads/audio/abc.wav",
            "status": "duplicate",
            "message": "Similar track found",
            "metaData": {
                "duration": 183.4,
                "resolution": {"width": 3000, "height": 3000},
                "hash": "d41d8cd9",
                "fingerprint": "AQADtE"
            },
            "extra": 1
        }"#;
        let resp: UploadResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.path.as_deref(), Some("uploads/audio/abc.wav"));
        assert_eq!(resp.status.as_deref(), Some("duplicate"));
        let meta = resp.meta_data.unwrap();
        assert_eq!(meta.duration, Some(183.4));
        assert_eq!(
            meta.resolution,
            Some(Resolution {
                width: Some(3000),
                height: Some(3000)
            })
        );
        assert_eq!(meta.hash.as_deref(), Some("d41d8cd9"));
        assert_eq!(meta.fingerprint.as_deref(), Some("AQADtE"));
    }

    #[test]
    fn test_response_intermediate_chunk_is_empty() {
        let resp: UploadResponse = serde_json::from_str(r#"{"received": 3}"#).unwrap();
        assert_eq!(resp, UploadResponse::default());
    }

    #[test]
    fn test_result_requires_path() {
        let err = UploadResult::try_from(UploadResponse::default()).unwrap_err();
        assert!(matches!(err, AppError::MissingPath));

        let err = UploadResult::try_from(UploadResponse {
            path: Some(String::new()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::MissingPath));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = UploadResult {
            path: "p".into(),
            status: None,
            message: None,
            meta_data: Some(MetaData {
                hash: Some("h".into()),
                ..Default::default()
            }),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["metaData"]["hash"], "h");
        assert!(json.get("status").is_none());
        assert!(json.get("meta_data").is_none());
    }

    #[test]
    fn test_chunk_range_len() {
        let range = ChunkRange {
            chunk_index: 2,
            start: 2_097_152,
            end: 2_621_440,
        };
        assert_eq!(range.len(), 524_288);
        assert!(!range.is_empty());
    }
}
