//! Video analysis handler.

use std::time::Instant;

use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{Extension, Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::{Bytes, BytesMut};
use tracing::{info, warn};
use vidcheck_analysis::{AnalysisRequest, ServiceError, UploadedVideo};
use vidcheck_models::{
    validate_file, validate_url, AnalysisEnvelope, AnalysisResponse, ValidationError, VideoFile,
    MAX_FILE_SIZE,
};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::middleware::RequestId;
use crate::state::AppState;

/// Multipart field carrying the uploaded video.
pub const VIDEO_FIELD: &str = "video";

/// Multipart field carrying a remote video URL.
pub const URL_FIELD: &str = "url";

fn malformed(e: MultipartError) -> ApiError {
    // A streamed body without Content-Length hits the limit mid-parse.
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::PayloadTooLarge {
            content_length: None,
        };
    }
    ApiError::bad_request(format!("Invalid multipart body: {}", e.body_text()))
}

/// Read a file part, keeping at most `max_size` bytes.
///
/// Returns the kept content and the part's full length. Chunks past the cap
/// are counted and dropped.
async fn read_file(field: &mut Field<'_>, max_size: u64) -> ApiResult<(Bytes, u64)> {
    let mut buffer = BytesMut::new();
    let mut total: u64 = 0;

    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        total = total.saturating_add(chunk.len() as u64);
        if total > max_size {
            if !buffer.is_empty() {
                buffer = BytesMut::new();
            }
            continue;
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok((buffer.freeze(), total))
}

/// Collect the `video` and `url` fields. Unknown fields are skipped; an
/// empty file part (no name, no bytes) counts as absent. A file over
/// `max_file_size` fails without being held in memory.
async fn read_form(mut multipart: Multipart, max_file_size: u64) -> ApiResult<AnalysisRequest> {
    let mut request = AnalysisRequest::default();

    while let Some(mut field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(VIDEO_FIELD) => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let (content, size) = read_file(&mut field, max_file_size).await?;
                if size > max_file_size {
                    return Err(ValidationError::FileTooLarge { size_bytes: size }.into());
                }
                if file_name.is_empty() && content.is_empty() {
                    continue;
                }
                request.video = Some(UploadedVideo::new(file_name, content));
            }
            Some(URL_FIELD) => {
                request.url = Some(field.text().await.map_err(malformed)?);
            }
            _ => {}
        }
    }

    Ok(request)
}

/// Apply the upload policy to whichever part the service will use.
fn validate_request(request: &AnalysisRequest) -> ApiResult<&'static str> {
    if let Some(video) = &request.video {
        validate_file(&VideoFile::new(video.file_name.clone(), video.content.clone()))?;
        return Ok("file");
    }
    match request.url.as_deref() {
        Some(url) if !url.trim().is_empty() => {
            validate_url(url)?;
            Ok("url")
        }
        _ => Err(ApiError::MissingInput),
    }
}

/// Analyze an uploaded video or a video URL.
///
/// POST /api/analyze-video (multipart/form-data)
pub async fn analyze_video(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<AnalysisEnvelope>> {
    let request_id = request_id
        .map(|Extension(RequestId(id))| id)
        .unwrap_or_default();

    let multipart = multipart.map_err(|e| {
        warn!(request_id = %request_id, "Rejected non-multipart analysis request: {}", e.body_text());
        ApiError::bad_request(e.body_text())
    })?;

    let checked = match read_form(multipart, MAX_FILE_SIZE).await {
        Ok(request) => validate_request(&request).map(|source| (request, source)),
        Err(e) => Err(e),
    };
    let (request, source) = match checked {
        Ok(checked) => checked,
        Err(e) => {
            metrics::record_analysis_rejected(e.reason());
            info!(request_id = %request_id, reason = e.reason(), "Analysis request rejected");
            return Err(e);
        }
    };

    let start = Instant::now();
    let outcome = tokio::time::timeout(
        state.config.request_timeout,
        state.analysis.analyze(request),
    )
    .await
    .unwrap_or(Err(ServiceError::Timeout(state.config.request_timeout)));
    let elapsed = start.elapsed().as_secs_f64();

    match outcome {
        Ok(result) => {
            metrics::record_analysis_completed(source, result.is_ai_generated, elapsed);
            info!(
                request_id = %request_id,
                source,
                service = state.analysis.name(),
                verdict = result.verdict(),
                confidence = result.confidence,
                "Analysis completed"
            );
            Ok(Json(AnalysisEnvelope::from(AnalysisResponse::success(result))))
        }
        Err(e) => {
            let err = ApiError::from(e);
            warn!(request_id = %request_id, source, reason = err.reason(), "Analysis failed");
            if err.status_code().is_client_error() {
                metrics::record_analysis_rejected(err.reason());
            } else {
                metrics::record_analysis_failed(source);
            }
            Err(err)
        }
    }
}
