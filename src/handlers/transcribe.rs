//! # Transcription Endpoint
//!
//! `POST /api/v1/transcribe` accepts a multipart upload (a `file` part plus
//! an optional `language` field) and returns one JSON transcription record.
//!
//! ## Validation order:
//! Size, content type, and language are all checked before the pipeline is
//! touched; those failures are transport errors (4xx). Anything that goes
//! wrong inside the pipeline comes back as a 200 with `success: false`,
//! because by then the request itself was well-formed.
//!
//! ## Blocking:
//! Decoding and recognition are CPU-bound, so the pipeline runs on actix's
//! blocking pool via `web::block`, keeping the async workers free. The
//! spooled upload is moved into the blocking task and dropped there, which
//! deletes it no matter how the transcription ends.

use crate::audio::AudioInput;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::transcription::RequestedLanguage;
use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_web::{web, HttpResponse};
use serde_json::json;
use std::sync::Arc;

/// Content types the endpoint accepts, matching the codecs the decoder is
/// built with.
const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/x-wav",
    "audio/wave",
    "audio/ogg",
    "audio/flac",
    "audio/mp4",
    "audio/x-m4a",
    "audio/aac",
];

#[derive(Debug, MultipartForm)]
pub struct TranscribeForm {
    /// The uploaded audio file, spooled to a temporary file by actix.
    pub file: TempFile,
    /// Language code or `auto`; absent means `auto`.
    pub language: Option<Text<String>>,
}

pub async fn transcribe_audio(
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<TranscribeForm>,
) -> AppResult<HttpResponse> {
    let filename = form
        .file
        .file_name
        .clone()
        .unwrap_or_else(|| "upload".to_string());

    if form.file.size > state.config.limits.max_upload_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Upload of {} bytes exceeds the {} byte limit",
            form.file.size, state.config.limits.max_upload_bytes
        )));
    }

    let content_type = form
        .file
        .content_type
        .as_ref()
        .map(|mime| mime.essence_str().to_string())
        .ok_or_else(|| {
            AppError::ValidationError("Upload is missing a content type".to_string())
        })?;
    if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(AppError::ValidationError(format!(
            "Unsupported content type '{}'; expected one of {}",
            content_type,
            ALLOWED_CONTENT_TYPES.join(", ")
        )));
    }

    let language_field = form
        .language
        .map(Text::into_inner)
        .unwrap_or_else(|| "auto".to_string());
    let requested = RequestedLanguage::parse(&language_field).ok_or_else(|| {
        AppError::ValidationError(format!(
            "Unknown language '{}'; supported values are auto, en, ru, kz",
            language_field
        ))
    })?;

    tracing::info!(
        filename = %filename,
        content_type = %content_type,
        language = %language_field,
        size_bytes = form.file.size,
        "Transcription request accepted"
    );

    let pipeline = Arc::clone(&state.pipeline);
    let upload = form.file.file;

    // Guard, not a manual decrement: it releases the gauge even when the
    // client disconnects and this future is dropped at the await below.
    let _active = state.track_transcription();
    let outcome = web::block(move || {
        let input = AudioInput::File(upload.path().to_path_buf());
        pipeline.transcribe(input, requested)
        // `upload` drops here, deleting the spooled file
    })
    .await;

    let result = outcome
        .map_err(|e| AppError::Internal(format!("Transcription task was cancelled: {}", e)))?;

    Ok(HttpResponse::Ok().json(json!({
        "id": uuid::Uuid::new_v4(),
        "filename": filename,
        "language": result.language,
        "text": result.text,
        "success": result.success,
        "error": result.error,
        "confidence": result.confidence,
        "audio_duration": result.audio_duration,
        "processing_time_ms": result.processing_time_ms,
        "created_at": chrono::Utc::now().to_rfc3339()
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::transcription::{EngineCapability, LanguageCode, TranscriptionPipeline};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    const BOUNDARY: &str = "----voicescribe-test-boundary";

    fn degraded_state(max_upload_bytes: usize) -> AppState {
        let mut config = AppConfig::default();
        config.limits.max_upload_bytes = max_upload_bytes;
        let pipeline = TranscriptionPipeline::new(
            EngineCapability::Degraded {
                reason: "test".to_string(),
            },
            std::path::Path::new("models"),
            LanguageCode::En,
            4000,
        );
        AppState::new(config, pipeline)
    }

    /// Build a multipart/form-data body with a `file` part and an optional
    /// `language` part.
    fn multipart_body(
        file_bytes: &[u8],
        content_type: &str,
        language: Option<&str>,
    ) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"clip.wav\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(file_bytes);
        body.extend_from_slice(b"\r\n");
        if let Some(lang) = language {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                     name=\"language\"\r\n\r\n{lang}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn post_transcribe(
        state: AppState,
        body: Vec<u8>,
    ) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/transcribe", web::post().to(transcribe_audio)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/transcribe")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
            .to_request();
        test::call_service(&app, req).await
    }

    #[actix_web::test]
    async fn test_oversized_upload_is_rejected_with_413() {
        let body = multipart_body(&[0u8; 64], "audio/wav", Some("en"));
        let resp = post_transcribe(degraded_state(16), body).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[actix_web::test]
    async fn test_disallowed_content_type_is_rejected() {
        let body = multipart_body(b"plain text", "text/plain", Some("en"));
        let resp = post_transcribe(degraded_state(1024), body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_unknown_language_is_rejected() {
        let wav = crate::audio::pcm::tests::generate_test_wav(16_000, 1, 160);
        let body = multipart_body(&wav, "audio/wav", Some("de"));
        let resp = post_transcribe(degraded_state(1 << 20), body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_wellformed_request_gets_a_transcription_record() {
        // Degraded engine: the request passes validation and the failure
        // comes back inside the record, not as an HTTP error.
        let wav = crate::audio::pcm::tests::generate_test_wav(16_000, 1, 160);
        let body = multipart_body(&wav, "audio/wav", None);
        let resp = post_transcribe(degraded_state(1 << 20), body).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let record: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(record["filename"], "clip.wav");
        assert_eq!(record["language"], "en");
        assert_eq!(record["success"], false);
        assert!(record["error"]
            .as_str()
            .unwrap()
            .contains("Speech recognition is not available"));
    }
}
