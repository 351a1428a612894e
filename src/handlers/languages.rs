//! # Language Listing Endpoint
//!
//! `GET /api/v1/languages` lists the languages whose models are present on
//! disk at the moment of the call, plus the language `auto` resolves to.

use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde_json::json;

pub async fn list_languages(state: web::Data<AppState>) -> HttpResponse {
    let available = state.pipeline.available_languages();

    let languages: Vec<_> = available
        .iter()
        .map(|(code, name)| json!({ "code": code, "name": name }))
        .collect();

    HttpResponse::Ok().json(json!({
        "languages": languages,
        "default": state.pipeline.default_language(),
        "count": available.len()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::transcription::{EngineCapability, LanguageCode, TranscriptionPipeline};
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_lists_only_models_present_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = crate::transcription::model_catalog(dir.path());
        std::fs::create_dir(&catalog[&LanguageCode::En].path).unwrap();

        let pipeline = TranscriptionPipeline::new(
            EngineCapability::Degraded {
                reason: "test".to_string(),
            },
            dir.path(),
            LanguageCode::En,
            4000,
        );
        let state = AppState::new(AppConfig::default(), pipeline);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/languages", web::get().to(list_languages)),
        )
        .await;

        let req = test::TestRequest::get().uri("/languages").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["count"], 1);
        assert_eq!(body["default"], "en");
        assert_eq!(body["languages"][0]["code"], "en");
        assert_eq!(body["languages"][0]["name"], "English");
    }
}
