use std::sync::Arc;

use attend_core::ipc::{AttendRequest, AttendResponse};
use attend_core::{AttendConfig, PostgresRenderer, QueryRenderer, TranslationError, Translator};
use uuid::Uuid;

/// Process-wide translator plus the renderer its output is shown with.
/// Built once at startup and shared read-only by every listener.
pub struct TranslationService {
    translator: Translator,
    renderer: Arc<dyn QueryRenderer>,
}

impl TranslationService {
    pub fn new(translator: Translator, renderer: Arc<dyn QueryRenderer>) -> Self {
        Self {
            translator,
            renderer,
        }
    }

    pub fn from_config(config: &AttendConfig) -> Self {
        Self::new(
            Translator::from_config(config),
            Arc::new(PostgresRenderer::new(&config.schema)),
        )
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Translate one sentence into `{"sql": ..., "query": ...}`.
    pub fn translate(&self, sentence: &str) -> Result<serde_json::Value, TranslationError> {
        let request_id = Uuid::new_v4();
        let query = match self.translator.translate(sentence) {
            Ok(q) => q,
            Err(e) => {
                tracing::warn!(%request_id, error = %e, "Translation failed");
                return Err(e);
            }
        };

        let sql = self.renderer.render(&query);
        tracing::info!(%request_id, intent = ?query.intent, sql = %sql, "Translated query");

        Ok(serde_json::json!({
            "sql": sql,
            "query": query,
        }))
    }

    pub fn health(&self) -> serde_json::Value {
        if self.translator.is_available() {
            serde_json::json!({
                "status": "healthy",
                "extractor": self.translator.extractor_name(),
                "version": env!("CARGO_PKG_VERSION"),
            })
        } else {
            serde_json::json!({
                "status": "degraded",
                "extractor": null,
                "error": self.translator.unavailable_reason(),
                "version": env!("CARGO_PKG_VERSION"),
            })
        }
    }
}

pub fn handle_request(request: AttendRequest, service: &TranslationService) -> AttendResponse {
    match request {
        AttendRequest::Ping => AttendResponse::pong(),
        AttendRequest::Health => {
            let body = service.health();
            if service.translator().is_available() {
                AttendResponse::ok(body)
            } else {
                AttendResponse::err(format!(
                    "Extractor unavailable: {}",
                    service.translator().unavailable_reason().unwrap_or("unknown")
                ))
            }
        }
        AttendRequest::Translate { query } => {
            match service.translate(query.as_deref().unwrap_or("")) {
                Ok(data) => AttendResponse::ok(data),
                Err(e) => AttendResponse::err(e.to_string()),
            }
        }
    }
}
