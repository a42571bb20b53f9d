//! Translation facade: sentence in, `StructuredQuery` out.
//!
//! The extractor initialization result is captured once when the translator
//! is built. A failed initialization is permanent: every call returns
//! `ExtractorUnavailable` without touching the recognizer again.

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::config::{AttendConfig, TranslationConfig};
use crate::dates::DateResolver;
use crate::error::TranslationError;
use crate::extractor::{create_extractor, EntityExtractor, ExtractedContext};
use crate::intent::IntentMatcher;
use crate::query::{QuerySynthesizer, StructuredQuery};
use crate::times::{TimeNormalizer, TimeScanner};

pub struct Translator {
    extractor: Result<Arc<dyn EntityExtractor>, String>,
    scanner: TimeScanner,
    normalizer: TimeNormalizer,
    dates: DateResolver,
    matcher: IntentMatcher,
    synthesizer: QuerySynthesizer,
    recognizer_time_fallback: bool,
}

impl Translator {
    pub fn new(
        extractor: Result<Arc<dyn EntityExtractor>, String>,
        config: &TranslationConfig,
    ) -> Self {
        let normalizer = TimeNormalizer::new(config.utc_offset_minutes);
        Self {
            extractor,
            scanner: TimeScanner::new(config.case_insensitive),
            normalizer: normalizer.clone(),
            dates: DateResolver::new(config.date_formats.clone()),
            matcher: IntentMatcher::new(config.case_insensitive),
            synthesizer: QuerySynthesizer::new(normalizer),
            recognizer_time_fallback: config.recognizer_time_fallback,
        }
    }

    /// Build the extractor from config. Failure is logged once and kept.
    pub fn from_config(config: &AttendConfig) -> Self {
        let extractor = match create_extractor(&config.extractor) {
            Ok(e) => {
                tracing::info!(extractor = e.name(), "Entity extractor initialized");
                Ok(Arc::from(e))
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Entity extractor failed to initialize, translations will fail"
                );
                Err(e.to_string())
            }
        };
        Self::new(extractor, &config.translation)
    }

    pub fn is_available(&self) -> bool {
        self.extractor.is_ok()
    }

    pub fn extractor_name(&self) -> Option<&str> {
        self.extractor.as_ref().ok().map(|e| e.name())
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        self.extractor.as_ref().err().map(String::as_str)
    }

    /// Run the extractor and the time scan over `text`.
    pub fn extract_context(&self, text: &str) -> Result<ExtractedContext, TranslationError> {
        let extractor = self
            .extractor
            .as_ref()
            .map_err(|reason| TranslationError::ExtractorUnavailable(reason.clone()))?;

        let spans = extractor
            .extract(text)
            .map_err(|e| TranslationError::ExtractionFailed(e.to_string()))?;

        let mut context = ExtractedContext::collect(&spans, self.scanner.scan(text));

        if self.recognizer_time_fallback && context.time_phrases.is_empty() {
            context.time_phrases = context
                .entity_times
                .iter()
                .filter(|t| self.normalizer.normalize(t).is_ok())
                .cloned()
                .collect();
        }

        Ok(context)
    }

    pub fn translate(&self, text: &str) -> Result<StructuredQuery, TranslationError> {
        self.translate_on(text, Local::now().date_naive())
    }

    /// Translate with `today` pinned.
    pub fn translate_on(
        &self,
        text: &str,
        today: NaiveDate,
    ) -> Result<StructuredQuery, TranslationError> {
        let context = self.extract_context(text)?;

        let date = self.dates.resolve(context.date_entity.as_deref(), today);
        let matched = self.matcher.match_intent(text, context.time_phrases.len());
        let query = self.synthesizer.synthesize(&matched, date, &context.time_phrases)?;

        tracing::debug!(
            intent = ?query.intent,
            predicates = query.predicates.len(),
            times = context.time_phrases.len(),
            "Translated sentence"
        );

        Ok(query)
    }
}
