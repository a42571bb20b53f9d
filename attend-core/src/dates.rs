//! Calendar date resolution for DATE phrases
//!
//! Relative words (today, yesterday, tomorrow) are resolved against a pinned
//! `today`; everything else is tried against the configured formats in order.

use chrono::{Duration, NaiveDate};

/// Resolves DATE phrases to calendar dates. Never fails: anything it cannot
/// read becomes `today`.
#[derive(Debug, Clone)]
pub struct DateResolver {
    formats: Vec<String>,
}

impl DateResolver {
    pub fn new(formats: Vec<String>) -> Self {
        Self { formats }
    }

    pub fn resolve(&self, date_text: Option<&str>, today: NaiveDate) -> NaiveDate {
        let Some(text) = date_text.map(str::trim) else {
            return today;
        };

        match text.to_ascii_lowercase().as_str() {
            "today" => return today,
            "yesterday" => return today - Duration::days(1),
            "tomorrow" => return today + Duration::days(1),
            _ => {}
        }

        for format in &self.formats {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return date;
            }
        }

        tracing::warn!(
            date_text = %text,
            fallback = %today,
            "Could not resolve date phrase, using today"
        );
        today
    }
}

impl Default for DateResolver {
    fn default() -> Self {
        Self::new(vec!["%B %d, %Y".to_string(), "%Y-%m-%d".to_string()])
    }
}
