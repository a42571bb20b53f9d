//! Clock-time recognition and normalization
//!
//! `TimeScanner` finds "9 AM" style phrases directly in the raw sentence; this
//! list, not the recognizer's TIME spans, drives every time predicate.
//! `TimeNormalizer` turns one phrase into an offset-adjusted 24-hour value.

use chrono::{Duration, NaiveTime};
use regex::{Regex, RegexBuilder};

use crate::error::TranslationError;

/// One-or-two-digit hour, a single space, then the meridiem. The hour may not
/// continue a longer number or a clock reading ("9:30 AM" yields nothing).
const TIME_PHRASE_PATTERN: &str = r"(?:^|[^\d:])(\d{1,2} (?:AM|PM))";

/// Grammar accepted by the normalizer: hour, optional minutes, meridiem.
const CLOCK_PATTERN: &str = r"^\s*(\d{1,2})(?::(\d{2}))?\s*([AaPp])\.?[Mm]\.?\s*$";

#[derive(Debug, Clone)]
pub struct TimeScanner {
    pattern: Regex,
}

impl TimeScanner {
    pub fn new(case_insensitive: bool) -> Self {
        let pattern = RegexBuilder::new(TIME_PHRASE_PATTERN)
            .case_insensitive(case_insensitive)
            .build()
            .expect("Invalid regex");
        Self { pattern }
    }

    /// Time phrases in order of appearance.
    pub fn scan(&self, text: &str) -> Vec<String> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Converts 12-hour clock phrases to `HH:MM:SS` after subtracting a fixed offset.
#[derive(Debug, Clone)]
pub struct TimeNormalizer {
    offset: Duration,
    clock: Regex,
}

impl TimeNormalizer {
    /// `offset_minutes` is subtracted; 330 shifts IST wall-clock times to UTC.
    pub fn new(offset_minutes: i64) -> Self {
        Self {
            offset: Duration::minutes(offset_minutes),
            clock: Regex::new(CLOCK_PATTERN).expect("Invalid regex"),
        }
    }

    pub fn normalize(&self, phrase: &str) -> Result<NaiveTime, TranslationError> {
        let wall_clock = self.parse_twelve_hour(phrase)?;
        // Wraps across midnight: 02:00 - 5h30m = 20:30 the previous day
        let (adjusted, _) = wall_clock.overflowing_sub_signed(self.offset);
        Ok(adjusted)
    }

    /// Normalize and render as `HH:MM:SS`.
    pub fn normalize_to_string(&self, phrase: &str) -> Result<String, TranslationError> {
        Ok(self.normalize(phrase)?.format("%H:%M:%S").to_string())
    }

    fn parse_twelve_hour(&self, phrase: &str) -> Result<NaiveTime, TranslationError> {
        let fail = |reason: &str| TranslationError::TimeNormalizationFailed {
            phrase: phrase.to_string(),
            reason: reason.to_string(),
        };

        let caps = self
            .clock
            .captures(phrase)
            .ok_or_else(|| fail("expected '<hour> AM|PM'"))?;

        let hour: u32 = caps[1].parse().map_err(|_| fail("invalid hour"))?;
        if !(1..=12).contains(&hour) {
            return Err(fail("hour must be between 1 and 12"));
        }

        let minute: u32 = match caps.get(2) {
            Some(m) => m.as_str().parse().map_err(|_| fail("invalid minute"))?,
            None => 0,
        };

        let is_pm = caps[3].eq_ignore_ascii_case("p");
        let hour24 = match (hour, is_pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, false) => h,
            (h, true) => h + 12,
        };

        NaiveTime::from_hms_opt(hour24, minute, 0).ok_or_else(|| fail("minute out of range"))
    }
}

impl Default for TimeNormalizer {
    fn default() -> Self {
        Self::new(330)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_finds_phrases_left_to_right() {
        let scanner = TimeScanner::new(false);
        assert_eq!(
            scanner.scan("online between 8 AM and 5 PM"),
            vec!["8 AM".to_string(), "5 PM".to_string()]
        );
        assert_eq!(scanner.scan("checked out after 11 PM"), vec!["11 PM"]);
    }

    #[test]
    fn test_scan_is_case_sensitive_by_default() {
        let scanner = TimeScanner::new(false);
        assert!(scanner.scan("checked in before 9 am").is_empty());
        // No space between hour and meridiem is not a phrase either
        assert!(scanner.scan("checked in before 9AM").is_empty());
    }

    #[test]
    fn test_scan_skips_clock_readings_and_long_numbers() {
        let scanner = TimeScanner::new(false);
        assert!(scanner.scan("checked in before 9:30 AM").is_empty());
        assert!(scanner.scan("badge 123 AM").is_empty());
        assert_eq!(scanner.scan("9 AM to 10 PM"), vec!["9 AM", "10 PM"]);
    }

    #[test]
    fn test_scan_case_insensitive_policy() {
        let scanner = TimeScanner::new(true);
        assert_eq!(scanner.scan("before 9 am and after 5 Pm"), vec!["9 am", "5 Pm"]);
    }

    #[test]
    fn test_normalize_subtracts_five_thirty() {
        let normalizer = TimeNormalizer::default();
        assert_eq!(normalizer.normalize_to_string("9 AM").unwrap(), "03:30:00");
        assert_eq!(normalizer.normalize_to_string("10 AM").unwrap(), "04:30:00");
        assert_eq!(normalizer.normalize_to_string("8 AM").unwrap(), "02:30:00");
        assert_eq!(normalizer.normalize_to_string("5 PM").unwrap(), "11:30:00");
        assert_eq!(normalizer.normalize_to_string("12 PM").unwrap(), "06:30:00");
    }

    #[test]
    fn test_normalize_wraps_across_midnight() {
        let normalizer = TimeNormalizer::default();
        assert_eq!(normalizer.normalize_to_string("2 AM").unwrap(), "20:30:00");
        assert_eq!(normalizer.normalize_to_string("12 AM").unwrap(), "18:30:00");
        assert_eq!(normalizer.normalize_to_string("5 AM").unwrap(), "23:30:00");
    }

    #[test]
    fn test_normalize_is_pure() {
        let normalizer = TimeNormalizer::default();
        for hour in 1..=12 {
            for meridiem in ["AM", "PM"] {
                let phrase = format!("{} {}", hour, meridiem);
                assert_eq!(
                    normalizer.normalize(&phrase).unwrap(),
                    normalizer.normalize(&phrase).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_normalize_accepts_minutes_and_lowercase() {
        let normalizer = TimeNormalizer::default();
        assert_eq!(normalizer.normalize_to_string("9:45 pm").unwrap(), "16:15:00");
        assert_eq!(normalizer.normalize_to_string("7 a.m.").unwrap(), "01:30:00");
    }

    #[test]
    fn test_normalize_rejects_out_of_range_hours() {
        let normalizer = TimeNormalizer::default();
        for phrase in ["13 PM", "0 AM", "noon", "9:75 AM"] {
            match normalizer.normalize(phrase) {
                Err(TranslationError::TimeNormalizationFailed { phrase: p, .. }) => {
                    assert_eq!(p, phrase)
                }
                other => panic!("Expected TimeNormalizationFailed for {}, got {:?}", phrase, other),
            }
        }
    }

    #[test]
    fn test_custom_offset() {
        let normalizer = TimeNormalizer::new(0);
        assert_eq!(normalizer.normalize_to_string("3 PM").unwrap(), "15:00:00");
        let normalizer = TimeNormalizer::new(-60);
        assert_eq!(normalizer.normalize_to_string("11 PM").unwrap(), "00:00:00");
    }
}
