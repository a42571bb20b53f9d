//! Structured attendance queries
//!
//! `StructuredQuery` is the dialect-free result of a translation: an intent and
//! a conjunctive list of predicates over the check-in / check-out timestamps.
//! `QuerySynthesizer` builds one from an `IntentMatch`; rendering lives in
//! `render`.

use chrono::{NaiveDate, NaiveTime};
use serde::{Serialize, Serializer};

use crate::error::TranslationError;
use crate::intent::{Bound, Clause, IntentMatch, TimeSlot};
use crate::times::TimeNormalizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryIntent {
    ListEmployees,
    CountEmployees,
    AverageCheckIn,
    ListOrderedByCheckout,
    OnlineBetween,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    CheckIn,
    CheckOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
}

impl Comparator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Lt => "<",
            Comparator::Gt => ">",
            Comparator::Le => "<=",
            Comparator::Ge => ">=",
            Comparator::Eq => "=",
        }
    }
}

/// A date or time literal. The variant decides which component of the
/// timestamp column is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Literal {
    #[serde(serialize_with = "serialize_date")]
    Date(NaiveDate),
    #[serde(serialize_with = "serialize_time")]
    Time(NaiveTime),
}

impl Literal {
    /// `YYYY-MM-DD` or `HH:MM:SS`.
    pub fn canonical(&self) -> String {
        match self {
            Literal::Date(d) => d.format("%Y-%m-%d").to_string(),
            Literal::Time(t) => t.format("%H:%M:%S").to_string(),
        }
    }
}

fn serialize_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format("%Y-%m-%d"))
}

fn serialize_time<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format("%H:%M:%S"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Predicate {
    pub field: Field,
    pub comparator: Comparator,
    pub value: Literal,
}

impl Predicate {
    pub fn new(field: Field, comparator: Comparator, value: Literal) -> Self {
        Self {
            field,
            comparator,
            value,
        }
    }
}

/// Predicates are conjoined, in synthesis order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredQuery {
    pub intent: QueryIntent,
    pub predicates: Vec<Predicate>,
}

// ============================================================================
// Synthesis
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct QuerySynthesizer {
    normalizer: TimeNormalizer,
}

impl QuerySynthesizer {
    pub fn new(normalizer: TimeNormalizer) -> Self {
        Self { normalizer }
    }

    /// Every clause shares `date`. Time phrases are normalized only when a
    /// clause references their slot.
    pub fn synthesize(
        &self,
        matched: &IntentMatch,
        date: NaiveDate,
        time_phrases: &[String],
    ) -> Result<StructuredQuery, TranslationError> {
        let mut predicates = Vec::new();

        for clause in &matched.clauses {
            match *clause {
                Clause::Bound { field, bound, slot } => {
                    let time = self.slot_time(time_phrases, slot)?;
                    let comparator = match bound {
                        Bound::Before => Comparator::Lt,
                        Bound::After => Comparator::Gt,
                    };
                    predicates.push(Predicate::new(field, Comparator::Eq, Literal::Date(date)));
                    predicates.push(Predicate::new(field, comparator, Literal::Time(time)));
                }
                Clause::Window { start, end } => {
                    let start = self.slot_time(time_phrases, start)?;
                    let end = self.slot_time(time_phrases, end)?;
                    predicates.push(Predicate::new(
                        Field::CheckIn,
                        Comparator::Eq,
                        Literal::Date(date),
                    ));
                    predicates.push(Predicate::new(
                        Field::CheckIn,
                        Comparator::Le,
                        Literal::Time(start),
                    ));
                    predicates.push(Predicate::new(
                        Field::CheckOut,
                        Comparator::Ge,
                        Literal::Time(end),
                    ));
                }
            }
        }

        Ok(StructuredQuery {
            intent: matched.intent,
            predicates,
        })
    }

    fn slot_time(
        &self,
        time_phrases: &[String],
        slot: TimeSlot,
    ) -> Result<NaiveTime, TranslationError> {
        let phrase = time_phrases.get(slot.index()).ok_or_else(|| {
            TranslationError::TimeNormalizationFailed {
                phrase: String::new(),
                reason: format!("no time phrase for slot {:?}", slot),
            }
        })?;
        self.normalizer.normalize(phrase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn time(h: u32, m: u32) -> Literal {
        Literal::Time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn phrases(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bound_clause_pairs_date_equality_with_strict_time() {
        let matched = IntentMatch {
            intent: QueryIntent::ListEmployees,
            clauses: vec![Clause::Bound {
                field: Field::CheckIn,
                bound: Bound::Before,
                slot: TimeSlot::First,
            }],
        };

        let query = QuerySynthesizer::default()
            .synthesize(&matched, date(), &phrases(&["9 AM"]))
            .unwrap();

        assert_eq!(
            query.predicates,
            vec![
                Predicate::new(Field::CheckIn, Comparator::Eq, Literal::Date(date())),
                Predicate::new(Field::CheckIn, Comparator::Lt, time(3, 30)),
            ]
        );
    }

    #[test]
    fn test_multiple_clauses_share_date_and_first_time() {
        let matched = IntentMatch {
            intent: QueryIntent::CountEmployees,
            clauses: vec![
                Clause::Bound {
                    field: Field::CheckIn,
                    bound: Bound::After,
                    slot: TimeSlot::First,
                },
                Clause::Bound {
                    field: Field::CheckOut,
                    bound: Bound::Before,
                    slot: TimeSlot::First,
                },
            ],
        };

        let query = QuerySynthesizer::default()
            .synthesize(&matched, date(), &phrases(&["10 AM", "6 PM"]))
            .unwrap();

        assert_eq!(query.intent, QueryIntent::CountEmployees);
        assert_eq!(query.predicates.len(), 4);
        assert_eq!(query.predicates[1], Predicate::new(Field::CheckIn, Comparator::Gt, time(4, 30)));
        assert_eq!(query.predicates[2].value, Literal::Date(date()));
        assert_eq!(query.predicates[3], Predicate::new(Field::CheckOut, Comparator::Lt, time(4, 30)));
    }

    #[test]
    fn test_window_clause() {
        let matched = IntentMatch {
            intent: QueryIntent::OnlineBetween,
            clauses: vec![Clause::Window {
                start: TimeSlot::First,
                end: TimeSlot::Second,
            }],
        };

        let query = QuerySynthesizer::default()
            .synthesize(&matched, date(), &phrases(&["8 AM", "5 PM"]))
            .unwrap();

        assert_eq!(
            query.predicates,
            vec![
                Predicate::new(Field::CheckIn, Comparator::Eq, Literal::Date(date())),
                Predicate::new(Field::CheckIn, Comparator::Le, time(2, 30)),
                Predicate::new(Field::CheckOut, Comparator::Ge, time(11, 30)),
            ]
        );
    }

    #[test]
    fn test_unreferenced_phrases_are_not_normalized() {
        let matched = IntentMatch {
            intent: QueryIntent::ListEmployees,
            clauses: vec![Clause::Bound {
                field: Field::CheckOut,
                bound: Bound::After,
                slot: TimeSlot::First,
            }],
        };

        let query = QuerySynthesizer::default()
            .synthesize(&matched, date(), &phrases(&["5 PM", "13 PM"]))
            .unwrap();
        assert_eq!(query.predicates.len(), 2);
    }

    #[test]
    fn test_bad_time_phrase_is_a_hard_failure() {
        let matched = IntentMatch {
            intent: QueryIntent::ListEmployees,
            clauses: vec![Clause::Bound {
                field: Field::CheckIn,
                bound: Bound::Before,
                slot: TimeSlot::First,
            }],
        };

        let result = QuerySynthesizer::default().synthesize(&matched, date(), &phrases(&["13 PM"]));
        assert!(matches!(
            result,
            Err(TranslationError::TimeNormalizationFailed { .. })
        ));
    }

    #[test]
    fn test_serializes_canonical_literals() {
        let query = StructuredQuery {
            intent: QueryIntent::OnlineBetween,
            predicates: vec![
                Predicate::new(Field::CheckIn, Comparator::Eq, Literal::Date(date())),
                Predicate::new(Field::CheckOut, Comparator::Ge, time(11, 30)),
            ],
        };

        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["intent"], "ONLINE_BETWEEN");
        assert_eq!(json["predicates"][0]["field"], "check_in");
        assert_eq!(json["predicates"][0]["comparator"], "eq");
        assert_eq!(json["predicates"][0]["value"]["kind"], "date");
        assert_eq!(json["predicates"][0]["value"]["value"], "2026-10-14");
        assert_eq!(json["predicates"][1]["value"]["value"], "11:30:00");
    }
}
