//! Intent matching over attendance sentences
//!
//! Trigger phrases are checked in a fixed priority order:
//! 1. "employees" together with any of the check-in/out or "how many" triggers
//!    (sub-triggers are independent; up to four clauses plus COUNT)
//! 2. "average check-in time"
//! 3. "ordered by their check-out times"
//! 4. "online between" with exactly two time phrases
//! 5. bare listing
//!
//! A sentence that mentions "employees" but none of branch 1's sub-triggers is
//! handed to branches 2-5.

use serde::Serialize;

use crate::query::{Field, QueryIntent};

const EMPLOYEES: &str = "employees";
const HOW_MANY_EMPLOYEES: &str = "how many employees";
const AVERAGE_CHECK_IN: &str = "average check-in time";
const ORDERED_BY_CHECK_OUT: &str = "ordered by their check-out times";
const ONLINE_BETWEEN: &str = "online between";

/// Branch 1 sub-triggers, in the order their clauses are emitted.
const BOUND_TRIGGERS: &[(&str, Field, Bound)] = &[
    ("checked in before", Field::CheckIn, Bound::Before),
    ("checked in after", Field::CheckIn, Bound::After),
    ("checked out before", Field::CheckOut, Bound::Before),
    ("checked out after", Field::CheckOut, Bound::After),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    Before,
    After,
}

/// Index into the scanned time phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    First,
    Second,
}

impl TimeSlot {
    pub fn index(&self) -> usize {
        match self {
            TimeSlot::First => 0,
            TimeSlot::Second => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Clause {
    /// `field` on the resolved date, strictly before/after the slot's time.
    Bound {
        field: Field,
        bound: Bound,
        slot: TimeSlot,
    },
    /// Checked in no later than `start` and checked out no earlier than `end`.
    Window { start: TimeSlot, end: TimeSlot },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntentMatch {
    pub intent: QueryIntent,
    pub clauses: Vec<Clause>,
}

impl IntentMatch {
    fn bare(intent: QueryIntent) -> Self {
        Self {
            intent,
            clauses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntentMatcher {
    case_insensitive: bool,
}

impl IntentMatcher {
    pub fn new(case_insensitive: bool) -> Self {
        Self { case_insensitive }
    }

    /// `time_phrase_count` is the number of phrases the time scan found.
    pub fn match_intent(&self, text: &str, time_phrase_count: usize) -> IntentMatch {
        let folded;
        let text = if self.case_insensitive {
            folded = text.to_lowercase();
            folded.as_str()
        } else {
            text
        };

        if let Some(m) = Self::match_employees(text, time_phrase_count) {
            return m;
        }

        if text.contains(AVERAGE_CHECK_IN) {
            return IntentMatch::bare(QueryIntent::AverageCheckIn);
        }

        if text.contains(ORDERED_BY_CHECK_OUT) {
            return IntentMatch::bare(QueryIntent::ListOrderedByCheckout);
        }

        if text.contains(ONLINE_BETWEEN) && time_phrase_count == 2 {
            return IntentMatch {
                intent: QueryIntent::OnlineBetween,
                clauses: vec![Clause::Window {
                    start: TimeSlot::First,
                    end: TimeSlot::Second,
                }],
            };
        }

        IntentMatch::bare(QueryIntent::ListEmployees)
    }

    fn match_employees(text: &str, time_phrase_count: usize) -> Option<IntentMatch> {
        if !text.contains(EMPLOYEES) {
            return None;
        }

        let counting = text.contains(HOW_MANY_EMPLOYEES);
        let mut triggered = counting;
        let mut clauses = Vec::new();

        for (phrase, field, bound) in BOUND_TRIGGERS {
            if !text.contains(phrase) {
                continue;
            }
            triggered = true;
            if time_phrase_count > 0 {
                clauses.push(Clause::Bound {
                    field: *field,
                    bound: *bound,
                    slot: TimeSlot::First,
                });
            }
        }

        if !triggered {
            return None;
        }

        let intent = if counting {
            QueryIntent::CountEmployees
        } else {
            QueryIntent::ListEmployees
        };

        Some(IntentMatch { intent, clauses })
    }
}
