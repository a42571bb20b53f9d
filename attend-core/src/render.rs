use crate::config::SchemaConfig;
use crate::query::{Field, Literal, Predicate, QueryIntent, StructuredQuery};

/// Turns a `StructuredQuery` into a concrete query string.
pub trait QueryRenderer: Send + Sync {
    fn render(&self, query: &StructuredQuery) -> String;
}

/// PostgreSQL rendering against a single attendance table.
#[derive(Debug, Clone)]
pub struct PostgresRenderer {
    table: String,
    check_in_column: String,
    check_out_column: String,
}

impl PostgresRenderer {
    pub fn new(schema: &SchemaConfig) -> Self {
        Self {
            table: schema.table.clone(),
            check_in_column: schema.check_in_column.clone(),
            check_out_column: schema.check_out_column.clone(),
        }
    }

    fn column(&self, field: Field) -> &str {
        match field {
            Field::CheckIn => &self.check_in_column,
            Field::CheckOut => &self.check_out_column,
        }
    }

    fn predicate(&self, predicate: &Predicate) -> String {
        let cast = match predicate.value {
            Literal::Date(_) => "date",
            Literal::Time(_) => "time",
        };
        format!(
            "{}::{} {} {}",
            quote_ident(self.column(predicate.field)),
            cast,
            predicate.comparator.symbol(),
            quote_literal(&predicate.value.canonical())
        )
    }
}

impl Default for PostgresRenderer {
    fn default() -> Self {
        Self::new(&SchemaConfig::default())
    }
}

impl QueryRenderer for PostgresRenderer {
    fn render(&self, query: &StructuredQuery) -> String {
        let table = quote_ident(&self.table);

        let mut sql = match query.intent {
            QueryIntent::CountEmployees => format!("SELECT COUNT(*) FROM {}", table),
            QueryIntent::AverageCheckIn => format!(
                "SELECT AVG({}) FROM {}",
                quote_ident(&self.check_in_column),
                table
            ),
            QueryIntent::ListEmployees
            | QueryIntent::ListOrderedByCheckout
            | QueryIntent::OnlineBetween => format!("SELECT * FROM {}", table),
        };

        if !query.predicates.is_empty() {
            let conditions: Vec<String> =
                query.predicates.iter().map(|p| self.predicate(p)).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if query.intent == QueryIntent::ListOrderedByCheckout {
            sql.push_str(" ORDER BY ");
            sql.push_str(&quote_ident(&self.check_out_column));
        }

        sql
    }
}

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Comparator;
    use chrono::{NaiveDate, NaiveTime};

    fn date() -> Literal {
        Literal::Date(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap())
    }

    fn time(h: u32, m: u32) -> Literal {
        Literal::Time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn bare(intent: QueryIntent) -> StructuredQuery {
        StructuredQuery {
            intent,
            predicates: vec![],
        }
    }

    #[test]
    fn test_bare_intents() {
        let r = PostgresRenderer::default();
        assert_eq!(r.render(&bare(QueryIntent::ListEmployees)), r#"SELECT * FROM "Employee""#);
        assert_eq!(
            r.render(&bare(QueryIntent::CountEmployees)),
            r#"SELECT COUNT(*) FROM "Employee""#
        );
        assert_eq!(
            r.render(&bare(QueryIntent::AverageCheckIn)),
            r#"SELECT AVG("check_in") FROM "Employee""#
        );
        assert_eq!(
            r.render(&bare(QueryIntent::ListOrderedByCheckout)),
            r#"SELECT * FROM "Employee" ORDER BY "check_out""#
        );
    }

    #[test]
    fn test_predicates_joined_with_and() {
        let query = StructuredQuery {
            intent: QueryIntent::ListEmployees,
            predicates: vec![
                Predicate::new(Field::CheckIn, Comparator::Eq, date()),
                Predicate::new(Field::CheckIn, Comparator::Lt, time(3, 30)),
            ],
        };

        assert_eq!(
            PostgresRenderer::default().render(&query),
            r#"SELECT * FROM "Employee" WHERE "check_in"::date = '2024-03-03' AND "check_in"::time < '03:30:00'"#
        );
    }

    #[test]
    fn test_window_rendering() {
        let query = StructuredQuery {
            intent: QueryIntent::OnlineBetween,
            predicates: vec![
                Predicate::new(Field::CheckIn, Comparator::Eq, date()),
                Predicate::new(Field::CheckIn, Comparator::Le, time(2, 30)),
                Predicate::new(Field::CheckOut, Comparator::Ge, time(11, 30)),
            ],
        };

        assert_eq!(
            PostgresRenderer::default().render(&query),
            concat!(
                r#"SELECT * FROM "Employee" WHERE "check_in"::date = '2024-03-03' "#,
                r#"AND "check_in"::time <= '02:30:00' AND "check_out"::time >= '11:30:00'"#
            )
        );
    }

    #[test]
    fn test_count_keeps_predicates() {
        let query = StructuredQuery {
            intent: QueryIntent::CountEmployees,
            predicates: vec![
                Predicate::new(Field::CheckOut, Comparator::Eq, date()),
                Predicate::new(Field::CheckOut, Comparator::Gt, time(11, 30)),
            ],
        };

        assert_eq!(
            PostgresRenderer::default().render(&query),
            r#"SELECT COUNT(*) FROM "Employee" WHERE "check_out"::date = '2024-03-03' AND "check_out"::time > '11:30:00'"#
        );
    }

    #[test]
    fn test_custom_schema_is_quoted() {
        let schema = SchemaConfig {
            table: "Att\"endance".to_string(),
            check_in_column: "in_at".to_string(),
            check_out_column: "out_at".to_string(),
        };
        let r = PostgresRenderer::new(&schema);
        assert_eq!(
            r.render(&bare(QueryIntent::ListOrderedByCheckout)),
            r#"SELECT * FROM "Att""endance" ORDER BY "out_at""#
        );
    }

    #[test]
    fn test_quote_literal_doubles_single_quotes() {
        assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
        assert_eq!(quote_ident("plain"), "\"plain\"");
    }
}
