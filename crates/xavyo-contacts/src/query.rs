//! Predicate fragments for persisted-contact queries.
//!
//! When the host searches its own contact table across several storages it
//! asks each storage to contribute a predicate. Storages that keep
//! placeholder rows for contacts they serve from elsewhere (the team
//! directory does) OR in a clause scoping those rows; the host renders the
//! result into its SQL with [`ContactQuery::to_sql`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::TenantId;

/// A bound value in a predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Uuid(Uuid),
    Text(String),
}

impl From<TenantId> for QueryValue {
    fn from(id: TenantId) -> Self {
        QueryValue::Uuid(*id.as_uuid())
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::Text(s.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::Text(s)
    }
}

/// Boolean predicate over persisted contact columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// Match rows where column equals value.
    Equals { column: String, value: QueryValue },

    /// Logical AND of multiple predicates.
    And { predicates: Vec<Predicate> },

    /// Logical OR of multiple predicates.
    Or { predicates: Vec<Predicate> },
}

impl Predicate {
    /// Create an equals predicate.
    pub fn eq(column: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        Predicate::Equals {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Create an AND predicate.
    pub fn and(predicates: Vec<Predicate>) -> Self {
        Predicate::And { predicates }
    }

    /// Create an OR predicate.
    pub fn or(predicates: Vec<Predicate>) -> Self {
        Predicate::Or { predicates }
    }

    fn render(&self, sql: &mut String, binds: &mut Vec<QueryValue>, first_param: usize) {
        match self {
            Predicate::Equals { column, value } => {
                binds.push(value.clone());
                sql.push_str(&format!("{} = ${}", column, first_param + binds.len() - 1));
            }
            Predicate::And { predicates } => {
                Self::render_group(predicates, " AND ", sql, binds, first_param)
            }
            Predicate::Or { predicates } => {
                Self::render_group(predicates, " OR ", sql, binds, first_param)
            }
        }
    }

    fn render_group(
        predicates: &[Predicate],
        joiner: &str,
        sql: &mut String,
        binds: &mut Vec<QueryValue>,
        first_param: usize,
    ) {
        if predicates.is_empty() {
            sql.push_str(if joiner == " AND " { "TRUE" } else { "FALSE" });
            return;
        }
        sql.push('(');
        for (i, predicate) in predicates.iter().enumerate() {
            if i > 0 {
                sql.push_str(joiner);
            }
            predicate.render(sql, binds, first_param);
        }
        sql.push(')');
    }
}

/// A persisted-contact query being assembled from storage contributions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactQuery {
    predicate: Option<Predicate>,
}

impl ContactQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// OR `predicate` into the query.
    pub fn or_where(&mut self, predicate: Predicate) -> &mut Self {
        self.predicate = Some(match self.predicate.take() {
            None => predicate,
            Some(Predicate::Or { mut predicates }) => {
                predicates.push(predicate);
                Predicate::Or { predicates }
            }
            Some(existing) => Predicate::or(vec![existing, predicate]),
        });
        self
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.predicate.is_none()
    }

    /// Render to a parameterised SQL condition.
    ///
    /// Placeholders are numbered from `first_param` so the fragment can be
    /// appended to a statement that already binds earlier parameters.
    /// Column names are trusted; values are always bound.
    pub fn to_sql(&self, first_param: usize) -> (String, Vec<QueryValue>) {
        let mut sql = String::new();
        let mut binds = Vec::new();
        match &self.predicate {
            Some(predicate) => predicate.render(&mut sql, &mut binds, first_param),
            None => sql.push_str("TRUE"),
        }
        (sql, binds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_matches_everything() {
        let (sql, binds) = ContactQuery::new().to_sql(1);
        assert_eq!(sql, "TRUE");
        assert!(binds.is_empty());
    }

    #[test]
    fn test_single_predicate() {
        let mut query = ContactQuery::new();
        query.or_where(Predicate::eq("storage", "personal"));

        let (sql, binds) = query.to_sql(1);
        assert_eq!(sql, "storage = $1");
        assert_eq!(binds, vec![QueryValue::Text("personal".to_string())]);
    }

    #[test]
    fn test_or_where_flattens() {
        let tenant = TenantId::new();
        let mut query = ContactQuery::new();
        query
            .or_where(Predicate::eq("storage", "personal"))
            .or_where(Predicate::eq("storage", "shared"))
            .or_where(Predicate::and(vec![
                Predicate::eq("tenant_id", tenant),
                Predicate::eq("storage", "team"),
            ]));

        let (sql, binds) = query.to_sql(2);
        assert_eq!(
            sql,
            "(storage = $2 OR storage = $3 OR (tenant_id = $4 AND storage = $5))"
        );
        assert_eq!(binds.len(), 4);
        assert_eq!(binds[2], QueryValue::Uuid(*tenant.as_uuid()));
    }

    #[test]
    fn test_empty_groups() {
        let mut query = ContactQuery::new();
        query.or_where(Predicate::or(vec![]));
        assert_eq!(query.to_sql(1).0, "FALSE");

        let mut query = ContactQuery::new();
        query.or_where(Predicate::and(vec![]));
        assert_eq!(query.to_sql(1).0, "TRUE");
    }
}
