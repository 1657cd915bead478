//! Versioned course query descriptors.
//!
//! A requirement stores which courses count toward it as a small predicate
//! tree instead of an opaque query object. The tree is serialized as JSON in the
//! `requirements.course_query` column and compiled to a SQL `WHERE` clause by
//! [`CourseQuery::compile`] whenever the course set has to be resolved.

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::error::{RegistrarError, Result};

/// Current descriptor format. Bump when the shape of [`CourseFilter`] changes.
pub const QUERY_VERSION: u32 = 1;

/// Course attribute a predicate can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseField {
    Id,
    Name,
    CourseNumber,
    CreditHours,
    DepartmentId,
    /// Department abbreviation, e.g. "CS"
    Department,
}

impl CourseField {
    fn column(self) -> &'static str {
        match self {
            CourseField::Id => "c.id",
            CourseField::Name => "c.name",
            CourseField::CourseNumber => "c.course_number",
            CourseField::CreditHours => "c.credit_hours",
            CourseField::DepartmentId => "c.department_id",
            CourseField::Department => "d.abbr_name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    /// Case-insensitive substring match, text values only
    Contains,
    Gte,
    Lte,
    /// Membership in a list value
    In,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Integer(i64),
    Text(String),
    List(Vec<QueryValue>),
}

impl QueryValue {
    fn to_sql(&self) -> Result<Value> {
        match self {
            QueryValue::Integer(i) => Ok(Value::Integer(*i)),
            QueryValue::Text(s) => Ok(Value::Text(s.clone())),
            QueryValue::List(_) => Err(RegistrarError::InvalidQuery {
                message: "nested list values are not supported".to_string(),
            }),
        }
    }
}

/// Predicate tree over courses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CourseFilter {
    /// Every course
    Everything,
    /// Logical AND; empty matches everything
    All { of: Vec<CourseFilter> },
    /// Logical OR; empty matches nothing
    Any { of: Vec<CourseFilter> },
    Not { filter: Box<CourseFilter> },
    Predicate {
        field: CourseField,
        op: Operator,
        value: QueryValue,
    },
}

impl CourseFilter {
    pub fn predicate(field: CourseField, op: Operator, value: QueryValue) -> Self {
        CourseFilter::Predicate { field, op, value }
    }

    pub fn department(abbr: &str) -> Self {
        Self::predicate(
            CourseField::Department,
            Operator::Eq,
            QueryValue::Text(abbr.to_uppercase()),
        )
    }

    pub fn course_number(number: &str) -> Self {
        Self::predicate(
            CourseField::CourseNumber,
            Operator::Eq,
            QueryValue::Text(number.to_string()),
        )
    }

    pub fn ids(ids: &[i64]) -> Self {
        Self::predicate(
            CourseField::Id,
            Operator::In,
            QueryValue::List(ids.iter().copied().map(QueryValue::Integer).collect()),
        )
    }

    pub fn and(self, other: CourseFilter) -> Self {
        match self {
            CourseFilter::All { mut of } => {
                of.push(other);
                CourseFilter::All { of }
            }
            first => CourseFilter::All {
                of: vec![first, other],
            },
        }
    }

    pub fn or(self, other: CourseFilter) -> Self {
        match self {
            CourseFilter::Any { mut of } => {
                of.push(other);
                CourseFilter::Any { of }
            }
            first => CourseFilter::Any {
                of: vec![first, other],
            },
        }
    }

    pub fn negate(self) -> Self {
        CourseFilter::Not {
            filter: Box::new(self),
        }
    }

    fn write_sql(&self, sql: &mut String, params: &mut Vec<Value>) -> Result<()> {
        match self {
            CourseFilter::Everything => sql.push('1'),
            CourseFilter::All { of } => write_group(of, " AND ", "1", sql, params)?,
            CourseFilter::Any { of } => write_group(of, " OR ", "0", sql, params)?,
            CourseFilter::Not { filter } => {
                sql.push_str("NOT (");
                filter.write_sql(sql, params)?;
                sql.push(')');
            }
            CourseFilter::Predicate { field, op, value } => {
                write_predicate(*field, *op, value, sql, params)?
            }
        }
        Ok(())
    }
}

fn write_group(
    filters: &[CourseFilter],
    joiner: &str,
    empty: &str,
    sql: &mut String,
    params: &mut Vec<Value>,
) -> Result<()> {
    if filters.is_empty() {
        sql.push_str(empty);
        return Ok(());
    }

    sql.push('(');
    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            sql.push_str(joiner);
        }
        filter.write_sql(sql, params)?;
    }
    sql.push(')');
    Ok(())
}

fn write_predicate(
    field: CourseField,
    op: Operator,
    value: &QueryValue,
    sql: &mut String,
    params: &mut Vec<Value>,
) -> Result<()> {
    let column = field.column();
    match (op, value) {
        (Operator::In, QueryValue::List(items)) => {
            if items.is_empty() {
                sql.push('0');
                return Ok(());
            }
            let placeholders = vec!["?"; items.len()].join(", ");
            sql.push_str(&format!("{column} IN ({placeholders})"));
            for item in items {
                params.push(item.to_sql()?);
            }
        }
        (Operator::In, _) => {
            return Err(RegistrarError::InvalidQuery {
                message: format!("'in' on {column} requires a list value"),
            })
        }
        (Operator::Contains, QueryValue::Text(text)) => {
            sql.push_str(&format!("{column} LIKE ? ESCAPE '\\'"));
            params.push(Value::Text(format!("%{}%", escape_like(text))));
        }
        (Operator::Contains, _) => {
            return Err(RegistrarError::InvalidQuery {
                message: format!("'contains' on {column} requires a text value"),
            })
        }
        (_, QueryValue::List(_)) => {
            return Err(RegistrarError::InvalidQuery {
                message: format!("{op:?} on {column} requires a scalar value"),
            })
        }
        (Operator::Eq, v) => {
            sql.push_str(&format!("{column} = ?"));
            params.push(v.to_sql()?);
        }
        (Operator::Gte, v) => {
            sql.push_str(&format!("{column} >= ?"));
            params.push(v.to_sql()?);
        }
        (Operator::Lte, v) => {
            sql.push_str(&format!("{column} <= ?"));
            params.push(v.to_sql()?);
        }
    }
    Ok(())
}

fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// A compiled `WHERE` clause and its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFilter {
    pub clause: String,
    pub params: Vec<Value>,
}

/// Stored descriptor identifying the courses that count toward a requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseQuery {
    pub version: u32,
    pub filter: CourseFilter,
}

impl CourseQuery {
    pub fn new(filter: CourseFilter) -> Self {
        Self {
            version: QUERY_VERSION,
            filter,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a stored descriptor, rejecting versions this build cannot evaluate.
    pub fn from_json(raw: &str) -> Result<Self> {
        let query: CourseQuery = serde_json::from_str(raw).map_err(|e| {
            RegistrarError::InvalidQuery {
                message: e.to_string(),
            }
        })?;

        if query.version != QUERY_VERSION {
            return Err(RegistrarError::InvalidQuery {
                message: format!(
                    "unsupported query version {} (expected {})",
                    query.version, QUERY_VERSION
                ),
            });
        }

        Ok(query)
    }

    /// Compiles the predicate tree against the `courses c JOIN departments d` projection.
    pub fn compile(&self) -> Result<SqlFilter> {
        let mut clause = String::new();
        let mut params = Vec::new();
        self.filter.write_sql(&mut clause, &mut params)?;
        Ok(SqlFilter { clause, params })
    }
}

impl From<CourseFilter> for CourseQuery {
    fn from(filter: CourseFilter) -> Self {
        Self::new(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_department_and_number() {
        let query = CourseQuery::new(
            CourseFilter::department("cs").and(CourseFilter::course_number("101")),
        );
        let sql = query.compile().unwrap();

        assert_eq!(sql.clause, "(d.abbr_name = ? AND c.course_number = ?)");
        assert_eq!(
            sql.params,
            vec![Value::Text("CS".to_string()), Value::Text("101".to_string())]
        );
    }

    #[test]
    fn test_compile_or_chain() {
        let query = CourseQuery::new(
            CourseFilter::department("cs")
                .or(CourseFilter::department("math"))
                .or(CourseFilter::course_number("52L")),
        );
        let sql = query.compile().unwrap();

        assert_eq!(
            sql.clause,
            "(d.abbr_name = ? OR d.abbr_name = ? OR c.course_number = ?)"
        );
        assert_eq!(sql.params.len(), 3);
    }

    #[test]
    fn test_compile_empty_groups() {
        let none = CourseQuery::new(CourseFilter::Any { of: vec![] });
        assert_eq!(none.compile().unwrap().clause, "0");

        let all = CourseQuery::new(CourseFilter::All { of: vec![] });
        assert_eq!(all.compile().unwrap().clause, "1");

        let no_ids = CourseQuery::new(CourseFilter::ids(&[]));
        assert_eq!(no_ids.compile().unwrap().clause, "0");
    }

    #[test]
    fn test_compile_contains_escapes_wildcards() {
        let query = CourseQuery::new(CourseFilter::predicate(
            CourseField::Name,
            Operator::Contains,
            QueryValue::Text("100%_done".to_string()),
        ));
        let sql = query.compile().unwrap();

        assert_eq!(sql.clause, "c.name LIKE ? ESCAPE '\\'");
        assert_eq!(sql.params, vec![Value::Text("%100\\%\\_done%".to_string())]);
    }

    #[test]
    fn test_compile_rejects_mismatched_values() {
        let bad_in = CourseQuery::new(CourseFilter::predicate(
            CourseField::Id,
            Operator::In,
            QueryValue::Integer(4),
        ));
        assert!(bad_in.compile().is_err());

        let bad_contains = CourseQuery::new(CourseFilter::predicate(
            CourseField::CreditHours,
            Operator::Contains,
            QueryValue::Integer(4),
        ));
        assert!(bad_contains.compile().is_err());
    }

    #[test]
    fn test_json_round_trip_and_version_check() {
        let query = CourseQuery::new(CourseFilter::ids(&[1, 2]).negate());
        let raw = query.to_json().unwrap();
        assert_eq!(CourseQuery::from_json(&raw).unwrap(), query);

        let future = raw.replace("\"version\":1", "\"version\":2");
        assert!(matches!(
            CourseQuery::from_json(&future),
            Err(RegistrarError::InvalidQuery { .. })
        ));
    }
}
