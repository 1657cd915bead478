//! Requirements and requirement sets.

use chrono::NaiveDate;

use super::rows::{self, REQUIREMENT_COLUMNS, REQUIREMENT_SET_COLUMNS};
use super::{ensure_exists, or_not_found, RegistrarDb};
use crate::error::Result;
use crate::models::{Requirement, RequirementSet, RequirementSetKind, RequirementThreshold};
use crate::query::CourseQuery;

impl RegistrarDb {
    /// Stores a new requirement.
    ///
    /// Exactly one of `required_hours` / `required_classes` must be given, and the
    /// query must compile; otherwise nothing is written.
    pub fn create_requirement(
        &self,
        name: &str,
        required_hours: Option<u32>,
        required_classes: Option<u32>,
        query: &CourseQuery,
    ) -> Result<Requirement> {
        let threshold = RequirementThreshold::from_parts(name, required_hours, required_classes)?;
        query.compile()?;
        let raw_query = query.to_json()?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO requirements (name, required_hours, required_classes, course_query)
             VALUES (?1, ?2, ?3, ?4)",
            (
                name,
                threshold.required_hours(),
                threshold.required_classes(),
                &raw_query,
            ),
        )?;

        Ok(Requirement {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            threshold,
            query: query.clone(),
        })
    }

    pub fn get_requirement(&self, requirement_id: i64) -> Result<Requirement> {
        let conn = self.conn()?;
        or_not_found(
            conn.query_row(
                &format!("SELECT {REQUIREMENT_COLUMNS} FROM requirements r WHERE r.id = ?1"),
                [requirement_id],
                rows::requirement,
            ),
            "Requirement",
            requirement_id,
        )
    }

    pub fn create_requirement_set(
        &self,
        name: &str,
        department_id: i64,
        kind: RequirementSetKind,
        effective_date: NaiveDate,
    ) -> Result<RequirementSet> {
        let conn = self.conn()?;
        ensure_exists(&conn, "departments", "Department", department_id)?;
        conn.execute(
            "INSERT INTO requirement_sets (name, department_id, kind, effective_date)
             VALUES (?1, ?2, ?3, ?4)",
            (name, department_id, kind.code(), effective_date),
        )?;

        Ok(RequirementSet {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            department_id,
            kind,
            effective_date,
            requirements: Vec::new(),
        })
    }

    pub fn add_requirement_to_set(&self, set_id: i64, requirement_id: i64) -> Result<()> {
        let conn = self.conn()?;
        ensure_exists(&conn, "requirement_sets", "RequirementSet", set_id)?;
        ensure_exists(&conn, "requirements", "Requirement", requirement_id)?;
        conn.execute(
            "INSERT OR IGNORE INTO requirement_set_members (set_id, requirement_id) VALUES (?1, ?2)",
            (set_id, requirement_id),
        )?;
        Ok(())
    }

    /// Loads a requirement set together with its requirements, in creation order.
    pub fn get_requirement_set(&self, set_id: i64) -> Result<RequirementSet> {
        let conn = self.conn()?;
        let mut set = or_not_found(
            conn.query_row(
                &format!("SELECT {REQUIREMENT_SET_COLUMNS} FROM requirement_sets WHERE id = ?1"),
                [set_id],
                rows::requirement_set,
            ),
            "RequirementSet",
            set_id,
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {REQUIREMENT_COLUMNS}
             FROM requirement_set_members m
             JOIN requirements r ON m.requirement_id = r.id
             WHERE m.set_id = ?1
             ORDER BY r.id"
        ))?;
        set.requirements = stmt
            .query_map([set_id], rows::requirement)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(set)
    }
}
