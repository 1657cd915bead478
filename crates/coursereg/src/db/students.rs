//! Student profiles and their declared programs and completed coursework.

use super::rows::{self, REQUIREMENT_SET_COLUMNS};
use super::{ensure_exists, or_not_found, RegistrarDb};
use crate::error::{RegistrarError, Result};
use crate::models::{CompletedCourse, DeclaredMajor, RequirementSet, RequirementSetKind, StudentProfile};

impl RegistrarDb {
    pub fn create_profile(&self, name: &str, enrollment_year: i32) -> Result<StudentProfile> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO profiles (name, enrollment_year) VALUES (?1, ?2)",
            (name, enrollment_year),
        )?;

        Ok(StudentProfile {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            enrollment_year,
        })
    }

    pub fn get_profile(&self, profile_id: i64) -> Result<StudentProfile> {
        let conn = self.conn()?;
        or_not_found(
            conn.query_row(
                "SELECT id, name, enrollment_year FROM profiles WHERE id = ?1",
                [profile_id],
                rows::profile,
            ),
            "Profile",
            profile_id,
        )
    }

    pub fn add_minor(&self, profile_id: i64, set_id: i64) -> Result<()> {
        let kind = self.requirement_set_kind(set_id)?;
        if kind != RequirementSetKind::Minor {
            return Err(RegistrarError::InvalidInput {
                message: format!("requirement set {set_id} is a {}, not a Minor", kind.type_name()),
            });
        }

        let conn = self.conn()?;
        ensure_exists(&conn, "profiles", "Profile", profile_id)?;
        conn.execute(
            "INSERT OR IGNORE INTO profile_minors (profile_id, set_id) VALUES (?1, ?2)",
            (profile_id, set_id),
        )?;
        Ok(())
    }

    /// Declares a major for a student, optionally with one concentration.
    pub fn declare_major(
        &self,
        profile_id: i64,
        major_id: i64,
        concentration_id: Option<i64>,
    ) -> Result<DeclaredMajor> {
        let kind = self.requirement_set_kind(major_id)?;
        if kind != RequirementSetKind::Major {
            return Err(RegistrarError::InvalidInput {
                message: format!("requirement set {major_id} is a {}, not a Major", kind.type_name()),
            });
        }
        if let Some(concentration_id) = concentration_id {
            let kind = self.requirement_set_kind(concentration_id)?;
            if kind != RequirementSetKind::Concentration {
                return Err(RegistrarError::InvalidInput {
                    message: format!(
                        "requirement set {concentration_id} is a {}, not a Concentration",
                        kind.type_name()
                    ),
                });
            }
        }

        let conn = self.conn()?;
        ensure_exists(&conn, "profiles", "Profile", profile_id)?;
        conn.execute(
            "INSERT INTO declared_majors (profile_id, major_id, concentration_id) VALUES (?1, ?2, ?3)",
            (profile_id, major_id, concentration_id),
        )?;

        Ok(DeclaredMajor {
            id: conn.last_insert_rowid(),
            profile_id,
            major_id,
            concentration_id,
        })
    }

    pub fn declared_majors_for(&self, profile_id: i64) -> Result<Vec<DeclaredMajor>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, profile_id, major_id, concentration_id
             FROM declared_majors
             WHERE profile_id = ?1
             ORDER BY id",
        )?;
        let majors = stmt.query_map([profile_id], |row| {
            Ok(DeclaredMajor {
                id: row.get(0)?,
                profile_id: row.get(1)?,
                major_id: row.get(2)?,
                concentration_id: row.get(3)?,
            })
        })?;
        Ok(majors.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Minor requirement sets for a student, with their requirements loaded.
    pub fn minors_for(&self, profile_id: i64) -> Result<Vec<RequirementSet>> {
        let set_ids: Vec<i64> = {
            let conn = self.conn()?;
            let mut stmt = conn.prepare(
                "SELECT set_id FROM profile_minors WHERE profile_id = ?1 ORDER BY set_id",
            )?;
            let ids = stmt.query_map([profile_id], |row| row.get(0))?;
            ids.collect::<rusqlite::Result<Vec<_>>>()?
        };

        set_ids
            .into_iter()
            .map(|id| self.get_requirement_set(id))
            .collect()
    }

    /// Records (or regrades) a completed course.
    pub fn record_completed_course(&self, profile_id: i64, course_id: i64, grade: &str) -> Result<()> {
        let conn = self.conn()?;
        ensure_exists(&conn, "profiles", "Profile", profile_id)?;
        ensure_exists(&conn, "courses", "Course", course_id)?;
        conn.execute(
            "INSERT OR REPLACE INTO completed_courses (profile_id, course_id, grade) VALUES (?1, ?2, ?3)",
            (profile_id, course_id, grade),
        )?;
        Ok(())
    }

    pub fn completed_courses_for(&self, profile_id: i64) -> Result<Vec<CompletedCourse>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT profile_id, course_id, grade
             FROM completed_courses
             WHERE profile_id = ?1
             ORDER BY course_id",
        )?;
        let completed = stmt.query_map([profile_id], |row| {
            Ok(CompletedCourse {
                profile_id: row.get(0)?,
                course_id: row.get(1)?,
                grade: row.get(2)?,
            })
        })?;
        Ok(completed.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn requirement_set_kind(&self, set_id: i64) -> Result<RequirementSetKind> {
        let conn = self.conn()?;
        let set = or_not_found(
            conn.query_row(
                &format!("SELECT {REQUIREMENT_SET_COLUMNS} FROM requirement_sets WHERE id = ?1"),
                [set_id],
                rows::requirement_set,
            ),
            "RequirementSet",
            set_id,
        )?;
        Ok(set.kind)
    }
}
