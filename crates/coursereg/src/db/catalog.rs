//! Departments, courses, sections and meeting times.

use chrono::NaiveTime;
use rusqlite::{params, params_from_iter, OptionalExtension};
use std::collections::HashMap;
use tracing::debug;

use super::rows::{self, COURSE_COLUMNS, DEPARTMENT_COLUMNS, MEETING_COLUMNS};
use super::{ensure_exists, or_not_found, RegistrarDb};
use crate::error::{RegistrarError, Result};
use crate::models::{Course, Department, MeetingTime, Section, SectionDetail};
use crate::query::CourseQuery;

const SECTION_DETAIL_SQL: &str = "SELECT s.id, s.course_id, s.capacity, s.enrolled, s.professor, s.location,
        c.id, c.name, c.description, c.course_number, c.department_id, c.credit_hours,
        d.abbr_name
 FROM sections s
 JOIN courses c ON s.course_id = c.id
 JOIN departments d ON c.department_id = d.id";

impl RegistrarDb {
    pub fn create_department(&self, full_name: &str, abbr_name: &str) -> Result<Department> {
        let conn = self.conn()?;
        let abbr_name = abbr_name.to_uppercase();
        conn.execute(
            "INSERT INTO departments (full_name, abbr_name) VALUES (?1, ?2)",
            (full_name, &abbr_name),
        )?;

        Ok(Department {
            id: conn.last_insert_rowid(),
            full_name: full_name.to_string(),
            abbr_name,
        })
    }

    pub fn get_department(&self, department_id: i64) -> Result<Department> {
        let conn = self.conn()?;
        or_not_found(
            conn.query_row(
                &format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id = ?1"),
                [department_id],
                rows::department,
            ),
            "Department",
            department_id,
        )
    }

    pub fn department_by_abbr(&self, abbr_name: &str) -> Result<Option<Department>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                &format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE abbr_name = ?1"),
                [abbr_name.to_uppercase()],
                rows::department,
            )
            .optional()?)
    }

    pub fn list_departments(&self) -> Result<Vec<Department>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments ORDER BY abbr_name"
        ))?;
        let departments = stmt.query_map([], rows::department)?;
        Ok(departments.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn create_course(
        &self,
        name: &str,
        description: &str,
        course_number: &str,
        department_id: i64,
        credit_hours: u32,
    ) -> Result<Course> {
        let conn = self.conn()?;
        ensure_exists(&conn, "departments", "Department", department_id)?;
        conn.execute(
            "INSERT INTO courses (name, description, course_number, department_id, credit_hours)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (name, description, course_number, department_id, credit_hours),
        )?;

        Ok(Course {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            description: description.to_string(),
            course_number: course_number.to_string(),
            department_id,
            credit_hours,
        })
    }

    pub fn get_course(&self, course_id: i64) -> Result<Course> {
        let conn = self.conn()?;
        or_not_found(
            conn.query_row(
                &format!("SELECT {COURSE_COLUMNS} FROM courses c WHERE c.id = ?1"),
                [course_id],
                rows::course,
            ),
            "Course",
            course_id,
        )
    }

    /// Resolves a stored course query against the catalog, ordered by course id.
    pub fn courses_matching(&self, query: &CourseQuery) -> Result<Vec<Course>> {
        let filter = query.compile()?;
        debug!(clause = %filter.clause, "Resolving course query");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COURSE_COLUMNS}
             FROM courses c
             JOIN departments d ON c.department_id = d.id
             WHERE {}
             ORDER BY c.id",
            filter.clause
        ))?;
        let courses = stmt.query_map(params_from_iter(filter.params.iter()), rows::course)?;
        Ok(courses.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn add_prerequisite(&self, course_id: i64, prereq_id: i64) -> Result<()> {
        if course_id == prereq_id {
            return Err(RegistrarError::InvalidInput {
                message: format!("course {course_id} cannot be its own prerequisite"),
            });
        }

        let conn = self.conn()?;
        ensure_exists(&conn, "courses", "Course", course_id)?;
        ensure_exists(&conn, "courses", "Course", prereq_id)?;
        conn.execute(
            "INSERT OR IGNORE INTO course_prereqs (course_id, prereq_id) VALUES (?1, ?2)",
            (course_id, prereq_id),
        )?;
        Ok(())
    }

    pub fn prerequisites_of(&self, course_id: i64) -> Result<Vec<Course>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COURSE_COLUMNS}
             FROM course_prereqs p
             JOIN courses c ON p.prereq_id = c.id
             WHERE p.course_id = ?1
             ORDER BY c.id"
        ))?;
        let courses = stmt.query_map([course_id], rows::course)?;
        Ok(courses.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Records that two courses are offered under each other's numbers.
    pub fn add_cross_listing(&self, course_id: i64, other_id: i64) -> Result<()> {
        if course_id == other_id {
            return Err(RegistrarError::InvalidInput {
                message: format!("course {course_id} cannot be cross-listed with itself"),
            });
        }

        let conn = self.conn()?;
        ensure_exists(&conn, "courses", "Course", course_id)?;
        ensure_exists(&conn, "courses", "Course", other_id)?;
        let (a, b) = (course_id.min(other_id), course_id.max(other_id));
        conn.execute(
            "INSERT OR IGNORE INTO course_cross_listings (course_a, course_b) VALUES (?1, ?2)",
            (a, b),
        )?;
        Ok(())
    }

    pub fn cross_listings_of(&self, course_id: i64) -> Result<Vec<Course>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COURSE_COLUMNS}
             FROM course_cross_listings x
             JOIN courses c ON c.id = CASE WHEN x.course_a = ?1 THEN x.course_b ELSE x.course_a END
             WHERE x.course_a = ?1 OR x.course_b = ?1
             ORDER BY c.id"
        ))?;
        let courses = stmt.query_map([course_id], rows::course)?;
        Ok(courses.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn create_section(
        &self,
        course_id: i64,
        capacity: u32,
        enrolled: u32,
        professor: &str,
        location: &str,
    ) -> Result<Section> {
        let conn = self.conn()?;
        ensure_exists(&conn, "courses", "Course", course_id)?;
        conn.execute(
            "INSERT INTO sections (course_id, capacity, enrolled, professor, location)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (course_id, capacity, enrolled, professor, location),
        )?;

        Ok(Section {
            id: conn.last_insert_rowid(),
            course_id,
            capacity,
            enrolled,
            professor: professor.to_string(),
            location: location.to_string(),
        })
    }

    pub fn add_meeting_time(
        &self,
        section_id: i64,
        day: u8,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<MeetingTime> {
        if day > 6 {
            return Err(RegistrarError::InvalidInput {
                message: format!("day index {day} is outside 0 (Monday) ..= 6 (Sunday)"),
            });
        }
        if end_time < start_time {
            return Err(RegistrarError::InvalidInput {
                message: format!("meeting ends ({end_time}) before it starts ({start_time})"),
            });
        }

        let conn = self.conn()?;
        ensure_exists(&conn, "sections", "Section", section_id)?;
        conn.execute(
            "INSERT INTO meeting_times (section_id, day, start_time, end_time)
             VALUES (?1, ?2, ?3, ?4)",
            params![section_id, day, start_time, end_time],
        )?;

        Ok(MeetingTime {
            id: conn.last_insert_rowid(),
            section_id,
            day,
            start_time,
            end_time,
        })
    }

    pub fn meetings_for_section(&self, section_id: i64) -> Result<Vec<MeetingTime>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MEETING_COLUMNS} FROM meeting_times
             WHERE section_id = ?1
             ORDER BY day, start_time"
        ))?;
        let meetings = stmt.query_map([section_id], rows::meeting)?;
        Ok(meetings.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn section_detail(&self, section_id: i64) -> Result<SectionDetail> {
        self.section_details(&[section_id])?
            .pop()
            .ok_or_else(|| RegistrarError::not_found("Section", section_id))
    }

    /// Loads the given sections with course, department and meetings, in id order.
    /// Unknown ids are skipped.
    pub fn section_details(&self, section_ids: &[i64]) -> Result<Vec<SectionDetail>> {
        if section_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; section_ids.len()].join(", ");
        self.load_section_details(
            &format!("WHERE s.id IN ({placeholders})"),
            section_ids,
        )
    }

    /// Every offered section, the starting candidate list for a search.
    pub fn all_section_details(&self) -> Result<Vec<SectionDetail>> {
        self.load_section_details("", &[])
    }

    fn load_section_details(&self, where_clause: &str, ids: &[i64]) -> Result<Vec<SectionDetail>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!("{SECTION_DETAIL_SQL} {where_clause} ORDER BY s.id"))?;
        let details: Vec<SectionDetail> = stmt
            .query_map(params_from_iter(ids.iter()), |row| {
                Ok(SectionDetail {
                    section: rows::section(row)?,
                    course: rows::course_at(row, 6)?,
                    department_abbr: row.get(12)?,
                    meetings: Vec::new(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut meeting_stmt = conn.prepare(&format!(
            "SELECT {MEETING_COLUMNS} FROM meeting_times ORDER BY day, start_time"
        ))?;
        let mut meetings_by_section: HashMap<i64, Vec<MeetingTime>> = HashMap::new();
        for meeting in meeting_stmt.query_map([], rows::meeting)? {
            let meeting = meeting?;
            meetings_by_section
                .entry(meeting.section_id)
                .or_default()
                .push(meeting);
        }

        Ok(details
            .into_iter()
            .map(|mut detail| {
                detail.meetings = meetings_by_section
                    .remove(&detail.section.id)
                    .unwrap_or_default();
                detail
            })
            .collect())
    }
}
