//! Row decoders shared by the repository submodules.

use rusqlite::types::Type;
use rusqlite::Row;

use crate::models::{
    Course, Department, MeetingTime, Requirement, RequirementSet, RequirementSetKind,
    RequirementThreshold, Section, StudentProfile,
};
use crate::query::CourseQuery;

pub const DEPARTMENT_COLUMNS: &str = "id, full_name, abbr_name";
pub const COURSE_COLUMNS: &str =
    "c.id, c.name, c.description, c.course_number, c.department_id, c.credit_hours";
pub const MEETING_COLUMNS: &str = "id, section_id, day, start_time, end_time";
pub const REQUIREMENT_COLUMNS: &str =
    "r.id, r.name, r.required_hours, r.required_classes, r.course_query";
pub const REQUIREMENT_SET_COLUMNS: &str = "id, name, department_id, kind, effective_date";

pub fn department(row: &Row) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get(0)?,
        full_name: row.get(1)?,
        abbr_name: row.get(2)?,
    })
}

/// Decodes a course starting at column `offset`.
pub fn course_at(row: &Row, offset: usize) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        description: row.get(offset + 2)?,
        course_number: row.get(offset + 3)?,
        department_id: row.get(offset + 4)?,
        credit_hours: row.get(offset + 5)?,
    })
}

pub fn course(row: &Row) -> rusqlite::Result<Course> {
    course_at(row, 0)
}

pub fn section(row: &Row) -> rusqlite::Result<Section> {
    Ok(Section {
        id: row.get(0)?,
        course_id: row.get(1)?,
        capacity: row.get(2)?,
        enrolled: row.get(3)?,
        professor: row.get(4)?,
        location: row.get(5)?,
    })
}

pub fn meeting(row: &Row) -> rusqlite::Result<MeetingTime> {
    Ok(MeetingTime {
        id: row.get(0)?,
        section_id: row.get(1)?,
        day: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
    })
}

pub fn profile(row: &Row) -> rusqlite::Result<StudentProfile> {
    Ok(StudentProfile {
        id: row.get(0)?,
        name: row.get(1)?,
        enrollment_year: row.get(2)?,
    })
}

pub fn requirement(row: &Row) -> rusqlite::Result<Requirement> {
    let name: String = row.get(1)?;
    let hours: Option<u32> = row.get(2)?;
    let classes: Option<u32> = row.get(3)?;
    let raw_query: String = row.get(4)?;

    let threshold = RequirementThreshold::from_parts(&name, hours, classes)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Integer, Box::new(e)))?;
    let query = CourseQuery::from_json(&raw_query)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Requirement {
        id: row.get(0)?,
        name,
        threshold,
        query,
    })
}

/// Decodes the set header only; requirements are attached by the caller.
pub fn requirement_set(row: &Row) -> rusqlite::Result<RequirementSet> {
    let code: i64 = row.get(3)?;
    let kind = RequirementSetKind::from_code(code).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Integer,
            format!("unknown requirement set kind {code}").into(),
        )
    })?;

    Ok(RequirementSet {
        id: row.get(0)?,
        name: row.get(1)?,
        department_id: row.get(2)?,
        kind,
        effective_date: row.get(4)?,
        requirements: Vec::new(),
    })
}
