//! Domain types for the course catalog, degree requirements and student schedules

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RegistrarError, Result};
use crate::query::CourseQuery;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub full_name: String,
    pub abbr_name: String, // e.g., "CS"
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub course_number: String, // e.g., "121c"
    pub department_id: i64,
    pub credit_hours: u32,
}

/// How a requirement is measured. Holding one variant makes "hours or
/// classes, never both" impossible to violate once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "required", rename_all = "snake_case")]
pub enum RequirementThreshold {
    Hours(u32),
    Classes(u32),
}

impl RequirementThreshold {
    /// Builds a threshold from the two nullable columns a requirement is stored as.
    pub fn from_parts(
        name: &str,
        required_hours: Option<u32>,
        required_classes: Option<u32>,
    ) -> Result<Self> {
        match (required_hours, required_classes) {
            (Some(hours), None) => Ok(RequirementThreshold::Hours(hours)),
            (None, Some(classes)) => Ok(RequirementThreshold::Classes(classes)),
            _ => Err(RegistrarError::InvalidRequirement {
                name: name.to_string(),
            }),
        }
    }

    pub fn required_hours(&self) -> Option<u32> {
        match self {
            RequirementThreshold::Hours(h) => Some(*h),
            RequirementThreshold::Classes(_) => None,
        }
    }

    pub fn required_classes(&self) -> Option<u32> {
        match self {
            RequirementThreshold::Classes(c) => Some(*c),
            RequirementThreshold::Hours(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: i64,
    pub name: String,
    pub threshold: RequirementThreshold,
    pub query: CourseQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequirementSetKind {
    Major,
    Minor,
    Concentration,
}

impl RequirementSetKind {
    /// Numeric tag used in the `requirement_sets.kind` column.
    pub fn code(self) -> i64 {
        match self {
            RequirementSetKind::Major => 0,
            RequirementSetKind::Minor => 1,
            RequirementSetKind::Concentration => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(RequirementSetKind::Major),
            1 => Some(RequirementSetKind::Minor),
            2 => Some(RequirementSetKind::Concentration),
            _ => None,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            RequirementSetKind::Major => "Major",
            RequirementSetKind::Minor => "Minor",
            RequirementSetKind::Concentration => "Concentration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementSet {
    pub id: i64,
    pub name: String,
    pub department_id: i64,
    pub kind: RequirementSetKind,
    pub effective_date: NaiveDate,
    pub requirements: Vec<Requirement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: i64,
    pub name: String,
    pub enrollment_year: i32,
}

/// One declared major, optionally narrowed by a concentration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredMajor {
    pub id: i64,
    pub profile_id: i64,
    pub major_id: i64,
    pub concentration_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedCourse {
    pub profile_id: i64,
    pub course_id: i64,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub course_id: i64,
    pub capacity: u32,
    pub enrolled: u32,
    pub professor: String,
    pub location: String,
}

impl Section {
    pub fn open_seats(&self) -> u32 {
        self.capacity.saturating_sub(self.enrolled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingTime {
    pub id: i64,
    pub section_id: i64,
    pub day: u8, // 0 = Monday .. 6 = Sunday
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

impl MeetingTime {
    pub fn day_name(&self) -> &'static str {
        DAY_NAMES.get(self.day as usize).copied().unwrap_or("Unknown")
    }

    /// Two meetings conflict when they fall on the same day and their
    /// intervals overlap. Back-to-back meetings sharing an endpoint count.
    pub fn conflicts_with(&self, other: &MeetingTime) -> bool {
        self.day == other.day
            && self.start_time <= other.end_time
            && other.start_time <= self.end_time
    }
}

/// A section joined with its course, department and meeting times, the shape
/// consumed by search and schedule views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDetail {
    pub section: Section,
    pub course: Course,
    pub department_abbr: String,
    pub meetings: Vec<MeetingTime>,
}

impl SectionDetail {
    pub fn conflicts_with(&self, other: &SectionDetail) -> bool {
        self.meetings
            .iter()
            .any(|m| other.meetings.iter().any(|o| m.conflicts_with(o)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i64,
    pub name: String,
    pub profile_id: i64,
    pub updated: DateTime<Utc>,
    pub section_ids: Vec<i64>,
}
