//! Types for requirement progress reports

use serde::{Deserialize, Serialize};

use crate::models::{Course, RequirementSetKind, RequirementThreshold};

/// Progress state of a single course, or of a whole requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseStatus {
    Unfulfilled,
    Fulfilled,
    ScheduledButNotCompleted,
}

/// Amount counted toward a threshold, in the threshold's own unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub completed: u32,
    pub scheduled: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseProgress {
    pub course: Course,
    pub status: CourseStatus,
}

/// Evaluation of one requirement for one student and schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementReport {
    pub requirement_id: i64,
    pub name: String,
    pub threshold: RequirementThreshold,
    pub status: CourseStatus,
    pub tally: Tally,
    pub courses: Vec<CourseProgress>,
}

/// Evaluation of every requirement in a major, minor or concentration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementSetReport {
    pub set_id: i64,
    pub name: String,
    pub kind: RequirementSetKind,
    pub type_name: String,
    pub status: CourseStatus,
    pub requirements: Vec<RequirementReport>,
}
