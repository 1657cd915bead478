//! Section search.
//!
//! A search is a fixed chain of narrowing stages over the offered sections.
//! Every stage ignores parameters that are absent, blank or malformed, so a
//! bad value widens the result instead of failing the request.

mod course_number;

pub use course_number::{CourseNumber, NO_LETTER, UNPARSEABLE_NUMBER};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::RegistrarDb;
use crate::error::Result;
use crate::models::{MeetingTime, SectionDetail};

/// Raw query-string parameters of a section search.
///
/// Everything is kept as text so that a malformed value is dropped by its
/// stage rather than rejected by the extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub name: Option<String>,
    pub professor: Option<String>,
    pub department: Option<String>,
    pub credit_hours: Option<String>,
    pub mon: Option<String>,
    pub tue: Option<String>,
    pub wed: Option<String>,
    pub thu: Option<String>,
    pub fri: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub course_number_lower: Option<String>,
    pub course_number_upper: Option<String>,
}

fn param(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn flag(value: &Option<String>) -> bool {
    match param(value) {
        Some(v) => !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "off" | "no"),
        None => false,
    }
}

/// Parses "8:30", "08:30:00" or "8:30 AM". Anything else is no constraint.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

impl SearchParams {
    /// Selected weekdays as day indices (0 = Monday).
    pub fn selected_days(&self) -> Vec<u8> {
        [&self.mon, &self.tue, &self.wed, &self.thu, &self.fri]
            .into_iter()
            .enumerate()
            .filter(|(_, v)| flag(v))
            .map(|(i, _)| i as u8)
            .collect()
    }
}

type Stage = fn(&SearchParams, Vec<SectionDetail>) -> Vec<SectionDetail>;

/// The chain, in application order.
const STAGES: [(&str, Stage); 6] = [
    ("professor", filter_professor),
    ("name", filter_name),
    ("department", filter_department),
    ("credit_hours", filter_credit_hours),
    ("day_time", filter_day_time),
    ("course_number", filter_course_number),
];

/// Runs every stage in order; each one narrows the previous stage's output.
pub fn apply_filters(params: &SearchParams, candidates: Vec<SectionDetail>) -> Vec<SectionDetail> {
    STAGES
        .iter()
        .fold(candidates, |sections, &(stage, filter)| {
            let before = sections.len();
            let after = filter(params, sections);
            debug!(stage, before, after = after.len(), "Applied search stage");
            after
        })
}

/// Searches every offered section, ordered by department, course number and section id.
pub fn search_sections(db: &RegistrarDb, params: &SearchParams) -> Result<Vec<SectionDetail>> {
    let mut results = apply_filters(params, db.all_section_details()?);
    results.sort_by(|a, b| {
        a.department_abbr
            .cmp(&b.department_abbr)
            .then_with(|| {
                CourseNumber::parse(&a.course.course_number)
                    .cmp(&CourseNumber::parse(&b.course.course_number))
            })
            .then_with(|| a.section.id.cmp(&b.section.id))
    });
    Ok(results)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn filter_name(params: &SearchParams, sections: Vec<SectionDetail>) -> Vec<SectionDetail> {
    let Some(name) = param(&params.name) else {
        return sections;
    };
    sections
        .into_iter()
        .filter(|s| contains_ignore_case(&s.course.name, name))
        .collect()
}

pub fn filter_professor(params: &SearchParams, sections: Vec<SectionDetail>) -> Vec<SectionDetail> {
    let Some(professor) = param(&params.professor) else {
        return sections;
    };
    sections
        .into_iter()
        .filter(|s| contains_ignore_case(&s.section.professor, professor))
        .collect()
}

pub fn filter_department(params: &SearchParams, sections: Vec<SectionDetail>) -> Vec<SectionDetail> {
    let Some(department) = param(&params.department) else {
        return sections;
    };
    let department = department.to_uppercase();
    sections
        .into_iter()
        .filter(|s| s.department_abbr == department)
        .collect()
}

pub fn filter_credit_hours(params: &SearchParams, sections: Vec<SectionDetail>) -> Vec<SectionDetail> {
    let Some(hours) = param(&params.credit_hours).and_then(|h| h.parse::<u32>().ok()) else {
        return sections;
    };
    sections
        .into_iter()
        .filter(|s| s.course.credit_hours == hours)
        .collect()
}

/// Keeps sections with at least one meeting on a selected day that also
/// satisfies the time constraint.
pub fn filter_day_time(params: &SearchParams, sections: Vec<SectionDetail>) -> Vec<SectionDetail> {
    let days = params.selected_days();
    let start = param(&params.start_time).and_then(parse_time);
    let end = param(&params.end_time).and_then(parse_time);

    if days.is_empty() && start.is_none() && end.is_none() {
        return sections;
    }

    let meeting_matches = |m: &MeetingTime| {
        let on_day = days.is_empty() || days.contains(&m.day);
        let in_time = match (start, end) {
            (Some(start), Some(end)) => m.start_time >= start && m.end_time <= end,
            (Some(start), None) => m.start_time == start,
            (None, Some(end)) => m.end_time == end,
            (None, None) => true,
        };
        on_day && in_time
    };

    sections
        .into_iter()
        .filter(|s| s.meetings.iter().any(|m| meeting_matches(m)))
        .collect()
}

pub fn filter_course_number(params: &SearchParams, sections: Vec<SectionDetail>) -> Vec<SectionDetail> {
    match (
        param(&params.course_number_lower),
        param(&params.course_number_upper),
    ) {
        (Some(lower), Some(upper)) => {
            let lower = CourseNumber::parse(lower);
            let upper = CourseNumber::parse(upper);
            sections
                .into_iter()
                .filter(|s| CourseNumber::parse(&s.course.course_number).in_range(&lower, &upper))
                .collect()
        }
        (Some(exact), None) => {
            let exact = exact.to_uppercase();
            sections
                .into_iter()
                .filter(|s| s.course.course_number.trim().to_uppercase() == exact)
                .collect()
        }
        _ => sections,
    }
}
