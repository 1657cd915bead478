//! Course-status and fulfillment computations.
//!
//! These are pure functions over already-resolved inputs; [`super::RequirementEvaluator`]
//! does the store lookups.

use std::collections::{BTreeMap, HashMap};

use super::types::{CourseStatus, Tally};
use crate::models::{CompletedCourse, Course, RequirementThreshold, Section};

/// Status of every course in a requirement's course set, keyed by course id.
pub type CourseStatuses = BTreeMap<i64, CourseStatus>;

/// Marks each course of `course_set` as unfulfilled, fulfilled or scheduled.
///
/// Passes run in a fixed order: initialize, completed courses, scheduled
/// sections. A course that is both completed and scheduled therefore ends up
/// `ScheduledButNotCompleted`.
pub fn course_statuses(
    course_set: &[Course],
    completed: &[CompletedCourse],
    scheduled: &[Section],
) -> CourseStatuses {
    let mut statuses: CourseStatuses = course_set
        .iter()
        .map(|c| (c.id, CourseStatus::Unfulfilled))
        .collect();

    for done in completed {
        if let Some(status) = statuses.get_mut(&done.course_id) {
            *status = CourseStatus::Fulfilled;
        }
    }

    for section in scheduled {
        if let Some(status) = statuses.get_mut(&section.course_id) {
            *status = CourseStatus::ScheduledButNotCompleted;
        }
    }

    statuses
}

/// Sums completed and scheduled progress in the threshold's unit.
pub fn tally(
    threshold: RequirementThreshold,
    course_set: &[Course],
    statuses: &CourseStatuses,
) -> Tally {
    let hours: HashMap<i64, u32> = course_set.iter().map(|c| (c.id, c.credit_hours)).collect();
    let weight = |course_id: &i64| match threshold {
        RequirementThreshold::Hours(_) => hours.get(course_id).copied().unwrap_or(0),
        RequirementThreshold::Classes(_) => 1,
    };

    let mut tally = Tally::default();
    for (course_id, status) in statuses {
        match status {
            CourseStatus::Fulfilled => tally.completed += weight(course_id),
            CourseStatus::ScheduledButNotCompleted => tally.scheduled += weight(course_id),
            CourseStatus::Unfulfilled => {}
        }
    }
    tally
}

/// Overall status of a requirement given its course statuses.
///
/// Completed work alone meeting the threshold is `Fulfilled`; completed plus
/// scheduled work meeting it is `ScheduledButNotCompleted`.
pub fn fulfillment_status(
    threshold: RequirementThreshold,
    course_set: &[Course],
    statuses: &CourseStatuses,
) -> CourseStatus {
    status_for_tally(threshold, tally(threshold, course_set, statuses))
}

pub(crate) fn status_for_tally(threshold: RequirementThreshold, tally: Tally) -> CourseStatus {
    let required = match threshold {
        RequirementThreshold::Hours(h) => h,
        RequirementThreshold::Classes(c) => c,
    };

    if tally.completed >= required {
        CourseStatus::Fulfilled
    } else if tally.completed + tally.scheduled >= required {
        CourseStatus::ScheduledButNotCompleted
    } else {
        CourseStatus::Unfulfilled
    }
}

/// Folds requirement statuses into one: fulfilled only if all are, scheduled
/// if none is still unfulfilled.
pub fn combined_status<I>(statuses: I) -> CourseStatus
where
    I: IntoIterator<Item = CourseStatus>,
{
    let mut combined = CourseStatus::Fulfilled;
    for status in statuses {
        match status {
            CourseStatus::Unfulfilled => return CourseStatus::Unfulfilled,
            CourseStatus::ScheduledButNotCompleted => {
                combined = CourseStatus::ScheduledButNotCompleted
            }
            CourseStatus::Fulfilled => {}
        }
    }
    combined
}
