//! Read-side helpers for schedules: default selection and time conflicts.

use serde::Serialize;

use crate::models::{Schedule, SectionDetail};

/// The schedule updated last, shown by default. `None` for a student with no schedules.
pub fn most_recent_schedule(schedules: &[Schedule]) -> Option<&Schedule> {
    schedules.iter().max_by_key(|s| s.updated)
}

/// Two sections in the same schedule whose meetings overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionConflict {
    pub first: i64,
    pub second: i64,
}

/// Every conflicting pair, each reported once with `first` listed before `second`.
pub fn conflicts_in(sections: &[SectionDetail]) -> Vec<SectionConflict> {
    let mut conflicts = Vec::new();
    for (i, a) in sections.iter().enumerate() {
        for b in &sections[i + 1..] {
            if a.conflicts_with(b) {
                conflicts.push(SectionConflict {
                    first: a.section.id,
                    second: b.section.id,
                });
            }
        }
    }
    conflicts
}
