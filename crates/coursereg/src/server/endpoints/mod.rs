pub mod home;
pub mod profile;
pub mod schedule;
pub mod search;
pub mod section;
pub mod status;

use crate::error::{RegistrarError, Result};
use crate::models::Schedule;
use crate::server::types::StudentContext;
use crate::types::AppState;

/// Loads a schedule belonging to the current student. Schedules of other
/// students are reported as missing.
pub(crate) fn owned_schedule(
    s: &AppState,
    student: &StudentContext,
    schedule_id: i64,
) -> Result<Schedule> {
    let schedule = s.db.get_schedule(schedule_id)?;
    if schedule.profile_id != student.profile.id {
        return Err(RegistrarError::not_found("Schedule", schedule_id));
    }
    Ok(schedule)
}
