//! Requirement progress processing against the registrar store

use tracing::debug;

use super::status::{combined_status, course_statuses, status_for_tally, tally};
use super::types::*;
use crate::db::RegistrarDb;
use crate::error::{RegistrarError, Result};
use crate::models::{CompletedCourse, Requirement, RequirementSet, Section};

/// What a student has done and plans to do, loaded once per evaluation.
struct StudentSnapshot {
    completed: Vec<CompletedCourse>,
    scheduled: Vec<Section>,
}

/// Evaluates requirement progress for an explicit student and schedule
pub struct RequirementEvaluator<'a> {
    db: &'a RegistrarDb,
}

impl<'a> RequirementEvaluator<'a> {
    pub fn new(db: &'a RegistrarDb) -> Self {
        Self { db }
    }

    /// Requirement sets a student is working toward: each declared major
    /// followed by its concentration (when one is declared), then every minor.
    pub fn get_requirement_sets(&self, profile_id: i64) -> Result<Vec<RequirementSet>> {
        self.db.get_profile(profile_id)?;

        let mut sets = Vec::new();
        for declared in self.db.declared_majors_for(profile_id)? {
            sets.push(self.db.get_requirement_set(declared.major_id)?);
            if let Some(concentration_id) = declared.concentration_id {
                sets.push(self.db.get_requirement_set(concentration_id)?);
            }
        }
        sets.extend(self.db.minors_for(profile_id)?);

        Ok(sets)
    }

    /// Evaluates one requirement. `schedule_id` must belong to the student.
    pub fn evaluate_requirement(
        &self,
        requirement: &Requirement,
        profile_id: i64,
        schedule_id: Option<i64>,
    ) -> Result<RequirementReport> {
        let snapshot = self.snapshot(profile_id, schedule_id)?;
        self.evaluate_with(requirement, &snapshot)
    }

    /// Evaluates every requirement set the student has declared.
    ///
    /// # Arguments
    /// * `profile_id` - The student
    /// * `schedule_id` - Schedule whose sections count as in progress, if any
    pub fn progress_for(
        &self,
        profile_id: i64,
        schedule_id: Option<i64>,
    ) -> Result<Vec<RequirementSetReport>> {
        let snapshot = self.snapshot(profile_id, schedule_id)?;

        self.get_requirement_sets(profile_id)?
            .into_iter()
            .map(|set| {
                let requirements = set
                    .requirements
                    .iter()
                    .map(|req| self.evaluate_with(req, &snapshot))
                    .collect::<Result<Vec<_>>>()?;

                Ok(RequirementSetReport {
                    set_id: set.id,
                    name: set.name,
                    kind: set.kind,
                    type_name: set.kind.type_name().to_string(),
                    status: combined_status(requirements.iter().map(|r| r.status)),
                    requirements,
                })
            })
            .collect()
    }

    fn snapshot(&self, profile_id: i64, schedule_id: Option<i64>) -> Result<StudentSnapshot> {
        let completed = self.db.completed_courses_for(profile_id)?;

        let scheduled = match schedule_id {
            Some(schedule_id) => {
                let schedule = self.db.get_schedule(schedule_id)?;
                if schedule.profile_id != profile_id {
                    return Err(RegistrarError::not_found("Schedule", schedule_id));
                }
                self.db
                    .section_details(&schedule.section_ids)?
                    .into_iter()
                    .map(|detail| detail.section)
                    .collect()
            }
            None => Vec::new(),
        };

        Ok(StudentSnapshot {
            completed,
            scheduled,
        })
    }

    fn evaluate_with(
        &self,
        requirement: &Requirement,
        snapshot: &StudentSnapshot,
    ) -> Result<RequirementReport> {
        let course_set = self.db.courses_matching(&requirement.query)?;
        let statuses = course_statuses(&course_set, &snapshot.completed, &snapshot.scheduled);
        let tally = tally(requirement.threshold, &course_set, &statuses);
        let status = status_for_tally(requirement.threshold, tally);

        debug!(
            requirement_id = requirement.id,
            courses = course_set.len(),
            completed = tally.completed,
            scheduled = tally.scheduled,
            ?status,
            "Evaluated requirement"
        );

        let courses = course_set
            .into_iter()
            .map(|course| CourseProgress {
                status: statuses
                    .get(&course.id)
                    .copied()
                    .unwrap_or(CourseStatus::Unfulfilled),
                course,
            })
            .collect();

        Ok(RequirementReport {
            requirement_id: requirement.id,
            name: requirement.name.clone(),
            threshold: requirement.threshold,
            status,
            tally,
            courses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::*;
    use crate::models::{Course, RequirementSetKind};
    use crate::query::{CourseFilter, CourseQuery};
    use chrono::NaiveDate;

    struct Fixture {
        db: RegistrarDb,
        student: i64,
        schedule: i64,
        req_courses: Vec<Course>,
        requirement: Requirement,
    }

    /// Ten qualifying 4-hour courses numbered 101, five others numbered 102,
    /// and a student who has completed nine of the ten.
    fn fixture() -> Fixture {
        let db = RegistrarDb::open_in_memory().unwrap();
        let cs = department(&db, "CS");
        let req_courses: Vec<Course> = (0..10).map(|_| course(&db, &cs, "101", 4)).collect();
        for _ in 0..5 {
            course(&db, &cs, "102", 3);
        }

        let requirement = db
            .create_requirement(
                "test",
                None,
                Some(10),
                &CourseQuery::new(CourseFilter::course_number("101")),
            )
            .unwrap();

        let student = db.create_profile("Test Student", 2016).unwrap().id;
        let schedule = db.create_schedule(student, "Fall").unwrap().id;
        for c in &req_courses[..9] {
            db.record_completed_course(student, c.id, "A").unwrap();
        }

        Fixture {
            db,
            student,
            schedule,
            req_courses,
            requirement,
        }
    }

    fn schedule_last(f: &Fixture) {
        let s = section(&f.db, &f.req_courses[9], "Staff");
        f.db.add_section(f.schedule, s.id).unwrap();
    }

    fn status_of(f: &Fixture, requirement: &Requirement) -> CourseStatus {
        RequirementEvaluator::new(&f.db)
            .evaluate_requirement(requirement, f.student, Some(f.schedule))
            .unwrap()
            .status
    }

    fn with_hours(f: &Fixture, hours: u32) -> Requirement {
        f.db.create_requirement("hours", Some(hours), None, &f.requirement.query)
            .unwrap()
    }

    #[test]
    fn test_course_set_resolution() {
        let f = fixture();
        let report = RequirementEvaluator::new(&f.db)
            .evaluate_requirement(&f.requirement, f.student, None)
            .unwrap();

        let ids: Vec<i64> = report.courses.iter().map(|c| c.course.id).collect();
        let expected: Vec<i64> = f.req_courses.iter().map(|c| c.id).collect();
        assert_eq!(ids, expected);
        assert_eq!(report.courses[9].status, CourseStatus::Unfulfilled);
        assert_eq!(report.tally.completed, 9);
    }

    #[test]
    fn test_count_requirement_progression() {
        let f = fixture();
        assert_eq!(status_of(&f, &f.requirement), CourseStatus::Unfulfilled);

        schedule_last(&f);
        assert_eq!(
            status_of(&f, &f.requirement),
            CourseStatus::ScheduledButNotCompleted
        );

        f.db.record_completed_course(f.student, f.req_courses[9].id, "A")
            .unwrap();
        // still scheduled, so the scheduled pass wins for that course
        let report = RequirementEvaluator::new(&f.db)
            .evaluate_requirement(&f.requirement, f.student, Some(f.schedule))
            .unwrap();
        assert_eq!(report.courses[9].status, CourseStatus::ScheduledButNotCompleted);

        let unscheduled = RequirementEvaluator::new(&f.db)
            .evaluate_requirement(&f.requirement, f.student, None)
            .unwrap();
        assert_eq!(unscheduled.status, CourseStatus::Fulfilled);
    }

    #[test]
    fn test_hours_requirement() {
        let f = fixture();
        assert_eq!(status_of(&f, &with_hours(&f, 37)), CourseStatus::Unfulfilled);
        assert_eq!(status_of(&f, &with_hours(&f, 36)), CourseStatus::Fulfilled);
        assert_eq!(status_of(&f, &with_hours(&f, 35)), CourseStatus::Fulfilled);

        schedule_last(&f);
        assert_eq!(
            status_of(&f, &with_hours(&f, 40)),
            CourseStatus::ScheduledButNotCompleted
        );
        assert_eq!(status_of(&f, &with_hours(&f, 30)), CourseStatus::Fulfilled);
    }

    #[test]
    fn test_foreign_schedule_is_not_found() {
        let f = fixture();
        let stranger = f.db.create_profile("Stranger", 2017).unwrap();
        let err = RequirementEvaluator::new(&f.db)
            .evaluate_requirement(&f.requirement, stranger.id, Some(f.schedule))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_requirement_sets_skip_missing_concentration() {
        let f = fixture();
        let cs = f.db.department_by_abbr("CS").unwrap().unwrap();
        let date = NaiveDate::from_ymd_opt(2016, 8, 1).unwrap();
        let major = f
            .db
            .create_requirement_set("CS BS", cs.id, RequirementSetKind::Major, date)
            .unwrap();
        let minor_a = f
            .db
            .create_requirement_set("Math Minor", cs.id, RequirementSetKind::Minor, date)
            .unwrap();
        let minor_b = f
            .db
            .create_requirement_set("Music Minor", cs.id, RequirementSetKind::Minor, date)
            .unwrap();
        f.db.add_requirement_to_set(major.id, f.requirement.id).unwrap();
        f.db.declare_major(f.student, major.id, None).unwrap();
        f.db.add_minor(f.student, minor_a.id).unwrap();
        f.db.add_minor(f.student, minor_b.id).unwrap();

        let evaluator = RequirementEvaluator::new(&f.db);
        let sets = evaluator.get_requirement_sets(f.student).unwrap();
        let names: Vec<&str> = sets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["CS BS", "Math Minor", "Music Minor"]);

        let progress = evaluator.progress_for(f.student, Some(f.schedule)).unwrap();
        assert_eq!(progress.len(), 3);
        assert_eq!(progress[0].type_name, "Major");
        assert_eq!(progress[0].status, CourseStatus::Unfulfilled);
        // empty minors have nothing left to satisfy
        assert_eq!(progress[1].status, CourseStatus::Fulfilled);
    }
}
