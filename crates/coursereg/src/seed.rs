//! Catalog seeding from a directory of JSON files
//!
//! ```text
//! seed/
//!   departments.json       [{ "full_name", "abbr_name" }]
//!   courses.json           [{ "department", "course_number", "name", "credit_hours", ... }]
//!   sections.json          [{ "department", "course_number", "professor", "meetings": [...] }]
//!   requirement_sets.json  [{ "name", "department", "kind", "effective_date", "requirements": [...] }]
//! ```
//!
//! Every file is optional. Courses are referenced as "DEPT NUMBER", e.g. "CS 121c".

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::db::RegistrarDb;
use crate::error::{RegistrarError, Result};
use crate::models::RequirementSetKind;
use crate::query::CourseQuery;
use crate::search::parse_time;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentSeed {
    pub full_name: String,
    pub abbr_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSeed {
    pub department: String,
    pub course_number: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub credit_hours: u32,
    #[serde(default)]
    pub prereqs: Vec<String>,
    #[serde(default)]
    pub also_offered_as: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingSeed {
    pub day: u8,
    pub start: String, // e.g., "8:30"
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSeed {
    pub department: String,
    pub course_number: String,
    pub capacity: u32,
    #[serde(default)]
    pub enrolled: u32,
    pub professor: String,
    pub location: String,
    #[serde(default)]
    pub meetings: Vec<MeetingSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementSeed {
    pub name: String,
    #[serde(default)]
    pub required_hours: Option<u32>,
    #[serde(default)]
    pub required_classes: Option<u32>,
    pub query: CourseQuery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementSetSeed {
    pub name: String,
    pub department: String,
    pub kind: RequirementSetKind,
    pub effective_date: NaiveDate,
    #[serde(default)]
    pub requirements: Vec<RequirementSeed>,
}

/// Everything read from a seed directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    pub departments: Vec<DepartmentSeed>,
    pub courses: Vec<CourseSeed>,
    pub sections: Vec<SectionSeed>,
    pub requirement_sets: Vec<RequirementSetSeed>,
}

/// Counts of rows written by [`CatalogSeed::apply`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub departments: usize,
    pub courses: usize,
    pub sections: usize,
    pub requirement_sets: usize,
}

/// Lookup key for "DEPT NUMBER" references; both parts are case-insensitive.
fn course_key(department: &str, course_number: &str) -> String {
    format!(
        "{} {}",
        department.trim().to_uppercase(),
        course_number.trim().to_uppercase()
    )
}

fn load_file<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Vec<T>> {
    let path = dir.join(name);
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&content)?)
}

impl CatalogSeed {
    /// Loads all seed files from `seed_dir`
    ///
    /// # Arguments
    /// * `seed_dir` - Directory holding the JSON files listed in the module docs
    ///
    /// # Returns
    /// * `Ok(CatalogSeed)` - Parsed seed, empty for missing files
    /// * `Err` - If the directory doesn't exist or a file can't be parsed
    pub fn load_from_directory(seed_dir: &Path) -> Result<Self> {
        if !seed_dir.is_dir() {
            return Err(RegistrarError::InvalidInput {
                message: format!("seed directory {} does not exist", seed_dir.display()),
            });
        }

        Ok(CatalogSeed {
            departments: load_file(seed_dir, "departments.json")?,
            courses: load_file(seed_dir, "courses.json")?,
            sections: load_file(seed_dir, "sections.json")?,
            requirement_sets: load_file(seed_dir, "requirement_sets.json")?,
        })
    }

    /// Writes the seed into `db` in one transaction. Departments that already
    /// exist are reused. If any row is rejected, nothing is written.
    pub fn apply(&self, db: &RegistrarDb) -> Result<SeedSummary> {
        let summary = db.atomically(|db| self.write(db))?;

        info!(
            departments = summary.departments,
            courses = summary.courses,
            sections = summary.sections,
            requirement_sets = summary.requirement_sets,
            "Applied catalog seed"
        );
        Ok(summary)
    }

    fn write(&self, db: &RegistrarDb) -> Result<SeedSummary> {
        let mut summary = SeedSummary::default();
        let mut departments: HashMap<String, i64> = HashMap::new();
        let mut courses: HashMap<String, i64> = HashMap::new();

        for dept in &self.departments {
            let id = match db.department_by_abbr(&dept.abbr_name)? {
                Some(existing) => existing.id,
                None => {
                    summary.departments += 1;
                    db.create_department(&dept.full_name, &dept.abbr_name)?.id
                }
            };
            departments.insert(dept.abbr_name.to_uppercase(), id);
        }

        let department_id = |abbr: &str| -> Result<i64> {
            departments
                .get(&abbr.trim().to_uppercase())
                .copied()
                .ok_or_else(|| RegistrarError::InvalidInput {
                    message: format!("unknown department '{abbr}' in seed"),
                })
        };

        for course in &self.courses {
            let created = db.create_course(
                &course.name,
                &course.description,
                &course.course_number,
                department_id(&course.department)?,
                course.credit_hours,
            )?;
            courses.insert(course_key(&course.department, &course.course_number), created.id);
            summary.courses += 1;
        }

        let course_id = |key: &str| -> Result<i64> {
            let (dept, number) = key.trim().split_once(' ').unwrap_or((key, ""));
            courses
                .get(&course_key(dept, number))
                .copied()
                .ok_or_else(|| RegistrarError::InvalidInput {
                    message: format!("unknown course '{key}' in seed"),
                })
        };

        for course in &self.courses {
            let id = course_id(&course_key(&course.department, &course.course_number))?;
            for prereq in &course.prereqs {
                db.add_prerequisite(id, course_id(prereq)?)?;
            }
            for other in &course.also_offered_as {
                db.add_cross_listing(id, course_id(other)?)?;
            }
        }

        for section in &self.sections {
            let created = db.create_section(
                course_id(&course_key(&section.department, &section.course_number))?,
                section.capacity,
                section.enrolled,
                &section.professor,
                &section.location,
            )?;
            for meeting in &section.meetings {
                let (Some(start), Some(end)) = (parse_time(&meeting.start), parse_time(&meeting.end))
                else {
                    return Err(RegistrarError::InvalidInput {
                        message: format!(
                            "bad meeting time {}-{} for section of {} {}",
                            meeting.start, meeting.end, section.department, section.course_number
                        ),
                    });
                };
                db.add_meeting_time(created.id, meeting.day, start, end)?;
            }
            summary.sections += 1;
        }

        for set in &self.requirement_sets {
            let created = db.create_requirement_set(
                &set.name,
                department_id(&set.department)?,
                set.kind,
                set.effective_date,
            )?;
            for req in &set.requirements {
                let requirement = db.create_requirement(
                    &req.name,
                    req.required_hours,
                    req.required_classes,
                    &req.query,
                )?;
                db.add_requirement_to_set(created.id, requirement.id)?;
            }
            if set.requirements.is_empty() {
                warn!(set = %set.name, "Seeded requirement set has no requirements");
            }
            summary.requirement_sets += 1;
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{search_sections, SearchParams};
    use std::fs;

    const DEPARTMENTS: &str = r#"[
        { "full_name": "Computer Science", "abbr_name": "cs" },
        { "full_name": "Mathematics", "abbr_name": "MATH" }
    ]"#;

    const COURSES: &str = r#"[
        { "department": "CS", "course_number": "121", "name": "Intro", "credit_hours": 4 },
        { "department": "CS", "course_number": "121c", "name": "Intro Lab", "credit_hours": 1,
          "prereqs": ["CS 121"] },
        { "department": "MATH", "course_number": "240", "name": "Discrete", "credit_hours": 3,
          "also_offered_as": ["cs 121c"] }
    ]"#;

    const SECTIONS: &str = r#"[
        { "department": "CS", "course_number": "121", "capacity": 40, "professor": "Hopper",
          "location": "Hall 1", "meetings": [{ "day": 4, "start": "8:30", "end": "9:20" }] }
    ]"#;

    const REQUIREMENT_SETS: &str = r#"[
        { "name": "CS Minor", "department": "CS", "kind": "Minor", "effective_date": "2016-08-01",
          "requirements": [
            { "name": "Intro", "required_classes": 1,
              "query": { "version": 1, "filter": { "kind": "predicate", "field": "department",
                                                   "op": "eq", "value": "CS" } } }
          ] }
    ]"#;

    #[test]
    fn test_load_and_apply() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("departments.json"), DEPARTMENTS).unwrap();
        fs::write(dir.path().join("courses.json"), COURSES).unwrap();
        fs::write(dir.path().join("sections.json"), SECTIONS).unwrap();
        fs::write(dir.path().join("requirement_sets.json"), REQUIREMENT_SETS).unwrap();

        let seed = CatalogSeed::load_from_directory(dir.path()).unwrap();
        let db = RegistrarDb::open_in_memory().unwrap();
        let summary = seed.apply(&db).unwrap();

        assert_eq!(
            summary,
            SeedSummary {
                departments: 2,
                courses: 3,
                sections: 1,
                requirement_sets: 1
            }
        );

        let found = search_sections(
            &db,
            &SearchParams {
                fri: Some("on".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].section.professor, "Hopper");

        let lab = db.get_course(2).unwrap();
        assert_eq!(db.prerequisites_of(lab.id).unwrap()[0].course_number, "121");
        assert_eq!(db.cross_listings_of(lab.id).unwrap()[0].name, "Discrete");

        let minor = db.get_requirement_set(1).unwrap();
        assert_eq!(minor.kind, RequirementSetKind::Minor);
        assert_eq!(minor.requirements.len(), 1);
    }

    #[test]
    fn test_missing_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("departments.json"), DEPARTMENTS).unwrap();

        let seed = CatalogSeed::load_from_directory(dir.path()).unwrap();
        assert_eq!(seed.departments.len(), 2);
        assert!(seed.courses.is_empty());
        assert!(CatalogSeed::load_from_directory(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_invalid_requirement_in_seed_fails() {
        let db = RegistrarDb::open_in_memory().unwrap();
        let seed: CatalogSeed = serde_json::from_str(&format!(
            r#"{{ "departments": {DEPARTMENTS}, "courses": [], "sections": [],
                 "requirement_sets": [{{ "name": "Bad", "department": "CS", "kind": "Major",
                   "effective_date": "2016-08-01",
                   "requirements": [{{ "name": "both", "required_hours": 3, "required_classes": 1,
                                      "query": {{ "version": 1, "filter": {{ "kind": "everything" }} }} }}] }}] }}"#
        ))
        .unwrap();

        assert!(matches!(
            seed.apply(&db),
            Err(RegistrarError::InvalidRequirement { .. })
        ));
        assert!(db.list_departments().unwrap().is_empty());
    }

    #[test]
    fn test_failed_seed_writes_nothing() {
        let db = RegistrarDb::open_in_memory().unwrap();
        let seed: CatalogSeed = serde_json::from_str(
            r#"{ "departments": [{ "full_name": "Computer Science", "abbr_name": "CS" }],
                 "courses": [{ "department": "CS", "course_number": "101", "name": "Intro",
                               "credit_hours": 4, "prereqs": ["CS 999"] }],
                 "sections": [], "requirement_sets": [] }"#,
        )
        .unwrap();

        assert!(matches!(
            seed.apply(&db),
            Err(RegistrarError::InvalidInput { .. })
        ));
        assert!(db.list_departments().unwrap().is_empty());
        assert!(db.get_course(1).unwrap_err().is_not_found());

        // A corrected seed can be applied afterwards
        let mut fixed = seed.clone();
        fixed.courses[0].prereqs.clear();
        assert_eq!(fixed.apply(&db).unwrap().courses, 1);
    }

    #[test]
    fn test_course_references_ignore_case() {
        let db = RegistrarDb::open_in_memory().unwrap();
        let seed: CatalogSeed = serde_json::from_str(
            r#"{ "departments": [{ "full_name": "Computer Science", "abbr_name": "CS" }],
                 "courses": [
                   { "department": "CS", "course_number": "121c", "name": "Intro Lab", "credit_hours": 1 },
                   { "department": "cs", "course_number": "122", "name": "Data Structures",
                     "credit_hours": 4, "prereqs": ["CS 121C"] }
                 ],
                 "sections": [{ "department": "CS", "course_number": "121C", "capacity": 20,
                                "professor": "Liskov", "location": "Hall 4" }],
                 "requirement_sets": [] }"#,
        )
        .unwrap();

        let summary = seed.apply(&db).unwrap();
        assert_eq!(summary.sections, 1);

        let prereqs = db.prerequisites_of(2).unwrap();
        assert_eq!(prereqs.len(), 1);
        assert_eq!(prereqs[0].course_number, "121c");
    }
}
