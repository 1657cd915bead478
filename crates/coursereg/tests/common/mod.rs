#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use coursereg::config::AppConfig;
use coursereg::db::RegistrarDb;
use coursereg::models::RequirementSetKind;
use coursereg::query::{CourseFilter, CourseQuery};
use coursereg::server::create_router;
use coursereg::types::AppState;
use tokio::net::TcpListener;

pub const IDENTITY_HEADER: &str = "x-student-id";

/// A running server over a small catalog.
pub struct TestApp {
    pub base: String,
    pub client: reqwest::Client,
    pub student_id: i64,
    pub other_student_id: i64,
    pub cs_intro_section: i64,
    pub cs_systems_section: i64,
    pub math_section: i64,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header(IDENTITY_HEADER, self.student_id.to_string())
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header(IDENTITY_HEADER, self.student_id.to_string())
    }

    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .delete(self.url(path))
            .header(IDENTITY_HEADER, self.student_id.to_string())
    }
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// CS 101 (4h, completed), CS 105 (4h) and MATH 240 (3h), one section each.
/// The student's CS major needs 8 CS hours.
fn seed_catalog(db: &RegistrarDb) -> (i64, i64, i64, i64, i64) {
    let cs = db.create_department("Computer Science", "CS").unwrap();
    let math = db.create_department("Mathematics", "MATH").unwrap();

    let intro = db.create_course("Intro", "", "101", cs.id, 4).unwrap();
    let systems = db.create_course("Systems", "", "105", cs.id, 4).unwrap();
    let discrete = db.create_course("Discrete", "", "240", math.id, 3).unwrap();

    let intro_section = db.create_section(intro.id, 30, 10, "Hopper", "Hall 1").unwrap();
    db.add_meeting_time(intro_section.id, 0, time(9, 0), time(9, 50)).unwrap();

    let systems_section = db.create_section(systems.id, 30, 30, "Ritchie", "Hall 2").unwrap();
    db.add_meeting_time(systems_section.id, 1, time(13, 0), time(14, 15)).unwrap();
    db.add_meeting_time(systems_section.id, 3, time(13, 0), time(14, 15)).unwrap();

    let math_section = db.create_section(discrete.id, 25, 5, "Knuth", "Hall 3").unwrap();
    db.add_meeting_time(math_section.id, 1, time(14, 0), time(15, 0)).unwrap();

    let major = db
        .create_requirement_set(
            "Computer Science",
            cs.id,
            RequirementSetKind::Major,
            NaiveDate::from_ymd_opt(2016, 8, 1).unwrap(),
        )
        .unwrap();
    let query = CourseQuery::new(CourseFilter::department("cs"));
    let requirement = db
        .create_requirement("CS hours", Some(8), None, &query)
        .unwrap();
    db.add_requirement_to_set(major.id, requirement.id).unwrap();

    let student = db.create_profile("Ada", 2015).unwrap();
    db.declare_major(student.id, major.id, None).unwrap();
    db.record_completed_course(student.id, intro.id, "A").unwrap();

    let other = db.create_profile("Grace", 2014).unwrap();

    (
        student.id,
        other.id,
        intro_section.id,
        systems_section.id,
        math_section.id,
    )
}

/// Serves a router over `db` on an ephemeral port.
pub async fn serve(db: RegistrarDb) -> String {
    let state = Arc::new(AppState::new(db, AppConfig::default()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });

    format!("http://{addr}")
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

pub async fn spawn_app() -> TestApp {
    let db = RegistrarDb::open_in_memory().unwrap();
    let (student_id, other_student_id, cs_intro_section, cs_systems_section, math_section) =
        seed_catalog(&db);

    TestApp {
        base: serve(db).await,
        client: client(),
        student_id,
        other_student_id,
        cs_intro_section,
        cs_systems_section,
        math_section,
    }
}
