mod common;

use std::fs;

use coursereg::db::RegistrarDb;
use coursereg::seed::CatalogSeed;
use reqwest::StatusCode;
use serde_json::Value;

use common::{client, serve, IDENTITY_HEADER};

fn write_seed(dir: &std::path::Path) {
    fs::write(
        dir.join("departments.json"),
        r#"[{ "full_name": "Biology", "abbr_name": "BIO" }]"#,
    )
    .unwrap();
    fs::write(
        dir.join("courses.json"),
        r#"[
            { "department": "BIO", "course_number": "52", "name": "Cell Biology", "credit_hours": 3 },
            { "department": "BIO", "course_number": "52L", "name": "Cell Biology Lab", "credit_hours": 1,
              "prereqs": ["BIO 52"] }
        ]"#,
    )
    .unwrap();
    fs::write(
        dir.join("sections.json"),
        r#"[
            { "department": "BIO", "course_number": "52", "capacity": 60, "enrolled": 12,
              "professor": "McClintock", "location": "Keck 101",
              "meetings": [{ "day": 0, "start": "10:00", "end": "10:50" },
                           { "day": 2, "start": "10:00", "end": "10:50" }] },
            { "department": "BIO", "course_number": "52L", "capacity": 20,
              "professor": "Franklin", "location": "Keck B12",
              "meetings": [{ "day": 3, "start": "1:15 PM", "end": "4:15 PM" }] }
        ]"#,
    )
    .unwrap();
}

#[tokio::test]
async fn seeded_catalog_is_searchable() {
    let dir = tempfile::tempdir().unwrap();
    write_seed(dir.path());

    let db = RegistrarDb::open_in_memory().unwrap();
    let student = db.create_profile("Rosalind", 2016).unwrap();
    let summary = CatalogSeed::load_from_directory(dir.path())
        .unwrap()
        .apply(&db)
        .unwrap();
    assert_eq!(summary.sections, 2);
    assert_eq!(summary.requirement_sets, 0);

    let base = serve(db).await;
    let results: Value = client()
        .get(format!("{base}/search/results?thu=on&professor=frank"))
        .header(IDENTITY_HEADER, student.id.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(results["count"], 1);
    let lab = &results["results"][0];
    assert_eq!(lab["course"]["course_number"], "52L");
    assert_eq!(lab["meetings"][0]["start_time"], "13:15:00");

    let resp = client()
        .get(format!("{base}/section/{}", lab["section"]["id"]))
        .header(IDENTITY_HEADER, student.id.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let view: Value = resp.json().await.unwrap();
    assert_eq!(view["prerequisites"][0]["name"], "Cell Biology");
}
