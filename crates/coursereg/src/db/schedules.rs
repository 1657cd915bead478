//! Schedule mutations.
//!
//! Every mutation runs in one transaction and refreshes `schedules.updated`.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, Transaction};
use tracing::info;

use super::{ensure_exists, or_not_found, RegistrarDb};
use crate::error::{RegistrarError, Result};
use crate::models::{Schedule, SectionDetail};

fn load_schedule(conn: &Connection, schedule_id: i64) -> Result<Schedule> {
    let mut schedule = or_not_found(
        conn.query_row(
            "SELECT id, name, profile_id, updated FROM schedules WHERE id = ?1",
            [schedule_id],
            |row| {
                Ok(Schedule {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    profile_id: row.get(2)?,
                    updated: row.get(3)?,
                    section_ids: Vec::new(),
                })
            },
        ),
        "Schedule",
        schedule_id,
    )?;

    let mut stmt = conn.prepare(
        "SELECT section_id FROM schedule_sections WHERE schedule_id = ?1 ORDER BY section_id",
    )?;
    schedule.section_ids = stmt
        .query_map([schedule_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(schedule)
}

/// Refreshes the `updated` stamp, keeping it strictly increasing per schedule
/// even when the clock has not advanced since the last mutation.
fn touch(tx: &Transaction, schedule_id: i64) -> Result<DateTime<Utc>> {
    let previous: DateTime<Utc> = or_not_found(
        tx.query_row(
            "SELECT updated FROM schedules WHERE id = ?1",
            [schedule_id],
            |row| row.get(0),
        ),
        "Schedule",
        schedule_id,
    )?;

    let now = Utc::now().max(previous + Duration::microseconds(1));
    tx.execute(
        "UPDATE schedules SET updated = ?1 WHERE id = ?2",
        (now, schedule_id),
    )?;
    Ok(now)
}

impl RegistrarDb {
    pub fn create_schedule(&self, profile_id: i64, name: &str) -> Result<Schedule> {
        let conn = self.conn()?;
        ensure_exists(&conn, "profiles", "Profile", profile_id)?;

        let updated = Utc::now();
        conn.execute(
            "INSERT INTO schedules (name, profile_id, updated) VALUES (?1, ?2, ?3)",
            (name, profile_id, updated),
        )?;

        let schedule_id = conn.last_insert_rowid();
        info!(schedule_id, profile_id, "Created schedule");
        load_schedule(&conn, schedule_id)
    }

    pub fn get_schedule(&self, schedule_id: i64) -> Result<Schedule> {
        let conn = self.conn()?;
        load_schedule(&conn, schedule_id)
    }

    pub fn list_schedules_for(&self, profile_id: i64) -> Result<Vec<Schedule>> {
        let conn = self.conn()?;
        let ids: Vec<i64> = {
            let mut stmt =
                conn.prepare("SELECT id FROM schedules WHERE profile_id = ?1 ORDER BY id")?;
            let ids = stmt.query_map([profile_id], |row| row.get(0))?;
            ids.collect::<rusqlite::Result<Vec<_>>>()?
        };

        ids.into_iter()
            .map(|id| load_schedule(&conn, id))
            .collect()
    }

    /// Sections in a schedule with course, department and meeting times.
    pub fn sections_in_schedule(&self, schedule_id: i64) -> Result<Vec<SectionDetail>> {
        let schedule = self.get_schedule(schedule_id)?;
        self.section_details(&schedule.section_ids)
    }

    /// Adds a section; adding one that is already present only refreshes the timestamp.
    pub fn add_section(&self, schedule_id: i64, section_id: i64) -> Result<Schedule> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        ensure_exists(&tx, "schedules", "Schedule", schedule_id)?;
        ensure_exists(&tx, "sections", "Section", section_id)?;

        tx.execute(
            "INSERT OR IGNORE INTO schedule_sections (schedule_id, section_id) VALUES (?1, ?2)",
            (schedule_id, section_id),
        )?;
        touch(&tx, schedule_id)?;
        tx.commit()?;

        info!(schedule_id, section_id, "Added section to schedule");
        load_schedule(&conn, schedule_id)
    }

    /// Removes a section. `None` is rejected and leaves the schedule untouched.
    pub fn remove_section(&self, schedule_id: i64, section_id: Option<i64>) -> Result<Schedule> {
        let section_id = section_id.ok_or(RegistrarError::NoSectionSpecified)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        ensure_exists(&tx, "schedules", "Schedule", schedule_id)?;

        let removed = tx.execute(
            "DELETE FROM schedule_sections WHERE schedule_id = ?1 AND section_id = ?2",
            (schedule_id, section_id),
        )?;
        if removed == 0 {
            return Err(RegistrarError::not_found("Section", section_id));
        }
        touch(&tx, schedule_id)?;
        tx.commit()?;

        info!(schedule_id, section_id, "Removed section from schedule");
        load_schedule(&conn, schedule_id)
    }

    pub fn rename_schedule(&self, schedule_id: i64, name: &str) -> Result<Schedule> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "UPDATE schedules SET name = ?1 WHERE id = ?2",
            (name, schedule_id),
        )?;
        if changed == 0 {
            return Err(RegistrarError::not_found("Schedule", schedule_id));
        }
        touch(&tx, schedule_id)?;
        tx.commit()?;

        load_schedule(&conn, schedule_id)
    }

    pub fn delete_schedule(&self, schedule_id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM schedules WHERE id = ?1", [schedule_id])?;
        if deleted == 0 {
            return Err(RegistrarError::not_found("Schedule", schedule_id));
        }

        info!(schedule_id, "Deleted schedule");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn setup() -> (RegistrarDb, i64, Vec<i64>) {
        let db = RegistrarDb::open_in_memory().unwrap();
        let cs = department(&db, "CS");
        let c = course(&db, &cs, "101", 4);
        let sections = (0..3)
            .map(|i| section(&db, &c, &format!("Professor {i}")).id)
            .collect();
        let student = db.create_profile("Grace", 2016).unwrap();
        (db, student.id, sections)
    }

    #[test]
    fn test_add_section_is_idempotent() {
        let (db, student, sections) = setup();
        let schedule = db.create_schedule(student, "Fall").unwrap();
        assert!(schedule.section_ids.is_empty());

        let once = db.add_section(schedule.id, sections[0]).unwrap();
        let twice = db.add_section(schedule.id, sections[0]).unwrap();

        assert_eq!(once.section_ids, vec![sections[0]]);
        assert_eq!(twice.section_ids, vec![sections[0]]);
        assert!(twice.updated > once.updated);
        assert_eq!(db.sections_in_schedule(schedule.id).unwrap().len(), 1);
    }

    #[test]
    fn test_remove_section_updates_timestamp() {
        let (db, student, sections) = setup();
        let schedule = db.create_schedule(student, "Fall").unwrap();
        db.add_section(schedule.id, sections[0]).unwrap();
        let before = db.add_section(schedule.id, sections[1]).unwrap();

        let after = db.remove_section(schedule.id, Some(sections[0])).unwrap();

        assert_eq!(after.section_ids.len(), before.section_ids.len() - 1);
        assert_eq!(after.section_ids, vec![sections[1]]);
        assert!(after.updated > before.updated);
    }

    #[test]
    fn test_remove_without_section_leaves_schedule_unchanged() {
        let (db, student, sections) = setup();
        let schedule = db.create_schedule(student, "Fall").unwrap();
        let before = db.add_section(schedule.id, sections[2]).unwrap();

        let err = db.remove_section(schedule.id, None).unwrap_err();
        assert!(matches!(err, RegistrarError::NoSectionSpecified));

        let after = db.get_schedule(schedule.id).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn test_missing_ids_are_not_found() {
        let (db, student, sections) = setup();
        let schedule = db.create_schedule(student, "Fall").unwrap();

        assert!(db.add_section(999, sections[0]).unwrap_err().is_not_found());
        assert!(db.add_section(schedule.id, 999).unwrap_err().is_not_found());
        assert!(db
            .remove_section(schedule.id, Some(sections[0]))
            .unwrap_err()
            .is_not_found());
        assert!(db.rename_schedule(999, "x").unwrap_err().is_not_found());
        assert!(db.create_schedule(999, "x").unwrap_err().is_not_found());
    }

    #[test]
    fn test_rename_and_delete() {
        let (db, student, _) = setup();
        let schedule = db.create_schedule(student, "Fall").unwrap();
        let other = db.create_schedule(student, "Spring").unwrap();

        let renamed = db.rename_schedule(schedule.id, "newScheduleName").unwrap();
        assert_eq!(renamed.name, "newScheduleName");
        assert!(renamed.updated > schedule.updated);

        db.delete_schedule(schedule.id).unwrap();
        assert_eq!(db.list_schedules_for(student).unwrap(), vec![other]);
        assert!(db.delete_schedule(schedule.id).unwrap_err().is_not_found());
    }
}
