// ==========================================
// Test helpers
// ==========================================
// Responsibility: temp database setup and entity seeding shared by
// the integration tests
// ==========================================
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use duty_roster::domain::{AssignmentList, Post, Shift};
use duty_roster::engine::RosterRepositories;
use duty_roster::RosterApi;
use tempfile::NamedTempFile;

/// Create a temp database with the full schema and an API over it.
///
/// # Returns
/// - NamedTempFile: temp database file (must stay alive)
/// - RosterApi: API facade bound to it
pub fn create_test_api() -> (NamedTempFile, RosterApi) {
    let temp_file = NamedTempFile::new().expect("temp file");
    let db_path = temp_file.path().to_str().unwrap().to_string();
    let api = RosterApi::open(&db_path).expect("open api");
    (temp_file, api)
}

pub fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, 0)
        .unwrap()
}

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// A plain always-active post (2h shifts, one guard, no boost)
pub fn basic_post(name: &str) -> Post {
    Post {
        id: 0,
        name: name.to_string(),
        shift_minutes: 120,
        required_guards: 1,
        active_from: t(0, 0),
        active_to: t(23, 59),
        boost_from: None,
        boost_to: None,
        boost_guards: 0,
        requires_commander: false,
    }
}

/// Fetch a shift that must exist
pub fn get_shift(repos: &RosterRepositories, id: i64) -> Shift {
    repos
        .shifts
        .find_by_id(id)
        .expect("query shift")
        .expect("shift exists")
}

/// Insert a shift with a pre-set assignment list
pub fn add_shift(
    repos: &RosterRepositories,
    post_id: i64,
    start: NaiveDateTime,
    end: NaiveDateTime,
    required_count: u32,
    assigned: &[i64],
) -> i64 {
    let mut list = AssignmentList::new();
    for id in assigned {
        list.push(*id);
    }
    let shift = Shift {
        id: 0,
        post_id,
        start_time: start,
        end_time: end,
        assigned: list,
        required_count,
    };
    repos.shifts.create(&shift).expect("create shift")
}
