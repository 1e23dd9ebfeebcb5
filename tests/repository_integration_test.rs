// ==========================================
// Repository layer integration tests
// ==========================================
// Round-trips against a real database file: delimited assignment
// lists, window queries, the atomic pass commit and the rule tables.
// ==========================================

mod test_helpers;

use duty_roster::domain::rules::PairingRule;
use duty_roster::domain::types::PairingKind;
use duty_roster::repository::{
    AssignmentRun, GuardHoursUpdate, RepositoryError, ShiftAssignmentUpdate,
};
use test_helpers::{add_shift, basic_post, create_test_api, dt, get_shift};

#[test]
fn test_assignment_list_round_trips_in_order() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let post_id = api.add_post(&basic_post("Gate")).unwrap();
    let shift_id =
        add_shift(&repos, post_id, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 3, &[7, 3, 11]);

    let shift = get_shift(&repos, shift_id);
    assert_eq!(shift.assigned.to_delimited(), "7,3,11");
    assert!(shift.assigned.contains(3));
    assert!(!shift.assigned.contains(1));
}

#[test]
fn test_find_by_guard_rejects_substring_id_match() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let post_id = api.add_post(&basic_post("Gate")).unwrap();
    add_shift(&repos, post_id, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 1, &[11]);

    // "1" is a substring of "11"; the exact membership re-check must drop it
    assert!(repos.shifts.find_by_guard(1).unwrap().is_empty());
    assert_eq!(repos.shifts.find_by_guard(11).unwrap().len(), 1);
}

#[test]
fn test_find_last_ending_before_excludes_given_shift() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let post_id = api.add_post(&basic_post("Gate")).unwrap();
    let prior =
        add_shift(&repos, post_id, dt(2026, 5, 1, 6, 0), dt(2026, 5, 1, 8, 0), 1, &[5]);
    let current =
        add_shift(&repos, post_id, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 1, &[5]);

    let found = repos
        .shifts
        .find_last_ending_before(5, dt(2026, 5, 1, 8, 0), Some(current))
        .unwrap()
        .expect("prior shift found");
    assert_eq!(found.id, prior);

    // Nothing ends at or before 06:00
    assert!(repos
        .shifts
        .find_last_ending_before(5, dt(2026, 5, 1, 6, 0), None)
        .unwrap()
        .is_none());
}

#[test]
fn test_find_last_ending_before_picks_most_recent() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let post_id = api.add_post(&basic_post("Gate")).unwrap();
    add_shift(&repos, post_id, dt(2026, 4, 30, 6, 0), dt(2026, 4, 30, 8, 0), 1, &[5]);
    let newest =
        add_shift(&repos, post_id, dt(2026, 4, 30, 20, 0), dt(2026, 4, 30, 22, 0), 1, &[5]);

    let found = repos
        .shifts
        .find_last_ending_before(5, dt(2026, 5, 1, 0, 0), None)
        .unwrap()
        .expect("found");
    assert_eq!(found.id, newest);
}

#[test]
fn test_clear_assignments_is_window_scoped() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let post_id = api.add_post(&basic_post("Gate")).unwrap();
    let inside =
        add_shift(&repos, post_id, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 1, &[4]);
    let outside =
        add_shift(&repos, post_id, dt(2026, 5, 2, 8, 0), dt(2026, 5, 2, 10, 0), 1, &[4]);

    let cleared = repos
        .shifts
        .clear_assignments_in(dt(2026, 5, 1, 0, 0), dt(2026, 5, 2, 0, 0))
        .unwrap();
    assert_eq!(cleared, 1);
    assert!(get_shift(&repos, inside).assigned.is_empty());
    assert_eq!(get_shift(&repos, outside).assigned.to_delimited(), "4");
}

#[test]
fn test_commit_pass_rolls_back_on_missing_shift() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let post_id = api.add_post(&basic_post("Gate")).unwrap();
    let guard = api.add_guard("Avi", false).unwrap();
    let real =
        add_shift(&repos, post_id, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 1, &[]);

    let mut assigned = duty_roster::domain::AssignmentList::new();
    assigned.push(guard);
    let updates = vec![
        ShiftAssignmentUpdate {
            shift_id: real,
            assigned: assigned.clone(),
        },
        ShiftAssignmentUpdate {
            shift_id: 999_999,
            assigned,
        },
    ];
    let hours = vec![GuardHoursUpdate {
        guard_id: guard,
        total_hours: 2.0,
    }];
    let run = AssignmentRun {
        run_id: "test-run".to_string(),
        window_start: dt(2026, 5, 1, 0, 0),
        window_days: 1,
        slots_filled: 1,
        slots_open: 0,
        started_at: dt(2026, 5, 1, 0, 0),
        finished_at: dt(2026, 5, 1, 0, 0),
    };

    let result = repos.runs.commit_pass(&updates, &hours, &run);
    assert!(matches!(result, Err(RepositoryError::NotFound { .. })));

    // Nothing from the failed pass is observable
    assert!(get_shift(&repos, real).assigned.is_empty());
    let stored = repos.guards.find_by_id(guard).unwrap().unwrap();
    assert_eq!(stored.total_hours, 0.0);
    assert!(repos.runs.find_recent(10).unwrap().is_empty());
}

#[test]
fn test_bulk_insert_names_skips_existing() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    api.add_guard("Avi", false).unwrap();
    let inserted = repos
        .guards
        .bulk_insert_names(&[
            ("Avi".to_string(), false),
            ("Ben".to_string(), true),
            ("Ben".to_string(), false),
        ])
        .unwrap();

    assert_eq!(inserted, 1);
    let all = repos.guards.find_all().unwrap();
    assert_eq!(all.len(), 2);
    let ben = repos.guards.find_by_name("Ben").unwrap().unwrap();
    assert!(ben.is_commander);
}

#[test]
fn test_pairing_rule_rejects_same_guard_and_duplicates() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let a = api.add_guard("A", false).unwrap();
    let b = api.add_guard("B", false).unwrap();

    let same = repos.rules.create_pairing(&PairingRule {
        id: 0,
        first_guard_id: a,
        second_guard_id: a,
        kind: PairingKind::MustPair,
    });
    assert!(matches!(same, Err(RepositoryError::ValidationError(_))));

    api.add_pairing_rule(a, b, PairingKind::MustPair).unwrap();

    // The reversed pair counts as the same rule
    let duplicate = repos.rules.create_pairing(&PairingRule {
        id: 0,
        first_guard_id: b,
        second_guard_id: a,
        kind: PairingKind::MustNotPair,
    });
    assert!(matches!(
        duplicate,
        Err(RepositoryError::UniqueConstraintViolation(_))
    ));
    assert_eq!(repos.rules.find_all_pairing().unwrap().len(), 1);
}

#[test]
fn test_exclusion_is_idempotent() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let post_id = api.add_post(&basic_post("Gate")).unwrap();
    let guard = api.add_guard("Avi", false).unwrap();

    api.add_post_exclusion(guard, post_id).unwrap();
    api.add_post_exclusion(guard, post_id).unwrap();

    assert!(repos.rules.exclusion_exists(guard, post_id).unwrap());
    assert_eq!(repos.rules.find_all_exclusions().unwrap().len(), 1);
}

#[test]
fn test_availability_overlap_bounds_are_half_open() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let guard = api.add_guard("Avi", false).unwrap();
    api.add_availability_constraint(guard, dt(2026, 5, 1, 10, 0), dt(2026, 5, 1, 12, 0), None)
        .unwrap();

    // Shift starting exactly at the constraint's end does not overlap
    let after = repos
        .rules
        .find_availability_overlapping(guard, dt(2026, 5, 1, 12, 0), dt(2026, 5, 1, 14, 0))
        .unwrap();
    assert!(after.is_empty());

    let touching = repos
        .rules
        .find_availability_overlapping(guard, dt(2026, 5, 1, 9, 0), dt(2026, 5, 1, 10, 30))
        .unwrap();
    assert_eq!(touching.len(), 1);
}

#[test]
fn test_second_connection_sees_committed_data() {
    let (tmp, api) = create_test_api();
    let repos = api.repositories();

    let post_id = api.add_post(&basic_post("Gate")).unwrap();
    let shift_id =
        add_shift(&repos, post_id, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 1, &[4]);

    // A repository bundle on its own connection reads the same file
    let other = duty_roster::RosterRepositories::new(tmp.path().to_str().unwrap()).unwrap();
    let shift = other.shifts.find_by_id(shift_id).unwrap().expect("shift visible");
    assert_eq!(shift.assigned.to_delimited(), "4");
    assert_eq!(other.posts.find_all().unwrap().len(), 1);
}

#[test]
fn test_update_total_hours_missing_guard_is_not_found() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let result = repos.guards.update_total_hours(424_242, 8.0);
    assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
}

#[test]
fn test_reset_all_hours_zeroes_every_counter() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let a = api.add_guard("A", false).unwrap();
    let b = api.add_guard("B", false).unwrap();
    repos.guards.update_total_hours(a, 12.5).unwrap();
    repos.guards.update_total_hours(b, 3.0).unwrap();

    let reset = api.reset_guard_hours().unwrap();
    assert_eq!(reset, 2);
    for guard in repos.guards.find_all().unwrap() {
        assert_eq!(guard.total_hours, 0.0);
    }
}
