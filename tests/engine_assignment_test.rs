// ==========================================
// Assignment engine integration tests
// ==========================================
// Exercises the greedy pass end to end against a real database:
// eligibility filtering, the ranking order, and the single-transaction
// commit of assignments, hour counters and the run log.
// ==========================================

mod test_helpers;

use duty_roster::domain::types::PairingKind;
use test_helpers::{add_shift, basic_post, create_test_api, dt, get_shift};

#[tokio::test]
async fn test_equal_candidates_tie_break_to_lowest_id() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let post_id = api.add_post(&basic_post("Gate")).unwrap();
    let first = api.add_guard("Adi", false).unwrap();
    let _second = api.add_guard("Ben", false).unwrap();
    let shift_id = add_shift(&repos, post_id, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 1, &[]);

    let outcome = api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();
    assert_eq!(outcome.slots_filled, 1);
    assert_eq!(outcome.slots_open, 0);

    let shift = get_shift(&repos, shift_id);
    assert_eq!(shift.assigned.to_delimited(), first.to_string());
}

#[tokio::test]
async fn test_fewer_lifetime_hours_wins() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let gate = api.add_post(&basic_post("Gate")).unwrap();
    let veteran = api.add_guard("Veteran", false).unwrap();
    let rookie = api.add_guard("Rookie", false).unwrap();

    // Old history, well outside the lookback span
    add_shift(&repos, gate, dt(2026, 4, 20, 8, 0), dt(2026, 4, 20, 12, 0), 1, &[veteran]);

    let shift_id = add_shift(&repos, gate, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 1, &[]);
    api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();

    let shift = get_shift(&repos, shift_id);
    assert_eq!(shift.assigned.to_delimited(), rookie.to_string());
}

#[tokio::test]
async fn test_commander_preferred_on_commander_post() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let mut hq = basic_post("HQ");
    hq.requires_commander = true;
    let hq_id = api.add_post(&hq).unwrap();

    let _private = api.add_guard("Private", false).unwrap();
    let commander = api.add_guard("Commander", true).unwrap();

    let shift_id = add_shift(&repos, hq_id, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 1, &[]);
    api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();

    // The commander outranks the lower-id private on a commander post
    let shift = get_shift(&repos, shift_id);
    assert_eq!(shift.assigned.to_delimited(), commander.to_string());
}

#[tokio::test]
async fn test_commander_priority_neutral_on_plain_post() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let gate = api.add_post(&basic_post("Gate")).unwrap();
    let private = api.add_guard("Private", false).unwrap();
    let _commander = api.add_guard("Commander", true).unwrap();

    let shift_id = add_shift(&repos, gate, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 1, &[]);
    api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();

    let shift = get_shift(&repos, shift_id);
    assert_eq!(shift.assigned.to_delimited(), private.to_string());
}

#[tokio::test]
async fn test_must_not_pair_partner_skipped() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let gate = api.add_post(&basic_post("Gate")).unwrap();
    let a = api.add_guard("A", false).unwrap();
    let b = api.add_guard("B", false).unwrap();
    let c = api.add_guard("C", false).unwrap();
    api.add_pairing_rule(a, b, PairingKind::MustNotPair).unwrap();

    let shift_id = add_shift(&repos, gate, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 2, &[]);
    api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();

    // A fills the first slot; B is then ineligible, so C takes the second
    let shift = get_shift(&repos, shift_id);
    assert_eq!(shift.assigned.to_delimited(), format!("{},{}", a, c));
}

#[tokio::test]
async fn test_must_pair_partner_preferred() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let gate = api.add_post(&basic_post("Gate")).unwrap();
    let a = api.add_guard("A", false).unwrap();
    let _b = api.add_guard("B", false).unwrap();
    let c = api.add_guard("C", false).unwrap();
    api.add_pairing_rule(a, c, PairingKind::MustPair).unwrap();

    let shift_id = add_shift(&repos, gate, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 2, &[]);
    api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();

    // A's bound partner C outranks the lower-id B for the second slot
    let shift = get_shift(&repos, shift_id);
    assert_eq!(shift.assigned.to_delimited(), format!("{},{}", a, c));
}

#[tokio::test]
async fn test_banned_only_candidate_leaves_slot_open() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let armory = api.add_post(&basic_post("Armory")).unwrap();
    let guard = api.add_guard("Noa", false).unwrap();
    api.add_post_exclusion(guard, armory).unwrap();

    let shift_id =
        add_shift(&repos, armory, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 1, &[]);
    let outcome = api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();

    assert_eq!(outcome.slots_filled, 0);
    assert_eq!(outcome.slots_open, 1);
    let shift = get_shift(&repos, shift_id);
    assert!(shift.assigned.is_empty());
}

#[tokio::test]
async fn test_full_shift_left_untouched() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let gate = api.add_post(&basic_post("Gate")).unwrap();
    let resident = api.add_guard("Resident", false).unwrap();
    let _spare = api.add_guard("Spare", false).unwrap();

    let shift_id =
        add_shift(&repos, gate, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 1, &[resident]);
    let outcome = api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();

    assert_eq!(outcome.slots_filled, 0);
    let shift = get_shift(&repos, shift_id);
    assert_eq!(shift.assigned.to_delimited(), resident.to_string());
}

#[tokio::test]
async fn test_first_assigned_wins_on_overlapping_shifts() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let gate = api.add_post(&basic_post("Gate")).unwrap();
    let tower = api.add_post(&basic_post("Tower")).unwrap();
    let guard = api.add_guard("Solo", false).unwrap();

    let early = add_shift(&repos, gate, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 1, &[]);
    let late = add_shift(&repos, tower, dt(2026, 5, 1, 9, 0), dt(2026, 5, 1, 11, 0), 1, &[]);

    let outcome = api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();
    assert_eq!(outcome.slots_filled, 1);
    assert_eq!(outcome.slots_open, 1);

    assert_eq!(
        get_shift(&repos, early).assigned.to_delimited(),
        guard.to_string()
    );
    assert!(get_shift(&repos, late).assigned.is_empty());
}

#[tokio::test]
async fn test_short_rest_candidate_loses_to_rested_one() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let gate = api.add_post(&basic_post("Gate")).unwrap();
    let tower = api.add_post(&basic_post("Tower")).unwrap();
    let tired = api.add_guard("Tired", false).unwrap();
    let rested = api.add_guard("Rested", false).unwrap();

    // Tired just came off a 06:00-07:00 shift; Rested carries far more
    // lifetime hours but is fully rested, and the rest flag ranks first.
    add_shift(&repos, tower, dt(2026, 5, 1, 6, 0), dt(2026, 5, 1, 7, 0), 1, &[tired]);
    add_shift(&repos, tower, dt(2026, 4, 20, 8, 0), dt(2026, 4, 20, 16, 0), 1, &[rested]);

    let shift_id = add_shift(&repos, gate, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 1, &[]);
    api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();

    let shift = get_shift(&repos, shift_id);
    assert_eq!(shift.assigned.to_delimited(), rested.to_string());
}

#[tokio::test]
async fn test_availability_blackout_excludes_candidate() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let gate = api.add_post(&basic_post("Gate")).unwrap();
    let busy = api.add_guard("Busy", false).unwrap();
    let free = api.add_guard("Free", false).unwrap();
    api.add_availability_constraint(
        busy,
        dt(2026, 5, 1, 9, 0),
        dt(2026, 5, 1, 12, 0),
        Some("leave".to_string()),
    )
    .unwrap();

    let shift_id = add_shift(&repos, gate, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 1, &[]);
    api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();

    let shift = get_shift(&repos, shift_id);
    assert_eq!(shift.assigned.to_delimited(), free.to_string());
}

#[tokio::test]
async fn test_black_shift_goes_to_fewer_black_count() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let gate = api.add_post(&basic_post("Gate")).unwrap();
    let night_owl = api.add_guard("NightOwl", false).unwrap();
    let day_worker = api.add_guard("DayWorker", false).unwrap();

    // Equal lifetime hours; only the night-shift counts differ
    add_shift(&repos, gate, dt(2026, 4, 20, 0, 0), dt(2026, 4, 20, 2, 0), 1, &[night_owl]);
    add_shift(&repos, gate, dt(2026, 4, 21, 2, 0), dt(2026, 4, 21, 4, 0), 1, &[night_owl]);
    add_shift(&repos, gate, dt(2026, 4, 20, 10, 0), dt(2026, 4, 20, 12, 0), 1, &[day_worker]);
    add_shift(&repos, gate, dt(2026, 4, 21, 14, 0), dt(2026, 4, 21, 16, 0), 1, &[day_worker]);

    // Midpoint 01:00 falls in the 00:00-06:00 night window
    let night = add_shift(&repos, gate, dt(2026, 5, 1, 0, 0), dt(2026, 5, 1, 2, 0), 1, &[]);
    api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();

    let shift = get_shift(&repos, night);
    assert_eq!(shift.assigned.to_delimited(), day_worker.to_string());
}

#[tokio::test]
async fn test_black_count_ignored_for_day_shift() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let gate = api.add_post(&basic_post("Gate")).unwrap();
    let night_owl = api.add_guard("NightOwl", false).unwrap();
    let day_worker = api.add_guard("DayWorker", false).unwrap();

    add_shift(&repos, gate, dt(2026, 4, 20, 0, 0), dt(2026, 4, 20, 2, 0), 1, &[night_owl]);
    add_shift(&repos, gate, dt(2026, 4, 21, 2, 0), dt(2026, 4, 21, 4, 0), 1, &[night_owl]);
    add_shift(&repos, gate, dt(2026, 4, 20, 10, 0), dt(2026, 4, 20, 12, 0), 1, &[day_worker]);
    add_shift(&repos, gate, dt(2026, 4, 21, 14, 0), dt(2026, 4, 21, 16, 0), 1, &[day_worker]);

    // Daytime shift: night-shift counts drop out and the id tie-break
    // hands the slot to the lower-id guard
    let noon = add_shift(&repos, gate, dt(2026, 5, 1, 12, 0), dt(2026, 5, 1, 14, 0), 1, &[]);
    api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();

    let shift = get_shift(&repos, noon);
    assert_eq!(shift.assigned.to_delimited(), night_owl.to_string());
}

#[tokio::test]
async fn test_engine_fills_around_deleted_guard_reference() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let gate = api.add_post(&basic_post("Gate")).unwrap();
    let ghost = api.add_guard("Ghost", false).unwrap();
    let live = api.add_guard("Live", false).unwrap();

    // A departed guard's id lingers in the assignment list; the pass
    // must still fill the remaining slot and commit.
    let shift_id =
        add_shift(&repos, gate, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 2, &[ghost]);
    api.remove_guard(ghost).unwrap();

    let outcome = api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();
    assert_eq!(outcome.slots_filled, 1);
    assert_eq!(outcome.slots_open, 0);

    let shift = get_shift(&repos, shift_id);
    assert_eq!(shift.assigned.len(), 2);
    assert!(shift.assigned.contains(ghost));
    assert!(shift.assigned.contains(live));
}

#[tokio::test]
async fn test_pass_commits_hours_and_run_log() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let gate = api.add_post(&basic_post("Gate")).unwrap();
    let guard = api.add_guard("Avi", false).unwrap();
    add_shift(&repos, gate, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 1, &[]);

    let outcome = api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();

    let stored = repos.guards.find_by_id(guard).unwrap().unwrap();
    assert!((stored.total_hours - 2.0).abs() < 1e-9);

    let runs = repos.runs.find_recent(10).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].run_id, outcome.run_id);
    assert_eq!(runs[0].slots_filled, 1);
    assert_eq!(runs[0].slots_open, 0);
}

#[tokio::test]
async fn test_identical_stores_produce_identical_rosters() {
    async fn build_and_run() -> Vec<(i64, String)> {
        let (_tmp, api) = create_test_api();
        let repos = api.repositories();

        let gate = api.add_post(&basic_post("Gate")).unwrap();
        let tower = api.add_post(&basic_post("Tower")).unwrap();
        for name in ["A", "B", "C"] {
            api.add_guard(name, false).unwrap();
        }
        for hour in [0u32, 2, 4] {
            add_shift(&repos, gate, dt(2026, 5, 1, hour, 0), dt(2026, 5, 1, hour + 2, 0), 1, &[]);
            add_shift(&repos, tower, dt(2026, 5, 1, hour, 0), dt(2026, 5, 1, hour + 2, 0), 1, &[]);
        }
        api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();

        repos
            .shifts
            .find_starting_in(dt(2026, 5, 1, 0, 0), dt(2026, 5, 2, 0, 0))
            .unwrap()
            .into_iter()
            .map(|s| (s.post_id, s.assigned.to_delimited()))
            .collect()
    }

    let first = build_and_run().await;
    let second = build_and_run().await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_clear_then_rerun_refills() {
    let (_tmp, api) = create_test_api();
    let repos = api.repositories();

    let gate = api.add_post(&basic_post("Gate")).unwrap();
    let guard = api.add_guard("Avi", false).unwrap();
    let shift_id = add_shift(&repos, gate, dt(2026, 5, 1, 8, 0), dt(2026, 5, 1, 10, 0), 1, &[]);

    api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();
    let cleared = api.clear_assignments(dt(2026, 5, 1, 0, 0), 1).unwrap();
    assert_eq!(cleared, 1);
    assert!(get_shift(&repos, shift_id).assigned.is_empty());

    let outcome = api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();
    assert_eq!(outcome.slots_filled, 1);
    assert_eq!(
        get_shift(&repos, shift_id).assigned.to_delimited(),
        guard.to_string()
    );
}

#[tokio::test]
async fn test_window_rejects_non_positive_days() {
    let (_tmp, api) = create_test_api();
    let result = api.run_assignment(dt(2026, 5, 1, 0, 0), 0).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_empty_window_is_a_clean_noop() {
    let (_tmp, api) = create_test_api();

    let outcome = api.run_assignment(dt(2026, 5, 1, 0, 0), 1).await.unwrap();
    assert_eq!(outcome.slots_filled, 0);
    assert_eq!(outcome.slots_open, 0);
}
