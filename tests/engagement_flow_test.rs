//! End-to-end tests for the engagement manager against an on-disk database

mod common;

use chrono::{FixedOffset, TimeZone};
use serde_json::Value;

use common::{in_memory_manager, open_manager, temp_config, utc};
use khata_engage::engage::achievements::AchievementId;
use khata_engage::engage::events::EngagementEvent;
use khata_engage::engage::metrics::AppMetrics;
use khata_engage::EngagementInput;

fn unlocked_ids(events: &[EngagementEvent]) -> Vec<AchievementId> {
    events
        .iter()
        .filter_map(|e| match e {
            EngagementEvent::AchievementUnlocked { id, .. } => Some(*id),
            _ => None,
        })
        .collect()
}

#[test]
fn test_first_day_unlocks_and_completes_challenges() {
    let (_dir, config) = temp_config();
    let manager = open_manager(&config);

    let metrics = AppMetrics {
        bill_count: 5,
        customer_count: 3,
        product_count: 5,
        ..Default::default()
    };
    let events = manager
        .apply_event_at(EngagementInput::Metrics(metrics), &utc(1, 9, 0))
        .unwrap();

    let unlocked = unlocked_ids(&events);
    assert!(unlocked.contains(&AchievementId::FirstBill));
    assert!(unlocked.contains(&AchievementId::FirstCustomer));
    assert!(!unlocked.contains(&AchievementId::Sales10));

    let completed = events
        .iter()
        .filter(|e| matches!(e, EngagementEvent::ChallengeCompleted { .. }))
        .count();
    assert_eq!(completed, 3);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, EngagementEvent::AllChallengesCompleted { .. }))
            .count(),
        1
    );

    let snapshot = manager.snapshot().unwrap();
    // first-bill, first-customer, first-product
    assert_eq!(snapshot.points(), 30);
    // 20 for each challenge, 50 for finishing the set
    assert_eq!(snapshot.bonus_points, 110);
    assert_eq!(snapshot.challenges_date.as_deref(), Some("2024-07-01"));

    let sales_10 = snapshot
        .achievements
        .iter()
        .find(|a| a.id == "sales-10")
        .unwrap();
    assert!(!sales_10.unlocked);
    assert_eq!(sales_10.progress, Some(5));
}

#[test]
fn test_repeated_metrics_do_not_pay_twice() {
    let (_dir, config) = temp_config();
    let manager = open_manager(&config);
    let metrics = AppMetrics {
        bill_count: 5,
        customer_count: 3,
        product_count: 5,
        ..Default::default()
    };

    manager
        .apply_event_at(EngagementInput::Metrics(metrics.clone()), &utc(1, 9, 0))
        .unwrap();
    let again = manager
        .apply_event_at(EngagementInput::Metrics(metrics), &utc(1, 12, 0))
        .unwrap();

    assert!(again.is_empty(), "unexpected events: {:?}", again);
    assert_eq!(manager.snapshot().unwrap().bonus_points, 110);
}

#[test]
fn test_state_survives_reopen() {
    let (_dir, config) = temp_config();
    {
        let manager = open_manager(&config);
        manager
            .apply_event_at(EngagementInput::CheckIn, &utc(1, 8, 0))
            .unwrap();
        manager
            .apply_event_at(
                EngagementInput::Metrics(AppMetrics {
                    product_count: 12,
                    dark_mode_enabled: true,
                    ..Default::default()
                }),
                &utc(1, 9, 0),
            )
            .unwrap();
    }

    let manager = open_manager(&config);
    let snapshot = manager.snapshot().unwrap();
    assert_eq!(snapshot.streak.current, 1);
    // first-product 10 + products-10 + dark-mode 5
    assert!(snapshot
        .achievements
        .iter()
        .filter(|a| a.unlocked)
        .all(|a| a.unlocked_at.is_some()));
    assert_eq!(snapshot.unlocked_achievements, 3);
    assert_eq!(
        manager.last_metrics().unwrap().map(|m| m.product_count),
        Some(12)
    );
}

#[test]
fn test_streak_crosses_local_midnight() {
    let manager = in_memory_manager();
    let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();

    let late = ist.with_ymd_and_hms(2024, 7, 1, 23, 59, 0).unwrap();
    let early = ist.with_ymd_and_hms(2024, 7, 2, 0, 1, 0).unwrap();
    manager.apply_event_at(EngagementInput::CheckIn, &late).unwrap();
    manager.apply_event_at(EngagementInput::CheckIn, &early).unwrap();
    assert_eq!(manager.snapshot().unwrap().streak.current, 2);

    // A skipped day starts over
    let later = ist.with_ymd_and_hms(2024, 7, 4, 10, 0, 0).unwrap();
    manager.apply_event_at(EngagementInput::CheckIn, &later).unwrap();
    let streak = manager.snapshot().unwrap().streak;
    assert_eq!(streak.current, 1);
    assert_eq!(streak.longest, 2);
}

#[test]
fn test_week_of_check_ins_pays_milestone_once() {
    let manager = in_memory_manager();
    let mut milestones = 0;
    for day in 1..=7 {
        let events = manager
            .apply_event_at(EngagementInput::CheckIn, &utc(day, 9, 0))
            .unwrap();
        // Second check-in the same day changes nothing
        let repeat = manager
            .apply_event_at(EngagementInput::CheckIn, &utc(day, 18, 0))
            .unwrap();
        assert!(repeat
            .iter()
            .all(|e| !matches!(e, EngagementEvent::MilestoneReached { .. })));
        milestones += events
            .iter()
            .filter(|e| matches!(e, EngagementEvent::MilestoneReached { days: 7, .. }))
            .count();
    }
    assert_eq!(milestones, 1);

    let snapshot = manager.snapshot().unwrap();
    assert_eq!(snapshot.streak.current, 7);
    assert!(snapshot.streak.milestones.contains(&7));
    assert!(snapshot
        .achievements
        .iter()
        .any(|a| a.id == "consistent-7" && a.unlocked));
}

#[test]
fn test_new_day_regenerates_challenges() {
    let (_dir, config) = temp_config();
    let manager = open_manager(&config);

    manager
        .apply_event_at(EngagementInput::RefreshChallenges, &utc(1, 9, 0))
        .unwrap();
    let first = manager.snapshot().unwrap();
    assert_eq!(first.challenges.len(), 3);
    assert!(first.challenges.iter().all(|c| !c.completed));

    manager
        .apply_event_at(EngagementInput::RefreshChallenges, &utc(2, 9, 0))
        .unwrap();
    let second = manager.snapshot().unwrap();
    assert_eq!(second.challenges_date.as_deref(), Some("2024-07-02"));
    assert!(second
        .challenges
        .iter()
        .all(|c| c.expires_at == utc(3, 0, 0)));
}

#[test]
fn test_corrupt_record_is_reseeded() {
    let (_dir, config) = temp_config();
    {
        let manager = open_manager(&config);
        manager
            .apply_event_at(EngagementInput::CheckIn, &utc(1, 9, 0))
            .unwrap();
    }

    let conn = rusqlite::Connection::open(config.database_path()).unwrap();
    conn.execute(
        "UPDATE kv SET value = 'garbage' WHERE key = 'login_streak'",
        [],
    )
    .unwrap();
    drop(conn);

    let manager = open_manager(&config);
    assert_eq!(manager.snapshot().unwrap().streak.current, 0);
    manager
        .apply_event_at(EngagementInput::CheckIn, &utc(2, 9, 0))
        .unwrap();
    assert_eq!(manager.snapshot().unwrap().streak.current, 1);
}

#[test]
fn test_reset_returns_to_seeded_state() {
    let (_dir, config) = temp_config();
    let manager = open_manager(&config);
    manager
        .apply_event_at(
            EngagementInput::Metrics(AppMetrics {
                bill_count: 5,
                customer_count: 3,
                ..Default::default()
            }),
            &utc(1, 9, 0),
        )
        .unwrap();

    manager.reset().unwrap();
    let snapshot = manager.snapshot().unwrap();
    assert_eq!(snapshot.points(), 0);
    assert_eq!(snapshot.bonus_points, 0);
    assert_eq!(snapshot.unlocked_achievements, 0);
    assert!(snapshot.challenges.is_empty());
    assert!(manager.last_metrics().unwrap().is_none());
}

#[test]
fn test_reseeded_achievements_catch_up_with_settled_metrics() {
    let (_dir, config) = temp_config();
    let metrics = AppMetrics {
        dark_mode_enabled: true,
        bill_count: 3,
        ..Default::default()
    };
    {
        let manager = open_manager(&config);
        manager
            .apply_event_at(EngagementInput::Metrics(metrics.clone()), &utc(1, 9, 0))
            .unwrap();
        assert_eq!(manager.snapshot().unwrap().unlocked_achievements, 2);
    }

    let conn = rusqlite::Connection::open(config.database_path()).unwrap();
    conn.execute("UPDATE kv SET value = 'garbage' WHERE key = 'achievements'", [])
        .unwrap();
    drop(conn);

    let manager = open_manager(&config);
    assert_eq!(manager.snapshot().unwrap().unlocked_achievements, 0);

    // Same values as before: nothing "changed", yet the unlocks come back
    let events = manager
        .apply_event_at(EngagementInput::Metrics(metrics), &utc(1, 10, 0))
        .unwrap();
    let unlocked = unlocked_ids(&events);
    assert!(unlocked.contains(&AchievementId::DarkMode));
    assert!(unlocked.contains(&AchievementId::FirstBill));

    let snapshot = manager.snapshot().unwrap();
    assert_eq!(snapshot.unlocked_achievements, 2);
    assert!(snapshot
        .achievements
        .iter()
        .any(|a| a.id == "dark-mode" && a.unlocked));
}

#[test]
fn test_retired_orphan_does_not_wipe_unlocks() {
    let (_dir, config) = temp_config();
    {
        let manager = open_manager(&config);
        manager
            .apply_event_at(
                EngagementInput::Metrics(AppMetrics {
                    dark_mode_enabled: true,
                    bill_count: 1,
                    ..Default::default()
                }),
                &utc(1, 9, 0),
            )
            .unwrap();
    }

    let conn = rusqlite::Connection::open(config.database_path()).unwrap();
    let raw: String = conn
        .query_row("SELECT value FROM kv WHERE key = 'achievements'", [], |r| r.get(0))
        .unwrap();
    let mut entries: Vec<Value> = serde_json::from_str(&raw).unwrap();
    let retired = serde_json::json!({
        "id": "retired-x",
        "title": "Launch Day",
        "description": "Gone from the catalog",
        "icon": "rocket",
        "points": 25,
        "badge": "bronze",
        "category": "getting-started",
        "unlocked": true,
        "unlockedAt": "2024-06-01T09:00:00+00:00",
    });
    entries.push(retired.clone());
    conn.execute(
        "UPDATE kv SET value = ?1 WHERE key = 'achievements'",
        [serde_json::to_string(&entries).unwrap()],
    )
    .unwrap();
    drop(conn);

    let manager = open_manager(&config);
    let snapshot = manager.snapshot().unwrap();
    assert_eq!(snapshot.unlocked_achievements, 2);
    assert_eq!(snapshot.points(), 5 + 10);

    // The orphan is written back untouched on the next save
    manager
        .apply_event_at(EngagementInput::CheckIn, &utc(2, 9, 0))
        .unwrap();
    let conn = rusqlite::Connection::open(config.database_path()).unwrap();
    let raw: String = conn
        .query_row("SELECT value FROM kv WHERE key = 'achievements'", [], |r| r.get(0))
        .unwrap();
    let entries: Vec<Value> = serde_json::from_str(&raw).unwrap();
    assert!(entries.contains(&retired));
}

#[test]
fn test_concurrent_writers_keep_both_unlocks() {
    let (_dir, config) = temp_config();
    let manager = open_manager(&config);

    std::thread::scope(|s| {
        let dark = s.spawn(|| {
            for hour in 9..14 {
                manager
                    .apply_event_at(
                        EngagementInput::Metrics(AppMetrics {
                            dark_mode_enabled: true,
                            ..Default::default()
                        }),
                        &utc(1, hour, 0),
                    )
                    .unwrap();
            }
        });
        let export = s.spawn(|| {
            for hour in 9..14 {
                manager
                    .apply_event_at(
                        EngagementInput::Metrics(AppMetrics {
                            export_used: true,
                            ..Default::default()
                        }),
                        &utc(1, hour, 30),
                    )
                    .unwrap();
            }
        });
        dark.join().unwrap();
        export.join().unwrap();
    });

    let snapshot = manager.snapshot().unwrap();
    let unlocked: Vec<&str> = snapshot
        .achievements
        .iter()
        .filter(|a| a.unlocked)
        .map(|a| a.id.as_str())
        .collect();
    assert!(unlocked.contains(&"dark-mode"));
    assert!(unlocked.contains(&"data-export"));
    assert_eq!(snapshot.unlocked_achievements, 2);
}
