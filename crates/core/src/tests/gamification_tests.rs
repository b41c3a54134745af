// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::MemoryStore;
use crate::{
    CoreError, check_and_award_achievements, create_achievement, get_user_achievements,
    get_user_stats, mark_as_notified, record_review_received, record_task_completed,
};
use presta_domain::{
    AchievementRule, DomainError, NewAchievement, StatMetric, UserStats,
};

fn stats_with_tasks(user_id: i64, tasks: i64) -> UserStats {
    UserStats {
        total_tasks_completed: tasks,
        ..UserStats::empty(user_id)
    }
}

#[test]
fn test_stats_default_for_unknown_user() {
    let mut store: MemoryStore = MemoryStore::new();

    let stats: UserStats = get_user_stats(&mut store, 12).unwrap();

    assert_eq!(stats, UserStats::empty(12));
    assert_eq!(stats.level, 1);
    assert_eq!(stats.xp_for_next_level(), Some(100));
}

#[test]
fn test_stats_level_is_derived_from_xp() {
    let mut store: MemoryStore = MemoryStore::new();
    store.set_stats(UserStats {
        xp: 260,
        level: 1,
        ..UserStats::empty(3)
    });

    let stats: UserStats = get_user_stats(&mut store, 3).unwrap();

    assert_eq!(stats.level, 3);
    assert_eq!(stats.xp_for_next_level(), Some(500));
}

#[test]
fn test_third_job_awards_first_three_jobs() {
    let mut store: MemoryStore = MemoryStore::new();
    store.add_achievement("first_three_jobs", StatMetric::TasksCompleted, 3.0, 50);
    store.set_stats(stats_with_tasks(1, 2));

    assert!(check_and_award_achievements(&mut store, 1).unwrap().is_empty());

    let awarded = record_task_completed(&mut store, 1).unwrap();

    assert_eq!(awarded.len(), 1);
    assert_eq!(awarded[0].code, "first_three_jobs");
    let stats: UserStats = get_user_stats(&mut store, 1).unwrap();
    assert_eq!(stats.total_tasks_completed, 3);
    assert_eq!(stats.xp, 50);
    assert_eq!(stats.level, 1);

    let listed = get_user_achievements(&mut store, 1).unwrap();
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].is_notified);
}

#[test]
fn test_award_is_granted_once() {
    let mut store: MemoryStore = MemoryStore::new();
    store.add_achievement("first_job", StatMetric::TasksCompleted, 1.0, 10);
    store.set_stats(stats_with_tasks(1, 1));

    let first = check_and_award_achievements(&mut store, 1).unwrap();
    let second = check_and_award_achievements(&mut store, 1).unwrap();

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert_eq!(store.awards.len(), 1);
    assert_eq!(get_user_stats(&mut store, 1).unwrap().xp, 10);
}

#[test]
fn test_concurrent_award_is_skipped_without_double_xp() {
    let mut store: MemoryStore = MemoryStore::new();
    store.add_achievement("first_job", StatMetric::TasksCompleted, 1.0, 10);
    store.set_stats(stats_with_tasks(1, 1));
    store.race_award = true;

    let awarded = check_and_award_achievements(&mut store, 1).unwrap();

    assert!(awarded.is_empty());
    assert_eq!(store.awards.len(), 1);
    assert_eq!(get_user_stats(&mut store, 1).unwrap().xp, 10);
}

#[test]
fn test_failed_award_is_retried_with_its_xp() {
    let mut store: MemoryStore = MemoryStore::new();
    store.add_achievement("first_job", StatMetric::TasksCompleted, 1.0, 10);
    store.set_stats(stats_with_tasks(1, 1));
    store.fail_award = true;

    let failed = check_and_award_achievements(&mut store, 1);

    assert!(matches!(failed, Err(CoreError::Store(_))));
    assert!(store.awards.is_empty());
    assert_eq!(get_user_stats(&mut store, 1).unwrap().xp, 0);

    let awarded = check_and_award_achievements(&mut store, 1).unwrap();

    assert_eq!(awarded.len(), 1);
    assert_eq!(awarded[0].code, "first_job");
    assert_eq!(get_user_stats(&mut store, 1).unwrap().xp, 10);
}

#[test]
fn test_xp_reward_can_unlock_xp_achievement() {
    let mut store: MemoryStore = MemoryStore::new();
    store.add_achievement("centurion", StatMetric::Xp, 100.0, 0);
    store.add_achievement("first_job", StatMetric::TasksCompleted, 1.0, 100);
    store.set_stats(stats_with_tasks(4, 1));

    let awarded = check_and_award_achievements(&mut store, 4).unwrap();

    let codes: Vec<&str> = awarded.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(codes, vec!["first_job", "centurion"]);
    let stats: UserStats = get_user_stats(&mut store, 4).unwrap();
    assert_eq!(stats.xp, 100);
    assert_eq!(stats.level, 2);
    assert_eq!(store.stats.get(&4).unwrap().level, 2);
}

#[test]
fn test_average_rating_rule_needs_a_review() {
    let mut store: MemoryStore = MemoryStore::new();
    store.add_achievement("well_rated", StatMetric::AverageRating, 0.0, 5);

    assert!(check_and_award_achievements(&mut store, 2).unwrap().is_empty());

    let awarded = record_review_received(&mut store, 2, 4).unwrap();

    assert_eq!(awarded.len(), 1);
    let stats: UserStats = get_user_stats(&mut store, 2).unwrap();
    assert_eq!(stats.total_reviews, 1);
    assert!((stats.average_rating - 4.0).abs() < f64::EPSILON);
}

#[test]
fn test_review_updates_running_average() {
    let mut store: MemoryStore = MemoryStore::new();

    record_review_received(&mut store, 2, 5).unwrap();
    record_review_received(&mut store, 2, 2).unwrap();

    let stats: UserStats = get_user_stats(&mut store, 2).unwrap();
    assert_eq!(stats.total_reviews, 2);
    assert!((stats.average_rating - 3.5).abs() < f64::EPSILON);
}

#[test]
fn test_review_rejects_out_of_range_rating() {
    let mut store: MemoryStore = MemoryStore::new();

    let result = record_review_received(&mut store, 2, 6);

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::InvalidRating(6)))
    );
    assert!(store.stats.is_empty());
}

#[test]
fn test_mark_as_notified_counts_only_own_pending_rows() {
    let mut store: MemoryStore = MemoryStore::new();
    let first = store.add_achievement("first_job", StatMetric::TasksCompleted, 1.0, 10);
    let other = store.add_achievement("first_review", StatMetric::ReviewsReceived, 1.0, 10);
    store.set_stats(stats_with_tasks(1, 1));
    store.set_stats(UserStats {
        total_reviews: 1,
        average_rating: 5.0,
        ..UserStats::empty(2)
    });
    check_and_award_achievements(&mut store, 1).unwrap();
    check_and_award_achievements(&mut store, 2).unwrap();

    let ids: Vec<i64> = vec![
        first.achievement_id,
        first.achievement_id,
        other.achievement_id,
        999,
    ];
    let updated: usize = mark_as_notified(&mut store, 1, &ids).unwrap();
    let again: usize = mark_as_notified(&mut store, 1, &ids).unwrap();

    assert_eq!(updated, 1);
    assert_eq!(again, 0);
    let foreign = store
        .awards
        .iter()
        .find(|a| a.user_id == 2)
        .unwrap();
    assert!(!foreign.is_notified);
}

#[test]
fn test_mark_as_notified_with_no_ids() {
    let mut store: MemoryStore = MemoryStore::new();

    assert_eq!(mark_as_notified(&mut store, 1, &[]).unwrap(), 0);
}

#[test]
fn test_achievements_listed_newest_first() {
    let mut store: MemoryStore = MemoryStore::new();
    store.add_achievement("first_job", StatMetric::TasksCompleted, 1.0, 10);
    store.add_achievement("first_three_jobs", StatMetric::TasksCompleted, 3.0, 50);

    record_task_completed(&mut store, 1).unwrap();
    record_task_completed(&mut store, 1).unwrap();
    record_task_completed(&mut store, 1).unwrap();

    let listed = get_user_achievements(&mut store, 1).unwrap();
    let codes: Vec<&str> = listed.iter().map(|a| a.achievement.code.as_str()).collect();
    assert_eq!(codes, vec!["first_three_jobs", "first_job"]);
    assert_eq!(get_user_stats(&mut store, 1).unwrap().xp, 60);
}

#[test]
fn test_create_achievement_rejects_duplicate_code() {
    let mut store: MemoryStore = MemoryStore::new();
    let new_achievement: NewAchievement = NewAchievement::new(
        "first_job",
        "First job",
        "Complete your first job",
        "star",
        10,
        AchievementRule::new(StatMetric::TasksCompleted, 1.0),
    )
    .unwrap();

    let created = create_achievement(&mut store, &new_achievement).unwrap();
    let duplicate = create_achievement(&mut store, &new_achievement);

    assert_eq!(created.code, "first_job");
    assert_eq!(
        duplicate,
        Err(CoreError::DomainViolation(
            DomainError::DuplicateAchievementCode(String::from("first_job"))
        ))
    );
}
