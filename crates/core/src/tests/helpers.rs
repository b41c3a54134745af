// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{AbTestStore, GamificationStore, InsertOutcome, StoreError};
use presta_domain::{
    AbTest, Achievement, AchievementRule, Assignment, NewAbTest, NewAchievement, NewConversion,
    StatMetric, TestStatus, UserAchievement, UserStats, level_for_xp,
};
use std::collections::BTreeMap;

/// A stored award row.
#[derive(Debug, Clone)]
pub struct AwardRow {
    pub user_id: i64,
    pub achievement_id: i64,
    pub awarded_at: String,
    pub is_notified: bool,
}

/// In-memory implementation of both store traits.
///
/// The `race_*` fields let a test pretend another writer got there first.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub tests: Vec<AbTest>,
    pub assignments: Vec<Assignment>,
    pub conversions: Vec<NewConversion>,
    pub achievements: Vec<Achievement>,
    pub stats: BTreeMap<i64, UserStats>,
    pub awards: Vec<AwardRow>,
    /// Variant a concurrent writer stores just before the next assignment insert.
    pub race_assignment_variant: Option<String>,
    /// Test key a concurrent writer creates just before the next test insert.
    pub race_test_key: bool,
    /// Whether a concurrent writer awards the next achievement first.
    pub race_award: bool,
    /// Whether the next award fails before anything is written.
    pub fail_award: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_running_test(&mut self, key: &str, variants: &[&str]) -> AbTest {
        let new_test: NewAbTest = NewAbTest::new(
            key,
            "Test",
            None,
            variants.iter().map(|v| (*v).to_string()).collect(),
        )
        .unwrap();
        self.insert_test(&new_test, "2026-01-01T00:00:00Z")
            .unwrap()
            .into_inner()
    }

    pub fn add_achievement(
        &mut self,
        code: &str,
        metric: StatMetric,
        threshold: f64,
        xp_reward: i64,
    ) -> Achievement {
        let new_achievement: NewAchievement = NewAchievement::new(
            code,
            code,
            "",
            "trophy",
            xp_reward,
            AchievementRule::new(metric, threshold),
        )
        .unwrap();
        self.insert_achievement(&new_achievement)
            .unwrap()
            .into_inner()
    }

    pub fn set_stats(&mut self, stats: UserStats) {
        self.stats.insert(stats.user_id, stats);
    }

    pub fn conversions_for(&self, test_id: i64) -> Vec<&NewConversion> {
        self.conversions
            .iter()
            .filter(|c| c.test_id == test_id)
            .collect()
    }

    fn stats_entry(&mut self, user_id: i64) -> &mut UserStats {
        self.stats
            .entry(user_id)
            .or_insert_with(|| UserStats::empty(user_id))
    }

    fn credit_xp(&mut self, user_id: i64, amount: i64) -> i64 {
        let entry: &mut UserStats = self.stats_entry(user_id);
        entry.xp += amount;
        entry.level = level_for_xp(entry.xp);
        entry.xp
    }
}

impl AbTestStore for MemoryStore {
    fn find_test_by_key(&mut self, key: &str) -> Result<Option<AbTest>, StoreError> {
        Ok(self.tests.iter().find(|t| t.key == key).cloned())
    }

    fn find_test_by_id(&mut self, test_id: i64) -> Result<Option<AbTest>, StoreError> {
        Ok(self.tests.iter().find(|t| t.test_id == test_id).cloned())
    }

    fn list_tests(&mut self) -> Result<Vec<AbTest>, StoreError> {
        Ok(self.tests.clone())
    }

    fn insert_test(
        &mut self,
        test: &NewAbTest,
        started_at: &str,
    ) -> Result<InsertOutcome<AbTest>, StoreError> {
        let make = |test_id: i64| AbTest {
            test_id,
            key: test.key.value().to_string(),
            name: test.name.clone(),
            description: test.description.clone(),
            variants: test.variants.clone(),
            status: TestStatus::Running,
            started_at: started_at.to_string(),
            ended_at: None,
        };
        if self.race_test_key {
            self.race_test_key = false;
            let id: i64 = i64::try_from(self.tests.len()).unwrap() + 1;
            self.tests.push(make(id));
        }
        if let Some(existing) = self.tests.iter().find(|t| t.key == test.key.value()) {
            return Ok(InsertOutcome::Existing(existing.clone()));
        }
        let id: i64 = i64::try_from(self.tests.len()).unwrap() + 1;
        let created: AbTest = make(id);
        self.tests.push(created.clone());
        Ok(InsertOutcome::Inserted(created))
    }

    fn end_test(&mut self, test_id: i64, ended_at: &str) -> Result<AbTest, StoreError> {
        let test: &mut AbTest = self
            .tests
            .iter_mut()
            .find(|t| t.test_id == test_id)
            .ok_or_else(|| StoreError::new("test not found"))?;
        if test.status.is_running() {
            test.status = TestStatus::Ended;
            test.ended_at = Some(ended_at.to_string());
        }
        Ok(test.clone())
    }

    fn find_assignment(
        &mut self,
        test_id: i64,
        subject_key: &str,
    ) -> Result<Option<Assignment>, StoreError> {
        Ok(self
            .assignments
            .iter()
            .find(|a| a.test_id == test_id && a.subject_key == subject_key)
            .cloned())
    }

    fn insert_assignment_if_absent(
        &mut self,
        assignment: &Assignment,
    ) -> Result<InsertOutcome<Assignment>, StoreError> {
        if let Some(variant) = self.race_assignment_variant.take() {
            self.assignments.push(Assignment {
                variant,
                ..assignment.clone()
            });
        }
        if let Some(existing) = self
            .assignments
            .iter()
            .find(|a| a.test_id == assignment.test_id && a.subject_key == assignment.subject_key)
        {
            return Ok(InsertOutcome::Existing(existing.clone()));
        }
        self.assignments.push(assignment.clone());
        Ok(InsertOutcome::Inserted(assignment.clone()))
    }

    fn append_conversion(&mut self, conversion: &NewConversion) -> Result<i64, StoreError> {
        self.conversions.push(conversion.clone());
        Ok(i64::try_from(self.conversions.len()).unwrap())
    }

    fn count_assignments_by_variant(
        &mut self,
        test_id: i64,
    ) -> Result<Vec<(String, i64)>, StoreError> {
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for a in self
            .assignments
            .iter()
            .filter(|a| a.test_id == test_id && a.adopted_from.is_none())
        {
            *counts.entry(a.variant.clone()).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    fn count_conversions_by_variant(
        &mut self,
        test_id: i64,
    ) -> Result<Vec<(String, String, i64)>, StoreError> {
        let mut counts: BTreeMap<(String, String), i64> = BTreeMap::new();
        for c in self.conversions.iter().filter(|c| c.test_id == test_id) {
            *counts
                .entry((c.variant.clone(), c.conversion_type.clone()))
                .or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|((variant, kind), count)| (variant, kind, count))
            .collect())
    }
}

impl GamificationStore for MemoryStore {
    fn get_user_stats(&mut self, user_id: i64) -> Result<Option<UserStats>, StoreError> {
        Ok(self.stats.get(&user_id).cloned())
    }

    fn save_user_activity(&mut self, stats: &UserStats) -> Result<(), StoreError> {
        let entry: &mut UserStats = self.stats_entry(stats.user_id);
        entry.total_tasks_completed = stats.total_tasks_completed;
        entry.average_rating = stats.average_rating;
        entry.total_reviews = stats.total_reviews;
        Ok(())
    }

    fn list_achievements(&mut self) -> Result<Vec<Achievement>, StoreError> {
        Ok(self.achievements.clone())
    }

    fn insert_achievement(
        &mut self,
        achievement: &NewAchievement,
    ) -> Result<InsertOutcome<Achievement>, StoreError> {
        if let Some(existing) = self.achievements.iter().find(|a| a.code == achievement.code) {
            return Ok(InsertOutcome::Existing(existing.clone()));
        }
        let created: Achievement = Achievement {
            achievement_id: i64::try_from(self.achievements.len()).unwrap() + 1,
            code: achievement.code.clone(),
            name: achievement.name.clone(),
            description: achievement.description.clone(),
            icon: achievement.icon.clone(),
            xp_reward: achievement.xp_reward,
            rule: achievement.rule,
        };
        self.achievements.push(created.clone());
        Ok(InsertOutcome::Inserted(created))
    }

    fn list_awarded_achievement_ids(&mut self, user_id: i64) -> Result<Vec<i64>, StoreError> {
        Ok(self
            .awards
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.achievement_id)
            .collect())
    }

    fn award_achievement_if_absent(
        &mut self,
        user_id: i64,
        achievement_id: i64,
        xp_reward: i64,
        awarded_at: &str,
    ) -> Result<InsertOutcome<i64>, StoreError> {
        if self.fail_award {
            self.fail_award = false;
            return Err(StoreError::new("disk I/O error"));
        }
        let row: AwardRow = AwardRow {
            user_id,
            achievement_id,
            awarded_at: awarded_at.to_string(),
            is_notified: false,
        };
        if self.race_award {
            self.race_award = false;
            self.awards.push(row.clone());
            self.credit_xp(user_id, xp_reward);
        }
        if self
            .awards
            .iter()
            .any(|a| a.user_id == user_id && a.achievement_id == achievement_id)
        {
            let xp: i64 = self.stats.get(&user_id).map_or(0, |stats| stats.xp);
            return Ok(InsertOutcome::Existing(xp));
        }
        self.awards.push(row);
        Ok(InsertOutcome::Inserted(self.credit_xp(user_id, xp_reward)))
    }

    fn list_user_achievements(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<UserAchievement>, StoreError> {
        let mut rows: Vec<(usize, &AwardRow)> = self
            .awards
            .iter()
            .enumerate()
            .filter(|(_, a)| a.user_id == user_id)
            .collect();
        rows.sort_by(|(ia, a), (ib, b)| b.awarded_at.cmp(&a.awarded_at).then(ib.cmp(ia)));
        Ok(rows
            .into_iter()
            .filter_map(|(_, row)| {
                self.achievements
                    .iter()
                    .find(|a| a.achievement_id == row.achievement_id)
                    .map(|achievement| UserAchievement {
                        user_id,
                        achievement: achievement.clone(),
                        awarded_at: row.awarded_at.clone(),
                        is_notified: row.is_notified,
                    })
            })
            .collect())
    }

    fn mark_achievements_notified(
        &mut self,
        user_id: i64,
        achievement_ids: &[i64],
    ) -> Result<usize, StoreError> {
        let mut updated: usize = 0;
        for row in &mut self.awards {
            if row.user_id == user_id
                && !row.is_notified
                && achievement_ids.contains(&row.achievement_id)
            {
                row.is_notified = true;
                updated += 1;
            }
        }
        Ok(updated)
    }
}
