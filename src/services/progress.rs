// Progress tracker
// Per-user JSON snapshot: solved questions, XP, streaks, achievements and badges

use chrono::{DateTime, Local, Utc};
use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{
    Achievement, AchievementCategory, Badge, BadgeCategory, LevelInfo, UserAnalytics,
    UserProgress,
};
use crate::services::catalog;
use crate::services::storage::KeyValueStore;

/// Storage key prefix, the user id is appended
pub const PROGRESS_KEY_PREFIX: &str = "crackalgo_user_progress_";

const FAVORITE_TOPIC_COUNT: usize = 3;

/// Threshold a statistic has to cross for an unlock
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Requirement {
    QuestionsSolved(u32),
    Streak(u32),
    Accuracy { min_percent: f64, min_submissions: u32 },
    AverageTimeAtMost(f64),
}

impl Requirement {
    pub fn is_met(&self, progress: &UserProgress) -> bool {
        let stats = &progress.statistics;
        match *self {
            Requirement::QuestionsSolved(n) => stats.total_questions_solved >= n,
            Requirement::Streak(days) => progress.streak >= days,
            Requirement::Accuracy {
                min_percent,
                min_submissions,
            } => stats.total_submissions >= min_submissions && stats.accuracy >= min_percent,
            Requirement::AverageTimeAtMost(ms) => {
                stats.total_submissions > 0 && stats.average_execution_time <= ms
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: AchievementCategory,
    pub xp_reward: u32,
    pub requirement: Requirement,
}

impl AchievementDef {
    fn unlock(&self, at: DateTime<Utc>) -> Achievement {
        Achievement {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
            category: self.category,
            xp_reward: self.xp_reward,
            unlocked_at: at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BadgeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: BadgeCategory,
    pub requirement: Requirement,
}

impl BadgeDef {
    fn unlock(&self, at: DateTime<Utc>) -> Badge {
        Badge {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
            category: self.category,
            unlocked_at: at,
        }
    }
}

pub const ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        id: "first_solve",
        name: "First Steps",
        description: "Solve your first question",
        icon: "🎯",
        category: AchievementCategory::Solving,
        xp_reward: 50,
        requirement: Requirement::QuestionsSolved(1),
    },
    AchievementDef {
        id: "streak_3",
        name: "Getting Started",
        description: "Maintain a 3-day streak",
        icon: "🔥",
        category: AchievementCategory::Streak,
        xp_reward: 100,
        requirement: Requirement::Streak(3),
    },
    AchievementDef {
        id: "streak_7",
        name: "Week Warrior",
        description: "Maintain a 7-day streak",
        icon: "⚡",
        category: AchievementCategory::Streak,
        xp_reward: 250,
        requirement: Requirement::Streak(7),
    },
    AchievementDef {
        id: "streak_30",
        name: "Consistency King",
        description: "Maintain a 30-day streak",
        icon: "👑",
        category: AchievementCategory::Streak,
        xp_reward: 1000,
        requirement: Requirement::Streak(30),
    },
    AchievementDef {
        id: "solve_10",
        name: "Problem Solver",
        description: "Solve 10 questions",
        icon: "🧩",
        category: AchievementCategory::Solving,
        xp_reward: 200,
        requirement: Requirement::QuestionsSolved(10),
    },
    AchievementDef {
        id: "solve_50",
        name: "DSA Master",
        description: "Solve 50 questions",
        icon: "🏆",
        category: AchievementCategory::Solving,
        xp_reward: 500,
        requirement: Requirement::QuestionsSolved(50),
    },
    AchievementDef {
        id: "perfect_accuracy",
        name: "Perfect Coder",
        description: "Maintain 95%+ accuracy",
        icon: "💎",
        category: AchievementCategory::Accuracy,
        xp_reward: 300,
        requirement: Requirement::Accuracy {
            min_percent: 95.0,
            min_submissions: 10,
        },
    },
    AchievementDef {
        id: "speed_demon",
        name: "Speed Demon",
        description: "Average execution time under 1 second",
        icon: "🚀",
        category: AchievementCategory::Speed,
        xp_reward: 400,
        requirement: Requirement::AverageTimeAtMost(1000.0),
    },
];

pub const BADGES: &[BadgeDef] = &[
    BadgeDef {
        id: "beginner",
        name: "Beginner",
        description: "Solved a first question",
        icon: "🌱",
        category: BadgeCategory::Beginner,
        requirement: Requirement::QuestionsSolved(1),
    },
    BadgeDef {
        id: "intermediate",
        name: "Intermediate",
        description: "Solved 5 questions",
        icon: "📘",
        category: BadgeCategory::Intermediate,
        requirement: Requirement::QuestionsSolved(5),
    },
    BadgeDef {
        id: "advanced",
        name: "Advanced",
        description: "Solved 10 questions",
        icon: "🧠",
        category: BadgeCategory::Advanced,
        requirement: Requirement::QuestionsSolved(10),
    },
    BadgeDef {
        id: "expert",
        name: "Expert",
        description: "Kept a 7-day streak",
        icon: "🏅",
        category: BadgeCategory::Expert,
        requirement: Requirement::Streak(7),
    },
];

struct LevelDef {
    level: u32,
    title: &'static str,
    xp_required: u32,
}

const LEVELS: &[LevelDef] = &[
    LevelDef {
        level: 1,
        title: "Novice Coder",
        xp_required: 0,
    },
    LevelDef {
        level: 2,
        title: "Beginner",
        xp_required: 100,
    },
    LevelDef {
        level: 3,
        title: "Apprentice",
        xp_required: 300,
    },
    LevelDef {
        level: 4,
        title: "Intermediate",
        xp_required: 600,
    },
    LevelDef {
        level: 5,
        title: "Advanced",
        xp_required: 1000,
    },
    LevelDef {
        level: 6,
        title: "Expert",
        xp_required: 1500,
    },
    LevelDef {
        level: 7,
        title: "Master",
        xp_required: 2200,
    },
    LevelDef {
        level: 8,
        title: "Grandmaster",
        xp_required: 3000,
    },
    LevelDef {
        level: 9,
        title: "Legend",
        xp_required: 4000,
    },
    LevelDef {
        level: 10,
        title: "Mythic",
        xp_required: 5000,
    },
];

/// Highest level whose threshold is reached. `next_level_xp` is 0 at the top.
pub fn get_user_level(total_xp: u32) -> LevelInfo {
    let index = LEVELS
        .iter()
        .rposition(|l| total_xp >= l.xp_required)
        .unwrap_or(0);
    let current = &LEVELS[index];
    let next_level_xp = LEVELS
        .get(index + 1)
        .map(|next| next.xp_required.saturating_sub(total_xp))
        .unwrap_or(0);

    LevelInfo {
        level: current.level,
        title: current.title.to_string(),
        next_level_xp,
    }
}

/// What one accepted submission changed
#[derive(Debug, Clone)]
pub struct Completion {
    pub progress: UserProgress,
    /// False when the question had been solved before
    pub first_solve: bool,
    pub new_achievements: Vec<Achievement>,
    pub new_badges: Vec<Badge>,
}

/// Progress tracker over a key-value store
pub struct ProgressTracker {
    store: Arc<dyn KeyValueStore>,
    achievements: Vec<AchievementDef>,
    badges: Vec<BadgeDef>,
}

impl ProgressTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_catalogs(store, ACHIEVEMENTS.to_vec(), BADGES.to_vec())
    }

    pub fn with_catalogs(
        store: Arc<dyn KeyValueStore>,
        achievements: Vec<AchievementDef>,
        badges: Vec<BadgeDef>,
    ) -> Self {
        Self {
            store,
            achievements,
            badges,
        }
    }

    pub fn achievement_catalog(&self) -> &[AchievementDef] {
        &self.achievements
    }

    pub fn badge_catalog(&self) -> &[BadgeDef] {
        &self.badges
    }

    fn storage_key(user_id: &str) -> String {
        format!("{}{}", PROGRESS_KEY_PREFIX, user_id)
    }

    /// Stored snapshot, or a fresh zero state that is not written back
    pub fn get_user_progress(&self, user_id: &str) -> AppResult<UserProgress> {
        match self.store.get_item(&Self::storage_key(user_id))? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(UserProgress::new(user_id)),
        }
    }

    pub fn save_user_progress(&self, progress: &UserProgress) -> AppResult<()> {
        let json = serde_json::to_string(progress)?;
        self.store
            .set_item(&Self::storage_key(&progress.user_id), &json)
    }

    /// Records an accepted submission and returns the saved snapshot
    pub fn complete_question(
        &self,
        user_id: &str,
        question_id: u32,
        xp_earned: u32,
        execution_time: f64,
    ) -> AppResult<UserProgress> {
        self.record_completion(user_id, question_id, xp_earned, execution_time, Local::now())
            .map(|c| c.progress)
    }

    pub fn record_completion(
        &self,
        user_id: &str,
        question_id: u32,
        xp_earned: u32,
        execution_time: f64,
        now: DateTime<Local>,
    ) -> AppResult<Completion> {
        let mut progress = self.get_user_progress(user_id)?;

        let first_solve = !progress.has_completed(question_id);
        if first_solve {
            progress.completed_questions.push(question_id);
            progress.total_xp = progress.total_xp.saturating_add(xp_earned);
            progress.statistics.total_questions_solved += 1;
            progress.statistics.favorite_topics =
                favorite_topics(&progress.completed_questions);
        }

        progress.statistics.accepted_submissions += 1;
        count_submission(&mut progress, execution_time);

        progress.current_level = progress.current_level.max(question_id + 1);

        update_streak(&mut progress, now);
        progress.last_active_date = Some(now.with_timezone(&Utc));

        let (new_achievements, new_badges) = self.check_unlocks(&mut progress, now);

        self.save_user_progress(&progress)?;

        log::info!(
            "user {} completed question {} (first_solve={}, xp={}, streak={})",
            user_id,
            question_id,
            first_solve,
            progress.total_xp,
            progress.streak
        );

        Ok(Completion {
            progress,
            first_solve,
            new_achievements,
            new_badges,
        })
    }

    /// Counts a rejected submission. XP, streak and unlocks are untouched.
    pub fn record_failed_submission(
        &self,
        user_id: &str,
        execution_time: f64,
    ) -> AppResult<UserProgress> {
        let mut progress = self.get_user_progress(user_id)?;
        count_submission(&mut progress, execution_time);
        self.save_user_progress(&progress)?;

        log::debug!(
            "user {} failed a submission, accuracy now {:.1}%",
            user_id,
            progress.statistics.accuracy
        );
        Ok(progress)
    }

    fn check_unlocks(
        &self,
        progress: &mut UserProgress,
        now: DateTime<Local>,
    ) -> (Vec<Achievement>, Vec<Badge>) {
        let at = now.with_timezone(&Utc);

        let mut new_achievements = Vec::new();
        for def in &self.achievements {
            if !progress.has_achievement(def.id) && def.requirement.is_met(progress) {
                let achievement = def.unlock(at);
                progress.total_xp = progress.total_xp.saturating_add(def.xp_reward);
                progress.achievements.push(achievement.clone());
                new_achievements.push(achievement);
                log::info!("user {} unlocked achievement {}", progress.user_id, def.id);
            }
        }

        let mut new_badges = Vec::new();
        for def in &self.badges {
            if !progress.has_badge(def.id) && def.requirement.is_met(progress) {
                let badge = def.unlock(at);
                progress.badges.push(badge.clone());
                new_badges.push(badge);
            }
        }

        (new_achievements, new_badges)
    }

    pub fn get_user_analytics(&self, user_id: &str) -> AppResult<UserAnalytics> {
        let progress = self.get_user_progress(user_id)?;
        let level = get_user_level(progress.total_xp);

        let total = catalog::question_count();
        let completion_rate = if total > 0 {
            progress.completed_questions.len() as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        let solved = progress.statistics.total_questions_solved;
        let average_xp_per_question = if solved > 0 {
            progress.total_xp as f64 / solved as f64
        } else {
            0.0
        };

        Ok(UserAnalytics {
            favorite_topics: progress.statistics.favorite_topics.clone(),
            progress,
            level,
            completion_rate,
            average_xp_per_question,
        })
    }

    /// Every stored snapshot
    pub fn stored_users(&self) -> AppResult<Vec<UserProgress>> {
        let mut users = Vec::new();
        for key in self.store.keys_with_prefix(PROGRESS_KEY_PREFIX)? {
            if let Some(json) = self.store.get_item(&key)? {
                match serde_json::from_str::<UserProgress>(&json) {
                    Ok(progress) => users.push(progress),
                    Err(e) => log::warn!("skipping unreadable progress entry {}: {}", key, e),
                }
            }
        }
        Ok(users)
    }
}

fn count_submission(progress: &mut UserProgress, execution_time: f64) {
    let stats = &mut progress.statistics;
    stats.total_submissions += 1;

    let n = stats.total_submissions as f64;
    stats.average_execution_time = (stats.average_execution_time * (n - 1.0) + execution_time) / n;
    stats.accuracy = stats.accepted_submissions as f64 / n * 100.0;
}

/// Calendar days in local time: same day keeps a started streak,
/// yesterday extends it, anything else restarts at 1.
fn update_streak(progress: &mut UserProgress, now: DateTime<Local>) {
    let today = now.date_naive();
    let last_active = progress
        .last_active_date
        .map(|d| d.with_timezone(&Local).date_naive());

    match last_active {
        Some(day) if day == today && progress.streak > 0 => {}
        Some(day) if Some(day) == today.pred_opt() => progress.streak += 1,
        _ => progress.streak = 1,
    }

    let stats = &mut progress.statistics;
    stats.current_streak = progress.streak;
    stats.longest_streak = stats.longest_streak.max(progress.streak);
}

/// Most frequent tags over solved questions, first seen wins ties
fn favorite_topics(completed: &[u32]) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for question in completed.iter().filter_map(|id| catalog::get_question_by_id(*id)) {
        for tag in &question.tags {
            match counts.iter_mut().find(|(t, _)| t == tag) {
                Some((_, n)) => *n += 1,
                None => counts.push((tag.clone(), 1)),
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(FAVORITE_TOPIC_COUNT)
        .map(|(tag, _)| tag)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStore;
    use chrono::TimeZone;

    fn tracker() -> ProgressTracker {
        ProgressTracker::new(Arc::new(MemoryStore::new()))
    }

    fn bare_tracker() -> ProgressTracker {
        ProgressTracker::with_catalogs(Arc::new(MemoryStore::new()), Vec::new(), Vec::new())
    }

    fn day(d: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, d, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn test_same_question_twice_counts_once() {
        let tracker = bare_tracker();

        tracker.complete_question("u1", 1, 50, 1500.0).unwrap();
        let progress = tracker.complete_question("u1", 1, 50, 1500.0).unwrap();

        assert_eq!(progress.total_xp, 50);
        assert_eq!(progress.statistics.total_questions_solved, 1);
        assert_eq!(progress.statistics.total_submissions, 2);
        assert_eq!(progress.completed_questions, vec![1]);
    }

    #[test]
    fn test_achievement_xp_added_once() {
        let tracker = tracker();

        let first = tracker.record_completion("u1", 1, 50, 1500.0, day(1)).unwrap();
        assert!(first.first_solve);
        assert_eq!(
            first.new_achievements.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            vec!["first_solve"]
        );
        assert_eq!(first.progress.total_xp, 100);

        let again = tracker.record_completion("u1", 1, 50, 1500.0, day(1)).unwrap();
        assert!(!again.first_solve);
        assert!(again.new_achievements.is_empty());
        assert_eq!(again.progress.total_xp, 100);
        assert_eq!(again.progress.achievements.len(), 1);
    }

    #[test]
    fn test_streak_across_days() {
        let tracker = bare_tracker();

        let p = tracker.record_completion("u1", 1, 10, 1.0, day(1)).unwrap().progress;
        assert_eq!(p.streak, 1);

        let p = tracker.record_completion("u1", 2, 10, 1.0, day(1)).unwrap().progress;
        assert_eq!(p.streak, 1);

        let p = tracker.record_completion("u1", 3, 10, 1.0, day(2)).unwrap().progress;
        assert_eq!(p.streak, 2);

        let p = tracker.record_completion("u1", 4, 10, 1.0, day(3)).unwrap().progress;
        assert_eq!(p.streak, 3);

        let p = tracker.record_completion("u1", 5, 10, 1.0, day(5)).unwrap().progress;
        assert_eq!(p.streak, 1);
        assert_eq!(p.statistics.current_streak, 1);
        assert_eq!(p.statistics.longest_streak, 3);
    }

    #[test]
    fn test_streak_achievement_unlocks_on_third_day() {
        let tracker = tracker();

        for (d, q) in [(1, 1), (2, 2)] {
            let c = tracker.record_completion("u1", q, 10, 1500.0, day(d)).unwrap();
            assert!(!c.progress.has_achievement("streak_3"));
        }
        let c = tracker.record_completion("u1", 3, 10, 1500.0, day(3)).unwrap();
        assert!(c.new_achievements.iter().any(|a| a.id == "streak_3"));
    }

    #[test]
    fn test_current_level_follows_highest_solved() {
        let tracker = bare_tracker();

        let p = tracker.complete_question("u1", 3, 100, 1.0).unwrap();
        assert_eq!(p.current_level, 4);

        let p = tracker.complete_question("u1", 1, 50, 1.0).unwrap();
        assert_eq!(p.current_level, 4);
    }

    #[test]
    fn test_get_user_level() {
        let level = get_user_level(250);
        assert_eq!(level.level, 2);
        assert_eq!(level.title, "Beginner");
        assert_eq!(level.next_level_xp, 50);

        assert_eq!(get_user_level(0).next_level_xp, 100);
        assert_eq!(get_user_level(100).level, 2);
        assert_eq!(get_user_level(100).next_level_xp, 200);

        let top = get_user_level(12_000);
        assert_eq!(top.level, 10);
        assert_eq!(top.title, "Mythic");
        assert_eq!(top.next_level_xp, 0);
    }

    #[test]
    fn test_unknown_user_gets_default_without_write() {
        let store = Arc::new(MemoryStore::new());
        let tracker = ProgressTracker::new(store.clone());

        let progress = tracker.get_user_progress("nobody").unwrap();
        assert_eq!(progress, UserProgress::new("nobody"));
        assert!(store.keys_with_prefix(PROGRESS_KEY_PREFIX).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_round_trips_through_store() {
        let tracker = tracker();
        let saved = tracker.complete_question("u1", 2, 75, 1200.0).unwrap();

        assert_eq!(tracker.get_user_progress("u1").unwrap(), saved);
    }

    #[test]
    fn test_speed_demon_and_running_mean() {
        let tracker = tracker();

        let c = tracker.record_completion("u1", 1, 50, 3000.0, day(1)).unwrap();
        assert!(!c.progress.has_achievement("speed_demon"));

        let c = tracker.record_completion("u1", 2, 75, 200.0, day(1)).unwrap();
        assert_eq!(c.progress.statistics.average_execution_time, 1600.0);
        assert!(!c.progress.has_achievement("speed_demon"));

        let c = tracker.record_completion("u1", 3, 100, 100.0, day(1)).unwrap();
        assert_eq!(c.progress.statistics.average_execution_time, 1100.0);

        let c = tracker.record_completion("u1", 4, 125, 100.0, day(1)).unwrap();
        assert!(c.new_achievements.iter().any(|a| a.id == "speed_demon"));
    }

    #[test]
    fn test_accuracy_and_perfect_coder() {
        let tracker = tracker();

        tracker.record_failed_submission("u1", 2000.0).unwrap();
        let p = tracker.record_completion("u1", 1, 50, 2000.0, day(1)).unwrap().progress;
        assert_eq!(p.statistics.accuracy, 50.0);
        assert_eq!(p.total_xp, 100);

        for q in 1..=10 {
            tracker.record_completion("u2", q, 10, 2000.0, day(1)).unwrap();
        }
        let p = tracker.get_user_progress("u2").unwrap();
        assert_eq!(p.statistics.accuracy, 100.0);
        assert!(p.has_achievement("perfect_accuracy"));
        assert!(p.has_achievement("solve_10"));
    }

    #[test]
    fn test_badges_unlock_by_solved_count() {
        let tracker = tracker();

        for q in 1..=4 {
            tracker.record_completion("u1", q, 10, 2000.0, day(1)).unwrap();
        }
        let c = tracker.record_completion("u1", 5, 10, 2000.0, day(1)).unwrap();

        assert_eq!(
            c.new_badges.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(),
            vec!["intermediate"]
        );
        assert!(c.progress.has_badge("beginner"));
        assert!(!c.progress.has_badge("advanced"));
    }

    #[test]
    fn test_favorite_topics_and_analytics() {
        let tracker = bare_tracker();
        for q in [1, 2, 3, 5] {
            tracker.complete_question("u1", q, 100, 1.0).unwrap();
        }

        let analytics = tracker.get_user_analytics("u1").unwrap();
        assert_eq!(analytics.favorite_topics[0], "Arrays");
        assert_eq!(analytics.favorite_topics.len(), 3);
        assert_eq!(analytics.completion_rate, 40.0);
        assert_eq!(analytics.average_xp_per_question, 100.0);
        assert_eq!(analytics.level.level, 3);
    }

    #[test]
    fn test_stored_users() {
        let tracker = bare_tracker();
        tracker.complete_question("alice", 1, 50, 1.0).unwrap();
        tracker.complete_question("bob", 2, 75, 1.0).unwrap();

        let mut ids: Vec<String> = tracker
            .stored_users()
            .unwrap()
            .into_iter()
            .map(|p| p.user_id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["alice", "bob"]);
    }
}
