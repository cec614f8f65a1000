use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== Questions ====================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "expert" => Ok(Difficulty::Expert),
            other => Err(format!("unknown difficulty: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Example {
    pub input: String,
    pub output: String,
}

/// A practice problem. Defined at build time and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    pub title: String,
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
    pub statement: String,
    pub note: String,
    pub input: String,
    pub constraints: String,
    pub example: Example,
    pub test_cases: Vec<TestCase>,
    pub code_template: String,
    pub hint: String,
    pub solution: Option<String>,
    pub xp_reward: u32,
    pub coin_reward: u32,
    /// Seconds. Shown as a countdown only; never enforced.
    pub time_limit: u32,
}

// ==================== Execution ====================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pending,
    Passed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub input: String,
    pub output: String,
    pub status: TestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestCase {
    pub fn pending(input: &str, output: &str) -> Self {
        Self {
            input: input.to_string(),
            output: output.to_string(),
            status: TestStatus::Pending,
            actual_output: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub test_cases: Vec<TestCase>,
    /// Milliseconds
    pub execution_time: f64,
}

impl ExecutionResult {
    pub fn failed_count(&self) -> usize {
        self.test_cases
            .iter()
            .filter(|tc| tc.status == TestStatus::Failed)
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyntaxCheck {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ==================== Progress ====================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Solving,
    Streak,
    Accuracy,
    Speed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: AchievementCategory,
    pub xp_reward: u32,
    pub unlocked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BadgeCategory {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: BadgeCategory,
    pub unlocked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStatistics {
    pub total_questions_solved: u32,
    pub total_submissions: u32,
    #[serde(default)]
    pub accepted_submissions: u32,
    /// Running mean over all submissions, milliseconds
    pub average_execution_time: f64,
    pub favorite_topics: Vec<String>,
    pub longest_streak: u32,
    pub current_streak: u32,
    /// Percent of accepted submissions
    pub accuracy: f64,
}

/// Per-user snapshot persisted as one JSON blob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: String,
    pub completed_questions: Vec<u32>,
    pub current_level: u32,
    #[serde(rename = "totalXP")]
    pub total_xp: u32,
    pub streak: u32,
    #[serde(default)]
    pub last_active_date: Option<DateTime<Utc>>,
    pub achievements: Vec<Achievement>,
    pub badges: Vec<Badge>,
    pub statistics: UserStatistics,
}

impl UserProgress {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            completed_questions: Vec::new(),
            current_level: 1,
            total_xp: 0,
            streak: 0,
            last_active_date: None,
            achievements: Vec::new(),
            badges: Vec::new(),
            statistics: UserStatistics::default(),
        }
    }

    pub fn has_completed(&self, question_id: u32) -> bool {
        self.completed_questions.contains(&question_id)
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a.id == id)
    }

    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.iter().any(|b| b.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    pub level: u32,
    pub title: String,
    #[serde(rename = "nextLevelXP")]
    pub next_level_xp: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalytics {
    pub progress: UserProgress,
    pub level: LevelInfo,
    /// Percent of the catalog solved
    pub completion_rate: f64,
    #[serde(rename = "averageXPPerQuestion")]
    pub average_xp_per_question: f64,
    pub favorite_topics: Vec<String>,
}

// ==================== Coins ====================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Earned,
    Spent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CoinSource {
    Question,
    Achievement,
    Challenge,
    Streak,
    Purchase,
    Reward,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoinTransaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: u32,
    pub source: CoinSource,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoinWallet {
    pub user_id: String,
    pub balance: u32,
    #[serde(default)]
    pub purchased_items: Vec<String>,
    pub history: Vec<CoinTransaction>,
}

impl CoinWallet {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            balance: 0,
            purchased_items: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn total(&self, kind: TransactionKind) -> u32 {
        self.history
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.amount)
            .sum()
    }
}

// ==================== Shop ====================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShopCategory {
    Hint,
    Powerup,
    Cosmetic,
    Boost,
}

impl std::str::FromStr for ShopCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hint" => Ok(ShopCategory::Hint),
            "powerup" => Ok(ShopCategory::Powerup),
            "cosmetic" => Ok(ShopCategory::Cosmetic),
            "boost" => Ok(ShopCategory::Boost),
            other => Err(format!("unknown shop category: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: u32,
    pub category: ShopCategory,
    pub rarity: Rarity,
    pub effect: String,
}

// ==================== Leaderboard ====================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub name: String,
    pub xp: u32,
    pub level: u32,
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub is_current_user: bool,
}

// ==================== Challenges ====================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Ready,
    Solving,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeParticipant {
    pub user_id: String,
    pub name: String,
    pub avatar: String,
    pub status: ParticipantStatus,
    pub score: u32,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    Waiting,
    Active,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub participants: Vec<ChallengeParticipant>,
    pub max_participants: usize,
    pub start_time: DateTime<Utc>,
    /// Minutes
    pub duration: u32,
    pub status: ChallengeStatus,
    pub xp_reward: u32,
    pub question_id: u32,
}

impl Challenge {
    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.max_participants
    }

    pub fn participant(&self, user_id: &str) -> Option<&ChallengeParticipant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_json_uses_storage_field_names() {
        let progress = UserProgress::new("u1");
        let json = serde_json::to_value(&progress).unwrap();

        assert_eq!(json["userId"], "u1");
        assert_eq!(json["totalXP"], 0);
        assert_eq!(json["currentLevel"], 1);
        assert!(json["statistics"]["totalQuestionsSolved"].is_number());
    }

    #[test]
    fn test_progress_without_newer_fields_still_loads() {
        let stored = r#"{
            "userId": "old",
            "completedQuestions": [1, 2],
            "currentLevel": 3,
            "totalXP": 175,
            "streak": 2,
            "achievements": [],
            "badges": [],
            "statistics": {
                "totalQuestionsSolved": 2,
                "totalSubmissions": 3,
                "averageExecutionTime": 1500.0,
                "favoriteTopics": [],
                "longestStreak": 2,
                "currentStreak": 2,
                "accuracy": 0
            }
        }"#;

        let progress: UserProgress = serde_json::from_str(stored).unwrap();
        assert_eq!(progress.total_xp, 175);
        assert_eq!(progress.last_active_date, None);
        assert_eq!(progress.statistics.accepted_submissions, 0);
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!("medium".parse::<Difficulty>(), Ok(Difficulty::Medium));
        assert!("impossible".parse::<Difficulty>().is_err());
    }
}
