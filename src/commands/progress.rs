// Progress commands
// Dashboard, achievements page and leaderboard

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::models::{
    AchievementCategory, BadgeCategory, LeaderboardEntry, LevelInfo, UserAnalytics, UserProgress,
};
use crate::services::get_user_level;

/// One catalog achievement with the user's unlock state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStatusDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: AchievementCategory,
    pub xp_reward: u32,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeStatusDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: BadgeCategory,
    pub unlocked_at: Option<DateTime<Utc>>,
}

pub async fn get_progress(state: &AppState) -> Result<UserProgress, String> {
    let user_id = state.current_user_id()?;
    state
        .tracker
        .get_user_progress(&user_id)
        .map_err(|e| e.to_string())
}

pub async fn get_level(state: &AppState) -> Result<LevelInfo, String> {
    let progress = get_progress(state).await?;
    Ok(get_user_level(progress.total_xp))
}

/// Every catalog achievement, unlocked ones first
pub async fn get_achievements(state: &AppState) -> Result<Vec<AchievementStatusDto>, String> {
    let progress = get_progress(state).await?;

    let mut statuses: Vec<AchievementStatusDto> = state
        .tracker
        .achievement_catalog()
        .iter()
        .map(|def| {
            let unlocked_at = progress
                .achievements
                .iter()
                .find(|a| a.id == def.id)
                .map(|a| a.unlocked_at);

            AchievementStatusDto {
                id: def.id.to_string(),
                name: def.name.to_string(),
                description: def.description.to_string(),
                icon: def.icon.to_string(),
                category: def.category,
                xp_reward: def.xp_reward,
                unlocked: unlocked_at.is_some(),
                unlocked_at,
            }
        })
        .collect();

    statuses.sort_by_key(|s| !s.unlocked);
    Ok(statuses)
}

/// Badge catalog in tier order with unlock times
pub async fn get_badges(state: &AppState) -> Result<Vec<BadgeStatusDto>, String> {
    let progress = get_progress(state).await?;

    Ok(state
        .tracker
        .badge_catalog()
        .iter()
        .map(|def| BadgeStatusDto {
            id: def.id.to_string(),
            name: def.name.to_string(),
            description: def.description.to_string(),
            icon: def.icon.to_string(),
            category: def.category,
            unlocked_at: progress
                .badges
                .iter()
                .find(|b| b.id == def.id)
                .map(|b| b.unlocked_at),
        })
        .collect())
}

pub async fn get_analytics(state: &AppState) -> Result<UserAnalytics, String> {
    let user_id = state.current_user_id()?;
    state
        .tracker
        .get_user_analytics(&user_id)
        .map_err(|e| e.to_string())
}

pub async fn get_leaderboard(state: &AppState) -> Result<Vec<LeaderboardEntry>, String> {
    let user_id = state.current_user_id()?;
    state
        .leaderboard
        .standings(&user_id)
        .map_err(|e| e.to_string())
}
