// Leaderboard
// Seed players merged with the users stored on this machine

use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{LeaderboardEntry, UserProgress};
use crate::services::progress::{get_user_level, ProgressTracker};

pub const TOP_PLAYER_TITLE: &str = "DSA ka Raja";

const LOCAL_AVATAR: &str = "👤";
const CURRENT_USER_NAME: &str = "You";

/// (name, xp, level, avatar)
const SEED_PLAYERS: &[(&str, u32, u32, &str)] = &[
    ("AlgoMaster99", 15420, 18, "👑"),
    ("CodeNinja", 14230, 17, "🥈"),
    ("DataStructureQueen", 13890, 16, "🥉"),
    ("BinaryTreeBoss", 12560, 15, "🏆"),
    ("GraphGuru", 11840, 14, "⭐"),
    ("SortingSensei", 10920, 13, "🔥"),
    ("RecursionRider", 9870, 12, "⚡"),
    ("HashMapHero", 8950, 11, "💎"),
    ("QueueQueen", 7820, 10, "🚀"),
    ("StackStar", 6740, 9, "✨"),
    ("LinkedListLord", 5630, 8, "🎯"),
];

pub struct Leaderboard {
    tracker: Arc<ProgressTracker>,
}

impl Leaderboard {
    pub fn new(tracker: Arc<ProgressTracker>) -> Self {
        Self { tracker }
    }

    pub fn standings(&self, current_user_id: &str) -> AppResult<Vec<LeaderboardEntry>> {
        let stored = self.tracker.stored_users()?;
        Ok(rank_players(&stored, current_user_id))
    }
}

fn local_entry(progress: &UserProgress, is_current_user: bool) -> LeaderboardEntry {
    LeaderboardEntry {
        rank: 0,
        name: if is_current_user {
            CURRENT_USER_NAME.to_string()
        } else {
            progress.user_id.clone()
        },
        xp: progress.total_xp,
        level: get_user_level(progress.total_xp).level,
        avatar: LOCAL_AVATAR.to_string(),
        title: None,
        is_current_user,
    }
}

/// Sorted by XP descending; on ties seed players stay ahead of local users
pub fn rank_players(stored: &[UserProgress], current_user_id: &str) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = SEED_PLAYERS
        .iter()
        .map(|&(name, xp, level, avatar)| LeaderboardEntry {
            rank: 0,
            name: name.to_string(),
            xp,
            level,
            avatar: avatar.to_string(),
            title: None,
            is_current_user: false,
        })
        .collect();

    entries.extend(
        stored
            .iter()
            .map(|p| local_entry(p, p.user_id == current_user_id)),
    );

    if !stored.iter().any(|p| p.user_id == current_user_id) {
        entries.push(local_entry(&UserProgress::new(current_user_id), true));
    }

    entries.sort_by(|a, b| b.xp.cmp(&a.xp));

    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i as u32 + 1;
    }
    if let Some(top) = entries.first_mut() {
        top.title = Some(TOP_PLAYER_TITLE.to_string());
    }

    entries
}
