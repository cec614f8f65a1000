// Command layer
// Operations behind each page and modal, returning serializable snapshots or
// an error message

pub mod auth;
pub mod challenges;
pub mod progress;
pub mod questions;
pub mod shop;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::services::{
    ChallengeBoard, CodeExecutor, CoinLedger, IdentityClient, KeyValueStore, Leaderboard,
    ProgressTracker, Shop, SqliteStore,
};

/// User id used while nobody is signed in
pub const GUEST_USER_ID: &str = "current-user";

/// Shared state handed to every command
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub tracker: Arc<ProgressTracker>,
    pub coins: Arc<CoinLedger>,
    pub shop: Shop,
    pub leaderboard: Leaderboard,
    pub executor: CodeExecutor,
    pub identity: IdentityClient,
    pub challenges: ChallengeBoard,
}

impl AppState {
    /// Opens the on-disk store named by `config`
    pub fn open(config: &AppConfig) -> AppResult<Self> {
        let store = SqliteStore::open(&config.database_path())?;
        Ok(Self::with_store(Arc::new(store), config))
    }

    pub fn with_store(store: Arc<dyn KeyValueStore>, config: &AppConfig) -> Self {
        let tracker = Arc::new(ProgressTracker::new(store.clone()));
        let coins = Arc::new(CoinLedger::new(store.clone()));

        Self {
            shop: Shop::new(coins.clone()),
            leaderboard: Leaderboard::new(tracker.clone()),
            executor: CodeExecutor::new(config.executor.clone()),
            identity: IdentityClient::new(config.identity.clone(), store.clone()),
            challenges: ChallengeBoard::new(store.clone()),
            store,
            tracker,
            coins,
        }
    }

    /// Signed-in uid, or the guest id
    pub fn current_user_id(&self) -> Result<String, String> {
        let session = self.identity.current_user().map_err(|e| e.to_string())?;
        Ok(session
            .map(|user| user.uid)
            .unwrap_or_else(|| GUEST_USER_ID.to_string()))
    }
}

pub use auth::{get_current_user, login, login_with_provider, logout, signup, AuthUserDto};

pub use challenges::{
    finish_challenge, get_challenge, join_challenge, joined_challenges, leave_challenge,
    list_challenges, ChallengeResultDto,
};

pub use progress::{
    get_achievements, get_analytics, get_badges, get_leaderboard, get_level, get_progress,
    AchievementStatusDto, BadgeStatusDto,
};

pub use questions::{
    get_question, list_questions, run_code, submit_solution, QuestionDetailDto,
    QuestionFilter, QuestionSummaryDto, SubmissionDto,
};

pub use shop::{buy_item, get_coins, list_shop_items, CoinsDto, PurchaseDto};

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    use crate::services::MemoryStore;

    test_state_with_store(Arc::new(MemoryStore::new()))
}

#[cfg(test)]
pub(crate) fn test_state_with_store(store: Arc<dyn KeyValueStore>) -> AppState {
    let mut config = AppConfig::default();
    config.executor.simulated_delay_ms = 0;
    AppState::with_store(store, &config)
}
