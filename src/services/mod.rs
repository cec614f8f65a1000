// Service modules
// Core domain logic behind the command layer

pub mod catalog;
pub mod challenges;
pub mod coins;
pub mod executor;
pub mod identity;
pub mod leaderboard;
pub mod progress;
pub mod shop;
pub mod storage;

pub use catalog::{
    get_all_questions,
    get_question_by_id,
    get_questions_by_difficulty,
    get_questions_by_tag,
    question_count,
    render_statement_html,
    search_questions,
};

pub use challenges::ChallengeBoard;

pub use coins::{CoinLedger, ACHIEVEMENT_COIN_REWARD};

pub use executor::{CodeExecutor, ExecutorConfig};

pub use identity::{AuthError, AuthUser, IdentityClient, IdentityConfig, SessionStore};

pub use leaderboard::Leaderboard;

pub use progress::{get_user_level, Completion, ProgressTracker, ACHIEVEMENTS, BADGES};

pub use shop::Shop;

pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
