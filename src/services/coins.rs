// Coin ledger
// Per-user balance and transaction history, one JSON wallet per user

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{CoinSource, CoinTransaction, CoinWallet, TransactionKind};
use crate::services::storage::KeyValueStore;

pub const COINS_KEY_PREFIX: &str = "crackalgo_coins_";

/// Coins granted for every newly unlocked achievement
pub const ACHIEVEMENT_COIN_REWARD: u32 = 25;

pub struct CoinLedger {
    store: Arc<dyn KeyValueStore>,
}

impl CoinLedger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn storage_key(user_id: &str) -> String {
        format!("{}{}", COINS_KEY_PREFIX, user_id)
    }

    pub fn wallet(&self, user_id: &str) -> AppResult<CoinWallet> {
        match self.store.get_item(&Self::storage_key(user_id))? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(CoinWallet::new(user_id)),
        }
    }

    fn save(&self, wallet: &CoinWallet) -> AppResult<()> {
        let json = serde_json::to_string(wallet)?;
        self.store.set_item(&Self::storage_key(&wallet.user_id), &json)
    }

    pub fn balance(&self, user_id: &str) -> AppResult<u32> {
        Ok(self.wallet(user_id)?.balance)
    }

    /// Newest first
    pub fn history(&self, user_id: &str) -> AppResult<Vec<CoinTransaction>> {
        let mut history = self.wallet(user_id)?.history;
        history.reverse();
        Ok(history)
    }

    pub fn earn(
        &self,
        user_id: &str,
        amount: u32,
        description: &str,
        source: CoinSource,
    ) -> AppResult<CoinWallet> {
        let mut wallet = self.wallet(user_id)?;
        wallet.balance = wallet.balance.saturating_add(amount);
        wallet
            .history
            .push(transaction(TransactionKind::Earned, amount, source, description));
        self.save(&wallet)?;

        log::debug!("user {} earned {} coins ({})", user_id, amount, description);
        Ok(wallet)
    }

    /// False, with nothing written, when the balance does not cover `amount`
    pub fn spend(
        &self,
        user_id: &str,
        amount: u32,
        description: &str,
        source: CoinSource,
    ) -> AppResult<bool> {
        self.spend_with(user_id, amount, description, source, |_| {})
    }

    /// Spends and applies `update` to the wallet in the same write
    pub(crate) fn spend_with(
        &self,
        user_id: &str,
        amount: u32,
        description: &str,
        source: CoinSource,
        update: impl FnOnce(&mut CoinWallet),
    ) -> AppResult<bool> {
        let mut wallet = self.wallet(user_id)?;
        if wallet.balance < amount {
            log::debug!(
                "user {} cannot spend {} coins, balance {}",
                user_id,
                amount,
                wallet.balance
            );
            return Ok(false);
        }

        wallet.balance -= amount;
        wallet
            .history
            .push(transaction(TransactionKind::Spent, amount, source, description));
        update(&mut wallet);
        self.save(&wallet)?;

        Ok(true)
    }
}

fn transaction(
    kind: TransactionKind,
    amount: u32,
    source: CoinSource,
    description: &str,
) -> CoinTransaction {
    CoinTransaction {
        id: Uuid::new_v4().to_string(),
        kind,
        amount,
        source,
        description: description.to_string(),
        timestamp: Utc::now(),
    }
}
