// Coin shop
// Fixed item catalog, purchases are paid from the coin ledger

use lazy_static::lazy_static;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{CoinSource, CoinWallet, Rarity, ShopCategory, ShopItem};
use crate::services::coins::CoinLedger;

type ItemSeed = (
    &'static str,
    &'static str,
    &'static str,
    u32,
    ShopCategory,
    Rarity,
    &'static str,
);

const ITEMS: &[ItemSeed] = &[
    (
        "hint-basic",
        "Basic Hint",
        "Get a helpful hint for any question",
        25,
        ShopCategory::Hint,
        Rarity::Common,
        "Reveals a basic hint for the current question",
    ),
    (
        "hint-advanced",
        "Advanced Hint",
        "Get a detailed hint with approach",
        50,
        ShopCategory::Hint,
        Rarity::Rare,
        "Reveals the problem-solving approach",
    ),
    (
        "hint-solution",
        "Solution Preview",
        "See the first few lines of the solution",
        100,
        ShopCategory::Hint,
        Rarity::Epic,
        "Shows the beginning of the optimal solution",
    ),
    (
        "time-freeze",
        "Time Freeze",
        "Freeze the timer for 5 minutes",
        75,
        ShopCategory::Powerup,
        Rarity::Rare,
        "Pauses the question timer for 5 minutes",
    ),
    (
        "double-xp",
        "Double XP Boost",
        "Earn double XP for 1 hour",
        150,
        ShopCategory::Powerup,
        Rarity::Epic,
        "All XP earned is doubled for 60 minutes",
    ),
    (
        "coin-magnet",
        "Coin Magnet",
        "Earn 50% more coins for 30 minutes",
        200,
        ShopCategory::Powerup,
        Rarity::Epic,
        "Increases coin rewards by 50% for 30 minutes",
    ),
    (
        "profile-frame",
        "Golden Frame",
        "Exclusive golden profile frame",
        300,
        ShopCategory::Cosmetic,
        Rarity::Legendary,
        "Adds a golden border to your profile picture",
    ),
    (
        "username-color",
        "Rainbow Username",
        "Colorful animated username",
        250,
        ShopCategory::Cosmetic,
        Rarity::Epic,
        "Makes your username display in rainbow colors",
    ),
    (
        "achievement-badge",
        "Custom Badge",
        "Create your own achievement badge",
        500,
        ShopCategory::Cosmetic,
        Rarity::Legendary,
        "Design and display your custom achievement badge",
    ),
    (
        "streak-protector",
        "Streak Protector",
        "Protect your streak for 1 day",
        100,
        ShopCategory::Boost,
        Rarity::Rare,
        "Prevents streak loss if you miss a day",
    ),
    (
        "question-unlock",
        "Question Unlock",
        "Unlock any locked question",
        200,
        ShopCategory::Boost,
        Rarity::Epic,
        "Unlocks any question regardless of level requirements",
    ),
    (
        "challenge-entry",
        "Challenge Entry",
        "Free entry to any challenge",
        150,
        ShopCategory::Boost,
        Rarity::Rare,
        "Grants free entry to any available challenge",
    ),
];

lazy_static! {
    static ref SHOP_ITEMS: Vec<ShopItem> = ITEMS
        .iter()
        .map(
            |&(id, name, description, price, category, rarity, effect)| ShopItem {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                price,
                category,
                rarity,
                effect: effect.to_string(),
            }
        )
        .collect();
}

pub struct Shop {
    ledger: Arc<CoinLedger>,
}

impl Shop {
    pub fn new(ledger: Arc<CoinLedger>) -> Self {
        Self { ledger }
    }

    pub fn items(&self) -> &'static [ShopItem] {
        &SHOP_ITEMS
    }

    pub fn items_by_category(&self, category: ShopCategory) -> Vec<&'static ShopItem> {
        SHOP_ITEMS.iter().filter(|i| i.category == category).collect()
    }

    pub fn get_item(&self, item_id: &str) -> Option<&'static ShopItem> {
        SHOP_ITEMS.iter().find(|i| i.id == item_id)
    }

    /// Pays for the item and adds it to the user's owned items
    pub fn purchase(&self, user_id: &str, item_id: &str) -> AppResult<CoinWallet> {
        let item = self
            .get_item(item_id)
            .ok_or_else(|| AppError::ShopItemNotFound(item_id.to_string()))?;

        let description = format!("Purchased {}", item.name);
        let paid = self.ledger.spend_with(
            user_id,
            item.price,
            &description,
            CoinSource::Purchase,
            |wallet| wallet.purchased_items.push(item.id.clone()),
        )?;

        if !paid {
            return Err(AppError::InsufficientCoins {
                needed: item.price,
                balance: self.ledger.balance(user_id)?,
            });
        }

        log::info!("user {} purchased {}", user_id, item.id);
        self.ledger.wallet(user_id)
    }

    pub fn owned_items(&self, user_id: &str) -> AppResult<Vec<&'static ShopItem>> {
        let wallet = self.ledger.wallet(user_id)?;
        Ok(wallet
            .purchased_items
            .iter()
            .filter_map(|id| self.get_item(id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStore;

    fn shop() -> (Shop, Arc<CoinLedger>) {
        let ledger = Arc::new(CoinLedger::new(Arc::new(MemoryStore::new())));
        (Shop::new(ledger.clone()), ledger)
    }

    #[test]
    fn test_catalog() {
        let (shop, _) = shop();
        assert_eq!(shop.items().len(), 12);
        assert_eq!(shop.items_by_category(ShopCategory::Hint).len(), 3);
        assert_eq!(shop.items_by_category(ShopCategory::Boost).len(), 3);

        let frame = shop.get_item("profile-frame").unwrap();
        assert_eq!(frame.price, 300);
        assert_eq!(frame.rarity, Rarity::Legendary);
        assert!(shop.get_item("nope").is_none());
    }

    #[test]
    fn test_purchase() {
        let (shop, ledger) = shop();
        ledger.earn("u1", 100, "Solved", CoinSource::Question).unwrap();

        let wallet = shop.purchase("u1", "time-freeze").unwrap();
        assert_eq!(wallet.balance, 25);
        assert_eq!(wallet.purchased_items, vec!["time-freeze"]);
        assert_eq!(wallet.history.last().unwrap().description, "Purchased Time Freeze");

        let owned = shop.owned_items("u1").unwrap();
        assert_eq!(owned[0].name, "Time Freeze");
    }

    #[test]
    fn test_purchase_errors() {
        let (shop, ledger) = shop();
        ledger.earn("u1", 30, "Solved", CoinSource::Question).unwrap();

        match shop.purchase("u1", "hint-advanced") {
            Err(AppError::InsufficientCoins { needed, balance }) => {
                assert_eq!(needed, 50);
                assert_eq!(balance, 30);
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(
            shop.purchase("u1", "mystery"),
            Err(AppError::ShopItemNotFound(_))
        ));

        let wallet = ledger.wallet("u1").unwrap();
        assert_eq!(wallet.balance, 30);
        assert!(wallet.purchased_items.is_empty());
    }
}
