// Shop commands
// Coin balance, history and purchases

use serde::{Deserialize, Serialize};

use super::AppState;
use crate::models::{CoinTransaction, ShopCategory, ShopItem, TransactionKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinsDto {
    pub balance: u32,
    pub total_earned: u32,
    pub total_spent: u32,
    pub purchased_items: Vec<String>,
    /// Catalog entries for `purchased_items`
    pub owned_items: Vec<ShopItem>,
    /// Newest first
    pub history: Vec<CoinTransaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDto {
    pub item: ShopItem,
    pub balance: u32,
}

/// Shop items, optionally of one category
pub async fn list_shop_items(
    category: Option<String>,
    state: &AppState,
) -> Result<Vec<ShopItem>, String> {
    match category {
        Some(category) => {
            let category: ShopCategory = category.parse()?;
            Ok(state
                .shop
                .items_by_category(category)
                .into_iter()
                .cloned()
                .collect())
        }
        None => Ok(state.shop.items().to_vec()),
    }
}

pub async fn buy_item(item_id: String, state: &AppState) -> Result<PurchaseDto, String> {
    let user_id = state.current_user_id()?;
    let wallet = state
        .shop
        .purchase(&user_id, &item_id)
        .map_err(|e| e.to_string())?;

    let item = state
        .shop
        .get_item(&item_id)
        .cloned()
        .ok_or_else(|| format!("Shop item not found: {}", item_id))?;

    Ok(PurchaseDto {
        item,
        balance: wallet.balance,
    })
}

pub async fn get_coins(state: &AppState) -> Result<CoinsDto, String> {
    let user_id = state.current_user_id()?;
    let wallet = state.coins.wallet(&user_id).map_err(|e| e.to_string())?;

    let owned_items = state
        .shop
        .owned_items(&user_id)
        .map_err(|e| e.to_string())?
        .into_iter()
        .cloned()
        .collect();

    let mut history = wallet.history.clone();
    history.reverse();

    Ok(CoinsDto {
        balance: wallet.balance,
        total_earned: wallet.total(TransactionKind::Earned),
        total_spent: wallet.total(TransactionKind::Spent),
        purchased_items: wallet.purchased_items,
        owned_items,
        history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_state;
    use crate::models::CoinSource;

    #[tokio::test]
    async fn test_list_shop_items() {
        let state = test_state();
        assert_eq!(list_shop_items(None, &state).await.unwrap().len(), 12);

        let cosmetics = list_shop_items(Some("cosmetic".to_string()), &state)
            .await
            .unwrap();
        assert_eq!(cosmetics.len(), 3);
        assert!(list_shop_items(Some("weapons".to_string()), &state).await.is_err());
    }

    #[tokio::test]
    async fn test_buy_item() {
        let state = test_state();
        let user = state.current_user_id().unwrap();

        let err = buy_item("hint-basic".to_string(), &state).await.unwrap_err();
        assert_eq!(err, "Insufficient coins: need 25, have 0");

        state
            .coins
            .earn(&user, 60, "Daily bonus", CoinSource::Reward)
            .unwrap();
        let purchase = buy_item("hint-basic".to_string(), &state).await.unwrap();
        assert_eq!(purchase.balance, 35);
        assert_eq!(purchase.item.name, "Basic Hint");

        let coins = get_coins(&state).await.unwrap();
        assert_eq!(coins.balance, 35);
        assert_eq!(coins.total_earned, 60);
        assert_eq!(coins.total_spent, 25);
        assert_eq!(coins.purchased_items, vec!["hint-basic"]);
        assert_eq!(coins.owned_items[0].category, ShopCategory::Hint);
        assert_eq!(coins.history[0].description, "Purchased Basic Hint");
    }
}
