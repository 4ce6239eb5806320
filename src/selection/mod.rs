/// 장바구니 / 위시리스트
/// 담는 시점의 상품 스냅샷을 상품 id 기준으로 보관한다 (같은 id 는 한 번만).
// region:    --- Imports
use crate::catalog::Item;
use crate::storage::{keys, load_collection, save_collection, SharedStore, StoreError};
use tracing::info;

// endregion: --- Imports

// region:    --- Selection List
#[derive(Clone)]
pub struct SelectionList {
    store: SharedStore,
    key: &'static str,
}

impl SelectionList {
    /// 장바구니 (consumerCart)
    pub fn cart(store: SharedStore) -> Self {
        Self {
            store,
            key: keys::CONSUMER_CART,
        }
    }

    /// 위시리스트 (consumerWishlist)
    pub fn wishlist(store: SharedStore) -> Self {
        Self {
            store,
            key: keys::CONSUMER_WISHLIST,
        }
    }

    pub async fn list(&self) -> Result<Vec<Item>, StoreError> {
        load_collection(&*self.store, self.key).await
    }

    /// 상품 담기
    /// 이미 담긴 상품이면 false
    pub async fn add(&self, item: Item) -> Result<bool, StoreError> {
        let mut items = self.list().await?;
        if items.iter().any(|existing| existing.id == item.id) {
            info!("{:<12} --> 이미 담긴 상품: {} ({})", "Selection", item.id, self.key);
            return Ok(false);
        }
        info!("{:<12} --> 상품 담기: {} ({})", "Selection", item.id, self.key);
        items.push(item);
        save_collection(&*self.store, self.key, &items).await?;
        Ok(true)
    }

    /// 상품 빼기
    pub async fn remove(&self, item_id: &str) -> Result<bool, StoreError> {
        let mut items = self.list().await?;
        let before = items.len();
        items.retain(|item| item.id != item_id);
        if items.len() == before {
            return Ok(false);
        }
        save_collection(&*self.store, self.key, &items).await?;
        Ok(true)
    }

    /// 비우기
    pub async fn clear(&self) -> Result<(), StoreError> {
        save_collection::<Item>(&*self.store, self.key, &[]).await
    }
}

/// 위시리스트 상품을 장바구니로 옮기기
/// 위시리스트에는 그대로 남는다. 장바구니에 이미 있으면 false
pub async fn move_to_cart(
    wishlist: &SelectionList,
    cart: &SelectionList,
    item_id: &str,
) -> Result<bool, StoreError> {
    let Some(item) = wishlist
        .list()
        .await?
        .into_iter()
        .find(|item| item.id == item_id)
    else {
        return Ok(false);
    };
    cart.add(item).await
}

// endregion: --- Selection List

// endregion: --- Tests
