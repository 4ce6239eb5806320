/// 상품 카탈로그 저장소 (sellerItems)
/// 수정/삭제/판매 상태 변경은 상품 소유 판매자만 가능하며,
/// 다른 판매자의 상품이나 알 수 없는 id 는 조용히 무시한다.
// region:    --- Imports
use super::model::{demo_items, Item, ItemDraft};
use crate::error::MarketError;
use crate::ids::timestamp_id;
use crate::session::{Role, Session};
use crate::storage::{keys, load_collection, save_collection, SharedStore, StoreError};
use tracing::info;

// endregion: --- Imports

// region:    --- Item Repository
#[derive(Clone)]
pub struct ItemRepository {
    store: SharedStore,
}

impl ItemRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// 모든 상품 조회
    pub async fn list_all(&self) -> Result<Vec<Item>, StoreError> {
        load_collection(&*self.store, keys::SELLER_ITEMS).await
    }

    async fn save_all(&self, items: &[Item]) -> Result<(), StoreError> {
        save_collection(&*self.store, keys::SELLER_ITEMS, items).await
    }

    /// 상품 조회
    pub async fn find(&self, item_id: &str) -> Result<Option<Item>, StoreError> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .find(|item| item.id == item_id))
    }

    /// 판매자 상품 조회
    pub async fn list_for_seller(&self, seller_email: &str) -> Result<Vec<Item>, StoreError> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .filter(|item| item.seller_email == seller_email)
            .collect())
    }

    /// 구매 가능한 상품 조회
    /// 판매 중인 상품이 없으면 데모 상품을 돌려준다.
    pub async fn list_available(&self) -> Result<Vec<Item>, StoreError> {
        let available: Vec<Item> = self
            .list_all()
            .await?
            .into_iter()
            .filter(|item| item.available)
            .collect();

        if available.is_empty() {
            return Ok(demo_items());
        }
        Ok(available)
    }

    /// 구매 가능한 상품 중 id 로 조회 (장바구니/위시리스트 담기용)
    pub async fn find_available(&self, item_id: &str) -> Result<Option<Item>, StoreError> {
        Ok(self
            .list_available()
            .await?
            .into_iter()
            .find(|item| item.id == item_id))
    }

    /// 상품 등록
    pub async fn add(&self, session: &Session, draft: ItemDraft) -> Result<Item, MarketError> {
        session.require(Role::Seller)?;
        draft.validate()?;

        let item = Item {
            id: timestamp_id("item", 0),
            image: draft.image_or_default(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            seller: session.display_name().to_string(),
            seller_email: session.email.clone(),
            available: true,
        };
        info!("{:<12} --> 상품 등록: {}", "Catalog", item.id);

        let mut items = self.list_all().await?;
        items.push(item.clone());
        self.save_all(&items).await?;
        Ok(item)
    }

    /// 상품 수정 (판매 상태는 유지)
    pub async fn update(
        &self,
        session: &Session,
        item_id: &str,
        draft: ItemDraft,
    ) -> Result<Option<Item>, MarketError> {
        session.require(Role::Seller)?;
        draft.validate()?;

        let mut items = self.list_all().await?;
        let Some(item) = items
            .iter_mut()
            .find(|item| item.id == item_id && item.seller_email == session.email)
        else {
            return Ok(None);
        };

        item.image = draft.image_or_default();
        item.name = draft.name;
        item.description = draft.description;
        item.price = draft.price;
        let updated = item.clone();

        self.save_all(&items).await?;
        info!("{:<12} --> 상품 수정: {}", "Catalog", item_id);
        Ok(Some(updated))
    }

    /// 상품 삭제
    pub async fn delete(&self, session: &Session, item_id: &str) -> Result<bool, MarketError> {
        session.require(Role::Seller)?;

        let mut items = self.list_all().await?;
        let before = items.len();
        items.retain(|item| !(item.id == item_id && item.seller_email == session.email));
        if items.len() == before {
            return Ok(false);
        }

        self.save_all(&items).await?;
        info!("{:<12} --> 상품 삭제: {}", "Catalog", item_id);
        Ok(true)
    }

    /// 판매 상태 토글
    pub async fn toggle_availability(
        &self,
        session: &Session,
        item_id: &str,
    ) -> Result<Option<Item>, MarketError> {
        session.require(Role::Seller)?;

        let mut items = self.list_all().await?;
        let Some(item) = items
            .iter_mut()
            .find(|item| item.id == item_id && item.seller_email == session.email)
        else {
            return Ok(None);
        };
        item.available = !item.available;
        let updated = item.clone();

        self.save_all(&items).await?;
        info!(
            "{:<12} --> 판매 상태 변경: {} available={}",
            "Catalog", item_id, updated.available
        );
        Ok(Some(updated))
    }
}

// endregion: --- Item Repository

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use std::sync::Arc;

    fn draft(name: &str, price: f64) -> ItemDraft {
        ItemDraft {
            name: name.to_string(),
            description: format!("{} 설명", name),
            price,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_available_falls_back_to_demo_items() {
        let catalog = ItemRepository::new(Arc::new(InMemoryStore::new()));
        let items = catalog.list_available().await.unwrap();
        assert_eq!(items.len(), 6);
        assert_eq!(items[0].id, "1");
        assert_eq!(items[0].price, 299.0);
    }

    #[tokio::test]
    async fn test_seller_manages_only_own_items() {
        let catalog = ItemRepository::new(Arc::new(InMemoryStore::new()));
        let alice = Session::new("alice@test.com", "Alice", Role::Seller);
        let bob = Session::new("bob@test.com", "Bob", Role::Seller);

        let item = catalog.add(&alice, draft("Lamp", 20.0)).await.unwrap();
        assert_eq!(item.seller, "Alice");
        assert_eq!(item.seller_email, "alice@test.com");
        assert!(item.available);

        // 다른 판매자의 변경은 무시
        assert!(catalog
            .toggle_availability(&bob, &item.id)
            .await
            .unwrap()
            .is_none());
        assert!(!catalog.delete(&bob, &item.id).await.unwrap());

        let toggled = catalog
            .toggle_availability(&alice, &item.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!toggled.available);

        // 수정은 판매 상태를 유지
        let updated = catalog
            .update(&alice, &item.id, draft("Desk Lamp", 25.0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Desk Lamp");
        assert!(!updated.available);

        assert_eq!(catalog.list_for_seller("alice@test.com").await.unwrap().len(), 1);
        assert!(catalog.list_for_seller("bob@test.com").await.unwrap().is_empty());

        assert!(catalog.delete(&alice, &item.id).await.unwrap());
        assert!(catalog.find(&item.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_requires_fields_and_seller_role() {
        let catalog = ItemRepository::new(Arc::new(InMemoryStore::new()));
        let seller = Session::new("alice@test.com", "Alice", Role::Seller);
        let consumer = Session::new("c@test.com", "Lee", Role::Consumer);

        assert!(matches!(
            catalog.add(&seller, draft("", 10.0)).await,
            Err(MarketError::MissingField("name"))
        ));
        assert!(matches!(
            catalog.add(&seller, draft("Lamp", -1.0)).await,
            Err(MarketError::InvalidField(_))
        ));
        assert!(matches!(
            catalog.add(&consumer, draft("Lamp", 10.0)).await,
            Err(MarketError::Forbidden(Role::Seller))
        ));
    }
}
// endregion: --- Tests
